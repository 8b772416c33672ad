//! Configuration module

mod site;

pub use site::AuthorConfig;
pub use site::MetaConfig;
pub use site::ServerConfig;
pub use site::SiteConfig;
pub use site::CONFIG_FILE;
