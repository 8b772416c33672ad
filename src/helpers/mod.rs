//! Helper functions shared by the index, the context cache and templates

mod date;
mod slug;
mod url;

pub use date::*;
pub use slug::*;
pub use url::*;
