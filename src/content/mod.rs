//! Content module - front-matter parsing, posts, pages and the content index

mod frontmatter;
mod index;
pub mod loader;
mod markdown;
mod post;

pub use frontmatter::{split, FrontMatter, FrontMatterRecord};
pub use index::{Index, ScanReport, SkippedFile};
pub use markdown::{render, MarkdownRenderer};
pub use post::{Entry, NavigationLink, Page, Post};
