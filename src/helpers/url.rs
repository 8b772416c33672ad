//! URL resolution for posts and pages

/// Base path of post routes
pub const POST_BASE_URL: &str = "/post/";

/// Base path of page routes
pub const PAGE_BASE_URL: &str = "/";

/// Maps an entity slug to its canonical path.
///
/// Implementations must be total and deterministic: the index stores the
/// result at load time and navigation links display it later.
pub trait UrlResolver: Send + Sync {
    /// Path of the post with the given slug
    fn post(&self, slug: &str) -> String;

    /// Path of the page with the given slug
    fn page(&self, slug: &str) -> String;
}

/// Resolver composing fixed base paths with the slug
#[derive(Debug, Clone, Copy, Default)]
pub struct RouteResolver;

impl UrlResolver for RouteResolver {
    fn post(&self, slug: &str) -> String {
        post_url(slug)
    }

    fn page(&self, slug: &str) -> String {
        page_url(slug)
    }
}

/// Canonical path of a post
///
/// # Examples
/// ```ignore
/// post_url("hello-world") // -> "/post/hello-world"
/// ```
pub fn post_url(slug: &str) -> String {
    format!("{}{}", POST_BASE_URL, slug)
}

/// Canonical path of a page
///
/// # Examples
/// ```ignore
/// page_url("about") // -> "/about"
/// ```
pub fn page_url(slug: &str) -> String {
    format!("{}{}", PAGE_BASE_URL, slug)
}
