//! Context cache - memoized view-models over the content index
//!
//! Views are built lazily on first request and kept until [`ContextCache::clear`]
//! starts a new generation. Editing a file on disk is not reflected until the
//! caller reloads the index and clears the cache.

mod context;

pub use context::{
    ErrorContext, IndexContext, NavItem, PageContext, PostContext, PostSummary, RenderContext,
    SiteContext,
};

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError, RwLock};

use crate::config::SiteConfig;
use crate::content::Index;
use crate::error::{Error, Result};

/// Observable state of the current cache generation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    /// Nothing built since the last clear
    Empty,
    /// At least one view is being built right now
    Populating,
    /// Holds built views and nothing is in flight
    Warm,
}

/// Views built between two clears
#[derive(Default)]
struct Generation {
    number: u64,
    site: OnceLock<Arc<SiteContext>>,
    index: OnceLock<Arc<IndexContext>>,
    posts: Mutex<HashMap<String, Arc<PostContext>>>,
    pages: Mutex<HashMap<String, Arc<PageContext>>>,
}

impl Generation {
    fn new(number: u64) -> Self {
        Self {
            number,
            ..Default::default()
        }
    }

    fn is_empty(&self) -> bool {
        self.site.get().is_none()
            && self.index.get().is_none()
            && lock(&self.posts).is_empty()
            && lock(&self.pages).is_empty()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Memoizes per-entity view-models keyed by slug.
///
/// Concurrent misses on the same key may build the view twice; the first
/// insert wins and every caller receives the stored value.
pub struct ContextCache {
    config: Arc<SiteConfig>,
    current: RwLock<Arc<Generation>>,
    in_flight: AtomicUsize,
}

/// Marks a view build in progress for [`CacheState::Populating`]
struct BuildGuard<'a>(&'a AtomicUsize);

impl<'a> BuildGuard<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::AcqRel);
        Self(counter)
    }
}

impl Drop for BuildGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

impl ContextCache {
    pub fn new(config: Arc<SiteConfig>) -> Self {
        Self {
            config,
            current: RwLock::new(Arc::new(Generation::new(0))),
            in_flight: AtomicUsize::new(0),
        }
    }

    fn generation_handle(&self) -> Arc<Generation> {
        Arc::clone(&self.current.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Drop every cached view and start a new generation
    pub fn clear(&self) {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        let next = current.number + 1;
        *current = Arc::new(Generation::new(next));
        tracing::info!("Cleared context cache (generation {})", next);
    }

    /// Number of clears since construction
    pub fn generation(&self) -> u64 {
        self.generation_handle().number
    }

    pub fn state(&self) -> CacheState {
        if self.in_flight.load(Ordering::Acquire) > 0 {
            CacheState::Populating
        } else if self.generation_handle().is_empty() {
            CacheState::Empty
        } else {
            CacheState::Warm
        }
    }

    pub fn is_post_cached(&self, slug: &str) -> bool {
        lock(&self.generation_handle().posts).contains_key(slug)
    }

    pub fn is_page_cached(&self, slug: &str) -> bool {
        lock(&self.generation_handle().pages).contains_key(slug)
    }

    /// Hold on to the current generation.
    ///
    /// Callers that read a shared index must pin before taking their index
    /// snapshot. A reload swaps the index before clearing, so a view built
    /// from a stale snapshot can only land in a generation that is already
    /// being discarded.
    pub fn pin(&self) -> PinnedCache<'_> {
        PinnedCache {
            cache: self,
            generation: self.generation_handle(),
        }
    }

    /// Site-wide context, built once per generation
    pub fn site_context(&self, index: &Index) -> Arc<SiteContext> {
        self.pin().site_context(index)
    }

    /// View of the post with `slug`, rendered on first request
    pub fn post_context(&self, index: &Index, slug: &str) -> Result<Arc<PostContext>> {
        self.pin().post_context(index, slug)
    }

    /// View of the page with `slug`, rendered on first request
    pub fn page_context(&self, index: &Index, slug: &str) -> Result<Arc<PageContext>> {
        self.pin().page_context(index, slug)
    }

    /// Front page view with the configured number of latest posts, built
    /// once per generation
    pub fn index_context(&self, index: &Index) -> Arc<IndexContext> {
        self.pin().index_context(index)
    }

    /// Error view built fresh on every call
    pub fn error_context(&self, index: &Index, err: &dyn fmt::Display, status: u16) -> ErrorContext {
        self.pin().error_context(index, err, status)
    }
}

/// A [`ContextCache`] fixed to one generation. Lookups and inserts all go
/// to that generation even if the cache is cleared meanwhile.
pub struct PinnedCache<'a> {
    cache: &'a ContextCache,
    generation: Arc<Generation>,
}

impl PinnedCache<'_> {
    /// Number of the pinned generation
    pub fn generation(&self) -> u64 {
        self.generation.number
    }

    fn building(&self) -> BuildGuard<'_> {
        BuildGuard::enter(&self.cache.in_flight)
    }

    pub fn site_context(&self, index: &Index) -> Arc<SiteContext> {
        Arc::clone(self.generation.site.get_or_init(|| {
            let _building = self.building();
            Arc::new(SiteContext::build(&self.cache.config, index))
        }))
    }

    pub fn post_context(&self, index: &Index, slug: &str) -> Result<Arc<PostContext>> {
        if let Some(ctx) = lock(&self.generation.posts).get(slug) {
            return Ok(Arc::clone(ctx));
        }

        let post = index.post(slug).ok_or_else(|| Error::post_not_found(slug))?;
        let ctx = {
            let _building = self.building();
            let site = self.site_context(index);
            Arc::new(PostContext::build(site.as_ref().clone(), post))
        };

        let mut posts = lock(&self.generation.posts);
        let stored = posts.entry(slug.to_string()).or_insert(ctx);
        tracing::debug!("Created cached version of post '{}'", slug);
        Ok(Arc::clone(stored))
    }

    pub fn page_context(&self, index: &Index, slug: &str) -> Result<Arc<PageContext>> {
        if let Some(ctx) = lock(&self.generation.pages).get(slug) {
            return Ok(Arc::clone(ctx));
        }

        let page = index.page(slug).ok_or_else(|| Error::page_not_found(slug))?;
        let ctx = {
            let _building = self.building();
            let site = self.site_context(index);
            Arc::new(PageContext::build(site.as_ref().clone(), page))
        };

        let mut pages = lock(&self.generation.pages);
        let stored = pages.entry(slug.to_string()).or_insert(ctx);
        tracing::debug!("Created cached version of page '{}'", slug);
        Ok(Arc::clone(stored))
    }

    pub fn index_context(&self, index: &Index) -> Arc<IndexContext> {
        Arc::clone(self.generation.index.get_or_init(|| {
            let _building = self.building();
            let site = self.site_context(index);
            let posts = index
                .latest_posts(self.cache.config.latest_posts)
                .iter()
                .map(|post| PostSummary::from_post(post))
                .collect();
            Arc::new(IndexContext {
                site: site.as_ref().clone(),
                posts,
            })
        }))
    }

    pub fn error_context(&self, index: &Index, err: &dyn fmt::Display, status: u16) -> ErrorContext {
        ErrorContext {
            site: self.site_context(index).as_ref().clone(),
            message: err.to_string(),
            status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{Page, Post};
    use crate::helpers::{parse_publish_date, post_url};

    fn post(slug: &str, date: &str, body: &str) -> Post {
        Post {
            title: slug.to_uppercase(),
            subtitle: String::new(),
            published: parse_publish_date(date).unwrap(),
            slug: slug.to_string(),
            url: post_url(slug),
            raw: body.to_string(),
        }
    }

    fn page(slug: &str) -> Page {
        Page {
            title: slug.to_uppercase(),
            slug: slug.to_string(),
            url: format!("/{}", slug),
            raw: format!("# {}\n", slug),
        }
    }

    fn config(latest: usize) -> Arc<SiteConfig> {
        let mut config = SiteConfig::default();
        config.meta.title = "Test Blog".to_string();
        config.author.name = "Tester".to_string();
        config.latest_posts = latest;
        config
            .links
            .insert("GitHub".to_string(), "https://github.com/tester".to_string());
        Arc::new(config)
    }

    fn sample_index() -> Index {
        Index::from_entries(
            vec![
                post("older", "2020-Jan-01", "Old *news*"),
                post("newer", "2021-Jan-01", "# Fresh"),
                post("newest", "2022-Jan-01", "Hi"),
            ],
            vec![page("about"), page("contact")],
        )
    }

    #[test]
    fn test_starts_empty_and_warms_up() {
        let cache = ContextCache::new(config(10));
        let index = sample_index();
        assert_eq!(cache.state(), CacheState::Empty);

        cache.post_context(&index, "newer").unwrap();
        assert_eq!(cache.state(), CacheState::Warm);
        assert!(cache.is_post_cached("newer"));
        assert!(!cache.is_post_cached("older"));
    }

    #[test]
    fn test_post_context_fields() {
        let cache = ContextCache::new(config(10));
        let index = sample_index();

        let ctx = cache.post_context(&index, "newer").unwrap();
        assert_eq!(ctx.title, "NEWER");
        assert_eq!(ctx.url, "/post/newer");
        assert_eq!(ctx.published, "2021-Jan-01");
        assert!(ctx.date.ends_with("ago"));
        assert!(ctx.content.contains("<h1>Fresh</h1>"));
        assert_eq!(ctx.site.title, "Test Blog");
    }

    #[test]
    fn test_repeated_lookups_hit_the_cache() {
        let cache = ContextCache::new(config(10));
        let index = sample_index();

        let first = cache.post_context(&index, "older").unwrap();
        let second = cache.post_context(&index, "older").unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        let first = cache.page_context(&index, "about").unwrap();
        let second = cache.page_context(&index, "about").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_cached_view_survives_index_change_until_clear() {
        let cache = ContextCache::new(config(10));
        let before = sample_index();
        let stale = cache.post_context(&before, "newest").unwrap();

        let after = Index::from_entries(vec![post("newest", "2022-Jan-01", "Edited")], Vec::new());
        let still_stale = cache.post_context(&after, "newest").unwrap();
        assert!(Arc::ptr_eq(&stale, &still_stale));
        assert!(still_stale.content.contains("Hi"));

        cache.clear();
        assert_eq!(cache.state(), CacheState::Empty);
        let fresh = cache.post_context(&after, "newest").unwrap();
        assert!(!Arc::ptr_eq(&stale, &fresh));
        assert!(fresh.content.contains("Edited"));
    }

    #[test]
    fn test_missing_slugs_are_not_found() {
        let cache = ContextCache::new(config(10));
        let index = sample_index();

        let err = cache.post_context(&index, "nope").unwrap_err();
        assert!(err.is_not_found());
        let err = cache.page_context(&index, "nope").unwrap_err();
        assert!(err.is_not_found());
        assert!(!cache.is_post_cached("nope"));
    }

    #[test]
    fn test_navigation_pages_then_links() {
        let cache = ContextCache::new(config(10));
        let site = cache.site_context(&sample_index());

        let nav: Vec<_> = site.nav.iter().map(|n| (n.title.as_str(), n.url.as_str())).collect();
        assert_eq!(
            nav,
            vec![
                ("ABOUT", "/about"),
                ("CONTACT", "/contact"),
                ("GitHub", "https://github.com/tester"),
            ]
        );
    }

    #[test]
    fn test_site_context_is_built_once_per_generation() {
        let cache = ContextCache::new(config(10));
        let index = sample_index();

        let first = cache.site_context(&index);
        let second = cache.site_context(&Index::empty());
        assert!(Arc::ptr_eq(&first, &second));

        cache.clear();
        let third = cache.site_context(&Index::empty());
        assert!(third.nav.iter().all(|item| item.title == "GitHub"));
    }

    #[test]
    fn test_index_context_limits_latest_posts() {
        let cache = ContextCache::new(config(2));
        let ctx = cache.index_context(&sample_index());
        let urls: Vec<_> = ctx.posts.iter().map(|p| p.url.as_str()).collect();
        assert_eq!(urls, vec!["/post/newest", "/post/newer"]);

        let cache = ContextCache::new(config(10));
        let ctx = cache.index_context(&sample_index());
        assert_eq!(ctx.posts.len(), 3);
        assert_eq!(ctx.posts[0].url, "/post/newest");
    }

    #[test]
    fn test_index_context_is_a_singleton() {
        let cache = ContextCache::new(config(10));
        let index = sample_index();
        let first = cache.index_context(&index);
        let second = cache.index_context(&index);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_error_context_is_never_cached() {
        let cache = ContextCache::new(config(10));
        let index = sample_index();

        let err = Error::post_not_found("ghost");
        let ctx = cache.error_context(&index, &err, err.status_code());
        assert_eq!(ctx.message, "post 'ghost' not found");
        assert_eq!(ctx.status, 404);
        assert!(!cache.is_post_cached("ghost"));
    }

    #[test]
    fn test_pinned_generation_is_dropped_by_clear() {
        let cache = ContextCache::new(config(10));
        let old = sample_index();
        let pinned = cache.pin();

        cache.clear();
        let stale = pinned.post_context(&old, "newest").unwrap();
        assert_eq!(pinned.generation(), 0);
        assert!(!cache.is_post_cached("newest"));

        let new = Index::from_entries(vec![post("newest", "2022-Jan-01", "Edited")], Vec::new());
        let fresh = cache.post_context(&new, "newest").unwrap();
        assert!(!Arc::ptr_eq(&stale, &fresh));
        assert!(fresh.content.contains("Edited"));
    }

    #[test]
    fn test_clear_bumps_generation() {
        let cache = ContextCache::new(config(10));
        assert_eq!(cache.generation(), 0);
        cache.clear();
        cache.clear();
        assert_eq!(cache.generation(), 2);
    }

    #[test]
    fn test_concurrent_misses_agree() {
        let cache = ContextCache::new(config(10));
        let index = sample_index();

        let results: Vec<_> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| scope.spawn(|| cache.post_context(&index, "newer").unwrap()))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        let first = &results[0];
        for ctx in &results {
            assert!(Arc::ptr_eq(first, ctx));
            assert_eq!(first.as_ref(), ctx.as_ref());
        }
        assert_eq!(cache.state(), CacheState::Warm);
    }

    #[test]
    fn test_concurrent_misses_for_absent_slug() {
        let cache = ContextCache::new(config(10));
        let index = sample_index();

        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| scope.spawn(|| cache.post_context(&index, "absent")))
                .collect();
            for handle in handles {
                assert!(handle.join().unwrap().unwrap_err().is_not_found());
            }
        });
    }
}
