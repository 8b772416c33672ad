//! Engine - the shared state every request handler works against
//!
//! Owns the content index, the context cache and the compiled templates.
//! Readers take a snapshot `Arc` of each store and never hold a lock while
//! rendering. [`Engine::reload`] builds replacements off to the side and swaps
//! them in one at a time; the three swaps are not atomic as a group. Context
//! lookups pin the cache generation before reading the index.

use std::fmt;
use std::io;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Instant;

use crate::cache::{
    CacheState, ContextCache, ErrorContext, IndexContext, PageContext, PostContext, RenderContext,
};
use crate::config::SiteConfig;
use crate::content::Index;
use crate::error::{Error, Result};
use crate::helpers::{RouteResolver, UrlResolver};
use crate::templates::{TemplateDir, TemplateSet, TemplateSource};

/// What a reload produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReloadSummary {
    pub posts: usize,
    pub pages: usize,
    pub skipped: usize,
    pub templates: usize,
    /// Cache generation after the reload
    pub generation: u64,
}

impl fmt::Display for ReloadSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} posts, {} pages, {} skipped, {} templates (generation {})",
            self.posts, self.pages, self.skipped, self.templates, self.generation
        )
    }
}

pub struct Engine {
    config: Arc<SiteConfig>,
    resolver: Arc<dyn UrlResolver>,
    index: RwLock<Arc<Index>>,
    cache: ContextCache,
    templates: RwLock<Arc<dyn TemplateSet>>,
    source: Box<dyn TemplateSource>,
    /// Serializes reloads
    reload_lock: Mutex<()>,
}

impl Engine {
    /// Scan the blog at `config.base` and compile its templates
    pub fn open(config: SiteConfig) -> Result<Self> {
        let source = TemplateDir::for_blog(&config.base);
        Self::new(config, Arc::new(RouteResolver), Box::new(source))
    }

    /// Build an engine with an explicit resolver and template source
    pub fn new(
        config: SiteConfig,
        resolver: Arc<dyn UrlResolver>,
        source: Box<dyn TemplateSource>,
    ) -> Result<Self> {
        let config = Arc::new(config);
        let index = Index::build(&config.base, resolver.as_ref());
        let templates = source.compile()?;

        Ok(Self {
            cache: ContextCache::new(Arc::clone(&config)),
            config,
            resolver,
            index: RwLock::new(Arc::new(index)),
            templates: RwLock::new(templates),
            source,
            reload_lock: Mutex::new(()),
        })
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    pub fn resolver(&self) -> &dyn UrlResolver {
        self.resolver.as_ref()
    }

    pub fn cache(&self) -> &ContextCache {
        &self.cache
    }

    pub fn cache_state(&self) -> CacheState {
        self.cache.state()
    }

    /// Current index snapshot
    pub fn index(&self) -> Arc<Index> {
        Arc::clone(&self.index.read().unwrap_or_else(PoisonError::into_inner))
    }

    fn template_set(&self) -> Arc<dyn TemplateSet> {
        Arc::clone(&self.templates.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Names of the compiled templates
    pub fn template_names(&self) -> Vec<String> {
        self.template_set().names()
    }

    // The cache generation is pinned before the index is read. Reload swaps
    // the index before clearing, so a view built from an old index can only
    // be stored in a generation that is already discarded.

    pub fn post_context(&self, slug: &str) -> Result<Arc<PostContext>> {
        let cache = self.cache.pin();
        cache.post_context(&self.index(), slug)
    }

    pub fn page_context(&self, slug: &str) -> Result<Arc<PageContext>> {
        let cache = self.cache.pin();
        cache.page_context(&self.index(), slug)
    }

    pub fn index_context(&self) -> Arc<IndexContext> {
        let cache = self.cache.pin();
        cache.index_context(&self.index())
    }

    pub fn error_context(&self, err: &dyn fmt::Display, status: u16) -> ErrorContext {
        let cache = self.cache.pin();
        cache.error_context(&self.index(), err, status)
    }

    /// Render the template `name` with `ctx` into `out`
    pub fn apply_template(
        &self,
        name: &str,
        ctx: &RenderContext,
        out: &mut dyn io::Write,
    ) -> Result<()> {
        self.template_set().render(name, ctx, out)
    }

    /// Render a view with the template matching its kind
    pub fn render(&self, ctx: &RenderContext) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.apply_template(ctx.template_name(), ctx, &mut out)?;
        Ok(out)
    }

    pub fn render_index(&self) -> Result<Vec<u8>> {
        self.render(&self.index_context().into())
    }

    pub fn render_post(&self, slug: &str) -> Result<Vec<u8>> {
        self.render(&self.post_context(slug)?.into())
    }

    pub fn render_page(&self, slug: &str) -> Result<Vec<u8>> {
        self.render(&self.page_context(slug)?.into())
    }

    /// Render the error page for `err`, falling back to its plain text when
    /// the error template itself fails
    pub fn render_error(&self, err: &Error) -> Vec<u8> {
        let ctx = RenderContext::from(self.error_context(err, err.status_code()));
        match self.render(&ctx) {
            Ok(body) => body,
            Err(e) => {
                tracing::error!("Failed to render error page: {}", e);
                err.to_string().into_bytes()
            }
        }
    }

    /// Rescan the blog folder and swap in the new index
    pub fn rebuild_index(&self) -> Arc<Index> {
        let index = Arc::new(Index::build(&self.config.base, self.resolver.as_ref()));
        *self.index.write().unwrap_or_else(PoisonError::into_inner) = Arc::clone(&index);
        index
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Recompile templates and swap them in. On failure the previous set stays.
    pub fn reload_templates(&self) -> Result<usize> {
        let templates = self.source.compile()?;
        let count = templates.names().len();
        *self.templates.write().unwrap_or_else(PoisonError::into_inner) = templates;
        Ok(count)
    }

    /// Rebuild the index, clear the cache, then recompile templates.
    ///
    /// A template failure is returned after the index and cache have already
    /// been replaced; the old templates keep serving.
    pub fn reload(&self) -> Result<ReloadSummary> {
        let _guard = self.reload_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let start = Instant::now();

        let index = self.rebuild_index();
        self.clear_cache();
        let templates = self.reload_templates()?;

        let summary = ReloadSummary {
            posts: index.posts().len(),
            pages: index.pages().len(),
            skipped: index.report().skipped.len(),
            templates,
            generation: self.cache.generation(),
        };
        tracing::info!(
            "Reloaded in {:.1}ms: {}",
            start.elapsed().as_secs_f64() * 1000.0,
            summary
        );
        Ok(summary)
    }
}
