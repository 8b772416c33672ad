//! bloggy: a small blogging engine serving markdown posts and pages
//!
//! Content is read from `posts/` and `pages/` inside a blog folder, indexed
//! in memory, rendered on demand through Tera templates and served over HTTP.
//! Nothing is re-read from disk until the engine is reloaded.

pub mod cache;
pub mod commands;
pub mod config;
pub mod content;
pub mod engine;
pub mod error;
pub mod helpers;
pub mod server;
pub mod templates;

pub use engine::{Engine, ReloadSummary};
pub use error::{Error, Result};

use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A blog folder and its configuration
#[derive(Debug, Clone)]
pub struct Blog {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Blog folder
    pub base_dir: PathBuf,
}

impl Blog {
    /// Open the blog in `base_dir`, reading its `config.yaml` if present
    pub fn new<P: AsRef<Path>>(base_dir: P) -> anyhow::Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config = config::SiteConfig::load(&base_dir)?;
        Ok(Self { config, base_dir })
    }

    /// Scan content and compile templates into a shareable engine
    pub fn engine(&self) -> anyhow::Result<Arc<Engine>> {
        Ok(Arc::new(Engine::open(self.config.clone())?))
    }

    /// Scan content without compiling templates
    pub fn index(&self) -> content::Index {
        content::Index::build(&self.base_dir, &helpers::RouteResolver)
    }

    /// Create a new post or page
    pub fn new_post(
        &self,
        title: &str,
        layout: commands::new::Layout,
        slug: Option<&str>,
    ) -> anyhow::Result<PathBuf> {
        commands::new::create_post(&self.base_dir, title, layout, slug)
    }

    /// List content by type
    pub fn list(&self, content_type: &str) -> anyhow::Result<()> {
        commands::list::run(&self.index(), content_type)
    }
}
