//! View-models handed to templates

use chrono::{Datelike, Local};
use serde::{Serialize, Serializer};
use std::sync::Arc;

use crate::config::SiteConfig;
use crate::content::{self, Entry, Index, NavigationLink, Page, Post};
use crate::helpers::{format_publish_date, relative_date};

/// A title + URL pair shown in the site navigation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavItem {
    pub title: String,
    pub url: String,
}

impl NavItem {
    pub fn from_entry(entry: &dyn Entry) -> Self {
        Self {
            title: entry.title().to_string(),
            url: entry.url().to_string(),
        }
    }
}

/// Site-wide fields shared by every view
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SiteContext {
    pub title: String,
    pub subtitle: String,
    pub author: String,
    pub email: String,
    /// Year at construction time
    pub year: i32,
    pub url: String,
    /// Pages in index order, then configured links in file order
    pub nav: Vec<NavItem>,
}

impl SiteContext {
    pub fn build(config: &SiteConfig, index: &Index) -> Self {
        let pages = index
            .pages()
            .iter()
            .map(|page| NavItem::from_entry(page.as_ref()));
        let links = config
            .links
            .iter()
            .map(|(title, url)| NavItem::from_entry(&NavigationLink::new(title, url)));

        let nav: Vec<NavItem> = pages.chain(links).collect();
        for item in &nav {
            tracing::debug!("Added '{}' to navigation", item.title);
        }

        Self {
            title: config.meta.title.clone(),
            subtitle: config.meta.subtitle.clone(),
            author: config.author.name.clone(),
            email: config.author.email.clone(),
            year: Local::now().year(),
            url: "/".to_string(),
            nav,
        }
    }
}

/// View of a single post
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostContext {
    pub site: SiteContext,
    pub title: String,
    pub subtitle: String,
    /// Humanized age, e.g. "3 days ago"
    pub date: String,
    /// Publish date as written in front-matter
    pub published: String,
    /// Sanitized HTML body
    pub content: String,
    pub url: String,
}

impl PostContext {
    pub fn build(site: SiteContext, post: &Post) -> Self {
        Self {
            site,
            title: post.title.clone(),
            subtitle: post.subtitle.clone(),
            date: relative_date(&post.published),
            published: format_publish_date(&post.published),
            content: content::render(&post.raw),
            url: post.url.clone(),
        }
    }
}

/// View of a single page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageContext {
    pub site: SiteContext,
    pub title: String,
    pub content: String,
    pub url: String,
}

impl PageContext {
    pub fn build(site: SiteContext, page: &Page) -> Self {
        Self {
            site,
            title: page.title.clone(),
            content: content::render(&page.raw),
            url: page.url.clone(),
        }
    }
}

/// Post listing entry on the index page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostSummary {
    pub title: String,
    pub subtitle: String,
    pub date: String,
    pub published: String,
    pub url: String,
}

impl PostSummary {
    pub fn from_post(post: &Post) -> Self {
        Self {
            title: post.title.clone(),
            subtitle: post.subtitle.clone(),
            date: relative_date(&post.published),
            published: format_publish_date(&post.published),
            url: post.url.clone(),
        }
    }
}

/// View of the front page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexContext {
    pub site: SiteContext,
    /// Most recent posts, newest first
    pub posts: Vec<PostSummary>,
}

/// View of an error page; never cached
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorContext {
    pub site: SiteContext,
    pub message: String,
    pub status: u16,
}

/// Any view a template can render
#[derive(Debug, Clone)]
pub enum RenderContext {
    Post(Arc<PostContext>),
    Page(Arc<PageContext>),
    Index(Arc<IndexContext>),
    Error(ErrorContext),
}

impl RenderContext {
    /// Name of the template that displays this view
    pub fn template_name(&self) -> &'static str {
        match self {
            RenderContext::Post(_) => "post",
            RenderContext::Page(_) => "page",
            RenderContext::Index(_) => "index",
            RenderContext::Error(_) => "error",
        }
    }

    pub fn site(&self) -> &SiteContext {
        match self {
            RenderContext::Post(ctx) => &ctx.site,
            RenderContext::Page(ctx) => &ctx.site,
            RenderContext::Index(ctx) => &ctx.site,
            RenderContext::Error(ctx) => &ctx.site,
        }
    }
}

impl Serialize for RenderContext {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            RenderContext::Post(ctx) => ctx.as_ref().serialize(serializer),
            RenderContext::Page(ctx) => ctx.as_ref().serialize(serializer),
            RenderContext::Index(ctx) => ctx.as_ref().serialize(serializer),
            RenderContext::Error(ctx) => ctx.serialize(serializer),
        }
    }
}

impl From<Arc<PostContext>> for RenderContext {
    fn from(ctx: Arc<PostContext>) -> Self {
        RenderContext::Post(ctx)
    }
}

impl From<Arc<PageContext>> for RenderContext {
    fn from(ctx: Arc<PageContext>) -> Self {
        RenderContext::Page(ctx)
    }
}

impl From<Arc<IndexContext>> for RenderContext {
    fn from(ctx: Arc<IndexContext>) -> Self {
        RenderContext::Index(ctx)
    }
}

impl From<ErrorContext> for RenderContext {
    fn from(ctx: ErrorContext) -> Self {
        RenderContext::Error(ctx)
    }
}
