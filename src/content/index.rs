//! In-memory content index

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::loader::ContentLoader;
use super::{Page, Post};
use crate::helpers::UrlResolver;

/// A content file that was left out of the index
#[derive(Debug, Clone)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// What a directory scan could not load
#[derive(Debug, Clone, Default)]
pub struct ScanReport {
    /// Files that failed to parse or lacked a valid date
    pub skipped: Vec<SkippedFile>,
    /// Content folders that could not be read
    pub unreadable_folders: Vec<PathBuf>,
}

impl ScanReport {
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty() && self.unreadable_folders.is_empty()
    }
}

/// Posts and pages of one load cycle.
///
/// Posts are ordered newest first, pages keep scan order. Slugs are not
/// required to be unique: for duplicates the lookup maps point at the file
/// scanned last, while every file stays in the ordered lists.
#[derive(Debug, Default)]
pub struct Index {
    posts: Vec<Arc<Post>>,
    pages: Vec<Arc<Page>>,
    post_by_slug: HashMap<String, Arc<Post>>,
    page_by_slug: HashMap<String, Arc<Page>>,
    report: ScanReport,
}

impl Index {
    /// An index with no content
    pub fn empty() -> Self {
        Self::default()
    }

    /// Scan `{base}/posts` and `{base}/pages` into a new index
    pub fn build(base: &Path, resolver: &dyn UrlResolver) -> Self {
        ContentLoader::new(base, resolver).build()
    }

    /// Assemble an index from entries given in scan order.
    ///
    /// Posts are stably sorted by publish date, newest first, so posts
    /// sharing a date keep their scan order.
    pub fn from_entries(posts: Vec<Post>, pages: Vec<Page>) -> Self {
        let mut index = Self::default();

        for post in posts {
            let post = Arc::new(post);
            if let Some(previous) = index
                .post_by_slug
                .insert(post.slug.clone(), Arc::clone(&post))
            {
                tracing::warn!(
                    "Duplicate post slug '{}': '{}' replaces '{}' for lookups",
                    post.slug,
                    post.title,
                    previous.title
                );
            }
            index.posts.push(post);
        }
        index.posts.sort_by(|a, b| b.published.cmp(&a.published));

        for page in pages {
            let page = Arc::new(page);
            if let Some(previous) = index
                .page_by_slug
                .insert(page.slug.clone(), Arc::clone(&page))
            {
                tracing::warn!(
                    "Duplicate page slug '{}': '{}' replaces '{}' for lookups",
                    page.slug,
                    page.title,
                    previous.title
                );
            }
            index.pages.push(page);
        }

        index
    }

    pub(crate) fn with_report(mut self, report: ScanReport) -> Self {
        self.report = report;
        self
    }

    /// Find a post by slug
    pub fn post(&self, slug: &str) -> Option<&Arc<Post>> {
        self.post_by_slug.get(slug)
    }

    /// Find a page by slug
    pub fn page(&self, slug: &str) -> Option<&Arc<Page>> {
        self.page_by_slug.get(slug)
    }

    /// All posts, newest first
    pub fn posts(&self) -> &[Arc<Post>] {
        &self.posts
    }

    /// All pages in scan order
    pub fn pages(&self) -> &[Arc<Page>] {
        &self.pages
    }

    /// The `count` most recent posts, or all of them if there are fewer
    pub fn latest_posts(&self, count: usize) -> &[Arc<Post>] {
        &self.posts[..count.min(self.posts.len())]
    }

    /// Problems encountered while scanning
    pub fn report(&self) -> &ScanReport {
        &self.report
    }
}
