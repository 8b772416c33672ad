//! Content loader - scans the posts and pages folders of a blog

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::index::{ScanReport, SkippedFile};
use super::{FrontMatterRecord, Index, Page, Post};
use crate::error::ContentError;
use crate::helpers::UrlResolver;

/// Folder holding dated posts
pub const POSTS_FOLDER: &str = "posts";

/// Folder holding standalone pages
pub const PAGES_FOLDER: &str = "pages";

/// Loads content from a blog folder
pub struct ContentLoader<'a> {
    base_dir: &'a Path,
    resolver: &'a dyn UrlResolver,
}

impl<'a> ContentLoader<'a> {
    /// Create a new content loader
    pub fn new(base_dir: &'a Path, resolver: &'a dyn UrlResolver) -> Self {
        Self { base_dir, resolver }
    }

    /// Scan both folders into a fresh index. Per-file problems are logged
    /// and recorded in the index's scan report.
    pub fn build(&self) -> Index {
        let mut report = ScanReport::default();
        let posts = self.load_posts(&mut report);
        let pages = self.load_pages(&mut report);

        tracing::info!(
            "Loaded {} posts and {} pages ({} files skipped)",
            posts.len(),
            pages.len(),
            report.skipped.len()
        );

        Index::from_entries(posts, pages).with_report(report)
    }

    /// Load every post in `{base}/posts`, in file name order
    pub fn load_posts(&self, report: &mut ScanReport) -> Vec<Post> {
        let dir = self.base_dir.join(POSTS_FOLDER);
        let mut posts = Vec::new();

        for path in markdown_files(&dir, report) {
            match FrontMatterRecord::from_file(&path)
                .and_then(|record| Post::from_record(record, self.resolver))
            {
                Ok(post) => {
                    tracing::debug!("Read post file {:?}", path);
                    posts.push(post);
                }
                Err(e) => skip(report, path, e),
            }
        }

        posts
    }

    /// Load every page in `{base}/pages`, in file name order
    pub fn load_pages(&self, report: &mut ScanReport) -> Vec<Page> {
        let dir = self.base_dir.join(PAGES_FOLDER);
        let mut pages = Vec::new();

        for path in markdown_files(&dir, report) {
            match FrontMatterRecord::from_file(&path) {
                Ok(record) => {
                    tracing::debug!("Read page file {:?}", path);
                    pages.push(Page::from_record(record, self.resolver));
                }
                Err(e) => skip(report, path, e),
            }
        }

        pages
    }
}

fn skip(report: &mut ScanReport, path: PathBuf, error: ContentError) {
    tracing::warn!("Failed to load {:?}: {}", path, error);
    report.skipped.push(SkippedFile {
        path,
        reason: error.to_string(),
    });
}

/// Markdown files directly inside `dir`, sorted by file name
fn markdown_files(dir: &Path, report: &mut ScanReport) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        match entry {
            Ok(entry) => {
                let path = entry.path();
                if entry.file_type().is_file() && is_markdown_file(path) {
                    files.push(path.to_path_buf());
                }
            }
            Err(e) if e.depth() == 0 => {
                tracing::warn!("Failed to open folder {:?}: {}", dir, e);
                report.unreadable_folders.push(dir.to_path_buf());
                break;
            }
            Err(e) => {
                tracing::warn!("Failed to read entry in {:?}: {}", dir, e);
            }
        }
    }

    files
}

/// Check if a file is a markdown file
fn is_markdown_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e == "md")
        .unwrap_or(false)
}
