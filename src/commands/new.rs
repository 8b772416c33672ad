//! Create a new post or page

use anyhow::Result;
use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};

use crate::content::loader::{PAGES_FOLDER, POSTS_FOLDER};
use crate::helpers::{format_publish_date, normalize_slug};

/// What kind of content file to create
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    Post,
    Page,
}

impl Layout {
    pub fn parse(name: &str) -> Result<Self> {
        match name {
            "post" | "posts" => Ok(Layout::Post),
            "page" | "pages" => Ok(Layout::Page),
            _ => anyhow::bail!("Unknown layout: {}. Available: post, page", name),
        }
    }

    fn folder(self) -> &'static str {
        match self {
            Layout::Post => POSTS_FOLDER,
            Layout::Page => PAGES_FOLDER,
        }
    }
}

/// Create a post or page titled `title` in the blog at `base_dir` and return
/// its path. `slug` overrides the file name derived from the title.
pub fn create_post(
    base_dir: &Path,
    title: &str,
    layout: Layout,
    slug: Option<&str>,
) -> Result<PathBuf> {
    create_at(base_dir, title, layout, slug, Utc::now())
}

fn create_at(
    base_dir: &Path,
    title: &str,
    layout: Layout,
    slug: Option<&str>,
    now: DateTime<Utc>,
) -> Result<PathBuf> {
    let slug = normalize_slug(&slug.unwrap_or(title).replace(' ', "-"));
    if slug.trim_matches('-').is_empty() {
        anyhow::bail!("Cannot derive a file name from {:?}", title);
    }

    let target_dir = base_dir.join(layout.folder());
    fs::create_dir_all(&target_dir)?;

    let file_path = target_dir.join(format!("{}.md", slug));
    if file_path.exists() {
        anyhow::bail!("File already exists: {:?}", file_path);
    }

    let title = serde_yaml::to_string(title)?;
    let content = match layout {
        Layout::Post => format!(
            "---\ntitle: {}date: {}\n---\n",
            title,
            format_publish_date(&now)
        ),
        Layout::Page => format!("---\ntitle: {}---\n", title),
    };

    fs::write(&file_path, content)?;
    tracing::info!("Created {:?}", file_path);

    Ok(file_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::FrontMatterRecord;
    use chrono::TimeZone;

    #[test]
    fn test_new_post_has_dated_front_matter() {
        let dir = tempfile::tempdir().unwrap();
        let now = Utc.with_ymd_and_hms(2024, 3, 5, 12, 0, 0).unwrap();

        let path = create_at(dir.path(), "Hello Again", Layout::Post, None, now).unwrap();
        assert_eq!(path, dir.path().join("posts/hello-again.md"));

        let record = FrontMatterRecord::from_file(&path).unwrap();
        assert_eq!(record.title, "Hello Again");
        assert_eq!(record.publish_date.as_deref(), Some("2024-Mar-05"));
        assert_eq!(record.slug, "hello-again");
    }

    #[test]
    fn test_new_page_with_explicit_slug() {
        let dir = tempfile::tempdir().unwrap();
        let path = create_post(dir.path(), "About: me", Layout::Page, Some("about")).unwrap();
        assert_eq!(path, dir.path().join("pages/about.md"));

        let record = FrontMatterRecord::from_file(&path).unwrap();
        assert_eq!(record.title, "About: me");
        assert!(record.publish_date.is_none());
    }

    #[test]
    fn test_existing_file_is_not_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        create_post(dir.path(), "Twice", Layout::Post, None).unwrap();
        assert!(create_post(dir.path(), "Twice", Layout::Post, None).is_err());
    }

    #[test]
    fn test_unusable_title() {
        let dir = tempfile::tempdir().unwrap();
        assert!(create_post(dir.path(), "2024", Layout::Post, None).is_err());
    }

    #[test]
    fn test_parse_layout() {
        assert_eq!(Layout::parse("post").unwrap(), Layout::Post);
        assert_eq!(Layout::parse("pages").unwrap(), Layout::Page);
        assert!(Layout::parse("draft").is_err());
    }
}
