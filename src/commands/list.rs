//! List blog content

use anyhow::Result;
use std::io::Write;

use crate::content::Index;
use crate::helpers::format_publish_date;

/// Print posts or pages of `index` to `out`
pub fn write_listing(index: &Index, content_type: &str, out: &mut dyn Write) -> Result<()> {
    match content_type {
        "post" | "posts" => {
            writeln!(out, "Posts ({}):", index.posts().len())?;
            for post in index.posts() {
                writeln!(
                    out,
                    "  {} - {} [{}]",
                    format_publish_date(&post.published),
                    post.title,
                    post.slug
                )?;
            }
        }
        "page" | "pages" => {
            writeln!(out, "Pages ({}):", index.pages().len())?;
            for page in index.pages() {
                writeln!(out, "  {} [{}]", page.title, page.slug)?;
            }
        }
        "skipped" => {
            let report = index.report();
            writeln!(out, "Skipped ({}):", report.skipped.len())?;
            for skipped in &report.skipped {
                writeln!(out, "  {} ({})", skipped.path.display(), skipped.reason)?;
            }
            for folder in &report.unreadable_folders {
                writeln!(out, "  {} (unreadable folder)", folder.display())?;
            }
        }
        _ => {
            anyhow::bail!(
                "Unknown type: {}. Available: posts, pages, skipped",
                content_type
            );
        }
    }

    Ok(())
}

/// List content by type on stdout
pub fn run(index: &Index, content_type: &str) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    write_listing(index, content_type, &mut out)
}
