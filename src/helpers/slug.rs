//! Slug normalization

use lazy_static::lazy_static;
use regex::Regex;
use std::path::Path;

lazy_static! {
    /// Everything a slug may not contain
    static ref SLUG_FILTER: Regex = Regex::new(r"[^A-Za-z\-]").unwrap();
}

/// Strip every character outside `[A-Za-z-]`, then lowercase.
///
/// Digits and underscores are dropped too, so `My_Post 1` becomes `mypost`.
pub fn normalize_slug(raw: &str) -> String {
    SLUG_FILTER.replace_all(raw, "").to_lowercase()
}

/// Slug source for a file without an explicit slug: its base name without
/// the extension
pub fn file_stem_slug(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_slug() {
        assert_eq!(normalize_slug("Hello-World"), "hello-world");
        assert_eq!(normalize_slug("My_Post 1"), "mypost");
        assert_eq!(normalize_slug("rust2024-edition"), "rust-edition");
        assert_eq!(normalize_slug("über"), "ber");
        assert_eq!(normalize_slug("2020"), "");
    }

    #[test]
    fn test_normalize_is_stable() {
        let once = normalize_slug("Some Title_42");
        assert_eq!(normalize_slug(&once), once);
    }

    #[test]
    fn test_file_stem_slug() {
        assert_eq!(file_stem_slug(Path::new("/blog/posts/My_Post 1.md")), "My_Post 1");
        assert_eq!(file_stem_slug(Path::new("about.md")), "about");
    }
}
