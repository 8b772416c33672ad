//! Front-matter parsing

use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::ContentError;
use crate::helpers::{file_stem_slug, normalize_slug};

/// Line that opens and closes the metadata block
const DELIMITER: &str = "---";

/// Metadata keys understood in a content file header. Unknown keys are
/// ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FrontMatter {
    pub title: String,
    pub subtitle: Option<String>,
    pub date: Option<String>,
    pub slug: Option<String>,
}

impl FrontMatter {
    /// Decode a metadata block
    pub fn decode(header: &str) -> Result<Self, ContentError> {
        if header.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(header)?)
    }
}

/// Scanner position while splitting a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    BeforeHeader,
    InHeader,
    InBody,
}

/// Split file contents into `(header, body)`.
///
/// Lines before the first `---` are discarded, lines up to the next `---`
/// form the header and everything after it is the body. Without a closing
/// delimiter the body is empty.
pub fn split(content: &str) -> (String, String) {
    let mut header = String::new();
    let mut body = String::new();
    let mut state = ScanState::BeforeHeader;

    for line in content.lines() {
        match state {
            ScanState::BeforeHeader => {
                if line == DELIMITER {
                    state = ScanState::InHeader;
                }
            }
            ScanState::InHeader => {
                if line == DELIMITER {
                    state = ScanState::InBody;
                } else {
                    header.push_str(line);
                    header.push('\n');
                }
            }
            ScanState::InBody => {
                body.push_str(line);
                body.push('\n');
            }
        }
    }

    (header, body)
}

/// Parsed content file, before it becomes a post or page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontMatterRecord {
    pub title: String,
    pub subtitle: Option<String>,
    /// Raw `date` token, validated only for posts
    pub publish_date: Option<String>,
    /// Normalized slug (lowercase, `[a-z-]` only)
    pub slug: String,
    pub body: String,
}

impl FrontMatterRecord {
    /// Parse file contents. `fallback_slug` is used when the header has no
    /// (or an empty) slug, typically the file's base name.
    pub fn parse(content: &str, fallback_slug: &str) -> Result<Self, ContentError> {
        let (header, body) = split(content);
        let meta = FrontMatter::decode(&header)?;

        let raw_slug = match meta.slug {
            Some(slug) if !slug.is_empty() => slug,
            _ => fallback_slug.to_string(),
        };

        Ok(Self {
            title: meta.title,
            subtitle: meta.subtitle,
            publish_date: meta.date,
            slug: normalize_slug(&raw_slug),
            body,
        })
    }

    /// Read and parse a content file from disk
    pub fn from_file(path: &Path) -> Result<Self, ContentError> {
        let content = fs::read_to_string(path).map_err(|source| ContentError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content, &file_stem_slug(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_front_matter() {
        let content = r#"---
title: Hello World
subtitle: A First Post
date: 2021-Jan-01
slug: Hello-World
---
# Heading

Body text.
"#;

        let record = FrontMatterRecord::parse(content, "ignored").unwrap();
        assert_eq!(record.title, "Hello World");
        assert_eq!(record.subtitle.as_deref(), Some("A First Post"));
        assert_eq!(record.publish_date.as_deref(), Some("2021-Jan-01"));
        assert_eq!(record.slug, "hello-world");
        assert_eq!(record.body, "# Heading\n\nBody text.\n");
    }

    #[test]
    fn test_preamble_is_discarded() {
        let content = "preamble line\nanother\n---\ntitle: T\n---\nbody\n";
        let (header, body) = split(content);
        assert_eq!(header, "title: T\n");
        assert_eq!(body, "body\n");
    }

    #[test]
    fn test_missing_closing_delimiter_yields_empty_body() {
        let content = "---\ntitle: Unclosed\nsome text\n";
        let (header, body) = split(content);
        assert!(header.contains("title: Unclosed"));
        assert!(body.is_empty());
    }

    #[test]
    fn test_no_delimiters_at_all() {
        let record = FrontMatterRecord::parse("just text\nmore text\n", "notes").unwrap();
        assert_eq!(record.title, "");
        assert_eq!(record.slug, "notes");
        assert!(record.body.is_empty());
    }

    #[test]
    fn test_later_delimiters_belong_to_body() {
        let content = "---\ntitle: T\n---\nabove\n---\nbelow\n";
        let (_, body) = split(content);
        assert_eq!(body, "above\n---\nbelow\n");
    }

    #[test]
    fn test_slug_derived_from_file_name() {
        let content = "---\ntitle: Derived\n---\nbody\n";
        let record = FrontMatterRecord::parse(content, "My_Post 1").unwrap();
        assert_eq!(record.slug, "mypost");
    }

    #[test]
    fn test_empty_slug_falls_back_to_file_name() {
        let content = "---\ntitle: Derived\nslug: ''\n---\n";
        let record = FrontMatterRecord::parse(content, "Fallback").unwrap();
        assert_eq!(record.slug, "fallback");
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let content = "---\ntitle: T\ntags: [a, b]\nauthor: someone\n---\nbody\n";
        let record = FrontMatterRecord::parse(content, "t").unwrap();
        assert_eq!(record.title, "T");
    }

    #[test]
    fn test_malformed_header_is_an_error() {
        let content = "---\ntitle: [unterminated\n---\nbody\n";
        let err = FrontMatterRecord::parse(content, "broken").unwrap_err();
        assert!(matches!(err, ContentError::FrontMatter(_)));
    }

    #[test]
    fn test_title_case_is_preserved() {
        let content = "---\ntitle: MiXeD Case Title\n---\n";
        let record = FrontMatterRecord::parse(content, "x").unwrap();
        assert_eq!(record.title, "MiXeD Case Title");
    }

    #[test]
    fn test_crlf_line_endings() {
        let content = "---\r\ntitle: Windows\r\n---\r\nbody\r\n";
        let record = FrontMatterRecord::parse(content, "w").unwrap();
        assert_eq!(record.title, "Windows");
        assert_eq!(record.body, "body\n");
    }

    #[test]
    fn test_from_file_reports_read_errors() {
        let err = FrontMatterRecord::from_file(Path::new("/nonexistent/post.md")).unwrap_err();
        assert!(matches!(err, ContentError::Read { .. }));
    }
}
