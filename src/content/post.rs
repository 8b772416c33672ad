//! Post and Page models

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::FrontMatterRecord;
use crate::error::ContentError;
use crate::helpers::{parse_publish_date, UrlResolver};

/// Anything that can appear as a titled, linkable item
pub trait Entry {
    /// Display title
    fn title(&self) -> &str;

    /// Canonical path or external URL
    fn url(&self) -> &str;

    /// Raw markdown body (empty for plain links)
    fn content(&self) -> &str;
}

/// A dated blog post
#[derive(Debug, Clone, Serialize)]
pub struct Post {
    pub title: String,
    pub subtitle: String,
    /// Publication date at midnight UTC
    pub published: DateTime<Utc>,
    /// Slug (lowercase, `[a-z-]` only)
    pub slug: String,
    /// Canonical path, resolved at load time
    pub url: String,
    /// Raw markdown body
    pub raw: String,
}

impl Post {
    /// Build a post from a parsed file. Posts require a valid publish date.
    pub fn from_record(
        record: FrontMatterRecord,
        resolver: &dyn UrlResolver,
    ) -> Result<Self, ContentError> {
        let date = record.publish_date.ok_or(ContentError::MissingDate)?;
        let published = parse_publish_date(&date)?;
        let url = resolver.post(&record.slug);

        Ok(Self {
            title: record.title,
            subtitle: record.subtitle.unwrap_or_default(),
            published,
            slug: record.slug,
            url,
            raw: record.body,
        })
    }
}

impl Entry for Post {
    fn title(&self) -> &str {
        &self.title
    }

    fn url(&self) -> &str {
        &self.url
    }

    fn content(&self) -> &str {
        &self.raw
    }
}

/// A standalone page
#[derive(Debug, Clone, Serialize)]
pub struct Page {
    pub title: String,
    pub slug: String,
    pub url: String,
    pub raw: String,
}

impl Page {
    /// Build a page from a parsed file. `date` and `subtitle` are ignored.
    pub fn from_record(record: FrontMatterRecord, resolver: &dyn UrlResolver) -> Self {
        let url = resolver.page(&record.slug);
        Self {
            title: record.title,
            slug: record.slug,
            url,
            raw: record.body,
        }
    }
}

impl Entry for Page {
    fn title(&self) -> &str {
        &self.title
    }

    fn url(&self) -> &str {
        &self.url
    }

    fn content(&self) -> &str {
        &self.raw
    }
}

/// A configured external navigation link
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationLink {
    pub title: String,
    pub url: String,
}

impl NavigationLink {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
        }
    }
}

impl Entry for NavigationLink {
    fn title(&self) -> &str {
        &self.title
    }

    fn url(&self) -> &str {
        &self.url
    }

    fn content(&self) -> &str {
        ""
    }
}
