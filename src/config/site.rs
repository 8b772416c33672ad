//! Site configuration (config.yaml)

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the configuration file inside the blog folder
pub const CONFIG_FILE: &str = "config.yaml";

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Blog folder the configuration was loaded from
    #[serde(skip)]
    pub base: PathBuf,

    pub server: ServerConfig,
    pub meta: MetaConfig,
    pub author: AuthorConfig,

    /// Navigation links, label -> URL, in file order
    pub links: IndexMap<String, String>,

    /// Number of posts listed on the index page
    pub latest_posts: usize,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base: PathBuf::from("."),
            server: ServerConfig::default(),
            meta: MetaConfig::default(),
            author: AuthorConfig::default(),
            links: IndexMap::new(),
            latest_posts: 10,
        }
    }
}

impl SiteConfig {
    /// Load `config.yaml` from a blog folder, falling back to defaults if it
    /// does not exist
    pub fn load<P: AsRef<Path>>(folder: P) -> Result<Self> {
        let folder = folder.as_ref();
        let path = folder.join(CONFIG_FILE);

        let mut config = if path.exists() {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("failed to read {:?}", path))?;
            Self::from_yaml(&content).with_context(|| format!("failed to parse {:?}", path))?
        } else {
            tracing::warn!("No {} in {:?}, using defaults", CONFIG_FILE, folder);
            Self::default()
        };

        config.base = folder.to_path_buf();
        Ok(config)
    }

    /// Parse configuration from YAML text
    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Path of the favicon file, if one is configured
    pub fn favicon_path(&self) -> Option<PathBuf> {
        if self.meta.favicon.is_empty() {
            None
        } else {
            Some(self.base.join(&self.meta.favicon))
        }
    }
}

/// HTTP listener settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub address: String,
    pub port: u16,
    /// Expose `POST /admin/reload`
    pub admin_reload: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1".to_string(),
            port: 8080,
            admin_reload: false,
        }
    }
}

/// Blog metadata shown on every page
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetaConfig {
    pub title: String,
    pub subtitle: String,
    pub country: String,
    /// Favicon path relative to the blog folder
    pub favicon: String,
}

impl Default for MetaConfig {
    fn default() -> Self {
        Self {
            title: "Bloggy".to_string(),
            subtitle: String::new(),
            country: String::new(),
            favicon: String::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthorConfig {
    pub name: String,
    pub email: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SiteConfig::default();
        assert_eq!(config.meta.title, "Bloggy");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.latest_posts, 10);
        assert!(!config.server.admin_reload);
    }

    #[test]
    fn test_parse_config() {
        let yaml = r#"
server:
  port: 9000
meta:
  title: My Blog
  subtitle: Notes
author:
  name: Test User
  email: test@example.com
links:
  Zeta: https://zeta.example.com
  Alpha: https://alpha.example.com
latest_posts: 3
"#;
        let config = SiteConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.address, "127.0.0.1");
        assert_eq!(config.meta.title, "My Blog");
        assert_eq!(config.author.email, "test@example.com");
        assert_eq!(config.latest_posts, 3);

        let labels: Vec<_> = config.links.keys().cloned().collect();
        assert_eq!(labels, vec!["Zeta", "Alpha"]);
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = SiteConfig::load(dir.path()).unwrap();
        assert_eq!(config.base, dir.path());
        assert_eq!(config.meta.title, "Bloggy");
        assert!(config.favicon_path().is_none());
    }
}
