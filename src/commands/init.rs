//! Scaffold a new blog folder

use anyhow::Result;
use std::fs;
use std::path::Path;

use crate::config::CONFIG_FILE;

/// Files of the starter blog, relative to the blog folder
const SCAFFOLD: &[(&str, &str)] = &[
    (CONFIG_FILE, include_str!("../../demo/config.yaml")),
    ("posts/hello-world.md", include_str!("../../demo/posts/hello-world.md")),
    ("pages/about.md", include_str!("../../demo/pages/about.md")),
    (
        "templates/includes/base.html",
        include_str!("../../demo/templates/includes/base.html"),
    ),
    (
        "templates/includes/nav.html",
        include_str!("../../demo/templates/includes/nav.html"),
    ),
    (
        "templates/displays/index.html",
        include_str!("../../demo/templates/displays/index.html"),
    ),
    (
        "templates/displays/post.html",
        include_str!("../../demo/templates/displays/post.html"),
    ),
    (
        "templates/displays/page.html",
        include_str!("../../demo/templates/displays/page.html"),
    ),
    (
        "templates/displays/error.html",
        include_str!("../../demo/templates/displays/error.html"),
    ),
    ("static/style.css", include_str!("../../demo/static/style.css")),
];

/// Initialize a new blog in `target_dir`. Refuses to touch a folder that
/// already holds a blog configuration.
pub fn init_site(target_dir: &Path) -> Result<()> {
    if target_dir.join(CONFIG_FILE).exists() {
        anyhow::bail!("{:?} already contains a {}", target_dir, CONFIG_FILE);
    }

    for (relative, content) in SCAFFOLD {
        let path = target_dir.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        if path.exists() {
            tracing::warn!("Keeping existing {:?}", path);
            continue;
        }
        fs::write(&path, content)?;
        tracing::debug!("Created {:?}", path);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use crate::engine::Engine;

    #[test]
    fn test_scaffold_is_a_working_blog() {
        let dir = tempfile::tempdir().unwrap();
        init_site(dir.path()).unwrap();

        let engine = Engine::open(SiteConfig::load(dir.path()).unwrap()).unwrap();
        assert_eq!(
            engine.template_names(),
            vec![
                "error",
                "includes/base.html",
                "includes/nav.html",
                "index",
                "page",
                "post"
            ]
        );

        let index = String::from_utf8(engine.render_index().unwrap()).unwrap();
        assert!(index.contains(r#"<a href="/post/hello-world">Hello World</a>"#));
        assert!(index.contains(r#"<a href="/about">About</a>"#));

        let post = String::from_utf8(engine.render_post("hello-world").unwrap()).unwrap();
        assert!(post.contains(r#"<pre class="highlight">"#));
    }

    #[test]
    fn test_refuses_existing_blog() {
        let dir = tempfile::tempdir().unwrap();
        init_site(dir.path()).unwrap();
        assert!(init_site(dir.path()).is_err());
    }
}
