//! Tera templates loaded from the blog's `templates` folder
//!
//! Shared layout fragments live in `templates/includes/*.html` and are
//! registered as `includes/<file>`. Each file in `templates/displays/*.html`
//! is a displayable template registered under its stem (`post`, `page`,
//! `index`, `error`).

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tera::{Context, Tera};

use crate::cache::RenderContext;
use crate::error::{Error, Result};

/// Folder inside the blog holding all templates
pub const TEMPLATES_FOLDER: &str = "templates";

/// Compiled set of named templates
pub trait TemplateSet: Send + Sync {
    /// Render the template `name` with `ctx` into `out`
    fn render(&self, name: &str, ctx: &RenderContext, out: &mut dyn io::Write) -> Result<()>;

    fn contains(&self, name: &str) -> bool;

    /// Registered template names, sorted
    fn names(&self) -> Vec<String>;
}

/// Somewhere templates can be (re)compiled from
pub trait TemplateSource: Send + Sync {
    fn compile(&self) -> Result<Arc<dyn TemplateSet>>;
}

/// Template set backed by a Tera instance with autoescaping on for every
/// template. Bodies that are already sanitized HTML must be emitted with
/// `| safe`.
#[derive(Clone)]
pub struct TeraTemplates {
    tera: Tera,
}

impl TeraTemplates {
    /// Compile from in-memory `(name, source)` pairs
    pub fn from_raw<N, S>(templates: Vec<(N, S)>) -> Result<Self>
    where
        N: AsRef<str>,
        S: AsRef<str>,
    {
        let mut tera = Tera::default();
        tera.autoescape_on(vec![""]);
        tera.set_escape_fn(escape_html);

        tera.add_raw_templates(
            templates
                .iter()
                .map(|(name, source)| (name.as_ref(), source.as_ref())),
        )
        .map_err(|e| Error::TemplateLoad(describe(&e)))?;

        Ok(Self { tera })
    }

    /// Compile every template under `{root}/includes` and `{root}/displays`
    pub fn load<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref();
        let mut templates = Vec::new();

        for path in html_files(&root.join("includes"))? {
            let name = match path.file_name().and_then(|n| n.to_str()) {
                Some(file) => format!("includes/{}", file),
                None => continue,
            };
            templates.push((name, fs::read_to_string(&path)?));
        }

        for path in html_files(&root.join("displays"))? {
            let name = match path.file_stem().and_then(|n| n.to_str()) {
                Some(stem) => stem.to_string(),
                None => continue,
            };
            tracing::debug!("Registering template '{}' from {:?}", name, path);
            templates.push((name, fs::read_to_string(&path)?));
        }

        let set = Self::from_raw(templates)?;
        tracing::info!("Compiled {} templates from {:?}", set.names().len(), root);
        Ok(set)
    }
}

impl TemplateSet for TeraTemplates {
    fn render(&self, name: &str, ctx: &RenderContext, out: &mut dyn io::Write) -> Result<()> {
        if !self.contains(name) {
            return Err(Error::TemplateNotFound(name.to_string()));
        }

        let context = Context::from_serialize(ctx).map_err(|source| Error::Template {
            name: name.to_string(),
            source,
        })?;

        self.tera
            .render_to(name, &context, out)
            .map_err(|source| Error::Template {
                name: name.to_string(),
                source,
            })
    }

    fn contains(&self, name: &str) -> bool {
        self.tera.get_template_names().any(|n| n == name)
    }

    fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tera.get_template_names().map(str::to_string).collect();
        names.sort();
        names
    }
}

impl TemplateSource for TeraTemplates {
    fn compile(&self) -> Result<Arc<dyn TemplateSet>> {
        Ok(Arc::new(self.clone()))
    }
}

/// Template folder on disk, recompiled on every call
#[derive(Debug, Clone)]
pub struct TemplateDir {
    root: PathBuf,
}

impl TemplateDir {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    /// Template folder of the blog at `base`
    pub fn for_blog(base: &Path) -> Self {
        Self::new(base.join(TEMPLATES_FOLDER))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl TemplateSource for TemplateDir {
    fn compile(&self) -> Result<Arc<dyn TemplateSet>> {
        Ok(Arc::new(TeraTemplates::load(&self.root)?))
    }
}

/// `*.html` files directly inside `dir`, sorted by name. A missing folder
/// yields nothing.
fn html_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        tracing::warn!("Template folder {:?} does not exist", dir);
        return Ok(Vec::new());
    }

    let pattern = dir.join("*.html");
    let pattern = pattern.to_string_lossy();
    let entries = glob::glob(&pattern).map_err(|e| Error::TemplateLoad(e.to_string()))?;

    let mut files = Vec::new();
    for entry in entries {
        match entry {
            Ok(path) if path.is_file() => files.push(path),
            Ok(_) => {}
            Err(e) => return Err(Error::Io(e.into())),
        }
    }
    files.sort();
    Ok(files)
}

/// Escape text for HTML bodies and quoted attributes. Unlike Tera's default
/// `/` is left alone so URLs stay readable.
fn escape_html(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => output.push_str("&amp;"),
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            '"' => output.push_str("&quot;"),
            '\'' => output.push_str("&#x27;"),
            _ => output.push(c),
        }
    }
    output
}

/// Flatten a Tera error and its causes into one line
fn describe(err: &tera::Error) -> String {
    let mut message = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
