//! Markdown rendering with syntax highlighting and HTML sanitization

use lazy_static::lazy_static;
use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd};
use syntect::html::{ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

lazy_static! {
    static ref DEFAULT_RENDERER: MarkdownRenderer = MarkdownRenderer::new();
}

/// Render a markdown body to sanitized HTML with the shared renderer
pub fn render(markdown: &str) -> String {
    DEFAULT_RENDERER.render(markdown)
}

/// Markdown renderer: markdown -> HTML -> sanitized HTML.
///
/// Holds no mutable state, so one instance can serve concurrent requests.
pub struct MarkdownRenderer {
    syntax_set: SyntaxSet,
    sanitizer: ammonia::Builder<'static>,
}

impl MarkdownRenderer {
    /// Create a new markdown renderer
    pub fn new() -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            sanitizer: ugc_policy(),
        }
    }

    /// Render markdown to sanitized HTML
    pub fn render(&self, markdown: &str) -> String {
        self.sanitize(&self.to_html(markdown))
    }

    /// Strip script-capable and otherwise unsafe markup
    pub fn sanitize(&self, html: &str) -> String {
        self.sanitizer.clean(html).to_string()
    }

    /// Convert markdown to unsanitized HTML
    fn to_html(&self, markdown: &str) -> String {
        let options = Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_GFM;
        let parser = Parser::new_ext(markdown, options);

        let mut events: Vec<Event> = Vec::new();
        let mut code_block: Option<(Option<String>, String)> = None;

        for event in parser {
            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    let lang = match kind {
                        CodeBlockKind::Fenced(lang) => lang
                            .split_whitespace()
                            .next()
                            .map(str::to_string),
                        CodeBlockKind::Indented => None,
                    };
                    code_block = Some((lang, String::new()));
                }
                Event::End(TagEnd::CodeBlock) => {
                    if let Some((lang, code)) = code_block.take() {
                        let highlighted = self.highlight_code(&code, lang.as_deref());
                        events.push(Event::Html(CowStr::from(highlighted)));
                    }
                }
                Event::Text(text) if code_block.is_some() => {
                    if let Some((_, code)) = code_block.as_mut() {
                        code.push_str(&text);
                    }
                }
                _ => events.push(event),
            }
        }

        let mut html_output = String::new();
        html::push_html(&mut html_output, events.into_iter());
        html_output
    }

    /// Highlight a code block into class-annotated spans
    fn highlight_code(&self, code: &str, lang: Option<&str>) -> String {
        let lang = lang.unwrap_or("text");

        let syntax = self
            .syntax_set
            .find_syntax_by_token(lang)
            .or_else(|| self.syntax_set.find_syntax_by_extension(lang))
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        let mut generator =
            ClassedHTMLGenerator::new_with_class_style(syntax, &self.syntax_set, ClassStyle::Spaced);
        let mut failure = None;
        for line in LinesWithEndings::from(code) {
            if let Err(e) = generator.parse_html_for_line_which_includes_newline(line) {
                failure = Some(e);
                break;
            }
        }

        let body = match failure {
            None => generator.finalize(),
            Some(e) => {
                tracing::debug!("Falling back to plain code block for '{}': {}", lang, e);
                html_escape(code)
            }
        };

        format!(
            r#"<pre class="highlight"><code class="language-{}">{}</code></pre>"#,
            html_escape(lang),
            body
        )
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Sanitizer policy for user-generated content: standard formatting, links
/// and images survive; scripts, styles, event handlers and unknown tags do
/// not. `class` is kept on code markup for highlighting.
fn ugc_policy() -> ammonia::Builder<'static> {
    let mut builder = ammonia::Builder::default();
    builder
        .add_tag_attributes("pre", &["class"])
        .add_tag_attributes("code", &["class"])
        .add_tag_attributes("span", &["class"])
        .add_tag_attributes("input", &["type", "checked", "disabled"])
        .add_tags(&["input"])
        .link_rel(Some("nofollow noopener noreferrer"));
    builder
}

/// Simple HTML escaping
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
