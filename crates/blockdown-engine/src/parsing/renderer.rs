//! The opaque Markdown-to-markup conversion dependency.

use pulldown_cmark::{Event, Parser, html};

/// Options recognized by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Render soft line breaks as hard breaks, so a single newline inside a
    /// paragraph becomes a `<br>`.
    pub breaks: bool,
    /// Escape raw HTML found in the source instead of passing it through.
    pub sanitize: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            breaks: true,
            sanitize: true,
        }
    }
}

/// Markdown-to-markup conversion. Implementations must be deterministic;
/// idempotence on already-converted output is not required, and the grammar
/// is the implementation's own affair.
pub trait MarkupRenderer {
    fn render_markup(&self, text: &str) -> String;
}

/// [`MarkupRenderer`] backed by pulldown-cmark.
#[derive(Debug, Clone, Default)]
pub struct CmarkRenderer {
    options: RenderOptions,
}

impl CmarkRenderer {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }
}

impl MarkupRenderer for CmarkRenderer {
    fn render_markup(&self, text: &str) -> String {
        let options = self.options;
        let events = Parser::new(text).map(move |event| match event {
            Event::SoftBreak if options.breaks => Event::HardBreak,
            // re-emitting raw HTML as text gets it escaped by the writer
            Event::Html(markup) if options.sanitize => Event::Text(markup),
            Event::InlineHtml(markup) if options.sanitize => Event::Text(markup),
            other => other,
        });

        let mut out = String::new();
        html::push_html(&mut out, events);
        out
    }
}
