//! Conversion of raw Markdown text into rendered blocks.
//!
//! The Markdown grammar itself lives behind the opaque [`MarkupRenderer`]
//! seam; this module partitions the renderer's output into one block per
//! top-level structural element and attributes to each block the exact raw
//! substring that produced it.

pub(crate) mod markup;
pub mod renderer;

pub use renderer::{CmarkRenderer, MarkupRenderer, RenderOptions};

use crate::editing::block::{BlockKind, EMPTY_LINE_MARKER, RenderedBlock};
use crate::editing::caret::{char_to_byte, map_index};

/// Converts raw text into rendered blocks, carrying the raw source along.
pub struct BlockConverter {
    renderer: Box<dyn MarkupRenderer>,
}

impl BlockConverter {
    pub fn new(renderer: Box<dyn MarkupRenderer>) -> Self {
        Self { renderer }
    }

    /// Run a text through the renderer without block partitioning.
    pub fn render_markup(&self, text: &str) -> String {
        self.renderer.render_markup(text)
    }

    /// Convert `text` into one rendered block per top-level structural
    /// element. Empty input (or a bare empty-line marker, which raw
    /// serialization produces for empty blocks) yields the placeholder
    /// block: an empty line whose raw is the marker.
    ///
    /// Raw attribution finds, for every block but the last, the point where
    /// the block's plain text is exhausted in the remaining input, then
    /// extends to the next line break to pick up trailing formatting
    /// characters the plain text omits. Known limitation: setext headings
    /// (a line of text underlined with `=` or `-`) can split on the wrong
    /// line, because the underline never appears in the rendered text.
    pub fn convert(&self, text: &str) -> Vec<RenderedBlock> {
        if text.is_empty() || text == EMPTY_LINE_MARKER {
            return vec![placeholder_block()];
        }

        let rendered = self.renderer.render_markup(text);
        let elements = markup::split_top_level(&rendered);
        if elements.is_empty() {
            return vec![placeholder_block()];
        }

        let mut blocks = Vec::with_capacity(elements.len());
        let mut remaining = text;
        let last = elements.len() - 1;

        for (position, element) in elements.iter().enumerate() {
            let plain = markup::text_content(element);
            let kind = BlockKind::from_tag(markup::tag_name(element));
            let children = match kind.container_tag() {
                Some(_) => markup::child_elements(element),
                None => vec![element.clone()],
            };

            let raw = if position == last {
                remaining.to_string()
            } else {
                let exhausted = map_index(remaining, &plain, None);
                let mut split = char_to_byte(remaining, exhausted);

                // trailing formatting characters (closing markers) sit
                // between the end of the plain text and the next line break
                while split < remaining.len() && !remaining[split..].starts_with('\n') {
                    split += remaining[split..]
                        .chars()
                        .next()
                        .map_or(1, char::len_utf8);
                }

                let taken = (split + 1).min(remaining.len());
                let raw = remaining[..taken].trim_end_matches('\n').to_string();
                remaining = remaining[taken..].trim_start_matches('\n');
                raw
            };

            blocks.push(RenderedBlock {
                kind,
                raw,
                children,
                text: plain,
            });
        }

        blocks
    }
}

impl Default for BlockConverter {
    fn default() -> Self {
        Self::new(Box::new(CmarkRenderer::default()))
    }
}

fn placeholder_block() -> RenderedBlock {
    RenderedBlock {
        kind: BlockKind::Paragraph,
        raw: EMPTY_LINE_MARKER.to_string(),
        children: vec!["<p><br></p>".to_string()],
        text: String::new(),
    }
}
