use crate::editing::caret::Selection;

/// Stand-in for an empty block in raw serialization. A block whose source is
/// this marker renders as an empty line and unrenders to an empty buffer.
pub const EMPTY_LINE_MARKER: &str = "<br>";

/// Structural category of a rendered block, derived from the top-level
/// element tag of the converted markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Paragraph,
    List,
    OrderedList,
    BlockQuote,
    Code,
    /// Headings, thematic breaks, tables and anything else that never merges.
    Other,
}

impl BlockKind {
    /// Whether two adjacent blocks of this kind may be fused into one.
    pub fn is_mergeable(self) -> bool {
        matches!(
            self,
            BlockKind::List | BlockKind::OrderedList | BlockKind::BlockQuote | BlockKind::Code
        )
    }

    pub(crate) fn from_tag(tag: &str) -> Self {
        match tag {
            "p" => BlockKind::Paragraph,
            "ul" => BlockKind::List,
            "ol" => BlockKind::OrderedList,
            "blockquote" => BlockKind::BlockQuote,
            "pre" => BlockKind::Code,
            _ => BlockKind::Other,
        }
    }

    /// Container tag for kinds whose child elements are spliced on merge.
    pub(crate) fn container_tag(self) -> Option<&'static str> {
        match self {
            BlockKind::List => Some("ul"),
            BlockKind::OrderedList => Some("ol"),
            BlockKind::BlockQuote => Some("blockquote"),
            BlockKind::Code => Some("pre"),
            _ => None,
        }
    }
}

/// A block in its formatted representation.
///
/// `raw` is the exact Markdown source this block was produced from, including
/// intra-block formatting characters; converting it again yields content
/// equivalent to `children`. `text` is the plain-text content of the markup
/// with structural line breaks stripped — the view the caret contract is
/// written against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedBlock {
    pub kind: BlockKind,
    pub raw: String,
    /// Markup fragments, one per child element of the block's container
    /// (a single fragment holding the whole element for non-container kinds).
    pub children: Vec<String>,
    pub text: String,
}

impl RenderedBlock {
    /// Recompose the block's markup from its child fragments.
    pub fn markup(&self) -> String {
        match self.kind.container_tag() {
            Some(tag) => format!("<{tag}>\n{}\n</{tag}>\n", self.children.join("\n")),
            None => self.children.join("\n"),
        }
    }

    /// Plain text of each child fragment, for frontends that draw children
    /// individually (list items, quote lines).
    pub fn child_texts(&self) -> Vec<String> {
        self.children
            .iter()
            .map(|child| crate::parsing::markup::text_content(child))
            .collect()
    }
}

/// A block in its editable representation: a mutable plain-text buffer and a
/// selection in character offsets into that buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditableBlock {
    pub buffer: String,
    pub selection: Selection,
}

impl EditableBlock {
    pub fn new(buffer: impl Into<String>) -> Self {
        Self {
            buffer: buffer.into(),
            selection: Selection::caret(0),
        }
    }
}

/// One entry in the document's block sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Rendered(RenderedBlock),
    Editable(EditableBlock),
}

impl Block {
    pub fn is_editable(&self) -> bool {
        matches!(self, Block::Editable(_))
    }

    pub fn as_rendered(&self) -> Option<&RenderedBlock> {
        match self {
            Block::Rendered(block) => Some(block),
            Block::Editable(_) => None,
        }
    }

    pub fn as_editable(&self) -> Option<&EditableBlock> {
        match self {
            Block::Editable(block) => Some(block),
            Block::Rendered(_) => None,
        }
    }

    /// The text this block contributes to raw serialization: the attached
    /// source for rendered blocks, the buffer for editable ones, and the
    /// empty-line marker when either is empty.
    pub(crate) fn serial_text(&self) -> &str {
        let text = match self {
            Block::Rendered(block) => block.raw.as_str(),
            Block::Editable(block) => block.buffer.as_str(),
        };
        if text.is_empty() { EMPTY_LINE_MARKER } else { text }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mergeable_kinds() {
        assert!(BlockKind::List.is_mergeable());
        assert!(BlockKind::OrderedList.is_mergeable());
        assert!(BlockKind::BlockQuote.is_mergeable());
        assert!(BlockKind::Code.is_mergeable());
        assert!(!BlockKind::Paragraph.is_mergeable());
        assert!(!BlockKind::Other.is_mergeable());
    }

    #[test]
    fn serial_text_substitutes_marker_for_empty_blocks() {
        let editable = Block::Editable(EditableBlock::new(""));
        assert_eq!(editable.serial_text(), EMPTY_LINE_MARKER);

        let editable = Block::Editable(EditableBlock::new("- item"));
        assert_eq!(editable.serial_text(), "- item");

        let rendered = Block::Rendered(RenderedBlock {
            kind: BlockKind::Paragraph,
            raw: String::new(),
            children: vec!["<p><br></p>".to_string()],
            text: String::new(),
        });
        assert_eq!(rendered.serial_text(), EMPTY_LINE_MARKER);
    }

    #[test]
    fn markup_recomposes_container_kinds() {
        let block = RenderedBlock {
            kind: BlockKind::List,
            raw: "- a\n- b".to_string(),
            children: vec!["<li>a</li>".to_string(), "<li>b</li>".to_string()],
            text: "ab".to_string(),
        };
        assert_eq!(block.markup(), "<ul>\n<li>a</li>\n<li>b</li>\n</ul>\n");
    }
}
