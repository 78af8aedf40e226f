pub mod editing;
pub mod io;
pub mod parsing;

// Re-export key types for easier usage
pub use editing::block::{Block, BlockKind, EMPTY_LINE_MARKER, EditableBlock, RenderedBlock};
pub use editing::caret::{CaretTracker, Selection, map_index, to_raw_selection};
pub use editing::document::Document;
pub use editing::history::{EditablePointer, History, HistoryState, MAX_STATES};
pub use editing::merge::{MergeOutcome, try_merge};
pub use parsing::{BlockConverter, CmarkRenderer, MarkupRenderer, RenderOptions};
