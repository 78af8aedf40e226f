/*!
 * # Editing Core Module
 *
 * The block synchronization engine: every piece of content lives in exactly
 * one of two representations at a time, and this module keeps the two
 * convertible without losing characters or the caret.
 *
 * ## Architecture Overview
 *
 * ### 1. Two representations per block
 * - A **Rendered** block holds formatted markup plus the exact Markdown
 *   source (`raw`) that produced it. Re-converting `raw` always reproduces
 *   content equivalent to the rendered form.
 * - An **Editable** block holds only a plain-text buffer and a selection.
 *   At most one block is Editable at any time.
 *
 * ### 2. State machine on the document
 * - `Document` owns the ordered block sequence and exposes the transitions:
 *   `render` (Editable → Rendered, with boundary fusion into structural
 *   neighbors), `unrender` (Rendered → Editable, with caret remapping from
 *   the formatted view into the raw source), `newline`, the boundary
 *   navigation/deletion transitions, and `undo`/`redo`.
 *
 * ### 3. Caret mapping
 * - The rendered view exposes offsets into plain text (formatting characters
 *   absent, structural line breaks stripped); the editable view exposes
 *   offsets into the raw source. `caret::map_index` converts between the two
 *   by walking both strings in lockstep.
 *
 * ### 4. Bounded history
 * - `history::History` keeps up to five whole-document snapshots (raw
 *   serialization plus the editable block's position and selection), with
 *   dirty-checking, redo invalidation on divergent pushes, and a lock that
 *   coalesces runs of destructive keypresses into one entry.
 *
 * ## Module Structure
 *
 * - **`block`**: the `Block` variants, kinds and the empty-line marker
 * - **`caret`**: selection type, index mapper, view-selection trait
 * - **`merge`**: fusion of adjacent structural blocks of identical kind
 * - **`document`**: the `Document` state machine tying it all together
 * - **`history`**: the bounded undo/redo stack
 */

pub mod block;
pub mod caret;
pub mod document;
pub mod history;
pub mod merge;

// Public API re-exports
pub use block::{Block, BlockKind, EMPTY_LINE_MARKER, EditableBlock, RenderedBlock};
pub use caret::{CaretTracker, Selection, map_index};
pub use document::Document;
pub use history::{History, HistoryState, MAX_STATES};
pub use merge::{MergeOutcome, try_merge};
