use tracing::debug;

use crate::editing::block::{Block, EMPTY_LINE_MARKER, EditableBlock, RenderedBlock};
use crate::editing::caret::{CaretTracker, Selection, char_to_byte, to_raw_selection};
use crate::editing::history::{EditablePointer, History, HistoryState};
use crate::editing::merge::{MergeOutcome, try_merge};
use crate::parsing::{BlockConverter, CmarkRenderer, MarkupRenderer};

/// The document: an ordered block sequence plus the state machine that moves
/// blocks between their rendered and editable representations.
///
/// Invariants:
/// - at most one block is editable at any time; transitions that would
///   create a second one resolve the first (render it) within the same call
/// - every rendered block carries the exact Markdown source it was produced
///   from, so switching representations never loses characters
/// - a history entry is pushed before every commit point (render, boundary
///   deletion), so undo always recovers the immediately-prior state
pub struct Document {
    blocks: Vec<Block>,
    history: History,
    converter: BlockConverter,
}

impl Document {
    /// Create a document with a single empty editable line, mirroring a
    /// freshly opened editor.
    pub fn new(renderer: Box<dyn MarkupRenderer>) -> Self {
        let mut document = Self {
            blocks: Vec::new(),
            history: History::new(),
            converter: BlockConverter::new(renderer),
        };
        document.newline(None, None);
        document.push_history();
        document
    }

    /// Replace the whole document with `text`, converting it into rendered
    /// blocks. Returns the index of the last block.
    pub fn open(&mut self, text: &str) -> usize {
        self.blocks.clear();
        let index = self.newline(Some(text), None);
        self.render(index).unwrap_or(index)
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Index of the editable block, if one exists.
    pub fn editable_index(&self) -> Option<usize> {
        self.blocks.iter().position(Block::is_editable)
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Raw serialization of the whole document: each block's source (or
    /// buffer, or the empty-line marker), joined by double line breaks.
    pub fn text(&self) -> String {
        self.blocks
            .iter()
            .map(Block::serial_text)
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// The whole document rendered to markup.
    pub fn html(&self) -> String {
        self.converter.render_markup(&self.text())
    }

    /// Convert a text into rendered blocks without touching the document.
    pub fn convert(&self, text: &str) -> Vec<RenderedBlock> {
        self.converter.convert(text)
    }

    /// Render the editable block at `index`: push a history entry, convert
    /// the buffer, fuse the boundary blocks into structural neighbors of the
    /// same kind, and splice the result in place. Returns the index of the
    /// last inserted or merged block, or `None` if the block is not
    /// editable.
    pub fn render(&mut self, index: usize) -> Option<usize> {
        let buffer = match self.blocks.get(index) {
            Some(Block::Editable(editable)) => editable.buffer.clone(),
            _ => return None,
        };

        // render is the commit point for undo
        self.push_history();

        let mut fresh = self.converter.convert(&buffer);
        debug!(block = index, produced = fresh.len(), "rendering block");

        // boundary fusion backward into the predecessor
        let mut start = index;
        if index > 0
            && let Some(Block::Rendered(previous)) = self.blocks.get(index - 1)
        {
            let first = fresh.remove(0);
            match try_merge(first, previous.clone()) {
                MergeOutcome::Merged(fused) => {
                    fresh.insert(0, fused);
                    start = index - 1;
                }
                MergeOutcome::Unchanged(first, _) => fresh.insert(0, first),
            }
        }

        // boundary fusion forward into the successor
        let mut absorbed_forward = false;
        let successor = match self.blocks.get(index + 1) {
            Some(Block::Rendered(block)) => Some(block.clone()),
            _ => None,
        };
        if let Some(successor) = successor
            && let Some(last) = fresh.pop()
        {
            match try_merge(successor, last) {
                MergeOutcome::Merged(fused) => {
                    self.blocks[index + 1] = Block::Rendered(fused);
                    absorbed_forward = true;
                }
                MergeOutcome::Unchanged(_, last) => fresh.push(last),
            }
        }

        let inserted = fresh.len();
        self.blocks
            .splice(start..index + 1, fresh.into_iter().map(Block::Rendered));

        Some(if absorbed_forward {
            start + inserted
        } else {
            start + inserted - 1
        })
    }

    /// Turn the rendered block at `index` back into an editable one whose
    /// buffer is the attached raw source. `view_selection` is the current
    /// selection in the rendered view (plain-text offsets); both endpoints
    /// are remapped into the raw source. `None` places the caret at the end.
    ///
    /// No-op (`None`) if the block is already editable.
    pub fn unrender(&mut self, index: usize, view_selection: Option<Selection>) -> Option<usize> {
        if !matches!(self.blocks.get(index), Some(Block::Rendered(_))) {
            return None;
        }
        let index = self.resolve_active(index);
        self.make_editable(index, view_selection)
    }

    /// [`unrender`](Self::unrender), reading the view selection from a
    /// frontend-supplied tracker after the active editable is resolved.
    pub fn unrender_via(&mut self, index: usize, tracker: &dyn CaretTracker) -> Option<usize> {
        if !matches!(self.blocks.get(index), Some(Block::Rendered(_))) {
            return None;
        }
        let index = self.resolve_active(index);
        let view = self
            .blocks
            .get(index)
            .and_then(Block::as_rendered)
            .and_then(|block| tracker.read(block));
        self.make_editable(index, view)
    }

    /// Insert a new editable line (buffer `text`, or empty) after `after`,
    /// else after the current editable block, else at the end. Any existing
    /// editable block is rendered first, so the new line is the sole one.
    /// Returns the new block's index.
    pub fn newline(&mut self, text: Option<&str>, after: Option<usize>) -> usize {
        let at = if let Some(active) = self.editable_index() {
            let before = self.blocks.len() as isize;
            let last = self.render(active).unwrap_or(active);
            let delta = self.blocks.len() as isize - before;
            match after {
                None => last + 1,
                Some(anchor) if anchor == active => last + 1,
                Some(anchor) if anchor > active => (anchor as isize + delta).max(0) as usize + 1,
                Some(anchor) => anchor + 1,
            }
        } else {
            match after {
                Some(anchor) => anchor + 1,
                None => self.blocks.len(),
            }
        };
        let at = at.min(self.blocks.len());

        debug!(at, "inserting editable line");
        self.blocks
            .insert(at, Block::Editable(EditableBlock::new(text.unwrap_or_default())));
        at
    }

    /// Split the editable block at its caret: the head is rendered, the tail
    /// becomes a new editable line below it. Returns the new line's index.
    pub fn split_line(&mut self) -> Option<usize> {
        let index = self.editable_index()?;
        let (head, tail) = {
            let block = self.blocks[index].as_editable()?;
            let split = char_to_byte(&block.buffer, block.selection.start);
            (
                block.buffer[..split].to_string(),
                block.buffer[split..].to_string(),
            )
        };

        if let Some(Block::Editable(block)) = self.blocks.get_mut(index) {
            block.buffer = head;
        }

        // insert the tail before rendering the head, so the history entry
        // pushed by render still carries the full text
        self.blocks
            .insert(index + 1, Block::Editable(EditableBlock::new(tail)));

        let before = self.blocks.len() as isize;
        self.render(index);
        let delta = self.blocks.len() as isize - before;
        Some(((index + 1) as isize + delta).max(0) as usize)
    }

    /// Caret moved past the start of the editable buffer: the predecessor
    /// becomes editable with the caret at its end, and the old block is
    /// rendered. No-op without a predecessor or with the caret elsewhere.
    pub fn focus_previous(&mut self) -> Option<usize> {
        let index = self.editable_index()?;
        let selection = self.blocks[index].as_editable()?.selection;
        if selection.start != 0 || index == 0 {
            return None;
        }
        let target = index - 1;
        self.make_editable(target, None)?;
        self.render(index);
        Some(target)
    }

    /// Caret moved past the end of the editable buffer: the successor
    /// becomes editable with the caret at its start, and the old block is
    /// rendered. No-op without a successor or with the caret elsewhere.
    pub fn focus_next(&mut self) -> Option<usize> {
        let index = self.editable_index()?;
        let block = self.blocks[index].as_editable()?;
        if block.selection.start != block.buffer.chars().count()
            || index + 1 >= self.blocks.len()
        {
            return None;
        }
        self.make_editable(index + 1, Some(Selection::caret(0)))?;
        let before = self.blocks.len() as isize;
        self.render(index);
        let delta = self.blocks.len() as isize - before;
        Some(((index + 1) as isize + delta).max(0) as usize)
    }

    /// Backspace/delete with a collapsed selection at offset 0: the editable
    /// buffer is appended onto the predecessor's raw source, the editable
    /// block is discarded and the predecessor unrendered with the caret at
    /// the junction. With no predecessor the successor is unrendered
    /// instead; the sole remaining block may not be deleted.
    pub fn delete_at_boundary(&mut self) -> Option<usize> {
        let index = self.editable_index()?;
        let block = self.blocks[index].as_editable()?;
        if block.selection != Selection::caret(0) {
            return None;
        }
        if self.blocks.len() < 2 {
            return None;
        }
        let buffer = block.buffer.clone();

        // one history entry per run of boundary deletes
        if !self.history.is_locked() {
            self.push_history();
            self.history.lock();
        }

        if index > 0 {
            let junction = {
                let Some(Block::Rendered(previous)) = self.blocks.get_mut(index - 1) else {
                    return None;
                };
                if previous.raw == EMPTY_LINE_MARKER {
                    previous.raw.clear();
                }
                let junction = previous.raw.chars().count();
                previous.raw.push_str(&buffer);
                junction
            };
            debug!(block = index, "deleting block into predecessor");
            self.blocks.remove(index);
            let target = self.make_editable(index - 1, None)?;
            if let Some(Block::Editable(editable)) = self.blocks.get_mut(target) {
                editable.selection = Selection::caret(junction);
            }
            Some(target)
        } else {
            debug!(block = index, "deleting block into successor");
            self.blocks.remove(index);
            self.make_editable(0, Some(Selection::caret(0)))
        }
    }

    /// Replace the editable block's buffer and selection (a real edit from
    /// the frontend). The selection is clamped to the buffer.
    pub fn update_editable(&mut self, buffer: String, selection: Selection) -> bool {
        let Some(index) = self.editable_index() else {
            return false;
        };
        let Some(Block::Editable(block)) = self.blocks.get_mut(index) else {
            return false;
        };
        let chars = buffer.chars().count();
        block.buffer = buffer;
        block.selection = Selection::new(selection.start.min(chars), selection.end.min(chars));
        true
    }

    /// Record one history entry before a run of in-place destructive edits.
    /// Locked after the first call; the next successful push (a render, a
    /// divergent edit) re-arms it. Returns whether an entry was recorded.
    pub fn checkpoint(&mut self) -> bool {
        if self.history.is_locked() {
            return false;
        }
        let pushed = self.push_history();
        self.history.lock();
        pushed
    }

    /// Step back one history state and rebuild the document from it.
    pub fn undo(&mut self) {
        self.push_history();
        if let Some(state) = self.history.back().cloned() {
            self.restore(state);
        }
    }

    /// Step forward one history state and rebuild the document from it.
    /// A no-op once divergent edits have discarded the redo branch.
    pub fn redo(&mut self) {
        self.push_history();
        if let Some(state) = self.history.forward().cloned() {
            self.restore(state);
        }
    }

    /// Serialize the document plus the editable pointer into the history.
    fn push_history(&mut self) -> bool {
        let editable = self.editable_index().and_then(|index| {
            self.blocks[index].as_editable().map(|block| EditablePointer {
                index,
                selection: block.selection,
            })
        });
        self.history.push(HistoryState {
            text: self.text(),
            editable,
        })
    }

    /// Rebuild the whole document from a history state, restoring the
    /// editable block at the recorded index and selection.
    fn restore(&mut self, state: HistoryState) {
        debug!("rebuilding document from history");
        self.blocks = self
            .converter
            .convert(&state.text)
            .into_iter()
            .map(Block::Rendered)
            .collect();

        if let Some(pointer) = state.editable
            && !self.blocks.is_empty()
        {
            let index = pointer.index.min(self.blocks.len() - 1);
            if let Some(Block::Rendered(block)) = self.blocks.get(index) {
                // the marker is stripped before the raw is reused as a buffer
                let buffer = if block.raw == EMPTY_LINE_MARKER {
                    String::new()
                } else {
                    block.raw.clone()
                };
                let chars = buffer.chars().count();
                let selection = Selection::new(
                    pointer.selection.start.min(chars),
                    pointer.selection.end.min(chars),
                );
                self.blocks[index] = Block::Editable(EditableBlock { buffer, selection });
            }
        }
    }

    /// Render the active editable block, if any, and re-locate `index`
    /// through the splice. If boundary fusion consumed the target block, the
    /// fused block now sitting at its position is the one to use.
    fn resolve_active(&mut self, index: usize) -> usize {
        let Some(active) = self.editable_index() else {
            return index;
        };
        let before = self.blocks.len() as isize;
        self.render(active);
        let delta = self.blocks.len() as isize - before;
        let index = if index > active {
            (index as isize + delta).max(0) as usize
        } else {
            index
        };
        index.min(self.blocks.len().saturating_sub(1))
    }

    /// Replace the rendered block at `index` with its editable form,
    /// remapping the view selection into the raw source. The caret clamps to
    /// the end of the buffer when no view selection exists.
    fn make_editable(&mut self, index: usize, view_selection: Option<Selection>) -> Option<usize> {
        let Some(Block::Rendered(block)) = self.blocks.get(index) else {
            return None;
        };
        let raw = block.raw.clone();
        let text = block.text.clone();
        let buffer = if raw == EMPTY_LINE_MARKER {
            String::new()
        } else {
            raw
        };

        let selection = match view_selection {
            Some(view) => to_raw_selection(&buffer, &text, view),
            None => Selection::caret(buffer.chars().count()),
        };

        debug!(block = index, "unrendering block");
        self.blocks[index] = Block::Editable(EditableBlock { buffer, selection });
        Some(index)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new(Box::new(CmarkRenderer::default()))
    }
}
