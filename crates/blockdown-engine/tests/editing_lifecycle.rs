//! End-to-end exercises of the editing state machine: load, edit, navigate,
//! merge and undo across representation changes.

use blockdown_engine::{
    Block, BlockKind, Document, EMPTY_LINE_MARKER, Selection,
};

#[test]
fn edit_cycle_preserves_every_character() {
    let mut doc = Document::default();
    doc.open("# Notes\n\nfirst paragraph\n\n- one\n- two");

    // edit the paragraph, render it back
    let index = doc.unrender(1, Some(Selection::caret(0))).unwrap();
    let buffer = doc.blocks()[index].as_editable().unwrap().buffer.clone();
    assert_eq!(buffer, "first paragraph");
    doc.update_editable("first paragraph, edited".to_string(), Selection::caret(23));
    doc.render(index).unwrap();

    insta::assert_snapshot!(
        doc.text(),
        @"# Notes\n\nfirst paragraph, edited\n\n- one\n- two"
    );
}

#[test]
fn appending_a_list_line_fuses_into_the_neighbor() {
    let mut doc = Document::default();
    doc.open("intro\n\n- one\n- two");

    // a new line right after the list, holding another item
    let index = doc.newline(Some("- three"), Some(1));
    doc.render(index).unwrap();

    assert_eq!(doc.blocks().len(), 2);
    let list = doc.blocks()[1].as_rendered().unwrap();
    assert_eq!(list.kind, BlockKind::List);
    insta::assert_snapshot!(list.raw, @"- one\n- two\n- three");
}

#[test]
fn boundary_navigation_walks_the_document() {
    let mut doc = Document::default();
    doc.open("alpha\n\nbeta\n\ngamma");

    // start editing the middle block, walk up, then down twice
    doc.unrender(1, Some(Selection::caret(0))).unwrap();
    let up = doc.focus_previous().unwrap();
    assert_eq!(up, 0);

    doc.focus_next().unwrap();
    let editable = doc.editable_index().unwrap();
    doc.update_editable(
        doc.blocks()[editable].as_editable().unwrap().buffer.clone(),
        Selection::caret(4),
    );
    let down = doc.focus_next().unwrap();
    assert_eq!(down, 2);
    assert_eq!(
        doc.blocks()[2].as_editable().unwrap().buffer,
        "gamma"
    );

    // nothing was lost on the way
    assert_eq!(doc.text(), "alpha\n\nbeta\n\ngamma");
}

#[test]
fn undo_crosses_representation_changes() {
    let mut doc = Document::default();
    doc.update_editable("- a\n- b".to_string(), Selection::caret(7));
    doc.render(0).unwrap();

    let index = doc.newline(Some("- c"), Some(0));
    doc.render(index).unwrap();
    assert_eq!(doc.text(), "- a\n- b\n- c");

    // undo recovers the pre-merge state, with editing focus restored
    doc.undo();
    assert_eq!(doc.text(), "- a\n- b\n\n- c");
    assert!(doc.editable_index().is_some());

    doc.redo();
    assert_eq!(doc.text(), "- a\n- b\n- c");
}

#[test]
fn history_stays_bounded_under_sustained_editing() {
    let mut doc = Document::default();
    for line in ["one", "two", "three", "four", "five", "six", "seven"] {
        let index = doc.newline(Some(line), None);
        doc.render(index).unwrap();
    }

    assert_eq!(doc.history().len(), blockdown_engine::MAX_STATES);

    // walking all the way back stops at the oldest retained state, which is
    // no longer the original empty document
    for _ in 0..10 {
        doc.undo();
    }
    assert_ne!(doc.text(), EMPTY_LINE_MARKER);
}

#[test]
fn empty_document_round_trips_through_the_marker() {
    let mut doc = Document::default();
    doc.render(0).unwrap();
    assert_eq!(doc.text(), EMPTY_LINE_MARKER);

    // the marker becomes an empty buffer again, not literal text
    let index = doc.unrender(0, None).unwrap();
    assert_eq!(doc.blocks()[index].as_editable().unwrap().buffer, "");

    // and replaying history keeps stripping it
    doc.undo();
    match &doc.blocks()[0] {
        Block::Editable(block) => assert_eq!(block.buffer, ""),
        Block::Rendered(block) => assert_eq!(block.raw, EMPTY_LINE_MARKER),
    }
}

#[test]
fn selection_round_trip_with_formatting_characters() {
    let mut doc = Document::default();
    doc.update_editable("some *emphasis* here".to_string(), Selection::caret(0));
    let index = doc.render(0).unwrap();

    // caret after "some em" in the rendered text lands inside the
    // emphasized span of the raw source
    let index = doc.unrender(index, Some(Selection::caret(7))).unwrap();
    let block = doc.blocks()[index].as_editable().unwrap();
    assert_eq!(block.buffer, "some *emphasis* here");
    assert_eq!(block.selection, Selection::caret(8));
}
