//! Fusion of adjacent structural blocks of identical kind.

use crate::editing::block::RenderedBlock;

/// Result of a merge attempt. Failure hands both inputs back untouched so
/// callers can treat it as "no merge happened" rather than an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    Merged(RenderedBlock),
    Unchanged(RenderedBlock, RenderedBlock),
}

/// Fuse `second` into `first`.
///
/// Succeeds only when both blocks have the identical, merge-eligible kind
/// (list, ordered list, blockquote, code). On success all child fragments of
/// `second` are prepended, in original order, into `first`, and `first`'s
/// raw becomes `second.raw + "\n" + first.raw` — `second` is the block that
/// precedes `first` in reading order.
pub fn try_merge(first: RenderedBlock, second: RenderedBlock) -> MergeOutcome {
    if first.kind != second.kind || !first.kind.is_mergeable() {
        return MergeOutcome::Unchanged(first, second);
    }

    let mut merged = second;
    let RenderedBlock { raw, children, text, .. } = first;

    merged.children.extend(children);
    merged.raw.push('\n');
    merged.raw.push_str(&raw);
    merged.text.push_str(&text);

    MergeOutcome::Merged(merged)
}
