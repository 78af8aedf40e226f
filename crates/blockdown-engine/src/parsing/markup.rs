//! Minimal scanning over renderer output.
//!
//! The markup handled here is always produced by a [`MarkupRenderer`]
//! implementation, so it is well-formed: tags balance, and `<`, `>` and `&`
//! inside text and attribute values arrive entity-escaped. The scanner only
//! needs to track element depth, never parse a grammar.
//!
//! [`MarkupRenderer`]: crate::parsing::MarkupRenderer

/// Tags that never have a closing counterpart.
const VOID_TAGS: &[&str] = &["br", "hr", "img"];

/// Split markup into its top-level elements, skipping inter-element
/// whitespace (and any stray top-level text, which the DOM would treat as a
/// text node rather than a child element).
pub(crate) fn split_top_level(markup: &str) -> Vec<String> {
    let bytes = markup.as_bytes();
    let mut elements = Vec::new();
    let mut pos = 0;

    while pos < markup.len() {
        if bytes[pos].is_ascii_whitespace() {
            pos += 1;
            continue;
        }
        if bytes[pos] != b'<' {
            pos = markup[pos..]
                .find('<')
                .map_or(markup.len(), |offset| pos + offset);
            continue;
        }
        let end = element_end(markup, pos);
        elements.push(markup[pos..end].to_string());
        pos = end;
    }

    elements
}

/// The tag name of an element's opening tag.
pub(crate) fn tag_name(element: &str) -> &str {
    let inner = element
        .strip_prefix('<')
        .unwrap_or(element)
        .trim_start_matches('/');
    inner
        .split(|c: char| c.is_ascii_whitespace() || c == '>' || c == '/')
        .next()
        .unwrap_or("")
}

/// Split an element into its child elements (e.g. the `<li>`s of a `<ul>`).
/// Returns an empty list when the element has no child elements.
pub(crate) fn child_elements(element: &str) -> Vec<String> {
    let name = tag_name(element);
    let Some(open_end) = element.find('>') else {
        return Vec::new();
    };
    let close = format!("</{name}>");
    let Some(inner_end) = element.rfind(&close) else {
        return Vec::new();
    };
    if inner_end < open_end + 1 {
        return Vec::new();
    }
    split_top_level(&element[open_end + 1..inner_end])
}

/// The plain text of a markup fragment: tags dropped, entities decoded,
/// line breaks stripped (structural line breaks between child elements carry
/// no content).
pub(crate) fn text_content(markup: &str) -> String {
    let mut text = String::with_capacity(markup.len());
    let mut rest = markup;

    while let Some(lt) = rest.find('<') {
        text.push_str(&rest[..lt]);
        match rest[lt..].find('>') {
            Some(gt) => rest = &rest[lt + gt + 1..],
            None => rest = "",
        }
    }
    text.push_str(rest);

    html_escape::decode_html_entities(&text)
        .chars()
        .filter(|&c| c != '\n')
        .collect()
}

/// Byte offset one past the end of the element starting at `start` (which
/// must point at its `<`). Falls back to the end of the input on malformed
/// markup rather than failing.
fn element_end(markup: &str, start: usize) -> usize {
    let bytes = markup.as_bytes();
    let mut depth = 0usize;
    let mut pos = start;

    while pos < markup.len() {
        if bytes[pos] != b'<' {
            pos += 1;
            continue;
        }
        let Some(gt) = markup[pos..].find('>').map(|offset| pos + offset) else {
            return markup.len();
        };
        let tag_body = &markup[pos + 1..gt];
        if tag_body.starts_with('/') {
            depth = depth.saturating_sub(1);
        } else {
            let name = tag_body
                .split(|c: char| c.is_ascii_whitespace() || c == '/')
                .next()
                .unwrap_or("");
            let self_contained = tag_body.ends_with('/') || VOID_TAGS.contains(&name);
            if !self_contained {
                depth += 1;
            }
        }
        pos = gt + 1;
        if depth == 0 {
            return pos;
        }
    }

    markup.len()
}
