// src/extract.rs
//! Link extraction: one raw document in, zero or one graph node out.
//!
//! A document is its `<title>` span plus a `<text>` body. The body is
//! scanned for `[[...]]` wiki links; each surviving link becomes one
//! neighbor entry. Duplicate citations are preserved: a page that cites
//! the same target twice lists it twice.

use crate::record::GraphNode;
use regex::Regex;
use std::sync::LazyLock;

/// Matches the content of a `[[...]]` link up to the first closing bracket.
static LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\[(.+?)\]").unwrap_or_else(|_| panic!("Invalid Regex")));

const MIN_LINK_LEN: usize = 1;
const MAX_LINK_LEN: usize = 100;

/// Characters a link may not start with.
const INVALID_LINK_START: &[char] = &['#', ',', '.', '&', '\'', '-', '{', '|'];

/// Extracts the graph node for one raw document.
///
/// Returns `None` for documents that should be skipped: missing title/body
/// delimiters, or a title that is empty or carries a namespace separator.
/// A valid document with no valid links still yields a node, a dangling
/// one.
#[must_use]
pub fn extract_node(document: &str) -> Option<GraphNode> {
    let (title, body) = parse_document(document)?;
    if is_invalid_title(title) {
        return None;
    }

    let id = title.replace(' ', "_");
    let neighbors: Vec<String> = LINK_RE
        .captures_iter(body)
        .filter_map(|c| normalize_link(c.get(1)?.as_str()))
        .collect();

    Some(GraphNode::seeded(id, neighbors))
}

/// Splits a raw document into its title and body spans.
///
/// Mirrors the dump layout: `<title>...</title>` and the first `<text ...>`
/// element (attributes on the opening tag are skipped). Returns `None` when
/// any delimiter is missing.
fn parse_document(document: &str) -> Option<(&str, &str)> {
    let title_start = document.find("<title>")? + "<title>".len();
    let title_rel_end = document[title_start..].find("</title>")?;
    let title = &document[title_start..title_start + title_rel_end];

    let text_tag = document.find("<text")?;
    let body_start = text_tag + document[text_tag..].find('>')? + 1;
    let body_rel_end = document[body_start..].find("</text>")?;
    let body = &document[body_start..body_start + body_rel_end];

    Some((title, body))
}

fn is_invalid_title(title: &str) -> bool {
    title.is_empty() || title.contains(':')
}

/// Validates and normalizes one raw link body.
///
/// Validity is judged on the raw content; normalization then truncates at
/// the first pipe and section anchor, joins whitespace with underscores,
/// strips literal commas and unescapes `&amp;`.
#[must_use]
pub fn normalize_link(raw: &str) -> Option<String> {
    if is_invalid_link(raw) {
        return None;
    }

    let truncated = truncate_at(truncate_at(raw, '|'), '#');

    let mut link = String::with_capacity(truncated.len());
    for c in truncated.chars() {
        match c {
            c if c.is_whitespace() => link.push('_'),
            ',' => {}
            c => link.push(c),
        }
    }

    Some(link.replace("&amp;", "&"))
}

/// Cuts `link` at the first occurrence of `marker` past the first character.
fn truncate_at(link: &str, marker: char) -> &str {
    match link.find(marker) {
        Some(pos) if pos > 0 => &link[..pos],
        _ => link,
    }
}

fn is_invalid_link(link: &str) -> bool {
    let len = link.chars().count();
    if !(MIN_LINK_LEN..=MAX_LINK_LEN).contains(&len) {
        return true;
    }

    let first = link.chars().next().unwrap_or('#');
    if INVALID_LINK_START.contains(&first) {
        return true;
    }

    if link.contains(':') {
        return true;
    }

    // A bare ampersand past the first character must open an `&amp;` entity.
    match link.find('&') {
        Some(pos) if pos > 0 => !link[pos..].starts_with("&amp;"),
        _ => false,
    }
}
