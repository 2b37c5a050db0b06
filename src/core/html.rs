// src/core/html.rs
// Tolerant element scanning over rendered HTML.
// ASCII case-insensitive on tag and attribute names. Same-tag nesting is balanced;
// anything fancier (comments containing tags, CDATA) is not handled.

use super::sanitize::{normalize_entities, normalize_ws};

pub fn to_lower(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_ascii() { c.to_ascii_lowercase() } else { c })
        .collect()
}

/// Index one past the `>` closing the tag that starts at `start`, skipping quoted values.
fn open_tag_end(s: &str, start: usize) -> Option<usize> {
    let b = s.as_bytes();
    let mut i = start + 1;
    let (mut in_s, mut in_d) = (false, false);
    while i < b.len() {
        match b[i] {
            b'\'' if !in_d => in_s = !in_s,
            b'"' if !in_s => in_d = !in_d,
            b'>' if !in_s && !in_d => return Some(i + 1),
            _ => {}
        }
        i += 1;
    }
    None
}

/// Next `<tag` at or after `from` in already-lowercased `lc`, with a name boundary
/// (so `<th` never matches `<thead`).
fn find_open(lc: &str, tag: &str, from: usize) -> Option<usize> {
    let pat = format!("<{tag}");
    let mut at = from;
    while let Some(rel) = lc.get(at..)?.find(&pat) {
        let i = at + rel;
        match lc.as_bytes().get(i + pat.len()).copied() {
            Some(b' ' | b'\t' | b'\r' | b'\n' | b'>' | b'/') | None => return Some(i),
            _ => at = i + pat.len(),
        }
    }
    None
}

/// Next `</tag` at or after `from`, with the same name boundary as `find_open`.
fn find_close(lc: &str, tag: &str, from: usize) -> Option<usize> {
    let pat = format!("</{tag}");
    let mut at = from;
    while let Some(rel) = lc.get(at..)?.find(&pat) {
        let i = at + rel;
        match lc.as_bytes().get(i + pat.len()).copied() {
            Some(b' ' | b'\t' | b'\r' | b'\n' | b'>') | None => return Some(i),
            _ => at = i + pat.len(),
        }
    }
    None
}

fn block_from(s: &str, lc: &str, tag: &str, start: usize) -> Option<(usize, usize)> {
    let open_end = open_tag_end(s, start)?;
    if s[..open_end].ends_with("/>") {
        return Some((start, open_end));
    }
    let mut depth = 1usize;
    let mut pos = open_end;
    loop {
        let close = find_close(lc, tag, pos)?;
        match find_open(lc, tag, pos) {
            Some(o) if o < close => {
                depth += 1;
                pos = open_tag_end(s, o)?;
            }
            _ => {
                depth -= 1;
                let end = s[close..].find('>')? + close + 1;
                if depth == 0 {
                    return Some((start, end));
                }
                pos = end;
            }
        }
    }
}

/// Find the next complete `<tag …>…</tag>` block starting at or after `from`.
/// Returns byte offsets `(start, end)` of the whole block.
pub fn next_tag_block_ci(s: &str, tag: &str, from: usize) -> Option<(usize, usize)> {
    let lc = to_lower(s);
    let tag = to_lower(tag);
    let start = find_open(&lc, &tag, from)?;
    block_from(s, &lc, &tag, start)
}

/// Every top-level `tag` block inside `s`, in document order.
pub fn blocks<'a>(s: &'a str, tag: &str) -> Vec<&'a str> {
    let lc = to_lower(s);
    let tag = to_lower(tag);
    let mut out = Vec::new();
    let mut pos = 0usize;
    while let Some(start) = find_open(&lc, &tag, pos) {
        match block_from(s, &lc, &tag, start) {
            Some((b, e)) => {
                out.push(&s[b..e]);
                pos = e;
            }
            None => break,
        }
    }
    out
}

/// Every `tag` element inside `block` (excluding `block` itself) at any depth,
/// in document order. Nested matches are all returned.
pub fn descendants<'a>(block: &'a str, tag: &str) -> Vec<&'a str> {
    let inner = inner_after_open_tag(block);
    let lc = to_lower(inner);
    let tag = to_lower(tag);
    let mut out = Vec::new();
    let mut pos = 0usize;
    while let Some(start) = find_open(&lc, &tag, pos) {
        let Some(open_end) = open_tag_end(inner, start) else { break };
        if let Some((b, e)) = block_from(inner, &lc, &tag, start) {
            out.push(&inner[b..e]);
        }
        pos = open_end;
    }
    out
}

/// The opening tag of a block, `<td class="x">` for `<td class="x">…</td>`.
pub fn open_tag(block: &str) -> &str {
    match open_tag_end(block, 0) {
        Some(e) => &block[..e],
        None => block,
    }
}

/// Text between the opening tag and the final closing tag (may still hold nested tags).
pub fn inner_after_open_tag(block: &str) -> &str {
    if let Some(open_end) = open_tag_end(block, 0) {
        if let Some(close_start) = block.rfind("</") {
            if close_start >= open_end {
                return &block[open_end..close_start];
            }
        }
    }
    ""
}

/// Value of attribute `name` in an opening tag. Handles `"…"`, `'…'` and bare values.
pub fn attr_value<'a>(open: &'a str, name: &str) -> Option<&'a str> {
    let lc = to_lower(open);
    let pat = format!("{}=", to_lower(name));
    let mut at = 0usize;
    while let Some(rel) = lc[at..].find(&pat) {
        let i = at + rel;
        at = i + pat.len();
        // attribute names start after whitespace; rejects `data-id=` when asking for `id`
        if !lc[..i].ends_with(|c: char| c.is_ascii_whitespace()) {
            continue;
        }
        let rest = &open[at..];
        return match rest.as_bytes().first().copied() {
            Some(q @ (b'"' | b'\'')) => {
                let q = q as char;
                rest[1..].find(q).map(|e| &rest[1..1 + e])
            }
            Some(_) => {
                let e = rest
                    .find(|c: char| c.is_ascii_whitespace() || c == '>' || c == '/')
                    .unwrap_or(rest.len());
                Some(&rest[..e])
            }
            None => None,
        };
    }
    None
}

/// `contains(@class, needle)` on the block's opening tag.
pub fn has_class(block: &str, needle: &str) -> bool {
    attr_value(open_tag(block), "class").is_some_and(|c| c.contains(needle))
}

/// First element of any tag whose `id` equals `id` exactly.
pub fn element_by_id<'a>(doc: &'a str, id: &str) -> Option<&'a str> {
    let lc = to_lower(doc);
    let mut at = 0usize;
    while let Some(rel) = lc[at..].find("id=") {
        let i = at + rel;
        at = i + 3;
        let Some(start) = doc[..i].rfind('<') else { continue };
        // still inside that tag?
        if doc[start..i].contains('>') {
            continue;
        }
        let Some(open_end) = open_tag_end(doc, start) else { continue };
        if attr_value(&doc[start..open_end], "id") != Some(id) {
            continue;
        }
        let name_end = doc[start + 1..]
            .find(|c: char| c.is_ascii_whitespace() || c == '>' || c == '/')
            .map(|e| start + 1 + e)?;
        let tag = to_lower(&doc[start + 1..name_end]);
        return block_from(doc, &lc, &tag, start).map(|(b, e)| &doc[b..e]);
    }
    None
}

/// Visible text of a block: tags removed, `&nbsp;`/`&amp;` decoded, whitespace collapsed.
pub fn text_of(block: &str) -> String {
    strip_tags(normalize_entities(inner_after_open_tag(block)))
}

/// Remove all tags `<...>`, then collapse whitespace.
pub fn strip_tags<S: AsRef<str>>(s: S) -> String {
    let s = s.as_ref();

    let mut out = String::with_capacity(s.len());
    let mut in_tag = false;

    for ch in s.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    normalize_ws(&out)
}
