//! Insertion of generated text into host documents.

use std::collections::HashMap;

use tracing::{debug, warn};

/// Where generated text lands in a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertionAnchor {
    /// Just before the closing brace of the named type's body.
    EndOfTypeBody(String),
    /// Byte offset into the document.
    Offset(usize),
    EndOfDocument,
}

/// Host-side document editing.
pub trait DocumentTextSink {
    /// Insert `text` into `document` at `anchor`; `false` when the anchor
    /// cannot be located or the document is unknown.
    fn insert(&mut self, document: &str, text: &str, anchor: &InsertionAnchor) -> bool;
}

/// Apply `anchor` to `source`, returning the edited text.
pub fn apply_anchor(source: &str, text: &str, anchor: &InsertionAnchor) -> Option<String> {
    match anchor {
        InsertionAnchor::EndOfTypeBody(type_name) => {
            splice_before_type_close(source, type_name, text)
        }
        InsertionAnchor::Offset(offset) => {
            if *offset > source.len() || !source.is_char_boundary(*offset) {
                return None;
            }
            let mut edited = String::with_capacity(source.len() + text.len());
            edited.push_str(&source[..*offset]);
            edited.push_str(text);
            edited.push_str(&source[*offset..]);
            Some(edited)
        }
        InsertionAnchor::EndOfDocument => {
            let mut edited = source.to_string();
            if !edited.is_empty() && !edited.ends_with('\n') {
                edited.push('\n');
            }
            edited.push_str(text);
            Some(edited)
        }
    }
}

/// Documents held in memory, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDocuments {
    documents: HashMap<String, String>,
}

impl InMemoryDocuments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(mut self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.documents.insert(name.into(), text.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.documents.get(name).map(String::as_str)
    }
}

impl DocumentTextSink for InMemoryDocuments {
    fn insert(&mut self, document: &str, text: &str, anchor: &InsertionAnchor) -> bool {
        let Some(source) = self.documents.get(document) else {
            warn!(document, "document not found");
            return false;
        };
        match apply_anchor(source, text, anchor) {
            Some(edited) => {
                self.documents.insert(document.to_string(), edited);
                true
            }
            None => {
                warn!(document, ?anchor, "insertion point not found");
                false
            }
        }
    }
}

/// Byte offset of the closing brace of `type_name`'s body.
///
/// Braces inside comments, string literals and character literals are not
/// counted.
pub fn locate_type_body_end(source: &str, type_name: &str) -> Option<usize> {
    if type_name.is_empty() {
        return None;
    }
    let code = code_mask(source);
    let bytes = source.as_bytes();
    let mut search_from = 0;

    while let Some(start) = find_declaration(source, &code, type_name, search_from) {
        search_from = start + type_name.len();

        let mut position = start;
        let open = loop {
            if position >= bytes.len() {
                return None;
            }
            if code[position] {
                match bytes[position] {
                    b'{' => break Some(position),
                    b';' => break None,
                    _ => {}
                }
            }
            position += 1;
        };
        let Some(open) = open else {
            continue;
        };

        let mut depth = 0usize;
        for (offset, byte) in bytes.iter().enumerate().skip(open) {
            if !code[offset] {
                continue;
            }
            match byte {
                b'{' => depth += 1,
                b'}' => {
                    depth -= 1;
                    if depth == 0 {
                        debug!(type_name, offset, "type body end located");
                        return Some(offset);
                    }
                }
                _ => {}
            }
        }
        return None;
    }
    None
}

/// Insert `block` before the closing brace of `type_name`, indented one level
/// deeper than the brace.
pub fn splice_before_type_close(source: &str, type_name: &str, block: &str) -> Option<String> {
    let close = locate_type_body_end(source, type_name)?;
    let line_start = source[..close].rfind('\n').map_or(0, |idx| idx + 1);
    let prefix = &source[line_start..close];
    let brace_indent: String = prefix
        .chars()
        .take_while(|ch| ch.is_whitespace())
        .collect();
    let inner = format!("{brace_indent}    ");

    let mut indented = String::new();
    for line in block.lines() {
        if line.trim().is_empty() {
            indented.push('\n');
        } else {
            indented.push_str(&inner);
            indented.push_str(line);
            indented.push('\n');
        }
    }

    let mut edited = String::with_capacity(source.len() + indented.len() + 1);
    if prefix.trim().is_empty() {
        // The brace sits on its own line.
        edited.push_str(&source[..line_start]);
        if !edited.is_empty() && !edited.ends_with("\n\n") && !edited.trim_end().ends_with('{') {
            edited.push('\n');
        }
        edited.push_str(&indented);
        edited.push_str(&source[line_start..]);
    } else {
        edited.push_str(source[..close].trim_end());
        edited.push('\n');
        edited.push_str(&indented);
        edited.push_str(&brace_indent);
        edited.push_str(&source[close..]);
    }
    Some(edited)
}

/// Start offset of a `class`/`struct`/`record`/`interface` declaration of
/// `type_name`, outside comments and literals.
fn find_declaration(source: &str, code: &[bool], type_name: &str, from: usize) -> Option<usize> {
    const KEYWORDS: [&str; 4] = ["class", "struct", "record", "interface"];
    let tail = source.get(from..)?;

    for (found, _) in tail.match_indices(type_name) {
        let start = from + found;
        let end = start + type_name.len();

        if !code[start] || !is_boundary(source, start, end) {
            continue;
        }
        let before = source[..start].trim_end();
        if KEYWORDS.iter().any(|keyword| {
            before.ends_with(keyword)
                && before.len() >= keyword.len()
                && before[..before.len() - keyword.len()]
                    .chars()
                    .next_back()
                    .is_none_or(|ch| !is_ident_char(ch))
        }) {
            return Some(start);
        }
    }
    None
}

fn is_boundary(source: &str, start: usize, end: usize) -> bool {
    let before_ok = source[..start]
        .chars()
        .next_back()
        .is_none_or(|ch| !is_ident_char(ch));
    let after_ok = source[end..].chars().next().is_none_or(|ch| !is_ident_char(ch));
    before_ok && after_ok
}

fn is_ident_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

/// `true` for each byte that is code rather than comment or literal content.
fn code_mask(source: &str) -> Vec<bool> {
    #[derive(Clone, Copy, PartialEq)]
    enum State {
        Code,
        LineComment,
        BlockComment,
        Str,
        Verbatim,
        Char,
    }

    let bytes = source.as_bytes();
    let mut mask = vec![true; bytes.len()];
    let mut state = State::Code;
    let mut idx = 0;

    while idx < bytes.len() {
        let byte = bytes[idx];
        let next = bytes.get(idx + 1).copied();
        match state {
            State::Code => match (byte, next) {
                (b'/', Some(b'/')) => {
                    state = State::LineComment;
                    mask[idx] = false;
                }
                (b'/', Some(b'*')) => {
                    state = State::BlockComment;
                    mask[idx] = false;
                    mask[idx + 1] = false;
                    idx += 1;
                }
                (b'@', Some(b'"')) => {
                    state = State::Verbatim;
                    mask[idx] = false;
                    mask[idx + 1] = false;
                    idx += 1;
                }
                (b'"', _) => {
                    state = State::Str;
                    mask[idx] = false;
                }
                (b'\'', _) => {
                    state = State::Char;
                    mask[idx] = false;
                }
                _ => {}
            },
            State::LineComment => {
                if byte == b'\n' {
                    state = State::Code;
                } else {
                    mask[idx] = false;
                }
            }
            State::BlockComment => {
                mask[idx] = false;
                if byte == b'*' && next == Some(b'/') {
                    mask[idx + 1] = false;
                    idx += 1;
                    state = State::Code;
                }
            }
            State::Str | State::Char => {
                mask[idx] = false;
                let quote = if state == State::Str { b'"' } else { b'\'' };
                if byte == b'\\' && next.is_some() {
                    mask[idx + 1] = false;
                    idx += 1;
                } else if byte == quote || byte == b'\n' {
                    state = State::Code;
                }
            }
            State::Verbatim => {
                mask[idx] = false;
                if byte == b'"' {
                    if next == Some(b'"') {
                        mask[idx + 1] = false;
                        idx += 1;
                    } else {
                        state = State::Code;
                    }
                }
            }
        }
        idx += 1;
    }
    mask
}
