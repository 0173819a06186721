//! Literal-escape (`CDATA`) sections, XML entities, and a lexical split of
//! statement text into text and markup segments.

use regex::Regex;
use std::sync::LazyLock;

use crate::locator::find_tag_end;

pub(crate) const CDATA_OPEN: &str = "<![CDATA[";
pub(crate) const CDATA_CLOSE: &str = "]]>";
const COMMENT_OPEN: &str = "<!--";
const COMMENT_CLOSE: &str = "-->";

/// Dynamic-SQL elements that may appear inside a statement body.
///
/// MyBatis 3 elements plus the iBATIS 2 conditional tags still common in
/// older mappers.
const DIRECTIVES: &[&str] = &[
    "if",
    "choose",
    "when",
    "otherwise",
    "where",
    "set",
    "trim",
    "foreach",
    "include",
    "bind",
    "property",
    "selectKey",
    "dynamic",
    "iterate",
    "isEqual",
    "isNotEqual",
    "isGreaterThan",
    "isGreaterEqual",
    "isLessThan",
    "isLessEqual",
    "isNull",
    "isNotNull",
    "isEmpty",
    "isNotEmpty",
    "isPropertyAvailable",
    "isNotPropertyAvailable",
    "isParameterPresent",
    "isNotParameterPresent",
];

static ENTITY_REF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^&(?:[A-Za-z_][A-Za-z0-9._-]*|#[0-9]+|#x[0-9A-Fa-f]+);")
        .expect("Invalid entity reference regex")
});

/// One lexical piece of statement text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    /// Character data, possibly containing entity references.
    Text(&'a str),
    /// A full `<![CDATA[ ... ]]>` section, markers included.
    Cdata(&'a str),
    /// A full `<!-- ... -->` comment.
    Comment(&'a str),
    /// An opening, closing or self-closing dynamic-SQL tag.
    Directive(&'a str),
}

impl<'a> Segment<'a> {
    /// The segment exactly as written.
    pub fn raw(&self) -> &'a str {
        match self {
            Self::Text(s) | Self::Cdata(s) | Self::Comment(s) | Self::Directive(s) => s,
        }
    }

    /// True for segments that carry document structure.
    pub fn is_markup(&self) -> bool {
        matches!(self, Self::Comment(_) | Self::Directive(_))
    }
}

/// Split statement text into segments.
///
/// A `<` that does not open a CDATA section, a comment, or a known
/// dynamic-SQL tag is plain text (`a < b` stays text). Unterminated
/// sections are text as well. Adjacent text is merged.
pub fn segments(text: &str) -> Vec<Segment<'_>> {
    let mut out = Vec::new();
    let mut text_start = 0;
    let mut pos = 0;

    while let Some(rel) = text[pos..].find('<') {
        let start = pos + rel;

        let Some((end, segment)) = markup_at(text, start) else {
            pos = start + 1;
            continue;
        };

        if text_start < start {
            out.push(Segment::Text(&text[text_start..start]));
        }
        out.push(segment);
        text_start = end;
        pos = end;
    }

    if text_start < text.len() {
        out.push(Segment::Text(&text[text_start..]));
    }

    out
}

fn markup_at(text: &str, start: usize) -> Option<(usize, Segment<'_>)> {
    let rest = &text[start..];

    if rest.starts_with(CDATA_OPEN) {
        let rel = rest[CDATA_OPEN.len()..].find(CDATA_CLOSE)?;
        let end = start + CDATA_OPEN.len() + rel + CDATA_CLOSE.len();
        return Some((end, Segment::Cdata(&text[start..end])));
    }

    if rest.starts_with(COMMENT_OPEN) {
        let rel = rest[COMMENT_OPEN.len()..].find(COMMENT_CLOSE)?;
        let end = start + COMMENT_OPEN.len() + rel + COMMENT_CLOSE.len();
        return Some((end, Segment::Comment(&text[start..end])));
    }

    let name_start = if rest.starts_with("</") { start + 2 } else { start + 1 };
    let name_len = text[name_start..]
        .bytes()
        .take_while(|b| b.is_ascii_alphanumeric() || *b == b'_')
        .count();
    let name = &text[name_start..name_start + name_len];
    if !DIRECTIVES.iter().any(|d| d.eq_ignore_ascii_case(name)) {
        return None;
    }

    match text.as_bytes().get(name_start + name_len) {
        Some(b) if b.is_ascii_whitespace() || *b == b'>' || *b == b'/' => {}
        _ => return None,
    }

    let gt = find_tag_end(text, name_start + name_len)?;
    Some((gt + 1, Segment::Directive(&text[start..gt + 1])))
}

/// Inner content of a `<![CDATA[ ... ]]>` segment.
pub fn cdata_inner(raw: &str) -> &str {
    raw.strip_prefix(CDATA_OPEN)
        .and_then(|s| s.strip_suffix(CDATA_CLOSE))
        .unwrap_or(raw)
}

/// If `text` is exactly one CDATA section, its inner content.
pub fn sole_cdata(text: &str) -> Option<&str> {
    let inner = text.strip_prefix(CDATA_OPEN)?.strip_suffix(CDATA_CLOSE)?;
    if inner.contains(CDATA_CLOSE) {
        None
    } else {
        Some(inner)
    }
}

/// True when every `<![CDATA[` in `text` has a closing `]]>`.
pub fn cdata_terminated(text: &str) -> bool {
    let mut pos = 0;
    while let Some(rel) = text[pos..].find(CDATA_OPEN) {
        let body = pos + rel + CDATA_OPEN.len();
        match text[body..].find(CDATA_CLOSE) {
            Some(close) => pos = body + close + CDATA_CLOSE.len(),
            None => return false,
        }
    }
    true
}

/// Wrap text in a CDATA section.
///
/// A `]]>` inside the text is split across two sections so it cannot end
/// the wrapper early.
pub fn wrap_cdata(text: &str) -> String {
    format!(
        "{CDATA_OPEN}{}{CDATA_CLOSE}",
        text.replace(CDATA_CLOSE, "]]]]><![CDATA[>")
    )
}

/// Decode the predefined XML entities and numeric character references.
///
/// Unknown or malformed references are left as written.
pub fn unescape_xml(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];

        let decoded = ENTITY_REF
            .find(rest)
            .and_then(|m| decode_entity(m.as_str()).map(|c| (c, m.end())));

        match decoded {
            Some((c, len)) => {
                out.push(c);
                rest = &rest[len..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

fn decode_entity(entity: &str) -> Option<char> {
    let name = entity.strip_prefix('&')?.strip_suffix(';')?;
    match name {
        "lt" => Some('<'),
        "gt" => Some('>'),
        "amp" => Some('&'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let code = if let Some(hex) = name.strip_prefix("#x") {
                u32::from_str_radix(hex, 16).ok()?
            } else {
                name.strip_prefix('#')?.parse().ok()?
            };
            char::from_u32(code)
        }
    }
}

/// True when the text, once entities are decoded, contains `<`, `>` or `&`.
pub fn has_markup_sensitive(text: &str) -> bool {
    unescape_xml(text).contains(['<', '>', '&'])
}

/// True when the text holds a raw markup character: `<`, `>`, or an `&`
/// that does not start an entity reference.
pub fn breaks_markup(text: &str) -> bool {
    if text.contains(['<', '>']) {
        return true;
    }
    text.match_indices('&')
        .any(|(i, _)| !ENTITY_REF.is_match(&text[i..]))
}
