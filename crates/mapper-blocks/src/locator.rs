//! Lexical location of statement blocks.
//!
//! Scans raw document text for `<kind ...>body</kind>` regions:
//! ```text
//! <update id="touch">
//!   UPDATE t SET ts = SYSDATE
//! </update>
//! ```
//!
//! The body ends at the first end tag of the same kind. Comments and CDATA
//! sections are skipped while scanning, both between blocks and inside them,
//! so an end tag written inside either never closes a block.

use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;

use crate::kind::BlockKind;

const COMMENT_OPEN: &str = "<!--";
const COMMENT_CLOSE: &str = "-->";
const CDATA_OPEN: &str = "<![CDATA[";
const CDATA_CLOSE: &str = "]]>";
const PI_OPEN: &str = "<?";
const PI_CLOSE: &str = "?>";

static ID_ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:^|\s)id\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("Invalid id attribute regex")
});

/// A located statement block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// Which statement element this is.
    pub kind: BlockKind,
    /// Verbatim text between the tag name and the `>` of the opening tag.
    pub attributes: String,
    /// Verbatim text between the opening and closing tags.
    pub body: String,
    /// Byte range of the whole block, opening tag through closing tag.
    pub span: Range<usize>,
    /// Byte range of `attributes`.
    pub attributes_span: Range<usize>,
    /// Byte range of `body`.
    pub body_span: Range<usize>,
}

impl Block {
    /// The statement `id` attribute, if present.
    pub fn statement_id(&self) -> Option<&str> {
        let caps = ID_ATTRIBUTE.captures(&self.attributes)?;
        caps.get(1).or_else(|| caps.get(2)).map(|m| m.as_str())
    }

    /// The opening tag as it appears in `document`.
    pub fn open_tag<'a>(&self, document: &'a str) -> &'a str {
        &document[self.span.start..self.body_span.start]
    }

    /// The closing tag as it appears in `document`.
    pub fn close_tag<'a>(&self, document: &'a str) -> &'a str {
        &document[self.body_span.end..self.span.end]
    }

    /// 1-based line of the opening tag.
    pub fn line(&self, document: &str) -> usize {
        document[..self.span.start].matches('\n').count() + 1
    }
}

/// An opening tag that matched one of the requested kinds.
struct OpenTag {
    kind: BlockKind,
    attributes: Range<usize>,
    end: usize,
    self_closing: bool,
}

/// Locate every block of the given kinds, in document order.
///
/// Blocks never overlap: scanning resumes after the end tag of each block.
/// Opening tags without a matching end tag and self-closing tags are
/// skipped.
pub fn locate_blocks(document: &str, kinds: &[BlockKind]) -> Vec<Block> {
    let mut blocks = Vec::new();
    if kinds.is_empty() {
        return blocks;
    }

    let mut pos = 0;
    while let Some(rel) = document[pos..].find('<') {
        let start = pos + rel;
        let rest = &document[start..];

        if let Some(next) = skip_opaque(document, start) {
            pos = next;
            continue;
        }
        if rest.starts_with("<!") {
            pos = skip_declaration(document, start);
            continue;
        }

        let Some(open) = open_tag_at(document, start, kinds) else {
            pos = start + 1;
            continue;
        };

        if open.self_closing {
            pos = open.end;
            continue;
        }

        match close_tag_from(document, open.end, open.kind) {
            Some(close) => {
                blocks.push(Block {
                    kind: open.kind,
                    attributes: document[open.attributes.clone()].to_string(),
                    body: document[open.end..close.start].to_string(),
                    span: start..close.end,
                    attributes_span: open.attributes,
                    body_span: open.end..close.start,
                });
                pos = close.end;
            }
            None => {
                tracing::debug!(
                    kind = %open.kind,
                    offset = start,
                    "opening tag has no matching end tag, skipping"
                );
                pos = open.end;
            }
        }
    }

    blocks
}

/// Find the first block whose `id` attribute equals `id`.
pub fn find_statement(document: &str, kinds: &[BlockKind], id: &str) -> Option<Block> {
    locate_blocks(document, kinds)
        .into_iter()
        .find(|block| block.statement_id() == Some(id))
}

/// Skip a comment, CDATA section or processing instruction starting at
/// `start`. Unterminated sections are not skipped.
fn skip_opaque(document: &str, start: usize) -> Option<usize> {
    let rest = &document[start..];
    let (open, close) = if rest.starts_with(COMMENT_OPEN) {
        (COMMENT_OPEN, COMMENT_CLOSE)
    } else if rest.starts_with(CDATA_OPEN) {
        (CDATA_OPEN, CDATA_CLOSE)
    } else if rest.starts_with(PI_OPEN) {
        (PI_OPEN, PI_CLOSE)
    } else {
        return None;
    };

    let body_start = start + open.len();
    document[body_start..]
        .find(close)
        .map(|rel| body_start + rel + close.len())
}

/// Skip a `<!DOCTYPE ...>` style declaration, including an internal subset.
fn skip_declaration(document: &str, start: usize) -> usize {
    let bytes = document.as_bytes();
    let mut depth = 0usize;
    let mut quote: Option<u8> = None;

    for (i, &b) in bytes.iter().enumerate().skip(start + 2) {
        match (quote, b) {
            (Some(q), _) if b == q => quote = None,
            (Some(_), _) => {}
            (None, b'"' | b'\'') => quote = Some(b),
            (None, b'[') => depth += 1,
            (None, b']') => depth = depth.saturating_sub(1),
            (None, b'>') if depth == 0 => return i + 1,
            _ => {}
        }
    }

    // Unterminated declaration: step over the `<` only
    start + 1
}

fn open_tag_at(document: &str, start: usize, kinds: &[BlockKind]) -> Option<OpenTag> {
    let name_start = start + 1;

    for &kind in kinds {
        let name = kind.tag_name();
        let name_end = name_start + name.len();
        let Some(candidate) = document.get(name_start..name_end) else {
            continue;
        };
        if !candidate.eq_ignore_ascii_case(name) {
            continue;
        }

        // `<selectKey>` must not match `select`
        match document.as_bytes().get(name_end) {
            Some(b) if b.is_ascii_whitespace() || *b == b'>' || *b == b'/' => {}
            _ => continue,
        }

        let gt = find_tag_end(document, name_end)?;
        let attributes = name_end..gt;
        let self_closing = document[attributes.clone()].trim_end().ends_with('/');

        return Some(OpenTag {
            kind,
            attributes,
            end: gt + 1,
            self_closing,
        });
    }

    None
}

/// Index of the `>` closing a tag, ignoring `>` inside quoted attribute values.
pub(crate) fn find_tag_end(document: &str, from: usize) -> Option<usize> {
    let mut quote: Option<u8> = None;

    for (i, &b) in document.as_bytes().iter().enumerate().skip(from) {
        match quote {
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None if b == b'"' || b == b'\'' => quote = Some(b),
            None if b == b'>' => return Some(i),
            // A new tag starting before this one closed: malformed, give up
            None if b == b'<' => return None,
            None => {}
        }
    }

    None
}

/// Span of the first `</kind>` at or after `from`.
fn close_tag_from(document: &str, from: usize, kind: BlockKind) -> Option<Range<usize>> {
    let name = kind.tag_name();
    let mut pos = from;

    while let Some(rel) = document[pos..].find('<') {
        let start = pos + rel;

        if let Some(next) = skip_opaque(document, start) {
            pos = next;
            continue;
        }

        if document[start..].starts_with("</") {
            let name_start = start + 2;
            let name_end = name_start + name.len();
            let matches_name = document
                .get(name_start..name_end)
                .is_some_and(|candidate| candidate.eq_ignore_ascii_case(name));

            if matches_name {
                let tail = &document[name_end..];
                let trimmed = tail.trim_start();
                if trimmed.starts_with('>') {
                    let gt = name_end + (tail.len() - trimmed.len());
                    return Some(start..gt + 1);
                }
            }
        }

        pos = start + 1;
    }

    None
}
