//! Substitution of replacement statement text into block bodies and
//! documents.

use std::ops::Range;

use crate::escape::{
    CDATA_CLOSE, Segment, breaks_markup, cdata_inner, has_markup_sensitive, segments,
    sole_cdata, unescape_xml, wrap_cdata,
};
use crate::extract::{Extracted, split_layout};

/// Replacement text for one block body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BodyEdit {
    /// Byte range of the body in the original document.
    pub span: Range<usize>,
    /// New body text.
    pub body: String,
}

/// Build the new body for a block, or `None` when nothing changed.
///
/// The replacement counts as unchanged when it equals the extracted text
/// after trimming surrounding whitespace; the caller then keeps the original
/// bytes. For a body that was a single CDATA section, a replacement that
/// echoes the section markers is compared by its content. Otherwise:
///
/// - a replacement without dynamic-SQL tags is wrapped in a CDATA section if
///   the body used one or if the replacement holds `<`, `>` or `&` (entities
///   decoded first, since CDATA content is literal); otherwise it goes in as
///   plain text;
/// - a replacement with dynamic-SQL tags keeps its tags, comments and CDATA
///   sections as written, and only text runs that would break the markup get
///   wrapped.
///
/// The original leading and trailing layout of the body is reused.
pub fn splice_body(extracted: &Extracted, replacement: &str) -> Option<String> {
    let (_, core, _) = split_layout(replacement);
    let compared = match sole_cdata(core.trim()) {
        Some(inner) if extracted.is_sole_cdata() => inner,
        _ => core,
    };
    if compared.trim() == extracted.text.trim() {
        return None;
    }

    let segs = segments(core);
    let (leading, trailing) = extracted.outer_layout();

    if segs.iter().any(Segment::is_markup) {
        let rebuilt: String = segs.iter().map(protect_segment).collect();
        return Some(format!("{leading}{rebuilt}{trailing}"));
    }

    if !extracted.uses_literal_escape && !has_markup_sensitive(core) {
        return Some(extracted.with_text(core));
    }

    let literal = flatten(&segs);
    if extracted.is_sole_cdata() {
        let escaped = literal.replace(CDATA_CLOSE, "]]]]><![CDATA[>");
        return Some(extracted.with_text(&escaped));
    }

    let multiline = !leading.is_empty() || !trailing.is_empty() || literal.contains('\n');
    let wrapped = if multiline {
        wrap_cdata(&format!("\n{literal}\n"))
    } else {
        wrap_cdata(&literal)
    };
    Some(format!("{leading}{wrapped}{trailing}"))
}

/// Literal statement text: entities decoded, CDATA markers dropped.
fn flatten(segs: &[Segment<'_>]) -> String {
    segs.iter()
        .map(|seg| match seg {
            Segment::Cdata(raw) => cdata_inner(raw).to_string(),
            other => unescape_xml(other.raw()),
        })
        .collect()
}

fn protect_segment(seg: &Segment<'_>) -> String {
    match seg {
        Segment::Text(raw) if breaks_markup(raw) => {
            let content = raw.trim();
            let start = raw.len() - raw.trim_start().len();
            let end = start + content.len();
            format!(
                "{}{}{}",
                &raw[..start],
                wrap_cdata(&unescape_xml(content)),
                &raw[end..]
            )
        }
        other => other.raw().to_string(),
    }
}

/// Apply body edits to a document.
///
/// Edits must be ordered by position and must not overlap; text outside the
/// edited spans is copied through unchanged. An edit that breaks ordering is
/// skipped.
pub fn splice_document(document: &str, edits: &[BodyEdit]) -> String {
    let extra: usize = edits.iter().map(|e| e.body.len()).sum();
    let mut out = String::with_capacity(document.len() + extra);
    let mut cursor = 0;

    for edit in edits {
        let valid = edit.span.start >= cursor
            && edit.span.start <= edit.span.end
            && edit.span.end <= document.len();
        if !valid {
            tracing::warn!(span = ?edit.span, cursor, "skipping out-of-order body edit");
            continue;
        }
        out.push_str(&document[cursor..edit.span.start]);
        out.push_str(&edit.body);
        cursor = edit.span.end;
    }

    out.push_str(&document[cursor..]);
    out
}
