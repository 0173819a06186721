//! Extraction of statement text from a block body.

use crate::escape::{CDATA_CLOSE, CDATA_OPEN, cdata_terminated, sole_cdata};

/// Statement text pulled out of a block body, plus what is needed to put a
/// replacement back with the same layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extracted {
    /// The statement as the transform should see it.
    pub text: String,
    /// The body contains a `<![CDATA[` section.
    pub uses_literal_escape: bool,
    pub(crate) layout: Layout,
}

/// How `text` sits inside the original body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Layout {
    /// `leading` + text + `trailing`
    Plain { leading: String, trailing: String },
    /// `leading` + `<![CDATA[` + `inner_leading` + text + `inner_trailing` + `]]>` + `trailing`
    Cdata {
        leading: String,
        trailing: String,
        inner_leading: String,
        inner_trailing: String,
    },
    /// The whole body, untouched
    Raw,
}

impl Extracted {
    /// Rebuild the body this was extracted from.
    pub fn restore(&self) -> String {
        self.with_text(&self.text)
    }

    /// Put `text` where the statement was, keeping the original layout.
    pub(crate) fn with_text(&self, text: &str) -> String {
        match &self.layout {
            Layout::Plain { leading, trailing } => format!("{leading}{text}{trailing}"),
            Layout::Cdata {
                leading,
                trailing,
                inner_leading,
                inner_trailing,
            } => format!(
                "{leading}{CDATA_OPEN}{inner_leading}{text}{inner_trailing}{CDATA_CLOSE}{trailing}"
            ),
            Layout::Raw => text.to_string(),
        }
    }

    /// The body was exactly one CDATA section.
    pub fn is_sole_cdata(&self) -> bool {
        matches!(self.layout, Layout::Cdata { .. })
    }

    /// Whitespace kept around the statement text.
    pub(crate) fn outer_layout(&self) -> (&str, &str) {
        match &self.layout {
            Layout::Plain { leading, trailing } | Layout::Cdata { leading, trailing, .. } => {
                (leading, trailing)
            }
            Layout::Raw => ("", ""),
        }
    }
}

/// Extract statement text from a block body.
///
/// Nothing is unescaped or re-indented. Only presentational blank lines are
/// set aside: whitespace before the content up to its last newline (the
/// first line keeps its indentation) and whitespace after the content from
/// its first newline on. A body that is a single CDATA section yields the
/// section's content without the markers.
///
/// A body with an unterminated CDATA section is returned whole, with
/// `uses_literal_escape` false.
pub fn extract(body: &str) -> Extracted {
    let uses_literal_escape = body.contains(CDATA_OPEN);

    if uses_literal_escape && !cdata_terminated(body) {
        tracing::debug!("unterminated CDATA section, using raw block body");
        return Extracted {
            text: body.to_string(),
            uses_literal_escape: false,
            layout: Layout::Raw,
        };
    }

    let (leading, core, trailing) = split_layout(body);

    let section = core.trim_start();
    if uses_literal_escape && let Some(inner) = sole_cdata(section) {
        // First-line indentation before the section belongs to the layout
        let leading = &body[..leading.len() + core.len() - section.len()];
        let (inner_leading, text, inner_trailing) = split_layout(inner);
        return Extracted {
            text: text.to_string(),
            uses_literal_escape,
            layout: Layout::Cdata {
                leading: leading.to_string(),
                trailing: trailing.to_string(),
                inner_leading: inner_leading.to_string(),
                inner_trailing: inner_trailing.to_string(),
            },
        };
    }

    Extracted {
        text: core.to_string(),
        uses_literal_escape,
        layout: Layout::Plain {
            leading: leading.to_string(),
            trailing: trailing.to_string(),
        },
    }
}

/// Split text into `(leading, core, trailing)` presentational layout.
///
/// `leading` runs to the last line break before the content; `trailing`
/// starts at the first line break after it. Whitespace-only text is all
/// `leading`.
pub(crate) fn split_layout(text: &str) -> (&str, &str, &str) {
    let trimmed_start = text.trim_start();
    if trimmed_start.is_empty() {
        return (text, "", "");
    }

    let ws_len = text.len() - trimmed_start.len();
    let lead_len = text[..ws_len].rfind('\n').map_or(0, |i| i + 1);

    let content_end = text.trim_end().len();
    let trailing_ws = &text[content_end..];
    let trail_start = content_end
        + trailing_ws
            .find(['\r', '\n'])
            .unwrap_or(trailing_ws.len());

    (
        &text[..lead_len],
        &text[lead_len..trail_start],
        &text[trail_start..],
    )
}
