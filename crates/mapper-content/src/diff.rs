//! Unified diffs of statement text

use serde::Serialize;
use similar::{ChangeTag, TextDiff};

/// Header for the original side of a statement diff
pub const ORIGINAL_HEADER: &str = "original_sql";
/// Header for the converted side of a statement diff
pub const CONVERTED_HEADER: &str = "converted_sql";

const CONTEXT_LINES: usize = 3;

/// Line-oriented unified diff of two statement texts.
///
/// Both sides are trimmed and end with a single newline before diffing, so
/// indentation changes around the statement do not show up and no
/// "no newline at end of file" markers appear. Identical inputs give an
/// empty string.
pub fn unified_diff(original: &str, converted: &str) -> String {
    let old = normalize(original);
    let new = normalize(converted);
    if old == new {
        return String::new();
    }

    TextDiff::from_lines(&old, &new)
        .unified_diff()
        .context_radius(CONTEXT_LINES)
        .missing_newline_hint(false)
        .header(ORIGINAL_HEADER, CONVERTED_HEADER)
        .to_string()
}

fn normalize(text: &str) -> String {
    let trimmed = text.trim();
    let mut out = String::with_capacity(trimmed.len() + 1);
    for line in trimmed.lines() {
        out.push_str(line);
        out.push('\n');
    }
    out
}

/// Line counts for one statement change
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChangeSummary {
    /// Lines only in the converted text
    pub inserted: usize,
    /// Lines only in the original text
    pub deleted: usize,
    /// Similarity ratio (0.0 to 1.0)
    pub similarity: f32,
}

impl ChangeSummary {
    /// Summarize the line changes between two statement texts
    pub fn compute(original: &str, converted: &str) -> Self {
        let old = normalize(original);
        let new = normalize(converted);
        let diff = TextDiff::from_lines(&old, &new);

        let (mut inserted, mut deleted) = (0, 0);
        for change in diff.iter_all_changes() {
            match change.tag() {
                ChangeTag::Insert => inserted += 1,
                ChangeTag::Delete => deleted += 1,
                ChangeTag::Equal => {}
            }
        }

        Self {
            inserted,
            deleted,
            similarity: diff.ratio(),
        }
    }

    /// True when neither side has lines the other lacks
    pub fn is_empty(&self) -> bool {
        self.inserted == 0 && self.deleted == 0
    }
}
