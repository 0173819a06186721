//! Failure-containing wrapper around a [`Transformer`]

use crate::{Dialect, Error, Result, Transformer};

/// First line of the replacement written for a failed transform.
pub const FAILURE_MARKER: &str = "-- CONVERSION FAILED:";

/// Outcome of transforming one statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransformResult {
    Converted(String),
    Failed { reason: String, original: String },
}

impl TransformResult {
    fn failed(reason: &str, original: &str) -> Self {
        Self::Failed {
            reason: reason.split_whitespace().collect::<Vec<_>>().join(" "),
            original: original.to_string(),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// Text to put in place of the statement.
    ///
    /// A failure keeps the original statement under a marker line so the
    /// problem is visible in the output document.
    pub fn replacement(&self) -> String {
        match self {
            Self::Converted(text) => text.clone(),
            Self::Failed { reason, original } => {
                format!("{FAILURE_MARKER} {reason}\n{original}")
            }
        }
    }
}

/// Runs a transformer between two dialects, one statement at a time.
pub struct TransformAdapter<'a> {
    transformer: &'a dyn Transformer,
    source: Dialect,
    target: Dialect,
}

impl<'a> TransformAdapter<'a> {
    pub fn new(transformer: &'a dyn Transformer, source: Dialect, target: Dialect) -> Self {
        Self {
            transformer,
            source,
            target,
        }
    }

    pub fn source(&self) -> &Dialect {
        &self.source
    }

    pub fn target(&self) -> &Dialect {
        &self.target
    }

    /// Transform one statement body.
    ///
    /// Never returns an error: whatever goes wrong ends up in
    /// [`TransformResult::Failed`] together with the original body. Blank
    /// bodies are passed through without calling the transformer.
    pub fn run(&self, body: &str) -> TransformResult {
        if body.trim().is_empty() {
            return TransformResult::Converted(body.to_string());
        }

        let outcome = self
            .transformer
            .transform(body, &self.source, &self.target)
            .and_then(|raw| clean_response(&raw, body));

        match outcome {
            Ok(text) => TransformResult::Converted(text),
            Err(e) => {
                tracing::warn!(
                    source = %self.source,
                    target = %self.target,
                    error = %e,
                    "statement transform failed"
                );
                TransformResult::failed(&e.to_string(), body)
            }
        }
    }
}

const LEADING_PROSE: &[&str] = &[
    "here is",
    "here's",
    "sure",
    "certainly",
    "below is",
    "the converted",
    "converted sql",
    "converted query",
];

const TRAILING_PROSE: &[&str] = &[
    "note:",
    "note that",
    "notes:",
    "explanation",
    "this query",
    "this sql",
    "this statement",
    "the query above",
    "in this",
];

/// Trimmed, non-blank lines of the statement sent to the transformer.
struct OriginalLines<'a>(Vec<&'a str>);

impl<'a> OriginalLines<'a> {
    fn new(original: &'a str) -> Self {
        Self(
            original
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .collect(),
        )
    }

    fn contains(&self, line: &str) -> bool {
        self.0.contains(&line.trim())
    }

    fn first(&self) -> Option<&str> {
        self.0.first().copied()
    }

    fn last(&self) -> Option<&str> {
        self.0.last().copied()
    }
}

/// Prefix match that stops at a word boundary, so `sure` does not match
/// `surename` and `in this` does not match `IN this_schema`.
fn starts_with_any(line: &str, prefixes: &[&str]) -> bool {
    let lower = line.trim().to_lowercase();
    prefixes.iter().any(|p| {
        lower.strip_prefix(p).is_some_and(|rest| {
            !rest
                .chars()
                .next()
                .is_some_and(|c| c.is_alphanumeric() || c == '_')
        })
    })
}

fn is_sql_comment(line: &str) -> bool {
    let line = line.trim_start();
    line.starts_with("--") || line.starts_with("/*")
}

/// A response line that reads like commentary around the statement.
///
/// Comment lines and lines the original already had are statement text.
fn is_prose(line: &str, prefixes: &[&str], colon_ends: bool, original: &OriginalLines<'_>) -> bool {
    if is_sql_comment(line) || original.contains(line) {
        return false;
    }
    starts_with_any(line, prefixes) || (colon_ends && line.trim_end().ends_with(':'))
}

fn is_blank(line: &&str) -> bool {
    line.trim().is_empty()
}

fn trim_blank_edges(lines: &mut Vec<&str>) {
    while lines.last().is_some_and(is_blank) {
        lines.pop();
    }
    let first = lines.iter().position(|l| !is_blank(l)).unwrap_or(lines.len());
    lines.drain(..first);
}

/// Strip a procedural `BEGIN ... END;` wrapper and a trailing `/` line that
/// the original statement did not have.
fn strip_wrappers(lines: &mut Vec<&str>, original: &OriginalLines<'_>) {
    if lines.last().is_some_and(|l| l.trim() == "/") && original.last() != Some("/") {
        lines.pop();
        trim_blank_edges(lines);
    }

    let had_begin = original
        .first()
        .is_some_and(|l| l.eq_ignore_ascii_case("begin"));
    let wrapped = lines.len() >= 2
        && lines[0].trim().eq_ignore_ascii_case("begin")
        && lines
            .last()
            .is_some_and(|l| matches!(l.trim().to_ascii_uppercase().as_str(), "END" | "END;"));
    if wrapped && !had_begin {
        lines.remove(0);
        lines.pop();
        trim_blank_edges(lines);
    }
}

/// Reduce a raw transformer response to statement text.
///
/// Code fences, leading and trailing prose lines, and procedural wrappers
/// or a statement terminator the original did not have are removed. A line
/// the original contains is never treated as prose, and neither is a SQL
/// comment. Leading blank lines and trailing whitespace go too; indentation
/// of the first statement line is kept. An empty result is an error.
///
/// Line endings are kept as the response wrote them. A response with bare
/// `\n` endings for a `\r\n` original is given `\r\n` endings.
pub fn clean_response(raw: &str, original: &str) -> Result<String> {
    let original_lines = OriginalLines::new(original);

    let mut lines: Vec<&str> = raw
        .split('\n')
        .filter(|l| !l.trim_start().starts_with("```"))
        .collect();

    let first = lines
        .iter()
        .position(|l| !is_blank(l) && !is_prose(l, LEADING_PROSE, true, &original_lines))
        .unwrap_or(lines.len());
    lines.drain(..first);

    while lines
        .last()
        .is_some_and(|l| is_blank(l) || is_prose(l, TRAILING_PROSE, false, &original_lines))
    {
        lines.pop();
    }

    strip_wrappers(&mut lines, &original_lines);

    let separator = if !raw.contains('\r') && original.contains("\r\n") {
        "\r\n"
    } else {
        "\n"
    };
    let mut text = lines.join(separator).trim_end().to_string();
    if !original.trim_end().ends_with(';')
        && let Some(stripped) = text.strip_suffix(';')
    {
        text = stripped.trim_end().to_string();
    }

    if text.trim().is_empty() {
        return Err(Error::EmptyResponse);
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_replacement_for_failure() {
        let result = TransformResult::failed("HTTP request failed:\n  timed out", "SELECT 1");
        assert!(result.is_failed());
        assert_eq!(
            result.replacement(),
            "-- CONVERSION FAILED: HTTP request failed: timed out\nSELECT 1"
        );
    }

    #[test]
    fn test_clean_keeps_indentation_and_inner_blank_lines() {
        let raw = "\n\n    SELECT a\n\n      FROM t   \n";
        assert_eq!(clean_response(raw, "SELECT a FROM t").unwrap(), "    SELECT a\n\n      FROM t");
    }

    #[test]
    fn test_clean_keeps_terminator_the_original_had() {
        assert_eq!(clean_response("DELETE FROM t;", "DELETE FROM t;").unwrap(), "DELETE FROM t;");
        assert_eq!(clean_response("DELETE FROM t;", "DELETE FROM t").unwrap(), "DELETE FROM t");
    }

    #[test]
    fn test_clean_keeps_begin_block_the_original_had() {
        let original = "BEGIN\n  proc(#{a});\nEND;";
        let raw = "BEGIN\n  CALL proc(#{a});\nEND;";
        assert_eq!(clean_response(raw, original).unwrap(), raw);
    }

    #[test]
    fn test_clean_keeps_crlf_line_endings() {
        let body = "    SELECT a\r\n    FROM t";
        assert_eq!(clean_response(body, body).unwrap(), body);
    }

    #[test]
    fn test_clean_converts_bare_newlines_for_crlf_original() {
        let original = "SELECT a\r\nFROM dual";
        assert_eq!(clean_response("SELECT a\nFROM t\n", original).unwrap(), "SELECT a\r\nFROM t");
    }

    #[test]
    fn test_prose_prefix_needs_word_boundary() {
        assert!(starts_with_any("Sure, here it is", LEADING_PROSE));
        assert!(!starts_with_any("surename = #{s}", LEADING_PROSE));
        assert!(!starts_with_any("IN this_schema.t", TRAILING_PROSE));
    }
}
