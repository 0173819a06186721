//! Per-block change records and their diff artifacts

use mapper_blocks::BlockKind;
use mapper_fs::{MapperPath, NormalizedPath, io};

use crate::Result;
use crate::diff::{ChangeSummary, unified_diff};

/// One block whose text was replaced during a document pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockChange {
    /// 1-based position of the block among the located blocks
    pub sequence: usize,
    pub kind: BlockKind,
    /// The statement `id` attribute, when present
    pub id: Option<String>,
    /// Extracted statement text before the transform
    pub original: String,
    /// Text that went into the document
    pub replacement: String,
    /// The replacement is a failure marker, not converted text
    pub failed: bool,
}

impl BlockChange {
    /// Line counts between the original and the replacement.
    pub fn summary(&self) -> ChangeSummary {
        ChangeSummary::compute(&self.original, &self.replacement)
    }
}

/// A unified diff for one changed block, addressed by document and position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeRecord {
    /// Document path relative to the input root
    pub relative_path: NormalizedPath,
    pub sequence: usize,
    pub kind: BlockKind,
    pub id: Option<String>,
    pub diff: String,
}

impl ChangeRecord {
    pub fn new(
        relative_path: NormalizedPath,
        sequence: usize,
        kind: BlockKind,
        id: Option<String>,
        original: &str,
        converted: &str,
    ) -> Self {
        Self {
            relative_path,
            sequence,
            kind,
            id,
            diff: unified_diff(original, converted),
        }
    }

    /// Where the diff lives under the diffs directory: `<path>.<sequence>.diff`.
    pub fn artifact_path(&self) -> NormalizedPath {
        self.relative_path
            .with_suffix(&format!(".{}.diff", self.sequence))
    }

    /// Write the diff to `output_root/__diffs__/<artifact path>`.
    pub fn write_to(&self, output_root: &NormalizedPath) -> Result<NormalizedPath> {
        let target = output_root
            .join(MapperPath::DiffsDir.as_str())
            .join(self.artifact_path().as_str());
        io::write_text(&target, &self.diff)?;
        tracing::debug!(path = %target, "wrote change record");
        Ok(target)
    }
}

/// One record per changed block, in block order.
///
/// Blocks whose diff comes out empty (whitespace-only differences) are not
/// recorded.
pub fn record_changes(relative_path: &NormalizedPath, changes: &[BlockChange]) -> Vec<ChangeRecord> {
    changes
        .iter()
        .map(|change| {
            ChangeRecord::new(
                relative_path.clone(),
                change.sequence,
                change.kind,
                change.id.clone(),
                &change.original,
                &change.replacement,
            )
        })
        .filter(|record| !record.diff.is_empty())
        .collect()
}
