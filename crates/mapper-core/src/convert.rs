//! Conversion of the statements in one mapper document

use mapper_blocks::{BlockKind, BodyEdit, extract, locate_blocks, splice_body, splice_document};
use mapper_content::BlockChange;
use mapper_transform::TransformAdapter;

/// Result of converting one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionOutcome {
    /// At least one block body was replaced
    pub changed: bool,
    /// The converted document; the input itself when nothing changed
    pub text: String,
    /// Replaced blocks, in document order
    pub changes: Vec<BlockChange>,
}

impl ConversionOutcome {
    /// Number of blocks whose transform failed.
    pub fn failed_blocks(&self) -> usize {
        self.changes.iter().filter(|c| c.failed).count()
    }
}

/// Rewrites the statement blocks of a document through a transform adapter.
pub struct DocumentConverter<'a> {
    adapter: TransformAdapter<'a>,
    kinds: Vec<BlockKind>,
}

impl<'a> DocumentConverter<'a> {
    /// A converter for all statement kinds.
    pub fn new(adapter: TransformAdapter<'a>) -> Self {
        Self {
            adapter,
            kinds: BlockKind::ALL.to_vec(),
        }
    }

    /// Restrict conversion to the given kinds.
    pub fn with_kinds(mut self, kinds: &[BlockKind]) -> Self {
        self.kinds = kinds.to_vec();
        self
    }

    pub fn kinds(&self) -> &[BlockKind] {
        &self.kinds
    }

    /// Convert every located block, one at a time, in document order.
    ///
    /// Text outside the replaced bodies is copied through unchanged, and a
    /// block whose replacement matches its extracted text keeps its
    /// original bytes. A failed transform leaves a marked copy of the
    /// original statement in place and does not stop later blocks.
    pub fn convert(&self, document: &str) -> ConversionOutcome {
        let blocks = locate_blocks(document, &self.kinds);
        let mut edits = Vec::new();
        let mut changes = Vec::new();

        for (index, block) in blocks.iter().enumerate() {
            let sequence = index + 1;
            let id = block.statement_id();
            tracing::debug!(
                kind = %block.kind,
                id = id.unwrap_or("-"),
                sequence,
                line = block.line(document),
                "converting block"
            );

            let extracted = extract(&block.body);
            let result = self.adapter.run(&extracted.text);
            let replacement = result.replacement();

            let Some(body) = splice_body(&extracted, &replacement) else {
                tracing::trace!(sequence, "block unchanged");
                continue;
            };

            edits.push(BodyEdit {
                span: block.body_span.clone(),
                body,
            });
            changes.push(BlockChange {
                sequence,
                kind: block.kind,
                id: id.map(str::to_string),
                original: extracted.text,
                replacement,
                failed: result.is_failed(),
            });
        }

        if edits.is_empty() {
            return ConversionOutcome {
                changed: false,
                text: document.to_string(),
                changes,
            };
        }

        ConversionOutcome {
            changed: true,
            text: splice_document(document, &edits),
            changes,
        }
    }
}
