//! Batch conversion of a mapper directory tree
//!
//! Every `*.xml` file under the input directory is converted and written to
//! the same relative path under the output directory, changed or not. Each
//! changed block gets a diff under `__diffs__`, and documents that could not
//! be processed are listed in `conversion_errors.log`.

use serde::{Deserialize, Serialize};

use mapper_content::record_changes;
use mapper_fs::{MapperPath, NormalizedPath, find_mapper_files, io};
use mapper_transform::{TransformAdapter, Transformer};

use crate::config::ConversionConfig;
use crate::convert::DocumentConverter;
use crate::Result;

/// Options for a conversion run
#[derive(Debug, Clone, Default)]
pub struct ConversionOptions {
    /// Convert and report, but write nothing to the output directory
    pub dry_run: bool,
}

/// What happened to one document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentReport {
    /// Path relative to the input directory
    pub path: String,
    pub changed: bool,
    /// Blocks whose body was replaced (failures included)
    pub changed_blocks: usize,
    /// Blocks left with a failure marker
    pub failed_blocks: usize,
    /// Statement lines added across all changed blocks
    pub lines_added: usize,
    /// Statement lines removed across all changed blocks
    pub lines_removed: usize,
    /// Diff artifacts, relative to the diffs directory
    pub diffs: Vec<String>,
}

/// A document that could not be converted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentFailure {
    pub path: String,
    pub message: String,
}

/// Report from a conversion run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionReport {
    pub dry_run: bool,
    /// Converted documents, in path order
    pub documents: Vec<DocumentReport>,
    /// Documents that failed, in the order they were attempted
    pub failures: Vec<DocumentFailure>,
}

impl ConversionReport {
    /// True when every document was processed
    pub fn success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn changed_documents(&self) -> usize {
        self.documents.iter().filter(|d| d.changed).count()
    }

    pub fn failed_blocks(&self) -> usize {
        self.documents.iter().map(|d| d.failed_blocks).sum()
    }

    /// Statement lines added and removed over the whole run.
    pub fn line_totals(&self) -> (usize, usize) {
        self.documents.iter().fold((0, 0), |(added, removed), d| {
            (added + d.lines_added, removed + d.lines_removed)
        })
    }

    /// Render the failure list the way `conversion_errors.log` stores it.
    pub fn error_log(&self) -> String {
        self.failures
            .iter()
            .map(|f| format!("{}: {}\n", f.path, f.message))
            .collect()
    }
}

/// Runs a transformer over every mapper document of a configured tree.
pub struct ConversionEngine<'a> {
    config: ConversionConfig,
    transformer: &'a dyn Transformer,
    options: ConversionOptions,
}

impl<'a> ConversionEngine<'a> {
    pub fn new(config: ConversionConfig, transformer: &'a dyn Transformer) -> Self {
        Self {
            config,
            transformer,
            options: ConversionOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ConversionOptions) -> Self {
        self.options = options;
        self
    }

    pub fn config(&self) -> &ConversionConfig {
        &self.config
    }

    /// Convert the whole tree.
    ///
    /// Invalid configuration and an unreadable input directory are errors.
    /// Anything that goes wrong with a single document is recorded in the
    /// report and the run moves on to the next one.
    pub fn run(&self) -> Result<ConversionReport> {
        self.config.validate()?;

        let input = self.config.input_root();
        let output = self.config.output_root();
        let files = find_mapper_files(&input, std::slice::from_ref(&output))?;
        tracing::info!(
            input = %input,
            output = %output,
            documents = files.len(),
            dry_run = self.options.dry_run,
            "starting conversion"
        );

        let adapter = TransformAdapter::new(
            self.transformer,
            self.config.source_dialect.clone(),
            self.config.target_dialect.clone(),
        );
        let converter = DocumentConverter::new(adapter).with_kinds(&self.config.kinds);

        let mut report = ConversionReport {
            dry_run: self.options.dry_run,
            ..Default::default()
        };

        for path in &files {
            let relative = path
                .relative_to(&input)
                .unwrap_or_else(|| NormalizedPath::new(path.file_name().unwrap_or(path.as_str())));

            match self.convert_document(&converter, path, &relative, &output) {
                Ok(document) => report.documents.push(document),
                Err(e) => {
                    tracing::warn!(path = %relative, error = %e, "document conversion failed");
                    report.failures.push(DocumentFailure {
                        path: relative.to_string(),
                        message: e.to_string(),
                    });
                }
            }
        }

        if !report.failures.is_empty() && !self.options.dry_run {
            let log_path = output.join(MapperPath::ErrorLog.as_str());
            io::write_text(&log_path, &report.error_log())?;
            tracing::warn!(
                failures = report.failures.len(),
                path = %log_path,
                "wrote conversion error log"
            );
        }

        tracing::info!(
            changed = report.changed_documents(),
            failed = report.failures.len(),
            "conversion finished"
        );
        Ok(report)
    }

    fn convert_document(
        &self,
        converter: &DocumentConverter<'_>,
        path: &NormalizedPath,
        relative: &NormalizedPath,
        output: &NormalizedPath,
    ) -> Result<DocumentReport> {
        let document = io::read_text(path)?;
        let outcome = converter.convert(&document);
        let records = record_changes(relative, &outcome.changes);

        if self.options.dry_run {
            tracing::debug!(path = %relative, changed = outcome.changed, "dry run, not writing");
        } else {
            io::write_text(&output.join(relative.as_str()), &outcome.text)?;
            for record in &records {
                record.write_to(output)?;
            }
        }

        let (mut lines_added, mut lines_removed) = (0, 0);
        for change in &outcome.changes {
            let summary = change.summary();
            tracing::debug!(
                path = %relative,
                sequence = change.sequence,
                inserted = summary.inserted,
                deleted = summary.deleted,
                similarity = summary.similarity,
                "block changed"
            );
            lines_added += summary.inserted;
            lines_removed += summary.deleted;
        }

        Ok(DocumentReport {
            path: relative.to_string(),
            changed: outcome.changed,
            changed_blocks: outcome.changes.len(),
            failed_blocks: outcome.failed_blocks(),
            lines_added,
            lines_removed,
            diffs: records
                .iter()
                .map(|r| r.artifact_path().to_string())
                .collect(),
        })
    }
}
