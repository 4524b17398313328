use crate::error::{PropMixError, Result};
use crate::extractor::{Extraction, Record, SkippedReport};
use crate::mixture::{parse_blocks, MixtureBlock};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub input_directory: PathBuf,
    pub results_file: PathBuf,
    pub of_ratio: String,
    pub keys_written: usize,
    pub entries: Vec<ReportEntry>,
    pub skipped: Vec<SkippedReport>,
    pub ratio_conflicts: Vec<PathBuf>,
    pub warnings: Vec<String>,
    /// False for dry runs.
    pub appended: bool,
    pub bytes_written: u64,
    pub completed_at: DateTime<Utc>,
    pub duration: Duration,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportEntry {
    pub source: PathBuf,
    pub record: Record,
}

impl RunReport {
    pub fn new(
        input_directory: &Path,
        results_file: &Path,
        block: &MixtureBlock,
        extraction: &Extraction,
        duration: Duration,
    ) -> Self {
        let entries = extraction
            .reports
            .iter()
            .map(|r| ReportEntry {
                source: r.path.clone(),
                record: r.record.clone(),
            })
            .collect();

        Self {
            input_directory: input_directory.to_path_buf(),
            results_file: results_file.to_path_buf(),
            of_ratio: block.of_ratio.clone(),
            keys_written: block.key_count(),
            entries,
            skipped: extraction.skipped.clone(),
            ratio_conflicts: extraction
                .ratio_conflicts()
                .into_iter()
                .map(|r| r.path.clone())
                .collect(),
            warnings: Vec::new(),
            appended: false,
            bytes_written: 0,
            completed_at: Utc::now(),
            duration,
        }
    }

    pub fn add_warning<S: Into<String>>(&mut self, warning: S) {
        self.warnings.push(warning.into());
    }
}

/// Appends blocks to the shared results file.
///
/// The file is opened in append mode for every write and never locked, so
/// concurrent runs against the same file may interleave.
pub struct ResultsWriter {
    results_file: PathBuf,
}

impl ResultsWriter {
    pub fn new<P: Into<PathBuf>>(results_file: P) -> Self {
        Self {
            results_file: results_file.into(),
        }
    }

    pub fn append_block(&self, block: &MixtureBlock) -> Result<u64> {
        let content = block.to_string();

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.results_file)
            .map_err(|e| self.write_error(e))?;

        file.write_all(content.as_bytes())
            .map_err(|e| self.write_error(e))?;
        file.flush().map_err(|e| self.write_error(e))?;

        tracing::debug!(
            path = %self.results_file.display(),
            bytes = content.len(),
            keys = block.key_count(),
            "Appended block"
        );

        Ok(content.len() as u64)
    }

    /// Reads back every block the results file holds.
    pub fn read_blocks(&self) -> Result<Vec<MixtureBlock>> {
        let text =
            fs::read_to_string(&self.results_file).map_err(|e| PropMixError::ResultsRead {
                path: self.results_file.clone(),
                source: e,
            })?;
        parse_blocks(&text)
    }

    fn write_error(&self, source: std::io::Error) -> PropMixError {
        PropMixError::OutputWrite {
            path: self.results_file.clone(),
            source,
        }
    }
}
