use crate::error::{PropMixError, Result};
use crate::extractor::field_map::{
    FieldSpec, LAST_REQUIRED_LINE, RATIO_FIELD, RECORD_FIELDS, REPORT_LINES,
};
use crate::scanner::ReportFile;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// One row of the pressure table, kept as the report's own text tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record {
    #[serde(rename = "Pc")]
    pub pc: String,
    #[serde(rename = "Tc")]
    pub tc: String,
    #[serde(rename = "Te")]
    pub te: String,
    #[serde(rename = "Pe")]
    pub pe: String,
    #[serde(rename = "MW")]
    pub mw: String,
    pub gamma: String,
    #[serde(rename = "Mach")]
    pub mach: String,
    #[serde(rename = "Cpc")]
    pub cpc: String,
    #[serde(rename = "Cpe")]
    pub cpe: String,
}

impl Record {
    /// Values in `key = ...` order.
    pub fn values(&self) -> [&str; 9] {
        [
            &self.pc,
            &self.tc,
            &self.te,
            &self.pe,
            &self.mw,
            &self.gamma,
            &self.mach,
            &self.cpc,
            &self.cpe,
        ]
    }
}

/// The selected lines of one report, split into tokens.
#[derive(Debug, Clone)]
pub struct ReportLines {
    path: PathBuf,
    slots: Vec<Vec<String>>,
}

/// Splits on `\n`, `\r\n` and a lone `\r`. A trailing terminator does not
/// start another line.
fn split_lines(text: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        match c {
            '\n' => {
                lines.push(&text[start..i]);
                start = i + 1;
            }
            '\r' => {
                lines.push(&text[start..i]);
                start = i + 1;
                if let Some(&(_, '\n')) = chars.peek() {
                    chars.next();
                    start = i + 2;
                }
            }
            _ => {}
        }
    }
    if start < text.len() {
        lines.push(&text[start..]);
    }

    lines
}

impl ReportLines {
    pub fn parse(path: &Path, text: &str) -> Result<Self> {
        let mut slots = Vec::with_capacity(REPORT_LINES.len());
        let mut line_count = 0;

        for (index, line) in split_lines(text)
            .into_iter()
            .take(LAST_REQUIRED_LINE + 1)
            .enumerate()
        {
            line_count = index + 1;
            if REPORT_LINES.contains(&index) {
                slots.push(line.split_whitespace().map(str::to_string).collect());
            }
        }

        if slots.len() < REPORT_LINES.len() {
            return Err(PropMixError::TooFewLines {
                path: path.to_path_buf(),
                found: line_count,
                required_index: LAST_REQUIRED_LINE,
            });
        }

        Ok(Self {
            path: path.to_path_buf(),
            slots,
        })
    }

    pub fn token(&self, spec: &FieldSpec) -> Result<String> {
        let tokens = &self.slots[spec.slot];
        tokens
            .get(spec.token)
            .cloned()
            .ok_or_else(|| PropMixError::MissingToken {
                path: self.path.clone(),
                line: spec.line_index() + 1,
                token: spec.token,
                field: spec.field.name(),
                found: tokens.len(),
            })
    }
}

/// Fields pulled from a single report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractedReport {
    pub path: PathBuf,
    pub of_ratio: String,
    pub record: Record,
}

#[derive(Debug, Clone, Serialize)]
pub struct SkippedReport {
    pub path: PathBuf,
    pub reason: String,
}

/// Outcome of one pass over the input directory.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    /// Ratio of the last report processed; it keys the whole block.
    pub last_ratio: Option<String>,
    pub reports: Vec<ExtractedReport>,
    pub skipped: Vec<SkippedReport>,
}

impl Extraction {
    pub fn records(&self) -> Vec<Record> {
        self.reports.iter().map(|r| r.record.clone()).collect()
    }

    pub fn key_count(&self) -> usize {
        self.reports.len()
    }

    /// Reports whose ratio differs from the one the block is keyed by.
    pub fn ratio_conflicts(&self) -> Vec<&ExtractedReport> {
        match self.last_ratio {
            Some(ref ratio) => self
                .reports
                .iter()
                .filter(|r| &r.of_ratio != ratio)
                .collect(),
            None => Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExtractionProgress {
    pub files_processed: usize,
    pub total_files: usize,
    pub current_file: Option<String>,
    pub start_time: Instant,
}

impl ExtractionProgress {
    pub fn new(total_files: usize) -> Self {
        Self {
            files_processed: 0,
            total_files,
            current_file: None,
            start_time: Instant::now(),
        }
    }

    pub fn update_file(&mut self, filename: String) {
        self.files_processed += 1;
        self.current_file = Some(filename);
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

pub struct ReportExtractor {
    skip_malformed: bool,
}

impl ReportExtractor {
    pub fn new() -> Self {
        Self {
            skip_malformed: false,
        }
    }

    pub fn with_skip_malformed(mut self, skip: bool) -> Self {
        self.skip_malformed = skip;
        self
    }

    pub fn extract_report(&self, path: &Path) -> Result<ExtractedReport> {
        let bytes = fs::read(path).map_err(|e| PropMixError::ReportRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        // Tokens are copied verbatim, so undecodable bytes cannot be patched over.
        let text = String::from_utf8(bytes).map_err(|e| PropMixError::ReportRead {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidData, e),
        })?;

        let lines = ReportLines::parse(path, &text)?;

        let of_ratio = lines.token(&RATIO_FIELD)?;

        let [pc, tc, te, pe, mw, gamma, mach, cpc, cpe] = &RECORD_FIELDS;
        let record = Record {
            pc: lines.token(pc)?,
            tc: lines.token(tc)?,
            te: lines.token(te)?,
            pe: lines.token(pe)?,
            mw: lines.token(mw)?,
            gamma: lines.token(gamma)?,
            mach: lines.token(mach)?,
            cpc: lines.token(cpc)?,
            cpe: lines.token(cpe)?,
        };

        Ok(ExtractedReport {
            path: path.to_path_buf(),
            of_ratio,
            record,
        })
    }

    /// Extracts every report in listing order. Stops at the first malformed
    /// report unless skipping is enabled.
    pub fn extract_all(
        &self,
        reports: &[ReportFile],
        progress_callback: Option<&dyn Fn(&ExtractionProgress)>,
    ) -> Result<Extraction> {
        let mut progress = ExtractionProgress::new(reports.len());
        let mut extraction = Extraction::default();

        for report in reports {
            if let Some(callback) = progress_callback {
                callback(&progress);
            }

            match self.extract_report(&report.path) {
                Ok(extracted) => {
                    tracing::debug!(
                        file = %report.filename,
                        of_ratio = %extracted.of_ratio,
                        "Extracted report"
                    );
                    extraction.last_ratio = Some(extracted.of_ratio.clone());
                    extraction.reports.push(extracted);
                }
                Err(e) if self.skip_malformed && e.is_malformed_report() => {
                    tracing::debug!(file = %report.filename, error = %e, "Skipping report");
                    extraction.skipped.push(SkippedReport {
                        path: report.path.clone(),
                        reason: e.to_string(),
                    });
                }
                Err(e) => return Err(e),
            }

            progress.update_file(report.filename.clone());
        }

        if let Some(callback) = progress_callback {
            callback(&progress);
        }

        Ok(extraction)
    }
}

impl Default for ReportExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{report_text, write_report, ReportValues};
    use std::cell::Cell;
    use tempfile::TempDir;

    fn report_file(path: PathBuf) -> ReportFile {
        let size = fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
        ReportFile::new(path, size)
    }

    #[test]
    fn test_extracts_mapped_tokens() {
        let temp_dir = TempDir::new().unwrap();
        let values = ReportValues::seeded("5.50", 3);
        let path = write_report(temp_dir.path(), "run.out", &values);

        let extracted = ReportExtractor::new().extract_report(&path).unwrap();

        assert_eq!(extracted.of_ratio, "5.50");
        let expected: Vec<&str> = values.values.iter().map(String::as_str).collect();
        assert_eq!(extracted.record.values().to_vec(), expected);
    }

    #[test]
    fn test_tokens_are_kept_verbatim() {
        let temp_dir = TempDir::new().unwrap();
        let mut values = ReportValues::seeded("6.0000", 0);
        values.values[0] = "2.0e+01".to_string();
        values.values[6] = "N/A".to_string();
        let path = write_report(temp_dir.path(), "odd.out", &values);

        let extracted = ReportExtractor::new().extract_report(&path).unwrap();

        assert_eq!(extracted.of_ratio, "6.0000");
        assert_eq!(extracted.record.pc, "2.0e+01");
        assert_eq!(extracted.record.mach, "N/A");
    }

    #[test]
    fn test_invalid_utf8_token_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let text = report_text(&ReportValues::seeded("5.50", 1));
        let mut bytes = text.into_bytes();
        let pc_dot = text_offset(&bytes, b"11.000") + 2;
        bytes[pc_dot] = 0xB0;
        let path = temp_dir.path().join("degree.out");
        fs::write(&path, &bytes).unwrap();

        let result = ReportExtractor::new().extract_report(&path);

        match result {
            Err(ref e @ PropMixError::ReportRead { ref source, .. }) => {
                assert_eq!(source.kind(), std::io::ErrorKind::InvalidData);
                assert!(e.is_malformed_report());
            }
            other => panic!("expected ReportRead, got {:?}", other),
        }
    }

    fn text_offset(haystack: &[u8], needle: &[u8]) -> usize {
        haystack
            .windows(needle.len())
            .position(|w| w == needle)
            .unwrap()
    }

    #[test]
    fn test_carriage_return_line_endings() {
        let temp_dir = TempDir::new().unwrap();
        let values = ReportValues::seeded("5.50", 2);
        let text = report_text(&values);

        for (name, ending) in [("cr.out", "\r"), ("crlf.out", "\r\n")] {
            let path = temp_dir.path().join(name);
            fs::write(&path, text.replace('\n', ending)).unwrap();

            let extracted = ReportExtractor::new().extract_report(&path).unwrap();

            assert_eq!(extracted.of_ratio, "5.50");
            assert_eq!(extracted.record.pc, values.values[0]);
            assert_eq!(extracted.record.mach, values.values[6]);
        }
    }

    #[test]
    fn test_split_lines() {
        assert_eq!(split_lines("a\nb\r\nc\rd"), vec!["a", "b", "c", "d"]);
        assert_eq!(split_lines("a\r\r\n"), vec!["a", ""]);
        assert_eq!(split_lines("a\n"), vec!["a"]);
        assert!(split_lines("").is_empty());
    }

    #[test]
    fn test_exactly_forty_lines_is_valid() {
        let temp_dir = TempDir::new().unwrap();
        let text = report_text(&ReportValues::seeded("5.50", 1));
        let trimmed = text.trim_end_matches('\n');
        assert_eq!(trimmed.lines().count(), 40);
        let path = temp_dir.path().join("forty.out");
        fs::write(&path, trimmed).unwrap();

        assert!(ReportExtractor::new().extract_report(&path).is_ok());
    }

    #[test]
    fn test_thirty_nine_lines_is_out_of_range() {
        let temp_dir = TempDir::new().unwrap();
        let text = report_text(&ReportValues::seeded("5.50", 1));
        let short: Vec<&str> = text.lines().take(39).collect();
        let path = temp_dir.path().join("short.out");
        fs::write(&path, short.join("\n")).unwrap();

        let result = ReportExtractor::new().extract_report(&path);

        match result {
            Err(PropMixError::TooFewLines {
                found,
                required_index,
                ..
            }) => {
                assert_eq!(found, 39);
                assert_eq!(required_index, 39);
            }
            other => panic!("expected TooFewLines, got {:?}", other),
        }
    }

    #[test]
    fn test_short_line_is_missing_token() {
        let temp_dir = TempDir::new().unwrap();
        let text = report_text(&ReportValues::seeded("5.50", 1));
        let mut lines: Vec<String> = text.lines().map(str::to_string).collect();
        lines[25] = " T,K  3400.0".to_string();
        let path = temp_dir.path().join("truncated.out");
        fs::write(&path, lines.join("\n")).unwrap();

        let result = ReportExtractor::new().extract_report(&path);

        match result {
            Err(PropMixError::MissingToken {
                line, field, found, ..
            }) => {
                assert_eq!(line, 26);
                assert_eq!(field, "Te");
                assert_eq!(found, 2);
            }
            other => panic!("expected MissingToken, got {:?}", other),
        }
    }

    #[test]
    fn test_last_file_ratio_wins() {
        let temp_dir = TempDir::new().unwrap();
        let first = write_report(temp_dir.path(), "a.out", &ReportValues::seeded("5.00", 1));
        let second = write_report(temp_dir.path(), "b.out", &ReportValues::seeded("5.50", 2));

        let extraction = ReportExtractor::new()
            .extract_all(&[report_file(first), report_file(second)], None)
            .unwrap();

        assert_eq!(extraction.last_ratio.as_deref(), Some("5.50"));
        assert_eq!(extraction.key_count(), 2);
        assert_eq!(extraction.records()[0].pc, "11.000");
        assert_eq!(extraction.records()[1].pc, "12.000");

        let conflicts = extraction.ratio_conflicts();
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].of_ratio, "5.00");
    }

    #[test]
    fn test_malformed_report_aborts_batch() {
        let temp_dir = TempDir::new().unwrap();
        let good = write_report(temp_dir.path(), "good.out", &ReportValues::seeded("5.50", 1));
        let bad = temp_dir.path().join("bad.out");
        fs::write(&bad, "too short\n").unwrap();

        let result = ReportExtractor::new()
            .extract_all(&[report_file(bad), report_file(good)], None);

        assert!(matches!(result, Err(PropMixError::TooFewLines { .. })));
    }

    #[test]
    fn test_skip_malformed_continues() {
        let temp_dir = TempDir::new().unwrap();
        let good = write_report(temp_dir.path(), "good.out", &ReportValues::seeded("5.50", 1));
        let bad = temp_dir.path().join("bad.out");
        fs::write(&bad, "too short\n").unwrap();

        let extraction = ReportExtractor::new()
            .with_skip_malformed(true)
            .extract_all(&[report_file(bad.clone()), report_file(good)], None)
            .unwrap();

        assert_eq!(extraction.key_count(), 1);
        assert_eq!(extraction.skipped.len(), 1);
        assert_eq!(extraction.skipped[0].path, bad);
        assert_eq!(extraction.last_ratio.as_deref(), Some("5.50"));
    }

    #[test]
    fn test_unreadable_report_is_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let gone = ReportFile::new(temp_dir.path().join("gone.out"), 0);

        let extraction = ReportExtractor::new()
            .with_skip_malformed(true)
            .extract_all(&[gone], None)
            .unwrap();

        assert_eq!(extraction.key_count(), 0);
        assert_eq!(extraction.skipped.len(), 1);
        assert!(extraction.last_ratio.is_none());
    }

    #[test]
    fn test_progress_callback() {
        let temp_dir = TempDir::new().unwrap();
        let files: Vec<ReportFile> = (0..3)
            .map(|i| {
                report_file(write_report(
                    temp_dir.path(),
                    &format!("r{}.out", i),
                    &ReportValues::seeded("5.50", i),
                ))
            })
            .collect();

        let calls = Cell::new(0);
        let last_processed = Cell::new(0);
        let callback = |p: &ExtractionProgress| {
            calls.set(calls.get() + 1);
            last_processed.set(p.files_processed);
            assert_eq!(p.total_files, 3);
        };

        ReportExtractor::new()
            .extract_all(&files, Some(&callback))
            .unwrap();

        assert_eq!(calls.get(), 4);
        assert_eq!(last_processed.get(), 3);
    }
}
