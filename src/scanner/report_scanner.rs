use crate::config::InputConfig;
use crate::error::{PropMixError, Result};
use crate::ui::output::format_bytes;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A candidate combustion report found in the input directory.
#[derive(Debug, Clone)]
pub struct ReportFile {
    pub path: PathBuf,
    pub filename: String,
    pub size: u64,
}

impl ReportFile {
    pub fn new(path: PathBuf, size: u64) -> Self {
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        Self {
            path,
            filename,
            size,
        }
    }
}

/// Lists the regular files directly under one directory.
pub struct ReportScanner {
    sort: bool,
    exclude: Option<PathBuf>,
}

impl ReportScanner {
    pub fn new(config: &InputConfig) -> Self {
        Self {
            sort: config.sort,
            exclude: None,
        }
    }

    /// Never list this file, typically the results file sharing the input directory.
    pub fn with_excluded_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.exclude = Some(path.into());
        self
    }

    pub fn scan_directory<P: AsRef<Path>>(&self, root: P) -> Result<Vec<ReportFile>> {
        let root_path = root.as_ref();

        let metadata = fs::metadata(root_path).map_err(|e| PropMixError::InputDirectory {
            path: root_path.to_path_buf(),
            source: e,
        })?;

        if !metadata.is_dir() {
            return Err(PropMixError::InputDirectory {
                path: root_path.to_path_buf(),
                source: std::io::Error::other("not a directory"),
            });
        }

        // Missing results file simply cannot collide with a listed entry.
        let excluded = self
            .exclude
            .as_ref()
            .and_then(|p| fs::canonicalize(p).ok());

        let mut walker = WalkDir::new(root_path)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true);

        if self.sort {
            walker = walker.sort_by_file_name();
        }

        let mut reports = Vec::new();

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) if err.depth() == 0 => {
                    let source = err
                        .into_io_error()
                        .unwrap_or_else(|| std::io::Error::other("directory walk failed"));
                    return Err(PropMixError::InputDirectory {
                        path: root_path.to_path_buf(),
                        source,
                    });
                }
                Err(err) => {
                    // Dangling links and the like are not reports.
                    tracing::debug!(error = %err, "Skipping unreadable entry");
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            if let Some(ref excluded) = excluded {
                if fs::canonicalize(entry.path()).ok().as_ref() == Some(excluded) {
                    tracing::debug!(path = %entry.path().display(), "Skipping results file");
                    continue;
                }
            }

            let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
            reports.push(ReportFile::new(entry.path().to_path_buf(), size));
        }

        tracing::debug!(
            directory = %root_path.display(),
            count = reports.len(),
            "Listed input directory"
        );

        Ok(reports)
    }

    pub fn get_statistics(&self, reports: &[ReportFile]) -> ScanStatistics {
        let (largest_file_size, largest_file_name) = reports
            .iter()
            .max_by_key(|r| r.size)
            .map(|r| (r.size, r.filename.clone()))
            .unwrap_or((0, String::new()));

        ScanStatistics {
            total_files: reports.len(),
            total_size: reports.iter().map(|r| r.size).sum(),
            largest_file_size,
            largest_file_name,
        }
    }
}

#[derive(Debug, Default)]
pub struct ScanStatistics {
    pub total_files: usize,
    pub total_size: u64,
    pub largest_file_size: u64,
    pub largest_file_name: String,
}

impl ScanStatistics {
    pub fn display_summary(&self) -> String {
        let mut summary = format!(
            "Scan Results:\n  Report files: {}\n  Total size: {}\n",
            self.total_files,
            format_bytes(self.total_size)
        );

        if self.largest_file_size > 0 {
            summary.push_str(&format!(
                "  Largest file: {} ({})\n",
                self.largest_file_name,
                format_bytes(self.largest_file_size)
            ));
        }

        summary
    }
}
