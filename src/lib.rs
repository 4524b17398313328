pub mod cli;
pub mod config;
pub mod error;
pub mod extractor;
pub mod mixture;
pub mod scanner;
pub mod ui;

#[cfg(test)]
pub(crate) mod test_support;

// Public API re-exports
pub use cli::{Cli, OutputFormat};
pub use config::{CliOverrides, Config, InputConfig, OutputConfig, ValidationConfig};
pub use error::{PropMixError, Result, UserFriendlyError};

// Core functionality re-exports
pub use extractor::{
    Extraction, ExtractionProgress, Record, ReportExtractor, ResultsWriter, RunReport,
};
pub use mixture::{parse_blocks, MixtureBlock};
pub use scanner::{ReportFile, ReportScanner};
pub use ui::{OutputFormatter, OutputMode, ProgressManager};

use std::path::Path;
use std::time::Instant;

/// Main library interface: one run turns a directory of reports into one block.
pub struct PropMix {
    config: Config,
    output_formatter: OutputFormatter,
    progress_manager: ProgressManager,
}

impl PropMix {
    pub fn new(config: Config, output_mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        let output_formatter = OutputFormatter::new(output_mode, verbose, quiet);
        let progress_manager = ProgressManager::new(!quiet && output_mode == OutputMode::Human);

        Self {
            config,
            output_formatter,
            progress_manager,
        }
    }

    pub fn from_cli(cli_args: &Cli) -> Result<Self> {
        let config = cli_args.load_config()?;
        let output_mode = OutputMode::from_string(cli_args.output_format.as_str());

        Ok(Self::new(config, output_mode, cli_args.verbose, cli_args.quiet))
    }

    /// Reads every report, builds the block and appends it to the results
    /// file. With `dry_run` the block is printed instead.
    pub fn run(&self, dry_run: bool) -> Result<RunReport> {
        let start_time = Instant::now();
        let input_dir = &self.config.input.directory;
        let results_file = &self.config.output.results_file;

        tracing::info!(
            input = %input_dir.display(),
            results = %results_file.display(),
            dry_run,
            "Starting run"
        );

        // Step 1: List the reports
        let reports = self.scan_reports(input_dir)?;
        if reports.is_empty() {
            return Err(PropMixError::NoReportsFound {
                path: input_dir.clone(),
            });
        }
        self.output_formatter
            .info(&format!("Found {} report files", reports.len()));

        // Step 2: Pull the fields out of each one
        let extraction = self.extract_reports(&reports)?;

        let of_ratio = extraction
            .last_ratio
            .clone()
            .ok_or_else(|| PropMixError::NoReportsFound {
                path: input_dir.clone(),
            })?;

        // Step 3: Aggregate
        let block = MixtureBlock::new(of_ratio, &extraction.records());
        let warnings = self.check_extraction(&extraction, &block);

        // Step 4: Append, or show what would be appended
        let bytes_written = if dry_run {
            self.output_formatter.print_block(&block);
            0
        } else {
            let writer = ResultsWriter::new(results_file);
            let written = writer.append_block(&block)?;
            self.output_formatter.success(&format!(
                "Appended {} keys to {}",
                block.key_count(),
                results_file.display()
            ));
            written
        };

        let mut report = RunReport::new(
            input_dir,
            results_file,
            &block,
            &extraction,
            start_time.elapsed(),
        );
        report.appended = !dry_run;
        report.bytes_written = bytes_written;
        for warning in warnings {
            report.add_warning(warning);
        }

        tracing::info!(
            of_ratio = %report.of_ratio,
            keys = report.keys_written,
            skipped = report.skipped.len(),
            "Run finished"
        );

        Ok(report)
    }

    fn scan_reports(&self, input_dir: &Path) -> Result<Vec<ReportFile>> {
        self.output_formatter
            .start_operation(&format!("Scanning {}", input_dir.display()));

        let scanner = ReportScanner::new(&self.config.input)
            .with_excluded_file(&self.config.output.results_file);
        let reports = scanner.scan_directory(input_dir)?;

        let stats = scanner.get_statistics(&reports);
        self.output_formatter.debug(&stats.display_summary());

        Ok(reports)
    }

    fn extract_reports(&self, reports: &[ReportFile]) -> Result<Extraction> {
        self.output_formatter.start_operation("Reading reports");

        let file_progress = self.progress_manager.create_file_progress(reports.len() as u64);
        let progress_callback = {
            let pb = file_progress.clone();
            move |progress: &ExtractionProgress| {
                ui::progress::update_file_progress(&pb, progress);
            }
        };

        let extractor =
            ReportExtractor::new().with_skip_malformed(self.config.input.skip_malformed);

        let result = extractor.extract_all(reports, Some(&progress_callback));
        match result {
            Ok(extraction) => {
                ui::progress::finish_progress_with_summary(
                    &file_progress,
                    &format!("Read {} reports", extraction.key_count()),
                    file_progress.elapsed(),
                );
                Ok(extraction)
            }
            Err(e) => {
                file_progress.abandon();
                Err(e)
            }
        }
    }

    /// Emits the advisory warnings for a finished extraction and returns them.
    fn check_extraction(&self, extraction: &Extraction, block: &MixtureBlock) -> Vec<String> {
        let mut warnings = Vec::new();
        let min_keys = self.config.validation.min_keys;

        if block.key_count() < min_keys {
            self.progress_manager.suspend(|| {
                self.output_formatter
                    .print_key_count_warning(block.key_count(), min_keys)
            });
            warnings.push(ui::output::key_count_warning(min_keys));
        }

        for skipped in &extraction.skipped {
            let message = format!("Skipped {}: {}", skipped.path.display(), skipped.reason);
            self.output_formatter.warning(&message);
            warnings.push(message);
        }

        let conflicts = extraction.ratio_conflicts();
        if !conflicts.is_empty() {
            let message = format!(
                "{} reports carry an OFratio other than {}; the block is keyed by the last report",
                conflicts.len(),
                block.of_ratio
            );
            self.output_formatter.warning(&message);
            for conflict in &conflicts {
                self.output_formatter.debug(&format!(
                    "{}: OFratio {}",
                    conflict.path.display(),
                    conflict.of_ratio
                ));
            }
            warnings.push(message);
        }

        warnings
    }

    /// Parses the results file and lists the blocks it holds.
    pub fn verify(&self) -> Result<Vec<MixtureBlock>> {
        let results_file = &self.config.output.results_file;
        self.output_formatter
            .start_operation(&format!("Verifying {}", results_file.display()));

        let blocks = ResultsWriter::new(results_file).read_blocks()?;
        tracing::info!(blocks = blocks.len(), "Results file parsed");

        Ok(blocks)
    }

    pub fn generate_sample_config<P: AsRef<Path>>(output_path: P) -> Result<()> {
        Config::default().save_to_file(output_path)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn output_formatter(&self) -> &OutputFormatter {
        &self.output_formatter
    }

    pub fn handle_error(&self, error: &PropMixError) {
        self.output_formatter.print_user_friendly_error(error);
    }
}
