use crate::config::{CliOverrides, Config};
use crate::error::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "propmix")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Build MixtureRatioData blocks from combustion analysis reports")]
#[command(
    long_about = "propmix reads every combustion analysis report in the input directory, \
                  pulls chamber and exit conditions from fixed positions in each one, and \
                  appends a single MixtureRatioData block to the results file."
)]
#[command(after_help = "EXAMPLES:\n  \
    propmix\n  \
    propmix --input runs/lox-lh2 --output runs/lox-lh2/results.txt\n  \
    propmix --sort --skip-malformed -v\n  \
    propmix --dry-run --output-format json\n  \
    propmix --verify --output runs/lox-lh2/results.txt")]
pub struct Cli {
    /// Directory holding the report files (defaults to ./data/)
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Results file the block is appended to (defaults to ./data/results.txt)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long, help = "Path to TOML configuration file")]
    pub config: Option<PathBuf>,

    /// Key count below which a warning is printed
    #[arg(long)]
    pub min_keys: Option<usize>,

    /// Skip reports that are too short instead of failing the run
    #[arg(long)]
    pub skip_malformed: bool,

    /// Process reports in file name order
    #[arg(long)]
    pub sort: bool,

    /// Output format for results
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub output_format: OutputFormat,

    /// Verbose output level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-essential output)
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Print the block instead of appending it
    #[arg(long, conflicts_with = "verify")]
    pub dry_run: bool,

    /// Check that the results file parses and list its blocks
    #[arg(long)]
    pub verify: bool,

    /// Generate sample configuration file
    #[arg(long, help = "Generate a sample configuration file")]
    pub generate_config: bool,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable colored output
    Human,
    /// JSON lines
    Json,
    /// Plain text output
    Plain,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Human => "human",
            OutputFormat::Json => "json",
            OutputFormat::Plain => "plain",
        }
    }
}

impl Cli {
    pub fn load_config(&self) -> Result<Config> {
        let mut config = Config::load_with_defaults(self.config.as_ref())?;

        let overrides = self.create_cli_overrides();
        config.merge_with_cli_args(&overrides);
        config.validate()?;

        Ok(config)
    }

    pub fn create_cli_overrides(&self) -> CliOverrides {
        CliOverrides::new()
            .with_input_dir(self.input.clone())
            .with_results_file(self.output.clone())
            .with_min_keys(self.min_keys)
            .with_sort(self.sort)
            .with_skip_malformed(self.skip_malformed)
    }

    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }
}
