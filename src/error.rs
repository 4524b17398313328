use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PropMixError {
    #[error("IO operation failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cannot read input directory {path}: {source}")]
    InputDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot read report {path}: {source}")]
    ReportRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Report {path} has {found} lines, line index {required_index} is out of range")]
    TooFewLines {
        path: PathBuf,
        found: usize,
        required_index: usize,
    },

    #[error(
        "Report {path} line {line}: token index {token} for {field} is out of range ({found} tokens)"
    )]
    MissingToken {
        path: PathBuf,
        line: usize,
        token: usize,
        field: &'static str,
        found: usize,
    },

    #[error("No combustion reports found in {path}")]
    NoReportsFound { path: PathBuf },

    #[error("Cannot write results file {path}: {source}")]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot read results file {path}: {source}")]
    ResultsRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid mixture block at line {line}: {message}")]
    BlockParse { line: usize, message: String },
}

impl PropMixError {
    /// True for errors raised while pulling fields out of one report file.
    pub fn is_malformed_report(&self) -> bool {
        matches!(
            self,
            PropMixError::TooFewLines { .. }
                | PropMixError::MissingToken { .. }
                | PropMixError::ReportRead { .. }
        )
    }
}

pub trait UserFriendlyError {
    fn user_message(&self) -> String;
    fn suggestion(&self) -> Option<String>;
}

impl UserFriendlyError for PropMixError {
    fn user_message(&self) -> String {
        match self {
            PropMixError::InputDirectory { path, .. } => {
                format!("Input directory is missing or unreadable: {}", path.display())
            }
            PropMixError::ReportRead { path, source } => {
                format!("Failed to read report {}: {}", path.display(), source)
            }
            PropMixError::TooFewLines {
                path,
                found,
                required_index,
            } => {
                format!(
                    "Report {} is too short ({} lines, at least {} required)",
                    path.display(),
                    found,
                    required_index + 1
                )
            }
            PropMixError::MissingToken {
                path, line, field, ..
            } => {
                format!(
                    "Report {} is malformed: line {} has no value for {}",
                    path.display(),
                    line,
                    field
                )
            }
            PropMixError::NoReportsFound { path } => {
                format!("No combustion reports found in {}", path.display())
            }
            PropMixError::OutputWrite { path, source } => {
                format!("Failed to append to {}: {}", path.display(), source)
            }
            PropMixError::ResultsRead { path, source } => {
                format!("Failed to read results file {}: {}", path.display(), source)
            }
            PropMixError::Config { message } => {
                format!("Configuration error: {}", message)
            }
            PropMixError::BlockParse { line, message } => {
                format!("Results file is not valid at line {}: {}", line, message)
            }
            _ => self.to_string(),
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            PropMixError::InputDirectory { .. } => Some(
                "Check the path given with --input, or create ./data/ and place the report files in it.".to_string()
            ),
            PropMixError::TooFewLines { .. }
            | PropMixError::MissingToken { .. }
            | PropMixError::ReportRead { .. } => Some(
                "Make sure the directory holds only combustion analysis reports, or rerun with --skip-malformed.".to_string()
            ),
            PropMixError::NoReportsFound { .. } => Some(
                "Place at least one report file in the input directory.".to_string()
            ),
            PropMixError::OutputWrite { .. } => Some(
                "Ensure the results file's directory exists and is writable, or choose another file with --output.".to_string()
            ),
            PropMixError::ResultsRead { .. } => Some(
                "Point --output at an existing results file, or run without --verify first to create one.".to_string()
            ),
            PropMixError::Config { .. } => Some(
                "Check your configuration file syntax and ensure all required fields are present.".to_string()
            ),
            _ => None,
        }
    }
}

impl From<toml::de::Error> for PropMixError {
    fn from(error: toml::de::Error) -> Self {
        PropMixError::Config {
            message: error.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PropMixError>;
