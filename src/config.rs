use crate::error::{PropMixError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_INPUT_DIR: &str = "./data/";
pub const DEFAULT_RESULTS_FILE: &str = "./data/results.txt";
pub const DEFAULT_MIN_KEYS: usize = 15;

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub input: InputConfig,
    pub output: OutputConfig,
    pub validation: ValidationConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct InputConfig {
    pub directory: PathBuf,
    pub sort: bool,
    pub skip_malformed: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    pub results_file: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ValidationConfig {
    pub min_keys: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input: InputConfig::default(),
            output: OutputConfig::default(),
            validation: ValidationConfig::default(),
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from(DEFAULT_INPUT_DIR),
            sort: false, // storage order
            skip_malformed: false,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            results_file: PathBuf::from(DEFAULT_RESULTS_FILE),
        }
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            min_keys: DEFAULT_MIN_KEYS,
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(PropMixError::Config {
                message: format!("Configuration file not found: {}", path.display()),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| PropMixError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| PropMixError::Config {
            message: format!("Failed to parse config file {}: {}", path.display(), e),
        })?;

        Ok(config)
    }

    pub fn load_with_defaults<P: AsRef<Path>>(config_path: Option<P>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_from_file(path),
            None => {
                let default_paths = ["propmix.toml", ".propmix.toml"];

                for default_path in &default_paths {
                    if Path::new(default_path).exists() {
                        tracing::debug!(path = default_path, "Loading configuration");
                        return Self::load_from_file(default_path);
                    }
                }

                Ok(Self::default())
            }
        }
    }

    pub fn merge_with_cli_args(&mut self, cli_args: &CliOverrides) {
        if let Some(ref input_dir) = cli_args.input_dir {
            self.input.directory = input_dir.clone();
        }

        if let Some(ref results_file) = cli_args.results_file {
            self.output.results_file = results_file.clone();
        }

        if let Some(min_keys) = cli_args.min_keys {
            self.validation.min_keys = min_keys;
        }

        // Flags can only switch these on.
        if cli_args.sort {
            self.input.sort = true;
        }

        if cli_args.skip_malformed {
            self.input.skip_malformed = true;
        }
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self).map_err(|e| PropMixError::Config {
            message: format!("Failed to serialize config: {}", e),
        })?;

        std::fs::write(path, content).map_err(|e| PropMixError::Config {
            message: format!("Failed to write config file {}: {}", path.display(), e),
        })?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.input.directory.as_os_str().is_empty() {
            return Err(PropMixError::Config {
                message: "Input directory must not be empty".to_string(),
            });
        }

        if self.output.results_file.as_os_str().is_empty() {
            return Err(PropMixError::Config {
                message: "Results file path must not be empty".to_string(),
            });
        }

        if self.output.results_file.is_dir() {
            return Err(PropMixError::Config {
                message: format!(
                    "Results file is a directory: {}",
                    self.output.results_file.display()
                ),
            });
        }

        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct CliOverrides {
    pub input_dir: Option<PathBuf>,
    pub results_file: Option<PathBuf>,
    pub min_keys: Option<usize>,
    pub sort: bool,
    pub skip_malformed: bool,
}

impl CliOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_input_dir(mut self, input_dir: Option<PathBuf>) -> Self {
        self.input_dir = input_dir;
        self
    }

    pub fn with_results_file(mut self, results_file: Option<PathBuf>) -> Self {
        self.results_file = results_file;
        self
    }

    pub fn with_min_keys(mut self, min_keys: Option<usize>) -> Self {
        self.min_keys = min_keys;
        self
    }

    pub fn with_sort(mut self, sort: bool) -> Self {
        self.sort = sort;
        self
    }

    pub fn with_skip_malformed(mut self, skip: bool) -> Self {
        self.skip_malformed = skip;
        self
    }
}
