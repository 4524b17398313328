use crate::extractor::Record;
use serde::Serialize;
use std::fmt;

pub const BLOCK_NODE: &str = "MixtureRatioData";
pub const PRESSURE_NODE: &str = "PressureData";
pub const RATIO_KEY: &str = "OFratio";
pub const ROW_KEY: &str = "key";

/// Number of values on each `key = ...` row.
pub const ROW_WIDTH: usize = 9;

/// One `MixtureRatioData` block: a mixture ratio and its pressure table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MixtureBlock {
    pub of_ratio: String,
    pub keys: Vec<Vec<String>>,
}

impl MixtureBlock {
    pub fn new<S: Into<String>>(of_ratio: S, records: &[Record]) -> Self {
        let keys = records
            .iter()
            .map(|r| r.values().iter().map(|v| v.to_string()).collect())
            .collect();

        Self {
            of_ratio: of_ratio.into(),
            keys,
        }
    }

    pub fn key_count(&self) -> usize {
        self.keys.len()
    }
}

// No trailing newline after the closing brace; consecutive runs append
// blocks back to back.
impl fmt::Display for MixtureBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", BLOCK_NODE)?;
        writeln!(f, "{{")?;
        writeln!(f, "  {} ={}", RATIO_KEY, self.of_ratio)?;
        writeln!(f, "  {}", PRESSURE_NODE)?;
        writeln!(f, "  {{")?;
        for row in &self.keys {
            writeln!(f, "    {} = {}", ROW_KEY, row.join(", "))?;
        }
        writeln!(f, "  }}")?;
        write!(f, "}}")
    }
}
