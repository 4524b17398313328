#![allow(dead_code)]

use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A scratch working directory with an empty `data/` input directory.
pub struct TestEnv {
    tmp: TempDir,
    pub data: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        let tmp = TempDir::new().expect("create temp dir");
        let data = tmp.path().join("data");
        fs::create_dir(&data).expect("create data dir");
        Self { tmp, data }
    }

    pub fn root(&self) -> &Path {
        self.tmp.path()
    }

    pub fn results(&self) -> PathBuf {
        self.data.join("results.txt")
    }

    pub fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("propmix").expect("binary built");
        cmd.current_dir(self.root()).env_remove("RUST_LOG");
        cmd
    }

    /// Writes a report whose chamber pressure is `pc` and whose OF line
    /// carries `of_ratio`.
    pub fn add_report(&self, name: &str, of_ratio: &str, pc: &str) -> PathBuf {
        let path = self.data.join(name);
        fs::write(&path, report_text(of_ratio, pc)).expect("write report");
        path
    }
}

/// A 40-line report with the values the extractor reads at their fixed
/// line and token positions.
pub fn report_text(of_ratio: &str, pc: &str) -> String {
    let mut lines: Vec<String> = (0..40)
        .map(|i| format!(" CEA output line {}", i))
        .collect();

    lines[15] = format!("  OF=  x  {}  y", of_ratio);
    lines[24] = format!(" P,BAR  {}  11.5  5.9  0.105", pc);
    lines[25] = " T,K  3400.1  3210.0  2950.0  1500.2".to_string();
    lines[29] = " Cp, KJ/(KG)(K)  4.3  4.1  3.9  3.1  2.3".to_string();
    lines[31] = " GAMMAs  1.14  1.15  1.16  1.21".to_string();
    lines[34] = " M, (1/n)  11.0  12.0  13.5".to_string();
    lines[39] = " MACH NUMBER  0.0  1.0  2.0  3.8".to_string();

    let mut text = lines.join("\n");
    text.push('\n');
    text
}

/// The `key = ...` row [`report_text`] produces for `pc`.
pub fn expected_row(pc: &str) -> String {
    format!(
        "    key = {}, 3400.1, 1500.2, 0.105, 13.5, 1.21, 3.8, 4.1, 2.3",
        pc
    )
}
