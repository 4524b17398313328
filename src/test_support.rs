//! Synthetic fixed-layout reports for unit tests.

use std::fs;
use std::path::{Path, PathBuf};

/// Values planted into a synthetic report, in `key = ...` order.
pub struct ReportValues {
    pub of_ratio: String,
    pub values: [String; 9],
}

impl ReportValues {
    /// Distinct, recognizable values derived from `seed`.
    pub fn seeded(of_ratio: &str, seed: usize) -> Self {
        Self {
            of_ratio: of_ratio.to_string(),
            values: [
                format!("{}.000", 10 + seed),    // Pc
                format!("3{:03}.41", seed),      // Tc
                format!("1{:03}.77", seed),      // Te
                format!("0.{:04}", 105 + seed),  // Pe
                format!("13.{:03}", seed),       // MW
                format!("1.{:04}", 1400 + seed), // gamma
                format!("3.{:03}", 800 + seed),  // Mach
                format!("4.{:04}", seed),        // Cpc
                format!("2.{:04}", seed),        // Cpe
            ],
        }
    }
}

/// Renders a 40-line report carrying `v` at the extracted positions.
pub fn report_text(v: &ReportValues) -> String {
    let [pc, tc, te, pe, mw, gamma, mach, cpc, cpe] = &v.values;
    let mut lines: Vec<String> = (0..40)
        .map(|i| format!(" THEORETICAL ROCKET PERFORMANCE filler {}", i))
        .collect();

    lines[15] = format!("  OF=  x  {}  y", v.of_ratio);
    lines[24] = format!(" P,BAR  {}  11.5  5.9  {}", pc, pe);
    lines[25] = format!(" T,K  {}  3210.0  2950.0  {}", tc, te);
    lines[29] = format!(" Cp, KJ/(KG)(K)  4.3  {}  3.9  3.1  {}", cpc, cpe);
    lines[31] = format!(" GAMMAs  1.14  1.15  1.16  {}", gamma);
    lines[34] = format!(" M, (1/n)  11.0  12.0  {}", mw);
    lines[39] = format!(" MACH NUMBER  0.0  1.0  2.0  {}", mach);

    let mut text = lines.join("\n");
    text.push('\n');
    text
}

pub fn write_report(dir: &Path, name: &str, v: &ReportValues) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, report_text(v)).unwrap();
    path
}
