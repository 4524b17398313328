//! Fixed-position layout of a combustion analysis report.
//!
//! A report is read by line position only. Seven lines are selected, each is
//! split on whitespace, and every extracted field is one token of one of those
//! lines. The table below is the whole layout; nothing else in a report is
//! looked at.

use serde::Serialize;

/// Zero-based indices of the report lines that carry data, in slot order.
pub const REPORT_LINES: [usize; 7] = [15, 24, 25, 29, 31, 34, 39];

/// A report must reach this line index to be readable.
pub const LAST_REQUIRED_LINE: usize = REPORT_LINES[REPORT_LINES.len() - 1];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Field {
    OfRatio,
    Pc,
    Tc,
    Te,
    Pe,
    Mw,
    Gamma,
    Mach,
    Cpc,
    Cpe,
}

impl Field {
    /// Name used in the results file and in diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            Field::OfRatio => "OFratio",
            Field::Pc => "Pc",
            Field::Tc => "Tc",
            Field::Te => "Te",
            Field::Pe => "Pe",
            Field::Mw => "MW",
            Field::Gamma => "gamma",
            Field::Mach => "Mach",
            Field::Cpc => "Cpc",
            Field::Cpe => "Cpe",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub field: Field,
    /// Position in [`REPORT_LINES`].
    pub slot: usize,
    /// Whitespace-delimited token within that line.
    pub token: usize,
}

impl FieldSpec {
    const fn new(field: Field, slot: usize, token: usize) -> Self {
        Self { field, slot, token }
    }

    /// Zero-based line index in the report.
    pub fn line_index(&self) -> usize {
        REPORT_LINES[self.slot]
    }
}

pub const RATIO_FIELD: FieldSpec = FieldSpec::new(Field::OfRatio, 0, 2);

/// Record fields in the order they are written on a `key = ...` line.
pub const RECORD_FIELDS: [FieldSpec; 9] = [
    FieldSpec::new(Field::Pc, 1, 1),
    FieldSpec::new(Field::Tc, 2, 1),
    FieldSpec::new(Field::Te, 2, 4),
    FieldSpec::new(Field::Pe, 1, 4),
    FieldSpec::new(Field::Mw, 5, 4),
    FieldSpec::new(Field::Gamma, 4, 4),
    FieldSpec::new(Field::Mach, 6, 5),
    FieldSpec::new(Field::Cpc, 3, 3),
    FieldSpec::new(Field::Cpe, 3, 6),
];
