pub mod field_map;
pub mod output_manager;
pub mod record_extractor;

pub use field_map::{Field, FieldSpec, RATIO_FIELD, RECORD_FIELDS, REPORT_LINES};
pub use output_manager::{ReportEntry, ResultsWriter, RunReport};
pub use record_extractor::{
    ExtractedReport, Extraction, ExtractionProgress, Record, ReportExtractor, SkippedReport,
};
