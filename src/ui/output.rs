use crate::error::{PropMixError, UserFriendlyError};
use crate::extractor::RunReport;
use crate::mixture::MixtureBlock;
use console::{style, Emoji, Term};
use serde_json;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputMode {
    Human,
    Json,
    Plain,
}

impl OutputMode {
    pub fn from_string(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => OutputMode::Json,
            "plain" => OutputMode::Plain,
            _ => OutputMode::Human,
        }
    }
}

static CHECKMARK: Emoji = Emoji("✅ ", "✓ ");
static CROSS: Emoji = Emoji("❌ ", "✗ ");
static INFO: Emoji = Emoji("ℹ️  ", "i ");
static WARNING: Emoji = Emoji("⚠️  ", "! ");
static ROCKET: Emoji = Emoji("🚀 ", "> ");
static FLASK: Emoji = Emoji("🧪 ", "* ");

pub struct OutputFormatter {
    mode: OutputMode,
    use_colors: bool,
    verbose_level: u8,
    quiet: bool,
}

impl OutputFormatter {
    pub fn new(mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        let use_colors = match mode {
            OutputMode::Human => Term::stdout().features().colors_supported() && !quiet,
            _ => false,
        };

        Self {
            mode,
            use_colors,
            verbose_level: if quiet { 0 } else { verbose },
            quiet,
        }
    }

    pub fn success(&self, message: &str) {
        if self.quiet {
            return;
        }
        match self.mode {
            OutputMode::Human => self.print_human_message(MessageType::Success, message),
            OutputMode::Json => self.print_json_message("success", message),
            OutputMode::Plain => println!("SUCCESS: {}", message),
        }
    }

    pub fn error(&self, message: &str) {
        match self.mode {
            OutputMode::Human => self.print_human_message(MessageType::Error, message),
            OutputMode::Json => self.print_json_message("error", message),
            OutputMode::Plain => eprintln!("ERROR: {}", message),
        }
    }

    pub fn warning(&self, message: &str) {
        if self.should_show_message(0) {
            match self.mode {
                OutputMode::Human => self.print_human_message(MessageType::Warning, message),
                OutputMode::Json => self.print_json_message("warning", message),
                OutputMode::Plain => eprintln!("WARNING: {}", message),
            }
        }
    }

    pub fn info(&self, message: &str) {
        if self.should_show_message(1) {
            match self.mode {
                OutputMode::Human => self.print_human_message(MessageType::Info, message),
                OutputMode::Json => self.print_json_message("info", message),
                OutputMode::Plain => println!("INFO: {}", message),
            }
        }
    }

    pub fn debug(&self, message: &str) {
        if self.should_show_message(2) {
            match self.mode {
                OutputMode::Human => {
                    if self.use_colors {
                        println!("  {}", style(message).dim());
                    } else {
                        println!("  DEBUG: {}", message);
                    }
                }
                OutputMode::Json => self.print_json_message("debug", message),
                OutputMode::Plain => println!("DEBUG: {}", message),
            }
        }
    }

    pub fn start_operation(&self, operation: &str) {
        if self.should_show_message(1) {
            match self.mode {
                OutputMode::Human => {
                    if self.use_colors {
                        println!("{}{}", ROCKET, style(operation).bold());
                    } else {
                        println!("> {}", operation);
                    }
                }
                OutputMode::Json => self.print_json_message("operation_start", operation),
                OutputMode::Plain => println!("STARTING: {}", operation),
            }
        }
    }

    /// The low key count notice. Emitted on stderr whatever the mode or
    /// verbosity, since downstream tooling greps for it.
    pub fn print_key_count_warning(&self, key_count: usize, min_keys: usize) {
        let message = key_count_warning(min_keys);
        match self.mode {
            OutputMode::Json => eprintln!(
                "{}",
                serde_json::to_string(&serde_json::json!({
                    "type": "message",
                    "level": "warning",
                    "message": message,
                    "keys": key_count,
                    "timestamp": chrono::Utc::now().to_rfc3339()
                }))
                .unwrap_or_else(|_| message.clone())
            ),
            _ => eprintln!("{}", message),
        }
    }

    pub fn print_user_friendly_error(&self, error: &PropMixError) {
        let user_message = error.user_message();
        self.error(&user_message);

        if let Some(suggestion) = error.suggestion() {
            match self.mode {
                OutputMode::Human => {
                    eprintln!();
                    if self.use_colors {
                        eprintln!(
                            "{}{}",
                            INFO,
                            style(&format!("Suggestion: {}", suggestion)).cyan()
                        );
                    } else {
                        eprintln!("Suggestion: {}", suggestion);
                    }
                }
                OutputMode::Json => {
                    self.print_json_object(&serde_json::json!({
                        "type": "suggestion",
                        "message": suggestion
                    }));
                }
                OutputMode::Plain => {
                    eprintln!("SUGGESTION: {}", suggestion);
                }
            }
        }
    }

    pub fn print_run_report(&self, report: &RunReport) {
        match self.mode {
            OutputMode::Human => {
                if !self.quiet {
                    self.print_human_report(report);
                }
            }
            OutputMode::Json => {
                let json_output =
                    serde_json::to_string(report).unwrap_or_else(|_| "{}".to_string());
                println!("{}", json_output);
            }
            OutputMode::Plain => {
                if !self.quiet {
                    self.print_plain_report(report);
                }
            }
        }
    }

    /// Prints a block exactly as it would be appended.
    pub fn print_block(&self, block: &MixtureBlock) {
        match self.mode {
            OutputMode::Json => self.print_json_object(&serde_json::json!({
                "type": "block",
                "of_ratio": block.of_ratio,
                "keys": block.keys,
                "text": block.to_string()
            })),
            _ => println!("{}", block),
        }
    }

    pub fn print_verification(&self, results_file: &Path, blocks: &[MixtureBlock]) {
        match self.mode {
            OutputMode::Human => {
                let title = format!("{} blocks in {}", blocks.len(), results_file.display());
                self.print_header(&title);
                for (index, block) in blocks.iter().enumerate() {
                    let ratio = if self.use_colors {
                        style(&block.of_ratio).cyan().bold().to_string()
                    } else {
                        block.of_ratio.clone()
                    };
                    println!(
                        "  {:>3}. OFratio {:<10} {} keys",
                        index + 1,
                        ratio,
                        block.key_count()
                    );
                }
                println!();
            }
            OutputMode::Json => self.print_json_object(&serde_json::json!({
                "type": "verification",
                "results_file": results_file,
                "blocks": blocks
                    .iter()
                    .map(|b| serde_json::json!({ "of_ratio": b.of_ratio, "keys": b.key_count() }))
                    .collect::<Vec<_>>()
            })),
            OutputMode::Plain => {
                println!("BLOCKS: {}", blocks.len());
                for block in blocks {
                    println!("OFratio {} keys {}", block.of_ratio, block.key_count());
                }
            }
        }
    }

    pub fn print_header(&self, title: &str) {
        if self.quiet {
            return;
        }

        match self.mode {
            OutputMode::Human => {
                println!();
                if self.use_colors {
                    println!("{} {}", FLASK, style(title).bold().cyan());
                } else {
                    println!("=== {} ===", title);
                }
                println!();
            }
            OutputMode::Json => {
                self.print_json_object(&serde_json::json!({
                    "type": "header",
                    "title": title
                }));
            }
            OutputMode::Plain => {
                println!("=== {} ===", title);
            }
        }
    }

    pub fn print_separator(&self) {
        if self.quiet {
            return;
        }

        match self.mode {
            OutputMode::Human => {
                if self.use_colors {
                    println!("{}", style("─".repeat(60)).dim());
                } else {
                    println!("{}", "-".repeat(60));
                }
            }
            OutputMode::Plain => {
                println!("{}", "-".repeat(60));
            }
            OutputMode::Json => {}
        }
    }

    fn should_show_message(&self, min_verbose_level: u8) -> bool {
        !self.quiet && self.verbose_level >= min_verbose_level
    }

    fn print_human_message(&self, msg_type: MessageType, message: &str) {
        #[allow(clippy::type_complexity)]
        let (emoji, color_fn): (Emoji, Box<dyn Fn(&str) -> console::StyledObject<&str>>) =
            match msg_type {
                MessageType::Success => (CHECKMARK, Box::new(|msg| style(msg).green().bold())),
                MessageType::Error => (CROSS, Box::new(|msg| style(msg).red().bold())),
                MessageType::Warning => (WARNING, Box::new(|msg| style(msg).yellow().bold())),
                MessageType::Info => (INFO, Box::new(|msg| style(msg).cyan())),
            };

        let to_stderr = matches!(msg_type, MessageType::Error | MessageType::Warning);

        let line = if self.use_colors {
            format!("{}{}", emoji, color_fn(message))
        } else {
            let prefix = match msg_type {
                MessageType::Success => "✓",
                MessageType::Error => "✗",
                MessageType::Warning => "!",
                MessageType::Info => "i",
            };
            format!("{} {}", prefix, message)
        };

        if to_stderr {
            eprintln!("{}", line);
        } else {
            println!("{}", line);
        }
    }

    fn print_json_message(&self, level: &str, message: &str) {
        self.print_json_object(&serde_json::json!({
            "type": "message",
            "level": level,
            "message": message,
            "timestamp": chrono::Utc::now().to_rfc3339()
        }));
    }

    fn print_json_object(&self, obj: &serde_json::Value) {
        println!(
            "{}",
            serde_json::to_string(obj).unwrap_or_else(|_| "{}".to_string())
        );
    }

    fn highlight(&self, value: String) -> String {
        if self.use_colors {
            style(value).cyan().bold().to_string()
        } else {
            value
        }
    }

    fn print_human_report(&self, report: &RunReport) {
        println!();
        self.print_separator();

        let headline = if report.appended {
            format!("Appended OFratio {} to {}", report.of_ratio, report.results_file.display())
        } else {
            format!("Dry run for OFratio {}, nothing written", report.of_ratio)
        };
        if self.use_colors {
            println!("{}{}", CHECKMARK, style(headline).green().bold());
        } else {
            println!("✓ {}", headline);
        }

        println!();
        println!("  Input:       {}", report.input_directory.display());
        println!("  Keys:        {}", self.highlight(report.keys_written.to_string()));
        if report.appended {
            println!("  Written:     {}", self.highlight(format_bytes(report.bytes_written)));
        }
        println!("  Time taken:  {}", self.highlight(format_duration(report.duration)));

        if !report.skipped.is_empty() {
            println!("  Skipped:     {}", report.skipped.len());
            if self.verbose_level >= 1 {
                for skipped in &report.skipped {
                    println!("    - {}: {}", skipped.path.display(), skipped.reason);
                }
            }
        }

        if !report.ratio_conflicts.is_empty() {
            println!("  Other ratios: {}", report.ratio_conflicts.len());
        }

        self.print_separator();
    }

    fn print_plain_report(&self, report: &RunReport) {
        if report.appended {
            println!("COMPLETED: appended to {}", report.results_file.display());
        } else {
            println!("COMPLETED: dry run");
        }
        println!("OFratio: {}", report.of_ratio);
        println!("Keys: {}", report.keys_written);
        println!("Bytes: {}", report.bytes_written);
        println!("Duration: {:?}", report.duration);
        if !report.skipped.is_empty() {
            println!("Skipped: {}", report.skipped.len());
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum MessageType {
    Success,
    Error,
    Warning,
    Info,
}

pub fn key_count_warning(min_keys: usize) -> String {
    format!("[WRN] Less than {} keys!", min_keys)
}

pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.1} {}", size, UNITS[unit_index])
    }
}

pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs >= 60 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else if secs > 0 {
        format!("{}s", secs)
    } else {
        format!("{}ms", duration.as_millis())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_mode_parsing() {
        assert_eq!(OutputMode::from_string("human"), OutputMode::Human);
        assert_eq!(OutputMode::from_string("JSON"), OutputMode::Json);
        assert_eq!(OutputMode::from_string("plain"), OutputMode::Plain);
        assert_eq!(OutputMode::from_string("invalid"), OutputMode::Human);
    }

    #[test]
    fn test_quiet_mode() {
        let formatter = OutputFormatter::new(OutputMode::Human, 2, true);
        assert_eq!(formatter.verbose_level, 0);
        assert!(formatter.quiet);
        assert!(!formatter.use_colors);
    }

    #[test]
    fn test_json_mode_has_no_colors() {
        let formatter = OutputFormatter::new(OutputMode::Json, 0, false);
        assert_eq!(formatter.mode, OutputMode::Json);
        assert!(!formatter.use_colors);
    }

    #[test]
    fn test_key_count_warning() {
        assert_eq!(key_count_warning(15), "[WRN] Less than 15 keys!");
        assert_eq!(key_count_warning(4), "[WRN] Less than 4 keys!");
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(1024), "1.0 KB");
        assert_eq!(format_bytes(1536), "1.5 KB");
        assert_eq!(format_bytes(1048576), "1.0 MB");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_secs(30)), "30s");
        assert_eq!(format_duration(Duration::from_secs(90)), "1m 30s");
        assert_eq!(format_duration(Duration::from_millis(500)), "500ms");
    }

    #[test]
    fn test_should_show_message() {
        let formatter = OutputFormatter::new(OutputMode::Plain, 1, false);
        assert!(formatter.should_show_message(0));
        assert!(formatter.should_show_message(1));
        assert!(!formatter.should_show_message(2));

        let quiet_formatter = OutputFormatter::new(OutputMode::Plain, 2, true);
        assert!(!quiet_formatter.should_show_message(0));
    }
}
