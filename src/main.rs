use clap::Parser;
use propmix::{Cli, OutputFormatter, OutputMode, PropMix, PropMixError, UserFriendlyError};
use std::process;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() {
    let exit_code = run();
    process::exit(exit_code);
}

fn run() -> i32 {
    let cli = Cli::parse();
    init_logging(cli.verbosity_level());

    if cli.generate_config {
        return handle_generate_config(&cli);
    }

    let propmix = match PropMix::from_cli(&cli) {
        Ok(propmix) => propmix,
        Err(e) => {
            print_startup_error(&e);
            return exit_code(&e);
        }
    };

    if cli.verify {
        return handle_verify(&propmix);
    }

    match propmix.run(cli.dry_run) {
        Ok(report) => {
            propmix.output_formatter().print_run_report(&report);
            0
        }
        Err(e) => {
            propmix.handle_error(&e);
            exit_code(&e)
        }
    }
}

/// Diagnostics go to stderr so stdout stays usable for `--dry-run` and JSON output.
fn init_logging(verbose: u8) {
    let default_filter = match verbose {
        0 => "propmix=warn",
        1 => "propmix=info",
        _ => "propmix=debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

fn exit_code(error: &PropMixError) -> i32 {
    match error {
        PropMixError::InputDirectory { .. } => 2,
        PropMixError::TooFewLines { .. }
        | PropMixError::MissingToken { .. }
        | PropMixError::ReportRead { .. } => 3,
        PropMixError::OutputWrite { .. } => 4,
        PropMixError::NoReportsFound { .. } => 5,
        PropMixError::BlockParse { .. } => 6,
        _ => 1,
    }
}

fn handle_generate_config(cli: &Cli) -> i32 {
    let config_path = cli
        .config
        .as_ref()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|| "propmix.toml".to_string());

    match PropMix::generate_sample_config(&config_path) {
        Ok(()) => {
            println!("Generated sample configuration file: {}", config_path);
            println!("\nIt is picked up automatically when named propmix.toml, otherwise:");
            println!("  propmix --config {}", config_path);
            0
        }
        Err(e) => {
            eprintln!("Failed to generate configuration file: {}", e.user_message());
            if let Some(suggestion) = e.suggestion() {
                eprintln!("Suggestion: {}", suggestion);
            }
            1
        }
    }
}

fn handle_verify(propmix: &PropMix) -> i32 {
    let results_file = &propmix.config().output.results_file;

    match propmix.verify() {
        Ok(blocks) => {
            propmix
                .output_formatter()
                .print_verification(results_file, &blocks);
            0
        }
        Err(e) => {
            propmix.handle_error(&e);
            exit_code(&e)
        }
    }
}

fn print_startup_error(error: &PropMixError) {
    let formatter = OutputFormatter::new(OutputMode::Human, 0, false);
    formatter.print_user_friendly_error(error);
}
