pub mod cli;
pub mod commands;
pub mod error;

use std::process::ExitCode;

use notewell_core::config::{default_settings_path, RecursionDepth};
use notewell_core::ImportSettings;
use serde::Serialize;

use crate::cli::{Args, Command};
use crate::error::CommandResult;

/// Initialize tracing/logging with the given directives. Output goes to
/// stderr so stdout only carries command results.
pub fn init_logging(directives: &[&str]) {
    let mut filter = tracing_subscriber::EnvFilter::from_default_env();
    for directive in directives {
        match directive.parse() {
            Ok(directive) => filter = filter.add_directive(directive),
            Err(e) => eprintln!("Ignoring invalid log directive '{directive}': {e}"),
        }
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

pub fn run(args: Args) -> ExitCode {
    let settings_path = args.settings.clone().or_else(default_settings_path);
    let loaded = match &settings_path {
        Some(path) => ImportSettings::try_load(path),
        None => Ok(ImportSettings::default()),
    };

    let debug = args.debug || loaded.as_ref().is_ok_and(|s| s.debug_enabled);
    init_logging(&[if debug { "notewell=debug" } else { "notewell=info" }]);

    let settings = loaded.unwrap_or_else(|e| {
        tracing::warn!("{:#}; using default settings", e);
        ImportSettings::default()
    });
    if let Some(path) = &settings_path {
        tracing::debug!(path = %path.display(), "Settings file");
    }

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("Failed to create tokio runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let json = args.json;
    match rt.block_on(dispatch(args.command, settings, json)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if json {
                print_json(&e);
            } else {
                tracing::error!("{}", e);
            }
            ExitCode::from(e.exit_code())
        }
    }
}

async fn dispatch(command: Command, mut settings: ImportSettings, json: bool) -> CommandResult<()> {
    match command {
        Command::Import {
            vault,
            overrides,
            show_log,
        } => {
            overrides.apply(&mut settings);
            let report = commands::import(&settings, &vault, show_log).await?;
            if json {
                print_json(&report);
            } else {
                println!("{}", report.summary);
                if let Some(log) = &report.log {
                    println!("\n{log}");
                }
            }
        }
        Command::Check { overrides } => {
            overrides.apply(&mut settings);
            let config = commands::check(&settings)?;
            if json {
                print_json(&config);
            } else {
                println!("Settings are valid.");
                println!("Source: {}", config.source_root.display());
                println!(
                    "Extensions: {}",
                    config
                        .extensions
                        .iter()
                        .map(|kind| kind.extension())
                        .collect::<Vec<_>>()
                        .join(", ")
                );
                match config.max_depth {
                    RecursionDepth::Unlimited => println!("Depth: unlimited"),
                    RecursionDepth::Levels(levels) => println!("Depth: {levels}"),
                }
                println!("Destination: {}", config.destination_root);
                println!("Dry run: {}", config.dry_run);
            }
        }
        Command::Logs { vault, destination } => {
            let destination = destination.unwrap_or_else(|| settings.destination_root.clone());
            let list = commands::logs(&vault, &destination).await?;
            if json {
                print_json(&list);
            } else if list.logs.is_empty() {
                println!("No import logs found.");
            } else {
                for log in &list.logs {
                    println!("{log}");
                }
            }
        }
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(e) => tracing::error!("Failed to serialize output: {}", e),
    }
}
