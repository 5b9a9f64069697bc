// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// textgrab: text extraction from images, PDFs and screenshots.
//
// Entry point. Initialises logging, loads the config, probes for Tesseract
// and runs the requested command.

mod cli;
mod commands;
mod services;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use textgrab_core::AppConfig;
use textgrab_core::error::{Result, TextgrabError};
use textgrab_core::human_errors::{Severity, humanize_error};

use cli::{Cli, Command};
use commands::Context;
use services::config_dir;
use services::engine::EngineStatus;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    tracing::debug!(?cli, "textgrab starting");

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            report(&err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<bool> {
    let config = config_dir::load(cli.config.as_deref())?;
    let tesseract = cli.tesseract;
    match cli.command {
        Command::Export(args) => commands::export::run(&args, &config),
        Command::Extract(args) => commands::extract::run(&args, &context(config, tesseract)),
        Command::Paste(args) => commands::paste::run(&args, &context(config, tesseract)),
        Command::Languages => commands::languages::run(&context(config, tesseract)),
    }
}

/// Probe for the engine; `--tesseract` beats the config file.
fn context(config: AppConfig, flag: Option<PathBuf>) -> Context {
    let explicit = flag.or_else(|| config.tesseract_path.clone());
    Context {
        engine: EngineStatus::probe(explicit.as_deref()),
        config,
    }
}

fn report(err: &TextgrabError) {
    tracing::error!(%err, "textgrab failed");
    let human = humanize_error(err);
    eprintln!("{}: {}", heading(human.severity), human.message);
    eprintln!("{}", human.suggestion);
}

/// Label for the error line, hinting at the kind of fix needed.
fn heading(severity: Severity) -> &'static str {
    match severity {
        Severity::Transient => "Temporary error",
        Severity::ActionRequired => "Error",
        Severity::Permanent => "Invalid input",
        Severity::InstallRequired => "Missing dependency",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heading_follows_severity() {
        let missing = TextgrabError::EngineMissing("tesseract not on PATH".into());
        assert_eq!(heading(humanize_error(&missing).severity), "Missing dependency");
        let config = TextgrabError::Config("bad key".into());
        assert_eq!(heading(humanize_error(&config).severity), "Error");
    }
}
