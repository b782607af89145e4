mod command;
mod config;
mod models;
mod notify;
mod pipeline;
mod report;

use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;

use crate::command::SystemRunner;
use crate::config::{default_config_path, load_config};
use crate::pipeline::run_backup;
use crate::report::RunReport;

#[derive(Parser)]
#[command(name = "backhaul")]
#[command(
    about = "Archive configured files, ship them to remote storage, and report the result",
    long_about = None
)]
struct Cli {
    /// Path to the JSON config file (defaults to ~/backupConfig.json)
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.unwrap_or_else(default_config_path);
    let config = load_config(&config_path)?;

    let datestring = Utc::now().format("%Y-%m-%d_%Hh%Mm").to_string();

    println!("{}", "─".repeat(60).dimmed());
    println!("{}", "Running backup".cyan().bold());
    println!("{}", "─".repeat(60).dimmed());

    let outcome = run_backup(&config, &datestring, &mut SystemRunner);
    let report = RunReport::new(&config, &datestring, &outcome);

    println!("{}", "─".repeat(60).dimmed());
    if report.ok {
        println!("{} Backup OK on {}", "✓".green().bold(), report.datestring);
    } else {
        eprintln!(
            "{} Backup ERRORED on {}",
            "✗".red().bold(),
            report.datestring
        );
    }

    notify::notify(&config, &report)?;

    if config.smtp.is_some() {
        println!("{} Report mailed.", "[*]".blue());
    }
    if let Some(path) = &config.message_file {
        println!("{} Report appended to {}", "[*]".blue(), path.display());
    }

    if !report.ok {
        // The failure is already in the report; the exit code just has to
        // reflect it.
        std::process::exit(1);
    }

    Ok(())
}
