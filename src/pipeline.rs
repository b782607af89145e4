use colored::Colorize;
use std::fs;

use crate::command::{RunError, ToolRunner};
use crate::models::Config;

/// Runs the four backup steps in order: archive, upload, delete the local
/// archive, prune old remote copies. The first failure stops the run and is
/// returned to the caller; nothing after it executes.
pub fn run_backup(
    config: &Config,
    datestring: &str,
    runner: &mut dyn ToolRunner,
) -> Result<(), RunError> {
    let filename = config.archive_filename(datestring);
    let remote = &config.remote_output_location;

    // Remote copies must outlive the configured retention before they are
    // deleted, so the prune filter is one day past the threshold.
    let min_age_days = config.delete_older_than_days + 1;

    println!(
        "{} Archiving {} file(s) -> {}",
        "[*]".blue(),
        config.files.len(),
        filename
    );
    let mut tar_args = vec!["-czvf".to_string(), filename.clone()];
    tar_args.extend(config.files.iter().cloned());
    runner.run("tar", &tar_args)?;

    println!("{} Uploading {} -> {}", "[*]".blue(), filename, remote);
    runner.run(
        "rclone",
        &[
            "copy".to_string(),
            "-v".to_string(),
            filename.clone(),
            remote.clone(),
        ],
    )?;

    println!("{} Removing local copy {}", "[*]".blue(), filename);
    fs::remove_file(&filename).map_err(|source| RunError::File {
        context: format!("Failed to delete local archive {filename}"),
        source,
    })?;

    println!(
        "{} Pruning remote copies older than {} day(s)",
        "[*]".blue(),
        min_age_days
    );
    runner.run(
        "rclone",
        &[
            "delete".to_string(),
            "-v".to_string(),
            "--min-age".to_string(),
            format!("{min_age_days}d"),
            remote.clone(),
        ],
    )?;

    Ok(())
}
