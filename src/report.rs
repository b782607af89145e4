use std::error::Error as _;

use crate::command::RunError;
use crate::models::Config;

/// Outcome of one backup run, rendered once and then handed to every
/// notification channel as-is.
pub struct RunReport {
    pub datestring: String,
    pub ok: bool,
    pub body: String,
}

impl RunReport {
    pub fn new(config: &Config, datestring: &str, outcome: &Result<(), RunError>) -> Self {
        let host = hostname::get()
            .map(|h| h.to_string_lossy().into_owned())
            .unwrap_or_else(|_| "unknown".to_string());

        let mut body = format!(
            "Date: {datestring}\nHost: {host}\nremoteOutputLocation: {}\ndeleteOlderThanDays: {}\nFiles:\n",
            config.remote_output_location, config.delete_older_than_days
        );
        if config.files.is_empty() {
            body.push_str("    * None\n");
        } else {
            for file in &config.files {
                body.push_str("    * ");
                body.push_str(file);
                body.push('\n');
            }
        }
        body.push('\n');
        body.push_str(&render_detail(outcome));

        Self {
            datestring: datestring.to_string(),
            ok: outcome.is_ok(),
            body,
        }
    }

    fn status_word(&self) -> &'static str {
        if self.ok {
            "OK"
        } else {
            "ERRORED"
        }
    }

    pub fn mail_subject(&self) -> String {
        format!("Backup: {} on {}", self.status_word(), self.datestring)
    }

    pub fn log_subject(&self) -> String {
        format!("Backup {}", self.status_word())
    }
}

fn render_detail(outcome: &Result<(), RunError>) -> String {
    match outcome {
        Ok(()) => "No errors reported.".to_string(),
        Err(err @ RunError::Command { output, .. }) => {
            format!("{err}.\nBelow is the output of the failing command.\n\n{output}")
        }
        Err(err) => {
            let mut detail =
                format!("Unrecognised error caught: {err}.\nBelow is the error chain.\n");
            let mut source = err.source();
            while let Some(cause) = source {
                detail.push_str("\nCaused by: ");
                detail.push_str(&cause.to_string());
                source = cause.source();
            }
            detail
        }
    }
}
