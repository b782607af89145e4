use anyhow::{Context, Result};
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::models::{Config, SmtpConfig};
use crate::report::RunReport;

/// The message log keeps only the most recent runs.
const MESSAGE_LOG_CAP: usize = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub time: i64,
    pub subject: String,
    pub content: String,
}

/// Delivers the report over every configured channel. Mail goes first; a
/// failure on either channel fails the whole notification.
pub fn notify(config: &Config, report: &RunReport) -> Result<()> {
    if let Some(smtp) = &config.smtp {
        send_report_email(smtp, &report.mail_subject(), &report.body)?;
    }

    if let Some(path) = &config.message_file {
        let entry = LogEntry {
            time: chrono::Utc::now().timestamp(),
            subject: report.log_subject(),
            content: report.body.clone(),
        };
        append_message(path, entry)?;
    }

    Ok(())
}

fn send_report_email(smtp: &SmtpConfig, subject: &str, content: &str) -> Result<()> {
    let email = Message::builder()
        .from(
            smtp.from
                .parse()
                .with_context(|| format!("Invalid sender address: {}", smtp.from))?,
        )
        .to(smtp
            .to
            .parse()
            .with_context(|| format!("Invalid recipient address: {}", smtp.to))?)
        .subject(subject)
        .header(ContentType::TEXT_PLAIN)
        .body(content.to_string())
        .context("Failed to build report email")?;

    let mailer = SmtpTransport::starttls_relay(&smtp.server)
        .with_context(|| format!("Failed to set up SMTP relay for {}", smtp.server))?
        .port(smtp.port)
        .credentials(Credentials::new(
            smtp.username.clone(),
            smtp.password.clone(),
        ))
        .build();

    mailer
        .send(&email)
        .with_context(|| format!("Failed to send report email via {}", smtp.server))?;

    Ok(())
}

fn load_message_log(path: &Path) -> Result<Vec<LogEntry>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read message log: {}", path.display()))?;
    let entries = serde_json::from_str::<Vec<LogEntry>>(&raw)
        .with_context(|| format!("Failed to parse message log JSON: {}", path.display()))?;
    Ok(entries)
}

fn save_message_log_atomic(path: &Path, entries: &[LogEntry]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create message log directory: {}", parent.display())
            })?;
        }
    }

    let tmp = path.with_extension("json.tmp");
    let raw = serde_json::to_string(entries).context("Failed to serialize message log")?;
    fs::write(&tmp, raw)
        .with_context(|| format!("Failed to write temp message log: {}", tmp.display()))?;

    // Windows doesn't allow rename over an existing file.
    if path.exists() {
        let _ = fs::remove_file(path);
    }

    fs::rename(&tmp, path)
        .with_context(|| format!("Failed to replace message log {}", path.display()))?;

    Ok(())
}

/// Appends to the rotating log, newest last. The log never grows past
/// `MESSAGE_LOG_CAP` entries; the oldest are dropped first.
pub fn append_message(path: &Path, entry: LogEntry) -> Result<()> {
    let mut entries = load_message_log(path)?;

    if entries.len() >= MESSAGE_LOG_CAP {
        let excess = entries.len() + 1 - MESSAGE_LOG_CAP;
        entries.drain(..excess);
    }
    entries.push(entry);

    save_message_log_atomic(path, &entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_log_path(tag: &str) -> PathBuf {
        let unique = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        std::env::temp_dir().join(format!("backhaul_{tag}_{unique}.json"))
    }

    fn entry(n: i64) -> LogEntry {
        LogEntry {
            time: n,
            subject: format!("Backup OK #{n}"),
            content: format!("run {n}"),
        }
    }

    #[test]
    fn test_missing_log_file_is_treated_as_empty() {
        let path = temp_log_path("missing");
        let entries = load_message_log(&path).expect("missing file should not be an error");
        assert!(entries.is_empty());
    }

    #[test]
    fn test_append_creates_log_and_keeps_newest_last() {
        let path = temp_log_path("append");

        append_message(&path, entry(1)).expect("append should succeed");
        append_message(&path, entry(2)).expect("append should succeed");
        let entries = load_message_log(&path).expect("log should load");

        let _ = fs::remove_file(&path);

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].time, 1);
        assert_eq!(entries[1].time, 2);
    }

    #[test]
    fn test_log_is_capped_at_ten_entries_fifo() {
        let path = temp_log_path("cap");

        for n in 1..=11 {
            append_message(&path, entry(n)).expect("append should succeed");
        }
        let entries = load_message_log(&path).expect("log should load");

        let _ = fs::remove_file(&path);

        assert_eq!(entries.len(), 10);
        assert_eq!(entries[0].time, 2, "oldest entry must be dropped first");
        assert_eq!(entries[9].time, 11);
    }

    #[test]
    fn test_log_round_trips_the_wire_format() {
        let path = temp_log_path("wire");

        append_message(
            &path,
            LogEntry {
                time: 1754390000,
                subject: "Backup OK".to_string(),
                content: "No errors reported.".to_string(),
            },
        )
        .expect("append should succeed");
        let raw = fs::read_to_string(&path).expect("log should exist");

        let _ = fs::remove_file(&path);

        let value: serde_json::Value = serde_json::from_str(&raw).expect("log should be JSON");
        let first = &value.as_array().expect("log should be an array")[0];
        assert_eq!(first["time"], 1754390000);
        assert_eq!(first["subject"], "Backup OK");
        assert_eq!(first["content"], "No errors reported.");
    }

    #[test]
    fn test_corrupt_log_is_an_error() {
        let path = temp_log_path("corrupt");
        fs::write(&path, "not json").expect("Failed to write test file");

        let result = load_message_log(&path);

        let _ = fs::remove_file(&path);

        assert!(result.is_err());
    }
}
