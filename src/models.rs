use serde::{Deserialize, Deserializer};
use std::path::PathBuf;

/// Backup run configuration, loaded once from the JSON config file and
/// immutable for the rest of the run.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Archive file name with one `{}` slot for the run timestamp.
    #[serde(default = "default_filename_template")]
    pub filename_template: String,
    /// rclone remote the archive is copied to, e.g. "gd:/server".
    pub remote_output_location: String,
    /// Remote archives older than this many days become eligible for pruning.
    pub delete_older_than_days: i64,
    /// Mail settings for the status report. Absent or `{}` disables mail.
    #[serde(default, deserialize_with = "empty_object_as_none")]
    pub smtp: Option<SmtpConfig>,
    /// Paths handed to the archiver, in order.
    #[serde(default)]
    pub files: Vec<String>,
    /// Rotating JSON log the status report is appended to.
    #[serde(default)]
    pub message_file: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
pub struct SmtpConfig {
    pub server: String,
    pub port: u16,
    pub to: String,
    pub from: String,
    pub username: String,
    pub password: String,
}

fn default_filename_template() -> String {
    "backup_{}.tar.gz".to_string()
}

impl Config {
    /// Fills the template's `{}` slot with the run timestamp.
    pub fn archive_filename(&self, datestring: &str) -> String {
        self.filename_template.replacen("{}", datestring, 1)
    }
}

// An empty `"smtp": {}` means "no mail", so it must not go through field
// validation the way a partial object should.
fn empty_object_as_none<'de, D>(deserializer: D) -> Result<Option<SmtpConfig>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    match value {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::Object(map)) if map.is_empty() => Ok(None),
        Some(other) => serde_json::from_value(other)
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}
