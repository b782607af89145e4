use std::process::Command;
use thiserror::Error;

/// Failure of a single pipeline step.
#[derive(Debug, Error)]
pub enum RunError {
    /// An external tool ran but exited non-zero. `output` holds the captured
    /// stdout followed by stderr.
    #[error("Failed to run command `{cmdline}`: exited with return code {code}")]
    Command {
        cmdline: String,
        code: i32,
        output: String,
    },
    /// Anything OS-level: a tool that could not be launched, a file that
    /// could not be deleted.
    #[error("{context}")]
    File {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

/// The seam between the pipeline and the external tools it shells out to.
/// Every step is a blocking run-to-completion call with no timeout.
pub trait ToolRunner {
    fn run(&mut self, program: &str, args: &[String]) -> Result<(), RunError>;
}

/// Runs tools as real child processes.
pub struct SystemRunner;

impl ToolRunner for SystemRunner {
    fn run(&mut self, program: &str, args: &[String]) -> Result<(), RunError> {
        let cmdline = render_cmdline(program, args);

        let output = Command::new(program)
            .args(args)
            .output()
            .map_err(|source| RunError::File {
                context: format!("Failed to launch `{cmdline}`"),
                source,
            })?;

        if output.status.success() {
            return Ok(());
        }

        // stderr follows stdout; the streams are captured separately.
        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        Err(RunError::Command {
            cmdline,
            code: output.status.code().unwrap_or(-1),
            output: combined,
        })
    }
}

pub fn render_cmdline(program: &str, args: &[String]) -> String {
    let mut cmdline = String::from(program);
    for arg in args {
        cmdline.push(' ');
        cmdline.push_str(arg);
    }
    cmdline
}
