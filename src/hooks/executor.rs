use crate::domain::template::substitute;
use crate::error::Result;
use crate::hooks::lifecycle::to_env_vars;
use std::collections::HashMap;
use std::path::Path;
use std::process::Command;
use tracing::{debug, instrument};

/// Exit status and combined output of a post-tag command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// `None` when the process was terminated by a signal
    pub exit_code: Option<i32>,
    /// stdout followed by stderr
    pub output: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Runs user configured post-tag commands through the platform shell
pub struct CommandExecutor;

impl CommandExecutor {
    /// Substitute context placeholders into `command` and run it.
    ///
    /// A non-zero exit is not an error here; it is reported in the returned
    /// [`CommandOutput`]. Only a failure to spawn the shell is an `Err`.
    #[instrument(skip(context))]
    pub fn run(
        command: &str,
        context: &HashMap<String, String>,
        working_dir: Option<&Path>,
    ) -> Result<CommandOutput> {
        let expanded = substitute(command, context);
        debug!(expanded = %expanded, "running post-tag command");

        let mut cmd = shell_command(&expanded);
        cmd.envs(to_env_vars(context));
        if let Some(dir) = working_dir {
            cmd.current_dir(dir);
        }

        let output = cmd.output()?;

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        let result = CommandOutput {
            exit_code: output.status.code(),
            output: combined,
        };
        debug!(exit_code = ?result.exit_code, "post-tag command finished");
        Ok(result)
    }
}

#[cfg(unix)]
fn shell_command(command: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(command);
    cmd
}

#[cfg(windows)]
fn shell_command(command: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.arg("/C").arg(command);
    cmd
}
