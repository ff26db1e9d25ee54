//! Subprocess execution.
//!
//! Commands are always a program plus an argument vector, never a string
//! handed to a shell for re-parsing. Paths and user-supplied values go in
//! as discrete arguments, so quoting and injection are non-issues.

use crate::error::{Result, SetupError};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

/// A program plus its argument vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    /// Program to execute (name resolved via PATH, or an absolute path).
    pub program: String,

    /// Arguments, passed through verbatim.
    pub args: Vec<String>,
}

impl CommandLine {
    /// Build a command line from a program and arguments.
    pub fn new(program: impl Into<String>, args: &[&str]) -> Self {
        Self {
            program: program.into(),
            args: args.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Build a command line from owned arguments.
    pub fn from_parts(program: String, args: Vec<String>) -> Self {
        Self { program, args }
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            if arg.contains(' ') {
                write!(f, " \"{}\"", arg)?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

/// Result of executing a subprocess.
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// Exit code (None if killed by signal).
    pub exit_code: Option<i32>,

    /// Standard output.
    pub stdout: String,

    /// Standard error.
    pub stderr: String,

    /// Execution duration.
    pub duration: Duration,

    /// Whether the command succeeded (exit code 0).
    pub success: bool,
}

impl CommandResult {
    /// Combined stdout + stderr, for substring probes that don't care
    /// which stream a marker landed on.
    pub fn combined_output(&self) -> String {
        let mut out = self.stdout.clone();
        out.push_str(&self.stderr);
        out
    }
}

/// Options for subprocess execution.
#[derive(Debug, Clone, Default)]
pub struct CommandOptions {
    /// Working directory.
    pub cwd: Option<PathBuf>,

    /// Environment variables (merged with system env).
    pub env: HashMap<String, String>,
}

/// Execute a command, capturing stdout and stderr.
///
/// A non-zero exit is NOT an error — it comes back as a `CommandResult`
/// with `success == false`. Only a spawn failure (program missing,
/// permission denied) produces `Err`.
pub fn run(cmd: &CommandLine, options: &CommandOptions) -> Result<CommandResult> {
    let start = Instant::now();

    let mut command = Command::new(&cmd.program);
    command.args(&cmd.args);
    command.stdout(Stdio::piped());
    command.stderr(Stdio::piped());

    if let Some(cwd) = &options.cwd {
        command.current_dir(cwd);
    }

    for (key, value) in &options.env {
        command.env(key, value);
    }

    let output = command.output().map_err(|e| SetupError::SpawnFailed {
        program: cmd.program.clone(),
        message: e.to_string(),
    })?;

    let duration = start.elapsed();

    Ok(CommandResult {
        exit_code: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        duration,
        success: output.status.success(),
    })
}

/// Execute a command and return whether it exited zero.
///
/// Spawn failures count as false; presence probes treat "couldn't even
/// launch it" the same as "it isn't there".
pub fn run_check(cmd: &CommandLine) -> bool {
    run(cmd, &CommandOptions::default())
        .map(|r| r.success)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sh(script: &str) -> CommandLine {
        if cfg!(target_os = "windows") {
            CommandLine::new("cmd", &["/C", script])
        } else {
            CommandLine::new("sh", &["-c", script])
        }
    }

    #[test]
    fn run_successful_command() {
        let result = run(&sh("echo hello"), &CommandOptions::default()).unwrap();
        assert!(result.success);
        assert_eq!(result.exit_code, Some(0));
        assert!(result.stdout.contains("hello"));
    }

    #[test]
    fn run_failing_command_is_not_err() {
        let result = run(&sh("exit 3"), &CommandOptions::default()).unwrap();
        assert!(!result.success);
        assert_eq!(result.exit_code, Some(3));
    }

    #[test]
    fn run_missing_program_is_spawn_error() {
        let cmd = CommandLine::new("definitely-not-a-real-program-5309", &[]);
        let err = run(&cmd, &CommandOptions::default()).unwrap_err();
        assert!(matches!(err, SetupError::SpawnFailed { .. }));
    }

    #[test]
    fn run_with_env() {
        let mut options = CommandOptions::default();
        options
            .env
            .insert("MY_VAR".to_string(), "my_value".to_string());

        let script = if cfg!(target_os = "windows") {
            "echo %MY_VAR%"
        } else {
            "echo $MY_VAR"
        };

        let result = run(&sh(script), &options).unwrap();
        assert!(result.success);
        assert!(result.stdout.contains("my_value"));
    }

    #[test]
    fn run_with_cwd() {
        let temp = tempfile::TempDir::new().unwrap();
        let options = CommandOptions {
            cwd: Some(temp.path().to_path_buf()),
            ..Default::default()
        };

        let script = if cfg!(target_os = "windows") {
            "cd"
        } else {
            "pwd"
        };

        let result = run(&sh(script), &options).unwrap();
        assert!(result.success);
    }

    #[test]
    fn run_check_returns_bool() {
        assert!(run_check(&sh("exit 0")));
        assert!(!run_check(&sh("exit 1")));
        assert!(!run_check(&CommandLine::new("no-such-binary-5309", &[])));
    }

    #[test]
    fn combined_output_concatenates_streams() {
        let result = run(
            &sh("echo out && echo err >&2"),
            &CommandOptions::default(),
        )
        .unwrap();
        let combined = result.combined_output();
        assert!(combined.contains("out"));
        assert!(combined.contains("err"));
    }

    #[test]
    fn display_quotes_spaced_args() {
        let cmd = CommandLine::new("mysql", &["-e", "SHOW DATABASES;"]);
        assert_eq!(cmd.to_string(), "mysql -e \"SHOW DATABASES;\"");
    }

    #[test]
    fn command_result_tracks_duration() {
        let result = run(&sh("echo fast"), &CommandOptions::default()).unwrap();
        assert!(result.duration.as_millis() < 5000);
    }
}
