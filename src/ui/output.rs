//! Output mode and writer.

use console::style;
use std::str::FromStr;

/// Output verbosity mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Show all output including per-command detail.
    Verbose,
    /// Show status lines only.
    #[default]
    Normal,
    /// Show only failures.
    Quiet,
}

impl FromStr for OutputMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "verbose" => Ok(Self::Verbose),
            "normal" => Ok(Self::Normal),
            "quiet" => Ok(Self::Quiet),
            _ => Err(format!("unknown output mode: {}", s)),
        }
    }
}

impl OutputMode {
    /// Check if this mode shows per-item status lines.
    pub fn shows_status(&self) -> bool {
        !matches!(self, Self::Quiet)
    }

    /// Check if this mode shows download progress.
    pub fn shows_progress(&self) -> bool {
        matches!(self, Self::Verbose | Self::Normal)
    }
}

/// Output writer that respects output mode.
///
/// Colors come from `console`, which honors `NO_COLOR` and non-TTY output
/// on its own.
#[derive(Debug)]
pub struct Output {
    mode: OutputMode,
}

impl Output {
    /// Create a new output writer.
    pub fn new(mode: OutputMode) -> Self {
        Self { mode }
    }

    /// Get the output mode.
    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    /// A plain status line.
    pub fn status(&self, msg: &str) {
        if self.mode.shows_status() {
            println!("{}", msg);
        }
    }

    /// A per-item success line.
    pub fn success(&self, item: &str, detail: &str) {
        if self.mode.shows_status() {
            println!("{} {} — {}", style("ok").green().bold(), item, detail);
        }
    }

    /// A per-item skip/no-op line.
    pub fn skipped(&self, item: &str, detail: &str) {
        if self.mode.shows_status() {
            println!("{} {} — {}", style("--").dim(), item, detail);
        }
    }

    /// A per-item failure line. Always printed.
    pub fn failure(&self, item: &str, detail: &str) {
        eprintln!("{} {} — {}", style("failed").red().bold(), item, detail);
    }

    /// An error not tied to a single item. Always printed.
    pub fn error(&self, msg: &str) {
        eprintln!("{} {}", style("error:").red().bold(), msg);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_parses_from_str() {
        assert_eq!(OutputMode::from_str("verbose").unwrap(), OutputMode::Verbose);
        assert_eq!(OutputMode::from_str("NORMAL").unwrap(), OutputMode::Normal);
        assert_eq!(OutputMode::from_str("quiet").unwrap(), OutputMode::Quiet);
        assert!(OutputMode::from_str("loud").is_err());
    }

    #[test]
    fn quiet_hides_status_but_shows_progress_only_when_normal_or_verbose() {
        assert!(!OutputMode::Quiet.shows_status());
        assert!(!OutputMode::Quiet.shows_progress());
        assert!(OutputMode::Normal.shows_status());
        assert!(OutputMode::Normal.shows_progress());
        assert!(OutputMode::Verbose.shows_progress());
    }

    #[test]
    fn output_reports_its_mode() {
        let output = Output::new(OutputMode::Quiet);
        assert_eq!(output.mode(), OutputMode::Quiet);
    }
}
