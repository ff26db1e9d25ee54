//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::Parser;
use std::path::PathBuf;

/// basecamp - Developer environment bootstrap.
///
/// Checks for, installs, and removes prerequisite software, and provisions
/// a local MySQL instance. Items are processed strictly in order:
/// uninstalls, then path removals, then installs. A failing item never
/// stops the items after it.
#[derive(Debug, Parser)]
#[command(name = "basecamp")]
#[command(author, version, about)]
pub struct Cli {
    /// Install a dependency by name (repeatable)
    #[arg(long = "install", value_name = "NAME")]
    pub install: Vec<String>,

    /// Uninstall a dependency by name (repeatable)
    #[arg(long = "uninstall", value_name = "NAME")]
    pub uninstall: Vec<String>,

    /// Delete a leftover directory if it exists (repeatable)
    #[arg(long = "remove-path", value_name = "PATH")]
    pub remove_path: Vec<PathBuf>,

    /// MySQL server root directory, used by the MySQLDatabase and
    /// MySQLEncrypt items
    #[arg(long = "mysql-path", value_name = "PATH")]
    pub mysql_path: Option<PathBuf>,

    /// Print the dependency presence report and exit
    #[arg(long)]
    pub check: bool,

    /// Path to config file (overrides ./basecamp.yml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory for downloaded installer packages (default: current dir)
    #[arg(long, value_name = "PATH")]
    pub scratch_dir: Option<PathBuf>,

    /// Show verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Minimal output
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

impl Cli {
    /// Whether any work items were requested.
    pub fn has_items(&self) -> bool {
        !self.install.is_empty() || !self.uninstall.is_empty() || !self.remove_path.is_empty()
    }
}
