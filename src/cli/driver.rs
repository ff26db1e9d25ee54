//! Work item dispatch.
//!
//! The driver walks the requested items in a fixed order — uninstalls,
//! path removals, installs — and keeps going past failures. Every item
//! produces a printed status line and contributes to the aggregate exit
//! code; nothing rolls back.

use crate::cli::args::Cli;
use crate::config::SetupConfig;
use crate::deps::registry::{DatabaseStep, DependencyRegistry, InstallMethod, MYSQL_SERVER_VERSION};
use crate::deps::{self, CheckStatus, Checker, InstallAction, Installer, StepStatus};
use crate::mysql::{self, Configurator, MysqlCli};
use crate::net::Downloader;
use crate::ui::Output;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_DOWNLOAD_TIMEOUT_SECS: u64 = 300;

/// Tally of processed items.
#[derive(Debug, Default, Clone, Copy)]
pub struct RunSummary {
    pub processed: usize,
    pub failed: usize,
}

impl RunSummary {
    fn record(&mut self, failed: bool) {
        self.processed += 1;
        if failed {
            self.failed += 1;
        }
    }

    /// Process exit code: zero only when every item succeeded.
    pub fn exit_code(&self) -> u8 {
        if self.failed == 0 {
            0
        } else {
            1
        }
    }
}

/// Processes a parsed command line against the live system.
pub struct Driver {
    registry: DependencyRegistry,
    config: SetupConfig,
    output: Output,
    scratch_dir: PathBuf,
}

impl Driver {
    pub fn new(
        registry: DependencyRegistry,
        config: SetupConfig,
        output: Output,
        scratch_dir: PathBuf,
    ) -> Self {
        Self {
            registry,
            config,
            output,
            scratch_dir,
        }
    }

    /// Process all requested items. Never fails part-way: item failures
    /// land in the summary, not in an `Err`.
    pub fn run(&self, cli: &Cli) -> RunSummary {
        let mut summary = RunSummary::default();
        let mut checker = Checker::new();

        if cli.check || !cli.has_items() {
            self.print_check_report(&mut checker);
            return summary;
        }

        for name in &cli.uninstall {
            self.process_uninstall(name, &mut summary);
        }

        for path in &cli.remove_path {
            self.process_remove_path(path, &mut summary);
        }

        let timeout = self
            .config
            .download_timeout_secs
            .unwrap_or(DEFAULT_DOWNLOAD_TIMEOUT_SECS);
        let downloader = Downloader::new(Duration::from_secs(timeout))
            .with_progress(self.output.mode().shows_progress());
        let installer = Installer::new(&downloader, &self.scratch_dir, &self.config.database.password);

        for name in &cli.install {
            self.process_install(name, cli, &installer, &mut checker, &mut summary);
        }

        summary
    }

    fn process_uninstall(&self, name: &str, summary: &mut RunSummary) {
        let descriptor = match self.registry.require(name) {
            Ok(d) => d,
            Err(e) => {
                self.output.failure(name, &e.to_string());
                summary.record(true);
                return;
            }
        };

        let outcome = deps::uninstall(descriptor);
        match outcome.status {
            StepStatus::Succeeded => self.output.success(name, &outcome.detail),
            StepStatus::NotRun => self.output.skipped(name, &outcome.detail),
            StepStatus::Failed => self.output.failure(name, &outcome.detail),
        }
        summary.record(outcome.status.is_failure());
    }

    fn process_remove_path(&self, path: &Path, summary: &mut RunSummary) {
        let outcome = deps::remove_path(path);
        let label = path.display().to_string();
        match outcome.status {
            StepStatus::Succeeded => self.output.success(&label, &outcome.detail),
            StepStatus::NotRun => self.output.skipped(&label, &outcome.detail),
            StepStatus::Failed => self.output.failure(&label, &outcome.detail),
        }
        summary.record(outcome.status.is_failure());
    }

    fn process_install(
        &self,
        name: &str,
        cli: &Cli,
        installer: &Installer,
        checker: &mut Checker,
        summary: &mut RunSummary,
    ) {
        let descriptor = match self.registry.require(name) {
            Ok(d) => d,
            Err(e) => {
                self.output.failure(name, &e.to_string());
                summary.record(true);
                return;
            }
        };

        // Database pseudo-steps run against an explicitly named server.
        if let InstallMethod::DatabaseStep(step) = &descriptor.install {
            self.process_database_step(name, *step, cli.mysql_path.as_deref(), summary);
            return;
        }

        let outcome = installer.install(descriptor, checker);
        match outcome.action {
            InstallAction::Installed => self.output.success(name, &outcome.detail),
            InstallAction::AlreadyPresent | InstallAction::Skipped => {
                self.output.skipped(name, &outcome.detail)
            }
            InstallAction::Failed => self.output.failure(name, &outcome.detail),
        }
        summary.record(!outcome.succeeded());

        // A fresh server install is followed by a full provisioning pass
        // against the instance it just created.
        if name == "MySQLServer" && outcome.succeeded() {
            self.configure_new_server(summary);
        }
    }

    fn configure_new_server(&self, summary: &mut RunSummary) {
        match mysql::configure_installed_server(&self.config.database) {
            Ok(report) => {
                self.report_step("MySQLServer schema", &report.schema, summary);
                self.report_step("MySQLServer auth plugin", &report.auth_plugin, summary);
                if report.succeeded() {
                    self.output
                        .status(&format!("MySQL Server {} is valid", MYSQL_SERVER_VERSION));
                }
            }
            Err(e) => {
                self.output.failure("MySQLServer configuration", &e.to_string());
                summary.record(true);
            }
        }
    }

    fn process_database_step(
        &self,
        name: &str,
        step: DatabaseStep,
        mysql_path: Option<&Path>,
        summary: &mut RunSummary,
    ) {
        let Some(mysql_path) = mysql_path else {
            self.output.failure(name, "requires --mysql-path");
            summary.record(true);
            return;
        };

        let client = MysqlCli::new(&mysql_path.join("bin"), &self.config.database);
        let configurator = Configurator::new(&self.config.database);
        let report = match step {
            DatabaseStep::SchemaLoad => configurator.ensure_schema(&client),
            DatabaseStep::AuthPlugin => configurator.ensure_auth_plugin(&client),
        };
        self.report_step(name, &report, summary);
    }

    fn report_step(&self, label: &str, report: &mysql::StepReport, summary: &mut RunSummary) {
        match report.status {
            StepStatus::Failed => self.output.failure(label, &report.detail),
            _ if report.action_taken => self.output.success(label, &report.detail),
            _ => self.output.skipped(label, &report.detail),
        }
        summary.record(report.status.is_failure());
    }

    fn print_check_report(&self, checker: &mut Checker) {
        for item in checker.check_all(&self.registry) {
            match item.status {
                CheckStatus::Present { version: Some(v) } => {
                    self.output.success(&item.dependency, &format!("present ({})", v))
                }
                CheckStatus::Present { version: None } => {
                    self.output.success(&item.dependency, "present")
                }
                CheckStatus::Absent => self.output.skipped(&item.dependency, "absent"),
            }
        }
    }
}
