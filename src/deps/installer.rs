//! Silent installation of dependencies.
//!
//! One dependency at a time: probe, download if the descriptor carries a
//! URL, run the vendor's silent-install command, clean up the downloaded
//! package. Installer packages are scratch files — they are deleted on
//! success and on failure alike.

use crate::deps::checker::{CheckStatus, Checker};
use crate::deps::registry::{Descriptor, InstallMethod};
use crate::net::Downloader;
use crate::shell::{self, CommandOptions};
use std::path::{Path, PathBuf};

/// What the installer did for one dependency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallAction {
    /// The install command ran and exited zero.
    Installed,

    /// The probe matched, so no install action was taken.
    AlreadyPresent,

    /// Nothing was attempted (database steps, missing prerequisites).
    Skipped,

    /// A download or install command failed.
    Failed,
}

/// Outcome of one install request.
#[derive(Debug, Clone)]
pub struct InstallOutcome {
    pub dependency: String,
    pub action: InstallAction,
    /// Human-readable detail for the status line.
    pub detail: String,
}

impl InstallOutcome {
    /// Whether this outcome counts as a success for the process exit code.
    pub fn succeeded(&self) -> bool {
        !matches!(self.action, InstallAction::Failed)
    }
}

/// Runs silent installs against the live system.
pub struct Installer<'a> {
    downloader: &'a Downloader,
    scratch_dir: PathBuf,
    /// Substituted for `{password}` in install argv templates.
    root_password: String,
}

impl<'a> Installer<'a> {
    /// Create an installer that downloads packages into `scratch_dir`.
    pub fn new(downloader: &'a Downloader, scratch_dir: &Path, root_password: &str) -> Self {
        Self {
            downloader,
            scratch_dir: scratch_dir.to_path_buf(),
            root_password: root_password.to_string(),
        }
    }

    /// Install one dependency.
    ///
    /// When the probe reports the dependency present, nothing runs and the
    /// outcome says so — the caller always learns whether an action was
    /// actually taken.
    pub fn install(&self, descriptor: &Descriptor, checker: &mut Checker) -> InstallOutcome {
        if let CheckStatus::Present { version } = checker.check(descriptor) {
            let detail = match version {
                Some(v) => format!("already installed (version {})", v),
                None => "already installed".to_string(),
            };
            return self.outcome(descriptor, InstallAction::AlreadyPresent, detail);
        }

        let outcome = match &descriptor.install {
            InstallMethod::Package { download, command } => {
                let package = self.scratch_dir.join(&download.file_name);
                if let Err(e) = self.downloader.download(&download.url, &package) {
                    return self.outcome(descriptor, InstallAction::Failed, e.to_string());
                }

                let cmd = command.resolve(
                    Some(&package.to_string_lossy()),
                    &self.root_password,
                );
                let result = self.run_install(descriptor, &cmd);

                // The package is scratch data either way.
                if let Err(e) = std::fs::remove_file(&package) {
                    tracing::warn!(
                        "Could not remove {}: {}",
                        package.display(),
                        e
                    );
                }
                result
            }

            InstallMethod::Command(command) => {
                let cmd = command.resolve(None, &self.root_password);
                self.run_install(descriptor, &cmd)
            }

            InstallMethod::DatabaseStep(_) => self.outcome(
                descriptor,
                InstallAction::Skipped,
                "database step, handled by the configurator".to_string(),
            ),
        };

        if outcome.action == InstallAction::Installed {
            checker.invalidate(&descriptor.name);
        }
        outcome
    }

    fn run_install(
        &self,
        descriptor: &Descriptor,
        cmd: &crate::shell::CommandLine,
    ) -> InstallOutcome {
        tracing::info!("Installing {}...", descriptor.name);
        tracing::debug!("Install command: {}", cmd);

        match shell::run(cmd, &CommandOptions::default()) {
            Ok(result) if result.success => self.outcome(
                descriptor,
                InstallAction::Installed,
                format!("installed in {:.1}s", result.duration.as_secs_f64()),
            ),
            Ok(result) => self.outcome(
                descriptor,
                InstallAction::Failed,
                format!(
                    "installer exited with code {}",
                    result
                        .exit_code
                        .map(|c| c.to_string())
                        .unwrap_or_else(|| "unknown".to_string())
                ),
            ),
            Err(e) => self.outcome(descriptor, InstallAction::Failed, e.to_string()),
        }
    }

    fn outcome(
        &self,
        descriptor: &Descriptor,
        action: InstallAction,
        detail: String,
    ) -> InstallOutcome {
        InstallOutcome {
            dependency: descriptor.name.clone(),
            action,
            detail,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deps::registry::{CommandTemplate, Download, Probe};
    use crate::shell::CommandLine;
    use httpmock::prelude::*;
    use std::time::Duration;

    fn shell_template(script: &str) -> CommandTemplate {
        if cfg!(target_os = "windows") {
            CommandTemplate::new("cmd", &["/C", script])
        } else {
            CommandTemplate::new("sh", &["-c", script])
        }
    }

    fn command_descriptor(name: &str, script: &str) -> Descriptor {
        Descriptor {
            name: name.to_string(),
            probe: None,
            install: InstallMethod::Command(shell_template(script)),
            uninstall: None,
            uninstall_hint: None,
        }
    }

    fn package_descriptor(name: &str, url: &str, file_name: &str, script: &str) -> Descriptor {
        Descriptor {
            name: name.to_string(),
            probe: None,
            install: InstallMethod::Package {
                download: Download {
                    url: url.to_string(),
                    file_name: file_name.to_string(),
                },
                command: shell_template(script),
            },
            uninstall: None,
            uninstall_hint: None,
        }
    }

    fn present_probe() -> Probe {
        let command = if cfg!(target_os = "windows") {
            CommandLine::new("cmd", &["/C", "echo tool v2.0.1"])
        } else {
            CommandLine::new("echo", &["tool v2.0.1"])
        };
        Probe::CommandOutput {
            command,
            marker: "tool".to_string(),
            version_pattern: Some(r"v(\S+)".to_string()),
        }
    }

    #[test]
    fn command_install_exit_zero_is_installed() {
        let downloader = Downloader::new(Duration::from_secs(5));
        let temp = tempfile::TempDir::new().unwrap();
        let installer = Installer::new(&downloader, temp.path(), "pw");
        let mut checker = Checker::new();

        let outcome = installer.install(&command_descriptor("Tool", "exit 0"), &mut checker);
        assert_eq!(outcome.action, InstallAction::Installed);
        assert!(outcome.succeeded());
    }

    #[test]
    fn command_install_exit_nonzero_is_failed() {
        let downloader = Downloader::new(Duration::from_secs(5));
        let temp = tempfile::TempDir::new().unwrap();
        let installer = Installer::new(&downloader, temp.path(), "pw");
        let mut checker = Checker::new();

        let outcome = installer.install(&command_descriptor("Tool", "exit 7"), &mut checker);
        assert_eq!(outcome.action, InstallAction::Failed);
        assert!(!outcome.succeeded());
        assert!(outcome.detail.contains("7"));
    }

    #[test]
    fn present_dependency_is_not_reinstalled() {
        let downloader = Downloader::new(Duration::from_secs(5));
        let temp = tempfile::TempDir::new().unwrap();
        let installer = Installer::new(&downloader, temp.path(), "pw");
        let mut checker = Checker::new();

        // The install command would fail if it ran; the probe short-circuits it.
        let mut descriptor = command_descriptor("Tool", "exit 1");
        descriptor.probe = Some(present_probe());

        let outcome = installer.install(&descriptor, &mut checker);
        assert_eq!(outcome.action, InstallAction::AlreadyPresent);
        assert!(outcome.succeeded());
        assert!(outcome.detail.contains("2.0.1"));
    }

    #[test]
    fn package_install_success_removes_downloaded_file() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/tool.msi");
            then.status(200).body("payload");
        });

        let downloader = Downloader::new(Duration::from_secs(5));
        let temp = tempfile::TempDir::new().unwrap();
        let installer = Installer::new(&downloader, temp.path(), "pw");
        let mut checker = Checker::new();

        let descriptor =
            package_descriptor("Tool", &server.url("/tool.msi"), "tool.msi", "exit 0");
        let outcome = installer.install(&descriptor, &mut checker);

        assert_eq!(outcome.action, InstallAction::Installed);
        assert!(!temp.path().join("tool.msi").exists());
    }

    #[test]
    fn package_install_failure_also_removes_downloaded_file() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/tool.msi");
            then.status(200).body("payload");
        });

        let downloader = Downloader::new(Duration::from_secs(5));
        let temp = tempfile::TempDir::new().unwrap();
        let installer = Installer::new(&downloader, temp.path(), "pw");
        let mut checker = Checker::new();

        let descriptor =
            package_descriptor("Tool", &server.url("/tool.msi"), "tool.msi", "exit 1");
        let outcome = installer.install(&descriptor, &mut checker);

        assert_eq!(outcome.action, InstallAction::Failed);
        assert!(!temp.path().join("tool.msi").exists());
    }

    #[test]
    fn package_download_failure_is_failed_without_running_installer() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/tool.msi");
            then.status(500);
        });

        let downloader = Downloader::new(Duration::from_secs(5));
        let temp = tempfile::TempDir::new().unwrap();
        let marker = temp.path().join("ran");
        let installer = Installer::new(&downloader, temp.path(), "pw");
        let mut checker = Checker::new();

        let script = format!("touch {}", marker.display());
        let descriptor =
            package_descriptor("Tool", &server.url("/tool.msi"), "tool.msi", &script);
        let outcome = installer.install(&descriptor, &mut checker);

        assert_eq!(outcome.action, InstallAction::Failed);
        assert!(!marker.exists(), "installer must not run after download failure");
    }

    #[test]
    fn installer_path_is_substituted_into_command() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/tool.msi");
            then.status(200).body("payload");
        });

        let downloader = Downloader::new(Duration::from_secs(5));
        let temp = tempfile::TempDir::new().unwrap();
        let copy = temp.path().join("copy.msi");
        let installer = Installer::new(&downloader, temp.path(), "pw");
        let mut checker = Checker::new();

        // Copy the downloaded package before the cleanup pass removes it.
        let script = format!("cp {} {}", crate::deps::registry::INSTALLER_PLACEHOLDER, copy.display());
        let descriptor = Descriptor {
            name: "Tool".to_string(),
            probe: None,
            install: InstallMethod::Package {
                download: Download {
                    url: server.url("/tool.msi"),
                    file_name: "tool.msi".to_string(),
                },
                command: CommandTemplate {
                    program: "sh".to_string(),
                    args: vec!["-c".to_string(), script],
                },
            },
            uninstall: None,
            uninstall_hint: None,
        };

        let outcome = installer.install(&descriptor, &mut checker);
        assert_eq!(outcome.action, InstallAction::Installed);
        assert_eq!(std::fs::read_to_string(&copy).unwrap(), "payload");
        assert!(!temp.path().join("tool.msi").exists());
    }

    #[test]
    fn database_step_is_skipped() {
        use crate::deps::registry::DatabaseStep;

        let downloader = Downloader::new(Duration::from_secs(5));
        let temp = tempfile::TempDir::new().unwrap();
        let installer = Installer::new(&downloader, temp.path(), "pw");
        let mut checker = Checker::new();

        let descriptor = Descriptor {
            name: "MySQLDatabase".to_string(),
            probe: None,
            install: InstallMethod::DatabaseStep(DatabaseStep::SchemaLoad),
            uninstall: None,
            uninstall_hint: None,
        };

        let outcome = installer.install(&descriptor, &mut checker);
        assert_eq!(outcome.action, InstallAction::Skipped);
        assert!(outcome.succeeded());
    }
}
