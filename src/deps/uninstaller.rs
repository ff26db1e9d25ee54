//! Uninstalling dependencies and removing leftover directories.

use crate::deps::registry::Descriptor;
use crate::deps::status::StepStatus;
use crate::shell::{self, CommandOptions};
use std::path::{Path, PathBuf};

/// Outcome of one uninstall request.
#[derive(Debug, Clone)]
pub struct UninstallOutcome {
    pub dependency: String,
    pub status: StepStatus,
    pub detail: String,
}

/// Outcome of one `--remove-path` request.
#[derive(Debug, Clone)]
pub struct RemovalOutcome {
    pub path: PathBuf,
    pub status: StepStatus,
    pub detail: String,
}

/// Run a dependency's silent uninstall command.
///
/// A descriptor without an uninstall command reports `NotRun` with a hint;
/// some vendors simply don't ship one.
pub fn uninstall(descriptor: &Descriptor) -> UninstallOutcome {
    let Some(template) = &descriptor.uninstall else {
        let detail = descriptor
            .uninstall_hint
            .clone()
            .unwrap_or_else(|| "no uninstall command available".to_string());
        return UninstallOutcome {
            dependency: descriptor.name.clone(),
            status: StepStatus::NotRun,
            detail,
        };
    };

    let cmd = template.resolve(None, "");
    tracing::info!("Uninstalling {}...", descriptor.name);
    tracing::debug!("Uninstall command: {}", cmd);

    let (status, detail) = match shell::run(&cmd, &CommandOptions::default()) {
        Ok(result) if result.success => (StepStatus::Succeeded, "uninstalled".to_string()),
        Ok(result) => (
            StepStatus::Failed,
            format!(
                "uninstaller exited with code {}",
                result
                    .exit_code
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| "unknown".to_string())
            ),
        ),
        Err(e) => (StepStatus::Failed, e.to_string()),
    };

    UninstallOutcome {
        dependency: descriptor.name.clone(),
        status,
        detail,
    }
}

/// Delete a directory tree, checking existence first.
///
/// A missing path is `NotRun`, not an error — `--remove-path` is routinely
/// pointed at directories a previous run already cleaned up.
pub fn remove_path(path: &Path) -> RemovalOutcome {
    if !path.exists() {
        return RemovalOutcome {
            path: path.to_path_buf(),
            status: StepStatus::NotRun,
            detail: "does not exist".to_string(),
        };
    }

    let result = if path.is_dir() {
        std::fs::remove_dir_all(path)
    } else {
        std::fs::remove_file(path)
    };

    match result {
        Ok(()) => RemovalOutcome {
            path: path.to_path_buf(),
            status: StepStatus::Succeeded,
            detail: "removed".to_string(),
        },
        Err(e) => RemovalOutcome {
            path: path.to_path_buf(),
            status: StepStatus::Failed,
            detail: e.to_string(),
        },
    }
}
