//! Dependency descriptors, presence checks, and install/uninstall actions.
//!
//! # Modules
//!
//! - [`registry`] - Static dependency descriptors (what exists, how to get it)
//! - [`checker`] - Presence probes with per-run caching
//! - [`installer`] - Download-and-silent-install execution
//! - [`uninstaller`] - Uninstall commands and leftover path removal
//! - [`status`] - Tri-state step outcomes

pub mod checker;
pub mod installer;
pub mod registry;
pub mod status;
pub mod uninstaller;

pub use checker::{CheckReportItem, CheckStatus, Checker};
pub use installer::{InstallAction, InstallOutcome, Installer};
pub use registry::{DatabaseStep, DependencyRegistry, Descriptor, InstallMethod, Probe};
pub use status::{aggregate, StepStatus};
pub use uninstaller::{remove_path, uninstall, RemovalOutcome, UninstallOutcome};
