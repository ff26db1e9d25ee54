//! Dependency presence checks.
//!
//! The `Checker` evaluates whether dependencies are already on the system,
//! caching results within a run so the same dependency probed twice only
//! executes its command once.
//!
//! A probe that cannot even be spawned is treated as Absent, the same as a
//! probe whose output lacks the marker. The distinction is logged at debug
//! level but deliberately not surfaced: for presence detection, "the
//! version command isn't on PATH" and "the tool isn't installed" call for
//! the same action.

use crate::deps::registry::{DependencyRegistry, Descriptor, Probe};
use crate::shell::{self, CommandOptions};
use std::collections::HashMap;

/// The result of probing for a single dependency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckStatus {
    /// Probe matched; the dependency is installed.
    Present {
        /// Version extracted from probe output, when a pattern is defined.
        version: Option<String>,
    },

    /// Probe missing its marker, failed, or couldn't run.
    Absent,
}

impl CheckStatus {
    /// Whether the dependency is installed.
    pub fn is_present(&self) -> bool {
        matches!(self, CheckStatus::Present { .. })
    }
}

/// One line of a presence report.
#[derive(Debug, Clone)]
pub struct CheckReportItem {
    pub dependency: String,
    pub status: CheckStatus,
}

/// Probes the system for installed dependencies.
pub struct Checker {
    cache: HashMap<String, CheckStatus>,
}

impl Checker {
    /// Create a checker with an empty probe cache.
    pub fn new() -> Self {
        Self {
            cache: HashMap::new(),
        }
    }

    /// Check one dependency, using the cache when available.
    ///
    /// A descriptor without a probe is always Absent: there is no way to
    /// tell it is installed, so an install request runs unconditionally.
    pub fn check(&mut self, descriptor: &Descriptor) -> CheckStatus {
        if let Some(cached) = self.cache.get(&descriptor.name) {
            return cached.clone();
        }

        let status = match &descriptor.probe {
            Some(probe) => evaluate(probe),
            None => CheckStatus::Absent,
        };
        tracing::debug!("Probe for {}: {:?}", descriptor.name, status);
        self.cache.insert(descriptor.name.clone(), status.clone());
        status
    }

    /// Invalidate a cached result, e.g. after installing the dependency.
    pub fn invalidate(&mut self, dependency: &str) {
        self.cache.remove(dependency);
    }

    /// Probe every program dependency in the registry, in registry order.
    pub fn check_all(&mut self, registry: &DependencyRegistry) -> Vec<CheckReportItem> {
        registry
            .programs()
            .into_iter()
            .map(|descriptor| CheckReportItem {
                dependency: descriptor.name.clone(),
                status: self.check(descriptor),
            })
            .collect()
    }
}

impl Default for Checker {
    fn default() -> Self {
        Self::new()
    }
}

/// Evaluate a single probe against the live system.
fn evaluate(probe: &Probe) -> CheckStatus {
    match probe {
        Probe::CommandOutput {
            command,
            marker,
            version_pattern,
        } => {
            let result = match shell::run(command, &CommandOptions::default()) {
                Ok(r) => r,
                Err(e) => {
                    tracing::debug!("Probe command {} failed to spawn: {}", command, e);
                    return CheckStatus::Absent;
                }
            };
            let output = result.combined_output();
            if !output.contains(marker.as_str()) {
                return CheckStatus::Absent;
            }
            CheckStatus::Present {
                version: version_pattern
                    .as_deref()
                    .and_then(|p| extract_version(p, &output)),
            }
        }

        Probe::CommandSucceeds(command) => {
            if shell::run_check(command) {
                CheckStatus::Present { version: None }
            } else {
                CheckStatus::Absent
            }
        }

        Probe::FileExists(path) => {
            if path.exists() {
                CheckStatus::Present { version: None }
            } else {
                CheckStatus::Absent
            }
        }
    }
}

/// Pull a version string out of probe output using the first capture group.
fn extract_version(pattern: &str, output: &str) -> Option<String> {
    let re = match regex::Regex::new(pattern) {
        Ok(re) => re,
        Err(e) => {
            tracing::warn!("Invalid version pattern '{}': {}", pattern, e);
            return None;
        }
    };
    re.captures(output)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}
