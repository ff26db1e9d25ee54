//! basecamp - Developer environment bootstrap.
//!
//! basecamp checks for, installs, and removes the prerequisite software a
//! development environment needs (Node.js, a JVM, the Erlang/RabbitMQ
//! broker stack, build tools, MySQL) and provisions a local MySQL
//! instance with the application schema and authentication settings.
//!
//! Everything is sequential orchestration of vendor installers and
//! command-line tools: probe for presence, download a package, run the
//! silent installer, report the exit code, clean up. Work items are
//! processed in order and a failed item never halts the ones after it.
//!
//! # Modules
//!
//! - [`cli`] - Argument parsing and work-item dispatch
//! - [`config`] - Optional YAML overrides for database settings and
//!   custom dependency entries
//! - [`deps`] - Dependency registry, presence checks, install/uninstall
//! - [`error`] - Error types and result alias
//! - [`mysql`] - Server discovery and database provisioning
//! - [`net`] - Installer package downloads
//! - [`shell`] - Subprocess execution
//! - [`ui`] - Terminal output
//!
//! # Example
//!
//! ```
//! use basecamp::deps::DependencyRegistry;
//!
//! let registry = DependencyRegistry::builtin();
//! assert!(registry.get("Node.js").is_some());
//! assert!(registry.get("MySQLServer").is_some());
//! ```

pub mod cli;
pub mod config;
pub mod deps;
pub mod error;
pub mod mysql;
pub mod net;
pub mod shell;
pub mod ui;

pub use error::{Result, SetupError};
