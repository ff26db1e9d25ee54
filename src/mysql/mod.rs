//! MySQL server discovery and provisioning.
//!
//! # Modules
//!
//! - [`discovery`] - Locating installed server instances via the OS registry
//! - [`configurator`] - Schema load and auth-plugin provisioning

pub mod configurator;
pub mod discovery;

pub use configurator::{
    configure_installed_server, configure_instance, ConfigureReport, Configurator, MysqlCli,
    SqlClient, StepReport,
};
pub use discovery::{discover, find_version, parse_reg_output, ServerInstance};
