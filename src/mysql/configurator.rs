//! Database provisioning.
//!
//! Brings a local MySQL server to the state the application expects: the
//! schema exists and the root account uses an authentication plugin the
//! client library can handle. Both steps check before acting, so a rerun
//! is a no-op.

use crate::config::DatabaseConfig;
use crate::deps::status::{aggregate, StepStatus};
use crate::error::{Result, SetupError};
use crate::mysql::discovery::{self, ServerInstance};
use crate::shell::{self, CommandLine, CommandOptions, CommandResult};
use std::path::{Path, PathBuf};

/// Executes SQL against a server. Trait seam so tests can fake the client.
pub trait SqlClient {
    /// Run a single SQL statement, capturing output.
    fn run_sql(&self, sql: &str) -> Result<CommandResult>;

    /// Source a SQL script file.
    fn run_script(&self, script: &Path) -> Result<CommandResult>;
}

/// The stock `mysql` command-line client.
pub struct MysqlCli {
    bin_dir: PathBuf,
    user: String,
    password: String,
}

impl MysqlCli {
    /// Client rooted at a server's `bin` directory.
    pub fn new(bin_dir: &Path, config: &DatabaseConfig) -> Self {
        Self {
            bin_dir: bin_dir.to_path_buf(),
            user: config.user.clone(),
            password: config.password.clone(),
        }
    }

    fn command(&self, statement: &str) -> CommandLine {
        let program = self.bin_dir.join("mysql").to_string_lossy().to_string();
        CommandLine::from_parts(
            program,
            vec![
                "-u".to_string(),
                self.user.clone(),
                format!("-p{}", self.password),
                "-e".to_string(),
                statement.to_string(),
            ],
        )
    }
}

impl SqlClient for MysqlCli {
    fn run_sql(&self, sql: &str) -> Result<CommandResult> {
        let cmd = self.command(sql);
        tracing::debug!("mysql: {}", sql);
        shell::run(&cmd, &CommandOptions::default())
    }

    fn run_script(&self, script: &Path) -> Result<CommandResult> {
        // `source` needs an absolute path; the server may have a different
        // working directory than this process.
        let script = std::fs::canonicalize(script).unwrap_or_else(|_| script.to_path_buf());
        self.run_sql(&format!("source {}", script.display()))
    }
}

/// Outcome of one provisioning step.
#[derive(Debug, Clone)]
pub struct StepReport {
    pub status: StepStatus,
    /// Whether the step changed anything (false when the check found the
    /// desired state already in place).
    pub action_taken: bool,
    pub detail: String,
}

impl StepReport {
    fn ok(action_taken: bool, detail: impl Into<String>) -> Self {
        Self {
            status: StepStatus::Succeeded,
            action_taken,
            detail: detail.into(),
        }
    }

    fn failed(detail: impl Into<String>) -> Self {
        Self {
            status: StepStatus::Failed,
            action_taken: false,
            detail: detail.into(),
        }
    }
}

/// Combined report for a full configuration pass.
#[derive(Debug, Clone)]
pub struct ConfigureReport {
    pub schema: StepReport,
    pub auth_plugin: StepReport,
}

impl ConfigureReport {
    /// Aggregate computed only over steps that ran.
    pub fn status(&self) -> StepStatus {
        aggregate([&self.schema.status, &self.auth_plugin.status])
    }

    pub fn succeeded(&self) -> bool {
        !self.status().is_failure()
    }
}

/// Provisions a database server per a [`DatabaseConfig`].
pub struct Configurator<'a> {
    config: &'a DatabaseConfig,
}

impl<'a> Configurator<'a> {
    pub fn new(config: &'a DatabaseConfig) -> Self {
        Self { config }
    }

    /// Run both provisioning steps. Each step is independent; a schema
    /// failure does not stop the auth-plugin step.
    pub fn configure(&self, client: &dyn SqlClient) -> ConfigureReport {
        ConfigureReport {
            schema: self.ensure_schema(client),
            auth_plugin: self.ensure_auth_plugin(client),
        }
    }

    /// Load the schema script unless the database already exists.
    pub fn ensure_schema(&self, client: &dyn SqlClient) -> StepReport {
        let databases = match client.run_sql("SHOW DATABASES;") {
            Ok(r) if r.success => r.stdout,
            Ok(r) => return StepReport::failed(format!("SHOW DATABASES failed: {}", r.stderr.trim())),
            Err(e) => return StepReport::failed(e.to_string()),
        };

        if databases.lines().any(|l| l.trim() == self.config.database) {
            tracing::info!("Database {} already exists", self.config.database);
            return StepReport::ok(false, "schema already present");
        }

        tracing::info!(
            "Database {} not found, loading {}",
            self.config.database,
            self.config.schema_script.display()
        );
        match client.run_script(&self.config.schema_script) {
            Ok(r) if r.success => StepReport::ok(true, "schema created"),
            Ok(r) => StepReport::failed(format!("schema load failed: {}", r.stderr.trim())),
            Err(e) => StepReport::failed(e.to_string()),
        }
    }

    /// Switch the account's authentication plugin unless it already matches.
    pub fn ensure_auth_plugin(&self, client: &dyn SqlClient) -> StepReport {
        let query = format!(
            "SELECT plugin FROM mysql.user WHERE User='{}';",
            self.config.user
        );
        let plugins = match client.run_sql(&query) {
            Ok(r) if r.success => r.stdout,
            Ok(r) => return StepReport::failed(format!("plugin query failed: {}", r.stderr.trim())),
            Err(e) => return StepReport::failed(e.to_string()),
        };

        if plugins.contains(&self.config.auth_plugin) {
            tracing::info!("Auth plugin already {}", self.config.auth_plugin);
            return StepReport::ok(false, "auth plugin already set");
        }

        tracing::info!("Switching auth plugin to {}", self.config.auth_plugin);
        let alter = format!(
            "ALTER USER '{}'@'localhost' IDENTIFIED WITH {} BY '{}';",
            self.config.user, self.config.auth_plugin, self.config.password
        );
        match client.run_sql(&alter) {
            Ok(r) if r.success => StepReport::ok(true, "auth plugin updated"),
            Ok(r) => StepReport::failed(format!("ALTER USER failed: {}", r.stderr.trim())),
            Err(e) => StepReport::failed(e.to_string()),
        }
    }
}

/// Full post-install pass: discover server instances, pick the expected
/// version, and run both provisioning steps against it.
pub fn configure_installed_server(config: &DatabaseConfig) -> Result<ConfigureReport> {
    let instances = discovery::discover()?;
    let instance = discovery::find_version(&instances, crate::deps::registry::MYSQL_SERVER_VERSION)
        .ok_or_else(|| SetupError::ServerNotFound {
            expected: crate::deps::registry::MYSQL_SERVER_VERSION.to_string(),
        })?;
    configure_instance(config, instance)
}

/// Run both provisioning steps against a known instance.
pub fn configure_instance(
    config: &DatabaseConfig,
    instance: &ServerInstance,
) -> Result<ConfigureReport> {
    tracing::info!(
        "Configuring MySQL {} at {}",
        instance.version,
        instance.location.display()
    );
    let client = MysqlCli::new(&instance.bin_dir(), config);
    Ok(Configurator::new(config).configure(&client))
}
