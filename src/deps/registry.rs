//! Dependency registry and descriptors.
//!
//! Defines what prerequisites exist, how to probe for them, and how to
//! install them. The registry holds both built-in dependencies (Node.js,
//! Java, the RabbitMQ stack, MySQL) and custom entries from config.
//!
//! Descriptors are static data: built once, then passed by reference into
//! the checker and installer. Nothing here mutates at runtime.

use crate::config::CustomDependency;
use crate::error::{Result, SetupError};
use crate::shell::CommandLine;
use std::collections::HashMap;
use std::path::PathBuf;

/// Placeholder in install argv templates for the downloaded installer path.
pub const INSTALLER_PLACEHOLDER: &str = "{installer}";

/// Placeholder in install argv templates for the database root password.
pub const PASSWORD_PLACEHOLDER: &str = "{password}";

/// A remote installer package.
#[derive(Debug, Clone)]
pub struct Download {
    /// Where to fetch the package.
    pub url: String,
    /// File name to save it under in the scratch directory.
    pub file_name: String,
}

/// An argv template for a silent install or uninstall.
///
/// Arguments may contain [`INSTALLER_PLACEHOLDER`] or
/// [`PASSWORD_PLACEHOLDER`]; [`CommandTemplate::resolve`] substitutes them.
#[derive(Debug, Clone)]
pub struct CommandTemplate {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandTemplate {
    /// Build a template from a program and arguments.
    pub fn new(program: impl Into<String>, args: &[&str]) -> Self {
        Self {
            program: program.into(),
            args: args.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Substitute placeholders and produce a runnable command line.
    pub fn resolve(&self, installer_path: Option<&str>, password: &str) -> CommandLine {
        let substitute = |s: &str| -> String {
            let s = match installer_path {
                Some(path) => s.replace(INSTALLER_PLACEHOLDER, path),
                None => s.to_string(),
            };
            s.replace(PASSWORD_PLACEHOLDER, password)
        };
        CommandLine::from_parts(
            substitute(&self.program),
            self.args.iter().map(|a| substitute(a)).collect(),
        )
    }
}

/// How to tell whether a dependency is already present.
#[derive(Debug, Clone)]
pub enum Probe {
    /// Run a command and look for a marker substring in its combined output.
    /// An optional regex (first capture group) extracts a version string.
    CommandOutput {
        command: CommandLine,
        marker: String,
        version_pattern: Option<String>,
    },

    /// Run a command and require exit code 0.
    CommandSucceeds(CommandLine),

    /// Check that a file or directory exists.
    FileExists(PathBuf),
}

/// How a dependency gets installed.
#[derive(Debug, Clone)]
pub enum InstallMethod {
    /// Download a package, then run the silent-install command.
    Package {
        download: Download,
        command: CommandTemplate,
    },

    /// Run a command using tooling already on the system (npm, an
    /// installer console). Nothing is downloaded.
    Command(CommandTemplate),

    /// Handled by the database configurator; needs `--mysql-path`.
    DatabaseStep(DatabaseStep),
}

/// Database configuration pseudo-dependencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseStep {
    /// Load the application schema script.
    SchemaLoad,
    /// Switch the root account's authentication plugin.
    AuthPlugin,
}

/// A dependency descriptor.
#[derive(Debug, Clone)]
pub struct Descriptor {
    /// Dependency name as given on the command line (e.g. "Node.js").
    pub name: String,
    /// Presence probe; None means "always install when asked".
    pub probe: Option<Probe>,
    /// How to install it.
    pub install: InstallMethod,
    /// Silent uninstall command, when the vendor supports one.
    pub uninstall: Option<CommandTemplate>,
    /// Shown when no uninstall command exists.
    pub uninstall_hint: Option<String>,
}

impl Descriptor {
    /// Whether this entry is a real program install rather than a
    /// database-configuration step.
    pub fn is_program(&self) -> bool {
        !matches!(self.install, InstallMethod::DatabaseStep(_))
    }
}

/// Expected MySQL server version, also baked into the installer-console argv.
pub const MYSQL_SERVER_VERSION: &str = "8.0.21";

const MYSQL_INSTALLER_CONSOLE: &str =
    r"C:\Program Files (x86)\MySQL\MySQL Installer for Windows\MySQLInstallerConsole.exe";

/// Registry of all known dependencies.
pub struct DependencyRegistry {
    descriptors: HashMap<String, Descriptor>,
    /// Fixed presentation order for reports.
    order: Vec<String>,
}

impl DependencyRegistry {
    /// Create a registry with the built-in dependency set.
    pub fn builtin() -> Self {
        let mut registry = Self {
            descriptors: HashMap::new(),
            order: Vec::new(),
        };

        registry.add(Descriptor {
            name: "Node.js".to_string(),
            probe: Some(Probe::CommandOutput {
                command: CommandLine::new("node", &["--version"]),
                marker: "v10".to_string(),
                version_pattern: Some(r"v(\d+\.\d+\.\d+)".to_string()),
            }),
            install: InstallMethod::Package {
                download: Download {
                    url: "https://nodejs.org/dist/latest-v10.x/node-v10.22.1-x64.msi"
                        .to_string(),
                    file_name: "nodejs.msi".to_string(),
                },
                command: CommandTemplate::new(
                    "msiexec",
                    &["/i", INSTALLER_PLACEHOLDER, "/qn"],
                ),
            },
            uninstall: Some(CommandTemplate::new(
                "wmic",
                &[
                    "product",
                    "where",
                    "name like 'Node.js%'",
                    "call",
                    "uninstall",
                    "/nointeractive",
                ],
            )),
            uninstall_hint: None,
        });

        registry.add(Descriptor {
            name: "Java".to_string(),
            probe: Some(Probe::CommandOutput {
                command: CommandLine::new("java", &["-version"]),
                marker: "version".to_string(),
                version_pattern: Some(r#"version "([^"]+)""#.to_string()),
            }),
            install: InstallMethod::Package {
                download: Download {
                    url: "https://javadl.oracle.com/webapps/download/AutoDL?BundleId=242990_a4634525489241b9a9e1aa73d9e118e6".to_string(),
                    file_name: "java.exe".to_string(),
                },
                command: CommandTemplate::new(INSTALLER_PLACEHOLDER, &["/s"]),
            },
            uninstall: None,
            uninstall_hint: Some(
                "Remove Java from the installed-programs control panel".to_string(),
            ),
        });

        registry.add(Descriptor {
            name: "Erlang".to_string(),
            probe: Some(Probe::CommandOutput {
                command: CommandLine::new("erl", &["-version"]),
                marker: "Erlang".to_string(),
                version_pattern: Some(r"version (\S+)".to_string()),
            }),
            install: InstallMethod::Package {
                download: Download {
                    url: "http://erlang.org/download/otp_win64_23.0.exe".to_string(),
                    file_name: "erlang.exe".to_string(),
                },
                command: CommandTemplate::new(INSTALLER_PLACEHOLDER, &["/S"]),
            },
            uninstall: None,
            uninstall_hint: Some(
                "Run the uninstaller from the Erlang install directory".to_string(),
            ),
        });

        registry.add(Descriptor {
            name: "RabbitMQ".to_string(),
            probe: Some(Probe::CommandOutput {
                command: CommandLine::new("sc", &["query", "RabbitMQ"]),
                marker: "RabbitMQ".to_string(),
                version_pattern: None,
            }),
            install: InstallMethod::Package {
                download: Download {
                    url: "https://github.com/rabbitmq/rabbitmq-server/releases/download/v3.8.8/rabbitmq-server-3.8.8.exe".to_string(),
                    file_name: "rabbitmq.exe".to_string(),
                },
                command: CommandTemplate::new(INSTALLER_PLACEHOLDER, &["/S"]),
            },
            uninstall: None,
            uninstall_hint: Some(
                "Run the RabbitMQ uninstaller from its install directory".to_string(),
            ),
        });

        registry.add(Descriptor {
            name: "GruntCli".to_string(),
            probe: Some(Probe::CommandOutput {
                command: CommandLine::new("grunt", &["--version"]),
                marker: "grunt-cli".to_string(),
                version_pattern: Some(r"grunt-cli v(\S+)".to_string()),
            }),
            install: InstallMethod::Command(CommandTemplate::new(
                "npm",
                &["install", "-g", "grunt-cli"],
            )),
            uninstall: Some(CommandTemplate::new(
                "npm",
                &["uninstall", "-g", "grunt-cli"],
            )),
            uninstall_hint: None,
        });

        registry.add(Descriptor {
            name: "BuildTools".to_string(),
            probe: Some(Probe::CommandOutput {
                command: CommandLine::new(
                    "vswhere",
                    &["-products", "Microsoft.VisualStudio.Product.BuildTools"],
                ),
                marker: "Microsoft.VisualStudio.Product.BuildTools".to_string(),
                version_pattern: None,
            }),
            install: InstallMethod::Package {
                download: Download {
                    url: "https://download.visualstudio.microsoft.com/download/pr/11503713/e64d79b40219aea618ce2fe10ebd5f0d/vs_BuildTools.exe".to_string(),
                    file_name: "vs_BuildTools.exe".to_string(),
                },
                command: CommandTemplate::new(
                    INSTALLER_PLACEHOLDER,
                    &[
                        "--add",
                        "Microsoft.VisualStudio.Workload.VCTools",
                        "--includeRecommended",
                        "--quiet",
                        "--wait",
                    ],
                ),
            },
            uninstall: None,
            uninstall_hint: Some(
                "Use the Visual Studio Installer to remove Build Tools".to_string(),
            ),
        });

        registry.add(Descriptor {
            name: "MySQLInstaller".to_string(),
            probe: Some(Probe::FileExists(PathBuf::from(MYSQL_INSTALLER_CONSOLE))),
            install: InstallMethod::Package {
                download: Download {
                    url: "https://dev.mysql.com/get/Downloads/MySQLInstaller/mysql-installer-web-community-8.0.21.0.msi".to_string(),
                    file_name: "mysqlinstaller.msi".to_string(),
                },
                command: CommandTemplate::new(
                    "msiexec",
                    &["/i", INSTALLER_PLACEHOLDER, "/qn"],
                ),
            },
            uninstall: Some(CommandTemplate::new(
                "wmic",
                &[
                    "product",
                    "where",
                    "name like 'MySQL Installer%'",
                    "call",
                    "uninstall",
                    "/nointeractive",
                ],
            )),
            uninstall_hint: None,
        });

        registry.add(Descriptor {
            name: "MySQLServer".to_string(),
            probe: Some(Probe::CommandOutput {
                command: CommandLine::new(
                    "reg",
                    &["query", r"HKLM\SOFTWARE\MySQL AB", "/s", "/v", "Version"],
                ),
                marker: MYSQL_SERVER_VERSION.to_string(),
                version_pattern: Some(r"Version\s+REG_SZ\s+(\S+)".to_string()),
            }),
            install: InstallMethod::Command(CommandTemplate::new(
                MYSQL_INSTALLER_CONSOLE,
                &[
                    "community",
                    "install",
                    concat!(
                        "server;8.0.21;x64:*:type=config;openfirewall=true;",
                        "generallog=true;binlog=true;serverid=3306;",
                        "enable_tcpip=true;port=3306;rootpasswd={password}"
                    ),
                    "-silent",
                ],
            )),
            uninstall: Some(CommandTemplate::new(
                MYSQL_INSTALLER_CONSOLE,
                &["community", "remove", "server", "-silent"],
            )),
            uninstall_hint: None,
        });

        registry.add(Descriptor {
            name: "MySQLDatabase".to_string(),
            probe: None,
            install: InstallMethod::DatabaseStep(DatabaseStep::SchemaLoad),
            uninstall: None,
            uninstall_hint: Some("Drop the database with the mysql client".to_string()),
        });

        registry.add(Descriptor {
            name: "MySQLEncrypt".to_string(),
            probe: None,
            install: InstallMethod::DatabaseStep(DatabaseStep::AuthPlugin),
            uninstall: None,
            uninstall_hint: None,
        });

        registry
    }

    /// Add custom dependencies from the config file.
    ///
    /// A custom entry with a built-in name replaces the built-in.
    pub fn with_custom(mut self, custom: &HashMap<String, CustomDependency>) -> Self {
        for (name, dep) in custom {
            let probe = dep.probe.as_ref().map(|p| Probe::CommandOutput {
                command: CommandLine::from_parts(p.program.clone(), p.args.clone()),
                marker: p.marker.clone(),
                version_pattern: p.version_pattern.clone(),
            });

            let command = CommandTemplate {
                program: dep.install.program.clone(),
                args: dep.install.args.clone(),
            };
            let install = match &dep.download {
                Some(d) => InstallMethod::Package {
                    download: Download {
                        url: d.url.clone(),
                        file_name: d.file_name.clone(),
                    },
                    command,
                },
                None => InstallMethod::Command(command),
            };

            self.add(Descriptor {
                name: name.clone(),
                probe,
                install,
                uninstall: dep.uninstall.as_ref().map(|u| CommandTemplate {
                    program: u.program.clone(),
                    args: u.args.clone(),
                }),
                uninstall_hint: dep.uninstall_hint.clone(),
            });
        }
        self
    }

    fn add(&mut self, descriptor: Descriptor) {
        let name = descriptor.name.clone();
        if self.descriptors.insert(name.clone(), descriptor).is_none() {
            self.order.push(name);
        }
    }

    /// Look up a descriptor by name.
    pub fn get(&self, name: &str) -> Option<&Descriptor> {
        self.descriptors.get(name)
    }

    /// Look up a descriptor, erroring on unknown names.
    pub fn require(&self, name: &str) -> Result<&Descriptor> {
        self.get(name).ok_or_else(|| SetupError::UnknownDependency {
            name: name.to_string(),
        })
    }

    /// All known names, in registration order.
    pub fn known_names(&self) -> Vec<&str> {
        self.order.iter().map(|s| s.as_str()).collect()
    }

    /// Program descriptors (no database pseudo-steps), in registration order.
    pub fn programs(&self) -> Vec<&Descriptor> {
        self.order
            .iter()
            .filter_map(|n| self.descriptors.get(n))
            .filter(|d| d.is_program())
            .collect()
    }
}

impl Default for DependencyRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
