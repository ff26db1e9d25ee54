//! Installed MySQL server discovery.
//!
//! Silent server installs register under `HKLM\SOFTWARE\MySQL AB`; each
//! server key carries `Location` and `Version` values. Discovery shells out
//! to `reg query` and parses the captured text, so the parser itself is a
//! pure function over strings.

use crate::error::Result;
use crate::shell::{self, CommandLine, CommandOptions};
use std::path::PathBuf;

/// One installed MySQL server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerInstance {
    /// Install root, e.g. `C:\Program Files\MySQL\MySQL Server 8.0\`.
    pub location: PathBuf,
    /// Version string, e.g. `8.0.21`.
    pub version: String,
}

impl ServerInstance {
    /// Directory holding the `mysql` client binary.
    pub fn bin_dir(&self) -> PathBuf {
        self.location.join("bin")
    }
}

/// Query the OS registry for installed MySQL servers.
///
/// On systems without `reg` (or without any MySQL key) this returns an
/// empty list rather than an error; the caller decides whether "no servers"
/// is fatal.
pub fn discover() -> Result<Vec<ServerInstance>> {
    let cmd = CommandLine::new("reg", &["query", r"HKLM\SOFTWARE\MySQL AB", "/s"]);
    let result = match shell::run(&cmd, &CommandOptions::default()) {
        Ok(r) => r,
        Err(e) => {
            tracing::debug!("reg query unavailable: {}", e);
            return Ok(Vec::new());
        }
    };
    if !result.success {
        tracing::debug!("reg query found no MySQL AB key");
        return Ok(Vec::new());
    }
    Ok(parse_reg_output(&result.stdout))
}

/// Find the instance matching an exact version string.
pub fn find_version<'a>(
    instances: &'a [ServerInstance],
    version: &str,
) -> Option<&'a ServerInstance> {
    instances.iter().find(|i| i.version == version)
}

/// Parse `reg query /s` output into server instances.
///
/// Key lines start at column zero; value lines are indented as
/// `    Name    REG_SZ    data`. An instance is emitted for every key that
/// carries both a Location and a Version.
pub fn parse_reg_output(output: &str) -> Vec<ServerInstance> {
    let mut instances = Vec::new();
    let mut location: Option<PathBuf> = None;
    let mut version: Option<String> = None;

    let mut flush = |location: &mut Option<PathBuf>, version: &mut Option<String>| {
        if let (Some(loc), Some(ver)) = (location.take(), version.take()) {
            instances.push(ServerInstance {
                location: loc,
                version: ver,
            });
        }
        *location = None;
        *version = None;
    };

    for line in output.lines() {
        if !line.starts_with(' ') && !line.trim().is_empty() {
            // New registry key: emit whatever the previous key collected.
            flush(&mut location, &mut version);
            continue;
        }
        if let Some(data) = reg_sz_value(line, "Location") {
            location = Some(PathBuf::from(data));
        } else if let Some(data) = reg_sz_value(line, "Version") {
            version = Some(data.to_string());
        }
    }
    flush(&mut location, &mut version);
    instances
}

/// Extract the data portion of an indented `Name    REG_SZ    data` line.
fn reg_sz_value<'a>(line: &'a str, name: &str) -> Option<&'a str> {
    let trimmed = line.trim_start();
    let rest = trimmed.strip_prefix(name)?;
    let rest = rest.trim_start();
    let rest = rest.strip_prefix("REG_SZ")?;
    let data = rest.trim();
    if data.is_empty() {
        None
    } else {
        Some(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SINGLE_SERVER: &str = "\
HKEY_LOCAL_MACHINE\\SOFTWARE\\MySQL AB\\MySQL Server 8.0\r
    Location    REG_SZ    C:\\Program Files\\MySQL\\MySQL Server 8.0\\\r
    Version    REG_SZ    8.0.21\r
\r
";

    const TWO_SERVERS: &str = "\
HKEY_LOCAL_MACHINE\\SOFTWARE\\MySQL AB\\MySQL Server 5.7\r
    Location    REG_SZ    C:\\Program Files\\MySQL\\MySQL Server 5.7\\\r
    Version    REG_SZ    5.7.31\r
\r
HKEY_LOCAL_MACHINE\\SOFTWARE\\MySQL AB\\MySQL Server 8.0\r
    Location    REG_SZ    C:\\Program Files\\MySQL\\MySQL Server 8.0\\\r
    Version    REG_SZ    8.0.21\r
\r
";

    #[test]
    fn parses_single_server() {
        let instances = parse_reg_output(SINGLE_SERVER);
        assert_eq!(instances.len(), 1);
        assert_eq!(instances[0].version, "8.0.21");
        assert_eq!(
            instances[0].location,
            PathBuf::from("C:\\Program Files\\MySQL\\MySQL Server 8.0\\")
        );
    }

    #[test]
    fn parses_multiple_servers() {
        let instances = parse_reg_output(TWO_SERVERS);
        assert_eq!(instances.len(), 2);
        assert_eq!(instances[0].version, "5.7.31");
        assert_eq!(instances[1].version, "8.0.21");
    }

    #[test]
    fn key_without_both_values_is_skipped() {
        let output = "\
HKEY_LOCAL_MACHINE\\SOFTWARE\\MySQL AB\r
HKEY_LOCAL_MACHINE\\SOFTWARE\\MySQL AB\\MySQL Installer\r
    Version    REG_SZ    1.4.32\r
";
        assert!(parse_reg_output(output).is_empty());
    }

    #[test]
    fn empty_output_yields_no_instances() {
        assert!(parse_reg_output("").is_empty());
    }

    #[test]
    fn find_version_matches_exactly() {
        let instances = parse_reg_output(TWO_SERVERS);
        let found = find_version(&instances, "8.0.21").unwrap();
        assert_eq!(found.version, "8.0.21");
        assert!(find_version(&instances, "8.0.22").is_none());
    }

    #[test]
    fn bin_dir_appends_bin() {
        let instance = ServerInstance {
            location: PathBuf::from("C:\\Program Files\\MySQL\\MySQL Server 8.0\\"),
            version: "8.0.21".to_string(),
        };
        assert!(instance.bin_dir().to_string_lossy().ends_with("bin"));
    }
}
