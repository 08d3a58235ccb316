//! Host list parsing
//!
//! One entry per line: `name id`, or a lone `id` that doubles as the name.
//! Blank lines and lines starting with `#` are skipped.

use std::path::Path;

use tracing::debug;

use crate::error::CoreError;

/// One VM to act on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostEntry {
    /// Display name used in reports
    pub name: String,
    /// Identifier of the VM in the management API
    pub remote_id: String,
}

impl HostEntry {
    /// Create a new host entry
    pub fn new(name: impl Into<String>, remote_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            remote_id: remote_id.into(),
        }
    }
}

/// Parse a host list
///
/// # Errors
/// Returns [`CoreError::HostListSyntax`] for a line with more than two fields.
pub fn parse_hosts(content: &str) -> Result<Vec<HostEntry>, CoreError> {
    let mut hosts = Vec::new();

    for (idx, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line.split_whitespace().collect();
        let entry = match fields.as_slice() {
            [id] => HostEntry::new(*id, *id),
            [name, id] => HostEntry::new(*name, *id),
            _ => {
                return Err(CoreError::HostListSyntax {
                    line: idx + 1,
                    reason: format!("expected `name id`, found {} fields", fields.len()),
                });
            }
        };
        hosts.push(entry);
    }

    Ok(hosts)
}

/// Read and parse a host list file
///
/// # Errors
/// Returns an error if the file cannot be read or a line is malformed.
pub fn load_hosts(path: &Path) -> Result<Vec<HostEntry>, CoreError> {
    let content = std::fs::read_to_string(path).map_err(|source| CoreError::HostListRead {
        path: path.to_path_buf(),
        source,
    })?;
    let hosts = parse_hosts(&content)?;
    debug!(path = %path.display(), hosts = hosts.len(), "loaded host list");
    Ok(hosts)
}
