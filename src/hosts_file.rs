// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Hosts file rendering and atomic replacement.
//!
//! The artifact is one `<address>\t<name>` line per entry, lines joined by a
//! single newline, with no header, no comments and no trailing newline.
//!
//! Writes never leave a truncated file behind: the full content is rendered
//! first, written to a sibling temporary file, flushed, and then renamed over
//! the destination. If any step fails the destination keeps its previous
//! content.

use crate::constants::{
    HOSTS_FIELD_SEPARATOR, HOSTS_FILE_MODE, HOSTS_LINE_SEPARATOR, TEMP_FILE_SUFFIX,
};
use crate::errors::WriteError;
use std::fmt;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

/// One line of the hosts file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HostEntry {
    /// IP address the name resolves to
    pub address: String,
    /// Hostname taken from the `Ingress` annotation
    pub name: String,
}

impl HostEntry {
    /// Create an entry from an address and a name.
    pub fn new(address: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for HostEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{HOSTS_FIELD_SEPARATOR}{}", self.address, self.name)
    }
}

/// Render entries into hosts file content.
///
/// Entries keep their given order. An empty slice renders to the empty string.
#[must_use]
pub fn render(entries: &[HostEntry]) -> String {
    let mut content = String::new();
    for (i, entry) in entries.iter().enumerate() {
        if i > 0 {
            content.push(HOSTS_LINE_SEPARATOR);
        }
        content.push_str(&entry.to_string());
    }
    content
}

/// Replace the hosts file at `path` with the rendered `entries`.
///
/// # Errors
///
/// Returns [`WriteError::InvalidPath`] if `path` has no file name and
/// [`WriteError::Io`] if creating, writing, syncing or renaming the temporary
/// file fails. The destination is untouched in both cases.
pub async fn write_hosts_file(path: &Path, entries: &[HostEntry]) -> Result<(), WriteError> {
    let content = render(entries);
    let temp_path = temp_path_for(path)?;

    debug!(
        path = %path.display(),
        temp_path = %temp_path.display(),
        entries = entries.len(),
        bytes = content.len(),
        "Writing hosts file"
    );

    let result = match write_temp_file(&temp_path, content.as_bytes()).await {
        Ok(()) => tokio::fs::rename(&temp_path, path).await,
        Err(e) => Err(e),
    };

    if let Err(source) = result {
        if let Err(e) = tokio::fs::remove_file(&temp_path).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(
                    temp_path = %temp_path.display(),
                    "Failed to remove temporary hosts file: {e}"
                );
            }
        }
        return Err(WriteError::Io {
            path: path.to_path_buf(),
            source,
        });
    }

    Ok(())
}

/// Sibling path used for the atomic rename, e.g. `/etc/.hosts.tmp` for `/etc/hosts`.
fn temp_path_for(path: &Path) -> Result<PathBuf, WriteError> {
    let file_name = path.file_name().ok_or_else(|| WriteError::InvalidPath {
        path: path.to_path_buf(),
    })?;

    let mut temp_name = std::ffi::OsString::from(".");
    temp_name.push(file_name);
    temp_name.push(TEMP_FILE_SUFFIX);

    Ok(path.with_file_name(temp_name))
}

async fn write_temp_file(temp_path: &Path, content: &[u8]) -> std::io::Result<()> {
    let mut options = tokio::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    options.mode(HOSTS_FILE_MODE);

    let mut file = options.open(temp_path).await?;
    file.write_all(content).await?;

    // The creation mode is filtered through the umask
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(std::fs::Permissions::from_mode(HOSTS_FILE_MODE))
            .await?;
    }

    file.sync_all().await?;
    Ok(())
}

#[cfg(test)]
#[path = "hosts_file_tests.rs"]
mod hosts_file_tests;
