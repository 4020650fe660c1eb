// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Error types for the ingress-hosts controller.
//!
//! Errors are split by the stage they occur in:
//! - [`ConfigError`] - invalid startup configuration (fatal)
//! - [`CacheError`] - the watch cache failed to start or sync (fatal at startup)
//! - [`ListError`] - a snapshot read failed (transient, the cycle is skipped)
//! - [`WriteError`] - the hosts file could not be replaced (transient)
//! - [`ReconcileError`] - anything that ends a reconcile cycle early
//!
//! Resources without the name annotation or without an address are not errors.
//! They are logged and left out of the hosts file.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while validating configuration at startup.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The output path was not provided or is empty
    #[error("hosts file path is not set (use --hosts-file or $HOSTS_FILE)")]
    MissingHostsFile,

    /// The reconcile interval was zero
    #[error("reconcile interval must be greater than zero")]
    ZeroInterval,

    /// The annotation key was empty
    #[error("dns-name annotation key must not be empty")]
    EmptyAnnotation,

    /// The label selector could not be parsed
    #[error("invalid label selector '{selector}': {reason}")]
    InvalidSelector {
        /// The selector as given
        selector: String,
        /// What is wrong with it
        reason: String,
    },

    /// The metrics bind address could not be parsed
    #[error("invalid metrics bind address '{address}': {reason}")]
    InvalidMetricsAddress {
        /// The address as given
        address: String,
        /// Parser error
        reason: String,
    },
}

/// Errors from the background watch cache.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// `start` was called more than once on the same cache
    #[error("ingress cache synchronization already started")]
    AlreadyStarted,

    /// The initial list did not complete in time
    #[error("ingress cache did not complete its initial sync within {timeout_secs}s")]
    SyncTimeout {
        /// The timeout that elapsed, in seconds
        timeout_secs: u64,
    },

    /// The sync task ended before the initial list completed
    #[error("ingress cache synchronization stopped before the initial sync completed")]
    SyncStopped,
}

/// Errors returned by a snapshot read.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ListError {
    /// The cache has not completed its initial sync
    #[error("ingress cache is not synced yet")]
    CacheUnavailable,

    /// The watch failed before the cache could sync
    #[error("ingress watch failed: {message}")]
    Transport {
        /// Error reported by the watcher
        message: String,
    },
}

/// Errors raised while replacing the hosts file.
#[derive(Error, Debug)]
pub enum WriteError {
    /// A filesystem operation failed
    #[error("failed to write hosts file {}: {source}", .path.display())]
    Io {
        /// Destination hosts file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The destination has no file name component (e.g. `/` or `..`)
    #[error("hosts file path {} does not name a file", .path.display())]
    InvalidPath {
        /// The offending path
        path: PathBuf,
    },
}

/// Errors that end a reconcile cycle.
#[derive(Error, Debug)]
pub enum ReconcileError {
    /// The snapshot read failed; nothing was written
    #[error("listing ingresses failed: {0}")]
    List(#[from] ListError),

    /// The hosts file write failed; the previous file is kept
    #[error(transparent)]
    Write(#[from] WriteError),
}

impl ReconcileError {
    /// Value of the `status` label recorded for a cycle that failed with this error.
    #[must_use]
    pub fn metric_status(&self) -> &'static str {
        match self {
            ReconcileError::List(_) => "list_error",
            ReconcileError::Write(_) => "write_error",
        }
    }
}

#[cfg(test)]
#[path = "errors_tests.rs"]
mod errors_tests;
