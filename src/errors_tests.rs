// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for error types.

#[cfg(test)]
mod tests {
    use crate::errors::*;
    use std::path::PathBuf;

    #[test]
    fn test_missing_hosts_file_error() {
        assert_eq!(
            ConfigError::MissingHostsFile.to_string(),
            "hosts file path is not set (use --hosts-file or $HOSTS_FILE)"
        );
    }

    #[test]
    fn test_invalid_selector_error() {
        let error = ConfigError::InvalidSelector {
            selector: "app".to_string(),
            reason: "expected key=value".to_string(),
        };

        assert_eq!(
            error.to_string(),
            "invalid label selector 'app': expected key=value"
        );
    }

    #[test]
    fn test_sync_timeout_error() {
        let error = CacheError::SyncTimeout { timeout_secs: 60 };

        assert_eq!(
            error.to_string(),
            "ingress cache did not complete its initial sync within 60s"
        );
    }

    #[test]
    fn test_transport_error() {
        let error = ListError::Transport {
            message: "connection refused".to_string(),
        };

        assert_eq!(error.to_string(), "ingress watch failed: connection refused");
    }

    #[test]
    fn test_write_error_includes_path() {
        let error = WriteError::Io {
            path: PathBuf::from("/etc/hosts.d/ingress"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };

        assert_eq!(
            error.to_string(),
            "failed to write hosts file /etc/hosts.d/ingress: denied"
        );
        assert!(std::error::Error::source(&error).is_some());
    }

    #[test]
    fn test_reconcile_error_from_list_error() {
        let error: ReconcileError = ListError::CacheUnavailable.into();

        assert_eq!(
            error.to_string(),
            "listing ingresses failed: ingress cache is not synced yet"
        );
        assert_eq!(error.metric_status(), "list_error");
    }

    #[test]
    fn test_reconcile_error_from_write_error_is_transparent() {
        let write = WriteError::InvalidPath {
            path: PathBuf::from("/"),
        };
        let expected = write.to_string();
        let error: ReconcileError = write.into();

        assert_eq!(error.to_string(), expected);
        assert_eq!(error.metric_status(), "write_error");
    }
}
