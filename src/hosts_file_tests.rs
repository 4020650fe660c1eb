// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `hosts_file.rs`

#[cfg(test)]
mod tests {
    use super::super::*;
    use tempfile::TempDir;

    fn sample_entries() -> Vec<HostEntry> {
        vec![
            HostEntry::new("1.2.3.4", "a.example.com"),
            HostEntry::new("5.6.7.8", "b.example.com"),
        ]
    }

    #[test]
    fn test_host_entry_display() {
        let entry = HostEntry::new("10.0.0.1", "app.internal");
        assert_eq!(entry.to_string(), "10.0.0.1\tapp.internal");
    }

    #[test]
    fn test_render_exact_format() {
        assert_eq!(
            render(&sample_entries()),
            "1.2.3.4\ta.example.com\n5.6.7.8\tb.example.com"
        );
    }

    #[test]
    fn test_render_single_entry_has_no_newline() {
        let content = render(&[HostEntry::new("1.2.3.4", "a.example.com")]);
        assert_eq!(content, "1.2.3.4\ta.example.com");
    }

    #[test]
    fn test_render_empty_is_empty_string() {
        assert_eq!(render(&[]), "");
    }

    #[test]
    fn test_render_keeps_duplicates_and_order() {
        let entries = vec![
            HostEntry::new("9.9.9.9", "z.example.com"),
            HostEntry::new("1.1.1.1", "a.example.com"),
            HostEntry::new("9.9.9.9", "z.example.com"),
        ];

        assert_eq!(
            render(&entries),
            "9.9.9.9\tz.example.com\n1.1.1.1\ta.example.com\n9.9.9.9\tz.example.com"
        );
    }

    #[test]
    fn test_temp_path_is_hidden_sibling() {
        let temp = temp_path_for(Path::new("/var/run/hosts")).unwrap();
        assert_eq!(temp, PathBuf::from("/var/run/.hosts.tmp"));
    }

    #[test]
    fn test_temp_path_rejects_path_without_file_name() {
        assert!(matches!(
            temp_path_for(Path::new("/")),
            Err(WriteError::InvalidPath { .. })
        ));
    }

    #[tokio::test]
    async fn test_write_creates_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hosts");

        write_hosts_file(&path, &sample_entries()).await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "1.2.3.4\ta.example.com\n5.6.7.8\tb.example.com");
        assert!(!dir.path().join(".hosts.tmp").exists());
    }

    #[tokio::test]
    async fn test_write_replaces_previous_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hosts");
        std::fs::write(&path, "old content that is much longer than the new content\n").unwrap();

        write_hosts_file(&path, &[HostEntry::new("1.2.3.4", "a.example.com")])
            .await
            .unwrap();

        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "1.2.3.4\ta.example.com"
        );
    }

    #[tokio::test]
    async fn test_write_empty_entries_truncates_to_zero_bytes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hosts");
        std::fs::write(&path, "1.2.3.4\ta.example.com").unwrap();

        write_hosts_file(&path, &[]).await.unwrap();

        assert_eq!(std::fs::metadata(&path).unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_write_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hosts");

        write_hosts_file(&path, &sample_entries()).await.unwrap();
        let first = std::fs::read(&path).unwrap();
        write_hosts_file(&path, &sample_entries()).await.unwrap();
        let second = std::fs::read(&path).unwrap();

        assert_eq!(first, second);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_write_sets_world_readable_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hosts");

        write_hosts_file(&path, &sample_entries()).await.unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o644);
    }

    #[tokio::test]
    async fn test_write_into_missing_directory_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("hosts");

        let result = write_hosts_file(&path, &sample_entries()).await;

        assert!(matches!(result, Err(WriteError::Io { .. })));
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_failed_rename_leaves_destination_untouched() {
        let dir = TempDir::new().unwrap();
        // A non-empty directory cannot be replaced by a file rename
        let path = dir.path().join("hosts");
        std::fs::create_dir(&path).unwrap();
        std::fs::write(path.join("keep"), "keep").unwrap();

        let result = write_hosts_file(&path, &sample_entries()).await;

        assert!(matches!(result, Err(WriteError::Io { .. })));
        assert!(path.is_dir());
        assert_eq!(std::fs::read_to_string(path.join("keep")).unwrap(), "keep");
        assert!(!dir.path().join(".hosts.tmp").exists());
    }
}
