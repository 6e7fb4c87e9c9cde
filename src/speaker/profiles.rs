//! Read-only speaker profile registry snapshots.
//!
//! The registry is a JSON file mapping profile id → display name,
//! maintained by an external enrollment process. Each transcription worker
//! loads its own snapshot; the registry may be refreshed concurrently by
//! unrelated processes and this module never writes it.

use crate::error::{EarshotError, Result};
use std::collections::HashMap;
use std::path::Path;

/// A point-in-time, read-only view of the profile registry.
#[derive(Debug, Clone, Default)]
pub struct ProfileSnapshot {
    profiles: HashMap<String, String>,
}

impl ProfileSnapshot {
    /// Loads a snapshot from the registry file.
    ///
    /// A missing file is an empty registry, not an error; malformed JSON is.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path).map_err(|e| EarshotError::ProfileRegistry {
            message: format!("Failed to read {}: {}", path.display(), e),
        })?;

        let profiles: HashMap<String, String> =
            serde_json::from_str(&contents).map_err(|e| EarshotError::ProfileRegistry {
                message: format!("Failed to parse {}: {}", path.display(), e),
            })?;

        Ok(Self { profiles })
    }

    /// Builds a snapshot directly from entries (for tests).
    pub fn from_entries(entries: &[(&str, &str)]) -> Self {
        Self {
            profiles: entries
                .iter()
                .map(|(id, name)| (id.to_string(), name.to_string()))
                .collect(),
        }
    }

    /// Returns true when no profiles are enrolled.
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Number of enrolled profiles.
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    /// Candidate profile ids for identification.
    pub fn ids(&self) -> Vec<String> {
        self.profiles.keys().cloned().collect()
    }

    /// Display name for a profile id, if enrolled.
    pub fn display_name(&self, id: &str) -> Option<&str> {
        self.profiles.get(id).map(|s| s.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_missing_file_is_empty_snapshot() {
        let snapshot = ProfileSnapshot::load(Path::new("/nonexistent/profiles.json")).unwrap();
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.len(), 0);
        assert!(snapshot.ids().is_empty());
    }

    #[test]
    fn test_load_registry_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"11111111-aaaa-bbbb-cccc-000000000001": "Alice", "22222222-aaaa-bbbb-cccc-000000000002": "Bob"}}"#
        )
        .unwrap();

        let snapshot = ProfileSnapshot::load(file.path()).unwrap();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(
            snapshot.display_name("11111111-aaaa-bbbb-cccc-000000000001"),
            Some("Alice")
        );
        assert_eq!(
            snapshot.display_name("22222222-aaaa-bbbb-cccc-000000000002"),
            Some("Bob")
        );
        assert_eq!(snapshot.display_name("unknown-id"), None);

        let mut ids = snapshot.ids();
        ids.sort();
        assert_eq!(ids.len(), 2);
        assert!(ids[0].starts_with("11111111"));
    }

    #[test]
    fn test_malformed_registry_fails() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        match ProfileSnapshot::load(file.path()) {
            Err(EarshotError::ProfileRegistry { message }) => {
                assert!(message.contains("Failed to parse"));
            }
            _ => panic!("Expected ProfileRegistry error"),
        }
    }

    #[test]
    fn test_empty_object_is_empty_registry() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{{}}").unwrap();

        let snapshot = ProfileSnapshot::load(file.path()).unwrap();
        assert!(snapshot.is_empty());
    }

    #[test]
    fn test_from_entries() {
        let snapshot = ProfileSnapshot::from_entries(&[("id-1", "Carol")]);
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.display_name("id-1"), Some("Carol"));
    }
}
