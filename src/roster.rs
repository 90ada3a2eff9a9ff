//! Roster - Enrollment Data
//!
//! ## Responsibilities
//!
//! - Load the session roster once at startup from the enrollment directory
//! - Map person id -> display name + expected uniform label
//!
//! The enrollment directory holds one subdirectory of face exemplars per
//! person (consumed by the external face service, not read here) and a
//! `metadata.json` with a `uniforms` map. The roster is immutable for the
//! lifetime of a monitoring session.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Default uniform label when metadata carries no entry for a person
pub const DEFAULT_UNIFORM: &str = "white";

#[derive(Debug, Deserialize, Default)]
struct EnrollmentMetadata {
    #[serde(default)]
    uniforms: BTreeMap<String, String>,
}

/// One enrolled person
#[derive(Debug, Clone)]
pub struct RosterEntry {
    pub display_name: String,
    pub expected_uniform: String,
}

/// The fixed set of known persons for a session
#[derive(Debug, Default)]
pub struct Roster {
    entries: BTreeMap<String, RosterEntry>,
}

impl Roster {
    /// Load the roster from the enrollment directory.
    ///
    /// Each subdirectory name is a person id; `metadata.json` supplies the
    /// expected uniform labels. An empty roster is a config error since there
    /// is nothing to monitor.
    pub fn load(dir: &Path) -> Result<Self> {
        if !dir.is_dir() {
            return Err(Error::Config(format!(
                "enrollment directory not found: {}",
                dir.display()
            )));
        }

        let metadata = match std::fs::read_to_string(dir.join("metadata.json")) {
            Ok(raw) => serde_json::from_str::<EnrollmentMetadata>(&raw)?,
            Err(_) => {
                tracing::warn!("metadata.json missing, assuming default uniforms");
                EnrollmentMetadata::default()
            }
        };

        let mut entries = BTreeMap::new();
        for dirent in std::fs::read_dir(dir)? {
            let dirent = dirent?;
            if !dirent.file_type()?.is_dir() {
                continue;
            }
            let id = dirent.file_name().to_string_lossy().to_string();
            let expected_uniform = metadata
                .uniforms
                .get(&id)
                .cloned()
                .unwrap_or_else(|| DEFAULT_UNIFORM.to_string());
            entries.insert(
                id.clone(),
                RosterEntry {
                    display_name: id,
                    expected_uniform,
                },
            );
        }

        if entries.is_empty() {
            return Err(Error::Config(format!(
                "no enrolled persons in {}",
                dir.display()
            )));
        }

        tracing::info!(persons = entries.len(), "Roster loaded");
        Ok(Self { entries })
    }

    /// Build a roster directly from (id, uniform) pairs
    pub fn from_entries<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, S)>,
        S: Into<String>,
    {
        let entries = pairs
            .into_iter()
            .map(|(id, uniform)| {
                let id = id.into();
                (
                    id.clone(),
                    RosterEntry {
                        display_name: id,
                        expected_uniform: uniform.into(),
                    },
                )
            })
            .collect();
        Self { entries }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn expected_uniform(&self, id: &str) -> Option<&str> {
        self.entries.get(id).map(|e| e.expected_uniform.as_str())
    }

    /// All enrolled person ids, in stable order
    pub fn ids(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enrollment_dir(persons: &[&str], metadata: Option<&str>) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for person in persons {
            std::fs::create_dir(dir.path().join(person)).unwrap();
        }
        if let Some(raw) = metadata {
            std::fs::write(dir.path().join("metadata.json"), raw).unwrap();
        }
        dir
    }

    #[test]
    fn load_rejects_empty_enrollment_dir() {
        let dir = enrollment_dir(&[], None);
        let err = Roster::load(dir.path()).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn load_rejects_missing_dir() {
        let dir = enrollment_dir(&[], None);
        let gone = dir.path().join("nope");
        let err = Roster::load(&gone).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn load_without_metadata_defaults_uniforms() {
        let dir = enrollment_dir(&["sv01", "sv02"], None);
        let roster = Roster::load(dir.path()).unwrap();
        assert_eq!(roster.len(), 2);
        assert_eq!(roster.expected_uniform("sv01"), Some(DEFAULT_UNIFORM));
        assert_eq!(roster.expected_uniform("sv02"), Some(DEFAULT_UNIFORM));
    }

    #[test]
    fn load_applies_metadata_overrides() {
        let dir = enrollment_dir(
            &["sv01", "sv02"],
            Some(r#"{"uniforms": {"sv02": "other"}}"#),
        );
        let roster = Roster::load(dir.path()).unwrap();
        assert_eq!(roster.expected_uniform("sv01"), Some("white"));
        assert_eq!(roster.expected_uniform("sv02"), Some("other"));
    }

    #[test]
    fn load_ignores_stray_files() {
        let dir = enrollment_dir(&["sv01"], Some(r#"{"uniforms": {}}"#));
        std::fs::write(dir.path().join("notes.txt"), "x").unwrap();
        let roster = Roster::load(dir.path()).unwrap();
        assert_eq!(roster.ids(), vec!["sv01".to_string()]);
    }

    #[test]
    fn from_entries_keeps_uniform_labels() {
        let roster = Roster::from_entries([("sv01", "white"), ("sv02", "other")]);
        assert_eq!(roster.len(), 2);
        assert!(roster.contains("sv01"));
        assert_eq!(roster.expected_uniform("sv02"), Some("other"));
        assert_eq!(roster.expected_uniform("sv99"), None);
    }

    #[test]
    fn ids_are_stable_and_sorted() {
        let roster = Roster::from_entries([("b", "white"), ("a", "white")]);
        assert_eq!(roster.ids(), vec!["a".to_string(), "b".to_string()]);
    }
}
