//! The overlord roster: static configuration for each tracked public figure.
//!
//! Loaded once at startup from a YAML file and treated as immutable for the
//! lifetime of the process. The `key` is the stable identity used in every
//! downstream table and API path.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverlordConfig {
    pub key: String,
    pub name: String,
    pub short_name: String,
    pub companies: Vec<String>,
    pub search_query: String,
    pub accent_color: String,
    pub artwork_slug: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OverlordRoster {
    pub overlords: Vec<OverlordConfig>,
}

impl OverlordRoster {
    /// Look up an overlord by its key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&OverlordConfig> {
        self.overlords.iter().find(|o| o.key == key)
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}

/// Load and validate the overlord roster from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails
/// validation.
pub fn load_overlords(path: &Path) -> Result<OverlordRoster, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::OverlordsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let roster: OverlordRoster = serde_yaml::from_str(&content)?;

    validate_roster(&roster)?;

    Ok(roster)
}

fn validate_roster(roster: &OverlordRoster) -> Result<(), ConfigError> {
    if roster.overlords.is_empty() {
        return Err(ConfigError::Validation(
            "roster must contain at least one overlord".to_string(),
        ));
    }

    let mut seen_keys = HashSet::new();

    for overlord in &roster.overlords {
        if overlord.key.trim().is_empty() {
            return Err(ConfigError::Validation(
                "overlord key must be non-empty".to_string(),
            ));
        }

        // Keys become URL path segments and DB foreign keys; keep them flat.
        if !overlord
            .key
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        {
            return Err(ConfigError::Validation(format!(
                "overlord key '{}' must be lowercase ascii, digits, or dashes",
                overlord.key
            )));
        }

        if overlord.name.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "overlord '{}' has an empty name",
                overlord.key
            )));
        }

        if overlord.search_query.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "overlord '{}' has an empty search_query",
                overlord.key
            )));
        }

        if !seen_keys.insert(overlord.key.clone()) {
            return Err(ConfigError::Validation(format!(
                "duplicate overlord key: '{}'",
                overlord.key
            )));
        }
    }

    Ok(())
}
