//! Repository wiring.

use serde::{Deserialize, Serialize};

/// Persistence configuration.
///
/// Durable storage belongs to an external collaborator; the binary runs on
/// in-memory repositories, optionally pre-loaded from a seed file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersistenceConfig {
    /// YAML file with orders and venue integrations to load at startup.
    #[serde(default)]
    pub seed_file: Option<String>,
}

impl PersistenceConfig {
    /// Seed file path, if one is configured.
    #[must_use]
    pub fn seed_path(&self) -> Option<&str> {
        self.seed_file
            .as_deref()
            .map(str::trim)
            .filter(|path| !path.is_empty())
    }
}
