//! Startup data for the in-memory repositories.
//!
//! Lets the binary run against a fixed set of venues and orders when no
//! external storage is attached.

use serde::Deserialize;
use thiserror::Error;

use crate::domain::integration::{ClearingIntegration, ManagementIntegration};
use crate::domain::ordering::Order;

use super::in_memory::{InMemoryIntegrationRepository, InMemoryOrderRepository};

/// Seed file errors.
#[derive(Debug, Error)]
pub enum SeedError {
    /// The seed file could not be read.
    #[error("Failed to read seed file '{path}': {source}")]
    Read {
        /// Path to the seed file.
        path: String,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// The seed file is not valid YAML for the expected shape.
    #[error("Failed to parse seed file: {0}")]
    Parse(#[from] serde_yaml_bw::Error),
}

/// Orders and venue integrations to load at startup.
#[derive(Debug, Default, Deserialize)]
pub struct SeedData {
    /// Orders, typically freshly placed.
    #[serde(default)]
    pub orders: Vec<Order>,
    /// Venue clearing wiring.
    #[serde(default)]
    pub clearing: Vec<ClearingIntegration>,
    /// Venue point-of-sale wiring.
    #[serde(default)]
    pub management: Vec<ManagementIntegration>,
}

impl SeedData {
    /// Read and parse a seed file.
    pub fn load(path: &str) -> Result<Self, SeedError> {
        let contents = std::fs::read_to_string(path).map_err(|e| SeedError::Read {
            path: path.to_string(),
            source: e,
        })?;
        Self::from_yaml(&contents)
    }

    /// Parse seed data from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, SeedError> {
        Ok(serde_yaml_bw::from_str(yaml)?)
    }

    /// Insert everything into the repositories. Later entries win on duplicate keys.
    pub fn apply(
        self,
        orders: &InMemoryOrderRepository,
        integrations: &InMemoryIntegrationRepository,
    ) {
        tracing::info!(
            orders = self.orders.len(),
            clearing = self.clearing.len(),
            management = self.management.len(),
            "Loading seed data"
        );
        for order in self.orders {
            orders.insert(order);
        }
        for integration in self.clearing {
            integrations.insert_clearing(integration);
        }
        for integration in self.management {
            integrations.insert_management(integration);
        }
    }
}
