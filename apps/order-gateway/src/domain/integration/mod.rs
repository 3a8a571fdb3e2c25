//! Integration Bounded Context
//!
//! Every venue is wired to exactly one clearing (payment) provider and one
//! management (point-of-sale) provider. The wiring records are loaded from
//! durable storage by an external collaborator and never change for the
//! lifetime of a venue.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::shared::VenueId;

/// Supported payment-clearing vendors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClearingProviderId {
    /// XML gateway protocol vendor.
    CreditGuard,
    /// JSON REST vendor with HMAC-signed responses.
    PayPlus,
}

impl ClearingProviderId {
    /// Stable identifier used in configuration, routes and breaker names.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::CreditGuard => "creditguard",
            Self::PayPlus => "payplus",
        }
    }

    /// Parse a route/config identifier.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "creditguard" => Some(Self::CreditGuard),
            "payplus" => Some(Self::PayPlus),
            _ => None,
        }
    }
}

impl fmt::Display for ClearingProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Supported point-of-sale vendors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ManagementProviderId {
    /// Dorix POS.
    Dorix,
    /// Tabit POS.
    Tabit,
}

impl ManagementProviderId {
    /// Stable identifier used in configuration and breaker names.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Dorix => "dorix",
            Self::Tabit => "tabit",
        }
    }
}

impl fmt::Display for ManagementProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A venue's payment-clearing wiring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClearingIntegration {
    /// Owning venue.
    pub venue_id: VenueId,
    /// Vendor this venue clears payments with.
    pub provider: ClearingProviderId,
    /// Vendor-specific credentials, decoded by the provider implementation.
    pub credentials: serde_json::Value,
}

impl ClearingIntegration {
    /// Decode the vendor credentials into the provider's typed form.
    pub fn credentials<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(&self.credentials)
    }
}

/// A venue's point-of-sale wiring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManagementIntegration {
    /// Owning venue.
    pub venue_id: VenueId,
    /// Vendor running the venue's kitchen system.
    pub provider: ManagementProviderId,
    /// Vendor-specific credentials, decoded by the provider implementation.
    pub credentials: serde_json::Value,
}

impl ManagementIntegration {
    /// Decode the vendor credentials into the provider's typed form.
    pub fn credentials<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(&self.credentials)
    }
}
