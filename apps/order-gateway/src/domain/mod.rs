//! Domain Layer
//!
//! The innermost layer containing business logic with zero infrastructure dependencies.
//! This layer defines:
//!
//! - **Aggregates**: The order and its lifecycle state
//! - **Value Objects**: Identifiers, money, menus
//! - **Integrations**: Which providers a venue is wired to
//!
//! # Bounded Contexts
//!
//! - [`ordering`]: Order lifecycle as seen by the reconciliation engine
//! - [`integration`]: Venue-scoped clearing and management provider wiring
//! - [`menu`]: Venue menus as reported by point-of-sale providers

pub mod integration;
pub mod menu;
pub mod ordering;
pub mod shared;
