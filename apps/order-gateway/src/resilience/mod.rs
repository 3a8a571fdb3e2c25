//! Resilience patterns for external provider calls.
//!
//! Circuit breakers shared by identity, with an injectable clock.

mod circuit_breaker;
mod clock;
mod registry;

pub use circuit_breaker::{
    BreakerConfig, BreakerFailure, BreakerIdentity, BreakerOpenError, BreakerSnapshot,
    BreakerState, CircuitBreaker,
};
pub use clock::{Clock, ManualClock, SystemClock};
pub use registry::BreakerRegistry;
