//! Circuit breaker for outbound provider calls.
//!
//! Fails fast against a provider known to be down and probes for recovery
//! once a cooldown has elapsed.
//!
//! # State Machine
//!
//! ```text
//! CLOSED(n) ── success ─────────────────────────▶ CLOSED(0)
//! CLOSED(n) ── failure, n+1 < max_failures ─────▶ CLOSED(n+1)
//! CLOSED(n) ── failure, n+1 >= max_failures ────▶ OPEN(now + cooldown)
//! OPEN(t)   ── call, now < t ───────────────────▶ rejected, operation not invoked
//! OPEN(t)   ── call, now >= t (probe) ── ok ────▶ CLOSED(0)
//!                                      └─ err ──▶ OPEN(now + cooldown), original error returned
//! ```
//!
//! Half-open is not stored: it is the condition `OPEN(t) && now >= t`.
//!
//! # Failure Classification
//!
//! Only errors whose [`BreakerFailure::counts_as_failure`] returns true
//! (transport failures, upstream 5xx) move the breaker toward OPEN. Any
//! other error proves the upstream answered and is accounted like a success.
//!
//! # Example
//!
//! ```rust,ignore
//! use order_gateway::resilience::{BreakerConfig, CircuitBreaker, SystemClock};
//!
//! let breaker = CircuitBreaker::new("payplus", BreakerConfig::default(), Arc::new(SystemClock));
//! let link = breaker.call(|| client.request(url, options)).await?;
//! ```

use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::clock::{Clock, add_duration};
use crate::observability::{
    circuit_breaker_state, record_circuit_breaker_failure, record_circuit_breaker_rejected,
    record_circuit_breaker_state,
};

/// Name identifying one breaker's state.
///
/// Two call sites holding the same identity trip and recover together.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BreakerIdentity(String);

impl BreakerIdentity {
    /// Create an identity from a name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The identity as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BreakerIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BreakerIdentity {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Breaker state. Exactly one variant holds at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BreakerState {
    /// Calls flow; counts consecutive failures.
    Closed {
        /// Consecutive counted failures since the last success.
        failure_count: u32,
    },
    /// Calls are rejected until `reset_at`, after which one probe is let through.
    Open {
        /// Earliest time a probe may run.
        reset_at: DateTime<Utc>,
    },
}

impl BreakerState {
    /// Initial state.
    pub const INITIAL: Self = Self::Closed { failure_count: 0 };

    /// Returns true if the breaker is open and its cooldown has elapsed.
    #[must_use]
    pub fn is_half_open(&self, now: DateTime<Utc>) -> bool {
        match self {
            Self::Closed { .. } => false,
            Self::Open { reset_at } => now >= *reset_at,
        }
    }
}

impl fmt::Display for BreakerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Closed { failure_count } => write!(f, "CLOSED({failure_count})"),
            Self::Open { reset_at } => write!(f, "OPEN(until {})", reset_at.to_rfc3339()),
        }
    }
}

/// Breaker configuration, immutable per identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreakerConfig {
    /// Consecutive counted failures that open the circuit.
    pub max_failures: u32,
    /// How long the circuit stays open before a probe is allowed.
    pub cooldown: Duration,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            max_failures: 5,
            cooldown: Duration::from_secs(30),
        }
    }
}

/// A call was rejected without being attempted because the circuit is open.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("circuit breaker '{breaker}' is open until {reset_at}")]
pub struct BreakerOpenError {
    /// Breaker that rejected the call.
    pub breaker: BreakerIdentity,
    /// When the next probe will be allowed.
    pub reset_at: DateTime<Utc>,
}

/// Classification of an error for breaker accounting.
pub trait BreakerFailure {
    /// Returns true if this error indicates the dependency is unhealthy.
    fn counts_as_failure(&self) -> bool;
}

/// Point-in-time view of a breaker, for health reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakerSnapshot {
    /// Breaker identity.
    pub name: BreakerIdentity,
    /// Current state.
    #[serde(flatten)]
    pub state: BreakerState,
    /// Whether a probe would be let through right now.
    pub half_open: bool,
}

/// How a permitted call was admitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Admission {
    /// Circuit closed.
    Normal,
    /// Cooldown elapsed; this call is the recovery probe.
    Probe,
}

/// Circuit breaker guarding one identity.
#[derive(Debug)]
pub struct CircuitBreaker {
    identity: BreakerIdentity,
    config: BreakerConfig,
    state: Mutex<BreakerState>,
    clock: Arc<dyn Clock>,
}

impl CircuitBreaker {
    /// Create a closed circuit breaker.
    #[must_use]
    pub fn new(
        identity: impl Into<BreakerIdentity>,
        config: BreakerConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            identity: identity.into(),
            config,
            state: Mutex::new(BreakerState::INITIAL),
            clock,
        }
    }

    /// Breaker identity.
    #[must_use]
    pub const fn identity(&self) -> &BreakerIdentity {
        &self.identity
    }

    /// Breaker configuration.
    #[must_use]
    pub const fn config(&self) -> BreakerConfig {
        self.config
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> BreakerState {
        *self.lock()
    }

    /// Point-in-time view for health reporting.
    #[must_use]
    pub fn snapshot(&self) -> BreakerSnapshot {
        let state = self.state();
        BreakerSnapshot {
            name: self.identity.clone(),
            state,
            half_open: state.is_half_open(self.clock.now()),
        }
    }

    /// Run `operation` under the breaker.
    ///
    /// The operation is invoked at most once, and never while the circuit is
    /// open and cooling down. When a probe fails the probe's own error is
    /// returned, not a breaker rejection.
    pub async fn call<T, E, F, Fut>(&self, operation: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: From<BreakerOpenError> + BreakerFailure,
    {
        let admission = self.admit()?;

        let result = operation().await;

        match &result {
            Err(err) if err.counts_as_failure() => self.on_failure(admission),
            Ok(_) | Err(_) => self.on_success(admission),
        }

        result
    }

    /// Decide whether a call may proceed.
    ///
    /// A caller that finds the breaker half-open claims the probe by pushing
    /// `reset_at` one cooldown forward, so concurrent callers are rejected
    /// until the probe resolves.
    fn admit(&self) -> Result<Admission, BreakerOpenError> {
        let now = self.clock.now();
        let mut state = self.lock();

        match *state {
            BreakerState::Closed { .. } => Ok(Admission::Normal),
            BreakerState::Open { reset_at } if now < reset_at => {
                drop(state);
                record_circuit_breaker_rejected(self.identity.as_str());
                tracing::debug!(
                    breaker = %self.identity,
                    reset_at = %reset_at,
                    "Call rejected, circuit open"
                );
                Err(BreakerOpenError {
                    breaker: self.identity.clone(),
                    reset_at,
                })
            }
            BreakerState::Open { .. } => {
                *state = BreakerState::Open {
                    reset_at: add_duration(now, self.config.cooldown),
                };
                drop(state);
                record_circuit_breaker_state(
                    self.identity.as_str(),
                    circuit_breaker_state::HALF_OPEN,
                );
                tracing::info!(breaker = %self.identity, "Circuit breaker probing");
                Ok(Admission::Probe)
            }
        }
    }

    fn on_success(&self, admission: Admission) {
        let mut state = self.lock();

        match (*state, admission) {
            (BreakerState::Closed { failure_count: 0 }, _) => {}
            (BreakerState::Closed { .. }, _) => {
                *state = BreakerState::INITIAL;
            }
            (BreakerState::Open { .. }, Admission::Probe) => {
                *state = BreakerState::INITIAL;
                drop(state);
                record_circuit_breaker_state(self.identity.as_str(), circuit_breaker_state::CLOSED);
                tracing::info!(
                    breaker = %self.identity,
                    from = "OPEN",
                    to = "CLOSED",
                    "Circuit breaker closed"
                );
            }
            // A call admitted while closed finished after another call tripped the
            // circuit; only a probe may close it.
            (BreakerState::Open { .. }, Admission::Normal) => {}
        }
    }

    fn on_failure(&self, admission: Admission) {
        record_circuit_breaker_failure(self.identity.as_str());

        let now = self.clock.now();
        let mut state = self.lock();

        match (*state, admission) {
            (BreakerState::Closed { failure_count }, _) => {
                let failure_count = failure_count.saturating_add(1);
                if failure_count >= self.config.max_failures.max(1) {
                    let reset_at = add_duration(now, self.config.cooldown);
                    *state = BreakerState::Open { reset_at };
                    drop(state);
                    record_circuit_breaker_state(
                        self.identity.as_str(),
                        circuit_breaker_state::OPEN,
                    );
                    tracing::warn!(
                        breaker = %self.identity,
                        failure_count,
                        reset_at = %reset_at,
                        from = "CLOSED",
                        to = "OPEN",
                        "Circuit breaker opened"
                    );
                } else {
                    *state = BreakerState::Closed { failure_count };
                }
            }
            (BreakerState::Open { .. }, Admission::Probe) => {
                let reset_at = add_duration(now, self.config.cooldown);
                *state = BreakerState::Open { reset_at };
                drop(state);
                record_circuit_breaker_state(self.identity.as_str(), circuit_breaker_state::OPEN);
                tracing::warn!(
                    breaker = %self.identity,
                    reset_at = %reset_at,
                    "Circuit breaker probe failed, reopened"
                );
            }
            (BreakerState::Open { .. }, Admission::Normal) => {}
        }
    }

    fn lock(&self) -> MutexGuard<'_, BreakerState> {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resilience::clock::ManualClock;
    use chrono::TimeDelta;
    use proptest::prelude::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum TestError {
        Unavailable,
        BadRequest,
        Rejected(BreakerOpenError),
    }

    impl From<BreakerOpenError> for TestError {
        fn from(err: BreakerOpenError) -> Self {
            Self::Rejected(err)
        }
    }

    impl BreakerFailure for TestError {
        fn counts_as_failure(&self) -> bool {
            matches!(self, Self::Unavailable)
        }
    }

    fn breaker(max_failures: u32, cooldown_secs: u64) -> (CircuitBreaker, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::default());
        let breaker = CircuitBreaker::new(
            "test",
            BreakerConfig {
                max_failures,
                cooldown: Duration::from_secs(cooldown_secs),
            },
            clock.clone(),
        );
        (breaker, clock)
    }

    async fn fail(breaker: &CircuitBreaker, calls: &AtomicU32) -> Result<(), TestError> {
        breaker
            .call(|| async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(TestError::Unavailable)
            })
            .await
    }

    async fn succeed(breaker: &CircuitBreaker, calls: &AtomicU32) -> Result<u32, TestError> {
        breaker
            .call(|| async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, TestError>(7)
            })
            .await
    }

    #[tokio::test]
    async fn test_initial_state_is_closed() {
        let (breaker, _) = breaker(3, 30);
        assert_eq!(breaker.state(), BreakerState::Closed { failure_count: 0 });
    }

    #[tokio::test]
    async fn test_failures_below_threshold_stay_closed() {
        let (breaker, _) = breaker(3, 30);
        let calls = AtomicU32::new(0);

        assert_eq!(fail(&breaker, &calls).await, Err(TestError::Unavailable));
        assert_eq!(fail(&breaker, &calls).await, Err(TestError::Unavailable));

        assert_eq!(breaker.state(), BreakerState::Closed { failure_count: 2 });
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_success_resets_failure_count() {
        let (breaker, _) = breaker(3, 30);
        let calls = AtomicU32::new(0);

        let _ = fail(&breaker, &calls).await;
        let _ = fail(&breaker, &calls).await;
        assert_eq!(succeed(&breaker, &calls).await, Ok(7));

        assert_eq!(breaker.state(), BreakerState::INITIAL);
    }

    #[tokio::test]
    async fn test_non_counting_error_leaves_breaker_healthy() {
        let (breaker, _) = breaker(1, 30);

        let result: Result<(), _> = breaker
            .call(|| async { Err(TestError::BadRequest) })
            .await;

        assert_eq!(result, Err(TestError::BadRequest));
        assert_eq!(breaker.state(), BreakerState::INITIAL);
    }

    #[tokio::test]
    async fn test_open_rejects_without_invoking() {
        let (breaker, clock) = breaker(2, 30);
        let calls = AtomicU32::new(0);

        let _ = fail(&breaker, &calls).await;
        let _ = fail(&breaker, &calls).await;
        let expected_reset = clock.now() + TimeDelta::seconds(30);
        assert_eq!(
            breaker.state(),
            BreakerState::Open {
                reset_at: expected_reset
            }
        );

        let rejected = succeed(&breaker, &calls).await;
        assert!(matches!(
            rejected,
            Err(TestError::Rejected(BreakerOpenError { reset_at, .. })) if reset_at == expected_reset
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_probe_success_closes() {
        let (breaker, clock) = breaker(1, 30);
        let calls = AtomicU32::new(0);

        let _ = fail(&breaker, &calls).await;
        clock.advance(Duration::from_secs(30));
        assert!(breaker.snapshot().half_open);

        assert_eq!(succeed(&breaker, &calls).await, Ok(7));
        assert_eq!(breaker.state(), BreakerState::INITIAL);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_probe_failure_reopens_and_propagates_original_error() {
        let (breaker, clock) = breaker(1, 30);
        let calls = AtomicU32::new(0);

        let _ = fail(&breaker, &calls).await;
        clock.advance(Duration::from_secs(45));

        let probe = fail(&breaker, &calls).await;
        assert_eq!(probe, Err(TestError::Unavailable));
        assert_eq!(
            breaker.state(),
            BreakerState::Open {
                reset_at: clock.now() + TimeDelta::seconds(30)
            }
        );
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_probe_with_non_counting_error_closes() {
        let (breaker, clock) = breaker(1, 30);
        let calls = AtomicU32::new(0);

        let _ = fail(&breaker, &calls).await;
        clock.advance(Duration::from_secs(30));

        let probe: Result<(), _> = breaker
            .call(|| async { Err(TestError::BadRequest) })
            .await;
        assert_eq!(probe, Err(TestError::BadRequest));
        assert_eq!(breaker.state(), BreakerState::INITIAL);
    }

    #[tokio::test]
    async fn test_only_one_probe_per_cooldown() {
        let (breaker, clock) = breaker(1, 30);
        let calls = AtomicU32::new(0);

        let _ = fail(&breaker, &calls).await;
        clock.advance(Duration::from_secs(30));

        // The probe is claimed on admission; a second caller arriving while it
        // is in flight is rejected.
        let admission = breaker.admit();
        assert_eq!(admission, Ok(Admission::Probe));
        assert!(breaker.admit().is_err());
    }

    #[tokio::test]
    async fn test_late_success_does_not_close_open_circuit() {
        let (breaker, _) = breaker(1, 30);
        let calls = AtomicU32::new(0);

        let admission = breaker.admit().unwrap();
        let _ = fail(&breaker, &calls).await;
        breaker.on_success(admission);

        assert!(matches!(breaker.state(), BreakerState::Open { .. }));
    }

    /// maxFailures=1, cooldown=30s: fail, reject immediately, recover after 30s.
    #[tokio::test]
    async fn test_trip_reject_recover_scenario() {
        let (breaker, clock) = breaker(1, 30);
        let calls = AtomicU32::new(0);

        assert_eq!(fail(&breaker, &calls).await, Err(TestError::Unavailable));
        assert!(matches!(breaker.state(), BreakerState::Open { .. }));

        assert!(matches!(
            succeed(&breaker, &calls).await,
            Err(TestError::Rejected(_))
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        clock.advance(Duration::from_secs(30));
        assert_eq!(succeed(&breaker, &calls).await, Ok(7));
        assert_eq!(breaker.state(), BreakerState::Closed { failure_count: 0 });
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_snapshot_serializes_state_inline() {
        let (breaker, _) = breaker(3, 30);
        let json = serde_json::to_value(breaker.snapshot()).unwrap();
        assert_eq!(json["name"], "test");
        assert_eq!(json["state"], "CLOSED");
        assert_eq!(json["failure_count"], 0);
        assert_eq!(json["half_open"], false);
    }

    proptest! {
        #[test]
        fn prop_fewer_failures_than_threshold_never_open(max_failures in 2u32..20, extra in 0u32..20) {
            let failures = extra % (max_failures - 1) + 1;
            let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
            runtime.block_on(async {
                let (breaker, _) = breaker(max_failures, 30);
                let calls = AtomicU32::new(0);
                for _ in 0..failures {
                    prop_assert_eq!(fail(&breaker, &calls).await, Err(TestError::Unavailable));
                }
                prop_assert_eq!(calls.load(Ordering::SeqCst), failures);
                prop_assert_eq!(breaker.state(), BreakerState::Closed { failure_count: failures });
                Ok::<(), TestCaseError>(())
            })?;
        }
    }
}
