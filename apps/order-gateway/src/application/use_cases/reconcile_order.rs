//! Reconcile Order Use Case
//!
//! Advances an order's persisted state as far as the providers currently
//! allow, in one invocation:
//!
//! ```text
//! Init ──validate_transaction──▶ PaidFor ──report_order──▶ Unconfirmed ──get_order_status──▶ (returned state)
//! ```
//!
//! Each stage is guarded by its entry state and persists its result before
//! the next stage runs, so a completed stage is never repeated: the next
//! invocation resumes from whatever was last persisted.

use std::fmt;
use std::sync::Arc;

use tracing::Instrument;

use super::order_locks::OrderLocks;
use crate::application::ports::{
    ClearingProvider, IntegrationRepository, ManagementProvider, OrderRepository, ProviderError,
    ProviderLookup, RepositoryError,
};
use crate::domain::integration::{ClearingIntegration, ManagementIntegration};
use crate::domain::ordering::{Order, OrderState};
use crate::domain::shared::OrderId;
use crate::observability::record_reconcile_stage;

/// One step of the reconciliation pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Confirm payment with the clearing provider.
    ValidateTransaction,
    /// Submit the paid order to the POS.
    ReportOrder,
    /// Poll the POS for the kitchen's decision.
    PollStatus,
}

impl Stage {
    /// State an order must be in for this stage to run.
    #[must_use]
    pub const fn entry_state(self) -> OrderState {
        match self {
            Self::ValidateTransaction => OrderState::Init,
            Self::ReportOrder => OrderState::PaidFor,
            Self::PollStatus => OrderState::Unconfirmed,
        }
    }

    /// Stable name for logs and metrics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ValidateTransaction => "validate_transaction",
            Self::ReportOrder => "report_order",
            Self::PollStatus => "poll_status",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pipeline order. A stage that succeeds hands over to the next one within
/// the same invocation.
pub const STAGES: [Stage; 3] = [
    Stage::ValidateTransaction,
    Stage::ReportOrder,
    Stage::PollStatus,
];

/// Reconciliation failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReconcileError {
    /// Order, integration or provider implementation does not exist.
    #[error("Not found: {what}")]
    NotFound {
        /// Description of the missing entity.
        what: String,
    },

    /// The provider could not be reached (breaker open or transport failure).
    /// Retrying shortly may succeed.
    #[error("Provider unreachable during {stage}: {source}")]
    ProviderUnreachable {
        /// Stage that was blocked.
        stage: Stage,
        /// Underlying provider error.
        source: ProviderError,
    },

    /// The provider answered with an error.
    #[error("Provider error during {stage}: {source}")]
    Provider {
        /// Stage that failed.
        stage: Stage,
        /// Underlying provider error.
        source: ProviderError,
    },

    /// Persistence failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl ReconcileError {
    /// Classify a provider error raised while running `stage`.
    #[must_use]
    pub fn from_stage(stage: Stage, source: ProviderError) -> Self {
        if source.is_unreachable() {
            Self::ProviderUnreachable { stage, source }
        } else {
            Self::Provider { stage, source }
        }
    }

    /// Returns true if the caller should retry later.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::ProviderUnreachable { .. })
    }
}

impl From<ProviderError> for ReconcileError {
    /// Errors raised before any stage runs (provider lookup).
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::NotFound { what } => Self::NotFound { what },
            other => Self::Provider {
                stage: Stage::ValidateTransaction,
                source: other,
            },
        }
    }
}

/// Everything a stage needs besides the order.
struct Wiring {
    clearing_integration: ClearingIntegration,
    clearing: Arc<dyn ClearingProvider>,
    management_integration: ManagementIntegration,
    management: Arc<dyn ManagementProvider>,
}

/// Use case driving an order through payment confirmation and POS reporting.
pub struct ReconcileOrderUseCase<O, I, P>
where
    O: OrderRepository,
    I: IntegrationRepository,
    P: ProviderLookup,
{
    orders: Arc<O>,
    integrations: Arc<I>,
    providers: Arc<P>,
    locks: OrderLocks,
}

impl<O, I, P> ReconcileOrderUseCase<O, I, P>
where
    O: OrderRepository,
    I: IntegrationRepository,
    P: ProviderLookup,
{
    /// Create a new `ReconcileOrderUseCase`.
    pub fn new(orders: Arc<O>, integrations: Arc<I>, providers: Arc<P>) -> Self {
        Self {
            orders,
            integrations,
            providers,
            locks: OrderLocks::new(),
        }
    }

    /// Reconcile one order and return its persisted state afterwards.
    ///
    /// # Errors
    ///
    /// Returns the first failure. Every state persisted before it stands.
    pub async fn execute(&self, order_id: &OrderId) -> Result<OrderState, ReconcileError> {
        let span = tracing::info_span!("reconcile_order", order_id = %order_id);
        async {
            let _guard = self.locks.acquire(order_id).await;
            self.run(order_id).await
        }
        .instrument(span)
        .await
    }

    async fn run(&self, order_id: &OrderId) -> Result<OrderState, ReconcileError> {
        let mut order =
            self.orders
                .find_by_id(order_id)
                .await?
                .ok_or_else(|| ReconcileError::NotFound {
                    what: format!("order {order_id}"),
                })?;

        if order.state.is_terminal() {
            tracing::debug!(state = %order.state, "Order already terminal");
            return Ok(order.state);
        }

        let wiring = self.wire(&order).await?;

        for stage in STAGES {
            if order.state != stage.entry_state() {
                continue;
            }

            match self.run_stage(stage, &wiring, &order).await {
                Ok(next) => {
                    record_reconcile_stage(stage.as_str(), "ok");
                    tracing::info!(stage = %stage, from = %order.state, to = %next, "Stage completed");
                    order.state = next;
                }
                Err(err) => {
                    let outcome = match &err {
                        ReconcileError::ProviderUnreachable { .. } => "unreachable",
                        _ => "error",
                    };
                    record_reconcile_stage(stage.as_str(), outcome);
                    tracing::warn!(
                        stage = %stage,
                        state = %order.state,
                        error = %err,
                        "Stage failed, stopping"
                    );
                    return Err(err);
                }
            }
        }

        Ok(order.state)
    }

    async fn wire(&self, order: &Order) -> Result<Wiring, ReconcileError> {
        let clearing_integration = self
            .integrations
            .clearing_integration(&order.venue_id)
            .await?
            .ok_or_else(|| ReconcileError::NotFound {
                what: format!("clearing integration for venue {}", order.venue_id),
            })?;
        let management_integration = self
            .integrations
            .management_integration(&order.venue_id)
            .await?
            .ok_or_else(|| ReconcileError::NotFound {
                what: format!("management integration for venue {}", order.venue_id),
            })?;

        Ok(Wiring {
            clearing: self.providers.clearing_for(&clearing_integration)?,
            management: self.providers.management_for(&management_integration)?,
            clearing_integration,
            management_integration,
        })
    }

    /// Run one stage and persist its result.
    async fn run_stage(
        &self,
        stage: Stage,
        wiring: &Wiring,
        order: &Order,
    ) -> Result<OrderState, ReconcileError> {
        match stage {
            Stage::ValidateTransaction => {
                let tx_id = wiring
                    .clearing
                    .validate_transaction(&wiring.clearing_integration, order)
                    .await
                    .map_err(|e| ReconcileError::from_stage(stage, e))?;
                self.orders.set_paid(&order.id, &tx_id).await?;
                Ok(OrderState::PaidFor)
            }
            Stage::ReportOrder => {
                wiring
                    .management
                    .report_order(&wiring.management_integration, order)
                    .await
                    .map_err(|e| ReconcileError::from_stage(stage, e))?;
                self.orders
                    .set_state(&order.id, OrderState::Unconfirmed)
                    .await?;
                Ok(OrderState::Unconfirmed)
            }
            Stage::PollStatus => {
                let state = wiring
                    .management
                    .get_order_status(&wiring.management_integration, order)
                    .await
                    .map_err(|e| ReconcileError::from_stage(stage, e))?;
                if !state.is_reportable_by_pos() {
                    return Err(ReconcileError::Provider {
                        stage,
                        source: ProviderError::content(format!(
                            "POS reported {state} for an order it already holds"
                        )),
                    });
                }
                self.orders.set_state(&order.id, state).await?;
                Ok(state)
            }
        }
    }
}
