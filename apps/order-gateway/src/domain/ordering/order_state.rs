//! Order lifecycle state.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where an order stands between checkout and the kitchen.
///
/// ```text
/// Init ──payment confirmed──▶ PaidFor ──reported to POS──▶ Unconfirmed
///                                                             │
///                              Confirmed / Delivered / Cancelled ◀┘
/// ```
///
/// `Dead` and `Refunded` are set by operators outside the reconciliation flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderState {
    /// Placed at checkout, payment not yet confirmed.
    Init,
    /// Payment confirmed with the clearing provider.
    PaidFor,
    /// Reported to the venue's POS, awaiting the kitchen's decision.
    Unconfirmed,
    /// Accepted by the kitchen.
    Confirmed,
    /// Handed to the customer.
    Delivered,
    /// Rejected or cancelled by the venue.
    Cancelled,
    /// Abandoned; will never progress.
    Dead,
    /// Payment returned to the customer.
    Refunded,
}

impl OrderState {
    /// Returns true if the reconciliation engine has nothing left to do.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        match self {
            Self::Init | Self::PaidFor | Self::Unconfirmed => false,
            Self::Confirmed | Self::Delivered | Self::Cancelled | Self::Dead | Self::Refunded => {
                true
            }
        }
    }

    /// Returns true if a POS status poll may legitimately report this state.
    #[must_use]
    pub const fn is_reportable_by_pos(&self) -> bool {
        match self {
            Self::Unconfirmed | Self::Confirmed | Self::Delivered | Self::Cancelled => true,
            Self::Init | Self::PaidFor | Self::Dead | Self::Refunded => false,
        }
    }

    /// Stable wire name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Init => "INIT",
            Self::PaidFor => "PAID_FOR",
            Self::Unconfirmed => "UNCONFIRMED",
            Self::Confirmed => "CONFIRMED",
            Self::Delivered => "DELIVERED",
            Self::Cancelled => "CANCELLED",
            Self::Dead => "DEAD",
            Self::Refunded => "REFUNDED",
        }
    }
}

impl fmt::Display for OrderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states() {
        assert!(!OrderState::Init.is_terminal());
        assert!(!OrderState::PaidFor.is_terminal());
        assert!(!OrderState::Unconfirmed.is_terminal());
        assert!(OrderState::Confirmed.is_terminal());
        assert!(OrderState::Delivered.is_terminal());
        assert!(OrderState::Cancelled.is_terminal());
        assert!(OrderState::Dead.is_terminal());
        assert!(OrderState::Refunded.is_terminal());
    }

    #[test]
    fn pos_cannot_report_pre_payment_states() {
        assert!(!OrderState::Init.is_reportable_by_pos());
        assert!(!OrderState::PaidFor.is_reportable_by_pos());
        assert!(OrderState::Confirmed.is_reportable_by_pos());
    }

    #[test]
    fn serde_matches_display() {
        let json = serde_json::to_string(&OrderState::PaidFor).unwrap();
        assert_eq!(json, "\"PAID_FOR\"");
        assert_eq!(OrderState::PaidFor.to_string(), "PAID_FOR");
    }
}
