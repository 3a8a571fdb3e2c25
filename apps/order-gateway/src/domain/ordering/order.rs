//! Order aggregate as seen by the reconciliation engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::order_state::OrderState;
use crate::domain::shared::{MenuItemId, Money, OrderId, TransactionId, VenueId};

/// A single line on an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    /// POS identifier of the ordered menu item.
    pub menu_item_id: MenuItemId,
    /// Display name at the time of ordering.
    pub name: String,
    /// Number of units.
    pub quantity: u32,
    /// Price of one unit.
    pub unit_price: Money,
}

impl OrderItem {
    /// Line total (`unit_price * quantity`), or `None` on overflow.
    #[must_use]
    pub fn total(&self) -> Option<Money> {
        self.unit_price.checked_mul(self.quantity)
    }
}

/// Contact details forwarded to the venue's POS.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    /// Name shown on the kitchen ticket.
    pub name: String,
    /// Phone number for pickup/delivery coordination.
    pub phone: String,
}

/// A customer order.
///
/// Created at checkout by an external collaborator. Only the reconciliation
/// engine moves `state` and `tx_id`, through the order repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Order identifier.
    pub id: OrderId,
    /// Venue the order was placed at.
    pub venue_id: VenueId,
    /// Current lifecycle state.
    pub state: OrderState,
    /// Clearing transaction, set once payment is confirmed.
    pub tx_id: Option<TransactionId>,
    /// Amount charged to the customer.
    pub total_cost: Money,
    /// Ordered lines.
    pub items: Vec<OrderItem>,
    /// Customer contact details.
    pub customer: Customer,
    /// Checkout time.
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Create a freshly placed order in [`OrderState::Init`].
    #[must_use]
    pub fn new(
        id: OrderId,
        venue_id: VenueId,
        total_cost: Money,
        items: Vec<OrderItem>,
        customer: Customer,
    ) -> Self {
        Self {
            id,
            venue_id,
            state: OrderState::Init,
            tx_id: None,
            total_cost,
            items,
            customer,
            created_at: Utc::now(),
        }
    }

    /// Copy of this order with a different state (test and fixture helper).
    #[must_use]
    pub fn with_state(mut self, state: OrderState) -> Self {
        self.state = state;
        self
    }

    /// Sum of all line totals, or `None` if any step overflows.
    #[must_use]
    pub fn items_total(&self) -> Option<Money> {
        self.items
            .iter()
            .try_fold(Money::ZERO, |acc, item| acc.checked_add(item.total()?))
    }
}
