//! In-process per-order mutual exclusion.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::domain::shared::OrderId;

/// Table of async locks keyed by order id.
///
/// Two reconciliations of the same order never interleave inside one process.
/// Entries are dropped once no guard or waiter holds them, including waiters
/// whose future was cancelled.
#[derive(Debug, Default)]
pub struct OrderLocks {
    locks: Mutex<HashMap<OrderId, Slot>>,
}

#[derive(Debug, Default)]
struct Slot {
    lock: Arc<AsyncMutex<()>>,
    /// Guards plus pending waiters.
    holders: usize,
}

/// Counts one holder of a slot for as long as it lives.
#[derive(Debug)]
struct Registration<'a> {
    owner: &'a OrderLocks,
    order_id: OrderId,
}

/// Held while an order is being reconciled.
#[derive(Debug)]
pub struct OrderGuard<'a> {
    // Field order matters: unlock before giving up the registration.
    _guard: OwnedMutexGuard<()>,
    _registration: Registration<'a>,
}

impl OrderLocks {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `order_id`.
    ///
    /// Dropping the returned future before it resolves releases the table
    /// entry the same way dropping the guard does.
    pub async fn acquire(&self, order_id: &OrderId) -> OrderGuard<'_> {
        let (registration, lock) = {
            let mut locks = self.table();
            let slot = locks.entry(order_id.clone()).or_default();
            slot.holders += 1;
            let registration = Registration {
                owner: self,
                order_id: order_id.clone(),
            };
            (registration, Arc::clone(&slot.lock))
        };

        let guard = lock.lock_owned().await;
        OrderGuard {
            _guard: guard,
            _registration: registration,
        }
    }

    /// Number of orders currently tracked.
    #[must_use]
    pub fn len(&self) -> usize {
        self.table().len()
    }

    /// Returns true if no order is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn table(&self) -> MutexGuard<'_, HashMap<OrderId, Slot>> {
        self.locks.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for Registration<'_> {
    fn drop(&mut self) {
        let mut locks = self.owner.table();
        if let Some(slot) = locks.get_mut(&self.order_id) {
            slot.holders = slot.holders.saturating_sub(1);
            if slot.holders == 0 {
                locks.remove(&self.order_id);
            }
        }
    }
}
