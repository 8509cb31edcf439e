use dashmap::DashMap;
use chrono::Utc;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::order::{Order, OrderStatus};

/// Outcome of a conditional status update: the updated order plus the status
/// it held before the update committed.
#[derive(Debug, Clone)]
pub struct TransitionRecord {
    pub order: Order,
    pub previous: OrderStatus,
}

/// In-memory order store standing in for the external relational store.
///
/// `status` and `delivery_partner_id` are only ever written through
/// [`OrderStore::transition`] and [`OrderStore::claim`], both of which
/// re-check their preconditions under the entry lock. There is no
/// unconditional write path, so two racing updates against the same order
/// serialize and the loser observes the winner's state.
pub struct OrderStore {
    orders: DashMap<Uuid, Order>,
}

impl OrderStore {
    pub fn new() -> Self {
        OrderStore {
            orders: DashMap::new(),
        }
    }

    pub fn insert(&self, order: Order) {
        self.orders.insert(order.id, order);
    }

    pub fn get(&self, id: &Uuid) -> Option<Order> {
        self.orders.get(id).map(|entry| entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn list_by_customer(&self, customer_id: Uuid) -> Vec<Order> {
        let mut orders: Vec<Order> = self
            .orders
            .iter()
            .filter(|entry| entry.customer_id == customer_id)
            .map(|entry| entry.value().clone())
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        orders
    }

    pub fn list_by_partner(&self, partner_id: Uuid) -> Vec<Order> {
        let mut orders: Vec<Order> = self
            .orders
            .iter()
            .filter(|entry| entry.delivery_partner_id == Some(partner_id))
            .map(|entry| entry.value().clone())
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        orders
    }

    /// Conditional status update. Validates the requested status against the
    /// transition table using the status the row holds *now*, under the entry
    /// lock, so a stale retry is rejected instead of double-applied. Stamps
    /// `delivered_at` when the order reaches `Delivered`.
    pub fn transition(
        &self,
        id: Uuid,
        requested: OrderStatus,
    ) -> Result<TransitionRecord, AppError> {
        let mut entry = self
            .orders
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("order {id} not found")))?;

        let current = entry.status;
        if !current.can_transition_to(requested) {
            return Err(AppError::InvalidTransition {
                from: current,
                to: requested,
            });
        }

        entry.status = requested;
        if requested == OrderStatus::Delivered {
            entry.delivered_at = Some(Utc::now());
        }

        Ok(TransitionRecord {
            order: entry.value().clone(),
            previous: current,
        })
    }

    /// Atomic claim: requires the order to still be READY_FOR_PICKUP and
    /// unassigned, and sets the partner and ASSIGNED in the same step. Under
    /// concurrent claims exactly one caller wins; every other caller gets
    /// `AlreadyAssigned` (someone holds the order) or `NotReady` (the status
    /// moved on, e.g. cancelled).
    pub fn claim(&self, id: Uuid, partner_id: Uuid) -> Result<Order, AppError> {
        let mut entry = self
            .orders
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("order {id} not found")))?;

        if entry.delivery_partner_id.is_some() {
            return Err(AppError::AlreadyAssigned);
        }
        if entry.status != OrderStatus::ReadyForPickup {
            return Err(AppError::NotReady {
                current: entry.status,
            });
        }

        entry.delivery_partner_id = Some(partner_id);
        entry.status = OrderStatus::Assigned;
        Ok(entry.value().clone())
    }
}

impl Default for OrderStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::OrderStore;
    use crate::error::AppError;
    use crate::models::order::{Order, OrderStatus};

    fn order(status: OrderStatus) -> Order {
        Order {
            id: Uuid::new_v4(),
            order_number: "ORD-test".to_string(),
            customer_id: Uuid::new_v4(),
            restaurant_id: Uuid::new_v4(),
            delivery_partner_id: None,
            items: Vec::new(),
            subtotal: 100.0,
            delivery_fee: 30.0,
            handling_charge: 10.0,
            tax: 5.0,
            total_price: 145.0,
            status,
            address_id: None,
            created_at: Utc::now(),
            delivered_at: None,
        }
    }

    #[test]
    fn transition_rejects_stale_request() {
        let store = OrderStore::new();
        let o = order(OrderStatus::Placed);
        let id = o.id;
        store.insert(o);

        store.transition(id, OrderStatus::Accepted).unwrap();

        // A second, stale PLACED -> ACCEPTED retry now sees ACCEPTED.
        let err = store.transition(id, OrderStatus::Accepted).unwrap_err();
        assert!(matches!(
            err,
            AppError::InvalidTransition {
                from: OrderStatus::Accepted,
                to: OrderStatus::Accepted
            }
        ));
    }

    #[test]
    fn transition_stamps_delivered_at_only_on_delivery() {
        let store = OrderStore::new();
        let o = order(OrderStatus::PickedUp);
        let id = o.id;
        store.insert(o);

        let record = store.transition(id, OrderStatus::Delivered).unwrap();
        assert!(record.order.delivered_at.is_some());
        assert_eq!(record.previous, OrderStatus::PickedUp);
    }

    #[test]
    fn claim_wins_once_then_reports_already_assigned() {
        let store = OrderStore::new();
        let o = order(OrderStatus::ReadyForPickup);
        let id = o.id;
        store.insert(o);

        let p1 = Uuid::new_v4();
        let p2 = Uuid::new_v4();

        let won = store.claim(id, p1).unwrap();
        assert_eq!(won.status, OrderStatus::Assigned);
        assert_eq!(won.delivery_partner_id, Some(p1));

        let err = store.claim(id, p2).unwrap_err();
        assert!(matches!(err, AppError::AlreadyAssigned));

        // The winner is never displaced.
        assert_eq!(store.get(&id).unwrap().delivery_partner_id, Some(p1));
    }

    #[test]
    fn claim_on_cancelled_order_reports_not_ready() {
        let store = OrderStore::new();
        let o = order(OrderStatus::Cancelled);
        let id = o.id;
        store.insert(o);

        let err = store.claim(id, Uuid::new_v4()).unwrap_err();
        assert!(matches!(
            err,
            AppError::NotReady {
                current: OrderStatus::Cancelled
            }
        ));
    }
}
