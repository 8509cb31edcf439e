use chrono::{Duration, Utc};
use dashmap::DashMap;
use uuid::Uuid;

use crate::models::order::{Order, OrderStatus, OrderSummary};
use crate::state::AppState;

/// Ready orders waiting for a partner to claim them. Nothing garbage-collects
/// stale entries; they are excluded at read time once older than the TTL, and
/// removed explicitly when a claim wins.
pub struct DispatchQueue {
    entries: DashMap<Uuid, OrderSummary>,
    ttl: Duration,
}

impl DispatchQueue {
    pub fn new(ttl_secs: i64) -> Self {
        DispatchQueue {
            entries: DashMap::new(),
            ttl: Duration::seconds(ttl_secs),
        }
    }

    pub fn enqueue(&self, entry: OrderSummary) {
        self.entries.insert(entry.order_id, entry);
    }

    pub fn remove(&self, order_id: &Uuid) {
        self.entries.remove(order_id);
    }

    pub fn depth(&self) -> usize {
        self.entries.len()
    }

    /// Live entries, oldest first.
    pub fn entries(&self) -> Vec<OrderSummary> {
        let cutoff = Utc::now() - self.ttl;
        let mut live: Vec<OrderSummary> = self
            .entries
            .iter()
            .filter(|entry| entry.enqueued_at > cutoff)
            .map(|entry| entry.value().clone())
            .collect();
        live.sort_by_key(|entry| entry.enqueued_at);
        live
    }
}

/// Puts a freshly ready order in front of partners.
pub fn enqueue_ready_order(state: &AppState, order: &Order) {
    state.dispatch_queue.enqueue(order.summary(Utc::now()));
    state
        .metrics
        .orders_in_queue
        .set(state.dispatch_queue.depth() as i64);
}

/// Queue entries a partner may still claim. Cross-checks the store so an
/// entry whose order was cancelled or already claimed never shows up, even
/// though the entry itself only leaves the queue on claim or expiry.
pub fn list_available_orders(state: &AppState) -> Vec<OrderSummary> {
    state
        .dispatch_queue
        .entries()
        .into_iter()
        .filter(|entry| {
            state.orders.get(&entry.order_id).is_some_and(|order| {
                order.status == OrderStatus::ReadyForPickup && order.delivery_partner_id.is_none()
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::DispatchQueue;
    use crate::models::order::OrderSummary;

    fn entry(order_id: Uuid) -> OrderSummary {
        OrderSummary {
            order_id,
            order_number: format!("ORD-{order_id}"),
            restaurant_id: Uuid::new_v4(),
            customer_id: Uuid::new_v4(),
            item_count: 2,
            total_price: 460.0,
            delivery_fee: 30.0,
            address_id: None,
            enqueued_at: Utc::now(),
        }
    }

    #[test]
    fn entries_come_back_oldest_first() {
        let queue = DispatchQueue::new(1800);
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();

        let mut older = entry(first);
        older.enqueued_at = Utc::now() - chrono::Duration::seconds(60);
        queue.enqueue(older);
        queue.enqueue(entry(second));

        let listed = queue.entries();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].order_id, first);
        assert_eq!(listed[1].order_id, second);
    }

    #[test]
    fn stale_entries_are_excluded_at_read_time() {
        let queue = DispatchQueue::new(0);
        queue.enqueue(entry(Uuid::new_v4()));

        // Still present in the map, just never listed.
        assert_eq!(queue.depth(), 1);
        assert!(queue.entries().is_empty());
    }

    #[test]
    fn removed_entries_disappear() {
        let queue = DispatchQueue::new(1800);
        let id = Uuid::new_v4();
        queue.enqueue(entry(id));
        queue.remove(&id);
        assert!(queue.entries().is_empty());
    }
}
