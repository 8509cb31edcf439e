use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle states of an order. `Assigned` is only reachable through the
/// claim path, never through a plain transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Placed,
    Accepted,
    ReadyForPickup,
    Assigned,
    AtRestaurant,
    PickedUp,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Placed => "PLACED",
            OrderStatus::Accepted => "ACCEPTED",
            OrderStatus::ReadyForPickup => "READY_FOR_PICKUP",
            OrderStatus::Assigned => "ASSIGNED",
            OrderStatus::AtRestaurant => "AT_RESTAURANT",
            OrderStatus::PickedUp => "PICKED_UP",
            OrderStatus::Delivered => "DELIVERED",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }

    /// The legal transition table. A request outside this table is rejected,
    /// including a retry where the order already carries the requested status.
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        matches!(
            (self, next),
            (OrderStatus::Placed, OrderStatus::Accepted)
                | (OrderStatus::Placed, OrderStatus::Cancelled)
                | (OrderStatus::Accepted, OrderStatus::ReadyForPickup)
                | (OrderStatus::Accepted, OrderStatus::Cancelled)
                | (OrderStatus::ReadyForPickup, OrderStatus::Cancelled)
                | (OrderStatus::Assigned, OrderStatus::AtRestaurant)
                | (OrderStatus::AtRestaurant, OrderStatus::PickedUp)
                | (OrderStatus::PickedUp, OrderStatus::Delivered)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// True while a delivery partner is actively moving the order.
    pub fn live_location_enabled(self) -> bool {
        matches!(
            self,
            OrderStatus::Assigned | OrderStatus::AtRestaurant | OrderStatus::PickedUp
        )
    }

    /// Fixed customer-facing message per status.
    pub fn customer_message(self) -> &'static str {
        match self {
            OrderStatus::Placed => "Your order has been placed",
            OrderStatus::Accepted => "Restaurant accepted your order",
            OrderStatus::ReadyForPickup => "Looking for a delivery partner",
            OrderStatus::Assigned => "Your delivery partner is on the way",
            OrderStatus::AtRestaurant => "Your delivery partner has arrived at the restaurant",
            OrderStatus::PickedUp => "Order picked up — on the way to you",
            OrderStatus::Delivered => "Order delivered successfully",
            OrderStatus::Cancelled => "Order has been cancelled",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A line item with the unit price snapshotted at order time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub menu_item_id: Uuid,
    pub name: String,
    pub quantity: u32,
    pub unit_price: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub order_number: String,
    pub customer_id: Uuid,
    pub restaurant_id: Uuid,
    pub delivery_partner_id: Option<Uuid>,
    pub items: Vec<OrderItem>,
    pub subtotal: f64,
    pub delivery_fee: f64,
    pub handling_charge: f64,
    pub tax: f64,
    pub total_price: f64,
    pub status: OrderStatus,
    pub address_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub delivered_at: Option<DateTime<Utc>>,
}

/// What a browsing partner sees for a ready order.
#[derive(Debug, Clone, Serialize)]
pub struct OrderSummary {
    pub order_id: Uuid,
    pub order_number: String,
    pub restaurant_id: Uuid,
    pub customer_id: Uuid,
    pub item_count: usize,
    pub total_price: f64,
    pub delivery_fee: f64,
    pub address_id: Option<Uuid>,
    pub enqueued_at: DateTime<Utc>,
}

impl Order {
    pub fn summary(&self, enqueued_at: DateTime<Utc>) -> OrderSummary {
        OrderSummary {
            order_id: self.id,
            order_number: self.order_number.clone(),
            restaurant_id: self.restaurant_id,
            customer_id: self.customer_id,
            item_count: self.items.len(),
            total_price: self.total_price,
            delivery_fee: self.delivery_fee,
            address_id: self.address_id,
            enqueued_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::OrderStatus;

    const ALL: [OrderStatus; 8] = [
        OrderStatus::Placed,
        OrderStatus::Accepted,
        OrderStatus::ReadyForPickup,
        OrderStatus::Assigned,
        OrderStatus::AtRestaurant,
        OrderStatus::PickedUp,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    #[test]
    fn happy_path_transitions_are_legal() {
        let restaurant_chain = [
            OrderStatus::Placed,
            OrderStatus::Accepted,
            OrderStatus::ReadyForPickup,
        ];
        for pair in restaurant_chain.windows(2) {
            assert!(pair[0].can_transition_to(pair[1]));
        }

        let delivery_chain = [
            OrderStatus::Assigned,
            OrderStatus::AtRestaurant,
            OrderStatus::PickedUp,
            OrderStatus::Delivered,
        ];
        for pair in delivery_chain.windows(2) {
            assert!(pair[0].can_transition_to(pair[1]));
        }
    }

    #[test]
    fn cancellation_is_only_reachable_before_assignment() {
        assert!(OrderStatus::Placed.can_transition_to(OrderStatus::Cancelled));
        assert!(OrderStatus::Accepted.can_transition_to(OrderStatus::Cancelled));
        assert!(OrderStatus::ReadyForPickup.can_transition_to(OrderStatus::Cancelled));

        assert!(!OrderStatus::Assigned.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::AtRestaurant.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::PickedUp.can_transition_to(OrderStatus::Cancelled));
    }

    #[test]
    fn terminal_states_have_no_exits() {
        for next in ALL {
            assert!(!OrderStatus::Delivered.can_transition_to(next));
            assert!(!OrderStatus::Cancelled.can_transition_to(next));
        }
    }

    #[test]
    fn retry_with_current_status_is_rejected() {
        for status in ALL {
            assert!(!status.can_transition_to(status));
        }
    }

    #[test]
    fn assignment_is_not_a_plain_transition() {
        assert!(!OrderStatus::ReadyForPickup.can_transition_to(OrderStatus::Assigned));
    }
}
