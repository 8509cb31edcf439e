use chrono::Utc;
use tracing::{error, info};
use uuid::Uuid;

use crate::broadcast::OrderEvent;
use crate::engine::queue::enqueue_ready_order;
use crate::error::AppError;
use crate::models::actor::{Actor, ActorRole};
use crate::models::order::{Order, OrderItem, OrderStatus};
use crate::models::wallet::WalletOwner;
use crate::state::AppState;
use crate::store::TransitionRecord;

pub struct NewOrder {
    pub customer_id: Uuid,
    pub restaurant_id: Uuid,
    pub items: Vec<OrderItem>,
    pub address_id: Option<Uuid>,
}

/// Creates an order in PLACED with the money breakdown computed once.
/// Prices on the line items are snapshots supplied by the menu layer and are
/// never recomputed after this point.
pub fn create_order(state: &AppState, new_order: NewOrder) -> Result<Order, AppError> {
    if new_order.items.is_empty() {
        return Err(AppError::BadRequest(
            "at least one item is required".to_string(),
        ));
    }
    for item in &new_order.items {
        if item.quantity == 0 {
            return Err(AppError::BadRequest(format!(
                "item {} has zero quantity",
                item.name
            )));
        }
        if item.unit_price < 0.0 || !item.unit_price.is_finite() {
            return Err(AppError::BadRequest(format!(
                "item {} has an invalid price",
                item.name
            )));
        }
    }

    let subtotal: f64 = new_order
        .items
        .iter()
        .map(|item| item.unit_price * f64::from(item.quantity))
        .sum();
    let delivery_fee = (subtotal * 0.05).clamp(30.0, 100.0);
    let handling_charge = (subtotal * 0.02).clamp(10.0, 50.0);
    let tax = subtotal * 0.05;
    let total_price = subtotal + delivery_fee + handling_charge + tax;

    let order = Order {
        id: Uuid::new_v4(),
        order_number: next_order_number(),
        customer_id: new_order.customer_id,
        restaurant_id: new_order.restaurant_id,
        delivery_partner_id: None,
        items: new_order.items,
        subtotal,
        delivery_fee,
        handling_charge,
        tax,
        total_price,
        status: OrderStatus::Placed,
        address_id: new_order.address_id,
        created_at: Utc::now(),
        delivered_at: None,
    };

    state.orders.insert(order.clone());
    state
        .metrics
        .transitions_total
        .with_label_values(&[order.status.as_str()])
        .inc();

    info!(order_number = %order.order_number, total = order.total_price, "order created");

    state.broadcaster.publish(OrderEvent::OrderCreated {
        order_id: order.id,
        order_number: order.order_number.clone(),
        status: order.status,
        customer_id: order.customer_id,
        restaurant_id: order.restaurant_id,
        total_price: order.total_price,
        message: order.status.customer_message().to_string(),
        timestamp: Utc::now(),
    });

    Ok(order)
}

fn next_order_number() -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("ORD-{}-{}", Utc::now().timestamp_millis(), &suffix[..6])
}

/// The role allowed to set a given target status. PLACED and ASSIGNED are
/// never set through a plain transition, so they map to no role.
fn required_role(target: OrderStatus) -> Option<ActorRole> {
    match target {
        OrderStatus::Accepted | OrderStatus::ReadyForPickup | OrderStatus::Cancelled => {
            Some(ActorRole::Restaurant)
        }
        OrderStatus::AtRestaurant | OrderStatus::PickedUp | OrderStatus::Delivered => {
            Some(ActorRole::DeliveryPartner)
        }
        OrderStatus::Placed | OrderStatus::Assigned => None,
    }
}

/// Drives one status transition on behalf of an actor.
///
/// Reachability is checked before authority, so a restaurant asking for
/// PICKED_UP from ACCEPTED hears "invalid transition", not "forbidden".
/// The store then re-asserts the current status under its entry lock, which
/// is what makes a concurrent or retried transition lose cleanly.
pub fn transition_order(
    state: &AppState,
    order_id: Uuid,
    actor: Actor,
    requested: OrderStatus,
) -> Result<Order, AppError> {
    let order = state
        .orders
        .get(&order_id)
        .ok_or_else(|| AppError::NotFound(format!("order {order_id} not found")))?;

    if !order.status.can_transition_to(requested) {
        return Err(AppError::InvalidTransition {
            from: order.status,
            to: requested,
        });
    }

    match required_role(requested) {
        Some(role) if actor.role == role => {}
        Some(role) => {
            return Err(AppError::Forbidden(format!(
                "only the {role} can set status {requested}"
            )));
        }
        None => {
            return Err(AppError::Forbidden(format!(
                "status {requested} cannot be set directly"
            )));
        }
    }

    match actor.role {
        ActorRole::Restaurant => {
            if order.restaurant_id != actor.id {
                return Err(AppError::Forbidden(
                    "order does not belong to this restaurant".to_string(),
                ));
            }
        }
        ActorRole::DeliveryPartner => {
            if order.delivery_partner_id != Some(actor.id) {
                return Err(AppError::Forbidden("order not assigned to you".to_string()));
            }
        }
        ActorRole::Customer => {}
    }

    let record = state.orders.transition(order_id, requested)?;
    state
        .metrics
        .transitions_total
        .with_label_values(&[record.order.status.as_str()])
        .inc();

    info!(
        order_number = %record.order.order_number,
        from = %record.previous,
        to = %record.order.status,
        "order status updated"
    );

    apply_side_effects(state, &record);
    Ok(record.order)
}

/// Side effects are at-least-once and best-effort: the transition has
/// already committed, so nothing here may roll it back.
fn apply_side_effects(state: &AppState, record: &TransitionRecord) {
    let order = &record.order;

    if order.status == OrderStatus::ReadyForPickup {
        enqueue_ready_order(state, order);
        info!(
            order_number = %order.order_number,
            online_partners = state.presence.online_count(),
            "order ready for pickup, notifying partners"
        );
        state.broadcaster.publish(OrderEvent::NewOrderReady {
            order_id: order.id,
            order_number: order.order_number.clone(),
            restaurant_id: order.restaurant_id,
            customer_id: order.customer_id,
            total_price: order.total_price,
            delivery_fee: order.delivery_fee,
            message: OrderStatus::ReadyForPickup.customer_message().to_string(),
            timestamp: Utc::now(),
        });
    }

    state.broadcaster.publish(OrderEvent::StatusUpdated {
        order_id: order.id,
        order_number: order.order_number.clone(),
        status: order.status,
        customer_id: order.customer_id,
        restaurant_id: order.restaurant_id,
        delivery_partner_id: order.delivery_partner_id,
        message: order.status.customer_message().to_string(),
        live_location_enabled: order.status.live_location_enabled(),
        rating_prompt: order.status == OrderStatus::Delivered,
        timestamp: Utc::now(),
    });

    if order.status == OrderStatus::Delivered {
        credit_delivery_fee(state, order);
    }
}

/// Pays the delivery fee into the partner's wallet. A failure here is logged
/// for reconciliation and deliberately does not fail the delivered
/// transition; the customer-facing confirmation matters more than payout
/// bookkeeping.
fn credit_delivery_fee(state: &AppState, order: &Order) {
    let Some(partner_id) = order.delivery_partner_id else {
        return;
    };
    if order.delivery_fee <= 0.0 {
        return;
    }

    let owner = WalletOwner::DeliveryPartner(partner_id);
    let description = format!("Delivery fee for order #{}", order.order_number);

    match state
        .wallets
        .credit(owner, order.delivery_fee, description, Some(order.id))
    {
        Ok(outcome) => {
            if !outcome.applied {
                return;
            }
            let txn = outcome.transaction;
            state.metrics.wallet_credited_total.inc_by(txn.amount);
            state.broadcaster.publish(OrderEvent::WalletUpdated {
                owner,
                order_id: Some(order.id),
                order_number: Some(order.order_number.clone()),
                amount: txn.amount,
                new_balance: state.wallets.balance(owner),
                timestamp: Utc::now(),
            });
            info!(
                order_number = %order.order_number,
                partner_id = %partner_id,
                amount = txn.amount,
                "delivery fee credited"
            );
        }
        Err(err) => {
            let failure = AppError::WalletOperationFailed(err.to_string());
            error!(
                order_number = %order.order_number,
                partner_id = %partner_id,
                error = %failure,
                "wallet credit failed; order stays delivered"
            );
        }
    }
}
