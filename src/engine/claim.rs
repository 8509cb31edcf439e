use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::broadcast::OrderEvent;
use crate::error::AppError;
use crate::models::order::Order;
use crate::models::partner::PartnerSummary;
use crate::state::AppState;

/// Resolves concurrent accept attempts on a ready order into exactly one
/// winner. The store performs the check-and-set in a single atomic step;
/// everything after it is post-claim bookkeeping for an order this partner
/// now owns.
pub fn claim_order(
    state: &AppState,
    order_id: Uuid,
    partner_id: Uuid,
) -> Result<Order, AppError> {
    let partner = state
        .partners
        .get(&partner_id)
        .map(|profile| PartnerSummary::from(profile.value()))
        .ok_or_else(|| AppError::NotFound(format!("delivery partner {partner_id} not found")))?;

    let outcome = state.orders.claim(order_id, partner_id);

    let label = match &outcome {
        Ok(_) => "won",
        Err(AppError::AlreadyAssigned) => "already_assigned",
        Err(AppError::NotReady { .. }) => "not_ready",
        Err(_) => "error",
    };
    state
        .metrics
        .claims_total
        .with_label_values(&[label])
        .inc();

    let order = outcome?;

    state.dispatch_queue.remove(&order_id);
    state
        .metrics
        .orders_in_queue
        .set(state.dispatch_queue.depth() as i64);
    state
        .metrics
        .transitions_total
        .with_label_values(&[order.status.as_str()])
        .inc();

    info!(
        order_number = %order.order_number,
        partner = %partner.name,
        partner_id = %partner_id,
        "order assigned"
    );

    state.broadcaster.publish(OrderEvent::OrderAssigned {
        order_id: order.id,
        order_number: order.order_number.clone(),
        status: order.status,
        customer_id: order.customer_id,
        restaurant_id: order.restaurant_id,
        delivery_partner_id: partner_id,
        partner,
        message: order.status.customer_message().to_string(),
        live_location_enabled: true,
        timestamp: Utc::now(),
    });

    Ok(order)
}
