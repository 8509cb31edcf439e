use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use serde::Deserialize;
use uuid::Uuid;

use crate::engine::claim::claim_order;
use crate::engine::lifecycle::{self, NewOrder};
use crate::engine::queue::list_available_orders;
use crate::error::AppError;
use crate::models::actor::{Actor, ActorRole};
use crate::models::order::{Order, OrderItem, OrderStatus, OrderSummary};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/orders", post(create_order).get(list_orders))
        .route("/orders/available", get(available_orders))
        .route("/orders/:id", get(get_order))
        .route("/orders/:id/status", post(update_status))
        .route("/orders/:id/claim", post(claim))
}

#[derive(Deserialize)]
pub struct CreateOrderRequest {
    pub customer_id: Uuid,
    pub restaurant_id: Uuid,
    pub items: Vec<OrderItem>,
    pub address_id: Option<Uuid>,
}

async fn create_order(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateOrderRequest>,
) -> Result<Json<Order>, AppError> {
    let order = lifecycle::create_order(
        &state,
        NewOrder {
            customer_id: payload.customer_id,
            restaurant_id: payload.restaurant_id,
            items: payload.items,
            address_id: payload.address_id,
        },
    )?;
    Ok(Json(order))
}

#[derive(Deserialize)]
pub struct OrdersQuery {
    pub customer_id: Option<Uuid>,
    pub partner_id: Option<Uuid>,
}

async fn list_orders(
    State(state): State<Arc<AppState>>,
    Query(query): Query<OrdersQuery>,
) -> Result<Json<Vec<Order>>, AppError> {
    let orders = match (query.customer_id, query.partner_id) {
        (Some(customer_id), None) => state.orders.list_by_customer(customer_id),
        (None, Some(partner_id)) => state.orders.list_by_partner(partner_id),
        _ => {
            return Err(AppError::BadRequest(
                "exactly one of customer_id or partner_id is required".to_string(),
            ));
        }
    };
    Ok(Json(orders))
}

async fn get_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Order>, AppError> {
    let order = state
        .orders
        .get(&id)
        .ok_or_else(|| AppError::NotFound(format!("order {id} not found")))?;
    Ok(Json(order))
}

async fn available_orders(State(state): State<Arc<AppState>>) -> Json<Vec<OrderSummary>> {
    Json(list_available_orders(&state))
}

#[derive(Deserialize)]
pub struct TransitionRequest {
    pub actor_role: ActorRole,
    pub actor_id: Uuid,
    pub status: OrderStatus,
}

async fn update_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<TransitionRequest>,
) -> Result<Json<Order>, AppError> {
    let actor = Actor {
        role: payload.actor_role,
        id: payload.actor_id,
    };
    let order = lifecycle::transition_order(&state, id, actor, payload.status)?;
    Ok(Json(order))
}

#[derive(Deserialize)]
pub struct ClaimRequest {
    pub partner_id: Uuid,
}

async fn claim(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ClaimRequest>,
) -> Result<Json<Order>, AppError> {
    let order = claim_order(&state, id, payload.partner_id)?;
    Ok(Json(order))
}
