use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::{Path, State};
use axum::routing::{patch, post};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::broadcast::OrderEvent;
use crate::error::AppError;
use crate::models::partner::{GeoPoint, PartnerPresence, PartnerProfile};
use crate::models::wallet::WalletOwner;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/partners", post(create_partner).get(list_partners))
        .route("/partners/:id/presence", patch(update_presence))
        .route("/partners/:id/location", patch(ping_location))
}

#[derive(Deserialize)]
pub struct CreatePartnerRequest {
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub rating: Option<f64>,
    pub vehicle_type: Option<String>,
    pub vehicle_number: Option<String>,
}

async fn create_partner(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreatePartnerRequest>,
) -> Result<Json<PartnerProfile>, AppError> {
    if payload.name.trim().is_empty() {
        return Err(AppError::BadRequest("name cannot be empty".to_string()));
    }
    if payload.phone.trim().is_empty() {
        return Err(AppError::BadRequest("phone cannot be empty".to_string()));
    }

    let profile = PartnerProfile {
        id: Uuid::new_v4(),
        name: payload.name,
        phone: payload.phone,
        rating: payload.rating.unwrap_or(5.0).clamp(0.0, 5.0),
        total_ratings: 0,
        vehicle_type: payload.vehicle_type,
        vehicle_number: payload.vehicle_number,
        created_at: Utc::now(),
    };

    // Every partner gets a wallet up front, as account signup does.
    let _ = state
        .wallets
        .wallet(WalletOwner::DeliveryPartner(profile.id));

    state.partners.insert(profile.id, profile.clone());
    Ok(Json(profile))
}

#[derive(Serialize)]
struct PartnerListing {
    #[serde(flatten)]
    profile: PartnerProfile,
    online: bool,
    presence: Option<PartnerPresence>,
}

async fn list_partners(State(state): State<Arc<AppState>>) -> Json<Vec<PartnerListing>> {
    let partners = state
        .partners
        .iter()
        .map(|entry| {
            let presence = state.presence.presence(entry.key());
            PartnerListing {
                profile: entry.value().clone(),
                online: presence.is_some(),
                presence,
            }
        })
        .collect();
    Json(partners)
}

#[derive(Deserialize)]
pub struct PresenceRequest {
    pub online: bool,
    pub location: Option<GeoPoint>,
}

#[derive(Serialize)]
struct PresenceResponse {
    partner_id: Uuid,
    online: bool,
    presence: Option<PartnerPresence>,
}

async fn update_presence(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<PresenceRequest>,
) -> Result<Json<PresenceResponse>, AppError> {
    if !state.partners.contains_key(&id) {
        return Err(AppError::NotFound(format!(
            "delivery partner {id} not found"
        )));
    }

    let presence = if payload.online {
        Some(state.presence.register(id, payload.location))
    } else {
        state.presence.unregister(&id);
        None
    };

    Ok(Json(PresenceResponse {
        partner_id: id,
        online: presence.is_some(),
        presence,
    }))
}

#[derive(Deserialize)]
pub struct LocationPing {
    pub location: GeoPoint,
    pub order_id: Option<Uuid>,
}

/// Location ping during a delivery. Refreshes liveness, and when the ping
/// names an order this partner is actively carrying, relays the position to
/// the customer and restaurant.
async fn ping_location(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<LocationPing>,
) -> Result<Json<PartnerPresence>, AppError> {
    if !state.partners.contains_key(&id) {
        return Err(AppError::NotFound(format!(
            "delivery partner {id} not found"
        )));
    }

    let presence = state.presence.register(id, Some(payload.location));

    if let Some(order_id) = payload.order_id {
        if let Some(order) = state.orders.get(&order_id) {
            if order.delivery_partner_id == Some(id) && order.status.live_location_enabled() {
                state.broadcaster.publish(OrderEvent::LocationUpdate {
                    order_id: order.id,
                    order_number: order.order_number.clone(),
                    status: order.status,
                    customer_id: order.customer_id,
                    restaurant_id: order.restaurant_id,
                    delivery_partner_id: id,
                    location: payload.location,
                    timestamp: Utc::now(),
                });
            }
        }
    }

    Ok(Json(presence))
}
