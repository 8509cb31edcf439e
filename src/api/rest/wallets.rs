use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::{Path, State};
use axum::routing::{get, post};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::broadcast::OrderEvent;
use crate::error::AppError;
use crate::models::actor::ActorRole;
use crate::models::wallet::{Wallet, WalletOwner, WalletTransaction};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/wallets/:role/:id", get(get_wallet))
        .route("/wallets/:role/:id/credit", post(credit_wallet))
}

async fn get_wallet(
    State(state): State<Arc<AppState>>,
    Path((role, id)): Path<(ActorRole, Uuid)>,
) -> Json<Wallet> {
    Json(state.wallets.wallet(WalletOwner::new(role, id)))
}

#[derive(Deserialize)]
pub struct CreditRequest {
    pub amount: f64,
    pub description: Option<String>,
    pub order_id: Option<Uuid>,
}

async fn credit_wallet(
    State(state): State<Arc<AppState>>,
    Path((role, id)): Path<(ActorRole, Uuid)>,
    Json(payload): Json<CreditRequest>,
) -> Result<Json<WalletTransaction>, AppError> {
    let owner = WalletOwner::new(role, id);
    let description = payload
        .description
        .unwrap_or_else(|| "Wallet credit".to_string());

    let outcome = state
        .wallets
        .credit(owner, payload.amount, description, payload.order_id)?;

    if outcome.applied {
        state
            .metrics
            .wallet_credited_total
            .inc_by(outcome.transaction.amount);
        state.broadcaster.publish(OrderEvent::WalletUpdated {
            owner,
            order_id: outcome.transaction.order_id,
            order_number: None,
            amount: outcome.transaction.amount,
            new_balance: state.wallets.balance(owner),
            timestamp: Utc::now(),
        });
    }

    Ok(Json(outcome.transaction))
}
