use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use futures::SinkExt;
use futures::StreamExt;
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::broadcast::Topic;
use crate::models::actor::ActorRole;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct WsQuery {
    pub role: ActorRole,
    pub id: Uuid,
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(query): Query<WsQuery>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let subscription = match query.role {
        ActorRole::Customer => Topic::Customer(query.id),
        ActorRole::Restaurant => Topic::Restaurant(query.id),
        ActorRole::DeliveryPartner => Topic::Partner(query.id),
    };
    ws.on_upgrade(move |socket| handle_socket(socket, state, subscription, query.role))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, subscription: Topic, role: ActorRole) {
    let (mut sender, mut receiver) = socket.split();
    let mut rx = state.broadcaster.subscribe();

    info!(role = %role, "websocket client connected");

    let send_task = tokio::spawn(async move {
        while let Ok(event) = rx.recv().await {
            if !event.delivers_to(&subscription) {
                continue;
            }

            let json = match serde_json::to_string(&event) {
                Ok(json) => json,
                Err(err) => {
                    warn!(error = %err, "failed to serialize event for ws");
                    continue;
                }
            };

            if sender.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    let recv_task = tokio::spawn(async move {
        while let Some(Ok(_msg)) = receiver.next().await {}
    });

    tokio::select! {
        _ = send_task => {},
        _ = recv_task => {},
    }

    info!(role = %role, "websocket client disconnected");
}
