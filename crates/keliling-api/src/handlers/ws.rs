//! WebSocket upgrade handler.

use std::time::Duration;

use axum::extract::ws::rejection::WebSocketUpgradeRejection;
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use keliling_core::error::AppError;
use keliling_core::types::Principal;
use keliling_realtime::{ConnectionSession, OutboundMessage};

use crate::error::ApiError;
use crate::extractors::auth::MISSING_TOKEN;
use crate::state::AppState;

/// Query parameter for WebSocket authentication.
#[derive(Debug, serde::Deserialize)]
pub struct WsQuery {
    /// Access token.
    pub token: Option<String>,
}

/// GET /ws?token={jwt}: WebSocket upgrade
///
/// The token is checked before the upgrade headers, so an unauthenticated
/// client always gets a 401.
pub async fn ws_handler(
    State(state): State<AppState>,
    Query(query): Query<WsQuery>,
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Result<Response, ApiError> {
    let token = query
        .token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::unauthenticated(MISSING_TOKEN))?;
    let principal = state.token_verifier.verify(&token).await?;

    let ws = match ws {
        Ok(ws) => ws,
        Err(rejection) => return Ok(rejection.into_response()),
    };
    Ok(ws.on_upgrade(move |socket| handle_ws_connection(state, principal, socket)))
}

/// Handles an established WebSocket connection.
async fn handle_ws_connection(state: AppState, principal: Principal, socket: WebSocket) {
    let (ws_tx, mut ws_rx) = socket.split();
    let (out_tx, out_rx) =
        mpsc::channel::<OutboundMessage>(state.config.realtime.channel_buffer_size.max(1));

    let session = ConnectionSession::new(
        principal.user_id,
        state.feed.clone(),
        out_tx,
        state.config.realtime.max_subscriptions_per_connection,
    );
    let conn_id = session.id;

    info!(conn_id = %conn_id, user_id = %principal.user_id, "WebSocket connection established");

    let ping_every = Duration::from_secs(state.config.realtime.ping_interval_seconds.max(1));
    let mut outbound_task = tokio::spawn(write_outbound(ws_tx, out_rx, ping_every));

    loop {
        tokio::select! {
            inbound = ws_rx.next() => match inbound {
                Some(Ok(Message::Text(text))) => session.handle_text(text.as_str()).await,
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    warn!(conn_id = %conn_id, error = %e, "WebSocket error");
                    break;
                }
            },
            // Writer stopped: the socket can no longer be written.
            _ = &mut outbound_task => break,
        }
    }

    outbound_task.abort();
    session.close().await;
    info!(conn_id = %conn_id, user_id = %principal.user_id, "WebSocket connection closed");
}

/// Drains the outbound queue into the socket and sends periodic pings.
async fn write_outbound<S>(
    mut ws_tx: S,
    mut out_rx: mpsc::Receiver<OutboundMessage>,
    ping_every: Duration,
) where
    S: futures::Sink<Message> + Unpin,
{
    let mut ping = tokio::time::interval(ping_every);
    ping.tick().await;

    loop {
        let msg = tokio::select! {
            outbound = out_rx.recv() => match outbound {
                Some(msg) => msg,
                None => break,
            },
            _ = ping.tick() => OutboundMessage::Ping { timestamp: Utc::now().timestamp_millis() },
        };
        if !send(&mut ws_tx, &msg).await {
            break;
        }
    }
}

async fn send<S>(ws_tx: &mut S, msg: &OutboundMessage) -> bool
where
    S: futures::Sink<Message> + Unpin,
{
    let text = match msg.to_json() {
        Ok(text) => text,
        Err(e) => {
            warn!(error = %e, "Failed to encode outbound message");
            return true;
        }
    };
    if ws_tx.send(Message::Text(text.into())).await.is_err() {
        debug!("WebSocket send failed");
        return false;
    }
    true
}
