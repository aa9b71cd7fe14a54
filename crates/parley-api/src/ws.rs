//! WebSocket subscription endpoint

use axum::{
    extract::{
        ws::{Message as WsMessage, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    response::Response,
};
use chrono::Utc;
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use uuid::Uuid;

use parley_core::{DebateEvent, EventKind};
use parley_engine::EngineError;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Upgrade handler for `/api/ws/{id}`.
///
/// Unknown debates are rejected with 404 before the upgrade. After the
/// upgrade the client receives `connection_established`, the retained
/// event backlog, then live events until end-of-stream or disconnect.
pub async fn ws_handler(
    State(state): State<AppState>,
    Path(debate_id): Path<Uuid>,
    ws: WebSocketUpgrade,
) -> ApiResult<Response> {
    state
        .store()
        .get(debate_id)
        .map_err(EngineError::from)
        .map_err(ApiError::from)?;
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, debate_id)))
}

async fn handle_socket(socket: WebSocket, state: AppState, debate_id: Uuid) {
    // Re-check under subscribe: the debate may have been deleted between
    // the upgrade handshake and now.
    let (snapshot, subscription) = match state.manager().subscribe(debate_id) {
        Ok(pair) => pair,
        Err(_) => return,
    };

    let (mut ws_tx, mut ws_rx) = socket.split();

    let hello = DebateEvent::new(
        debate_id,
        EventKind::ConnectionEstablished {
            status: snapshot.status,
            current_round: snapshot.current_round,
            current_turn: snapshot.current_turn,
            message_count: snapshot.message_count(),
        },
    );
    if send_event(&mut ws_tx, &hello).await.is_err() {
        return;
    }

    tracing::info!(
        debate_id = %debate_id,
        backlog = subscription.backlog.len(),
        "websocket subscriber attached"
    );

    let backlog = subscription.backlog;
    let mut events = subscription.receiver;

    for event in &backlog {
        if send_event(&mut ws_tx, event).await.is_err() {
            return;
        }
    }

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Some(event) => {
                    if send_event(&mut ws_tx, &event).await.is_err() {
                        break;
                    }
                }
                // Topic closed at terminal state: end of stream
                None => {
                    let _ = ws_tx.send(WsMessage::Close(None)).await;
                    break;
                }
            },
            frame = ws_rx.next() => match frame {
                Some(Ok(WsMessage::Text(text))) => {
                    if is_ping(text.as_str()) {
                        let pong = serde_json::json!({
                            "type": "pong",
                            "timestamp": Utc::now().to_rfc3339(),
                        });
                        if ws_tx
                            .send(WsMessage::Text(pong.to_string().into()))
                            .await
                            .is_err()
                        {
                            break;
                        }
                    }
                }
                Some(Ok(WsMessage::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(err)) => {
                    tracing::debug!(debate_id = %debate_id, error = %err, "websocket receive error");
                    break;
                }
            },
        }
    }

    tracing::info!(debate_id = %debate_id, "websocket subscriber detached");
}

fn is_ping(text: &str) -> bool {
    serde_json::from_str::<serde_json::Value>(text)
        .ok()
        .and_then(|v| v.get("type").and_then(|t| t.as_str()).map(|t| t == "ping"))
        .unwrap_or(false)
}

async fn send_event(
    ws_tx: &mut SplitSink<WebSocket, WsMessage>,
    event: &DebateEvent,
) -> Result<(), axum::Error> {
    let json = serde_json::to_string(event).map_err(axum::Error::new)?;
    ws_tx.send(WsMessage::Text(json.into())).await
}
