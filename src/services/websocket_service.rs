use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, Stream, StreamExt};
use thiserror::Error;
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, info, warn};

use crate::{
    dto::ws::ServerOutboundMessage,
    services::game_service::{self, ConnectionContext},
    state::{PlayerConnection, SharedState},
};

/// The writer side of a connection is gone.
#[derive(Debug, Error)]
#[error("connection closed")]
pub struct ConnectionClosed;

/// Handle the full lifecycle for an individual player WebSocket connection.
pub async fn handle_socket(state: SharedState, socket: WebSocket) {
    let (mut sender, receiver) = socket.split();
    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<Message>();

    // Dedicated writer task keeps outbound messages flowing even while we await inbound frames.
    let writer_task = tokio::spawn(async move {
        while let Some(message) = outbound_rx.recv().await {
            let closing = matches!(message, Message::Close(_));
            if sender.send(message).await.is_err() || closing {
                break;
            }
        }
    });

    let ctx = ConnectionContext::new(PlayerConnection::new(outbound_tx.clone()));
    serve_frames(&state, ctx, &outbound_tx, receiver).await;
    finalize(writer_task, outbound_tx).await;
}

/// Dispatch inbound frames until the peer closes or the transport fails, then
/// detach the connection from its game.
async fn serve_frames<S, E>(
    state: &SharedState,
    mut ctx: ConnectionContext,
    outbound_tx: &mpsc::UnboundedSender<Message>,
    mut frames: S,
) where
    S: Stream<Item = Result<Message, E>> + Unpin,
    E: std::fmt::Display,
{
    let conn_id = ctx.connection().id;
    info!(conn = %conn_id, "player connected");

    while let Some(message) = frames.next().await {
        match message {
            Ok(Message::Text(text)) => {
                if dispatch(state, &mut ctx, outbound_tx, text.as_str())
                    .await
                    .is_err()
                {
                    info!(conn = %conn_id, "connection closed while replying, terminating");
                    break;
                }
            }
            Ok(Message::Binary(bytes)) => {
                let result = match std::str::from_utf8(&bytes) {
                    Ok(text) => dispatch(state, &mut ctx, outbound_tx, text).await,
                    Err(_) => send_message_to_websocket(
                        outbound_tx,
                        &ServerOutboundMessage::error("invalid JSON format"),
                    ),
                };
                if result.is_err() {
                    break;
                }
            }
            // The websocket backend answers pings on its own.
            Ok(Message::Ping(_) | Message::Pong(_)) => {}
            Ok(Message::Close(frame)) => {
                info!(conn = %conn_id, "player closed");
                let _ = outbound_tx.send(Message::Close(frame));
                break;
            }
            Err(err) => {
                warn!(conn = %conn_id, error = %err, "websocket error");
                break;
            }
        }
    }

    let last_game = ctx.game_id().map(str::to_owned);
    game_service::leave_game(state, &mut ctx).await;
    info!(conn = %conn_id, game_id = ?last_game, "player disconnected");
}

/// Run one client frame, answering the sender with an `error` message on failure.
async fn dispatch(
    state: &SharedState,
    ctx: &mut ConnectionContext,
    outbound_tx: &mpsc::UnboundedSender<Message>,
    text: &str,
) -> Result<(), ConnectionClosed> {
    debug!(conn = %ctx.connection().id, payload = %text, "received player message");
    match game_service::handle_text(state, ctx, text).await {
        Ok(()) => Ok(()),
        Err(err) => {
            warn!(conn = %ctx.connection().id, error = %err, "rejected player message");
            send_message_to_websocket(outbound_tx, &ServerOutboundMessage::error(err.to_string()))
        }
    }
}

/// Serialize a payload and push it onto the provided WebSocket sender.
///
/// Returns `Ok(())` if the message was queued or if serialization failed
/// (permanent error, no point retrying).
/// Returns `Err(ConnectionClosed)` if the writer channel is closed.
pub(crate) fn send_message_to_websocket<T>(
    tx: &mpsc::UnboundedSender<Message>,
    value: &T,
) -> Result<(), ConnectionClosed>
where
    T: ?Sized + serde::Serialize + std::fmt::Debug,
{
    let payload = match serde_json::to_string(value) {
        Ok(p) => p,
        Err(err) => {
            warn!(error = %err, "failed to serialize message `{value:?}` (permanent error, not retrying)");
            return Ok(());
        }
    };

    tx.send(Message::Text(payload.into()))
        .map_err(|_| ConnectionClosed)
}

/// Ensure the writer task winds down before we return from the socket handler.
async fn finalize(writer_task: JoinHandle<()>, outbound_tx: mpsc::UnboundedSender<Message>) {
    // Broadcasts still in flight may hold sender clones; the close frame stops the writer regardless.
    let _ = outbound_tx.send(Message::Close(None));
    drop(outbound_tx);
    let _ = writer_task.await;
}
