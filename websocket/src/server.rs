//! WebSocket server implementation.
//!
//! Accepts WebSocket connections at `/ws`. A client subscribes with an
//! optional user/role filter; status changes from the [`StatusFeed`] are then
//! forwarded to it by a per-connection task until it unsubscribes or
//! disconnects.

use std::future::Future;
use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use kycgate_verification::{StatusChange, StatusFeed};

use crate::subscriptions::{ClientMessage, ServerMessage, SubscriptionFilter};

#[derive(Debug, Error)]
pub enum WebSocketError {
    #[error("failed to bind {addr}: {reason}")]
    Bind { addr: String, reason: String },

    #[error("server error: {0}")]
    Serve(String),
}

type Sender = Arc<Mutex<SplitSink<WebSocket, Message>>>;

/// The WebSocket server, fed by the service's status feed.
pub struct WebSocketServer {
    feed: StatusFeed,
}

impl WebSocketServer {
    pub fn new(feed: StatusFeed) -> Self {
        Self { feed }
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/ws", get(ws_handler))
            .with_state(self.feed.clone())
    }

    /// Bind `addr` and serve until `shutdown` resolves.
    pub async fn start<F>(&self, addr: &str, shutdown: F) -> Result<(), WebSocketError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| WebSocketError::Bind {
                addr: addr.to_string(),
                reason: e.to_string(),
            })?;
        self.serve(listener, shutdown).await
    }

    pub async fn serve<F>(&self, listener: TcpListener, shutdown: F) -> Result<(), WebSocketError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener
            .local_addr()
            .map_err(|e| WebSocketError::Serve(e.to_string()))?;
        info!(%addr, "WebSocket server listening");
        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| WebSocketError::Serve(e.to_string()))
    }
}

async fn ws_handler(ws: WebSocketUpgrade, State(feed): State<StatusFeed>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, feed))
}

async fn handle_socket(socket: WebSocket, feed: StatusFeed) {
    let (ws_sender, mut ws_receiver) = socket.split();
    let ws_sender: Sender = Arc::new(Mutex::new(ws_sender));
    let mut forwarder: Option<JoinHandle<()>> = None;

    debug!("WebSocket client connected");

    while let Some(msg_result) = ws_receiver.next().await {
        let msg = match msg_result {
            Ok(msg) => msg,
            Err(e) => {
                warn!(error = %e, "WebSocket receive error");
                break;
            }
        };

        match msg {
            Message::Text(text) => {
                handle_text_message(&text, &feed, &mut forwarder, &ws_sender).await;
            }
            Message::Close(_) => break,
            Message::Ping(data) => {
                let _ = ws_sender.lock().await.send(Message::Pong(data)).await;
            }
            _ => {}
        }
    }

    if let Some(handle) = forwarder.take() {
        handle.abort();
    }
    debug!("WebSocket client disconnected");
}

async fn handle_text_message(
    text: &str,
    feed: &StatusFeed,
    forwarder: &mut Option<JoinHandle<()>>,
    ws_sender: &Sender,
) {
    let client_msg: ClientMessage = match serde_json::from_str(text) {
        Ok(msg) => msg,
        Err(e) => {
            let error = ServerMessage::Error {
                message: format!("Invalid message: {e}"),
            };
            send_message(ws_sender, &error).await;
            return;
        }
    };

    match client_msg {
        ClientMessage::Subscribe { filter } => {
            if let Some(handle) = forwarder.take() {
                handle.abort();
            }
            // Subscribe before acking so no change after the ack is missed.
            let rx = feed.subscribe();
            let sender = ws_sender.clone();
            *forwarder = Some(tokio::spawn(forward_changes(rx, sender, filter)));

            let ack = ServerMessage::Ack {
                action: "subscribe".to_string(),
            };
            send_message(ws_sender, &ack).await;
            debug!("client subscribed to status changes");
        }
        ClientMessage::Unsubscribe => {
            let reply = match forwarder.take() {
                Some(handle) => {
                    handle.abort();
                    ServerMessage::Ack {
                        action: "unsubscribe".to_string(),
                    }
                }
                None => ServerMessage::Error {
                    message: "Not subscribed".to_string(),
                },
            };
            send_message(ws_sender, &reply).await;
        }
        ClientMessage::Ping => {
            send_message(ws_sender, &ServerMessage::Pong).await;
        }
    }
}

/// Returns false once the client is gone.
async fn send_message(ws_sender: &Sender, message: &ServerMessage) -> bool {
    let text = match serde_json::to_string(message) {
        Ok(text) => text,
        Err(e) => {
            warn!(error = %e, "failed to encode WebSocket message");
            return true;
        }
    };
    ws_sender.lock().await.send(Message::Text(text)).await.is_ok()
}

async fn forward_changes(
    mut rx: broadcast::Receiver<StatusChange>,
    ws_sender: Sender,
    filter: SubscriptionFilter,
) {
    loop {
        match rx.recv().await {
            Ok(change) => {
                if !filter.matches(&change) {
                    continue;
                }
                if !send_message(&ws_sender, &ServerMessage::StatusChange(change)).await {
                    break;
                }
            }
            Err(broadcast::error::RecvError::Lagged(n)) => {
                warn!(skipped = n, "WebSocket client lagged behind status feed");
            }
            Err(broadcast::error::RecvError::Closed) => {
                debug!("status feed closed");
                break;
            }
        }
    }
}
