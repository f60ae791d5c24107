use crate::domain::keys::rand_id;
use crate::domain::StorePath;
use crate::frameworks::config;
use crate::interface_adapters::protocol::{ClientMessage, ServerMessage};
use crate::interface_adapters::state::AppState;
use crate::use_cases::StoreHub;

use axum::{
    Error,
    extract::{
        State,
        ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade, close_code},
    },
    response::IntoResponse,
};
use futures_util::SinkExt;
use serde_json::Value;
use std::{
    collections::HashSet,
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinSet;
use tracing::{Instrument, debug, info, info_span, warn};

#[derive(Debug)]
enum NetError {
    // Categorizes connection lifecycle failures so callers can decide policy.
    #[allow(dead_code)]
    Ws(axum::Error),
    #[allow(dead_code)]
    Serialization(serde_json::Error),
}

impl From<axum::Error> for NetError {
    fn from(e: axum::Error) -> Self {
        NetError::Ws(e)
    }
}

enum LoopControl {
    Continue,
    Disconnect,
}

const LOG_THROTTLE: Duration = Duration::from_secs(2);

fn should_log(last: &mut Instant) -> bool {
    if last.elapsed() >= LOG_THROTTLE {
        *last = Instant::now();
        true
    } else {
        false
    }
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let hub = state.hub.clone();
    ws.on_upgrade(move |socket| handle_socket(socket, hub))
}

async fn handle_socket(socket: WebSocket, hub: Arc<StoreHub>) {
    // Connection id for correlating logs; store clients are anonymous.
    let conn_id = rand_id();
    serve_connection(socket, hub)
        .instrument(info_span!("conn", conn_id))
        .await;
}

async fn serve_connection(mut socket: WebSocket, hub: Arc<StoreHub>) {
    info!("client connected");

    let mut ctx = ConnCtx::new(hub);
    if let Err(e) = run_client_loop(&mut socket, &mut ctx).await {
        warn!(error = ?e, "client loop exited with error");
    }

    debug!(
        msgs_in = ctx.msgs_in,
        msgs_out = ctx.msgs_out,
        bytes_in = ctx.bytes_in,
        bytes_out = ctx.bytes_out,
        invalid_json = ctx.invalid_json,
        subscriptions = ctx.subscribed.len(),
        "connection stats"
    );
    info!("client disconnected");
}

struct ConnCtx {
    hub: Arc<StoreHub>,
    // Subscription forwarders feed this channel; the client loop writes it to the socket.
    out_tx: mpsc::Sender<ServerMessage>,
    out_rx: mpsc::Receiver<ServerMessage>,
    // Dropping the set aborts every forwarder when the connection ends.
    forwarders: JoinSet<()>,
    subscribed: HashSet<String>,

    msgs_in: u64,
    msgs_out: u64,
    bytes_in: u64,
    bytes_out: u64,

    invalid_json: u32,
    last_invalid_log: Instant,

    close_frame: Option<CloseFrame>,
}

impl ConnCtx {
    fn new(hub: Arc<StoreHub>) -> Self {
        let (out_tx, out_rx) = mpsc::channel(config::OUTBOUND_CHANNEL_CAPACITY);
        Self {
            hub,
            out_tx,
            out_rx,
            forwarders: JoinSet::new(),
            subscribed: HashSet::new(),
            msgs_in: 0,
            msgs_out: 0,
            bytes_in: 0,
            bytes_out: 0,
            invalid_json: 0,
            last_invalid_log: Instant::now() - LOG_THROTTLE,
            close_frame: None,
        }
    }
}

async fn send_message(socket: &mut WebSocket, msg: &ServerMessage) -> Result<usize, NetError> {
    let txt = serde_json::to_string(msg).map_err(NetError::Serialization)?;
    let bytes = txt.len();
    socket
        .send(Message::Text(txt.into()))
        .await
        .map_err(NetError::Ws)?;
    Ok(bytes)
}

async fn run_client_loop(socket: &mut WebSocket, ctx: &mut ConnCtx) -> Result<(), NetError> {
    loop {
        let disconnect = tokio::select! {
            // Incoming request from the client.
            incoming = socket.recv() => {
                matches!(handle_incoming_ws(socket, incoming, ctx).await?, LoopControl::Disconnect)
            }

            // Outgoing subscription value.
            Some(msg) = ctx.out_rx.recv() => {
                match send_message(socket, &msg).await {
                    Ok(bytes) => {
                        ctx.msgs_out += 1;
                        ctx.bytes_out += bytes as u64;
                        false
                    }
                    Err(err) => {
                        // Disconnect follows immediately; the peer is most likely gone.
                        warn!(error = ?err, "failed to send subscription value");
                        true
                    }
                }
            }
        };

        if disconnect {
            if let Some(frame) = ctx.close_frame.take() {
                let _ = socket.send(Message::Close(Some(frame))).await;
            }
            if let Err(err) = socket.close().await.map_err(NetError::Ws) {
                debug!(error = ?err, "socket close error");
            }
            return Ok(());
        }
    }
}

async fn handle_incoming_ws(
    socket: &mut WebSocket,
    incoming: Option<Result<Message, Error>>,
    ctx: &mut ConnCtx,
) -> Result<LoopControl, NetError> {
    match incoming {
        Some(Ok(Message::Text(text))) => {
            ctx.msgs_in += 1;
            ctx.bytes_in += text.len() as u64;

            match serde_json::from_str::<ClientMessage>(text.as_str()) {
                Ok(msg) => apply_client_message(socket, msg, ctx).await,
                Err(parse_err) => {
                    ctx.invalid_json += 1;
                    if should_log(&mut ctx.last_invalid_log) {
                        warn!(
                            bytes = text.len(),
                            error = %parse_err,
                            "failed to parse client message"
                        );
                    }

                    if ctx.invalid_json > config::MAX_INVALID_JSON {
                        ctx.close_frame = Some(CloseFrame {
                            code: close_code::POLICY,
                            reason: "too many invalid messages".into(),
                        });
                        return Ok(LoopControl::Disconnect);
                    }

                    let reply = ServerMessage::Error {
                        request_id: None,
                        message: "malformed message".to_string(),
                    };
                    send_reply(socket, &reply, ctx).await
                }
            }
        }
        Some(Ok(Message::Binary(_))) => {
            ctx.close_frame = Some(CloseFrame {
                code: close_code::UNSUPPORTED,
                reason: "binary messages not supported".into(),
            });
            Ok(LoopControl::Disconnect)
        }
        Some(Ok(Message::Ping(_) | Message::Pong(_))) => Ok(LoopControl::Continue),
        Some(Ok(Message::Close(_))) => Ok(LoopControl::Disconnect),
        Some(Err(e)) => {
            warn!(error = %e, "websocket recv error");
            Ok(LoopControl::Disconnect)
        }
        None => {
            info!("websocket closed");
            Ok(LoopControl::Disconnect)
        }
    }
}

async fn apply_client_message(
    socket: &mut WebSocket,
    msg: ClientMessage,
    ctx: &mut ConnCtx,
) -> Result<LoopControl, NetError> {
    let reply = match msg {
        ClientMessage::Set { path, value } => ctx.hub.set(&path, value).err().map(|e| {
            ServerMessage::Error {
                request_id: None,
                message: e.to_string(),
            }
        }),
        ClientMessage::Push {
            request_id,
            path,
            value,
        } => Some(match ctx.hub.push(&path, value) {
            Ok(key) => ServerMessage::Pushed { request_id, key },
            Err(e) => ServerMessage::Error {
                request_id: Some(request_id),
                message: e.to_string(),
            },
        }),
        ClientMessage::Remove { path } => match ctx.hub.remove(&path) {
            Ok(removed) => {
                debug!(%path, removed, "remove applied");
                None
            }
            Err(e) => Some(ServerMessage::Error {
                request_id: None,
                message: e.to_string(),
            }),
        },
        ClientMessage::Subscribe { path } => subscribe(path, ctx),
    };

    match reply {
        Some(reply) => send_reply(socket, &reply, ctx).await,
        None => Ok(LoopControl::Continue),
    }
}

// Starts a forwarder for `path` unless this connection already has one.
fn subscribe(path: String, ctx: &mut ConnCtx) -> Option<ServerMessage> {
    if ctx.subscribed.contains(&path) {
        debug!(%path, "duplicate subscription ignored");
        return None;
    }

    match ctx.hub.subscribe(&path) {
        Ok(rx) => {
            info!(path = %display_path(&path), "subscription started");
            ctx.subscribed.insert(path.clone());
            ctx.forwarders
                .spawn(forward_path(path, rx, ctx.out_tx.clone()));
            None
        }
        Err(e) => Some(ServerMessage::Error {
            request_id: None,
            message: e.to_string(),
        }),
    }
}

fn display_path(raw: &str) -> String {
    StorePath::parse(raw)
        .map(|p| p.to_string())
        .unwrap_or_else(|_| raw.to_string())
}

async fn forward_path(
    path: String,
    mut rx: watch::Receiver<Value>,
    out_tx: mpsc::Sender<ServerMessage>,
) {
    // The hub keeps the sender alive while anyone is subscribed, so this only ends when the
    // connection drops its receiver side.
    while rx.changed().await.is_ok() {
        let value = rx.borrow_and_update().clone();
        let msg = ServerMessage::Value {
            path: path.clone(),
            value,
        };
        if out_tx.send(msg).await.is_err() {
            break;
        }
    }
}

async fn send_reply(
    socket: &mut WebSocket,
    reply: &ServerMessage,
    ctx: &mut ConnCtx,
) -> Result<LoopControl, NetError> {
    match send_message(socket, reply).await {
        Ok(bytes) => {
            ctx.msgs_out += 1;
            ctx.bytes_out += bytes as u64;
            Ok(LoopControl::Continue)
        }
        Err(err) => {
            warn!(error = ?err, "failed to send reply");
            Ok(LoopControl::Disconnect)
        }
    }
}
