// Store client over the realtime store's WebSocket protocol.
//
// One background task owns the socket. Handles talk to it over a command channel; push
// replies are matched back to their caller by request id and subscription values are fanned
// out through one watch channel per path.

use crate::domain::{ChangeFeed, RemoteStateStore, StoreError};
use crate::frameworks::config;
use crate::interface_adapters::feed::watch_feed;
use crate::use_cases::throttle::LogThrottle;

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use realtime_store::{ClientMessage, ServerMessage, StorePath};
use serde_json::Value;
use std::collections::HashMap;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot, watch};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, tungstenite::Message};
use tracing::{Instrument, debug, info, info_span, warn};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

enum Command {
    Send(ClientMessage),
    Push {
        path: String,
        value: Value,
        reply: oneshot::Sender<Result<String, StoreError>>,
    },
    Subscribe {
        path: String,
        reply: oneshot::Sender<watch::Receiver<Option<Value>>>,
    },
}

enum LoopControl {
    Continue,
    Disconnect,
}

#[derive(Clone)]
pub struct WsStore {
    cmd_tx: mpsc::Sender<Command>,
}

impl WsStore {
    /// Opens the socket and starts the connection task. Handles fail with `Disconnected` once
    /// the connection is gone.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let (socket, _) = tokio_tungstenite::connect_async(url)
            .await
            .map_err(|e| {
                warn!(%url, error = %e, "failed to connect to store");
                StoreError::Disconnected
            })?;
        info!(%url, "connected to store");

        let (cmd_tx, cmd_rx) = mpsc::channel(config::COMMAND_CHANNEL_CAPACITY);
        tokio::spawn(connection_task(socket, cmd_rx).instrument(info_span!("store_conn", %url)));
        Ok(Self { cmd_tx })
    }

    async fn command(&self, command: Command) -> Result<(), StoreError> {
        self.cmd_tx
            .send(command)
            .await
            .map_err(|_| StoreError::Disconnected)
    }
}

// Rejects bad paths before they reach the wire; the server would only answer with an
// uncorrelated error.
fn validate(path: &str) -> Result<(), StoreError> {
    StorePath::parse(path)?;
    Ok(())
}

#[async_trait]
impl RemoteStateStore for WsStore {
    async fn set(&self, path: &str, value: Value) -> Result<(), StoreError> {
        validate(path)?;
        self.command(Command::Send(ClientMessage::Set {
            path: path.to_string(),
            value,
        }))
        .await
    }

    async fn push(&self, path: &str, value: Value) -> Result<String, StoreError> {
        validate(path)?;
        let (reply, rx) = oneshot::channel();
        self.command(Command::Push {
            path: path.to_string(),
            value,
            reply,
        })
        .await?;
        rx.await.map_err(|_| StoreError::Disconnected)?
    }

    async fn remove(&self, path: &str) -> Result<(), StoreError> {
        validate(path)?;
        self.command(Command::Send(ClientMessage::Remove {
            path: path.to_string(),
        }))
        .await
    }

    async fn subscribe(&self, path: &str) -> Result<ChangeFeed, StoreError> {
        validate(path)?;
        let (reply, rx) = oneshot::channel();
        self.command(Command::Subscribe {
            path: path.to_string(),
            reply,
        })
        .await?;
        let values = rx.await.map_err(|_| StoreError::Disconnected)?;
        Ok(watch_feed(path.to_string(), values, |v| v.clone()))
    }
}

struct ConnState {
    next_request_id: u64,
    pending: HashMap<u64, oneshot::Sender<Result<String, StoreError>>>,
    // `None` until the server delivers the first value for the path.
    watchers: HashMap<String, watch::Sender<Option<Value>>>,
    error_log: LogThrottle,
}

impl ConnState {
    fn new() -> Self {
        Self {
            next_request_id: 1,
            pending: HashMap::new(),
            watchers: HashMap::new(),
            error_log: LogThrottle::default(),
        }
    }
}

async fn connection_task(mut socket: Socket, mut cmd_rx: mpsc::Receiver<Command>) {
    let mut state = ConnState::new();

    loop {
        let control = tokio::select! {
            command = cmd_rx.recv() => match command {
                Some(command) => handle_command(&mut socket, command, &mut state).await,
                None => {
                    debug!("all store handles dropped");
                    LoopControl::Disconnect
                }
            },

            frame = socket.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    match serde_json::from_str::<ServerMessage>(text.as_str()) {
                        Ok(msg) => handle_server_message(msg, &mut state),
                        Err(e) => warn!(error = %e, "failed to parse store message"),
                    }
                    LoopControl::Continue
                }
                Some(Ok(Message::Close(frame))) => {
                    info!(?frame, "store closed the connection");
                    LoopControl::Disconnect
                }
                Some(Ok(_)) => LoopControl::Continue,
                Some(Err(e)) => {
                    warn!(error = %e, "store socket error");
                    LoopControl::Disconnect
                }
                None => LoopControl::Disconnect,
            },
        };

        if matches!(control, LoopControl::Disconnect) {
            break;
        }
    }

    let _ = socket.close(None).await;
    for (_, reply) in state.pending.drain() {
        let _ = reply.send(Err(StoreError::Disconnected));
    }
    // Dropping the watch senders ends every open change feed.
    info!(subscriptions = state.watchers.len(), "store connection closed");
}

async fn handle_command(
    socket: &mut Socket,
    command: Command,
    state: &mut ConnState,
) -> LoopControl {
    let msg = match command {
        Command::Send(msg) => msg,
        Command::Push { path, value, reply } => {
            let request_id = state.next_request_id;
            state.next_request_id += 1;
            state.pending.insert(request_id, reply);
            ClientMessage::Push {
                request_id,
                path,
                value,
            }
        }
        Command::Subscribe { path, reply } => {
            if let Some(tx) = state.watchers.get(&path) {
                // Joining an existing subscription: hand out the latest value straight away.
                let mut rx = tx.subscribe();
                rx.mark_changed();
                let _ = reply.send(rx);
                return LoopControl::Continue;
            }
            let (tx, rx) = watch::channel(None);
            state.watchers.insert(path.clone(), tx);
            let _ = reply.send(rx);
            ClientMessage::Subscribe { path }
        }
    };

    match send_message(socket, &msg).await {
        Ok(()) => LoopControl::Continue,
        Err(e) => {
            warn!(error = %e, "failed to send store request");
            LoopControl::Disconnect
        }
    }
}

async fn send_message(socket: &mut Socket, msg: &ClientMessage) -> Result<(), StoreError> {
    let text = serde_json::to_string(msg)?;
    socket
        .send(Message::Text(text.into()))
        .await
        .map_err(|_| StoreError::Disconnected)
}

fn handle_server_message(msg: ServerMessage, state: &mut ConnState) {
    match msg {
        ServerMessage::Value { path, value } => match state.watchers.get(&path) {
            Some(tx) => {
                tx.send_replace(Some(value));
            }
            None => debug!(%path, "value for unknown subscription ignored"),
        },
        ServerMessage::Pushed { request_id, key } => match state.pending.remove(&request_id) {
            Some(reply) => {
                let _ = reply.send(Ok(key));
            }
            None => debug!(request_id, "push reply without a waiter"),
        },
        ServerMessage::Error {
            request_id: Some(request_id),
            message,
        } => {
            if let Some(reply) = state.pending.remove(&request_id) {
                let _ = reply.send(Err(StoreError::Rejected(message)));
            }
        }
        ServerMessage::Error {
            request_id: None,
            message,
        } => {
            if state.error_log.should_log() {
                warn!(%message, "store rejected a request");
            }
        }
    }
}
