//! WebSocket server and connection handling.

use crate::config::ServerConfig;
use crate::protocol::{ClientMessage, ServerMessage};
use crate::session::{finish_reason, GameSession, SessionError};
use dashmap::DashMap;
use futures_util::{SinkExt, StreamExt};
use hexclaim_core::GameEvent;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::{accept_async, tungstenite::Message};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Server state shared across all connections.
pub struct ServerState {
    pub config: ServerConfig,
    /// One game per connection
    pub sessions: DashMap<Uuid, GameSession>,
    /// Mapping from session ID to its message sender
    pub senders: DashMap<Uuid, mpsc::UnboundedSender<ServerMessage>>,
    /// Deferred enemy turns waiting for their pacing delay
    pub pending_enemy: DashMap<Uuid, PendingEnemyTurn>,
    sessions_created: AtomicU64,
    enemy_turns_scheduled: AtomicU64,
}

/// A scheduled enemy reply. `token` tells reschedules of one session apart.
pub struct PendingEnemyTurn {
    pub token: u64,
    handle: JoinHandle<()>,
}

impl ServerState {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            sessions: DashMap::new(),
            senders: DashMap::new(),
            pending_enemy: DashMap::new(),
            sessions_created: AtomicU64::new(0),
            enemy_turns_scheduled: AtomicU64::new(0),
        }
    }

    /// Create and register a session
    pub fn open_session(&self, session_id: Uuid) -> Result<(), SessionError> {
        let n = self.sessions_created.fetch_add(1, Ordering::Relaxed);
        let session = GameSession::new(self.config.catalog.clone(), self.config.engine_config(n))?;
        debug!(%session_id, n, "Session opened");
        self.sessions.insert(session_id, session);
        Ok(())
    }

    /// Drop a session and anything still scheduled for it
    pub fn close_session(&self, session_id: Uuid) {
        self.cancel_enemy_turn(session_id);
        self.sessions.remove(&session_id);
        self.senders.remove(&session_id);
    }

    /// Send a message to a specific session.
    pub fn send(&self, session_id: Uuid, msg: ServerMessage) {
        if let Some(sender) = self.senders.get(&session_id) {
            let _ = sender.send(msg);
        }
    }

    pub fn cancel_enemy_turn(&self, session_id: Uuid) {
        if let Some((_, pending)) = self.pending_enemy.remove(&session_id) {
            pending.handle.abort();
        }
    }

    /// Forget the pending enemy turn of `session_id`, but only if it is
    /// still the one scheduled under `token`.
    fn finish_enemy_turn(&self, session_id: Uuid, token: u64) -> bool {
        self.pending_enemy
            .remove_if(&session_id, |_, pending| pending.token == token)
            .is_some()
    }

    /// Send events, the new state and a game-over notice if the level ended
    fn publish(&self, session_id: Uuid, events: Vec<GameEvent>) {
        let finished = finish_reason(&events);
        let snapshot = match self.sessions.get(&session_id) {
            Some(session) => {
                debug!(%session_id, count = events.len(), phase = ?session.phase(), "Publishing events");
                session.snapshot()
            }
            None => return,
        };

        self.send(session_id, ServerMessage::Events { events });
        self.send(session_id, ServerMessage::GameState { state: snapshot });
        if let Some((outcome, reason)) = finished {
            info!(%session_id, ?outcome, ?reason, "Level finished");
            self.send(session_id, ServerMessage::GameOver { outcome, reason });
        }
    }
}

/// Run the WebSocket server.
pub async fn run_server(addr: SocketAddr, state: Arc<ServerState>) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("Hexclaim server listening on {}", addr);

    while let Ok((stream, peer_addr)) = listener.accept().await {
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, peer_addr, state).await {
                error!("Connection error from {}: {}", peer_addr, e);
            }
        });
    }

    Ok(())
}

/// Handle a single WebSocket connection.
async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    state: Arc<ServerState>,
) -> anyhow::Result<()> {
    let ws_stream = accept_async(stream).await?;
    info!("New WebSocket connection from {}", addr);

    let (mut ws_sender, mut ws_receiver) = ws_stream.split();

    let session_id = Uuid::new_v4();
    state.open_session(session_id)?;

    // Create channel for outgoing messages
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();
    state.senders.insert(session_id, tx);

    let welcome = ServerMessage::Welcome { session_id };
    let msg_text = serde_json::to_string(&welcome)?;
    ws_sender.send(Message::Text(msg_text)).await?;

    if let Some(session) = state.sessions.get(&session_id) {
        state.send(
            session_id,
            ServerMessage::LevelStarted {
                state: session.snapshot(),
            },
        );
    }

    // Spawn task to forward messages from channel to WebSocket
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if let Ok(text) = serde_json::to_string(&msg) {
                if ws_sender.send(Message::Text(text)).await.is_err() {
                    break;
                }
            }
        }
    });

    // Handle incoming messages
    while let Some(msg) = ws_receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientMessage>(&text) {
                Ok(client_msg) => handle_message(session_id, client_msg, &state),
                Err(e) => {
                    warn!("Invalid message from {}: {}", session_id, text);
                    state.send(
                        session_id,
                        ServerMessage::Error {
                            message: format!("Invalid message: {}", e),
                        },
                    );
                }
            },
            Ok(Message::Close(_)) => {
                info!("Client {} closing connection", session_id);
                break;
            }
            Ok(Message::Ping(_)) => {
                state.send(session_id, ServerMessage::Pong);
            }
            Err(e) => {
                error!("WebSocket error from {}: {}", session_id, e);
                break;
            }
            _ => {}
        }
    }

    state.close_session(session_id);
    send_task.abort();

    info!("Connection closed for {}", session_id);
    Ok(())
}

/// Handle a client message.
pub(crate) fn handle_message(session_id: Uuid, msg: ClientMessage, state: &Arc<ServerState>) {
    match msg {
        ClientMessage::StartLevel { level_index } => {
            // Whatever the enemy was about to do belongs to the old level
            state.cancel_enemy_turn(session_id);

            let Some(mut session) = state.sessions.get_mut(&session_id) else {
                return;
            };
            match session.start_level(level_index) {
                Ok(events) => {
                    let snapshot = session.snapshot();
                    drop(session);
                    state.send(session_id, ServerMessage::Events { events });
                    state.send(session_id, ServerMessage::LevelStarted { state: snapshot });
                }
                Err(e) => {
                    drop(session);
                    state.send(
                        session_id,
                        ServerMessage::Error {
                            message: e.to_string(),
                        },
                    );
                }
            }
        }

        ClientMessage::MovePlayer { q, r } => {
            let Some(mut session) = state.sessions.get_mut(&session_id) else {
                return;
            };
            let result = session.move_player(q, r);
            drop(session); // Release lock before sending

            match result {
                Ok(result) => {
                    state.publish(session_id, result.events);
                    if let Some(epoch) = result.enemy_due {
                        schedule_enemy_turn(state, session_id, epoch);
                    }
                }
                Err(SessionError::Rejected(reason)) => {
                    debug!(%session_id, q, r, %reason, "Move rejected");
                    state.send(
                        session_id,
                        ServerMessage::MoveRejected {
                            reason,
                            message: reason.to_string(),
                        },
                    );
                }
                Err(e) => {
                    state.send(
                        session_id,
                        ServerMessage::Error {
                            message: e.to_string(),
                        },
                    );
                }
            }
        }

        ClientMessage::GetState => {
            let snapshot = state.sessions.get(&session_id).map(|s| s.snapshot());
            if let Some(snapshot) = snapshot {
                state.send(session_id, ServerMessage::GameState { state: snapshot });
            }
        }

        ClientMessage::ListLevels => {
            let levels = state.sessions.get(&session_id).map(|s| s.levels());
            if let Some(levels) = levels {
                state.send(session_id, ServerMessage::LevelList { levels });
            }
        }

        ClientMessage::Ping => {
            state.send(session_id, ServerMessage::Pong);
        }
    }
}

/// Run the enemy's reply after the pacing delay.
///
/// A `StartLevel` aborts the task; if it fires anyway, the session checks the
/// epoch and the callback does nothing. A newer schedule replaces the map
/// entry, and the older task leaves that entry alone.
fn schedule_enemy_turn(state: &Arc<ServerState>, session_id: Uuid, epoch: u64) -> u64 {
    let delay = state.config.enemy_delay;
    let token = state.enemy_turns_scheduled.fetch_add(1, Ordering::Relaxed);
    let task_state = Arc::clone(state);

    let handle = tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        task_state.finish_enemy_turn(session_id, token);

        let events = match task_state.sessions.get_mut(&session_id) {
            Some(mut session) => session.run_enemy_turns(epoch),
            None => return,
        };
        if events.is_empty() {
            debug!(%session_id, epoch, "Deferred enemy turn was stale");
            return;
        }
        task_state.publish(session_id, events);
    });

    let pending = PendingEnemyTurn { token, handle };
    if let Some(previous) = state.pending_enemy.insert(session_id, pending) {
        previous.handle.abort();
    }
    token
}
