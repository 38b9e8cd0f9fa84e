//! Wordtiles Game Server
//!
//! Runs rounds for rooms of players: deals tiles from a shared bag, scores
//! boards against a dictionary and reports standings.
//!
//! ## Protocol
//!
//! Messages are JSON tagged by `type` (see `wordtiles_core::protocol`):
//! ```json
//! { "type": "join_game", "name": "ana", "room": "lobby" }
//! { "type": "round_ready" }
//! { "type": "add_tile", "round": 1 }
//! { "type": "verify", "round": 1, "revision": 12, "board": [[null, "C"], ["A", null]] }
//! ```

mod bag;
mod config;
mod dictionary;
mod error;
mod room;
mod scoring;

use axum::{
    Router,
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
    routing::get,
};
use config::{DEFAULT_ROOM, ServerConfig};
use dashmap::DashMap;
use dictionary::Dictionary;
use error::ServerResult;
use futures_util::{SinkExt, StreamExt, stream::SplitSink};
use room::{Audience, Delivery, PlayerId, Room, Submission};
use std::sync::Arc;
use tokio::sync::broadcast;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{debug, error, info, warn};
use uuid::Uuid;
use wordtiles_core::{ClientMessage, ServerMessage};

const CHANNEL_CAPACITY: usize = 256;

type RoomEvent = (Audience, ServerMessage);

/// A room and the channel its players listen on.
struct RoomEntry {
    room: Room,
    tx: broadcast::Sender<RoomEvent>,
}

impl RoomEntry {
    fn publish(&self, deliveries: Vec<Delivery>) {
        for d in deliveries {
            // no receivers only means nobody is listening yet
            let _ = self.tx.send((d.to, d.message));
        }
    }
}

/// Shared application state
struct AppState {
    rooms: DashMap<String, RoomEntry>,
    dictionary: Arc<Dictionary>,
    starting_tiles: usize,
}

impl AppState {
    fn new(dictionary: Dictionary, starting_tiles: usize) -> Self {
        Self {
            rooms: DashMap::new(),
            dictionary: Arc::new(dictionary),
            starting_tiles,
        }
    }

    /// Add a player to a room, creating it on first use.
    fn join_room(&self, room_name: &str, player: PlayerId, name: &str) -> broadcast::Receiver<RoomEvent> {
        let mut entry = self.rooms.entry(room_name.to_string()).or_insert_with(|| {
            info!("Creating room {}", room_name);
            let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
            RoomEntry {
                room: Room::new(room_name, self.dictionary.clone(), self.starting_tiles),
                tx,
            }
        });
        let rx = entry.tx.subscribe();
        let deliveries = entry.room.join(player, name);
        entry.publish(deliveries);
        rx
    }

    /// Apply `f` to a room and publish what it produces. A room left empty
    /// is dropped.
    fn with_room(&self, room_name: &str, f: impl FnOnce(&mut Room) -> Vec<Delivery>) {
        let Some(mut entry) = self.rooms.get_mut(room_name) else {
            return;
        };
        let deliveries = f(&mut entry.room);
        entry.publish(deliveries);
        debug!("Room {} is {:?}", room_name, entry.room.state());
        drop(entry);
        if self.rooms.remove_if(room_name, |_, e| e.room.is_empty()).is_some() {
            info!("Room {} closed", room_name);
        }
    }

    /// Run a client message through its room.
    ///
    /// Boards are scored on the blocking pool with the room unlocked.
    async fn dispatch(&self, room_name: &str, player: PlayerId, msg: ClientMessage) {
        let submission = match Submission::from_message(player, msg) {
            Ok(submission) => submission,
            Err(msg) => {
                self.with_room(room_name, |room| room.handle(player, msg, &mut rand::thread_rng()));
                return;
            }
        };

        let prepared = match self.rooms.get(room_name) {
            Some(entry) => entry.room.prepare_score(submission),
            None => return,
        };
        let job = match prepared {
            Ok(job) => job,
            Err(rejection) => {
                self.with_room(room_name, |_| vec![rejection]);
                return;
            }
        };

        match tokio::task::spawn_blocking(move || job.run()).await {
            Ok(scored) => self.with_room(room_name, |room| room.apply_score(scored)),
            Err(e) => error!("Scoring in room {} failed: {}", room_name, e),
        }
    }

    fn leave_room(&self, room_name: &str, player: PlayerId) {
        self.with_room(room_name, |room| room.leave(player));
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wordtiles_server=info,tower_http=info".into()),
        )
        .init();

    if let Err(e) = run().await {
        error!("Server failed: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> ServerResult<()> {
    let config = ServerConfig::from_env()?;
    let dictionary = Dictionary::load(&config.dictionary)?;
    let state = Arc::new(AppState::new(dictionary, config.starting_tiles));

    let app = Router::new()
        .route("/", get(index))
        .route("/ws", get(ws_handler))
        .route("/health", get(health))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    info!("Wordtiles server listening on {}", config.addr);
    info!("WebSocket endpoint: ws://{}/ws", config.addr);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// Index page
async fn index() -> &'static str {
    "Wordtiles Server - Connect via WebSocket at /ws"
}

/// Health check
async fn health() -> &'static str {
    "ok"
}

/// WebSocket upgrade handler
async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Send one message; false when the socket is gone.
async fn send_message(sender: &mut SplitSink<WebSocket, Message>, msg: &ServerMessage) -> bool {
    match msg.to_json() {
        Ok(json) => sender.send(Message::Text(json.into())).await.is_ok(),
        Err(e) => {
            warn!("Could not encode {:?}: {}", msg, e);
            true
        }
    }
}

/// Handle a WebSocket connection
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let player_id = Uuid::new_v4();
    info!("New connection: {}", player_id);

    let (mut sender, mut receiver) = socket.split();
    let mut current_room: Option<String> = None;
    let mut room_rx: Option<broadcast::Receiver<RoomEvent>> = None;

    loop {
        tokio::select! {
            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let client_msg = match ClientMessage::from_json(text.as_str()) {
                            Ok(m) => m,
                            Err(e) => {
                                warn!("Invalid message from {}: {}", player_id, e);
                                let err = ServerMessage::Error { message: format!("Invalid message: {}", e) };
                                if !send_message(&mut sender, &err).await {
                                    break;
                                }
                                continue;
                            }
                        };
                        match client_msg {
                            ClientMessage::JoinGame { name, room } => {
                                if let Some(old) = current_room.take() {
                                    state.leave_room(&old, player_id);
                                }
                                let room = room.unwrap_or_else(|| DEFAULT_ROOM.to_string());
                                room_rx = Some(state.join_room(&room, player_id, &name));
                                current_room = Some(room);
                            }
                            ClientMessage::Exit => {
                                if let Some(old) = current_room.take() {
                                    state.leave_room(&old, player_id);
                                }
                                room_rx = None;
                            }
                            other => match &current_room {
                                Some(room) => state.dispatch(room, player_id, other).await,
                                None => {
                                    let err = ServerMessage::Error { message: "Join a game first".to_string() };
                                    if !send_message(&mut sender, &err).await {
                                        break;
                                    }
                                }
                            },
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        warn!("WebSocket error for {}: {}", player_id, e);
                        break;
                    }
                }
            }

            event = async {
                match &mut room_rx {
                    Some(rx) => rx.recv().await,
                    None => std::future::pending::<Result<RoomEvent, broadcast::error::RecvError>>().await,
                }
            } => {
                match event {
                    Ok((audience, server_msg)) => {
                        if audience.includes(player_id) && !send_message(&mut sender, &server_msg).await {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!("Connection {} lagged, {} messages dropped", player_id, n);
                    }
                    Err(broadcast::error::RecvError::Closed) => room_rx = None,
                }
            }
        }
    }

    if let Some(room) = current_room {
        state.leave_room(&room, player_id);
    }
    info!("Connection closed: {}", player_id);
}
