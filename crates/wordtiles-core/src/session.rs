//! Client side of a game: applies server messages to the local engine and
//! queues requests for the transport.

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::game::Game;
use crate::protocol::{ClientMessage, ServerMessage, Standing, Verdict};
use crate::tile::TileId;

/// What a handled server message meant for the player.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Joined { player_id: String },
    RoomChanged { name: String, players: Vec<String> },
    /// Another player asked to start a round.
    RoundRequested,
    RoundStarted { round: u64, tiles: usize },
    TileAdded(TileId),
    OutOfTiles,
    /// A verification result. `current` is false when the board changed
    /// after the request and the markers were not applied.
    Verified { verdict: Verdict, current: bool },
    /// The server asked for the final board; the reply is queued.
    BoardRequested,
    RoundOver { standings: Vec<Standing> },
    ServerError { message: String },
}

/// A player's engine plus the outgoing request queue.
#[derive(Debug, Clone)]
pub struct Session {
    name: String,
    game: Game,
    player_id: Option<String>,
    round: Option<u64>,
    last_verdict: Option<Verdict>,
    outgoing: Vec<ClientMessage>,
}

impl Session {
    /// Session for player `name` with no round yet.
    pub fn new(name: impl Into<String>, config: EngineConfig) -> Self {
        Self {
            name: name.into(),
            game: Game::new(config),
            player_id: None,
            round: None,
            last_verdict: None,
            outgoing: Vec::new(),
        }
    }

    /// Player name sent when joining.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The local engine.
    pub fn game(&self) -> &Game {
        &self.game
    }

    /// Mutable access for local moves.
    pub fn game_mut(&mut self) -> &mut Game {
        &mut self.game
    }

    /// Id assigned by the server on join.
    pub fn player_id(&self) -> Option<&str> {
        self.player_id.as_deref()
    }

    /// Current round, if one has started.
    pub fn round(&self) -> Option<u64> {
        self.round
    }

    /// Most recent verification result.
    pub fn last_verdict(&self) -> Option<&Verdict> {
        self.last_verdict.as_ref()
    }

    /// Queue a join, to `room` or the default one.
    pub fn join(&mut self, room: Option<&str>) {
        self.outgoing.push(ClientMessage::JoinGame {
            name: self.name.clone(),
            room: room.map(str::to_string),
        });
    }

    /// Queue a ready check for the next round.
    pub fn ready(&mut self) {
        self.outgoing.push(ClientMessage::RoundReady);
    }

    /// Queue leaving the room.
    pub fn exit(&mut self) {
        self.outgoing.push(ClientMessage::Exit);
    }

    /// Queue a request for one more tile.
    pub fn request_tile(&mut self) -> EngineResult<()> {
        let round = self.round.ok_or(EngineError::NoActiveRound)?;
        self.outgoing.push(ClientMessage::AddTile { round });
        Ok(())
    }

    /// Queue a verification of the board as it is now.
    pub fn request_verify(&mut self) -> EngineResult<()> {
        let round = self.round.ok_or(EngineError::NoActiveRound)?;
        self.outgoing.push(ClientMessage::Verify {
            round,
            revision: self.game.revision(),
            board: self.game.snapshot(),
        });
        Ok(())
    }

    /// Drain queued requests as JSON text frames.
    pub fn take_outgoing(&mut self) -> EngineResult<Vec<String>> {
        std::mem::take(&mut self.outgoing)
            .iter()
            .map(ClientMessage::to_json)
            .collect()
    }

    /// Requests queued but not yet taken.
    pub fn pending(&self) -> &[ClientMessage] {
        &self.outgoing
    }

    /// Decode and apply a JSON frame from the server.
    pub fn handle_text(&mut self, text: &str) -> EngineResult<Option<SessionEvent>> {
        let msg = ServerMessage::from_json(text)?;
        self.handle_message(msg)
    }

    /// Apply a server message. Messages for another round, and starts of a
    /// round no newer than the current one, are dropped.
    pub fn handle_message(&mut self, msg: ServerMessage) -> EngineResult<Option<SessionEvent>> {
        let event = match msg {
            ServerMessage::PlayerJoined { player_id } => {
                self.player_id = Some(player_id.clone());
                SessionEvent::Joined { player_id }
            }
            ServerMessage::GameInfo { name, players } => SessionEvent::RoomChanged { name, players },
            ServerMessage::RoundReady => SessionEvent::RoundRequested,
            ServerMessage::Start { round, tiles } => {
                if self.round.is_some_and(|current| round <= current) {
                    log::info!("Dropping start of round {} (current {:?})", round, self.round);
                    return Ok(None);
                }
                self.game.remove_all_tiles();
                self.round = Some(round);
                self.last_verdict = None;
                let count = tiles.len();
                self.game.deal(tiles)?;
                log::info!("Round {} started with {} tiles", round, count);
                SessionEvent::RoundStarted { round, tiles: count }
            }
            ServerMessage::AddTile { round, tile } => {
                if !self.is_current(round) {
                    return Ok(None);
                }
                SessionEvent::TileAdded(self.game.issue_tile(tile)?)
            }
            ServerMessage::OutOfTiles { round } => {
                if !self.is_current(round) {
                    return Ok(None);
                }
                SessionEvent::OutOfTiles
            }
            ServerMessage::SendBoard { round } => {
                if !self.is_current(round) {
                    return Ok(None);
                }
                self.outgoing.push(ClientMessage::SendBoard {
                    round,
                    revision: self.game.revision(),
                    board: self.game.snapshot(),
                });
                SessionEvent::BoardRequested
            }
            ServerMessage::Score { round, revision, verdict } => {
                if !self.is_current(round) {
                    return Ok(None);
                }
                let current = revision == self.game.revision();
                if current {
                    self.game.invalidate_tiles(&verdict.invalid);
                } else {
                    log::info!(
                        "Score for revision {} arrived at revision {}, markers skipped",
                        revision,
                        self.game.revision()
                    );
                }
                self.last_verdict = Some(verdict.clone());
                SessionEvent::Verified { verdict, current }
            }
            ServerMessage::Result { round, standings } => {
                if !self.is_current(round) {
                    return Ok(None);
                }
                SessionEvent::RoundOver { standings }
            }
            ServerMessage::Error { message } => {
                log::warn!("Server error: {}", message);
                SessionEvent::ServerError { message }
            }
        };
        Ok(Some(event))
    }

    fn is_current(&self, round: u64) -> bool {
        let current = self.round == Some(round);
        if !current {
            log::info!("Dropping message for round {} (current {:?})", round, self.round);
        }
        current
    }
}
