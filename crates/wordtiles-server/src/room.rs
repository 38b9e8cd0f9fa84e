//! Room state machine.
//!
//! A room runs rounds for its players. Handlers are synchronous and return
//! the messages to deliver; the connection layer fans them out.

use crate::bag::new_bag;
use crate::config::MAX_BOARD_SIDE;
use crate::dictionary::Dictionary;
use crate::scoring::score_board;
use rand::Rng;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;
use wordtiles_core::{BoardSnapshot, ClientMessage, ServerMessage, Standing, TileData, Verdict};

/// Unique identifier for connected players.
pub type PlayerId = Uuid;

/// What the room is doing or waiting on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomState {
    /// No round yet.
    Init,
    /// Waiting for every player to be ready.
    WaitingRoundReady,
    /// Players are placing tiles.
    Running,
    /// Someone won; collecting the other boards.
    WaitingScores,
    /// Results sent.
    Over,
}

/// Who a message goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    All,
    Only(PlayerId),
    AllExcept(PlayerId),
}

impl Audience {
    /// Whether `player` receives messages sent to this audience.
    pub fn includes(&self, player: PlayerId) -> bool {
        match self {
            Audience::All => true,
            Audience::Only(id) => *id == player,
            Audience::AllExcept(id) => *id != player,
        }
    }
}

/// A message and its recipients.
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    pub to: Audience,
    pub message: ServerMessage,
}

impl Delivery {
    fn new(to: Audience, message: ServerMessage) -> Self {
        Self { to, message }
    }

    fn error(to: PlayerId, message: impl Into<String>) -> Self {
        Self::new(Audience::Only(to), ServerMessage::Error { message: message.into() })
    }
}

/// Which request a board came with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionKind {
    /// A player checking their board mid-round.
    Verify,
    /// A final board handed in after someone won.
    SendBoard,
}

impl SubmissionKind {
    fn phase(self) -> RoomState {
        match self {
            SubmissionKind::Verify => RoomState::Running,
            SubmissionKind::SendBoard => RoomState::WaitingScores,
        }
    }
}

/// A board sent in for scoring.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub player: PlayerId,
    pub kind: SubmissionKind,
    pub round: u64,
    pub revision: u64,
    pub board: BoardSnapshot,
}

impl Submission {
    /// Split a board-carrying message off; anything else comes back as is.
    pub fn from_message(player: PlayerId, msg: ClientMessage) -> Result<Self, ClientMessage> {
        let (kind, round, revision, board) = match msg {
            ClientMessage::Verify { round, revision, board } => (SubmissionKind::Verify, round, revision, board),
            ClientMessage::SendBoard { round, revision, board } => (SubmissionKind::SendBoard, round, revision, board),
            other => return Err(other),
        };
        Ok(Self {
            player,
            kind,
            round,
            revision,
            board,
        })
    }
}

/// Everything needed to score a submission without the room.
#[derive(Debug, Clone)]
pub struct ScoreJob {
    submission: Submission,
    served: Vec<TileData>,
    dictionary: Arc<Dictionary>,
}

impl ScoreJob {
    /// Score the board. This is the slow part of a submission.
    pub fn run(self) -> Scored {
        let verdict = score_board(&self.submission.board, &self.served, &self.dictionary);
        Scored {
            submission: self.submission,
            verdict,
        }
    }
}

/// A scored submission, ready to be applied to its room.
#[derive(Debug, Clone)]
pub struct Scored {
    submission: Submission,
    verdict: Verdict,
}

#[derive(Debug, Clone)]
struct Player {
    id: PlayerId,
    name: String,
    /// Checked in during the current waiting phase.
    ready: bool,
    /// Taking part in the current round. Late joiners sit it out.
    playing: bool,
    /// Tiles served this round.
    served: usize,
    last_score: Option<i64>,
}

/// A named game shared by its players.
#[derive(Debug)]
pub struct Room {
    name: String,
    state: RoomState,
    round: u64,
    tiles: Vec<TileData>,
    players: Vec<Player>,
    starting_tiles: usize,
    dictionary: Arc<Dictionary>,
}

impl Room {
    /// An empty room that deals `starting_tiles` tiles per round.
    pub fn new(name: impl Into<String>, dictionary: Arc<Dictionary>, starting_tiles: usize) -> Self {
        Self {
            name: name.into(),
            state: RoomState::Init,
            round: 0,
            tiles: Vec::new(),
            players: Vec::new(),
            starting_tiles,
            dictionary,
        }
    }

    /// What the room is currently doing.
    pub fn state(&self) -> RoomState {
        self.state
    }

    /// True once the last player has left.
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Player names in joining order.
    pub fn player_names(&self) -> Vec<String> {
        self.players.iter().map(|p| p.name.clone()).collect()
    }

    /// Add a player. Players joining mid-round sit it out.
    pub fn join(&mut self, id: PlayerId, name: impl Into<String>) -> Vec<Delivery> {
        let playing = !matches!(self.state, RoomState::Running | RoomState::WaitingScores);
        self.players.push(Player {
            id,
            name: name.into(),
            ready: false,
            playing,
            served: 0,
            last_score: None,
        });
        info!("Player {} joined room {}", id, self.name);
        vec![
            Delivery::new(Audience::Only(id), ServerMessage::PlayerJoined { player_id: id.to_string() }),
            self.game_info(),
        ]
    }

    /// Remove a player. Completes a waiting phase the player was holding up.
    pub fn leave(&mut self, id: PlayerId) -> Vec<Delivery> {
        let before = self.players.len();
        self.players.retain(|p| p.id != id);
        if self.players.len() == before || self.players.is_empty() {
            return Vec::new();
        }
        info!("Player {} left room {}", id, self.name);
        let mut out = vec![self.game_info()];
        if self.all_ready() {
            match self.state {
                RoomState::WaitingRoundReady => out.push(self.start_round()),
                RoomState::WaitingScores => out.push(self.finish_round()),
                _ => {}
            }
        }
        out
    }

    /// Apply a client message from `id`.
    pub fn handle<R: Rng + ?Sized>(&mut self, id: PlayerId, msg: ClientMessage, rng: &mut R) -> Vec<Delivery> {
        if self.player(id).is_none() {
            return vec![Delivery::error(id, "Not in this room")];
        }
        match msg {
            ClientMessage::JoinGame { .. } => vec![Delivery::error(id, "Already in a room")],
            ClientMessage::RoundReady => self.round_ready(id, rng),
            ClientMessage::AddTile { round } => self.add_tile(id, round),
            ClientMessage::Verify { round, revision, board } => self.submit(Submission {
                player: id,
                kind: SubmissionKind::Verify,
                round,
                revision,
                board,
            }),
            ClientMessage::SendBoard { round, revision, board } => self.submit(Submission {
                player: id,
                kind: SubmissionKind::SendBoard,
                round,
                revision,
                board,
            }),
            ClientMessage::Exit => self.leave(id),
        }
    }

    /// Score a submission in place.
    fn submit(&mut self, submission: Submission) -> Vec<Delivery> {
        match self.prepare_score(submission) {
            Ok(job) => self.apply_score(job.run()),
            Err(rejection) => vec![rejection],
        }
    }

    fn round_ready<R: Rng + ?Sized>(&mut self, id: PlayerId, rng: &mut R) -> Vec<Delivery> {
        let mut out = Vec::new();
        if self.state != RoomState::WaitingRoundReady {
            self.tiles = new_bag(rng);
            self.round += 1;
            self.state = RoomState::WaitingRoundReady;
            for p in &mut self.players {
                p.ready = false;
                p.playing = true;
                p.served = 0;
                p.last_score = None;
            }
            info!("Room {} waiting for round {}", self.name, self.round);
            out.push(Delivery::new(Audience::AllExcept(id), ServerMessage::RoundReady));
        }
        if let Some(p) = self.player_mut(id) {
            p.ready = true;
            p.playing = true;
        }
        if self.all_ready() {
            out.push(self.start_round());
        }
        out
    }

    fn start_round(&mut self) -> Delivery {
        let count = self.starting_tiles.min(self.tiles.len());
        for p in &mut self.players {
            p.served = count;
        }
        self.state = RoomState::Running;
        info!("Room {} started round {} with {} tiles", self.name, self.round, count);
        Delivery::new(
            Audience::All,
            ServerMessage::Start {
                round: self.round,
                tiles: self.tiles[..count].to_vec(),
            },
        )
    }

    fn add_tile(&mut self, id: PlayerId, round: u64) -> Vec<Delivery> {
        if let Some(err) = self.check_round(id, round, RoomState::Running) {
            return vec![err];
        }
        let current = self.round;
        let next = self.player(id).map(|p| p.served).and_then(|n| self.tiles.get(n).copied());
        let message = match next {
            Some(tile) => {
                if let Some(p) = self.player_mut(id) {
                    p.served += 1;
                }
                debug!("Serving {:?} to {}", tile, id);
                ServerMessage::AddTile { round: current, tile }
            }
            None => ServerMessage::OutOfTiles { round: current },
        };
        vec![Delivery::new(Audience::Only(id), message)]
    }

    /// Check a submission against the room and detach its scoring work.
    pub fn prepare_score(&self, submission: Submission) -> Result<ScoreJob, Delivery> {
        let id = submission.player;
        if let Some(err) = self.check_round(id, submission.round, submission.kind.phase()) {
            return Err(err);
        }
        let board = &submission.board;
        if board.width() > MAX_BOARD_SIDE || board.0.iter().any(|col| col.len() > MAX_BOARD_SIDE) {
            return Err(Delivery::error(id, format!("Board larger than {} cells a side", MAX_BOARD_SIDE)));
        }
        let served = self.player(id).map_or(0, |p| p.served).min(self.tiles.len());
        Ok(ScoreJob {
            submission,
            served: self.tiles[..served].to_vec(),
            dictionary: self.dictionary.clone(),
        })
    }

    /// Record a scored submission. The room may have moved on while the
    /// board was being scored; the phase is checked again.
    pub fn apply_score(&mut self, scored: Scored) -> Vec<Delivery> {
        let Scored { submission, verdict } = scored;
        let Submission {
            player: id,
            kind,
            round,
            revision,
            ..
        } = submission;
        if let Some(err) = self.check_round(id, round, kind.phase()) {
            return vec![err];
        }
        let win = verdict.win;
        let points = verdict.score;
        debug!("Player {} scored {} (win: {})", id, points, win);
        let mut out = vec![Delivery::new(
            Audience::Only(id),
            ServerMessage::Score { round, revision, verdict },
        )];

        match kind {
            SubmissionKind::Verify if win => {
                for p in &mut self.players {
                    p.ready = false;
                }
                self.state = RoomState::WaitingScores;
                self.mark_scored(id, 0);
                info!("Player {} finished round {} in room {}", id, self.round, self.name);
                out.push(Delivery::new(Audience::AllExcept(id), ServerMessage::SendBoard { round }));
            }
            SubmissionKind::Verify => return out,
            SubmissionKind::SendBoard => self.mark_scored(id, points),
        }
        if self.all_ready() {
            out.push(self.finish_round());
        }
        out
    }

    fn mark_scored(&mut self, id: PlayerId, score: i64) {
        if let Some(p) = self.player_mut(id) {
            p.ready = true;
            p.last_score = Some(score);
        }
    }

    fn finish_round(&mut self) -> Delivery {
        self.state = RoomState::Over;
        let mut standings: Vec<Standing> = self
            .players
            .iter()
            .filter_map(|p| p.last_score.map(|score| Standing { name: p.name.clone(), score }))
            .collect();
        standings.sort_by_key(|s| s.score);
        info!("Room {} round {} is over", self.name, self.round);
        Delivery::new(Audience::All, ServerMessage::Result { round: self.round, standings })
    }

    /// Reject requests outside `phase`, for another round, or from a player
    /// sitting this round out.
    fn check_round(&self, id: PlayerId, round: u64, phase: RoomState) -> Option<Delivery> {
        if self.state != phase {
            return Some(Delivery::error(id, "No active round"));
        }
        if round != self.round {
            return Some(Delivery::error(id, format!("Stale round {} (current {})", round, self.round)));
        }
        if !self.player(id).is_some_and(|p| p.playing) {
            return Some(Delivery::error(id, "Not playing this round"));
        }
        None
    }

    fn all_ready(&self) -> bool {
        self.players.iter().filter(|p| p.playing).all(|p| p.ready)
    }

    fn game_info(&self) -> Delivery {
        Delivery::new(
            Audience::All,
            ServerMessage::GameInfo {
                name: self.name.clone(),
                players: self.player_names(),
            },
        )
    }

    fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == id)
    }
}
