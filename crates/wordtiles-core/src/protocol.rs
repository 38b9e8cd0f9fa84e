//! Wire messages exchanged with the game server.
//!
//! Messages are JSON objects tagged by `type`:
//! ```json
//! { "type": "join_game", "name": "ana", "room": "lobby" }
//! { "type": "verify", "round": 3, "revision": 17, "board": [[null, "A"], [null, null]] }
//! { "type": "score", "round": 3, "revision": 17, "win": false, "score": 4, "invalid": [{"x": 0, "y": 1}] }
//! ```
//! `round` identifies a deal and `revision` a board state. Responses echo
//! both so clients can drop answers to questions they no longer ask.

use crate::board::BoardSnapshot;
use crate::error::EngineResult;
use crate::geometry::Coord;
use crate::tile::TileData;
use serde::{Deserialize, Serialize};

/// Messages sent to the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Join (or create) a room
    JoinGame {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        room: Option<String>,
    },
    /// Ready for the next round
    RoundReady,
    /// Ask for one more tile
    AddTile { round: u64 },
    /// Ask the server to score the board
    Verify {
        round: u64,
        revision: u64,
        board: BoardSnapshot,
    },
    /// Final board, in reply to `ServerMessage::SendBoard`
    SendBoard {
        round: u64,
        revision: u64,
        board: BoardSnapshot,
    },
    /// Leave the room
    Exit,
}

/// Result of scoring one board.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Verdict {
    pub win: bool,
    /// Points left unplayed; zero on a winning board.
    pub score: i64,
    /// Cells holding tiles that are not part of a valid word.
    #[serde(default)]
    pub invalid: Vec<Coord>,
}

/// One line of the end-of-round table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Standing {
    pub name: String,
    pub score: i64,
}

/// Messages received from the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Confirms the join and assigns an id
    PlayerJoined { player_id: String },
    /// Room roster changed
    GameInfo { name: String, players: Vec<String> },
    /// Another player wants to start a round
    RoundReady,
    /// A round began with these tiles
    Start { round: u64, tiles: Vec<TileData> },
    /// One more tile
    AddTile { round: u64, tile: TileData },
    /// The bag is empty
    OutOfTiles { round: u64 },
    /// Someone won; send the final board
    SendBoard { round: u64 },
    /// Verification result
    Score {
        round: u64,
        revision: u64,
        #[serde(flatten)]
        verdict: Verdict,
    },
    /// Final standings, lowest score first
    Result { round: u64, standings: Vec<Standing> },
    /// Error message
    Error { message: String },
}

impl ClientMessage {
    /// Encode as a JSON text frame.
    pub fn to_json(&self) -> EngineResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode a JSON text frame.
    pub fn from_json(text: &str) -> EngineResult<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

impl ServerMessage {
    /// Encode as a JSON text frame.
    pub fn to_json(&self) -> EngineResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode a JSON text frame.
    pub fn from_json(text: &str) -> EngineResult<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_message_serialize() {
        let msg = ClientMessage::JoinGame { name: "ana".to_string(), room: None };
        assert_eq!(msg.to_json().unwrap(), r#"{"type":"join_game","name":"ana"}"#);
        assert_eq!(ClientMessage::RoundReady.to_json().unwrap(), r#"{"type":"round_ready"}"#);
    }

    #[test]
    fn test_verify_board_payload() {
        let msg = ClientMessage::from_json(r#"{"type":"verify","round":2,"revision":9,"board":[[null,"C"],["A",null]]}"#).unwrap();
        match msg {
            ClientMessage::Verify { round, revision, board } => {
                assert_eq!((round, revision), (2, 9));
                assert_eq!(board.get(Coord::new(0, 1)), Some('C'));
                assert_eq!(board.get(Coord::new(1, 0)), Some('A'));
            }
            _ => panic!("Wrong message type"),
        }
    }

    #[test]
    fn test_score_is_flat() {
        let json = r#"{"type":"score","round":1,"revision":4,"win":false,"score":3,"invalid":[{"x":2,"y":3}]}"#;
        let msg = ServerMessage::from_json(json).unwrap();
        match &msg {
            ServerMessage::Score { round, revision, verdict } => {
                assert_eq!((*round, *revision), (1, 4));
                assert_eq!(verdict.score, 3);
                assert_eq!(verdict.invalid, vec![Coord::new(2, 3)]);
            }
            _ => panic!("Wrong message type"),
        }
        let back: serde_json::Value = serde_json::from_str(&msg.to_json().unwrap()).unwrap();
        assert_eq!(back["win"], serde_json::Value::Bool(false));
    }

    #[test]
    fn test_start_tiles() {
        let json = r#"{"type":"start","round":1,"tiles":[{"value":"Q","points":10}]}"#;
        let msg = ServerMessage::from_json(json).unwrap();
        assert_eq!(msg, ServerMessage::Start { round: 1, tiles: vec![TileData::new('Q', 10)] });
    }

    #[test]
    fn test_unknown_type_is_error() {
        assert!(ServerMessage::from_json(r#"{"type":"nope"}"#).is_err());
    }
}
