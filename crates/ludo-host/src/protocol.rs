//! Request and update messages for hosted Ludo Rush sessions.

use ludo_core::{GameAction, GameConfig, GameEvent, GameSummary, PlayerColor, PlayerId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::leaderboard::LeaderboardEntry;

/// Messages sent from a client to the host.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum ClientMessage {
    /// Start a new game session
    CreateSession { config: GameConfig },

    /// Submit a game action for a human seat
    GameAction {
        session_id: Uuid,
        player: PlayerId,
        action: GameAction,
    },

    /// Request a full state snapshot
    GetState { session_id: Uuid },

    /// Request the list of running sessions
    ListSessions,

    /// Request the leaderboard
    Leaderboard { limit: usize, offset: usize },
}

/// Messages sent from the host to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum ServerMessage {
    /// Session created and its actor started
    SessionCreated { session: SessionInfo },

    /// Game state snapshot
    GameState { state: serde_json::Value },

    /// Result of a submitted action
    ActionResult {
        success: bool,
        events: Vec<GameEvent>,
        error: Option<String>,
    },

    /// Events produced by computer players
    BotMoved {
        player: PlayerId,
        events: Vec<GameEvent>,
    },

    /// Current player changed
    TurnChanged { player: PlayerId },

    /// Session stopped at the turn limit without a winner
    TurnLimitReached { turns: u32 },

    /// Game finished
    GameOver { summary: GameSummary },

    /// List of running sessions
    SessionList { sessions: Vec<SessionInfo> },

    /// Leaderboard page
    Leaderboard { entries: Vec<LeaderboardEntry> },

    /// Error occurred
    Error { message: String },
}

/// Session information for clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInfo {
    pub id: Uuid,
    pub players: Vec<SeatInfo>,
    pub status: SessionStatus,
    pub turn_count: u32,
}

/// One seat at the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatInfo {
    pub id: PlayerId,
    pub name: String,
    pub color: PlayerColor,
    pub is_ai: bool,
}

/// Session status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    InGame,
    Finished,
    /// Stopped at the turn limit
    Abandoned,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_message_wire_format() {
        let msg: ClientMessage = serde_json::from_str(
            r#"{"type":"GameAction","payload":{"session_id":"67e55044-10b1-426f-9247-bb680e5fe0c8","player":0,"action":"RollDice"}}"#,
        )
        .unwrap();

        match msg {
            ClientMessage::GameAction { player, action, .. } => {
                assert_eq!(player, 0);
                assert_eq!(action, GameAction::RollDice);
            }
            other => panic!("unexpected message {:?}", other),
        }
    }

    #[test]
    fn test_server_message_is_tagged() {
        let json = serde_json::to_value(ServerMessage::TurnChanged { player: 2 }).unwrap();
        assert_eq!(json["type"], "TurnChanged");
        assert_eq!(json["payload"]["player"], 2);
    }
}
