//! Game session management.

use ludo_core::{Bot, GameAction, GameConfig, GameError, GameEvent, GameState, GameSummary, PlayerId};
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

use crate::protocol::{SeatInfo, SessionInfo, SessionStatus};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session not found: {0}")]
    NotFound(Uuid),

    #[error("Session has stopped")]
    Closed,

    #[error("Seat {0} is played by the computer")]
    ComputerSeat(PlayerId),

    #[error("Game is over")]
    GameOver,

    #[error("Turn limit of {0} reached")]
    TurnLimit(u32),

    #[error(transparent)]
    Game(#[from] GameError),
}

/// A running game with bots for every computer seat.
pub struct GameSession {
    pub id: Uuid,
    pub game: GameState,
    pub status: SessionStatus,
    bots: HashMap<PlayerId, Bot>,
    max_turns: u32,
}

impl GameSession {
    pub fn new(id: Uuid, config: GameConfig, max_turns: u32) -> Result<Self, SessionError> {
        let seed = config.seed;
        let difficulty = config.difficulty;
        let game = GameState::new(config)?;

        let bots = game
            .players
            .iter()
            .filter(|p| p.is_ai)
            .map(|p| {
                let bot = match seed {
                    // Offset so bots don't mirror the dice generator
                    Some(seed) => Bot::with_seed(p.id, difficulty, seed ^ (0x9e37 + p.id as u64)),
                    None => Bot::new(p.id, difficulty),
                };
                (p.id, bot)
            })
            .collect();

        Ok(Self {
            id,
            game,
            status: SessionStatus::InGame,
            bots,
            max_turns,
        })
    }

    /// Whether the computer should move next
    pub fn is_bot_turn(&self) -> bool {
        self.status == SessionStatus::InGame && self.bots.contains_key(&self.game.current_player)
    }

    /// Apply an action for a human seat
    pub fn apply_action(
        &mut self,
        player: PlayerId,
        action: GameAction,
    ) -> Result<Vec<GameEvent>, SessionError> {
        self.ensure_running()?;
        if self.bots.contains_key(&player) {
            return Err(SessionError::ComputerSeat(player));
        }

        let events = self.game.apply_action(player, action)?;
        self.update_status();
        Ok(events)
    }

    /// Let the current computer player take its whole turn.
    ///
    /// Returns `None` when a human is to move or the session has stopped.
    pub fn play_bot_turn(&mut self) -> Result<Option<(PlayerId, Vec<GameEvent>)>, SessionError> {
        if !self.is_bot_turn() {
            return Ok(None);
        }

        let player = self.game.current_player;
        let Some(bot) = self.bots.get_mut(&player) else {
            return Ok(None);
        };
        let events = bot.take_turn(&mut self.game)?;
        self.update_status();
        Ok(Some((player, events)))
    }

    /// How long to wait before the next computer turn
    pub fn bot_delay(&mut self, pace: Duration, think_delays: bool) -> Duration {
        if !think_delays {
            return pace;
        }
        match self.bots.get_mut(&self.game.current_player) {
            Some(bot) => bot.think_delay(),
            None => pace,
        }
    }

    pub fn is_over(&self) -> bool {
        self.status != SessionStatus::InGame
    }

    pub fn summary(&self) -> Option<GameSummary> {
        self.game.summary()
    }

    pub fn state_json(&self) -> serde_json::Value {
        serde_json::to_value(&self.game).unwrap_or(serde_json::Value::Null)
    }

    pub fn to_info(&self) -> SessionInfo {
        SessionInfo {
            id: self.id,
            players: self
                .game
                .players
                .iter()
                .map(|p| SeatInfo {
                    id: p.id,
                    name: p.name.clone(),
                    color: p.color,
                    is_ai: p.is_ai,
                })
                .collect(),
            status: self.status,
            turn_count: self.game.turn_count,
        }
    }

    // ==================== Helper Methods ====================

    fn ensure_running(&self) -> Result<(), SessionError> {
        match self.status {
            SessionStatus::InGame => Ok(()),
            SessionStatus::Finished => Err(SessionError::GameOver),
            SessionStatus::Abandoned => Err(SessionError::TurnLimit(self.max_turns)),
        }
    }

    fn update_status(&mut self) {
        if self.game.is_finished() {
            self.status = SessionStatus::Finished;
        } else if self.game.turn_count >= self.max_turns {
            self.status = SessionStatus::Abandoned;
        }
    }
}
