//! New-game configuration.

use crate::board::STANDARD_TRACK_LENGTH;
use crate::bot::BotDifficulty;
use crate::game::GameError;
use serde::{Deserialize, Serialize};

pub const MIN_PLAYERS: u8 = 2;
pub const MAX_PLAYERS: u8 = 4;

/// Settings for a new game.
///
/// Seat 0 is the local human unless every seat is computer-controlled.
/// Computer seats follow it, and any remaining seats are extra humans.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub player_count: u8,
    /// Computer-controlled seats; unset means every seat after the first
    pub ai_count: Option<u8>,
    pub difficulty: BotDifficulty,
    /// Name of the human in seat 0
    pub player_name: String,
    /// Seed for dice and random effects; `None` draws from entropy
    pub seed: Option<u64>,
    pub track_length: i32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            player_count: 4,
            ai_count: None,
            difficulty: BotDifficulty::Medium,
            player_name: "Player".to_string(),
            seed: None,
            track_length: STANDARD_TRACK_LENGTH,
        }
    }
}

impl GameConfig {
    pub fn new(player_count: u8, ai_count: u8, difficulty: BotDifficulty) -> Self {
        Self {
            player_count,
            ai_count: Some(ai_count),
            difficulty,
            ..Self::default()
        }
    }

    /// A game with only computer players
    pub fn all_ai(player_count: u8, difficulty: BotDifficulty) -> Self {
        Self::new(player_count, player_count, difficulty)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_player_name(mut self, name: impl Into<String>) -> Self {
        self.player_name = name.into();
        self
    }

    /// Check the settings describe a playable game
    pub fn validate(&self) -> Result<(), GameError> {
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&self.player_count) {
            return Err(GameError::InvalidConfig(format!(
                "need {}-{} players, got {}",
                MIN_PLAYERS, MAX_PLAYERS, self.player_count
            )));
        }
        if self.computer_seats() > self.player_count {
            return Err(GameError::InvalidConfig(format!(
                "{} computer players for {} seats",
                self.computer_seats(),
                self.player_count
            )));
        }
        if self.player_name.trim().is_empty() {
            return Err(GameError::InvalidConfig("player name is empty".to_string()));
        }
        Ok(())
    }

    /// Number of computer-controlled seats
    pub fn computer_seats(&self) -> u8 {
        self.ai_count
            .unwrap_or_else(|| self.player_count.saturating_sub(1))
    }

    /// Whether each seat is computer-controlled
    pub fn seats(&self) -> Vec<bool> {
        let ai_count = self.computer_seats();
        if ai_count >= self.player_count {
            return vec![true; self.player_count as usize];
        }
        (0..self.player_count)
            .map(|seat| seat >= 1 && seat <= ai_count)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seat_layout() {
        assert_eq!(
            GameConfig::new(4, 2, BotDifficulty::Easy).seats(),
            vec![false, true, true, false]
        );
        assert_eq!(
            GameConfig::new(2, 1, BotDifficulty::Easy).seats(),
            vec![false, true]
        );
        assert_eq!(
            GameConfig::all_ai(3, BotDifficulty::Hard).seats(),
            vec![true, true, true]
        );
        assert_eq!(
            GameConfig::new(2, 0, BotDifficulty::Easy).seats(),
            vec![false, false]
        );
    }

    #[test]
    fn test_validate() {
        assert!(GameConfig::default().validate().is_ok());
        assert!(GameConfig::new(1, 0, BotDifficulty::Easy).validate().is_err());
        assert!(GameConfig::new(3, 4, BotDifficulty::Easy).validate().is_err());
        assert!(GameConfig::default()
            .with_player_name("  ")
            .validate()
            .is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: GameConfig =
            serde_json::from_str(r#"{"player_count": 2, "difficulty": "Hard"}"#).unwrap();
        assert_eq!(config.player_count, 2);
        assert_eq!(config.difficulty, BotDifficulty::Hard);
        assert_eq!(config.ai_count, None);
        assert_eq!(config.computer_seats(), 1);
        assert_eq!(config.seats(), vec![false, true]);
        assert_eq!(config.track_length, STANDARD_TRACK_LENGTH);
        assert!(config.validate().is_ok());

        let config: GameConfig = serde_json::from_str(r#"{"player_count": 3}"#).unwrap();
        assert_eq!(config.computer_seats(), 2);
        assert!(crate::game::GameState::new(config).is_ok());
    }
}
