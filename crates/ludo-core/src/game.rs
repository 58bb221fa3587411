//! Core game state machine.
//!
//! This module contains the main `GameState` struct and the turn
//! orchestration: roll, select, confirm, resolve, then either an extra
//! roll for the same player or the next player's turn.

use crate::actions::{CaptureRecord, GameAction, GameEvent, PowerUpEffect, PowerUpTarget, SkipReason};
use crate::board::{Board, BoardError, PlayerId};
use crate::bot::{BotDifficulty, BOT_NAMES};
use crate::config::GameConfig;
use crate::player::{Player, PowerUpKind, TokenId};
use crate::rules::{self, SNIPER_BONUS};
use crate::summary::GameSummary;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Dice face that releases tokens and grants an extra roll
pub const SIX: u8 = 6;

/// Sixes in a row that forfeit the turn
pub const MAX_CONSECUTIVE_SIXES: u8 = 3;

/// Game phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Shown before a game exists; never entered by the engine
    Menu,
    /// Lobby state owned by the caller; never entered by the engine
    Waiting,
    /// Current player must roll
    AwaitingRoll,
    /// A roll is pending and at least one token can move
    SelectingToken,
    /// The confirmed move is being resolved
    Moving,
    /// Power-up menu owned by the caller; never entered by the engine
    PowerUp,
    /// Game is over
    GameOver,
}

/// Errors that can occur when applying actions
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum GameError {
    #[error("Not your turn")]
    NotYourTurn,

    #[error("Invalid action for current phase")]
    InvalidPhase,

    #[error("Unknown player {0}")]
    UnknownPlayer(PlayerId),

    #[error("Unknown token {0}")]
    UnknownToken(TokenId),

    #[error("That token cannot move")]
    IllegalMove,

    #[error("No token selected")]
    NoTokenSelected,

    #[error("Dice value {0} is out of range")]
    InvalidDiceValue(u8),

    #[error("Don't have a {0:?} power-up")]
    PowerUpNotOwned(PowerUpKind),

    #[error("Invalid power-up target")]
    InvalidTarget,

    #[error("No reward pending")]
    NoPendingReward,

    #[error("Invalid game configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Board(#[from] BoardError),

    #[error("Game is over")]
    GameOver,
}

/// Dice state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceState {
    /// Face shown (1-6)
    pub value: u8,
    /// Distance the face moves a token, doubled by a speed boost
    pub moves: u8,
    /// Presentation flag; headless callers leave it false
    pub is_rolling: bool,
    pub can_roll: bool,
}

impl Default for DiceState {
    fn default() -> Self {
        Self {
            value: 1,
            moves: 1,
            is_rolling: false,
            can_roll: true,
        }
    }
}

fn fresh_rng() -> StdRng {
    StdRng::from_entropy()
}

/// The complete game state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// The board and its tiles
    pub board: Board,
    /// All players, indexed by id
    pub players: Vec<Player>,
    /// Player whose turn it is
    pub current_player: PlayerId,
    pub dice: DiceState,
    pub phase: GamePhase,
    pub winner: Option<PlayerId>,
    /// Completed turns
    pub turn_count: u32,
    /// Sixes rolled in a row by the current player
    pub consecutive_sixes: u8,
    pub last_capture: Option<CaptureRecord>,
    /// Turns each frozen player still has to skip
    pub frozen_players: HashMap<PlayerId, u32>,
    pub show_rewarded_ad: bool,
    pub ad_reward_type: Option<PowerUpKind>,
    /// Difficulty of the computer seats
    pub difficulty: BotDifficulty,
    /// Token picked for the pending roll
    pub selected_token: Option<TokenId>,
    /// Tokens that can move with the pending roll
    pub valid_moves: Vec<TokenId>,
    /// A speed boost doubles the next roll
    pub speed_boost_active: bool,
    /// Source for dice, mystery tiles and teleports
    #[serde(skip, default = "fresh_rng")]
    pub(crate) rng: StdRng,
}

impl GameState {
    /// Create a new game from a configuration
    pub fn new(config: GameConfig) -> Result<Self, GameError> {
        config.validate()?;
        let board = Board::with_track_length(config.track_length)?;

        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut bot_names = BOT_NAMES.to_vec();
        bot_names.shuffle(&mut rng);
        let mut bot_names = bot_names.into_iter();

        let players = config
            .seats()
            .into_iter()
            .enumerate()
            .map(|(seat, is_ai)| {
                let name = if is_ai {
                    bot_names.next().unwrap_or("Bot").to_string()
                } else if seat == 0 {
                    config.player_name.clone()
                } else {
                    format!("Player {}", seat + 1)
                };
                Player::new(seat as PlayerId, name, is_ai)
            })
            .collect();

        Ok(Self {
            board,
            players,
            current_player: 0,
            dice: DiceState::default(),
            phase: GamePhase::AwaitingRoll,
            winner: None,
            turn_count: 0,
            consecutive_sixes: 0,
            last_capture: None,
            frozen_players: HashMap::new(),
            show_rewarded_ad: false,
            ad_reward_type: None,
            difficulty: config.difficulty,
            selected_token: None,
            valid_moves: Vec::new(),
            speed_boost_active: false,
            rng,
        })
    }

    /// Get the number of players
    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// Get a player by ID
    pub fn get_player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(id as usize)
    }

    /// Get a mutable player by ID
    pub(crate) fn get_player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.get_mut(id as usize)
    }

    /// The player whose turn it is
    pub fn current(&self) -> &Player {
        &self.players[self.current_player as usize]
    }

    /// Check if the game is finished
    pub fn is_finished(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    /// Get the winner if the game is finished
    pub fn get_winner(&self) -> Option<&Player> {
        self.winner.and_then(|id| self.get_player(id))
    }

    /// Turns a player still has to sit out
    pub fn frozen_turns(&self, player: PlayerId) -> u32 {
        self.frozen_players.get(&player).copied().unwrap_or(0)
    }

    /// Aggregated results, available once the game is over
    pub fn summary(&self) -> Option<GameSummary> {
        GameSummary::from_state(self)
    }

    /// Get all currently valid actions for a player
    pub fn valid_actions(&self, player: PlayerId) -> Vec<GameAction> {
        let mut actions = Vec::new();

        if self.is_finished() || player != self.current_player {
            return actions;
        }
        let Some(p) = self.get_player(player) else {
            return actions;
        };

        let mut owned: Vec<PowerUpKind> = Vec::new();
        for power_up in &p.power_ups {
            if !owned.contains(&power_up.kind) {
                owned.push(power_up.kind);
            }
        }

        match self.phase {
            GamePhase::AwaitingRoll => {
                if self.dice.can_roll {
                    actions.push(GameAction::RollDice);
                }

                for kind in owned.iter().filter(|k| **k != PowerUpKind::Reroll) {
                    for target in rules::power_up_targets(self, player, *kind) {
                        actions.push(GameAction::UsePowerUp {
                            kind: *kind,
                            target,
                        });
                    }
                }
            }

            GamePhase::SelectingToken => {
                for token in &self.valid_moves {
                    actions.push(GameAction::SelectToken(*token));
                }
                if self.selected_token.is_some() {
                    actions.push(GameAction::ConfirmMove);
                }
                if owned.contains(&PowerUpKind::Reroll) {
                    actions.push(GameAction::UsePowerUp {
                        kind: PowerUpKind::Reroll,
                        target: None,
                    });
                }
            }

            _ => {}
        }

        if self.ad_reward_type.is_some() {
            actions.push(GameAction::ClaimReward);
        }

        actions
    }

    /// Apply an action to the game state
    pub fn apply_action(
        &mut self,
        player: PlayerId,
        action: GameAction,
    ) -> Result<Vec<GameEvent>, GameError> {
        if self.is_finished() {
            return Err(GameError::GameOver);
        }
        self.ensure_turn(player)?;

        match action {
            GameAction::RollDice => {
                self.ensure_can_roll()?;
                let face = self.rng.gen_range(1..=6);
                self.apply_roll(player, face)
            }

            GameAction::SelectToken(token) => {
                if self.phase != GamePhase::SelectingToken {
                    return Err(GameError::InvalidPhase);
                }
                if !self.valid_moves.contains(&token) {
                    return Err(GameError::IllegalMove);
                }

                self.selected_token = Some(token);
                Ok(vec![GameEvent::TokenSelected { player, token }])
            }

            GameAction::ConfirmMove => self.confirm_move(player),

            GameAction::UsePowerUp { kind, target } => self.use_power_up(player, kind, target),

            GameAction::RequestReward(kind) => {
                self.show_rewarded_ad = true;
                self.ad_reward_type = Some(kind);
                Ok(vec![GameEvent::RewardOffered { player, kind }])
            }

            GameAction::ClaimReward => {
                let kind = self.ad_reward_type.ok_or(GameError::NoPendingReward)?;
                self.ad_reward_type = None;
                self.show_rewarded_ad = false;
                if let Some(p) = self.get_player_mut(player) {
                    p.grant_power_up(kind);
                }
                Ok(vec![GameEvent::RewardClaimed { player, kind }])
            }
        }
    }

    /// Apply a roll with a known face.
    ///
    /// `RollDice` draws the face from the game's generator and lands here;
    /// callers that own their own dice (replays, tests) can call it directly.
    pub fn apply_roll(&mut self, player: PlayerId, face: u8) -> Result<Vec<GameEvent>, GameError> {
        if self.is_finished() {
            return Err(GameError::GameOver);
        }
        self.ensure_turn(player)?;
        self.ensure_can_roll()?;
        if !(1..=6).contains(&face) {
            return Err(GameError::InvalidDiceValue(face));
        }

        let moves = if self.speed_boost_active { face * 2 } else { face };
        self.speed_boost_active = false;
        self.dice = DiceState {
            value: face,
            moves,
            is_rolling: false,
            can_roll: false,
        };

        let mut events = vec![GameEvent::DiceRolled {
            player,
            value: face,
            moves,
        }];

        if face == SIX {
            self.consecutive_sixes += 1;
            if self.consecutive_sixes >= MAX_CONSECUTIVE_SIXES {
                self.consecutive_sixes = 0;
                events.push(GameEvent::TurnSkipped {
                    player,
                    reason: SkipReason::TripleSix,
                });
                events.extend(self.end_turn());
                return Ok(events);
            }
        } else {
            self.consecutive_sixes = 0;
        }

        let movable = rules::roll_moves(&self.board, self.current(), &self.dice);
        if movable.is_empty() {
            events.push(GameEvent::TurnSkipped {
                player,
                reason: SkipReason::NoValidMoves,
            });
            events.extend(self.end_turn());
        } else {
            self.valid_moves = movable;
            self.selected_token = None;
            self.phase = GamePhase::SelectingToken;
        }

        Ok(events)
    }

    // ==================== Helper Methods ====================

    fn ensure_turn(&self, player: PlayerId) -> Result<(), GameError> {
        if self.get_player(player).is_none() {
            return Err(GameError::UnknownPlayer(player));
        }
        if player != self.current_player {
            return Err(GameError::NotYourTurn);
        }
        Ok(())
    }

    fn ensure_can_roll(&self) -> Result<(), GameError> {
        if self.phase != GamePhase::AwaitingRoll || !self.dice.can_roll {
            return Err(GameError::InvalidPhase);
        }
        Ok(())
    }

    fn confirm_move(&mut self, player: PlayerId) -> Result<Vec<GameEvent>, GameError> {
        if self.phase != GamePhase::SelectingToken {
            return Err(GameError::InvalidPhase);
        }
        let token = self.selected_token.ok_or(GameError::NoTokenSelected)?;
        if !self.valid_moves.contains(&token) {
            return Err(GameError::IllegalMove);
        }

        let step = self
            .get_player(player)
            .and_then(|p| p.token(token))
            .map(|t| rules::step_for(t, &self.dice))
            .ok_or(GameError::UnknownToken(token))?;
        let outcome = rules::apply_move(self, player, token, step)?;
        self.phase = GamePhase::Moving;
        self.selected_token = None;
        self.valid_moves.clear();

        let mut events = outcome.events();

        // A boost is spent right away on the same token; it never chains
        if outcome.bonus_move > 0 {
            let can_follow = self
                .get_player(player)
                .and_then(|p| p.token(token).map(|t| (p, t)))
                .is_some_and(|(p, t)| rules::can_move(&self.board, p, t, outcome.bonus_move));
            if can_follow {
                let follow_up = rules::apply_bonus_move(self, player, token, outcome.bonus_move)?;
                events.extend(follow_up.events());
            }
        }

        if let Some(winner) = rules::check_winner(self) {
            self.winner = Some(winner);
            self.phase = GamePhase::GameOver;
            self.dice.can_roll = false;
            events.push(GameEvent::GameWon {
                player: winner,
                turns: self.turn_count,
            });
            return Ok(events);
        }

        if self.dice.value == SIX && self.consecutive_sixes < MAX_CONSECUTIVE_SIXES {
            self.phase = GamePhase::AwaitingRoll;
            self.dice.can_roll = true;
            events.push(GameEvent::ExtraTurn { player });
        } else {
            events.extend(self.end_turn());
        }

        Ok(events)
    }

    fn use_power_up(
        &mut self,
        player: PlayerId,
        kind: PowerUpKind,
        target: Option<PowerUpTarget>,
    ) -> Result<Vec<GameEvent>, GameError> {
        // Reroll replaces a pending roll, everything else is used before rolling
        let allowed = match kind {
            PowerUpKind::Reroll => self.phase == GamePhase::SelectingToken,
            _ => self.phase == GamePhase::AwaitingRoll,
        };
        if !allowed {
            return Err(GameError::InvalidPhase);
        }

        let effect = rules::use_power_up(self, player, kind, target)?;
        let mut events = vec![GameEvent::PowerUpUsed {
            player,
            kind,
            effect,
        }];

        match effect {
            PowerUpEffect::SpeedBoostArmed => self.speed_boost_active = true,
            PowerUpEffect::RerollGranted => {
                // The discarded roll doesn't count towards the six streak
                if self.dice.value == SIX {
                    self.consecutive_sixes = self.consecutive_sixes.saturating_sub(1);
                }
                self.phase = GamePhase::AwaitingRoll;
                self.selected_token = None;
                self.valid_moves.clear();
            }
            PowerUpEffect::Sniped { .. } => events.push(GameEvent::CoinsAwarded {
                player,
                amount: SNIPER_BONUS,
            }),
            _ => {}
        }

        Ok(events)
    }

    fn end_turn(&mut self) -> Vec<GameEvent> {
        let player = self.current_player;
        let advance = rules::next_turn(self);

        let mut events: Vec<GameEvent> = advance
            .skipped
            .iter()
            .map(|&skipped| GameEvent::TurnSkipped {
                player: skipped,
                reason: SkipReason::Frozen,
            })
            .collect();
        events.push(GameEvent::TurnEnded {
            player,
            next_player: advance.next,
        });
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::HOME;

    fn two_player_game() -> GameState {
        GameState::new(GameConfig::new(2, 0, BotDifficulty::Medium).with_seed(7)).unwrap()
    }

    #[test]
    fn test_new_game_starts_awaiting_roll() {
        let game = two_player_game();
        assert_eq!(game.phase, GamePhase::AwaitingRoll);
        assert_eq!(game.current_player, 0);
        assert!(game.dice.can_roll);
        assert_eq!(game.turn_count, 0);
        assert!(game
            .players
            .iter()
            .all(|p| p.tokens.iter().all(|t| t.position == HOME)));
    }

    #[test]
    fn test_seats_and_names() {
        let game = GameState::new(
            GameConfig::new(4, 2, BotDifficulty::Easy)
                .with_player_name("Ana")
                .with_seed(1),
        )
        .unwrap();

        assert_eq!(game.players[0].name, "Ana");
        assert!(!game.players[0].is_ai);
        assert!(game.players[1].is_ai);
        assert!(game.players[2].is_ai);
        assert!(!game.players[3].is_ai);
        assert_eq!(game.players[3].name, "Player 4");
        assert_ne!(game.players[1].name, game.players[2].name);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result = GameState::new(GameConfig::new(5, 0, BotDifficulty::Easy));
        assert!(matches!(result, Err(GameError::InvalidConfig(_))));

        let mut config = GameConfig::new(2, 0, BotDifficulty::Easy);
        config.track_length = 30;
        assert!(matches!(
            GameState::new(config),
            Err(GameError::Board(BoardError::UnevenTrack(30)))
        ));
    }

    #[test]
    fn test_roll_without_moves_passes_turn() {
        let mut game = two_player_game();
        let events = game.apply_roll(0, 3).unwrap();

        assert!(events.contains(&GameEvent::TurnSkipped {
            player: 0,
            reason: SkipReason::NoValidMoves
        }));
        assert_eq!(game.current_player, 1);
        assert_eq!(game.phase, GamePhase::AwaitingRoll);
        assert_eq!(game.turn_count, 1);
    }

    #[test]
    fn test_roll_six_enters_selection() {
        let mut game = two_player_game();
        game.apply_roll(0, 6).unwrap();

        assert_eq!(game.phase, GamePhase::SelectingToken);
        assert_eq!(game.valid_moves, vec![0, 1, 2, 3]);
        assert_eq!(game.consecutive_sixes, 1);
    }

    #[test]
    fn test_roll_rejected_outside_roll_phase() {
        let mut game = two_player_game();
        game.apply_roll(0, 6).unwrap();

        let before = game.dice;
        assert_eq!(game.apply_roll(0, 4), Err(GameError::InvalidPhase));
        assert_eq!(
            game.apply_action(0, GameAction::RollDice),
            Err(GameError::InvalidPhase)
        );
        assert_eq!(game.dice, before);
    }

    #[test]
    fn test_not_your_turn() {
        let mut game = two_player_game();
        assert_eq!(
            game.apply_action(1, GameAction::RollDice),
            Err(GameError::NotYourTurn)
        );
        assert_eq!(
            game.apply_action(7, GameAction::RollDice),
            Err(GameError::UnknownPlayer(7))
        );
    }

    #[test]
    fn test_confirm_requires_selection() {
        let mut game = two_player_game();
        game.apply_roll(0, 6).unwrap();
        assert_eq!(
            game.apply_action(0, GameAction::ConfirmMove),
            Err(GameError::NoTokenSelected)
        );
        assert_eq!(
            game.apply_action(0, GameAction::SelectToken(9)),
            Err(GameError::IllegalMove)
        );
        assert_eq!(game.phase, GamePhase::SelectingToken);
    }

    #[test]
    fn test_six_grants_extra_turn() {
        let mut game = two_player_game();
        game.apply_roll(0, 6).unwrap();
        game.apply_action(0, GameAction::SelectToken(0)).unwrap();
        let events = game.apply_action(0, GameAction::ConfirmMove).unwrap();

        assert!(events.contains(&GameEvent::ExtraTurn { player: 0 }));
        assert_eq!(game.current_player, 0);
        assert_eq!(game.phase, GamePhase::AwaitingRoll);
        assert_eq!(game.players[0].tokens[0].position, 0);
    }

    #[test]
    fn test_triple_six_forfeits_turn() {
        let mut game = two_player_game();
        for _ in 0..2 {
            game.apply_roll(0, 6).unwrap();
            game.apply_action(0, GameAction::SelectToken(0)).unwrap();
            game.apply_action(0, GameAction::ConfirmMove).unwrap();
        }
        assert_eq!(game.consecutive_sixes, 2);
        let position = game.players[0].tokens[0].position;

        let events = game.apply_roll(0, 6).unwrap();
        assert!(events.contains(&GameEvent::TurnSkipped {
            player: 0,
            reason: SkipReason::TripleSix
        }));
        assert_eq!(game.current_player, 1);
        assert_eq!(game.consecutive_sixes, 0);
        assert_eq!(game.players[0].tokens[0].position, position);
    }

    #[test]
    fn test_reward_flow() {
        let mut game = two_player_game();
        assert_eq!(
            game.apply_action(0, GameAction::ClaimReward),
            Err(GameError::NoPendingReward)
        );

        game.apply_action(0, GameAction::RequestReward(PowerUpKind::Teleport))
            .unwrap();
        assert!(game.show_rewarded_ad);

        game.apply_action(0, GameAction::ClaimReward).unwrap();
        assert!(!game.show_rewarded_ad);
        assert_eq!(game.ad_reward_type, None);
        assert!(game.players[0].has_power_up(PowerUpKind::Teleport));
    }

    #[test]
    fn test_speed_boost_doubles_next_roll() {
        let mut game = two_player_game();
        game.players[0].tokens[0].position = 1;
        game.players[0].grant_power_up(PowerUpKind::SpeedBoost);

        game.apply_action(
            0,
            GameAction::UsePowerUp {
                kind: PowerUpKind::SpeedBoost,
                target: None,
            },
        )
        .unwrap();
        assert!(game.speed_boost_active);

        game.apply_roll(0, 3).unwrap();
        assert_eq!(game.dice.moves, 6);
        assert!(!game.speed_boost_active);

        game.apply_action(0, GameAction::SelectToken(0)).unwrap();
        game.apply_action(0, GameAction::ConfirmMove).unwrap();
        assert_eq!(game.players[0].tokens[0].position, 7);
    }

    #[test]
    fn test_speed_boosted_six_releases_token() {
        let mut game = two_player_game();
        game.players[0].grant_power_up(PowerUpKind::SpeedBoost);
        game.apply_action(
            0,
            GameAction::UsePowerUp {
                kind: PowerUpKind::SpeedBoost,
                target: None,
            },
        )
        .unwrap();

        game.apply_roll(0, 6).unwrap();
        assert_eq!(game.dice.moves, 12);
        assert_eq!(game.phase, GamePhase::SelectingToken);
        assert_eq!(game.valid_moves, vec![0, 1, 2, 3]);

        game.apply_action(0, GameAction::SelectToken(0)).unwrap();
        let events = game.apply_action(0, GameAction::ConfirmMove).unwrap();
        assert_eq!(game.players[0].tokens[0].position, 0);
        assert!(events.contains(&GameEvent::ExtraTurn { player: 0 }));
    }

    #[test]
    fn test_capture_on_boost_tile_keeps_streak() {
        let mut game = two_player_game();
        game.players[0].tokens[0].position = 1;
        game.players[1].tokens[0].position = 4;

        game.apply_roll(0, 3).unwrap();
        game.apply_action(0, GameAction::SelectToken(0)).unwrap();
        let events = game.apply_action(0, GameAction::ConfirmMove).unwrap();

        assert!(events.contains(&GameEvent::TokenCaptured {
            capturer: 0,
            captured: crate::actions::TokenRef::new(1, 0),
            streak: 1,
        }));
        assert_eq!(game.players[0].tokens[0].position, 10);
        assert_eq!(game.players[1].tokens[0].position, HOME);
        assert_eq!(game.players[0].capture_streak, 1);
    }

    #[test]
    fn test_reroll_returns_to_roll_phase() {
        let mut game = two_player_game();
        game.players[0].grant_power_up(PowerUpKind::Reroll);

        // Not usable before a roll
        assert_eq!(
            game.apply_action(
                0,
                GameAction::UsePowerUp {
                    kind: PowerUpKind::Reroll,
                    target: None
                }
            ),
            Err(GameError::InvalidPhase)
        );

        game.apply_roll(0, 6).unwrap();
        game.apply_action(
            0,
            GameAction::UsePowerUp {
                kind: PowerUpKind::Reroll,
                target: None,
            },
        )
        .unwrap();

        assert_eq!(game.phase, GamePhase::AwaitingRoll);
        assert!(game.dice.can_roll);
        assert_eq!(game.consecutive_sixes, 0);
        assert!(game.valid_moves.is_empty());
        assert!(!game.players[0].has_power_up(PowerUpKind::Reroll));
    }

    #[test]
    fn test_valid_actions_by_phase() {
        let mut game = two_player_game();
        game.players[0].grant_power_up(PowerUpKind::Freeze);

        let actions = game.valid_actions(0);
        assert!(actions.contains(&GameAction::RollDice));
        assert!(actions.contains(&GameAction::UsePowerUp {
            kind: PowerUpKind::Freeze,
            target: Some(PowerUpTarget::Player(1)),
        }));
        assert!(game.valid_actions(1).is_empty());

        game.apply_roll(0, 6).unwrap();
        let actions = game.valid_actions(0);
        assert!(actions.contains(&GameAction::SelectToken(2)));
        assert!(!actions.contains(&GameAction::RollDice));
        assert!(!actions.contains(&GameAction::ConfirmMove));
    }

    #[test]
    fn test_frozen_player_is_skipped() {
        let mut game = GameState::new(GameConfig::new(3, 0, BotDifficulty::Medium).with_seed(3)).unwrap();
        game.frozen_players.insert(1, 1);

        let events = game.apply_roll(0, 2).unwrap();
        assert!(events.contains(&GameEvent::TurnSkipped {
            player: 1,
            reason: SkipReason::Frozen
        }));
        assert_eq!(game.current_player, 2);
        assert_eq!(game.frozen_turns(1), 0);
        assert!(!game.frozen_players.contains_key(&1));
    }

    #[test]
    fn test_game_over_rejects_actions() {
        let mut game = two_player_game();
        let terminal = game.board.terminal();
        for token in game.players[0].tokens.iter_mut().skip(1) {
            token.position = terminal;
        }
        game.players[0].tokens[0].position = terminal - 2;

        game.apply_roll(0, 2).unwrap();
        game.apply_action(0, GameAction::SelectToken(0)).unwrap();
        let events = game.apply_action(0, GameAction::ConfirmMove).unwrap();

        assert!(events.contains(&GameEvent::GameWon { player: 0, turns: 0 }));
        assert_eq!(game.phase, GamePhase::GameOver);
        assert_eq!(game.get_winner().map(|p| p.id), Some(0));
        assert_eq!(
            game.apply_action(0, GameAction::RollDice),
            Err(GameError::GameOver)
        );
    }

    #[test]
    fn test_state_serializes() {
        let game = two_player_game();
        let json = serde_json::to_string(&game).unwrap();
        let restored: GameState = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.players.len(), 2);
        assert_eq!(restored.board, game.board);
    }
}
