//! AI Bot players for Ludo Rush.
//!
//! This module provides different difficulty levels of AI players:
//! - Easy: Heuristic moves with frequent random picks, rarely uses power-ups
//! - Medium: Risk-aware moves, shields and snipes
//! - Hard: Always the best move, also spreads tokens and freezes the leader

use crate::actions::{GameAction, GameEvent, PowerUpTarget, TokenRef};
use crate::board::{PlayerId, Position, TileKind, HOME};
use crate::game::{GameError, GamePhase, GameState};
use crate::player::{Player, PowerUpKind, Token, TokenId};
use crate::rules;
use rand::prelude::*;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

/// Names given to computer players
pub const BOT_NAMES: [&str; 12] = [
    "RushBot",
    "LudoMaster",
    "DiceKing",
    "TokenTerror",
    "BoardBoss",
    "RollRaider",
    "CaptureKing",
    "SwiftPawn",
    "LuckyRoller",
    "StarChaser",
    "PowerPlayer",
    "TurboToken",
];

/// Actions a bot may take in one turn before giving control back
const MAX_TURN_STEPS: usize = 32;

/// Tokens this close to the end of their lap are worth protecting or sniping
const LATE_LAP_WINDOW: i32 = 12;

/// Captured tokens this close to the end of their lap earn a bonus
const NEAR_FINISH_WINDOW: i32 = 7;

const FREEZE_THRESHOLD: i32 = 150;

/// Bot difficulty level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BotDifficulty {
    Easy,
    Medium,
    Hard,
}

impl BotDifficulty {
    /// Chance of playing a random legal move instead of the best one
    pub fn random_move_chance(&self) -> f64 {
        match self {
            BotDifficulty::Easy => 0.4,
            BotDifficulty::Medium => 0.15,
            BotDifficulty::Hard => 0.0,
        }
    }

    /// Thinking pause range in milliseconds, for callers that pace bots
    pub fn think_delay_range(&self) -> (u64, u64) {
        match self {
            BotDifficulty::Easy => (500, 1000),
            BotDifficulty::Medium => (800, 1500),
            BotDifficulty::Hard => (1000, 2000),
        }
    }
}

impl FromStr for BotDifficulty {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(BotDifficulty::Easy),
            "medium" => Ok(BotDifficulty::Medium),
            "hard" => Ok(BotDifficulty::Hard),
            other => Err(GameError::InvalidConfig(format!(
                "unknown difficulty '{}'",
                other
            ))),
        }
    }
}

/// A power-up the bot wants to use before rolling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerUpDecision {
    pub kind: PowerUpKind,
    pub target: Option<PowerUpTarget>,
}

impl From<PowerUpDecision> for GameAction {
    fn from(decision: PowerUpDecision) -> Self {
        GameAction::UsePowerUp {
            kind: decision.kind,
            target: decision.target,
        }
    }
}

/// A bot player that can decide on actions
pub struct Bot {
    pub player_id: PlayerId,
    pub difficulty: BotDifficulty,
    rng: StdRng,
    /// `(turn_count, consecutive_sixes)` of the last power-up evaluation
    last_policy_check: Option<(u32, u8)>,
}

impl Bot {
    pub fn new(player_id: PlayerId, difficulty: BotDifficulty) -> Self {
        Self {
            player_id,
            difficulty,
            rng: StdRng::from_entropy(),
            last_policy_check: None,
        }
    }

    pub fn with_seed(player_id: PlayerId, difficulty: BotDifficulty, seed: u64) -> Self {
        Self {
            player_id,
            difficulty,
            rng: StdRng::seed_from_u64(seed),
            last_policy_check: None,
        }
    }

    /// Choose the next action, or `None` when it is not this bot's move
    pub fn choose_action(&mut self, game: &GameState) -> Option<GameAction> {
        if game.is_finished() || game.current_player != self.player_id {
            return None;
        }

        match game.phase {
            GamePhase::AwaitingRoll => {
                // One power-up evaluation per roll
                let key = (game.turn_count, game.consecutive_sixes);
                if self.last_policy_check != Some(key) {
                    self.last_policy_check = Some(key);
                    if let Some(decision) = self.power_up_decision(game) {
                        let action = GameAction::from(decision);
                        if game.valid_actions(self.player_id).contains(&action) {
                            return Some(action);
                        }
                    }
                }
                game.dice.can_roll.then_some(GameAction::RollDice)
            }

            GamePhase::SelectingToken => match game.selected_token {
                Some(_) => Some(GameAction::ConfirmMove),
                None => self.select_move(game).map(GameAction::SelectToken),
            },

            _ => None,
        }
    }

    /// Play until control leaves this bot (turn passed or game won)
    pub fn take_turn(&mut self, game: &mut GameState) -> Result<Vec<GameEvent>, GameError> {
        let mut events = Vec::new();

        for _ in 0..MAX_TURN_STEPS {
            let Some(action) = self.choose_action(game) else {
                break;
            };
            let step = game.apply_action(self.player_id, action)?;
            let handed_over = step
                .iter()
                .any(|e| matches!(e, GameEvent::TurnEnded { .. } | GameEvent::GameWon { .. }));
            events.extend(step);
            if handed_over {
                break;
            }
        }

        Ok(events)
    }

    /// A random pause inside the difficulty's thinking range
    pub fn think_delay(&mut self) -> Duration {
        let (min, max) = self.difficulty.think_delay_range();
        Duration::from_millis(self.rng.gen_range(min..=max))
    }

    /// Pick a token for the pending roll
    pub fn select_move(&mut self, game: &GameState) -> Option<TokenId> {
        let player = game.get_player(self.player_id)?;
        let movable = if game.phase == GamePhase::SelectingToken {
            game.valid_moves.clone()
        } else {
            rules::roll_moves(&game.board, player, &game.dice)
        };

        match movable.len() {
            0 => return None,
            1 => return movable.first().copied(),
            _ => {}
        }

        let chance = self.difficulty.random_move_chance();
        if chance > 0.0 && self.rng.gen_bool(chance) {
            return movable.choose(&mut self.rng).copied();
        }

        let mut scored: Vec<(TokenId, f64)> = movable
            .iter()
            .filter_map(|&id| {
                let token = player.token(id)?;
                let dice = rules::step_for(token, &game.dice);
                Some((id, score_move(game, player, token, dice, self.difficulty)))
            })
            .collect();

        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.first().map(|(id, _)| *id)
    }

    /// Decide whether to spend a power-up before rolling.
    ///
    /// Shield, sniper and freeze are considered in that order; the first
    /// that applies wins.
    pub fn power_up_decision(&mut self, game: &GameState) -> Option<PowerUpDecision> {
        let player = game.get_player(self.player_id)?;
        if player.power_ups.is_empty() {
            return None;
        }

        if self.difficulty == BotDifficulty::Easy && self.rng.gen_bool(0.7) {
            return None;
        }

        let board = &game.board;
        let late_lap = board.track_length() - LATE_LAP_WINDOW;

        if player.has_power_up(PowerUpKind::Shield) {
            let exposed = player.tokens.iter().find(|t| {
                !t.is_shielded
                    && board
                        .lap_distance(player.color, t.position)
                        .is_some_and(|d| d > late_lap)
                    && is_threatened(game, player.id, t.position)
            });
            if let Some(token) = exposed {
                return Some(PowerUpDecision {
                    kind: PowerUpKind::Shield,
                    target: Some(PowerUpTarget::Token(TokenRef::new(player.id, token.id))),
                });
            }
        }

        if player.has_power_up(PowerUpKind::Sniper) && self.difficulty != BotDifficulty::Easy {
            let mut best: Option<(TokenRef, i32)> = None;
            for opponent in game.players.iter().filter(|p| p.id != player.id) {
                for token in opponent.tokens.iter().filter(|t| !t.is_shielded) {
                    let Some(distance) = board.lap_distance(opponent.color, token.position) else {
                        continue;
                    };
                    if best.map_or(true, |(_, d)| distance > d) {
                        best = Some((TokenRef::new(opponent.id, token.id), distance));
                    }
                }
            }

            if let Some((target, distance)) = best {
                if distance > late_lap {
                    return Some(PowerUpDecision {
                        kind: PowerUpKind::Sniper,
                        target: Some(PowerUpTarget::Token(target)),
                    });
                }
            }
        }

        if player.has_power_up(PowerUpKind::Freeze) && self.difficulty == BotDifficulty::Hard {
            let leader = game
                .players
                .iter()
                .filter(|p| p.id != player.id)
                .map(|p| (p.id, race_score(game, p)))
                .fold(None, |best: Option<(PlayerId, i32)>, (id, score)| match best {
                    Some((_, top)) if top >= score => best,
                    _ => Some((id, score)),
                });

            if let Some((target, score)) = leader {
                if score > FREEZE_THRESHOLD {
                    return Some(PowerUpDecision {
                        kind: PowerUpKind::Freeze,
                        target: Some(PowerUpTarget::Player(target)),
                    });
                }
            }
        }

        None
    }
}

/// Heuristic value of moving `token` by `dice`
pub fn score_move(
    game: &GameState,
    player: &Player,
    token: &Token,
    dice: u8,
    difficulty: BotDifficulty,
) -> f64 {
    let board = &game.board;
    let to = rules::destination(board, player, token, dice);

    if token.position == HOME {
        return 50.0;
    }
    if board.is_finished(to) {
        return 1000.0;
    }

    let mut score = 0.0;

    if board.is_finish_lane(to) && board.is_main_track(token.position) {
        score += 200.0;
    }

    if let Some(victim) = capture_target(game, player.id, to) {
        score += 300.0;
        let near_finish = board
            .lap_distance(victim.color, victim.position)
            .is_some_and(|d| d >= board.track_length() - NEAR_FINISH_WINDOW);
        if near_finish {
            score += 100.0;
        }
    }

    match board.kind_at(to) {
        Some(TileKind::Safe) => score += 40.0,
        Some(TileKind::Boost) => score += 35.0,
        Some(TileKind::Mystery) => score += 45.0,
        _ => {}
    }

    if is_threatened(game, player.id, token.position) {
        score += 30.0;
        if board.is_safe(to) {
            score += 20.0;
        }
    }

    score += to as f64 * 0.5;

    if difficulty != BotDifficulty::Easy && is_threatened(game, player.id, to) && !board.is_safe(to)
    {
        score -= 25.0;
    }

    if difficulty == BotDifficulty::Hard {
        let in_play: Vec<i32> = player
            .tokens
            .iter()
            .filter(|t| !t.is_home() && !board.is_finished(t.position))
            .map(|t| board.progress(player.color, t.position))
            .collect();
        if !in_play.is_empty() {
            let average = in_play.iter().sum::<i32>() as f64 / in_play.len() as f64;
            if (board.progress(player.color, token.position) as f64) < average {
                score += 15.0;
            }
        }
    }

    score
}

/// Whether an opponent's main-track token can reach `position` with one die face.
///
/// Only plain advances count; warps, boosts and lane turns are ignored.
pub fn is_threatened(game: &GameState, player: PlayerId, position: Position) -> bool {
    let board = &game.board;
    if !board.is_main_track(position) || board.is_safe(position) {
        return false;
    }

    let n = board.track_length();
    game.players
        .iter()
        .filter(|p| p.id != player)
        .flat_map(|p| p.tokens.iter())
        .filter(|t| board.is_main_track(t.position))
        .any(|t| (1..=6).any(|face| (t.position + face) % n == position))
}

/// First unshielded opposing token a move to `position` would capture
fn capture_target(game: &GameState, player: PlayerId, position: Position) -> Option<&Token> {
    if !game.board.is_main_track(position) || game.board.is_safe(position) {
        return None;
    }
    game.players
        .iter()
        .filter(|p| p.id != player)
        .flat_map(|p| p.tokens.iter())
        .find(|t| t.position == position && !t.is_shielded)
}

/// How close a player is to winning, used to pick a freeze target
fn race_score(game: &GameState, player: &Player) -> i32 {
    let board = &game.board;
    player
        .tokens
        .iter()
        .map(|t| {
            if board.is_finished(t.position) {
                100
            } else if board.is_finish_lane(t.position) {
                60 + (t.position - board.finish_lane_start())
            } else {
                board.lap_distance(player.color, t.position).unwrap_or(0)
            }
        })
        .sum()
}
