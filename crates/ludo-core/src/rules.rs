//! Movement and rule resolution.
//!
//! Every function here either validates and fully applies its change, or
//! returns an error before touching the state.

use crate::actions::{CaptureRecord, GameEvent, PowerUpEffect, PowerUpTarget, TokenRef};
use crate::board::{Board, PlayerId, Position, TileKind, HOME};
use crate::game::{DiceState, GameError, GamePhase, GameState};
use crate::player::{Player, PlayerColor, PowerUpKind, Token, TokenId, SHIELD_DURATION};
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// Roll needed to leave home base
pub const EXIT_ROLL: u8 = 6;

/// Coins per capture, multiplied by the capture streak
pub const CAPTURE_COINS: u32 = 10;

pub const COIN_TILE_BONUS: u32 = 20;
pub const FINISH_BONUS: u32 = 50;
pub const SNIPER_BONUS: u32 = 15;

/// Extra distance granted by a boost tile
pub const BOOST_DISTANCE: u8 = 6;

/// Turns a freeze makes the target skip
pub const FREEZE_TURNS: u32 = 1;

/// Where a step of `dice` cells from `position` lands, without clamping.
///
/// Values above the terminal cell mean the move overshoots.
fn advance(board: &Board, color: PlayerColor, position: Position, dice: u8) -> Position {
    let dice = dice as i32;

    if position == HOME {
        return if dice == EXIT_ROLL as i32 {
            board.entry(color)
        } else {
            HOME
        };
    }

    match board.lap_distance(color, position) {
        Some(distance) => {
            let n = board.track_length();
            let reach = distance + dice;
            if reach >= n {
                board.finish_lane_start() + (reach - n)
            } else {
                (position + dice) % n
            }
        }
        // Finish lane: straight ahead
        None => position + dice,
    }
}

/// Check if a token can be moved with the given dice value
pub fn can_move(board: &Board, player: &Player, token: &Token, dice: u8) -> bool {
    if token.position == HOME {
        return dice == EXIT_ROLL;
    }
    if board.is_finished(token.position) || dice == 0 {
        return false;
    }
    advance(board, player.color, token.position, dice) <= board.terminal()
}

/// Calculate where a token would end up.
///
/// Never returns a position past the terminal cell; moves that would
/// overshoot are rejected by [`can_move`] before this is used.
pub fn destination(board: &Board, player: &Player, token: &Token, dice: u8) -> Position {
    advance(board, player.color, token.position, dice).min(board.terminal())
}

/// Tokens of a player that can move with the given dice value
pub fn valid_moves(board: &Board, player: &Player, dice: u8) -> Vec<TokenId> {
    player
        .tokens
        .iter()
        .filter(|t| can_move(board, player, t, dice))
        .map(|t| t.id)
        .collect()
}

/// Distance a token covers with a rolled die.
///
/// Leaving home only looks at the face, so a speed-boosted six still
/// releases a token onto its entry cell.
pub fn step_for(token: &Token, roll: &DiceState) -> u8 {
    if token.position == HOME {
        roll.value
    } else {
        roll.moves
    }
}

/// Tokens of a player that can move with a rolled die
pub fn roll_moves(board: &Board, player: &Player, roll: &DiceState) -> Vec<TokenId> {
    player
        .tokens
        .iter()
        .filter(|t| can_move(board, player, t, step_for(t, roll)))
        .map(|t| t.id)
        .collect()
}

/// Everything that happened while applying one move
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveOutcome {
    pub player: PlayerId,
    pub token: TokenId,
    pub from: Position,
    /// Cell the dice reached
    pub landed: Position,
    /// Final cell after a warp
    pub to: Position,
    pub captured: Option<TokenRef>,
    /// Capture streak after this move
    pub streak: u32,
    pub got_power_up: Option<PowerUpKind>,
    pub bonus_coins: u32,
    /// Distance the caller should move the same token again
    pub bonus_move: u8,
    pub teleport_to: Option<Position>,
}

impl MoveOutcome {
    /// Events describing this move, in resolution order
    pub fn events(&self) -> Vec<GameEvent> {
        let mut events = vec![GameEvent::TokenMoved {
            player: self.player,
            token: self.token,
            from: self.from,
            to: self.landed,
        }];

        if let Some(captured) = self.captured {
            events.push(GameEvent::TokenCaptured {
                capturer: self.player,
                captured,
                streak: self.streak,
            });
        }
        if let Some(kind) = self.got_power_up {
            events.push(GameEvent::PowerUpAcquired {
                player: self.player,
                kind,
            });
        }
        if let Some(to) = self.teleport_to {
            events.push(GameEvent::TokenWarped {
                player: self.player,
                token: self.token,
                from: self.landed,
                to,
            });
        }
        if self.bonus_move > 0 {
            events.push(GameEvent::BoostEarned {
                player: self.player,
                token: self.token,
                bonus: self.bonus_move,
            });
        }
        if self.bonus_coins > 0 {
            events.push(GameEvent::CoinsAwarded {
                player: self.player,
                amount: self.bonus_coins,
            });
        }

        events
    }
}

/// Move a token and resolve captures, tiles, coins and shields
pub fn apply_move(
    state: &mut GameState,
    player_id: PlayerId,
    token_id: TokenId,
    dice: u8,
) -> Result<MoveOutcome, GameError> {
    resolve_move(state, player_id, token_id, dice, false)
}

/// Second leg of a move that landed on a boost tile.
///
/// Belongs to the same confirmed move: a capture made on the first leg
/// keeps its streak and shields don't wear off again.
pub fn apply_bonus_move(
    state: &mut GameState,
    player_id: PlayerId,
    token_id: TokenId,
    dice: u8,
) -> Result<MoveOutcome, GameError> {
    resolve_move(state, player_id, token_id, dice, true)
}

fn resolve_move(
    state: &mut GameState,
    player_id: PlayerId,
    token_id: TokenId,
    dice: u8,
    bonus_leg: bool,
) -> Result<MoveOutcome, GameError> {
    let player = state
        .get_player(player_id)
        .ok_or(GameError::UnknownPlayer(player_id))?;
    let token = player
        .token(token_id)
        .ok_or(GameError::UnknownToken(token_id))?;
    if !can_move(&state.board, player, token, dice) {
        return Err(GameError::IllegalMove);
    }

    let from = token.position;
    let landed = destination(&state.board, player, token, dice);
    let p = player_id as usize;
    let t = token_id as usize;

    state.players[p].tokens[t].position = landed;

    let mut outcome = MoveOutcome {
        player: player_id,
        token: token_id,
        from,
        landed,
        to: landed,
        captured: None,
        streak: 0,
        got_power_up: None,
        bonus_coins: 0,
        bonus_move: 0,
        teleport_to: None,
    };

    if let Some(kind) = state.board.kind_at(landed) {
        if kind != TileKind::Safe {
            // Only the first unshielded opponent on the cell is captured
            let victim = state
                .players
                .iter()
                .filter(|other| other.id != player_id)
                .find_map(|other| {
                    other
                        .tokens
                        .iter()
                        .find(|t| t.position == landed && !t.is_shielded)
                        .map(|t| TokenRef::new(other.id, t.id))
                });

            if let Some(victim) = victim {
                state.players[victim.player as usize].tokens[victim.token as usize].position = HOME;
                let streak = state.players[p].record_capture();
                outcome.captured = Some(victim);
                outcome.streak = streak;
                outcome.bonus_coins += CAPTURE_COINS * streak;
                state.last_capture = Some(CaptureRecord {
                    capturer: player_id,
                    captured: victim,
                });
            }
        }

        match kind {
            TileKind::Boost => outcome.bonus_move = BOOST_DISTANCE,
            TileKind::Mystery => {
                let power_up = PowerUpKind::random(&mut state.rng);
                state.players[p].grant_power_up(power_up);
                outcome.got_power_up = Some(power_up);
            }
            TileKind::Warp => {
                if let Some(next) = state.board.next_warp(landed) {
                    state.players[p].tokens[t].position = next;
                    outcome.to = next;
                    outcome.teleport_to = Some(next);
                }
            }
            TileKind::Coin => outcome.bonus_coins += COIN_TILE_BONUS,
            TileKind::Normal | TileKind::Safe => {}
        }
    }

    if state.board.is_finished(landed) {
        outcome.bonus_coins += FINISH_BONUS;
    }

    let mover = &mut state.players[p];
    mover.coins += outcome.bonus_coins;
    outcome.streak = mover.capture_streak;
    if bonus_leg {
        return Ok(outcome);
    }
    if outcome.captured.is_none() {
        mover.capture_streak = 0;
        outcome.streak = 0;
    }

    // Shields wear off one move at a time, whoever moved
    for player in &mut state.players {
        for token in &mut player.tokens {
            token.tick_shield();
        }
    }

    Ok(outcome)
}

fn owned_token<'a>(
    state: &'a GameState,
    player: PlayerId,
    target: Option<PowerUpTarget>,
) -> Result<&'a Token, GameError> {
    match target {
        Some(PowerUpTarget::Token(r)) if r.player == player => state
            .get_player(player)
            .and_then(|p| p.token(r.token))
            .ok_or(GameError::InvalidTarget),
        _ => Err(GameError::InvalidTarget),
    }
}

/// Work out what a power-up would do, without applying it
fn resolve_power_up(
    state: &mut GameState,
    player: PlayerId,
    kind: PowerUpKind,
    target: Option<PowerUpTarget>,
) -> Result<PowerUpEffect, GameError> {
    let board = &state.board;

    match kind {
        PowerUpKind::Shield => {
            let token = owned_token(state, player, target)?;
            if board.is_finished(token.position) {
                return Err(GameError::InvalidTarget);
            }
            Ok(PowerUpEffect::Shielded {
                token: TokenRef::new(player, token.id),
                turns: SHIELD_DURATION,
            })
        }

        PowerUpKind::SpeedBoost => Ok(PowerUpEffect::SpeedBoostArmed),

        PowerUpKind::Sniper => {
            let Some(PowerUpTarget::Token(r)) = target else {
                return Err(GameError::InvalidTarget);
            };
            if r.player == player {
                return Err(GameError::InvalidTarget);
            }
            let token = state
                .get_player(r.player)
                .and_then(|p| p.token(r.token))
                .ok_or(GameError::InvalidTarget)?;
            if !board.is_main_track(token.position) {
                return Err(GameError::InvalidTarget);
            }
            if token.is_shielded {
                Ok(PowerUpEffect::SniperBlocked { target: r })
            } else {
                Ok(PowerUpEffect::Sniped { target: r })
            }
        }

        PowerUpKind::Reroll => Ok(PowerUpEffect::RerollGranted),

        PowerUpKind::Teleport => {
            let token = owned_token(state, player, target)?;
            if !board.is_main_track(token.position) {
                return Err(GameError::InvalidTarget);
            }
            let token = TokenRef::new(player, token.id);
            let to = *board
                .safe_tiles()
                .choose(&mut state.rng)
                .ok_or(GameError::InvalidTarget)?;
            Ok(PowerUpEffect::Teleported { token, to })
        }

        PowerUpKind::Freeze => match target {
            Some(PowerUpTarget::Player(target))
                if target != player && state.get_player(target).is_some() =>
            {
                Ok(PowerUpEffect::Frozen {
                    player: target,
                    turns: FREEZE_TURNS,
                })
            }
            _ => Err(GameError::InvalidTarget),
        },
    }
}

/// Consume a power-up and apply its effect.
///
/// A speed boost only arms a flag; the orchestrator doubles the next roll.
pub fn use_power_up(
    state: &mut GameState,
    player: PlayerId,
    kind: PowerUpKind,
    target: Option<PowerUpTarget>,
) -> Result<PowerUpEffect, GameError> {
    let owner = state
        .get_player(player)
        .ok_or(GameError::UnknownPlayer(player))?;
    if !owner.has_power_up(kind) {
        return Err(GameError::PowerUpNotOwned(kind));
    }

    let effect = resolve_power_up(state, player, kind, target)?;

    if let Some(owner) = state.get_player_mut(player) {
        owner.take_power_up(kind);
    }

    match effect {
        PowerUpEffect::Shielded { token, turns } => {
            state.players[token.player as usize].tokens[token.token as usize].shield(turns);
        }
        PowerUpEffect::Sniped { target } => {
            state.players[target.player as usize].tokens[target.token as usize].position = HOME;
            let shooter = &mut state.players[player as usize];
            shooter.coins += SNIPER_BONUS;
            shooter.captures += 1;
            state.last_capture = Some(CaptureRecord {
                capturer: player,
                captured: target,
            });
        }
        PowerUpEffect::RerollGranted => state.dice.can_roll = true,
        PowerUpEffect::Teleported { token, to } => {
            state.players[token.player as usize].tokens[token.token as usize].position = to;
        }
        PowerUpEffect::Frozen { player, turns } => {
            state.frozen_players.insert(player, turns);
        }
        PowerUpEffect::SniperBlocked { .. } | PowerUpEffect::SpeedBoostArmed => {}
    }

    Ok(effect)
}

/// Every target a power-up could legally be aimed at
pub fn power_up_targets(
    state: &GameState,
    player: PlayerId,
    kind: PowerUpKind,
) -> Vec<Option<PowerUpTarget>> {
    let candidates: Vec<Option<PowerUpTarget>> = match kind {
        PowerUpKind::SpeedBoost | PowerUpKind::Reroll => vec![None],
        PowerUpKind::Freeze => state
            .players
            .iter()
            .filter(|p| p.id != player)
            .map(|p| Some(PowerUpTarget::Player(p.id)))
            .collect(),
        PowerUpKind::Shield | PowerUpKind::Teleport => state
            .get_player(player)
            .map(|p| {
                p.tokens
                    .iter()
                    .filter(|t| !t.is_home())
                    .map(|t| Some(PowerUpTarget::Token(TokenRef::new(p.id, t.id))))
                    .collect()
            })
            .unwrap_or_default(),
        PowerUpKind::Sniper => state
            .players
            .iter()
            .filter(|p| p.id != player)
            .flat_map(|p| {
                p.tokens
                    .iter()
                    .map(move |t| Some(PowerUpTarget::Token(TokenRef::new(p.id, t.id))))
            })
            .collect(),
    };

    candidates
        .into_iter()
        .filter(|target| is_valid_target(state, player, kind, *target))
        .collect()
}

/// Target rules without the randomness of [`resolve_power_up`]
fn is_valid_target(
    state: &GameState,
    player: PlayerId,
    kind: PowerUpKind,
    target: Option<PowerUpTarget>,
) -> bool {
    let board = &state.board;
    match kind {
        PowerUpKind::SpeedBoost | PowerUpKind::Reroll => true,
        PowerUpKind::Shield => owned_token(state, player, target)
            .is_ok_and(|t| !board.is_finished(t.position)),
        PowerUpKind::Teleport => owned_token(state, player, target)
            .is_ok_and(|t| board.is_main_track(t.position)),
        PowerUpKind::Sniper => match target {
            Some(PowerUpTarget::Token(r)) if r.player != player => state
                .get_player(r.player)
                .and_then(|p| p.token(r.token))
                .is_some_and(|t| board.is_main_track(t.position)),
            _ => false,
        },
        PowerUpKind::Freeze => matches!(
            target,
            Some(PowerUpTarget::Player(p)) if p != player && state.get_player(p).is_some()
        ),
    }
}

/// Check if a player has won: all tokens on the terminal cell
pub fn check_winner(state: &GameState) -> Option<PlayerId> {
    state
        .players
        .iter()
        .find(|p| p.tokens.iter().all(|t| state.board.is_finished(t.position)))
        .map(|p| p.id)
}

/// Result of handing the turn on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnAdvance {
    pub next: PlayerId,
    /// Frozen players passed over, in seat order
    pub skipped: Vec<PlayerId>,
}

/// Move to the next player, skipping frozen ones.
///
/// Looks at most one full round of seats, so it terminates even when
/// everybody is frozen.
pub fn next_turn(state: &mut GameState) -> TurnAdvance {
    let count = state.player_count();
    let mut next = (state.current_player as usize + 1) % count;
    let mut skipped = Vec::new();

    for _ in 0..count {
        let id = next as PlayerId;
        match state.frozen_players.get_mut(&id) {
            Some(turns) if *turns > 0 => {
                *turns -= 1;
                if *turns == 0 {
                    state.frozen_players.remove(&id);
                }
                skipped.push(id);
                next = (next + 1) % count;
            }
            _ => break,
        }
    }

    state.current_player = next as PlayerId;
    state.dice = DiceState {
        can_roll: true,
        is_rolling: false,
        ..state.dice
    };
    state.phase = GamePhase::AwaitingRoll;
    state.turn_count += 1;
    state.consecutive_sixes = 0;
    state.selected_token = None;
    state.valid_moves.clear();

    TurnAdvance {
        next: state.current_player,
        skipped,
    }
}
