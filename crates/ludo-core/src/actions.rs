//! Game actions that players can take.
//!
//! This module defines all possible commands a caller can send to the game
//! and the events that result from them.

use crate::board::{PlayerId, Position};
use crate::player::{PowerUpKind, TokenId};
use serde::{Deserialize, Serialize};

/// All possible actions a player can take
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameAction {
    /// Roll the dice (start of turn, or after a six / reroll)
    RollDice,
    /// Pick one of the legal tokens for the rolled value
    SelectToken(TokenId),
    /// Move the selected token and resolve its effects
    ConfirmMove,
    /// Consume a power-up from the inventory
    UsePowerUp {
        kind: PowerUpKind,
        target: Option<PowerUpTarget>,
    },
    /// Ask for a rewarded power-up (the caller shows whatever it likes)
    RequestReward(PowerUpKind),
    /// Collect the pending rewarded power-up
    ClaimReward,
}

/// Reference to a token anywhere on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenRef {
    pub player: PlayerId,
    pub token: TokenId,
}

impl TokenRef {
    pub fn new(player: PlayerId, token: TokenId) -> Self {
        Self { player, token }
    }
}

/// What a power-up is aimed at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerUpTarget {
    Token(TokenRef),
    Player(PlayerId),
}

/// The most recent capture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureRecord {
    pub capturer: PlayerId,
    pub captured: TokenRef,
}

/// Resolved effect of a power-up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerUpEffect {
    Shielded { token: TokenRef, turns: u32 },
    /// The next roll moves double
    SpeedBoostArmed,
    Sniped { target: TokenRef },
    /// Sniper hit a shielded token and did nothing
    SniperBlocked { target: TokenRef },
    RerollGranted,
    Teleported { token: TokenRef, to: Position },
    Frozen { player: PlayerId, turns: u32 },
}

/// Why a player lost their turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    /// Third six in a row
    TripleSix,
    /// Frozen by an opponent
    Frozen,
    /// Nothing could move with the rolled value
    NoValidMoves,
}

/// Events that occur as a result of actions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Dice were rolled
    DiceRolled {
        player: PlayerId,
        value: u8,
        /// Distance the roll moves, doubled by a speed boost
        moves: u8,
    },

    /// A token was picked for the pending roll
    TokenSelected { player: PlayerId, token: TokenId },

    /// A token moved
    TokenMoved {
        player: PlayerId,
        token: TokenId,
        from: Position,
        to: Position,
    },

    /// An opponent token was sent home by a move
    TokenCaptured {
        capturer: PlayerId,
        captured: TokenRef,
        streak: u32,
    },

    /// A mystery tile granted a power-up
    PowerUpAcquired { player: PlayerId, kind: PowerUpKind },

    /// Coins were awarded for a move or power-up
    CoinsAwarded { player: PlayerId, amount: u32 },

    /// A warp tile moved the token
    TokenWarped {
        player: PlayerId,
        token: TokenId,
        from: Position,
        to: Position,
    },

    /// A boost tile granted a bonus move
    BoostEarned {
        player: PlayerId,
        token: TokenId,
        bonus: u8,
    },

    /// A power-up was consumed
    PowerUpUsed {
        player: PlayerId,
        kind: PowerUpKind,
        effect: PowerUpEffect,
    },

    /// A rewarded power-up is on offer
    RewardOffered { player: PlayerId, kind: PowerUpKind },

    /// A rewarded power-up was collected
    RewardClaimed { player: PlayerId, kind: PowerUpKind },

    /// A player lost their turn
    TurnSkipped { player: PlayerId, reason: SkipReason },

    /// Rolled a six, same player rolls again
    ExtraTurn { player: PlayerId },

    /// Turn ended
    TurnEnded {
        player: PlayerId,
        next_player: PlayerId,
    },

    /// A player won the game
    GameWon { player: PlayerId, turns: u32 },
}
