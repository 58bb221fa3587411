//! Player, token and power-up state.
//!
//! This module contains:
//! - Player colors and seat assignment
//! - Tokens with their shield counters
//! - Power-up kinds and their display metadata
//! - Player inventories, coins and lifetime counters

use crate::board::{PlayerId, Position, HOME, TOKENS_PER_PLAYER};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Number of turns a shield protects a token
pub const SHIELD_DURATION: u32 = 3;

/// Token identifier within its owner's set (0-3)
pub type TokenId = u8;

/// Player color, which also decides the entry cell on the track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerColor {
    Red,
    Blue,
    Green,
    Yellow,
}

impl PlayerColor {
    /// Seat order used when creating a game
    pub const SEATS: [PlayerColor; 4] = [
        PlayerColor::Red,
        PlayerColor::Blue,
        PlayerColor::Green,
        PlayerColor::Yellow,
    ];

    /// Get color for a player seat
    pub fn for_player(id: PlayerId) -> Self {
        Self::SEATS[id as usize % Self::SEATS.len()]
    }

    /// Which quarter of the track this color enters on.
    ///
    /// Yellow sits opposite red, so seats and quarters don't line up.
    pub fn quarter(&self) -> i32 {
        match self {
            PlayerColor::Red => 0,
            PlayerColor::Blue => 1,
            PlayerColor::Yellow => 2,
            PlayerColor::Green => 3,
        }
    }

    /// Lowercase name, used in token labels
    pub fn name(&self) -> &'static str {
        match self {
            PlayerColor::Red => "red",
            PlayerColor::Blue => "blue",
            PlayerColor::Green => "green",
            PlayerColor::Yellow => "yellow",
        }
    }

    /// Get hex color code for rendering
    pub fn hex_code(&self) -> u32 {
        match self {
            PlayerColor::Red => 0xEF4444,
            PlayerColor::Blue => 0x3B82F6,
            PlayerColor::Green => 0x22C55E,
            PlayerColor::Yellow => 0xEAB308,
        }
    }
}

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerUpKind {
    /// Protect a token from capture for 3 turns
    Shield,
    /// Double the next dice value
    SpeedBoost,
    /// Send an enemy token home
    Sniper,
    /// Roll the dice again
    Reroll,
    /// Jump a token to a random safe tile
    Teleport,
    /// Make an opponent skip their next turn
    Freeze,
}

impl PowerUpKind {
    /// All power-up types
    pub const ALL: [PowerUpKind; 6] = [
        PowerUpKind::Shield,
        PowerUpKind::SpeedBoost,
        PowerUpKind::Sniper,
        PowerUpKind::Reroll,
        PowerUpKind::Teleport,
        PowerUpKind::Freeze,
    ];

    /// Pick a power-up type uniformly at random
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }

    pub fn name(&self) -> &'static str {
        match self {
            PowerUpKind::Shield => "Shield",
            PowerUpKind::SpeedBoost => "Speed Boost",
            PowerUpKind::Sniper => "Sniper",
            PowerUpKind::Reroll => "Reroll",
            PowerUpKind::Teleport => "Teleport",
            PowerUpKind::Freeze => "Freeze",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            PowerUpKind::Shield => "Protect from capture for 3 turns",
            PowerUpKind::SpeedBoost => "Double your dice value",
            PowerUpKind::Sniper => "Capture any visible enemy",
            PowerUpKind::Reroll => "Roll the dice again",
            PowerUpKind::Teleport => "Jump to any safe tile",
            PowerUpKind::Freeze => "Skip opponent's next turn",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            PowerUpKind::Shield => "🛡️",
            PowerUpKind::SpeedBoost => "⚡",
            PowerUpKind::Sniper => "🎯",
            PowerUpKind::Reroll => "🔄",
            PowerUpKind::Teleport => "🌀",
            PowerUpKind::Freeze => "❄️",
        }
    }
}

/// A power-up held in a player's inventory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerUp {
    #[serde(rename = "type")]
    pub kind: PowerUpKind,
    pub name: String,
    pub description: String,
    pub icon: String,
}

impl PowerUp {
    /// Create a power-up with the standard metadata for its kind
    pub fn new(kind: PowerUpKind) -> Self {
        Self {
            kind,
            name: kind.name().to_string(),
            description: kind.description().to_string(),
            icon: kind.icon().to_string(),
        }
    }
}

impl From<PowerUpKind> for PowerUp {
    fn from(kind: PowerUpKind) -> Self {
        PowerUp::new(kind)
    }
}

/// A single game piece
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Index within the owner's tokens
    pub id: TokenId,
    pub color: PlayerColor,
    /// -1 home, 0..N-1 main track, N..N+5 finish lane, N+6 finished
    pub position: Position,
    pub is_shielded: bool,
    pub shield_turns: u32,
}

impl Token {
    /// Create a token waiting in its home base
    pub fn new(id: TokenId, color: PlayerColor) -> Self {
        Self {
            id,
            color,
            position: HOME,
            is_shielded: false,
            shield_turns: 0,
        }
    }

    /// Display label such as `red-2`
    pub fn label(&self) -> String {
        format!("{}-{}", self.color.name(), self.id)
    }

    pub fn is_home(&self) -> bool {
        self.position == HOME
    }

    /// Raise a shield for the given number of turns
    pub fn shield(&mut self, turns: u32) {
        self.is_shielded = turns > 0;
        self.shield_turns = turns;
    }

    /// Count down one turn of shield; the flag drops with the last turn
    pub fn tick_shield(&mut self) {
        if self.is_shielded && self.shield_turns > 0 {
            self.shield_turns -= 1;
            if self.shield_turns == 0 {
                self.is_shielded = false;
            }
        }
    }
}

/// A single player's state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Player ID (seat index 0-3)
    pub id: PlayerId,
    /// Display name
    pub name: String,
    /// Player color
    pub color: PlayerColor,
    /// The player's four tokens
    pub tokens: Vec<Token>,
    /// Whether the seat is played by the computer
    pub is_ai: bool,
    /// Unused power-ups
    pub power_ups: Vec<PowerUp>,
    /// Coins earned this game
    pub coins: u32,
    /// Consecutive moves with a capture
    pub capture_streak: u32,
    /// Tokens sent home this game (moves and sniper shots)
    pub captures: u32,
    /// Power-ups consumed this game
    pub power_ups_used: u32,
    /// Best capture streak reached this game
    pub longest_streak: u32,
}

impl Player {
    /// Create a new player with all tokens at home
    pub fn new(id: PlayerId, name: String, is_ai: bool) -> Self {
        let color = PlayerColor::for_player(id);
        Self {
            id,
            name,
            color,
            tokens: (0..TOKENS_PER_PLAYER as TokenId)
                .map(|i| Token::new(i, color))
                .collect(),
            is_ai,
            power_ups: Vec::new(),
            coins: 0,
            capture_streak: 0,
            captures: 0,
            power_ups_used: 0,
            longest_streak: 0,
        }
    }

    pub fn token(&self, id: TokenId) -> Option<&Token> {
        self.tokens.get(id as usize)
    }

    /// Check if player holds a power-up of given type
    pub fn has_power_up(&self, kind: PowerUpKind) -> bool {
        self.power_ups.iter().any(|p| p.kind == kind)
    }

    /// Add a power-up to the inventory
    pub fn grant_power_up(&mut self, kind: PowerUpKind) {
        self.power_ups.push(PowerUp::new(kind));
    }

    /// Consume one power-up of the given type (removes it from inventory)
    pub fn take_power_up(&mut self, kind: PowerUpKind) -> bool {
        if let Some(pos) = self.power_ups.iter().position(|p| p.kind == kind) {
            self.power_ups.remove(pos);
            self.power_ups_used += 1;
            true
        } else {
            false
        }
    }

    /// Register a capture made by a move and return the new streak
    pub fn record_capture(&mut self) -> u32 {
        self.captures += 1;
        self.capture_streak += 1;
        self.longest_streak = self.longest_streak.max(self.capture_streak);
        self.capture_streak
    }
}
