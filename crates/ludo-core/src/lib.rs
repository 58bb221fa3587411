//! Ludo Rush - a Ludo variant with power-ups and special tiles
//!
//! This crate provides the core game logic for Ludo Rush, including:
//! - Board model with safe, boost, mystery, warp and coin tiles
//! - Player, token and power-up state
//! - Movement, capture and power-up rules
//! - Turn state machine with extra turns, triple-six and freeze handling
//! - Computer opponents at three difficulty levels
//!
//! # Architecture
//!
//! The engine is synchronous and does no I/O. All randomness comes from a
//! seedable generator owned by the game (or by each bot), so a seeded game
//! replays identically. It can be compiled to:
//! - Native Rust for hosting games on a server
//! - WebAssembly for playing in the browser
//!
//! # Modules
//!
//! - [`board`]: Track geometry and tile classification
//! - [`player`]: Players, tokens and power-ups
//! - [`rules`]: Movement, captures, tile effects and power-up effects
//! - [`game`]: Game state machine
//! - [`bot`]: Computer opponents
//! - [`summary`]: End-of-game results

pub mod actions;
pub mod board;
pub mod bot;
pub mod config;
pub mod game;
pub mod player;
pub mod rules;
pub mod summary;
#[cfg(feature = "wasm")]
pub mod wasm;

// Re-export commonly used types
pub use actions::{GameAction, GameEvent, PowerUpEffect, PowerUpTarget, SkipReason, TokenRef};
pub use board::{Board, BoardError, PlayerId, Position, TileKind, HOME};
pub use bot::{Bot, BotDifficulty, PowerUpDecision};
pub use config::GameConfig;
pub use game::{DiceState, GameError, GamePhase, GameState};
pub use player::{Player, PlayerColor, PowerUp, PowerUpKind, Token, TokenId};
pub use summary::{GameSummary, PlayerSummary};
