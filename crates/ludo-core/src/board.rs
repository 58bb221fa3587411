//! Track geometry and special tiles.
//!
//! This module contains:
//! - Position encoding for home base, main track, finish lanes and the finished state
//! - Tile classification (safe, boost, mystery, warp, coin)
//! - Per-color entry cells and lap arithmetic
//!
//! The board carries no geometry; renderers map positions to screen space themselves.

use crate::player::PlayerColor;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Player identifier (seat index 0-3)
pub type PlayerId = u8;

/// Encoded token position: see [`Board`] for the layout
pub type Position = i32;

/// Position of a token that has not entered the track yet
pub const HOME: Position = -1;

/// Track length of the standard board
pub const STANDARD_TRACK_LENGTH: i32 = 52;

/// Cells in each color's private finish lane
pub const FINISH_LANE_LENGTH: i32 = 6;

/// Tokens owned by every player
pub const TOKENS_PER_PLAYER: usize = 4;

/// Offsets of the special tiles from the start of each quarter of the track
const COIN_OFFSET: i32 = 2;
const BOOST_OFFSET: i32 = 4;
const WARP_OFFSET: i32 = 6;
const SAFE_OFFSET: i32 = 8;
const MYSTERY_OFFSET: i32 = 10;

/// Shortest quarter that still fits every special tile
const MIN_QUARTER_LENGTH: i32 = 12;

/// Tile classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileKind {
    Normal,
    /// Cannot be captured here
    Safe,
    /// Grants a bonus move
    Boost,
    /// Grants a random power-up
    Mystery,
    /// Sends the token to the next warp tile
    Warp,
    /// Grants bonus coins
    Coin,
}

/// A single cell of the main track
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub index: Position,
    pub kind: TileKind,
    /// Set on the entry cell of a color
    pub start_color: Option<PlayerColor>,
}

/// Errors raised when building a board
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum BoardError {
    #[error("Track length {0} is not a multiple of 4")]
    UnevenTrack(i32),

    #[error("Track length {0} is too short, need at least {min}", min = MIN_QUARTER_LENGTH * 4)]
    TrackTooShort(i32),
}

/// The static board.
///
/// Positions are encoded as plain integers:
/// - `-1`: home base
/// - `0..N`: main track cell, shared by all colors
/// - `N..N+6`: finish lane cell, private to the token's color
/// - `N+6`: finished
///
/// The board is never mutated once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    track_length: i32,
    tiles: Vec<Tile>,
    safe_tiles: Vec<Position>,
    warp_tiles: Vec<Position>,
}

impl Board {
    /// The standard 52-cell board
    pub fn standard() -> Self {
        Self::build(STANDARD_TRACK_LENGTH)
    }

    /// Build a board with a custom track length
    pub fn with_track_length(track_length: i32) -> Result<Self, BoardError> {
        if track_length % 4 != 0 {
            return Err(BoardError::UnevenTrack(track_length));
        }
        if track_length < MIN_QUARTER_LENGTH * 4 {
            return Err(BoardError::TrackTooShort(track_length));
        }
        Ok(Self::build(track_length))
    }

    fn build(track_length: i32) -> Self {
        let quarter = track_length / 4;

        let mut tiles: Vec<Tile> = (0..track_length)
            .map(|index| Tile {
                index,
                kind: TileKind::Normal,
                start_color: None,
            })
            .collect();

        for color in PlayerColor::SEATS {
            let start = color.quarter() * quarter;
            tiles[start as usize].kind = TileKind::Safe;
            tiles[start as usize].start_color = Some(color);

            for (offset, kind) in [
                (COIN_OFFSET, TileKind::Coin),
                (BOOST_OFFSET, TileKind::Boost),
                (WARP_OFFSET, TileKind::Warp),
                (SAFE_OFFSET, TileKind::Safe),
                (MYSTERY_OFFSET, TileKind::Mystery),
            ] {
                tiles[(start + offset) as usize].kind = kind;
            }
        }

        let of_kind = |kind: TileKind| -> Vec<Position> {
            tiles
                .iter()
                .filter(|t| t.kind == kind)
                .map(|t| t.index)
                .collect()
        };
        let safe_tiles = of_kind(TileKind::Safe);
        let warp_tiles = of_kind(TileKind::Warp);

        Self {
            track_length,
            tiles,
            safe_tiles,
            warp_tiles,
        }
    }

    /// Number of cells on the main track (N)
    pub fn track_length(&self) -> i32 {
        self.track_length
    }

    /// First finish-lane cell (N)
    pub fn finish_lane_start(&self) -> Position {
        self.track_length
    }

    /// The finished state (N+6)
    pub fn terminal(&self) -> Position {
        self.track_length + FINISH_LANE_LENGTH
    }

    /// Entry cell of a color
    pub fn entry(&self, color: PlayerColor) -> Position {
        color.quarter() * (self.track_length / 4)
    }

    /// All main-track tiles, indexed by position
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Get the tile at a main-track position
    pub fn tile(&self, position: Position) -> Option<&Tile> {
        if self.is_main_track(position) {
            self.tiles.get(position as usize)
        } else {
            None
        }
    }

    /// Tile kind at a position, `None` off the main track
    pub fn kind_at(&self, position: Position) -> Option<TileKind> {
        self.tile(position).map(|t| t.kind)
    }

    /// Whether captures are forbidden at this position
    pub fn is_safe(&self, position: Position) -> bool {
        self.kind_at(position) == Some(TileKind::Safe)
    }

    /// Safe tiles in track order, start tiles included
    pub fn safe_tiles(&self) -> &[Position] {
        &self.safe_tiles
    }

    /// Warp tiles in track order
    pub fn warp_tiles(&self) -> &[Position] {
        &self.warp_tiles
    }

    /// Warp destination for a warp tile, wrapping to the first one
    pub fn next_warp(&self, position: Position) -> Option<Position> {
        let idx = self.warp_tiles.iter().position(|&w| w == position)?;
        Some(self.warp_tiles[(idx + 1) % self.warp_tiles.len()])
    }

    pub fn is_home(&self, position: Position) -> bool {
        position == HOME
    }

    pub fn is_main_track(&self, position: Position) -> bool {
        (0..self.track_length).contains(&position)
    }

    pub fn is_finish_lane(&self, position: Position) -> bool {
        (self.finish_lane_start()..self.terminal()).contains(&position)
    }

    pub fn is_finished(&self, position: Position) -> bool {
        position == self.terminal()
    }

    /// Whether a position is inside the encoded range
    pub fn is_valid(&self, position: Position) -> bool {
        (HOME..=self.terminal()).contains(&position)
    }

    /// Distance travelled from a color's entry cell, for main-track positions
    pub fn lap_distance(&self, color: PlayerColor, position: Position) -> Option<i32> {
        if !self.is_main_track(position) {
            return None;
        }
        let n = self.track_length;
        Some((position - self.entry(color) + n) % n)
    }

    /// Total progress of a token along its own path.
    ///
    /// Home is 0, the entry cell 1, and every step adds one, so the
    /// finished state is the largest value for any color.
    pub fn progress(&self, color: PlayerColor, position: Position) -> i32 {
        if position == HOME {
            0
        } else if let Some(distance) = self.lap_distance(color, position) {
            distance + 1
        } else {
            // A full lap lands on the first lane cell
            position + 1
        }
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::standard()
    }
}
