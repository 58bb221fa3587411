//! End-of-game results for leaderboards and player statistics.

use crate::board::PlayerId;
use crate::game::GameState;
use crate::player::PlayerColor;
use serde::{Deserialize, Serialize};

/// One player's line in the final results
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSummary {
    pub id: PlayerId,
    pub name: String,
    pub color: PlayerColor,
    pub is_ai: bool,
    /// 1 for the winner, then by how far each player got
    pub placement: u8,
    pub tokens_finished: u8,
    pub captures: u32,
    pub power_ups_used: u32,
    pub coins: u32,
    pub longest_streak: u32,
}

/// Results of a finished game
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSummary {
    pub winner: PlayerId,
    pub winner_name: String,
    pub turn_count: u32,
    /// Players in placement order
    pub players: Vec<PlayerSummary>,
}

impl GameSummary {
    /// Build the summary of a game; `None` until somebody has won
    pub fn from_state(state: &GameState) -> Option<Self> {
        let winner = state.get_winner()?;
        let board = &state.board;

        let mut order: Vec<(PlayerId, i32)> = state
            .players
            .iter()
            .map(|p| {
                let progress = p
                    .tokens
                    .iter()
                    .map(|t| board.progress(p.color, t.position))
                    .sum::<i32>();
                (p.id, progress)
            })
            .collect();

        // Winner first, then total progress; the stable sort keeps seat order on ties
        order.sort_by_key(|&(id, progress)| (id != winner.id, -progress));

        let players = order
            .iter()
            .enumerate()
            .filter_map(|(rank, &(id, _))| {
                let p = state.get_player(id)?;
                Some(PlayerSummary {
                    id,
                    name: p.name.clone(),
                    color: p.color,
                    is_ai: p.is_ai,
                    placement: rank as u8 + 1,
                    tokens_finished: p
                        .tokens
                        .iter()
                        .filter(|t| board.is_finished(t.position))
                        .count() as u8,
                    captures: p.captures,
                    power_ups_used: p.power_ups_used,
                    coins: p.coins,
                    longest_streak: p.longest_streak,
                })
            })
            .collect();

        Some(Self {
            winner: winner.id,
            winner_name: winner.name.clone(),
            turn_count: state.turn_count,
            players,
        })
    }

    /// The line for one player
    pub fn player(&self, id: PlayerId) -> Option<&PlayerSummary> {
        self.players.iter().find(|p| p.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bot::BotDifficulty;
    use crate::config::GameConfig;
    use crate::game::GamePhase;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_no_summary_while_playing() {
        let game = GameState::new(GameConfig::new(2, 0, BotDifficulty::Easy).with_seed(1)).unwrap();
        assert_eq!(game.summary(), None);
    }

    #[test]
    fn test_placement_order() {
        let mut game =
            GameState::new(GameConfig::new(4, 0, BotDifficulty::Easy).with_seed(1)).unwrap();
        let terminal = game.board.terminal();

        for token in &mut game.players[2].tokens {
            token.position = terminal;
        }
        game.players[3].tokens[0].position = 45;
        game.players[1].tokens[0].position = 20;
        game.players[2].captures = 3;
        game.players[2].coins = 230;
        game.winner = Some(2);
        game.phase = GamePhase::GameOver;
        game.turn_count = 41;

        let summary = game.summary().unwrap();
        assert_eq!(summary.winner, 2);
        assert_eq!(summary.turn_count, 41);

        let order: Vec<PlayerId> = summary.players.iter().map(|p| p.id).collect();
        // Yellow's 45 is 19 cells into its lap, blue's 20 only 7; red never left home
        assert_eq!(order, vec![2, 3, 1, 0]);

        let winner = summary.player(2).unwrap();
        assert_eq!(winner.placement, 1);
        assert_eq!(winner.tokens_finished, 4);
        assert_eq!(winner.captures, 3);
        assert_eq!(winner.coins, 230);
        assert_eq!(summary.player(0).unwrap().placement, 4);
    }

    #[test]
    fn test_ties_keep_seat_order() {
        let mut game =
            GameState::new(GameConfig::new(3, 0, BotDifficulty::Easy).with_seed(1)).unwrap();
        let terminal = game.board.terminal();
        for token in &mut game.players[1].tokens {
            token.position = terminal;
        }
        game.winner = Some(1);
        game.phase = GamePhase::GameOver;

        let summary = game.summary().unwrap();
        let order: Vec<PlayerId> = summary.players.iter().map(|p| p.id).collect();
        assert_eq!(order, vec![1, 0, 2]);
    }
}
