//! In-memory leaderboard fed by finished games.

use dashmap::DashMap;
use ludo_core::GameSummary;
use serde::{Deserialize, Serialize};

/// Lifetime statistics for one player name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub username: String,
    pub wins: u32,
    pub losses: u32,
    pub games_played: u32,
    pub total_captures: u32,
    pub power_ups_used: u32,
    pub longest_streak: u32,
    /// Fewest turns needed for a win
    pub fastest_win: Option<u32>,
    /// 1-based position, filled in when a page is read
    pub rank: u32,
}

impl LeaderboardEntry {
    fn new(username: String) -> Self {
        Self {
            username,
            wins: 0,
            losses: 0,
            games_played: 0,
            total_captures: 0,
            power_ups_used: 0,
            longest_streak: 0,
            fastest_win: None,
            rank: 0,
        }
    }
}

/// Player statistics keyed by display name.
#[derive(Default)]
pub struct Leaderboard {
    entries: DashMap<String, LeaderboardEntry>,
}

impl Leaderboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a finished game into every participant's entry
    pub fn record(&self, summary: &GameSummary) {
        for line in &summary.players {
            let mut entry = self
                .entries
                .entry(line.name.clone())
                .or_insert_with(|| LeaderboardEntry::new(line.name.clone()));

            entry.games_played += 1;
            entry.total_captures += line.captures;
            entry.power_ups_used += line.power_ups_used;
            entry.longest_streak = entry.longest_streak.max(line.longest_streak);

            if line.id == summary.winner {
                entry.wins += 1;
                entry.fastest_win = Some(match entry.fastest_win {
                    Some(best) => best.min(summary.turn_count),
                    None => summary.turn_count,
                });
            } else {
                entry.losses += 1;
            }
        }
    }

    /// Entries ordered by wins, then fewer games played, then name
    pub fn top(&self, limit: usize, offset: usize) -> Vec<LeaderboardEntry> {
        let mut entries: Vec<LeaderboardEntry> =
            self.entries.iter().map(|e| e.value().clone()).collect();

        entries.sort_by(|a, b| {
            b.wins
                .cmp(&a.wins)
                .then(a.games_played.cmp(&b.games_played))
                .then_with(|| a.username.cmp(&b.username))
        });

        entries
            .into_iter()
            .enumerate()
            .skip(offset)
            .take(limit)
            .map(|(i, mut entry)| {
                entry.rank = i as u32 + 1;
                entry
            })
            .collect()
    }

    pub fn get(&self, username: &str) -> Option<LeaderboardEntry> {
        self.entries.get(username).map(|e| e.value().clone())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
