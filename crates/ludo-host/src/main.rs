//! Ludo Rush session host.
//!
//! Runs a batch of computer-only games side by side and prints the
//! resulting leaderboard as JSON.

use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod actor;
mod config;
mod host;
mod leaderboard;
mod protocol;
mod session;

use config::HostConfig;
use host::Host;
use protocol::{ClientMessage, ServerMessage};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = HostConfig::from_env()?;
    info!(
        "Starting {} games with {} {:?} bots each",
        config.games, config.players, config.difficulty
    );

    let host = Host::new(&config);
    let mut ids = Vec::with_capacity(config.games as usize);
    for index in 0..config.games {
        let handle = host.create_session(config.game_config(index))?;
        ids.push(handle.id);
    }

    let mut finished = 0;
    for id in ids {
        match host.wait_for(id).await? {
            Some(summary) => {
                finished += 1;
                let wins = host
                    .leaderboard
                    .get(&summary.winner_name)
                    .map_or(0, |entry| entry.wins);
                info!(
                    "Game {}: {} won in {} turns ({} wins so far)",
                    id, summary.winner_name, summary.turn_count, wins
                );
            }
            None => warn!("Game {} ended without a winner", id),
        }
    }
    info!("{} of {} games finished", finished, config.games);
    if host.leaderboard.is_empty() {
        warn!("No game produced a winner; leaderboard is empty");
    }

    let reply = host
        .handle_message(ClientMessage::Leaderboard {
            limit: host.leaderboard.len(),
            offset: 0,
        })
        .await;
    if let ServerMessage::Leaderboard { entries } = reply {
        println!("{}", serde_json::to_string_pretty(&entries)?);
    }

    Ok(())
}
