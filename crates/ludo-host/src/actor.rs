//! One task per session, owning the game and serializing every change to it.

use ludo_core::{GameAction, GameEvent, GameSummary, PlayerId};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::leaderboard::Leaderboard;
use crate::protocol::{ServerMessage, SessionInfo};
use crate::session::{GameSession, SessionError};

const COMMAND_BUFFER: usize = 32;
const UPDATE_BUFFER: usize = 256;

type Reply<T> = oneshot::Sender<T>;

/// Requests handled by a session task.
#[derive(Debug)]
pub enum SessionCommand {
    Apply {
        player: PlayerId,
        action: GameAction,
        reply: Reply<Result<Vec<GameEvent>, SessionError>>,
    },
    Snapshot {
        reply: Reply<serde_json::Value>,
    },
    Info {
        reply: Reply<SessionInfo>,
    },
}

/// Pacing of computer turns.
#[derive(Debug, Clone, Copy, Default)]
pub struct Pacing {
    pub pace: Duration,
    pub think_delays: bool,
}

/// Cloneable handle used to talk to a session task.
#[derive(Clone)]
pub struct SessionHandle {
    pub id: Uuid,
    commands: mpsc::Sender<SessionCommand>,
}

impl SessionHandle {
    pub async fn apply(
        &self,
        player: PlayerId,
        action: GameAction,
    ) -> Result<Vec<GameEvent>, SessionError> {
        let (reply, rx) = oneshot::channel();
        self.send(SessionCommand::Apply {
            player,
            action,
            reply,
        })
        .await?;
        rx.await.map_err(|_| SessionError::Closed)?
    }

    pub async fn snapshot(&self) -> Result<serde_json::Value, SessionError> {
        let (reply, rx) = oneshot::channel();
        self.send(SessionCommand::Snapshot { reply }).await?;
        rx.await.map_err(|_| SessionError::Closed)
    }

    pub async fn info(&self) -> Result<SessionInfo, SessionError> {
        let (reply, rx) = oneshot::channel();
        self.send(SessionCommand::Info { reply }).await?;
        rx.await.map_err(|_| SessionError::Closed)
    }

    async fn send(&self, command: SessionCommand) -> Result<(), SessionError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| SessionError::Closed)
    }
}

/// A started session: its handle, its update stream and its task.
pub struct SpawnedSession {
    pub handle: SessionHandle,
    /// Every update the session broadcasts, from its first turn on
    pub updates: broadcast::Receiver<ServerMessage>,
    pub task: JoinHandle<Option<GameSummary>>,
}

/// Start the task for a session.
///
/// The task stops when the game ends or hits its turn limit, or when every
/// handle is dropped while a human is to move. It resolves to the game's
/// summary if somebody won.
pub fn spawn_session(
    session: GameSession,
    pacing: Pacing,
    leaderboard: Arc<Leaderboard>,
) -> SpawnedSession {
    let (commands, rx) = mpsc::channel(COMMAND_BUFFER);
    // Subscribed before the task starts so no update is missed
    let (sender, updates) = broadcast::channel(UPDATE_BUFFER);

    let handle = SessionHandle {
        id: session.id,
        commands,
    };
    let task = tokio::spawn(run_session(session, rx, sender, pacing, leaderboard));

    SpawnedSession {
        handle,
        updates,
        task,
    }
}

/// Log a session's updates until it stops broadcasting
pub async fn log_updates(id: Uuid, mut updates: broadcast::Receiver<ServerMessage>) {
    loop {
        match updates.recv().await {
            Ok(ServerMessage::BotMoved { player, events }) => {
                debug!("Session {}: bot {} moved ({} events)", id, player, events.len());
            }
            Ok(ServerMessage::TurnChanged { player }) => {
                debug!("Session {}: player {} to move", id, player);
            }
            Ok(ServerMessage::GameOver { summary }) => {
                debug!("Session {}: game over after {} turns", id, summary.turn_count);
            }
            Ok(ServerMessage::TurnLimitReached { turns }) => {
                debug!("Session {}: stopped at {} turns", id, turns);
            }
            Ok(_) => {}
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!("Session {}: update log skipped {} messages", id, skipped);
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

async fn run_session(
    mut session: GameSession,
    mut commands: mpsc::Receiver<SessionCommand>,
    updates: broadcast::Sender<ServerMessage>,
    pacing: Pacing,
    leaderboard: Arc<Leaderboard>,
) -> Option<GameSummary> {
    info!("Session {} started", session.id);

    while !session.is_over() {
        if session.is_bot_turn() {
            // Answer queued requests between computer turns
            while let Ok(command) = commands.try_recv() {
                handle_command(&mut session, command, &updates);
            }

            let delay = session.bot_delay(pacing.pace, pacing.think_delays);
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            match session.play_bot_turn() {
                Ok(Some((player, events))) => {
                    let _ = updates.send(ServerMessage::BotMoved { player, events });
                    announce_turn(&session, &updates);
                }
                Ok(None) => {}
                Err(e) => {
                    warn!("Session {}: bot failed: {}", session.id, e);
                    break;
                }
            }
            continue;
        }

        match commands.recv().await {
            Some(command) => handle_command(&mut session, command, &updates),
            None => {
                info!("Session {} has no clients left", session.id);
                break;
            }
        }
    }

    let summary = session.summary();
    match &summary {
        Some(summary) => {
            info!(
                "Session {} won by {} after {} turns",
                session.id, summary.winner_name, summary.turn_count
            );
            leaderboard.record(summary);
            let _ = updates.send(ServerMessage::GameOver {
                summary: summary.clone(),
            });
        }
        None if session.is_over() => {
            warn!(
                "Session {} stopped without a winner after {} turns",
                session.id, session.game.turn_count
            );
            let _ = updates.send(ServerMessage::TurnLimitReached {
                turns: session.game.turn_count,
            });
        }
        None => {}
    }

    summary
}

fn handle_command(
    session: &mut GameSession,
    command: SessionCommand,
    updates: &broadcast::Sender<ServerMessage>,
) {
    match command {
        SessionCommand::Apply {
            player,
            action,
            reply,
        } => {
            let before = session.game.current_player;
            let result = session.apply_action(player, action);
            if let Err(e) = &result {
                debug!("Session {}: rejected action from {}: {}", session.id, player, e);
            }
            if session.game.current_player != before {
                announce_turn(session, updates);
            }
            let _ = reply.send(result);
        }
        SessionCommand::Snapshot { reply } => {
            let _ = reply.send(session.state_json());
        }
        SessionCommand::Info { reply } => {
            let _ = reply.send(session.to_info());
        }
    }
}

fn announce_turn(session: &GameSession, updates: &broadcast::Sender<ServerMessage>) {
    if !session.is_over() {
        let _ = updates.send(ServerMessage::TurnChanged {
            player: session.game.current_player,
        });
    }
}
