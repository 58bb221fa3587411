//! Session registry and request routing.

use crate::actor::{log_updates, spawn_session, Pacing, SessionHandle};
use crate::config::HostConfig;
use crate::leaderboard::Leaderboard;
use crate::protocol::{ClientMessage, ServerMessage};
use crate::session::{GameSession, SessionError};
use dashmap::DashMap;
use ludo_core::{GameConfig, GameSummary};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Host state shared by every caller.
pub struct Host {
    /// Handles of all sessions that have not been collected
    pub sessions: DashMap<Uuid, SessionHandle>,
    tasks: DashMap<Uuid, JoinHandle<Option<GameSummary>>>,
    pub leaderboard: Arc<Leaderboard>,
    pacing: Pacing,
    max_turns: u32,
}

impl Host {
    pub fn new(config: &HostConfig) -> Self {
        Self {
            sessions: DashMap::new(),
            tasks: DashMap::new(),
            leaderboard: Arc::new(Leaderboard::new()),
            pacing: Pacing {
                pace: config.pace,
                think_delays: config.think_delays,
            },
            max_turns: config.max_turns,
        }
    }

    /// Start a session and return a handle to it.
    pub fn create_session(&self, config: GameConfig) -> Result<SessionHandle, SessionError> {
        let id = Uuid::new_v4();
        let session = GameSession::new(id, config, self.max_turns)?;
        let spawned = spawn_session(session, self.pacing, self.leaderboard.clone());
        tokio::spawn(log_updates(id, spawned.updates));

        let handle = spawned.handle;
        self.sessions.insert(id, handle.clone());
        self.tasks.insert(id, spawned.task);
        info!("Session {} created", id);

        Ok(handle)
    }

    /// Wait for a session's task to stop and forget the session.
    ///
    /// Only the registry's handle is released here; callers holding their
    /// own clone keep a session with human seats alive.
    pub async fn wait_for(&self, id: Uuid) -> Result<Option<GameSummary>, SessionError> {
        self.sessions.remove(&id);
        let (_, task) = self.tasks.remove(&id).ok_or(SessionError::NotFound(id))?;

        match task.await {
            Ok(summary) => Ok(summary),
            Err(e) => {
                error!("Session {} task failed: {}", id, e);
                Err(SessionError::Closed)
            }
        }
    }

    fn handle(&self, id: Uuid) -> Result<SessionHandle, SessionError> {
        self.sessions
            .get(&id)
            .map(|h| h.clone())
            .ok_or(SessionError::NotFound(id))
    }

    /// Answer one client request.
    pub async fn handle_message(&self, msg: ClientMessage) -> ServerMessage {
        match self.route(msg).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!("Request failed: {}", e);
                ServerMessage::Error {
                    message: e.to_string(),
                }
            }
        }
    }

    async fn route(&self, msg: ClientMessage) -> Result<ServerMessage, SessionError> {
        match msg {
            ClientMessage::CreateSession { config } => {
                let handle = self.create_session(config)?;
                let session = handle.info().await?;
                Ok(ServerMessage::SessionCreated { session })
            }

            ClientMessage::GameAction {
                session_id,
                player,
                action,
            } => {
                let handle = self.handle(session_id)?;
                Ok(match handle.apply(player, action).await {
                    Ok(events) => ServerMessage::ActionResult {
                        success: true,
                        events,
                        error: None,
                    },
                    Err(e) => ServerMessage::ActionResult {
                        success: false,
                        events: Vec::new(),
                        error: Some(e.to_string()),
                    },
                })
            }

            ClientMessage::GetState { session_id } => {
                let state = self.handle(session_id)?.snapshot().await?;
                Ok(ServerMessage::GameState { state })
            }

            ClientMessage::ListSessions => {
                // Clone handles first so no map guard is held across an await
                let handles: Vec<SessionHandle> =
                    self.sessions.iter().map(|h| h.value().clone()).collect();

                let mut sessions = Vec::with_capacity(handles.len());
                for handle in handles {
                    // Stopped sessions no longer answer
                    if let Ok(info) = handle.info().await {
                        sessions.push(info);
                    }
                }
                Ok(ServerMessage::SessionList { sessions })
            }

            ClientMessage::Leaderboard { limit, offset } => Ok(ServerMessage::Leaderboard {
                entries: self.leaderboard.top(limit, offset),
            }),
        }
    }
}
