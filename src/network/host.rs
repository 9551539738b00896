//! Client Session Host
//!
//! Binds one client's outbound message channel to at most one running
//! [`GameSession`]. Socket framing lives elsewhere; the host only sees
//! command text coming in and [`ServerMessage`]s going out.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::SessionConfig;
use crate::network::protocol::{ClientCommand, ProtocolError, ServerMessage};
use crate::network::session::{GameSession, SessionError, SessionEvent};
use crate::strategies::StrategyRegistry;

/// Host errors.
#[derive(Debug, Error)]
pub enum HostError {
    /// The command could not be understood.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The new session failed to start.
    #[error(transparent)]
    Session(#[from] SessionError),
}

impl From<SessionEvent> for ServerMessage {
    fn from(event: SessionEvent) -> Self {
        match event {
            SessionEvent::Update(result) => ServerMessage::UpdateGame {
                tick: result.tick,
                entity_list: result.entities,
            },
            SessionEvent::Ended { tick, standings } => ServerMessage::GameOver { tick, standings },
        }
    }
}

/// One connected client.
pub struct ClientSession {
    config: SessionConfig,
    registry: Arc<StrategyRegistry>,
    outbound: mpsc::UnboundedSender<ServerMessage>,
    active: Option<GameSession>,
}

impl ClientSession {
    /// Host for a client reachable through `outbound`.
    pub fn new(
        config: SessionConfig,
        registry: Arc<StrategyRegistry>,
        outbound: mpsc::UnboundedSender<ServerMessage>,
    ) -> Self {
        Self {
            config,
            registry,
            outbound,
            active: None,
        }
    }

    /// The session currently bound to this client.
    pub fn active_session(&self) -> Option<&GameSession> {
        self.active.as_ref()
    }

    /// Parse and dispatch one inbound command.
    pub async fn handle_command(&mut self, text: &str) -> Result<(), HostError> {
        match ClientCommand::parse(text)? {
            ClientCommand::NewGame => {
                self.start_new_session().await?;
            }
        }
        Ok(())
    }

    /// Replace the active session with a fresh one and start it.
    ///
    /// The previous session is fully stopped before `init_game` goes out, so
    /// the client never sees its ticks interleaved with the new session's.
    pub async fn start_new_session(&mut self) -> Result<Uuid, SessionError> {
        self.stop_active().await;

        self.send(ServerMessage::InitGame {
            screen_width: self.config.screen_width,
            screen_height: self.config.screen_height,
        });

        let mut session = GameSession::new(self.config.clone(), Arc::clone(&self.registry));
        let outbound = self.outbound.clone();
        session
            .set_update_listener(move |event| {
                // a closed channel means the client is gone; disconnect() will stop us
                let _ = outbound.send(ServerMessage::from(event));
            })
            .await;

        session.initialize().await?;
        session.run().await?;

        let id = session.id();
        info!(session = %session.short_id(), "client session started");
        self.active = Some(session);
        Ok(id)
    }

    /// Stop the active session, if any.
    pub async fn disconnect(&mut self) {
        self.stop_active().await;
    }

    async fn stop_active(&mut self) {
        if let Some(mut session) = self.active.take() {
            session.stop().await;
            debug!(session = %session.short_id(), "previous session stopped");
        }
    }

    fn send(&self, message: ServerMessage) {
        if self.outbound.send(message).is_err() {
            debug!("client channel closed");
        }
    }
}
