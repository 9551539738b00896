//! Game Session Management
//!
//! One session = one map, one roster, one timer. Sessions share nothing but
//! the immutable strategy registry, so any number of them can run side by
//! side on the same runtime.
//!
//! ```text
//! Created ──initialize()──► Initialized ──run()──► Running ──(match over / stop())──► Stopped
//! ```
//!
//! The timer task holds the session lock for the whole of a tick, so `stop()`
//! never cuts a tick in half: it signals the task, waits for it to finish and
//! only then marks the session stopped.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::SessionConfig;
use crate::core::rng::derive_session_seed;
use crate::game::map::PlacementError;
use crate::game::tick::{Simulation, Standing, TickResult};
use crate::strategies::{RegistryError, StrategyRegistry};

/// Session lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Built, nothing on the map yet.
    Created,
    /// Players placed, timer not started.
    Initialized,
    /// Timer running.
    Running,
    /// Finished or stopped. Terminal.
    Stopped,
}

/// Something the session reports to its listener.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// Entities after a tick (tick 0 is the initial placement).
    Update(TickResult),
    /// The match timer ran out.
    Ended {
        /// Final tick.
        tick: u32,
        /// Damage tally, least damaged first.
        standings: Vec<Standing>,
    },
}

/// Session errors.
#[derive(Debug, Error)]
pub enum SessionError {
    /// `run()` before `initialize()`.
    #[error("session has not been initialized")]
    NotInitialized,

    /// A player could not be placed.
    #[error(transparent)]
    Placement(#[from] PlacementError),

    /// The roster names a strategy that does not exist.
    #[error(transparent)]
    Roster(#[from] RegistryError),
}

/// Receives every session event, on the timer task.
pub type UpdateListener = Box<dyn FnMut(SessionEvent) + Send>;

struct SessionCore {
    state: SessionState,
    simulation: Option<Simulation>,
    listener: Option<UpdateListener>,
}

impl SessionCore {
    fn emit(&mut self, event: SessionEvent) {
        if let Some(listener) = self.listener.as_mut() {
            listener(event);
        }
    }

    /// Run one tick. Returns false once the timer should stop.
    fn advance(&mut self, session: &str) -> bool {
        if self.state != SessionState::Running {
            return false;
        }
        let Some(simulation) = self.simulation.as_mut() else {
            return false;
        };

        let result = simulation.step();
        let tick = result.tick;
        let standings = result.match_ended.then(|| simulation.standings());
        self.emit(SessionEvent::Update(result));

        match standings {
            Some(standings) => {
                info!(session, tick, "session ended");
                self.emit(SessionEvent::Ended { tick, standings });
                self.state = SessionState::Stopped;
                false
            }
            None => true,
        }
    }
}

struct TickTimer {
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

/// A single running match.
pub struct GameSession {
    id: Uuid,
    config: SessionConfig,
    registry: Arc<StrategyRegistry>,
    core: Arc<Mutex<SessionCore>>,
    timer: Option<TickTimer>,
}

impl GameSession {
    /// New session with a random id.
    pub fn new(config: SessionConfig, registry: Arc<StrategyRegistry>) -> Self {
        Self::with_id(Uuid::new_v4(), config, registry)
    }

    /// New session with a caller-chosen id.
    pub fn with_id(id: Uuid, config: SessionConfig, registry: Arc<StrategyRegistry>) -> Self {
        Self {
            id,
            config,
            registry,
            core: Arc::new(Mutex::new(SessionCore {
                state: SessionState::Created,
                simulation: None,
                listener: None,
            })),
            timer: None,
        }
    }

    /// Session id.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Short hex id for logs.
    pub fn short_id(&self) -> String {
        hex::encode(&self.id.as_bytes()[..4])
    }

    /// Configuration captured at construction.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Current lifecycle state.
    pub async fn state(&self) -> SessionState {
        self.core.lock().await.state
    }

    /// Ticks completed so far (0 before initialize).
    pub async fn tick(&self) -> u32 {
        let core = self.core.lock().await;
        core.simulation.as_ref().map(Simulation::tick).unwrap_or(0)
    }

    /// Current damage tally, if the session has been initialized.
    pub async fn standings(&self) -> Option<Vec<Standing>> {
        let core = self.core.lock().await;
        core.simulation.as_ref().map(Simulation::standings)
    }

    /// Replace the event listener.
    pub async fn set_update_listener(&self, listener: impl FnMut(SessionEvent) + Send + 'static) {
        self.core.lock().await.listener = Some(Box::new(listener));
    }

    /// Build the roster, place every player and emit the initial snapshot.
    ///
    /// Calling it again is a no-op.
    pub async fn initialize(&self) -> Result<(), SessionError> {
        let mut core = self.core.lock().await;
        if core.state != SessionState::Created {
            return Ok(());
        }

        let seed = self.config.seed.unwrap_or_else(|| derive_session_seed(&self.id));
        let mut simulation = Simulation::new(
            self.config.screen_width,
            self.config.screen_height,
            self.config.match_duration_ticks,
            seed,
        );
        let roster = self
            .registry
            .roster(self.config.strategies.as_deref(), simulation.rng_mut())?;
        let players = simulation.populate(roster)?;

        let snapshot = simulation.snapshot();
        core.simulation = Some(simulation);
        core.state = SessionState::Initialized;
        core.emit(SessionEvent::Update(snapshot));

        info!(session = %self.short_id(), players = players.len(), seed, "session initialized");
        Ok(())
    }

    /// Start the tick timer.
    ///
    /// Fails before [`GameSession::initialize`]; does nothing when already
    /// running or stopped.
    pub async fn run(&mut self) -> Result<(), SessionError> {
        {
            let mut core = self.core.lock().await;
            match core.state {
                SessionState::Created => return Err(SessionError::NotInitialized),
                SessionState::Running | SessionState::Stopped => return Ok(()),
                SessionState::Initialized => core.state = SessionState::Running,
            }
        }

        let (shutdown, mut shutdown_rx) = oneshot::channel::<()>();
        let core = Arc::clone(&self.core);
        let period = self.config.tick_interval;
        let session = self.short_id();

        let handle = tokio::spawn(async move {
            let mut ticks = interval_at(Instant::now() + period, period);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    biased;
                    _ = &mut shutdown_rx => break,
                    _ = ticks.tick() => {
                        if !core.lock().await.advance(&session) {
                            break;
                        }
                    }
                }
            }
            debug!(session = %session, "tick loop exited");
        });

        self.timer = Some(TickTimer { shutdown, handle });
        info!(session = %self.short_id(), period_us = period.as_micros() as u64, "session running");
        Ok(())
    }

    /// Cancel the timer and mark the session stopped.
    ///
    /// A tick already in progress completes first. Safe to call at any time,
    /// any number of times.
    pub async fn stop(&mut self) {
        if let Some(timer) = self.timer.take() {
            // the task may already have exited after the last tick
            let _ = timer.shutdown.send(());
            if let Err(err) = timer.handle.await {
                warn!(session = %self.short_id(), error = %err, "tick task failed");
            }
        }

        let mut core = self.core.lock().await;
        if matches!(core.state, SessionState::Initialized | SessionState::Running) {
            core.state = SessionState::Stopped;
            info!(session = %self.short_id(), "session stopped");
        }
    }
}

impl Drop for GameSession {
    fn drop(&mut self) {
        if let Some(timer) = self.timer.take() {
            let _ = timer.shutdown.send(());
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use tokio::sync::mpsc;

    use crate::game::entity::EntityKind;
    use crate::game::strategy::{Action, DecisionContext, Strategy, StrategyFault};

    struct Broken;

    impl Strategy for Broken {
        fn name(&self) -> &str {
            "broken"
        }

        fn decide(&mut self, _ctx: &DecisionContext<'_>) -> Result<Action, StrategyFault> {
            Err(StrategyFault::Failed("always fails".into()))
        }
    }

    fn config(ticks: u32) -> SessionConfig {
        SessionConfig {
            match_duration_ticks: ticks,
            seed: Some(7),
            ..SessionConfig::default()
        }
    }

    fn session(config: SessionConfig) -> GameSession {
        GameSession::new(config, Arc::new(StrategyRegistry::builtin()))
    }

    async fn listen(session: &GameSession) -> mpsc::UnboundedReceiver<SessionEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        session
            .set_update_listener(move |event| {
                let _ = tx.send(event);
            })
            .await;
        rx
    }

    async fn run_to_end(rx: &mut mpsc::UnboundedReceiver<SessionEvent>) -> (Vec<TickResult>, Vec<Standing>) {
        let mut updates = Vec::new();
        while let Some(event) = rx.recv().await {
            match event {
                SessionEvent::Update(result) => updates.push(result),
                SessionEvent::Ended { standings, .. } => return (updates, standings),
            }
        }
        panic!("listener closed before the session ended");
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_before_initialize_fails() {
        let mut session = session(config(10));
        assert!(matches!(session.run().await, Err(SessionError::NotInitialized)));
        assert_eq!(session.state().await, SessionState::Created);
    }

    #[tokio::test(start_paused = true)]
    async fn test_initialize_is_idempotent() {
        let session = session(config(10));
        let mut rx = listen(&session).await;

        session.initialize().await.unwrap();
        session.initialize().await.unwrap();

        let Some(SessionEvent::Update(first)) = rx.recv().await else {
            panic!("expected the initial snapshot");
        };
        assert_eq!(first.tick, 0);
        let players = first.entities.iter().filter(|e| e.kind == EntityKind::Player).count();
        assert_eq!(players, StrategyRegistry::builtin().len());
        assert!(rx.try_recv().is_err());
        assert_eq!(session.state().await, SessionState::Initialized);
    }

    #[tokio::test(start_paused = true)]
    async fn test_runs_to_completion() {
        let mut session = session(config(30));
        let mut rx = listen(&session).await;
        session.initialize().await.unwrap();
        session.run().await.unwrap();

        let (updates, standings) = run_to_end(&mut rx).await;
        let ticks: Vec<u32> = updates.iter().map(|u| u.tick).collect();
        assert_eq!(ticks, (0..=30).collect::<Vec<_>>());
        assert!(updates.last().unwrap().match_ended);
        assert_eq!(standings.len(), StrategyRegistry::builtin().len());

        // let the timer task observe the end
        tokio::task::yield_now().await;
        assert_eq!(session.state().await, SessionState::Stopped);
        assert_eq!(session.tick().await, 30);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_twice_and_before_initialize() {
        let mut session = session(config(1000));
        session.stop().await;
        session.stop().await;
        assert_eq!(session.state().await, SessionState::Created);

        session.initialize().await.unwrap();
        session.run().await.unwrap();
        session.stop().await;
        session.stop().await;
        assert_eq!(session.state().await, SessionState::Stopped);

        // stopped is terminal
        session.run().await.unwrap();
        assert_eq!(session.state().await, SessionState::Stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_halts_ticks() {
        let mut session = session(config(1000));
        let mut rx = listen(&session).await;
        session.initialize().await.unwrap();
        session.run().await.unwrap();

        for expected in 0..5 {
            match rx.recv().await {
                Some(SessionEvent::Update(result)) => assert_eq!(result.tick, expected),
                other => panic!("unexpected event: {other:?}"),
            }
        }
        session.stop().await;
        let stopped_at = session.tick().await;
        while rx.try_recv().is_ok() {}

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(rx.try_recv().is_err());
        assert_eq!(session.tick().await, stopped_at);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failing_strategy_never_stops_the_session() {
        let mut registry = StrategyRegistry::new();
        registry.register("broken", |_| Box::new(Broken));
        let config = SessionConfig {
            strategies: Some(vec!["broken".to_owned(), "broken".to_owned()]),
            ..config(20)
        };
        let mut session = GameSession::new(config, Arc::new(registry));
        let mut rx = listen(&session).await;
        session.initialize().await.unwrap();
        session.run().await.unwrap();

        let (updates, standings) = run_to_end(&mut rx).await;
        assert_eq!(updates.last().unwrap().tick, 20);
        assert!(standings.iter().all(|s| s.damage == 0 && s.username == "broken"));
        // nobody ever moved
        let positions = |result: &TickResult| {
            result
                .entities
                .iter()
                .map(|e| (e.id, e.x, e.y))
                .collect::<Vec<_>>()
        };
        assert_eq!(positions(updates.first().unwrap()), positions(updates.last().unwrap()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_strategy_fails_initialize() {
        let config = SessionConfig {
            strategies: Some(vec!["ghost".to_owned()]),
            ..config(10)
        };
        let session = session(config);

        let result = session.initialize().await;
        assert!(matches!(
            result,
            Err(SessionError::Roster(RegistryError::UnknownStrategy(name))) if name == "ghost"
        ));
        assert_eq!(session.state().await, SessionState::Created);
    }

    #[tokio::test(start_paused = true)]
    async fn test_same_seed_same_opening() {
        let a = session(config(10));
        let b = session(config(10));
        let mut rx_a = listen(&a).await;
        let mut rx_b = listen(&b).await;
        a.initialize().await.unwrap();
        b.initialize().await.unwrap();

        let (Some(SessionEvent::Update(first)), Some(SessionEvent::Update(second))) =
            (rx_a.recv().await, rx_b.recv().await)
        else {
            panic!("expected initial snapshots");
        };
        assert_eq!(first.entities, second.entities);
    }
}
