//! Arena Simulation Server
//!
//! Headless runner: plays one session to completion and logs the result.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use arena_sim::{
    network::session::{GameSession, SessionEvent},
    SessionConfig, StrategyRegistry, TICK_RATE, VERSION,
};

/// Progress report interval (10 simulated seconds).
const REPORT_EVERY_TICKS: u32 = TICK_RATE * 10;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env locally; safe to ignore when not present.
    let _ = dotenvy::dotenv();
    init_tracing();

    let config = SessionConfig::from_env();
    let registry = Arc::new(StrategyRegistry::builtin());

    info!("Arena Sim Server v{}", VERSION);
    info!("Tick Rate: {} Hz", TICK_RATE);
    info!(
        "Match Duration: {} ticks ({} seconds)",
        config.match_duration_ticks,
        config.match_duration_ticks / TICK_RATE
    );
    info!("Strategies: {}", registry.names().collect::<Vec<_>>().join(", "));

    let mut session = GameSession::new(config, registry);
    let (tx, mut rx) = mpsc::unbounded_channel();
    session
        .set_update_listener(move |event| {
            let _ = tx.send(event);
        })
        .await;

    session.initialize().await.context("failed to initialize session")?;
    session.run().await.context("failed to start session")?;
    info!("Session {} running", session.short_id());

    while let Some(event) = rx.recv().await {
        match event {
            SessionEvent::Update(result) => {
                if result.tick > 0 && result.tick % REPORT_EVERY_TICKS == 0 {
                    info!("Tick {}: {} entities", result.tick, result.entities.len());
                }
            }
            SessionEvent::Ended { tick, standings } => {
                info!("=== Match Results (tick {}) ===", tick);
                for (place, standing) in standings.iter().enumerate() {
                    info!(
                        "#{}: {} ({}) - damage {}",
                        place + 1,
                        standing.username,
                        standing.id,
                        standing.damage
                    );
                }
                break;
            }
        }
    }

    session.stop().await;
    Ok(())
}
