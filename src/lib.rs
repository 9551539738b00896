//! # Arena Simulation Server
//!
//! Tick-based arena simulation: autonomous players, each driven by a
//! pluggable strategy, walk a bounded grid, cast area abilities at each other
//! and collect damage until the match timer runs out.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   ARENA SIM SERVER                           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Deterministic primitives                  │
//! │  ├── rect.rs     - Integer rectangles and collision          │
//! │  └── rng.rs      - Deterministic Xorshift128+ PRNG           │
//! │                                                              │
//! │  game/           - Simulation (deterministic)                │
//! │  ├── entity.rs   - Entity base, ids, snapshots               │
//! │  ├── map.rs      - Spatial map and placement                 │
//! │  ├── player.rs   - Strategy-driven players                   │
//! │  ├── ability.rs  - Channelled ability casts                  │
//! │  ├── detonation.rs - Blast artifacts                         │
//! │  ├── strategy.rs - Strategy trait and read-only views        │
//! │  └── tick.rs     - Per-tick stepping                         │
//! │                                                              │
//! │  strategies/     - Built-in strategies and registry          │
//! │                                                              │
//! │  network/        - Sessions (non-deterministic)              │
//! │  ├── protocol.rs - Message types                             │
//! │  ├── session.rs  - Timed session lifecycle                   │
//! │  └── host.rs     - Per-client command handling               │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism Guarantee
//!
//! The `core/`, `game/` and `strategies/` modules are deterministic:
//! - Integer geometry only
//! - No HashMap (uses BTreeMap for sorted iteration)
//! - No system time dependencies
//! - All randomness from seeded Xorshift128+
//!
//! Given the same seed and roster, two sessions produce the same snapshot
//! stream.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod config;
pub mod core;
pub mod game;
pub mod network;
pub mod strategies;

// Re-export commonly used types
pub use config::SessionConfig;
pub use core::rect::Rect;
pub use core::rng::DeterministicRng;
pub use game::map::Map;
pub use game::strategy::{Action, DecisionContext, Direction, Strategy};
pub use game::tick::Simulation;
pub use network::session::GameSession;
pub use strategies::StrategyRegistry;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Simulation tick rate (Hz)
pub const TICK_RATE: u32 = 60;

/// Match duration in ticks (5 minutes * 60 Hz)
pub const MATCH_DURATION_TICKS: u32 = 18_000;

/// Default map width
pub const SCREEN_WIDTH: i32 = 500;

/// Default map height
pub const SCREEN_HEIGHT: i32 = 400;
