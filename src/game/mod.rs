//! Game Logic Module
//!
//! The simulation itself. Single-threaded and seeded: given the same seed and
//! roster it produces the same snapshot stream.
//!
//! ## Module Structure
//!
//! - `entity`: Entity base, ids, sprite frames, snapshots
//! - `map`: Spatial map, placement checks, typed queries
//! - `player`: Strategy-driven player with inertia and cooldown
//! - `ability`: Channelled area ability with staged detonation
//! - `detonation`: Blast artifacts
//! - `strategy`: Strategy trait and read-only views
//! - `tick`: Per-tick stepping

pub mod ability;
pub mod detonation;
pub mod entity;
pub mod map;
pub mod player;
pub mod strategy;
pub mod tick;

// Re-export key types
pub use ability::{AbilityCast, CastPhase};
pub use detonation::Detonation;
pub use entity::{AnyEntity, Entity, EntityId, EntityKind, EntitySnapshot, Lifecycle};
pub use map::{Map, MapInfo, PlacementError};
pub use player::Player;
pub use strategy::{Action, AbilityView, DecisionContext, Direction, PlayerView, Strategy, StrategyFault};
pub use tick::{Simulation, Standing, TickResult};
