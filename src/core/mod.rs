//! Core primitives.
//!
//! Integer geometry and the seeded RNG. Nothing here depends on the game
//! modules.

pub mod rect;
pub mod rng;

// Re-export core types
pub use rect::{collide, distance, manhattan_distance, Bounded, Bounds, Offset, Rect};
pub use rng::DeterministicRng;
