//! Network Layer
//!
//! Session lifecycle and the message boundary to clients. This layer is
//! **non-deterministic** (wall-clock timers, random session ids); all game
//! logic runs through `game/`.
//!
//! ## Module Structure
//!
//! - `protocol`: Wire messages
//! - `session`: One timed match
//! - `host`: Per-client command handling

pub mod host;
pub mod protocol;
pub mod session;

pub use host::{ClientSession, HostError};
pub use protocol::{ClientCommand, ProtocolError, ServerMessage};
pub use session::{GameSession, SessionError, SessionEvent, SessionState};
