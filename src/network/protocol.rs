//! Protocol Messages
//!
//! Wire format between a session host and its client. Server messages are
//! JSON objects of the form `{"type": ..., "data": {...}}`; the client only
//! ever sends one command, either as bare text or as a tagged JSON object.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::game::entity::EntitySnapshot;
use crate::game::tick::Standing;

/// Protocol failures.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Malformed JSON.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Well-formed input that is not a known command.
    #[error("unknown command: {0}")]
    UnknownCommand(String),
}

// =============================================================================
// CLIENT -> SERVER MESSAGES
// =============================================================================

/// Commands a client can send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientCommand {
    /// Stop whatever is running and start a fresh session.
    NewGame,
}

impl ClientCommand {
    const NEW_GAME: &'static str = "new_game";

    /// Parse `new_game` or `{"type":"new_game"}`.
    pub fn parse(text: &str) -> Result<Self, ProtocolError> {
        let text = text.trim();
        if !text.starts_with('{') {
            return Self::from_name(text);
        }

        let value: serde_json::Value = serde_json::from_str(text)?;
        match value.get("type").and_then(|kind| kind.as_str()) {
            Some(name) => Self::from_name(name),
            None => Err(ProtocolError::UnknownCommand(text.to_owned())),
        }
    }

    fn from_name(name: &str) -> Result<Self, ProtocolError> {
        match name {
            Self::NEW_GAME => Ok(ClientCommand::NewGame),
            other => Err(ProtocolError::UnknownCommand(other.to_owned())),
        }
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

// =============================================================================
// SERVER -> CLIENT MESSAGES
// =============================================================================

/// Messages sent from server to client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ServerMessage {
    /// A new session is about to start on a map of this size.
    InitGame {
        /// Map width.
        screen_width: i32,
        /// Map height.
        screen_height: i32,
    },

    /// Entities after a tick, in map order.
    UpdateGame {
        /// Tick just completed (0 for the initial snapshot).
        tick: u32,
        /// One snapshot per live entity.
        entity_list: Vec<EntitySnapshot>,
    },

    /// The match timer ran out.
    GameOver {
        /// Final tick.
        tick: u32,
        /// Damage tally, least damaged first.
        standings: Vec<Standing>,
    },
}

impl ServerMessage {
    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::detonation::Detonation;
    use crate::game::entity::{Entity, EntityId};

    #[test]
    fn test_parse_new_game() {
        assert_eq!(ClientCommand::parse("new_game").unwrap(), ClientCommand::NewGame);
        assert_eq!(ClientCommand::parse("  new_game\n").unwrap(), ClientCommand::NewGame);
        assert_eq!(
            ClientCommand::parse(r#"{"type":"new_game"}"#).unwrap(),
            ClientCommand::NewGame
        );
    }

    #[test]
    fn test_command_json_matches_parser() {
        let json = ClientCommand::NewGame.to_json().unwrap();
        assert_eq!(json, r#"{"type":"new_game"}"#);
        assert_eq!(ClientCommand::parse(&json).unwrap(), ClientCommand::NewGame);
    }

    #[test]
    fn test_unknown_commands() {
        assert!(matches!(
            ClientCommand::parse("start"),
            Err(ProtocolError::UnknownCommand(name)) if name == "start"
        ));
        assert!(matches!(
            ClientCommand::parse(r#"{"type":"pause"}"#),
            Err(ProtocolError::UnknownCommand(name)) if name == "pause"
        ));
        assert!(matches!(
            ClientCommand::parse(r#"{"kind":"new_game"}"#),
            Err(ProtocolError::UnknownCommand(_))
        ));
        assert!(matches!(ClientCommand::parse("{not json"), Err(ProtocolError::Json(_))));
    }

    #[test]
    fn test_init_game_shape() {
        let msg = ServerMessage::InitGame {
            screen_width: 500,
            screen_height: 400,
        };
        let value: serde_json::Value = serde_json::from_str(&msg.to_json().unwrap()).unwrap();

        assert_eq!(value["type"], "init_game");
        assert_eq!(value["data"]["screen_width"], 500);
        assert_eq!(value["data"]["screen_height"], 400);
    }

    #[test]
    fn test_update_game_carries_snapshots() {
        let blast = Detonation::new(EntityId(7), 40, 50);
        let msg = ServerMessage::UpdateGame {
            tick: 3,
            entity_list: vec![blast.snapshot()],
        };
        let json = msg.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["type"], "update_game");
        assert_eq!(value["data"]["tick"], 3);
        let entity = &value["data"]["entity_list"][0];
        assert_eq!(entity["type"], "Explosion");
        assert_eq!(entity["id"], 7);
        assert_eq!(entity["x"], 40);
        assert!(entity.get("username").is_none());

        assert_eq!(ServerMessage::from_json(&json).unwrap(), msg);
    }

    #[test]
    fn test_game_over_standings() {
        let msg = ServerMessage::GameOver {
            tick: 18_000,
            standings: vec![Standing {
                id: EntityId(2),
                username: "hunter".to_owned(),
                damage: 4,
            }],
        };
        let value: serde_json::Value = serde_json::from_str(&msg.to_json().unwrap()).unwrap();

        assert_eq!(value["type"], "game_over");
        assert_eq!(value["data"]["standings"][0]["username"], "hunter");
        assert_eq!(value["data"]["standings"][0]["damage"], 4);
    }
}
