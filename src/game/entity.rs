//! Entity Model
//!
//! Identity, footprint, obstacle flag and sprite-frame bookkeeping shared by
//! every simulated object. Concrete kinds (players, ability casts and
//! detonations) embed an [`EntityBase`] and implement [`Entity`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::rect::{Bounded, Rect};
use crate::game::ability::AbilityCast;
use crate::game::detonation::Detonation;
use crate::game::map::Map;
use crate::game::player::Player;

/// Unique entity identifier. Allocated from 1 upwards, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Monotonic id source owned by a map.
#[derive(Debug, Clone)]
pub struct IdAllocator {
    next: u32,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdAllocator {
    /// First id handed out is 1.
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Take the next id.
    pub fn allocate(&mut self) -> EntityId {
        let id = EntityId(self.next);
        self.next += 1;
        id
    }
}

/// Entity kinds, declared in map precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityKind {
    /// Channelling area ability.
    #[serde(rename = "Magic")]
    AbilityCast,
    /// Strategy-driven player.
    #[serde(rename = "Player")]
    Player,
    /// Short-lived blast artifact.
    #[serde(rename = "Explosion")]
    Detonation,
}

/// Outcome of one advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// Keep the entity registered.
    Alive,
    /// The entity removed itself from the map.
    Expired,
}

/// Sprite sheet layout for an entity kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpriteSheet {
    /// Asset path handed to clients.
    pub path: String,
    /// Tile width in pixels.
    pub tile_width: i32,
    /// Tile height in pixels.
    pub tile_height: i32,
    /// Tiles per row.
    pub cols: usize,
    /// Tile rows.
    pub rows: usize,
    /// Draw order.
    pub z_index: i32,
}

impl SpriteSheet {
    /// Number of tiles on the sheet.
    pub fn frame_count(&self) -> usize {
        self.cols * self.rows
    }

    /// Tile offsets, enumerated row by row.
    fn frame_offsets(&self) -> Vec<(i32, i32)> {
        let mut offsets = Vec::with_capacity(self.frame_count());
        for row in 0..self.rows {
            for col in 0..self.cols {
                offsets.push((-(col as i32) * self.tile_width, -(row as i32) * self.tile_height));
            }
        }
        offsets
    }
}

/// State common to all entities.
#[derive(Debug, Clone)]
pub struct EntityBase {
    id: EntityId,
    rect: Rect,
    is_obstacle: bool,
    sheet: SpriteSheet,
    frame_offsets: Vec<(i32, i32)>,
    frames: Vec<usize>,
    frame_index: usize,
}

impl EntityBase {
    /// New entity at the origin using every frame of `sheet`.
    pub fn new(id: EntityId, width: i32, height: i32, sheet: SpriteSheet, is_obstacle: bool) -> Self {
        let frame_offsets = sheet.frame_offsets();
        let frames = (0..frame_offsets.len()).collect();

        Self {
            id,
            rect: Rect::new(width, height, 0, 0),
            is_obstacle,
            sheet,
            frame_offsets,
            frames,
            frame_index: 0,
        }
    }

    /// Identity.
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Footprint copy; mutating it never touches the entity.
    pub fn rectangle(&self) -> Rect {
        self.rect
    }

    /// Center x.
    pub fn x(&self) -> i32 {
        self.rect.x()
    }

    /// Center y.
    pub fn y(&self) -> i32 {
        self.rect.y()
    }

    /// Width.
    pub fn width(&self) -> i32 {
        self.rect.width()
    }

    /// Height.
    pub fn height(&self) -> i32 {
        self.rect.height()
    }

    /// Whether this entity blocks placement.
    pub fn is_obstacle(&self) -> bool {
        self.is_obstacle
    }

    /// Move the center; the footprint follows.
    pub fn set_position(&mut self, x: i32, y: i32) {
        self.rect.set_position(x, y);
    }

    /// Replace the active frame list and rewind to its first frame.
    ///
    /// Indices outside the sheet are dropped; an empty result keeps frame 0.
    pub fn set_frames(&mut self, frames: &[usize]) {
        let mut frames: Vec<usize> = frames
            .iter()
            .copied()
            .filter(|frame| *frame < self.frame_offsets.len())
            .collect();
        if frames.is_empty() {
            frames.push(0);
        }
        self.frames = frames;
        self.frame_index = 0;
    }

    /// Step to the next frame of the active list, wrapping around.
    pub fn advance_frame(&mut self) {
        if !self.frames.is_empty() {
            self.frame_index = (self.frame_index + 1) % self.frames.len();
        }
    }

    /// Sheet tile currently shown.
    pub fn current_frame(&self) -> usize {
        self.frames.get(self.frame_index).copied().unwrap_or(0)
    }

    /// Transport snapshot without kind-specific details.
    pub fn snapshot(&self, kind: EntityKind) -> EntitySnapshot {
        let (tile_x, tile_y) = self
            .frame_offsets
            .get(self.current_frame())
            .copied()
            .unwrap_or((0, 0));

        EntitySnapshot {
            kind,
            id: self.id,
            width: self.width(),
            height: self.height(),
            sprite_path: self.sheet.path.clone(),
            sprite_tile_width: self.sheet.tile_width,
            sprite_tile_height: self.sheet.tile_height,
            sprite_tile_x: tile_x,
            sprite_tile_y: tile_y,
            sprite_z_index: self.sheet.z_index,
            x: self.x(),
            y: self.y(),
            player: None,
        }
    }
}

/// Per-tick behaviour of a simulated object.
pub trait Entity {
    /// Shared state.
    fn base(&self) -> &EntityBase;

    /// Kind tag.
    fn kind(&self) -> EntityKind;

    /// Run one tick of the entity's state machine.
    ///
    /// The entity is not registered in `map` while this runs. Returning
    /// [`Lifecycle::Expired`] keeps it out for good.
    fn advance(&mut self, map: &mut Map) -> Lifecycle;

    /// Transport snapshot.
    fn snapshot(&self) -> EntitySnapshot {
        self.base().snapshot(self.kind())
    }

    /// Identity.
    fn id(&self) -> EntityId {
        self.base().id()
    }

    /// Footprint copy.
    fn rectangle(&self) -> Rect {
        self.base().rectangle()
    }

    /// Whether this entity blocks placement.
    fn is_obstacle(&self) -> bool {
        self.base().is_obstacle()
    }
}

/// Player-only snapshot fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerDetails {
    /// Strategy display name.
    pub username: String,
    /// Accumulated damage.
    pub damage: u32,
}

/// Everything a client needs to draw one entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySnapshot {
    /// Kind tag.
    #[serde(rename = "type")]
    pub kind: EntityKind,
    /// Entity id.
    pub id: EntityId,
    /// Width.
    pub width: i32,
    /// Height.
    pub height: i32,
    /// Sprite sheet path.
    pub sprite_path: String,
    /// Tile width.
    pub sprite_tile_width: i32,
    /// Tile height.
    pub sprite_tile_height: i32,
    /// Current tile x offset.
    pub sprite_tile_x: i32,
    /// Current tile y offset.
    pub sprite_tile_y: i32,
    /// Draw order.
    pub sprite_z_index: i32,
    /// Center x.
    pub x: i32,
    /// Center y.
    pub y: i32,
    /// Present for players only.
    #[serde(flatten)]
    pub player: Option<PlayerDetails>,
}

/// Owned entity of any kind, as stored and moved by the map.
pub enum AnyEntity {
    /// Ability cast.
    AbilityCast(AbilityCast),
    /// Player.
    Player(Player),
    /// Detonation.
    Detonation(Detonation),
}

impl AnyEntity {
    fn inner(&self) -> &dyn Entity {
        match self {
            AnyEntity::AbilityCast(cast) => cast,
            AnyEntity::Player(player) => player,
            AnyEntity::Detonation(detonation) => detonation,
        }
    }
}

impl Entity for AnyEntity {
    fn base(&self) -> &EntityBase {
        self.inner().base()
    }

    fn kind(&self) -> EntityKind {
        self.inner().kind()
    }

    fn advance(&mut self, map: &mut Map) -> Lifecycle {
        match self {
            AnyEntity::AbilityCast(cast) => cast.advance(map),
            AnyEntity::Player(player) => player.advance(map),
            AnyEntity::Detonation(detonation) => detonation.advance(map),
        }
    }

    fn snapshot(&self) -> EntitySnapshot {
        self.inner().snapshot()
    }
}

impl From<AbilityCast> for AnyEntity {
    fn from(cast: AbilityCast) -> Self {
        AnyEntity::AbilityCast(cast)
    }
}

impl From<Player> for AnyEntity {
    fn from(player: Player) -> Self {
        AnyEntity::Player(player)
    }
}

impl From<Detonation> for AnyEntity {
    fn from(detonation: Detonation) -> Self {
        AnyEntity::Detonation(detonation)
    }
}

impl Bounded for AnyEntity {
    fn rect(&self) -> Rect {
        self.rectangle()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet() -> SpriteSheet {
        SpriteSheet {
            path: "/test.png".into(),
            tile_width: 32,
            tile_height: 16,
            cols: 3,
            rows: 2,
            z_index: 1,
        }
    }

    #[test]
    fn test_ids_start_at_one() {
        let mut ids = IdAllocator::new();
        assert_eq!(ids.allocate(), EntityId(1));
        assert_eq!(ids.allocate(), EntityId(2));
    }

    #[test]
    fn test_kind_order_is_precedence() {
        assert!(EntityKind::AbilityCast < EntityKind::Player);
        assert!(EntityKind::Player < EntityKind::Detonation);
    }

    #[test]
    fn test_frame_offsets_row_major() {
        let base = EntityBase::new(EntityId(1), 32, 32, sheet(), false);
        assert_eq!(base.frame_offsets, vec![(0, 0), (-32, 0), (-64, 0), (0, -16), (-32, -16), (-64, -16)]);
    }

    #[test]
    fn test_advance_frame_wraps() {
        let mut base = EntityBase::new(EntityId(1), 32, 32, sheet(), false);
        base.set_frames(&[3, 4]);
        assert_eq!(base.current_frame(), 3);
        base.advance_frame();
        assert_eq!(base.current_frame(), 4);
        base.advance_frame();
        assert_eq!(base.current_frame(), 3);

        let snap = base.snapshot(EntityKind::Detonation);
        assert_eq!((snap.sprite_tile_x, snap.sprite_tile_y), (0, -16));
    }

    #[test]
    fn test_rectangle_is_a_copy() {
        let mut base = EntityBase::new(EntityId(1), 32, 32, sheet(), true);
        base.set_position(50, 60);

        let mut rect = base.rectangle();
        rect.set_position(0, 0);

        assert_eq!(base.rectangle().x(), 50);
        assert_eq!(base.rectangle().bounds().y1, 44);
    }

    #[test]
    fn test_snapshot_json_shape() {
        let mut base = EntityBase::new(EntityId(9), 32, 32, sheet(), false);
        base.set_position(10, 20);
        let json = serde_json::to_string(&base.snapshot(EntityKind::AbilityCast)).unwrap();

        assert!(json.contains("\"type\":\"Magic\""));
        assert!(json.contains("\"id\":9"));
        assert!(json.contains("\"sprite_path\":\"/test.png\""));
        assert!(!json.contains("username"));
    }

    #[test]
    fn test_player_details_flatten() {
        let mut snap = EntityBase::new(EntityId(2), 32, 32, sheet(), true).snapshot(EntityKind::Player);
        snap.player = Some(PlayerDetails {
            username: "drifter".into(),
            damage: 3,
        });

        let json = serde_json::to_string(&snap).unwrap();
        assert!(json.contains("\"type\":\"Player\""));
        assert!(json.contains("\"username\":\"drifter\""));
        assert!(json.contains("\"damage\":3"));

        let back: EntitySnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snap);
    }
}
