//! Spatial Map
//!
//! Owns every live entity, partitioned by kind, together with the session's
//! id allocator and RNG. Placement is validated here: an obstacle is never
//! registered outside the playfield or on top of another obstacle.
//!
//! Iteration order is fixed: ability casts, then players, then detonations,
//! each kind in registration order. Snapshots and obstacle scans follow it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::core::rect::{self, Offset, Rect};
use crate::core::rng::DeterministicRng;
use crate::game::ability::AbilityCast;
use crate::game::detonation::Detonation;
use crate::game::entity::{AnyEntity, Entity, EntityId, EntityKind, EntitySnapshot, IdAllocator};
use crate::game::player::{Player, PLAYER_HEIGHT, PLAYER_WIDTH};

/// Placement failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlacementError {
    /// No grid cell can take the entity.
    #[error("no free spawn cell for entity {entity}")]
    NoSpace {
        /// Entity that could not be placed.
        entity: EntityId,
    },

    /// The obstacle overlaps another obstacle or leaves the playfield.
    #[error("entity {entity} cannot be placed at ({x}, {y})")]
    PlacementConflict {
        /// Entity that could not be placed.
        entity: EntityId,
        /// Requested center x.
        x: i32,
        /// Requested center y.
        y: i32,
    },
}

/// Read-only map metadata handed to strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapInfo {
    /// Playfield width.
    pub width: i32,
    /// Playfield height.
    pub height: i32,
    /// Smallest valid player center x.
    pub player_min_x: i32,
    /// Largest valid player center x.
    pub player_max_x: i32,
    /// Smallest valid player center y.
    pub player_min_y: i32,
    /// Largest valid player center y.
    pub player_max_y: i32,
    /// Center x.
    pub center_x: i32,
    /// Center y.
    pub center_y: i32,
}

impl MapInfo {
    /// Metadata for a `width` × `height` playfield.
    pub fn new(width: i32, height: i32) -> Self {
        let half_w = PLAYER_WIDTH / 2;
        let half_h = PLAYER_HEIGHT / 2;
        Self {
            width,
            height,
            player_min_x: half_w,
            player_max_x: width - half_w,
            player_min_y: half_h,
            player_max_y: height - half_h,
            center_x: width / 2,
            center_y: height / 2,
        }
    }

    /// Signed offset of `rect`'s center from the map center.
    ///
    /// A negative `horizontal` means the rectangle sits left of center.
    pub fn distance_from_center(&self, rect: &Rect) -> Offset {
        Offset {
            horizontal: rect.x() - self.center_x,
            vertical: rect.y() - self.center_y,
        }
    }
}

/// Authoritative entity store.
pub struct Map {
    info: MapInfo,
    ids: IdAllocator,
    rng: DeterministicRng,
    casts: BTreeMap<EntityId, AbilityCast>,
    players: BTreeMap<EntityId, Player>,
    detonations: BTreeMap<EntityId, Detonation>,
}

impl Map {
    /// Empty map with its own id counter and RNG.
    pub fn new(width: i32, height: i32, seed: u64) -> Self {
        Self {
            info: MapInfo::new(width, height),
            ids: IdAllocator::new(),
            rng: DeterministicRng::new(seed),
            casts: BTreeMap::new(),
            players: BTreeMap::new(),
            detonations: BTreeMap::new(),
        }
    }

    /// Width.
    pub fn width(&self) -> i32 {
        self.info.width
    }

    /// Height.
    pub fn height(&self) -> i32 {
        self.info.height
    }

    /// Metadata view.
    pub fn info(&self) -> &MapInfo {
        &self.info
    }

    /// Allocate an id for an entity about to be constructed.
    pub fn next_id(&mut self) -> EntityId {
        self.ids.allocate()
    }

    /// Session RNG.
    pub fn rng_mut(&mut self) -> &mut DeterministicRng {
        &mut self.rng
    }

    // =========================================================================
    // PLACEMENT
    // =========================================================================

    /// Could an entity with identity `id` occupy `rect`?
    ///
    /// The rectangle must keep its half extent inside every edge and must not
    /// collide with any obstacle other than `id` itself.
    pub fn can_place(&self, id: EntityId, rect: &Rect) -> bool {
        let half_w = rect.half_width();
        let half_h = rect.half_height();

        if rect.x() < half_w || rect.x() > self.info.width - half_w {
            return false;
        }
        if rect.y() < half_h || rect.y() > self.info.height - half_h {
            return false;
        }

        !self
            .entities()
            .filter(|other| other.id() != id && other.is_obstacle())
            .any(|other| rect::collide(rect, &other.rectangle()))
    }

    /// [`Map::can_place`] at the entity's current position.
    pub fn can_place_entity(&self, entity: &dyn Entity) -> bool {
        self.can_place(entity.id(), &entity.rectangle())
    }

    /// Every grid cell the entity could occupy, row by row.
    ///
    /// Cells are spaced by the entity's size and start at its half extent.
    pub fn find_available_positions(&self, entity: &dyn Entity) -> Vec<(i32, i32)> {
        let probe = entity.rectangle();
        let step_x = probe.width().max(1);
        let step_y = probe.height().max(1);

        let mut positions = Vec::new();
        let mut y = probe.half_height();
        while y <= self.info.height - probe.half_height() {
            let mut x = probe.half_width();
            while x <= self.info.width - probe.half_width() {
                if self.can_place(entity.id(), &probe.at(x, y)) {
                    positions.push((x, y));
                }
                x += step_x;
            }
            y += step_y;
        }
        positions
    }

    /// Drop a player on a random free cell.
    pub fn add_player(&mut self, mut player: Player) -> Result<EntityId, PlacementError> {
        let positions = self.find_available_positions(&player);
        let (x, y) = *self
            .rng
            .choose(&positions)
            .ok_or(PlacementError::NoSpace { entity: player.id() })?;

        player.set_position(x, y);
        debug!(entity = %player.id(), x, y, "player placed");
        self.add(player)
    }

    /// Register an entity at its current position.
    ///
    /// Obstacles are validated with [`Map::can_place`]; everything else is
    /// accepted as is.
    pub fn add(&mut self, entity: impl Into<AnyEntity>) -> Result<EntityId, PlacementError> {
        let entity = entity.into();
        let id = entity.id();

        if entity.is_obstacle() && !self.can_place_entity(&entity) {
            let rect = entity.rectangle();
            return Err(PlacementError::PlacementConflict {
                entity: id,
                x: rect.x(),
                y: rect.y(),
            });
        }

        self.insert(entity);
        Ok(id)
    }

    /// Deregister by identity. Absent ids are ignored.
    pub fn remove(&mut self, id: EntityId) -> Option<AnyEntity> {
        if let Some(cast) = self.casts.remove(&id) {
            return Some(cast.into());
        }
        if let Some(player) = self.players.remove(&id) {
            return Some(player.into());
        }
        self.detonations.remove(&id).map(AnyEntity::from)
    }

    /// Temporarily pull an entity out so it can advance against the map.
    pub fn take(&mut self, id: EntityId) -> Option<AnyEntity> {
        self.remove(id)
    }

    /// Put back an entity obtained from [`Map::take`], skipping validation.
    pub fn restore(&mut self, entity: AnyEntity) {
        self.insert(entity);
    }

    fn insert(&mut self, entity: AnyEntity) {
        match entity {
            AnyEntity::AbilityCast(cast) => {
                self.casts.insert(cast.id(), cast);
            }
            AnyEntity::Player(player) => {
                self.players.insert(player.id(), player);
            }
            AnyEntity::Detonation(detonation) => {
                self.detonations.insert(detonation.id(), detonation);
            }
        }
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    /// All live entities in precedence order.
    pub fn entities(&self) -> impl Iterator<Item = &dyn Entity> + '_ {
        self.casts
            .values()
            .map(|cast| cast as &dyn Entity)
            .chain(self.players.values().map(|player| player as &dyn Entity))
            .chain(self.detonations.values().map(|detonation| detonation as &dyn Entity))
    }

    /// Ids of all live entities in precedence order.
    pub fn entity_order(&self) -> Vec<EntityId> {
        self.entities().map(|entity| entity.id()).collect()
    }

    /// Transport snapshots in precedence order.
    pub fn snapshot(&self) -> Vec<EntitySnapshot> {
        self.entities().map(|entity| entity.snapshot()).collect()
    }

    /// Live entity count.
    pub fn len(&self) -> usize {
        self.casts.len() + self.players.len() + self.detonations.len()
    }

    /// True when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Count of live entities of one kind.
    pub fn count(&self, kind: EntityKind) -> usize {
        match kind {
            EntityKind::AbilityCast => self.casts.len(),
            EntityKind::Player => self.players.len(),
            EntityKind::Detonation => self.detonations.len(),
        }
    }

    /// Players in registration order.
    pub fn players(&self) -> impl Iterator<Item = &Player> + '_ {
        self.players.values()
    }

    /// Mutable players in registration order.
    pub fn players_mut(&mut self) -> impl Iterator<Item = &mut Player> + '_ {
        self.players.values_mut()
    }

    /// Look up one player.
    pub fn player(&self, id: EntityId) -> Option<&Player> {
        self.players.get(&id)
    }

    /// Ability casts in registration order.
    pub fn ability_casts(&self) -> impl Iterator<Item = &AbilityCast> + '_ {
        self.casts.values()
    }

    /// Detonations in registration order.
    pub fn detonations(&self) -> impl Iterator<Item = &Detonation> + '_ {
        self.detonations.values()
    }
}
