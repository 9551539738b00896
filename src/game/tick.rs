//! Simulation Tick
//!
//! Synchronous stepping of one session's world. The session layer owns the
//! timer; this module only knows how to advance by exactly one tick.
//!
//! Per tick:
//!
//! 1. freeze the id order of every live entity (map precedence order)
//! 2. advance each one that still exists, with itself pulled out of the map
//! 3. snapshot whatever is alive afterwards
//!
//! Entities spawned during the tick are not in the frozen order, so they first
//! advance on the next tick. Entities removed during the tick are skipped.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::core::rng::DeterministicRng;
use crate::game::entity::{Entity, EntityId, EntitySnapshot, Lifecycle};
use crate::game::map::{Map, PlacementError};
use crate::game::player::{Player, SpritePool};
use crate::game::strategy::Strategy;

/// Result of a tick.
#[derive(Debug, Clone, Default)]
pub struct TickResult {
    /// Tick number just completed (0 for the initial snapshot).
    pub tick: u32,
    /// Live entities after the tick, in map order.
    pub entities: Vec<EntitySnapshot>,
    /// Whether the match duration has been reached.
    pub match_ended: bool,
}

/// Final damage tally for one player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Standing {
    /// Player id.
    pub id: EntityId,
    /// Strategy display name.
    pub username: String,
    /// Damage taken.
    pub damage: u32,
}

/// One session's world and clock.
pub struct Simulation {
    map: Map,
    rng: DeterministicRng,
    sprites: SpritePool,
    tick: u32,
    duration_ticks: u32,
}

impl Simulation {
    /// Empty world of the given size.
    pub fn new(width: i32, height: i32, duration_ticks: u32, seed: u64) -> Self {
        let mut rng = DeterministicRng::new(seed);
        let map = Map::new(width, height, rng.next_u64());
        let sprites = SpritePool::new(&mut rng);

        Self {
            map,
            rng,
            sprites,
            tick: 0,
            duration_ticks,
        }
    }

    /// Create one player per strategy and drop each on a random free cell.
    pub fn populate(&mut self, roster: Vec<Box<dyn Strategy>>) -> Result<Vec<EntityId>, PlacementError> {
        let mut ids = Vec::with_capacity(roster.len());
        for strategy in roster {
            let player = Player::new(self.map.next_id(), self.sprites.next_number(), strategy);
            ids.push(self.map.add_player(player)?);
        }
        Ok(ids)
    }

    /// Advance the world by one tick.
    pub fn step(&mut self) -> TickResult {
        self.tick += 1;

        for id in self.map.entity_order() {
            let Some(mut entity) = self.map.take(id) else {
                continue;
            };

            match entity.advance(&mut self.map) {
                Lifecycle::Alive => self.map.restore(entity),
                Lifecycle::Expired => trace!(entity = %id, tick = self.tick, "entity expired"),
            }
        }

        TickResult {
            tick: self.tick,
            entities: self.map.snapshot(),
            match_ended: self.is_finished(),
        }
    }

    /// Snapshot without advancing.
    pub fn snapshot(&self) -> TickResult {
        TickResult {
            tick: self.tick,
            entities: self.map.snapshot(),
            match_ended: self.is_finished(),
        }
    }

    /// Damage tally, least damaged first; ties keep spawn order.
    pub fn standings(&self) -> Vec<Standing> {
        let mut standings: Vec<Standing> = self
            .map
            .players()
            .map(|player| Standing {
                id: player.id(),
                username: player.name().to_owned(),
                damage: player.damage(),
            })
            .collect();
        standings.sort_by_key(|standing| standing.damage);
        standings
    }

    /// Ticks completed.
    pub fn tick(&self) -> u32 {
        self.tick
    }

    /// Configured match length.
    pub fn duration_ticks(&self) -> u32 {
        self.duration_ticks
    }

    /// True once the match length has been reached.
    pub fn is_finished(&self) -> bool {
        self.tick >= self.duration_ticks
    }

    /// The world.
    pub fn map(&self) -> &Map {
        &self.map
    }

    /// The world, mutably.
    pub fn map_mut(&mut self) -> &mut Map {
        &mut self.map
    }

    /// Session-level RNG (roster order, strategy seeds).
    pub fn rng_mut(&mut self) -> &mut DeterministicRng {
        &mut self.rng
    }
}

// =============================================================================
// TESTS
// =============================================================================
