//! Player Entity
//!
//! A player is an obstacle entity driven by a [`Strategy`]. Each advance runs:
//!
//! 1. animation cadence, independent of movement
//! 2. cast cooldown countdown
//! 3. action resolution: replay the latched move while inertia lasts,
//!    otherwise consult the strategy
//! 4. apply: step (rolled back and inertia cleared when blocked) or cast
//!
//! Strategy code is isolated: errors and panics become [`Action::Stop`].

use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, warn};

use crate::core::rng::DeterministicRng;
use crate::game::ability::AbilityCast;
use crate::game::entity::{Entity, EntityBase, EntityId, EntityKind, EntitySnapshot, Lifecycle, PlayerDetails, SpriteSheet};
use crate::game::map::Map;
use crate::game::strategy::{Action, DecisionContext, Direction, PlayerView, Strategy, StrategyFault};

/// Player width.
pub const PLAYER_WIDTH: i32 = 32;
/// Player height.
pub const PLAYER_HEIGHT: i32 = 32;
/// Advances between animation frames.
pub const FRAME_DELAY: i32 = 10;
/// Advances before another cast is allowed.
pub const CAST_COOLDOWN: u32 = 60;
/// Advances a chosen move is repeated without consulting the strategy.
pub const MOVE_INERTIA: u32 = 16;
/// Number of distinct player sprite sheets.
pub const SPRITE_VARIANTS: u32 = 32;

/// Sheet frames for a facing direction.
fn facing_frames(direction: Direction) -> &'static [usize] {
    match direction {
        Direction::Down => &[0, 1, 2],
        Direction::Left => &[3, 4, 5],
        Direction::Right => &[6, 7, 8],
        Direction::Up => &[9, 10, 11],
    }
}

/// Shuffled, cycling pool of sprite numbers.
#[derive(Debug, Clone)]
pub struct SpritePool {
    numbers: Vec<u32>,
    cursor: usize,
}

impl SpritePool {
    /// Shuffle `1..=SPRITE_VARIANTS` with `rng`.
    pub fn new(rng: &mut DeterministicRng) -> Self {
        let mut numbers: Vec<u32> = (1..=SPRITE_VARIANTS).collect();
        rng.shuffle(&mut numbers);
        Self { numbers, cursor: 0 }
    }

    /// Next number, wrapping after the last one.
    pub fn next_number(&mut self) -> u32 {
        let number = self.numbers[self.cursor];
        self.cursor = (self.cursor + 1) % self.numbers.len();
        number
    }
}

/// Strategy-driven player.
pub struct Player {
    base: EntityBase,
    name: String,
    strategy: Box<dyn Strategy>,
    facing: Option<Direction>,
    latched: Option<Direction>,
    frame_delay: i32,
    cooldown: u32,
    inertia: u32,
    damage: u32,
    last_action: Action,
}

impl Player {
    /// New player facing down, using sprite sheet `sprite_number`.
    pub fn new(id: EntityId, sprite_number: u32, strategy: Box<dyn Strategy>) -> Self {
        let sheet = SpriteSheet {
            path: format!("/players/player{}.png", sprite_number),
            tile_width: 32,
            tile_height: 32,
            cols: 3,
            rows: 4,
            z_index: 2,
        };

        let mut player = Self {
            base: EntityBase::new(id, PLAYER_WIDTH, PLAYER_HEIGHT, sheet, true),
            name: strategy.name().to_owned(),
            strategy,
            facing: None,
            latched: None,
            frame_delay: -1,
            cooldown: 0,
            inertia: 0,
            damage: 0,
            last_action: Action::Stop,
        };
        player.set_facing(Direction::Down);
        player
    }

    /// Display name taken from the strategy.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Accumulated damage.
    pub fn damage(&self) -> u32 {
        self.damage
    }

    /// Remaining cast cooldown.
    pub fn cooldown(&self) -> u32 {
        self.cooldown
    }

    /// Remaining inertia run.
    pub fn inertia(&self) -> u32 {
        self.inertia
    }

    /// Current facing.
    pub fn facing(&self) -> Direction {
        self.facing.unwrap_or(Direction::Down)
    }

    /// Action resolved on the most recent advance.
    pub fn last_action(&self) -> Action {
        self.last_action
    }

    /// Move the center.
    pub fn set_position(&mut self, x: i32, y: i32) {
        self.base.set_position(x, y);
    }

    /// Register one detonation hit.
    pub fn apply_hit(&mut self) {
        self.damage += 1;
    }

    /// Read-only view for strategies.
    pub fn view(&self) -> PlayerView {
        PlayerView {
            id: self.base.id(),
            width: self.base.width(),
            height: self.base.height(),
            x: self.base.x(),
            y: self.base.y(),
            damage: self.damage,
            can_cast: self.cooldown == 0,
        }
    }

    fn set_facing(&mut self, direction: Direction) {
        if self.facing == Some(direction) {
            return;
        }
        self.facing = Some(direction);
        self.base.set_frames(facing_frames(direction));
        self.frame_delay = 0;
    }

    fn animate(&mut self) {
        if self.frame_delay >= FRAME_DELAY {
            self.frame_delay = 0;
            self.base.advance_frame();
        } else {
            self.frame_delay += 1;
        }
    }

    /// Ask the strategy, turning any fault into a stop.
    fn consult(&mut self, map: &Map) -> Action {
        let ctx = DecisionContext::new(map, self.view());
        let strategy = &mut self.strategy;

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| strategy.decide(&ctx)))
            .unwrap_or_else(|payload| Err(StrategyFault::from_panic(payload)));

        match outcome {
            Ok(action) => action,
            Err(fault) => {
                warn!(
                    player = %self.base.id(),
                    strategy = %self.name,
                    error = %fault,
                    "strategy fault, standing still"
                );
                Action::Stop
            }
        }
    }

    fn step(&mut self, map: &Map, direction: Direction) {
        self.set_facing(direction);

        let (prev_x, prev_y) = (self.base.x(), self.base.y());
        let (dx, dy) = direction.delta();
        self.base.set_position(prev_x + dx, prev_y + dy);

        if !map.can_place_entity(self) {
            self.inertia = 0;
            self.base.set_position(prev_x, prev_y);
            #[cfg(feature = "debug-tracing")]
            tracing::trace!(player = %self.base.id(), ?direction, "move blocked");
        }
    }

    fn cast(&mut self, map: &mut Map) {
        if self.cooldown > 0 {
            return;
        }
        self.cooldown = CAST_COOLDOWN;

        let cast = AbilityCast::new(map.next_id(), self.base.x(), self.base.y());
        match map.add(cast) {
            Ok(id) => debug!(player = %self.base.id(), cast = %id, "ability cast"),
            Err(e) => warn!(player = %self.base.id(), error = %e, "ability cast rejected"),
        }
    }
}

impl Entity for Player {
    fn base(&self) -> &EntityBase {
        &self.base
    }

    fn kind(&self) -> EntityKind {
        EntityKind::Player
    }

    fn advance(&mut self, map: &mut Map) -> Lifecycle {
        // 1. Animation
        self.animate();

        // 2. Cooldown
        if self.cooldown > 0 {
            self.cooldown -= 1;
        }

        // 3. Resolve the action
        let action = if self.inertia > 0 {
            self.inertia -= 1;
            self.latched.map(Action::Move).unwrap_or(Action::Stop)
        } else {
            let action = self.consult(map);
            if let Action::Move(direction) = action {
                self.latched = Some(direction);
                self.inertia = MOVE_INERTIA;
            }
            action
        };
        self.last_action = action;

        // 4. Apply it
        match action {
            Action::Move(direction) => self.step(map, direction),
            Action::CastAbility => self.cast(map),
            Action::Stop => {}
        }

        Lifecycle::Alive
    }

    fn snapshot(&self) -> EntitySnapshot {
        let mut snapshot = self.base.snapshot(EntityKind::Player);
        snapshot.player = Some(PlayerDetails {
            username: self.name.clone(),
            damage: self.damage,
        });
        snapshot
    }
}
