//! Detonations
//!
//! Visual blast artifacts spawned by ability casts. Damage has already been
//! dealt by the time one exists; a detonation only animates and removes
//! itself after a fixed number of advances.

use crate::game::entity::{Entity, EntityBase, EntityId, EntityKind, Lifecycle, SpriteSheet};
use crate::game::map::Map;

/// Blast width.
pub const DETONATION_WIDTH: i32 = 32;
/// Blast height.
pub const DETONATION_HEIGHT: i32 = 32;

const SHEET_COLS: usize = 5;
const SHEET_ROWS: usize = 2;

/// Frames on the blast sheet.
pub const FRAME_COUNT: u32 = (SHEET_COLS * SHEET_ROWS) as u32;
/// Advances between animation frames.
pub const FRAME_DELAY: i32 = 2;
/// Advances before the blast removes itself.
pub const LIFETIME: u32 = FRAME_COUNT * FRAME_DELAY as u32 * 2;

/// Short-lived blast.
#[derive(Debug, Clone)]
pub struct Detonation {
    base: EntityBase,
    advances: u32,
    frame_delay: i32,
}

impl Detonation {
    /// New blast centered at `(x, y)`.
    pub fn new(id: EntityId, x: i32, y: i32) -> Self {
        let sheet = SpriteSheet {
            path: "/explosion.png".to_owned(),
            tile_width: 192,
            tile_height: 192,
            cols: SHEET_COLS,
            rows: SHEET_ROWS,
            z_index: 3,
        };
        let mut base = EntityBase::new(id, DETONATION_WIDTH, DETONATION_HEIGHT, sheet, false);
        base.set_position(x, y);

        Self {
            base,
            advances: 0,
            frame_delay: -1,
        }
    }

    /// Advances survived so far.
    pub fn age(&self) -> u32 {
        self.advances
    }
}

impl Entity for Detonation {
    fn base(&self) -> &EntityBase {
        &self.base
    }

    fn kind(&self) -> EntityKind {
        EntityKind::Detonation
    }

    fn advance(&mut self, _map: &mut Map) -> Lifecycle {
        if self.advances >= LIFETIME {
            return Lifecycle::Expired;
        }

        self.advances += 1;
        if self.advances == LIFETIME {
            return Lifecycle::Expired;
        }

        if self.frame_delay >= FRAME_DELAY {
            self.frame_delay = 0;
            self.base.advance_frame();
        } else {
            self.frame_delay += 1;
        }

        Lifecycle::Alive
    }
}
