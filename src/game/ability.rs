//! Ability Casts
//!
//! A cast channels for a fixed number of advances, then detonates in stages:
//!
//! ```text
//! Channeling ──(60 advances)──► armed ──► stage 1: one blast on the cast
//!                                          stage 2..4: four blasts, k-1 cells out
//!                                          (5 idle advances between stages)
//!                                          stage 4 ──► Removed
//! ```
//!
//! Damage is dealt when a blast is spawned: every player whose footprint
//! collides with the blast takes one hit. Blasts themselves only animate.

use tracing::debug;

use crate::core::rect::{self, Rect};
use crate::game::detonation::Detonation;
use crate::game::entity::{Entity, EntityBase, EntityId, EntityKind, Lifecycle, SpriteSheet};
use crate::game::map::Map;
use crate::game::strategy::{AbilityView, DangerZones};

/// Cast footprint width.
pub const CAST_WIDTH: i32 = 32;
/// Cast footprint height.
pub const CAST_HEIGHT: i32 = 32;

const SHEET_COLS: usize = 5;
const SHEET_ROWS: usize = 4;

/// Frames on the cast sheet.
pub const FRAME_COUNT: u32 = (SHEET_COLS * SHEET_ROWS) as u32;
/// Advances between animation frames.
pub const FRAME_DELAY: i32 = 3;
/// Advances spent channelling.
pub const CHANNEL_TICKS: u32 = FRAME_COUNT * FRAME_DELAY as u32;
/// Number of detonation stages.
pub const STAGE_LIMIT: u32 = 4;
/// Idle advances between stages.
pub const STAGE_DELAY: u32 = 5;

/// Where a cast is in its life.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastPhase {
    /// Charging; no damage yet.
    Channeling,
    /// Firing blast stages.
    Detonating,
    /// All stages fired. Terminal.
    Removed,
}

/// Channelled area ability.
#[derive(Debug, Clone)]
pub struct AbilityCast {
    base: EntityBase,
    phase: CastPhase,
    advances: u32,
    frame_delay: i32,
    stage: u32,
    stage_delay: u32,
}

impl AbilityCast {
    /// New cast centered at `(x, y)`.
    pub fn new(id: EntityId, x: i32, y: i32) -> Self {
        let sheet = SpriteSheet {
            path: "/magic.png".to_owned(),
            tile_width: 192,
            tile_height: 192,
            cols: SHEET_COLS,
            rows: SHEET_ROWS,
            z_index: 1,
        };
        let mut base = EntityBase::new(id, CAST_WIDTH, CAST_HEIGHT, sheet, false);
        base.set_position(x, y);

        Self {
            base,
            phase: CastPhase::Channeling,
            advances: 0,
            frame_delay: -1,
            stage: 0,
            stage_delay: 0,
        }
    }

    /// Current phase.
    pub fn phase(&self) -> CastPhase {
        self.phase
    }

    /// Stages fired so far.
    pub fn stage(&self) -> u32 {
        self.stage
    }

    /// Threat geometry: bands reaching `STAGE_LIMIT` cells out on each side.
    pub fn danger_zones(&self) -> DangerZones {
        let (x, y) = (self.base.x(), self.base.y());
        let (w, h) = (self.base.width(), self.base.height());

        let band_w = w * STAGE_LIMIT as i32;
        let band_h = h * STAGE_LIMIT as i32;

        DangerZones {
            left: Rect::new(band_w, h, x - band_w / 2, y),
            right: Rect::new(band_w, h, x + band_w / 2, y),
            top: Rect::new(w, band_h, x, y - band_h / 2),
            bottom: Rect::new(w, band_h, x, y + band_h / 2),
        }
    }

    /// Read-only view for strategies.
    pub fn view(&self) -> AbilityView {
        AbilityView {
            id: self.base.id(),
            width: self.base.width(),
            height: self.base.height(),
            x: self.base.x(),
            y: self.base.y(),
            stage: self.stage,
            danger: self.danger_zones(),
        }
    }

    /// Blast centers for `stage` (1-based).
    fn blast_positions(&self, stage: u32) -> Vec<(i32, i32)> {
        let (x, y) = (self.base.x(), self.base.y());
        if stage <= 1 {
            return vec![(x, y)];
        }

        let reach = stage as i32 - 1;
        let dx = self.base.width() * reach;
        let dy = self.base.height() * reach;
        vec![(x - dx, y), (x + dx, y), (x, y - dy), (x, y + dy)]
    }

    /// Spawn this stage's blasts and hit every player they overlap.
    fn detonate(&mut self, map: &mut Map) {
        for (x, y) in self.blast_positions(self.stage) {
            let blast = Detonation::new(map.next_id(), x, y);
            let footprint = blast.rectangle();

            for player in map.players_mut() {
                if rect::collide(&footprint, &player.rectangle()) {
                    player.apply_hit();
                    debug!(cast = %self.base.id(), player = %player.id(), stage = self.stage, "blast hit");
                }
            }

            if let Err(e) = map.add(blast) {
                debug!(cast = %self.base.id(), error = %e, "blast not registered");
            }
        }
    }

    fn animate(&mut self) {
        if self.frame_delay >= FRAME_DELAY {
            self.frame_delay = 0;
            self.base.advance_frame();
        } else {
            self.frame_delay += 1;
        }
    }
}

impl Entity for AbilityCast {
    fn base(&self) -> &EntityBase {
        &self.base
    }

    fn kind(&self) -> EntityKind {
        EntityKind::AbilityCast
    }

    fn advance(&mut self, map: &mut Map) -> Lifecycle {
        match self.phase {
            CastPhase::Removed => return Lifecycle::Expired,
            CastPhase::Detonating => {
                if self.stage_delay > 0 {
                    self.stage_delay -= 1;
                    return Lifecycle::Alive;
                }
                self.stage_delay = STAGE_DELAY;
                self.stage += 1;
                self.detonate(map);

                if self.stage >= STAGE_LIMIT {
                    self.phase = CastPhase::Removed;
                    debug!(cast = %self.base.id(), "cast spent");
                    return Lifecycle::Expired;
                }
            }
            CastPhase::Channeling => {}
        }

        self.advances += 1;
        if self.advances <= CHANNEL_TICKS {
            self.animate();
        } else {
            self.phase = CastPhase::Detonating;
        }

        Lifecycle::Alive
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::player::Player;
    use crate::game::strategy::{Action, DecisionContext, Strategy, StrategyFault};

    struct Idle;

    impl Strategy for Idle {
        fn name(&self) -> &str {
            "idle"
        }

        fn decide(&mut self, _ctx: &DecisionContext<'_>) -> Result<Action, StrategyFault> {
            Ok(Action::Stop)
        }
    }

    fn spawn_player(map: &mut Map, x: i32, y: i32) -> EntityId {
        let mut player = Player::new(map.next_id(), 1, Box::new(Idle));
        player.set_position(x, y);
        map.add(player).unwrap()
    }

    fn spawn_cast(map: &mut Map, x: i32, y: i32) -> EntityId {
        let id = map.next_id();
        map.add(AbilityCast::new(id, x, y)).unwrap()
    }

    /// Advance one entity the way the tick loop does; true while it lives.
    fn advance(map: &mut Map, id: EntityId) -> bool {
        let mut entity = map.take(id).unwrap();
        match entity.advance(map) {
            Lifecycle::Alive => {
                map.restore(entity);
                true
            }
            Lifecycle::Expired => false,
        }
    }

    fn damage(map: &Map, id: EntityId) -> u32 {
        map.player(id).unwrap().damage()
    }

    #[test]
    fn test_danger_zones() {
        let cast = AbilityCast::new(EntityId(1), 200, 100);
        let zones = cast.danger_zones();

        assert_eq!((zones.left.width(), zones.left.height()), (128, 32));
        assert_eq!((zones.left.x(), zones.left.y()), (136, 100));
        assert_eq!(zones.right.x(), 264);
        assert_eq!((zones.top.width(), zones.top.height()), (32, 128));
        assert_eq!(zones.top.y(), 36);
        assert_eq!(zones.bottom.y(), 164);

        let view = cast.view();
        assert_eq!(view.danger_rects()[0], cast.rectangle());
        assert_eq!(view.stage, 0);
    }

    #[test]
    fn test_no_damage_while_channelling() {
        let mut map = Map::new(500, 400, 1);
        let victim = spawn_player(&mut map, 200, 200);
        let cast = spawn_cast(&mut map, 200, 200);

        for _ in 0..61 {
            assert!(advance(&mut map, cast));
        }
        assert_eq!(damage(&map, victim), 0);
        assert_eq!(map.count(EntityKind::Detonation), 0);
        assert_eq!(map.ability_casts().next().unwrap().phase(), CastPhase::Detonating);
    }

    #[test]
    fn test_first_stage_hits_footprint_once() {
        let mut map = Map::new(500, 400, 1);
        let victim = spawn_player(&mut map, 200, 200);
        let bystander = spawn_player(&mut map, 300, 300);
        let cast = spawn_cast(&mut map, 200, 200);

        for _ in 0..62 {
            advance(&mut map, cast);
        }
        assert_eq!(damage(&map, victim), 1);
        assert_eq!(damage(&map, bystander), 0);
        assert_eq!(map.count(EntityKind::Detonation), 1);
        assert_eq!(map.ability_casts().next().unwrap().stage(), 1);
    }

    #[test]
    fn test_stage_schedule_and_removal() {
        let mut map = Map::new(500, 400, 1);
        let cast = spawn_cast(&mut map, 250, 200);

        let mut blasts_after = Vec::new();
        let mut advances = 0;
        while advance(&mut map, cast) {
            advances += 1;
            blasts_after.push(map.count(EntityKind::Detonation));
        }
        advances += 1;

        assert_eq!(advances, 80);
        assert_eq!(blasts_after[61 - 1], 0);
        assert_eq!(blasts_after[62 - 1], 1);
        assert_eq!(blasts_after[67 - 1], 1);
        assert_eq!(blasts_after[68 - 1], 5);
        assert_eq!(blasts_after[74 - 1], 9);
        // the final stage fires on removal
        assert_eq!(map.count(EntityKind::Detonation), 13);
        assert_eq!(map.count(EntityKind::AbilityCast), 0);
    }

    #[test]
    fn test_outer_stages_spread_on_the_cross() {
        let cast = AbilityCast::new(EntityId(1), 200, 200);
        assert_eq!(
            cast.blast_positions(3),
            vec![(136, 200), (264, 200), (200, 136), (200, 264)]
        );
    }

    #[test]
    fn test_outer_stage_hits_player_on_the_cross() {
        let mut map = Map::new(500, 400, 1);
        // two cells right of the cast: stage 3 lands on it
        let victim = spawn_player(&mut map, 264, 200);
        let cast = spawn_cast(&mut map, 200, 200);

        for _ in 0..68 {
            advance(&mut map, cast);
        }
        assert_eq!(damage(&map, victim), 0);

        for _ in 0..6 {
            advance(&mut map, cast);
        }
        assert_eq!(damage(&map, victim), 1);
    }

    #[test]
    fn test_removed_cast_stays_expired() {
        let mut map = Map::new(500, 400, 1);
        let mut cast = AbilityCast::new(EntityId(99), 100, 100);
        while cast.advance(&mut map) == Lifecycle::Alive {}

        assert_eq!(cast.phase(), CastPhase::Removed);
        let blasts = map.count(EntityKind::Detonation);
        assert_eq!(cast.advance(&mut map), Lifecycle::Expired);
        assert_eq!(map.count(EntityKind::Detonation), blasts);
    }
}
