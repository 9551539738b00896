//! Hunter
//!
//! Two modes:
//!
//! - **attack**: lock on to the least damaged player, walk up to it and cast
//! - **run**: after casting, flee the nearest cast until far enough away
//!
//! The "far enough" distance is re-rolled on every check, so the hunter
//! sometimes turns back early and sometimes keeps running.

use crate::core::rng::DeterministicRng;
use crate::game::entity::EntityId;
use crate::game::strategy::{Action, DecisionContext, PlayerView, Strategy, StrategyFault};
use crate::strategies::{chase, flee, weakest_player};

/// Registry name.
pub const NAME: &str = "hunter";

/// Safe-distance multiplier range, in bodies.
const SAFE_DISTANCE_MIN: i32 = 20;
const SAFE_DISTANCE_MAX: i32 = 30;

/// Current behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Chasing a target.
    Attack,
    /// Escaping its own cast.
    Run,
}

/// Chase, cast, run away, repeat.
#[derive(Debug, Clone)]
pub struct Hunter {
    mode: Mode,
    target: Option<EntityId>,
    rng: DeterministicRng,
}

impl Hunter {
    /// Fresh hunter in attack mode.
    pub fn new(seed: u64) -> Self {
        Self {
            mode: Mode::Attack,
            target: None,
            rng: DeterministicRng::new(seed),
        }
    }

    /// Current mode.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Locked target, if any.
    pub fn target(&self) -> Option<EntityId> {
        self.target
    }

    fn locked_target(&mut self, ctx: &DecisionContext<'_>) -> Option<PlayerView> {
        let locked = self
            .target
            .and_then(|id| ctx.others().iter().find(|player| player.id == id).copied());
        let target = locked.or_else(|| weakest_player(ctx))?;
        self.target = Some(target.id);
        Some(target)
    }

    fn attack(&mut self, ctx: &DecisionContext<'_>) -> Action {
        let Some(target) = self.locked_target(ctx) else {
            return Action::Stop;
        };
        let own = ctx.own();
        let dx = own.x - target.x;
        let dy = own.y - target.y;

        let in_range = (dx.abs() <= own.half_width() && dy.abs() <= own.height)
            || (dy.abs() <= own.half_height() && dx.abs() <= own.width);
        if in_range && own.can_cast {
            self.mode = Mode::Run;
            self.target = None;
            return Action::CastAbility;
        }

        chase(ctx, dx, dy)
    }

    fn run(&mut self, ctx: &DecisionContext<'_>) -> Action {
        let Some(threat) = ctx.nearest_ability().copied() else {
            self.mode = Mode::Attack;
            return Action::Stop;
        };

        let own = ctx.own();
        let offset = ctx.distance_to(&threat);
        let safe_x = own.width * self.rng.next_int_range(SAFE_DISTANCE_MIN, SAFE_DISTANCE_MAX);
        let safe_y = own.height * self.rng.next_int_range(SAFE_DISTANCE_MIN, SAFE_DISTANCE_MAX);
        if offset.horizontal.abs() >= safe_x && offset.vertical.abs() >= safe_y {
            self.mode = Mode::Attack;
            return Action::Stop;
        }

        flee(ctx, offset, None)
    }
}

impl Strategy for Hunter {
    fn name(&self) -> &str {
        NAME
    }

    fn decide(&mut self, ctx: &DecisionContext<'_>) -> Result<Action, StrategyFault> {
        let action = match self.mode {
            Mode::Attack => self.attack(ctx),
            Mode::Run => self.run(ctx),
        };
        Ok(action)
    }
}
