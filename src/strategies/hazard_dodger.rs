//! Hazard Dodger
//!
//! Stays out of every cast's danger zones first and hunts second. Inside a
//! zone it steps away from the nearest cast; anywhere else it walks toward
//! the least damaged player and casts from two bodies away.

use crate::core::rect::Bounded;
use crate::game::strategy::{Action, DecisionContext, Strategy, StrategyFault};
use crate::strategies::{chase, flee, weakest_player};

/// Registry name.
pub const NAME: &str = "hazard-dodger";

/// Casting reach, in bodies.
const REACH: i32 = 2;

/// Flee first, fight second. Stateless.
#[derive(Debug, Clone, Copy, Default)]
pub struct HazardDodger;

impl HazardDodger {
    /// Does the deciding player touch any cast's footprint or danger band?
    ///
    /// Bounds are inclusive: sharing an edge counts.
    pub fn in_danger(ctx: &DecisionContext<'_>) -> bool {
        let own = ctx.own().rect();
        ctx.abilities()
            .iter()
            .flat_map(|ability| ability.danger_rects())
            .any(|zone| own.touches(&zone))
    }

    fn escape(ctx: &DecisionContext<'_>) -> Action {
        let Some(threat) = ctx.nearest_ability() else {
            return Action::Stop;
        };
        let offset = ctx.distance_to(threat);
        let from_center = ctx.map_info().distance_from_center(&ctx.own().rect());
        flee(ctx, offset, Some(from_center))
    }

    fn hunt(ctx: &DecisionContext<'_>) -> Action {
        let Some(target) = weakest_player(ctx) else {
            return Action::Stop;
        };
        let own = ctx.own();
        let dx = own.x - target.x;
        let dy = own.y - target.y;

        let in_range = (dx.abs() <= own.half_width() * REACH && dy.abs() <= own.height * REACH)
            || (dy.abs() <= own.half_height() * REACH && dx.abs() <= own.width * REACH);
        if in_range && own.can_cast {
            return Action::CastAbility;
        }

        chase(ctx, dx, dy)
    }
}

impl Strategy for HazardDodger {
    fn name(&self) -> &str {
        NAME
    }

    fn decide(&mut self, ctx: &DecisionContext<'_>) -> Result<Action, StrategyFault> {
        let action = if Self::in_danger(ctx) {
            Self::escape(ctx)
        } else {
            Self::hunt(ctx)
        };
        Ok(action)
    }
}
