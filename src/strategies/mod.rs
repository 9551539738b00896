//! Built-in Strategies
//!
//! Strategies are looked up by name in a [`StrategyRegistry`] rather than
//! discovered at runtime. Each entry is a plain constructor taking a seed for
//! the strategy's private RNG.
//!
//! - `drifter`: always walks left
//! - `wall-follower`: walks straight, turns when blocked
//! - `hunter`: chases the weakest player, casts, then runs
//! - `hazard-dodger`: leaves danger zones first, hunts otherwise
//! - `open-space`: heads for the largest empty area

use std::collections::BTreeMap;

use thiserror::Error;

use crate::core::rect::Offset;
use crate::core::rng::DeterministicRng;
use crate::game::strategy::{Action, DecisionContext, Direction, PlayerView, Strategy};

pub mod drifter;
pub mod hazard_dodger;
pub mod hunter;
pub mod open_space;
pub mod wall_follower;

pub use drifter::Drifter;
pub use hazard_dodger::HazardDodger;
pub use hunter::Hunter;
pub use open_space::OpenSpace;
pub use wall_follower::WallFollower;

/// Builds a fresh strategy instance from a seed.
pub type StrategyFactory = fn(u64) -> Box<dyn Strategy>;

/// Registry failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The name is not registered.
    #[error("unknown strategy: {0}")]
    UnknownStrategy(String),
}

/// Name → constructor table.
#[derive(Clone, Default)]
pub struct StrategyRegistry {
    factories: BTreeMap<String, StrategyFactory>,
}

impl StrategyRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in strategy.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(drifter::NAME, |_| Box::new(Drifter));
        registry.register(wall_follower::NAME, |_| Box::new(WallFollower::default()));
        registry.register(hunter::NAME, |seed| Box::new(Hunter::new(seed)));
        registry.register(hazard_dodger::NAME, |_| Box::new(HazardDodger));
        registry.register(open_space::NAME, |seed| Box::new(OpenSpace::new(seed)));
        registry
    }

    /// Add or replace an entry.
    pub fn register(&mut self, name: impl Into<String>, factory: StrategyFactory) {
        self.factories.insert(name.into(), factory);
    }

    /// Registered names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.factories.keys().map(String::as_str)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// True when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Build one strategy by name.
    pub fn build(&self, name: &str, seed: u64) -> Result<Box<dyn Strategy>, RegistryError> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| RegistryError::UnknownStrategy(name.to_owned()))?;
        Ok(factory(seed))
    }

    /// Fresh instances for a session, in shuffled order.
    ///
    /// With a filter only the listed names are used (duplicates allowed);
    /// otherwise every registered strategy plays once.
    pub fn roster(
        &self,
        filter: Option<&[String]>,
        rng: &mut DeterministicRng,
    ) -> Result<Vec<Box<dyn Strategy>>, RegistryError> {
        let mut names: Vec<&str> = match filter {
            Some(names) => names.iter().map(String::as_str).collect(),
            None => self.names().collect(),
        };
        if let Some(unknown) = names.iter().find(|name| !self.factories.contains_key(**name)) {
            return Err(RegistryError::UnknownStrategy((*unknown).to_owned()));
        }

        rng.shuffle(&mut names);
        names
            .into_iter()
            .map(|name| self.build(name, rng.next_u64()))
            .collect()
    }
}

// =============================================================================
// SHARED MANOEUVRES
// =============================================================================

/// Least damaged other player, nearest first on ties.
pub(crate) fn weakest_player(ctx: &DecisionContext<'_>) -> Option<PlayerView> {
    ctx.others_by_distance()
        .into_iter()
        .enumerate()
        .min_by_key(|(index, player)| (player.damage, *index))
        .map(|(_, player)| player)
}

/// Step toward a target `dx`/`dy` away (own minus target), longer axis first.
pub(crate) fn chase(ctx: &DecisionContext<'_>, dx: i32, dy: i32) -> Action {
    let horizontal = || {
        let direction = match dx {
            d if d > 0 => Direction::Left,
            d if d < 0 => Direction::Right,
            _ => return None,
        };
        ctx.can_move(direction).then_some(direction)
    };
    let vertical = || {
        let direction = match dy {
            d if d > 0 => Direction::Up,
            d if d < 0 => Direction::Down,
            _ => return None,
        };
        ctx.can_move(direction).then_some(direction)
    };

    let direction = if dx.abs() > dy.abs() {
        horizontal().or_else(vertical)
    } else {
        vertical().or_else(horizontal)
    };
    direction.map(Action::Move).unwrap_or(Action::Stop)
}

/// Step away from a threat at `offset` (threat minus own) on its closer axis.
///
/// `from_center` breaks exact ties by stepping toward the map center; without
/// it a tie means standing still. A blocked escape turns around.
pub(crate) fn flee(ctx: &DecisionContext<'_>, offset: Offset, from_center: Option<Offset>) -> Action {
    let preferred = if offset.horizontal.abs() < offset.vertical.abs() {
        match offset.horizontal {
            h if h < 0 => Some(Direction::Right),
            h if h > 0 => Some(Direction::Left),
            _ => from_center.map(|c| if c.horizontal < 0 { Direction::Right } else { Direction::Left }),
        }
    } else {
        match offset.vertical {
            v if v < 0 => Some(Direction::Down),
            v if v > 0 => Some(Direction::Up),
            _ => from_center.map(|c| if c.vertical < 0 { Direction::Down } else { Direction::Up }),
        }
    };

    match preferred {
        Some(direction) if ctx.can_move(direction) => Action::Move(direction),
        Some(direction) => Action::Move(direction.opposite()),
        None => Action::Stop,
    }
}
