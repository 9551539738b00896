//! Decision Strategy Contract
//!
//! Strategies are untrusted plug-ins that pick one [`Action`] per decision.
//! They only ever see value snapshots built fresh for each call: the map
//! metadata, their own player, the other players and the live ability casts.
//! The only way back into the simulation is the returned action.
//!
//! ```text
//! Player::advance ──► DecisionContext::new(&Map, own view)
//!                          │  (read-only views, built per call)
//!                          ▼
//!                     Strategy::decide(&ctx) ──► Action
//! ```

use std::any::Any;

use serde::{Deserialize, Serialize};

use crate::core::rect::{self, Bounded, Offset, Rect};
use crate::game::entity::{Entity, EntityId};
use crate::game::map::{Map, MapInfo};

/// One of the four movement directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Negative y.
    Up,
    /// Positive y.
    Down,
    /// Negative x.
    Left,
    /// Positive x.
    Right,
}

impl Direction {
    /// All directions, in probe order.
    pub const ALL: [Direction; 4] = [Direction::Up, Direction::Down, Direction::Left, Direction::Right];

    /// Unit step for this direction.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    /// The direction pointing the other way.
    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

/// A strategy's decision for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Do nothing.
    #[default]
    Stop,
    /// Take a unit step.
    Move(Direction),
    /// Cast an ability at the current position.
    CastAbility,
}

impl Action {
    /// Movement actions are latched for the inertia run.
    pub fn is_move(&self) -> bool {
        matches!(self, Action::Move(_))
    }
}

/// Failure raised by strategy code.
///
/// Never fatal: the player treats it as [`Action::Stop`] for that tick.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StrategyFault {
    /// The strategy reported an error.
    #[error("strategy failed: {0}")]
    Failed(String),

    /// The strategy panicked.
    #[error("strategy panicked: {0}")]
    Panicked(String),
}

impl StrategyFault {
    /// Convert a caught panic payload.
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(text) = payload.downcast_ref::<&str>() {
            (*text).to_owned()
        } else if let Some(text) = payload.downcast_ref::<String>() {
            text.clone()
        } else {
            "non-string panic payload".to_owned()
        };
        StrategyFault::Panicked(message)
    }
}

/// A pluggable decision maker bound to one player.
///
/// Implementations may keep private state between calls but cannot reach the
/// simulation except through the [`DecisionContext`] they are handed.
pub trait Strategy: Send {
    /// Display name shown next to the player.
    fn name(&self) -> &str;

    /// Pick the next action.
    fn decide(&mut self, ctx: &DecisionContext<'_>) -> Result<Action, StrategyFault>;
}

// =============================================================================
// READ-ONLY VIEWS
// =============================================================================

/// Snapshot of a player as strategies see it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerView {
    /// Entity id.
    pub id: EntityId,
    /// Width.
    pub width: i32,
    /// Height.
    pub height: i32,
    /// Center x.
    pub x: i32,
    /// Center y.
    pub y: i32,
    /// Accumulated damage.
    pub damage: u32,
    /// True when the cast cooldown has run out.
    pub can_cast: bool,
}

impl PlayerView {
    /// Truncated half width.
    pub fn half_width(&self) -> i32 {
        self.width / 2
    }

    /// Truncated half height.
    pub fn half_height(&self) -> i32 {
        self.height / 2
    }

    /// The same view one step further in `direction`.
    pub fn with_step(&self, direction: Direction) -> PlayerView {
        let (dx, dy) = direction.delta();
        PlayerView {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }
}

impl Bounded for PlayerView {
    fn rect(&self) -> Rect {
        Rect::new(self.width, self.height, self.x, self.y)
    }
}

/// Threat rectangles around a pending ability cast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DangerZones {
    /// Band to the left of the cast.
    pub left: Rect,
    /// Band to the right.
    pub right: Rect,
    /// Band above.
    pub top: Rect,
    /// Band below.
    pub bottom: Rect,
}

/// Snapshot of an ability cast as strategies see it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityView {
    /// Entity id.
    pub id: EntityId,
    /// Width.
    pub width: i32,
    /// Height.
    pub height: i32,
    /// Center x.
    pub x: i32,
    /// Center y.
    pub y: i32,
    /// Detonation stages fired so far.
    pub stage: u32,
    /// Threat geometry.
    pub danger: DangerZones,
}

impl AbilityView {
    /// Footprint followed by the four danger bands.
    pub fn danger_rects(&self) -> [Rect; 5] {
        [
            self.rect(),
            self.danger.left,
            self.danger.right,
            self.danger.top,
            self.danger.bottom,
        ]
    }
}

impl Bounded for AbilityView {
    fn rect(&self) -> Rect {
        Rect::new(self.width, self.height, self.x, self.y)
    }
}

// =============================================================================
// DECISION CONTEXT
// =============================================================================

/// Everything a strategy may look at for one decision.
///
/// Holds a shared borrow of the map only to answer placement probes; the
/// views themselves are owned copies.
pub struct DecisionContext<'a> {
    map: &'a Map,
    own: PlayerView,
    others: Vec<PlayerView>,
    abilities: Vec<AbilityView>,
}

impl<'a> DecisionContext<'a> {
    /// Build the context for `own` from the current map contents.
    pub fn new(map: &'a Map, own: PlayerView) -> Self {
        let others = map
            .players()
            .filter(|player| player.id() != own.id)
            .map(|player| player.view())
            .collect();
        let abilities = map.ability_casts().map(|cast| cast.view()).collect();

        Self {
            map,
            own,
            others,
            abilities,
        }
    }

    /// Map dimensions, spawn bounds and center.
    pub fn map_info(&self) -> &MapInfo {
        self.map.info()
    }

    /// The deciding player.
    pub fn own(&self) -> &PlayerView {
        &self.own
    }

    /// Every other player.
    pub fn others(&self) -> &[PlayerView] {
        &self.others
    }

    /// Live ability casts.
    pub fn abilities(&self) -> &[AbilityView] {
        &self.abilities
    }

    /// Could the deciding player step in `direction` right now?
    pub fn can_move(&self, direction: Direction) -> bool {
        self.can_move_from(&self.own, direction)
    }

    /// Could `view` step in `direction`, ignoring its own footprint?
    pub fn can_move_from(&self, view: &PlayerView, direction: Direction) -> bool {
        let moved = view.with_step(direction);
        self.map.can_place(moved.id, &moved.rect())
    }

    /// Directions the deciding player can currently step in.
    pub fn movable_directions(&self) -> Vec<Direction> {
        Direction::ALL
            .into_iter()
            .filter(|direction| self.can_move(*direction))
            .collect()
    }

    /// Nearest other player by Manhattan distance.
    pub fn nearest_player(&self) -> Option<&PlayerView> {
        rect::nearest(&self.own.rect(), &self.others)
    }

    /// Nearest ability cast by Manhattan distance.
    pub fn nearest_ability(&self) -> Option<&AbilityView> {
        rect::nearest(&self.own.rect(), &self.abilities)
    }

    /// Signed offset from the deciding player to `target`.
    pub fn distance_to(&self, target: &impl Bounded) -> Offset {
        rect::distance(&self.own.rect(), &target.rect())
    }

    /// Other players sorted nearest first.
    pub fn others_by_distance(&self) -> Vec<PlayerView> {
        let mut sorted = self.others.clone();
        rect::sort_by_distance(&self.own.rect(), &mut sorted);
        sorted
    }
}
