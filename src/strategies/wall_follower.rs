//! Walks straight until blocked, then turns counter-clockwise.

use crate::game::strategy::{Action, DecisionContext, Direction, Strategy, StrategyFault};

/// Registry name.
pub const NAME: &str = "wall-follower";

/// Keeps a heading; turns Up → Left → Down → Right → Up when it is blocked.
#[derive(Debug, Clone, Copy)]
pub struct WallFollower {
    heading: Direction,
}

impl WallFollower {
    /// Start with a given heading.
    pub fn new(heading: Direction) -> Self {
        Self { heading }
    }

    /// Current heading.
    pub fn heading(&self) -> Direction {
        self.heading
    }

    fn turn(direction: Direction) -> Direction {
        match direction {
            Direction::Up => Direction::Left,
            Direction::Left => Direction::Down,
            Direction::Down => Direction::Right,
            Direction::Right => Direction::Up,
        }
    }
}

impl Default for WallFollower {
    fn default() -> Self {
        Self::new(Direction::Up)
    }
}

impl Strategy for WallFollower {
    fn name(&self) -> &str {
        NAME
    }

    fn decide(&mut self, ctx: &DecisionContext<'_>) -> Result<Action, StrategyFault> {
        // one turn per decision; a corner takes two
        if !ctx.can_move(self.heading) {
            self.heading = Self::turn(self.heading);
        }
        Ok(Action::Move(self.heading))
    }
}
