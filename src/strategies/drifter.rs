//! Always walks left. Useful as a baseline and in tests.

use crate::game::strategy::{Action, DecisionContext, Direction, Strategy, StrategyFault};

/// Registry name.
pub const NAME: &str = "drifter";

/// Walks left forever, even into a wall.
#[derive(Debug, Clone, Copy, Default)]
pub struct Drifter;

impl Strategy for Drifter {
    fn name(&self) -> &str {
        NAME
    }

    fn decide(&mut self, _ctx: &DecisionContext<'_>) -> Result<Action, StrategyFault> {
        Ok(Action::Move(Direction::Left))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::map::Map;
    use crate::strategies::test_support::{decide, player};

    #[test]
    fn test_walks_left_even_when_blocked() {
        let mut map = Map::new(500, 400, 1);
        let free = player(&mut map, 200, 200);
        let walled = player(&mut map, 16, 100);

        assert_eq!(decide(&map, free, &mut Drifter), Action::Move(Direction::Left));
        assert_eq!(decide(&map, walled, &mut Drifter), Action::Move(Direction::Left));
    }
}
