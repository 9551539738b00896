//! Open Space
//!
//! Runs for the widest gap on the board. The map is coarsened into a grid of
//! player-sized cells; the strategy aims for the largest square of cells with
//! no player in it and re-aims whenever another player gets at least as close
//! as that target.
//!
//! Distances here are measured in cells, not pixels.

use crate::core::rect::{self, Bounded};
use crate::core::rng::DeterministicRng;
use crate::game::strategy::{AbilityView, Action, DecisionContext, Direction, PlayerView, Strategy, StrategyFault};

/// Registry name.
pub const NAME: &str = "open-space";

/// Casts closer than this many cells are considered threats.
const THREAT_RANGE: i32 = 4;

/// Order in which avoidable directions are reported.
const AVOID_ORDER: [Direction; 4] = [Direction::Down, Direction::Up, Direction::Right, Direction::Left];

/// Heads for the largest empty area.
#[derive(Debug, Clone)]
pub struct OpenSpace {
    target: Option<(i32, i32)>,
    previous: Option<Direction>,
    rng: DeterministicRng,
}

impl OpenSpace {
    /// Fresh instance with no target yet.
    pub fn new(seed: u64) -> Self {
        Self {
            target: None,
            previous: None,
            rng: DeterministicRng::new(seed),
        }
    }

    /// Target cell, if one has been picked.
    pub fn target(&self) -> Option<(i32, i32)> {
        self.target
    }

    /// Directions not leading toward a nearby cast.
    ///
    /// Each threat direction is checked against the list it was taken from,
    /// so nothing is ever excluded and all four directions come back.
    // TODO: confirm with product whether threat directions should be removed
    // here; callers already intersect with this list.
    pub fn avoidable_directions(ctx: &DecisionContext<'_>) -> Vec<Direction> {
        let own = ctx.own();
        let mut threats = Vec::new();
        for ability in ctx.abilities() {
            if !within_cells(own, ability, THREAT_RANGE) {
                continue;
            }
            let toward = directions_toward(ability.x - own.x, ability.y - own.y);
            threats.extend(toward.iter().copied().filter(|direction| !toward.contains(direction)));
        }

        AVOID_ORDER
            .into_iter()
            .filter(|direction| !threats.contains(direction))
            .collect()
    }

    /// Top-left-ish cell of the largest player-free square.
    ///
    /// `None` when every cell holds a player.
    pub fn largest_square(ctx: &DecisionContext<'_>) -> Option<(i32, i32)> {
        let own = ctx.own();
        let info = ctx.map_info();
        let cols = ceil_div(info.width, own.width) as usize;
        let rows = ceil_div(info.height, own.height) as usize;

        let mut grid = vec![vec![true; cols]; rows];
        for other in ctx.others() {
            let (x, y) = cell_of(own, other.x, other.y);
            if let Some(cell) = grid.get_mut(y as usize).and_then(|row| row.get_mut(x as usize)) {
                *cell = false;
            }
        }

        // classic largest-square DP; `diagonal` carries over between rows
        let mut sizes = vec![0i32; cols + 1];
        let mut diagonal = 0;
        let (mut best_x, mut best_y, mut best) = (0i32, 0i32, 0i32);
        for (row_index, row) in grid.iter().enumerate() {
            for (col_index, free) in row.iter().enumerate() {
                let above = sizes[col_index + 1];
                if *free {
                    let size = sizes[col_index].min(above).min(diagonal) + 1;
                    sizes[col_index + 1] = size;
                    if size > best {
                        best_x = col_index as i32;
                        best_y = row_index as i32;
                        best = size;
                    }
                } else {
                    sizes[col_index + 1] = 0;
                }
                diagonal = above;
            }
        }

        (best > 0).then(|| ((2 * best_x - best) / 2, (2 * best_y - best) / 2))
    }

    fn pick_direction(&mut self, ctx: &DecisionContext<'_>, target: Option<(i32, i32)>) -> Option<Direction> {
        let movable = ctx.movable_directions();
        let avoidable = Self::avoidable_directions(ctx);

        let wanted = target
            .map(|(x, y)| {
                let (px, py) = cell_of(ctx.own(), ctx.own().x, ctx.own().y);
                directions_toward(x - px, y - py)
            })
            .unwrap_or_default();

        let direction = wanted
            .into_iter()
            .find(|direction| movable.contains(direction) && avoidable.contains(direction));

        direction.or_else(|| match self.previous {
            Some(previous) if movable.contains(&previous) => Some(previous),
            _ => self.rng.choose(&movable).copied(),
        })
    }
}

impl Strategy for OpenSpace {
    fn name(&self) -> &str {
        NAME
    }

    fn decide(&mut self, ctx: &DecisionContext<'_>) -> Result<Action, StrategyFault> {
        let own = *ctx.own();
        let nearest = ctx.nearest_player().copied();

        let retarget = match (self.target, nearest) {
            (None, _) => true,
            (Some((tx, ty)), Some(player)) => {
                let (nx, ny) = cell_of(&own, player.x, player.y);
                cell_distance(&own, tx, ty) <= cell_distance(&own, nx, ny)
            }
            (Some(_), None) => false,
        };
        if retarget {
            self.target = Self::largest_square(ctx);
        }

        if let Some(player) = nearest {
            if own.can_cast && rect::manhattan_distance(&own.rect(), &player.rect()) <= own.width {
                return Ok(Action::CastAbility);
            }
        }

        let direction = self.pick_direction(ctx, self.target);
        self.previous = direction;
        Ok(direction.map(Action::Move).unwrap_or(Action::Stop))
    }
}

// =============================================================================
// GRID HELPERS
// =============================================================================

fn ceil_div(value: i32, step: i32) -> i32 {
    let step = step.max(1);
    (value + step - 1) / step
}

fn cell_of(own: &PlayerView, x: i32, y: i32) -> (i32, i32) {
    (x / own.width.max(1), y / own.height.max(1))
}

/// Whole-cell Euclidean distance from the player's cell to `(x, y)`.
fn cell_distance(own: &PlayerView, x: i32, y: i32) -> i32 {
    let (px, py) = cell_of(own, own.x, own.y);
    let dx = (px - x) as i64;
    let dy = (py - y) as i64;
    isqrt(dx * dx + dy * dy) as i32
}

fn within_cells(own: &PlayerView, ability: &AbilityView, range: i32) -> bool {
    let (ax, ay) = cell_of(own, ability.x, ability.y);
    cell_distance(own, ax, ay) <= range
}

/// Horizontal direction first, then vertical; zero deltas contribute nothing.
fn directions_toward(dx: i32, dy: i32) -> Vec<Direction> {
    let mut directions = Vec::with_capacity(2);
    match dx {
        d if d < 0 => directions.push(Direction::Left),
        d if d > 0 => directions.push(Direction::Right),
        _ => {}
    }
    match dy {
        d if d < 0 => directions.push(Direction::Up),
        d if d > 0 => directions.push(Direction::Down),
        _ => {}
    }
    directions
}

fn isqrt(value: i64) -> i64 {
    if value < 2 {
        return value.max(0);
    }
    let mut x = value;
    let mut y = (x + 1) / 2;
    while y < x {
        x = y;
        y = (x + value / x) / 2;
    }
    x
}
