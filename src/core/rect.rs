//! Axis-Aligned Rectangles
//!
//! Integer rectangles described by a center point and an extent. Corner
//! bounds use truncating half-extents, so a rectangle with an odd width is
//! one unit wider on its right side than on its left.
//!
//! Edge contact is not a collision: two rectangles collide only when their
//! bound intervals strictly overlap on both axes.

use serde::{Deserialize, Serialize};

/// Corner bounds of a rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounds {
    /// Left edge.
    pub x1: i32,
    /// Top edge.
    pub y1: i32,
    /// Right edge.
    pub x2: i32,
    /// Bottom edge.
    pub y2: i32,
}

/// Signed offset between two centers (target minus source).
///
/// A negative `horizontal` means the target lies to the left of the source,
/// a negative `vertical` means it lies above.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Offset {
    /// Signed x delta.
    pub horizontal: i32,
    /// Signed y delta.
    pub vertical: i32,
}

/// Center-anchored integer rectangle.
///
/// The corner bounds are derived data and are recomputed on every mutation,
/// so they are never stale. `Rect` is `Copy`: anything handed out is a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    width: i32,
    height: i32,
    x: i32,
    y: i32,
    bounds: Bounds,
}

impl Rect {
    /// Create a rectangle of the given size centered at `(x, y)`.
    pub fn new(width: i32, height: i32, x: i32, y: i32) -> Self {
        let mut rect = Self {
            width,
            height,
            x,
            y,
            bounds: Bounds { x1: 0, y1: 0, x2: 0, y2: 0 },
        };
        rect.recompute();
        rect
    }

    /// Same size, different center.
    pub fn at(self, x: i32, y: i32) -> Self {
        Self::new(self.width, self.height, x, y)
    }

    /// Move the center.
    pub fn set_position(&mut self, x: i32, y: i32) {
        self.x = x;
        self.y = y;
        self.recompute();
    }

    /// Change the extent, keeping the center.
    pub fn set_size(&mut self, width: i32, height: i32) {
        self.width = width;
        self.height = height;
        self.recompute();
    }

    fn recompute(&mut self) {
        let half_w = self.width / 2;
        let half_h = self.height / 2;
        self.bounds = Bounds {
            x1: self.x - half_w,
            y1: self.y - half_h,
            x2: self.x + half_w,
            y2: self.y + half_h,
        };
    }

    /// Width.
    pub fn width(&self) -> i32 {
        self.width
    }

    /// Height.
    pub fn height(&self) -> i32 {
        self.height
    }

    /// Truncated half width.
    pub fn half_width(&self) -> i32 {
        self.width / 2
    }

    /// Truncated half height.
    pub fn half_height(&self) -> i32 {
        self.height / 2
    }

    /// Center x.
    pub fn x(&self) -> i32 {
        self.x
    }

    /// Center y.
    pub fn y(&self) -> i32 {
        self.y
    }

    /// Corner bounds.
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Strict-overlap collision test against another rectangle.
    pub fn collides(&self, other: &Rect) -> bool {
        collide(self, other)
    }

    /// Inclusive overlap: edge contact counts.
    pub fn touches(&self, other: &Rect) -> bool {
        let a = self.bounds;
        let b = other.bounds;
        a.x1 <= b.x2 && a.x2 >= b.x1 && a.y1 <= b.y2 && a.y2 >= b.y1
    }
}

/// True iff the bound intervals overlap on both axes. Edge contact does not count.
pub fn collide(a: &Rect, b: &Rect) -> bool {
    let a = a.bounds;
    let b = b.bounds;
    a.x1 < b.x2 && a.x2 > b.x1 && a.y1 < b.y2 && a.y2 > b.y1
}

/// Signed center delta from `source` to `target`.
pub fn distance(source: &Rect, target: &Rect) -> Offset {
    Offset {
        horizontal: target.x - source.x,
        vertical: target.y - source.y,
    }
}

/// Manhattan distance between centers.
pub fn manhattan_distance(a: &Rect, b: &Rect) -> i32 {
    (a.x - b.x).abs() + (a.y - b.y).abs()
}

/// Anything with a footprint.
pub trait Bounded {
    /// The footprint, by value.
    fn rect(&self) -> Rect;
}

impl Bounded for Rect {
    fn rect(&self) -> Rect {
        *self
    }
}

impl<T: Bounded + ?Sized> Bounded for &T {
    fn rect(&self) -> Rect {
        (**self).rect()
    }
}

/// Sort by Manhattan distance from `source`, nearest first.
///
/// Stable: equally distant items keep their original order.
pub fn sort_by_distance<T: Bounded>(source: &Rect, items: &mut [T]) {
    items.sort_by_key(|item| manhattan_distance(source, &item.rect()));
}

/// Nearest item by Manhattan distance; the first one wins ties.
pub fn nearest<'a, T: Bounded>(source: &Rect, items: &'a [T]) -> Option<&'a T> {
    items
        .iter()
        .enumerate()
        .min_by_key(|(index, item)| (manhattan_distance(source, &item.rect()), *index))
        .map(|(_, item)| item)
}

/// Keep items that collide with `source` (`include = true`) or that don't.
pub fn filter_by_collision<'a, T: Bounded>(source: &Rect, items: &'a [T], include: bool) -> Vec<&'a T> {
    items
        .iter()
        .filter(|item| collide(source, &item.rect()) == include)
        .collect()
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_bounds_from_center() {
        let rect = Rect::new(32, 32, 16, 16);
        assert_eq!(rect.bounds(), Bounds { x1: 0, y1: 0, x2: 32, y2: 32 });
    }

    #[test]
    fn test_odd_extent_truncates() {
        // 5 / 2 == 2, so the right edge sits at x + 2 as well
        let rect = Rect::new(5, 3, 10, 10);
        assert_eq!(rect.bounds(), Bounds { x1: 8, y1: 9, x2: 12, y2: 11 });
    }

    #[test]
    fn test_bounds_follow_position_and_size() {
        let mut rect = Rect::new(32, 32, 0, 0);
        rect.set_position(100, 50);
        assert_eq!(rect.bounds().x1, 84);
        assert_eq!(rect.bounds().y2, 66);

        rect.set_size(10, 20);
        assert_eq!(rect.bounds(), Bounds { x1: 95, y1: 40, x2: 105, y2: 60 });
    }

    #[test]
    fn test_edge_contact_is_not_collision() {
        let a = Rect::new(32, 32, 16, 16);
        let b = Rect::new(32, 32, 48, 16);
        assert!(!collide(&a, &b));
        assert!(a.touches(&b));

        let c = Rect::new(32, 32, 47, 16);
        assert!(collide(&a, &c));
    }

    #[test]
    fn test_distance_is_signed() {
        let me = Rect::new(32, 32, 100, 100);
        let left_above = Rect::new(32, 32, 40, 70);
        assert_eq!(distance(&me, &left_above), Offset { horizontal: -60, vertical: -30 });
        assert_eq!(manhattan_distance(&me, &left_above), 90);
    }

    #[test]
    fn test_sort_and_nearest_are_stable() {
        let me = Rect::new(32, 32, 0, 0);
        let mut items = vec![
            Rect::new(32, 32, 10, 0),
            Rect::new(2, 2, 0, 10),
            Rect::new(32, 32, 5, 0),
        ];

        let first = nearest(&me, &items).copied();
        assert_eq!(first, Some(Rect::new(32, 32, 5, 0)));

        sort_by_distance(&me, &mut items);
        assert_eq!(items[0].x(), 5);
        // equal distance: original order kept
        assert_eq!((items[1].x(), items[1].y()), (10, 0));
        assert_eq!((items[2].x(), items[2].y()), (0, 10));
    }

    #[test]
    fn test_nearest_ties_prefer_first() {
        let me = Rect::new(32, 32, 0, 0);
        let items = [Rect::new(4, 4, 0, 10), Rect::new(8, 8, 10, 0)];
        assert_eq!(nearest(&me, &items).map(|r| r.width()), Some(4));
        assert!(nearest::<Rect>(&me, &[]).is_none());
    }

    #[test]
    fn test_filter_by_collision() {
        let me = Rect::new(32, 32, 50, 50);
        let items = [
            Rect::new(32, 32, 60, 60),
            Rect::new(32, 32, 200, 200),
            Rect::new(32, 32, 82, 50),
        ];

        let hit = filter_by_collision(&me, &items, true);
        assert_eq!(hit.len(), 1);
        assert_eq!(hit[0].x(), 60);

        let miss = filter_by_collision(&me, &items, false);
        assert_eq!(miss.len(), 2);
    }

    fn arb_rect() -> impl Strategy<Value = Rect> {
        (1..200i32, 1..200i32, -500..500i32, -500..500i32)
            .prop_map(|(w, h, x, y)| Rect::new(w, h, x, y))
    }

    proptest! {
        #[test]
        fn test_collide_is_symmetric(a in arb_rect(), b in arb_rect()) {
            prop_assert_eq!(collide(&a, &b), collide(&b, &a));
        }

        #[test]
        fn test_same_center_always_collides(
            (w1, h1, w2, h2) in (2..200i32, 2..200i32, 2..200i32, 2..200i32),
            (x, y) in (-500..500i32, -500..500i32),
        ) {
            let a = Rect::new(w1, h1, x, y);
            let b = Rect::new(w2, h2, x, y);
            prop_assert!(collide(&a, &b));
        }

        #[test]
        fn test_separated_never_collides(a in arb_rect(), b in arb_rect(), gap in 0..50i32) {
            let dx = a.half_width() + b.half_width() + gap + 1;
            let dy = a.half_height() + b.half_height() + gap + 1;
            let moved = b.at(a.x() + dx, a.y() + dy);
            prop_assert!(!collide(&a, &moved));
        }
    }
}
