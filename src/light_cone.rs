//! Which events a cell's contents decide.
//!
//! A macro-cell of level `n >= 1` centered at `c` covers `[c - 2^(n-1), c + 2^(n-1))` on both
//! axes, a leaf at `c` covers exactly `c`. Information travels at most one cell per generation,
//! so `t` generations later only the leaves at least `t` cells away from the border are still
//! decided by the cell alone. Over time this shrinks the covered square into a pyramid, which
//! is what [`in_light_cone`] tests for.
//!
//! The predicate recurses the same way [`Cell::result`](crate::Cell::result) does: through the
//! result itself, the nine overlapping sub-cells, or the four intermediate cells.

use crate::Generation;
use crate::WorldOffset;
use crate::point::Point;
use crate::point::Spacetime;
use crate::world::MAX_LEVEL;

/// Whether `event` is decided by the contents of a cell of the given level centered at
/// `center`, with `event.t` counted from the time of the cell.
///
/// Panics if `level` exceeds [`MAX_LEVEL`]: larger cells do not fit [`WorldOffset`]
/// coordinates.
pub fn in_light_cone(level: u32, center: Point, event: Spacetime) -> bool {
    assert!(
        level <= MAX_LEVEL,
        "light cone of a level {level} cell, coordinates only reach level {MAX_LEVEL}"
    );

    if event.t < 0 {
        return false;
    }

    if level == 0 {
        return event.t == 0 && event.point() == center;
    }

    // Into the result: the 2^{level - 1} cell at the center, 2^{level - 2} generations later
    if level >= 2 {
        let advance = advance(level);

        if event.t >= advance && in_center(level, center, event) {
            return in_light_cone(level - 1, center, event.shifted(advance));
        }
    }

    if event.t == 0 {
        return in_light_cone(level - 1, quadrant_center(level, center, event), event);
    }

    if level < 3 {
        return false;
    }

    // Halfway to the result
    let half = advance(level) / 2;
    let quarter: WorldOffset = 1 << (level - 3);

    if event.t <= half {
        // One of the nine overlapping sub-cells, at the same time
        let pick = |c: WorldOffset, p: WorldOffset| {
            if p < c - quarter {
                c - 2 * quarter
            } else if p >= c + quarter {
                c + 2 * quarter
            } else {
                c
            }
        };

        let sub = Point::new(pick(center.x, event.x), pick(center.y, event.y));

        in_light_cone(level - 1, sub, event)
    } else if event.t < advance(level) {
        // One of the four intermediate cells, assembled from the results of the nine
        let pick = |c: WorldOffset, p: WorldOffset| {
            if p < c { c - quarter } else { c + quarter }
        };

        let sub = Point::new(pick(center.x, event.x), pick(center.y, event.y));

        in_light_cone(level - 1, sub, event.shifted(half))
    } else {
        false
    }
}

/// Number of generations the result of a cell of `level >= 2` is ahead of it.
///
/// Panics outside of `2..=MAX_LEVEL`.
pub const fn advance(level: u32) -> Generation {
    assert!(2 <= level && level <= MAX_LEVEL, "no generation count for this level");

    1 << (level - 2)
}

/// Whether `event` lies in the central `2^{level - 1}` square of a cell, `level >= 2`.
fn in_center(level: u32, center: Point, event: Spacetime) -> bool {
    let r: WorldOffset = 1 << (level - 2);
    let within = |c: WorldOffset, p: WorldOffset| c - r <= p && p < c + r;

    within(center.x, event.x) && within(center.y, event.y)
}

/// Center of the quadrant of a cell, `level >= 1`, which `event` falls into. Points outside
/// the cell are attributed to the closest quadrant.
fn quadrant_center(level: u32, center: Point, event: Spacetime) -> Point {
    // A leaf's "center" is the leaf itself, which sits to the south-east of its parent's center
    let (lo, hi): (WorldOffset, WorldOffset) = if level == 1 {
        (1, 0)
    } else {
        let r = 1 << (level - 2);
        (r, r)
    };

    let pick = |c: WorldOffset, p: WorldOffset| if p < c { c - lo } else { c + hi };

    Point::new(pick(center.x, event.x), pick(center.y, event.y))
}

#[cfg(test)]
mod test {
    use proptest::prelude::*;

    use super::advance;
    use super::in_light_cone;
    use crate::point::Point;
    use crate::point::Spacetime;

    /// The light cone, in closed form.
    fn pyramid(level: u32, c: Point, e: Spacetime) -> bool {
        if e.t < 0 {
            return false;
        }

        if level == 0 {
            return e.t == 0 && e.point() == c;
        }

        let h = 1i64 << (level - 1);
        let within = |c: i64, p: i64| c - h + e.t <= p && p < c + h - e.t;

        within(c.x, e.x) && within(c.y, e.y)
    }

    #[test]
    fn leaf_cone_is_a_single_event() {
        let c = Point::new(3, -7);

        assert!(in_light_cone(0, c, c.at(0)));

        for (dx, dy, t) in [(0, 0, 1), (0, 0, -1), (1, 0, 0), (0, -1, 0), (1, 1, 1)] {
            assert!(!in_light_cone(0, c, c.offset(dx, dy).at(t)));
        }
    }

    #[test]
    fn result_center_is_in_cone() {
        let c = Point::new(5, 9);

        for level in 2..20 {
            assert!(in_light_cone(level, c, c.at(advance(level))), "level {level}");
        }
    }

    #[test]
    fn one_width_outside_is_not() {
        let c = Point::new(-4, 2);

        for level in 1..20 {
            let w = 1i64 << level;
            let t = if level >= 2 { advance(level) } else { 0 };

            for (dx, dy) in [(w, 0), (-w, 0), (0, w), (0, -w), (w, w)] {
                assert!(!in_light_cone(level, c, c.offset(dx, dy).at(t)), "level {level}");
                assert!(!in_light_cone(level, c, c.offset(dx, dy).at(0)), "level {level}");
            }
        }
    }

    #[test]
    fn past_is_never_in_cone() {
        let c = Point::default();

        for level in 0..10 {
            assert!(!in_light_cone(level, c, c.at(-1)));
        }
    }

    #[test]
    fn whole_cell_at_time_zero() {
        let c = Point::new(1, 1);
        let level = 3;

        for y in -3..5 {
            for x in -3..5 {
                assert!(in_light_cone(level, c, Point::new(x, y).at(0)), "({x}, {y})");
            }
        }

        assert!(!in_light_cone(level, c, Point::new(5, 1).at(0)));
        assert!(!in_light_cone(level, c, Point::new(1, -4).at(0)));
    }

    #[test]
    fn cone_shrinks_one_cell_per_generation() {
        let c = Point::default();
        let level = 4;

        for t in 0..8 {
            let edge = 8 - t;

            assert!(in_light_cone(level, c, Point::new(edge - 1, 0).at(t)), "t = {t}");
            assert!(in_light_cone(level, c, Point::new(-edge, 0).at(t)), "t = {t}");
            assert!(!in_light_cone(level, c, Point::new(edge, 0).at(t)), "t = {t}");
            assert!(!in_light_cone(level, c, Point::new(-edge - 1, 0).at(t)), "t = {t}");
        }

        assert!(!in_light_cone(level, c, c.at(8)));
    }

    #[test]
    fn largest_cell_is_exact() {
        let level = 62;
        let h = 1i64 << 61;
        let c = Point::default();

        for e in [
            Point::new(-h, -h).at(0),
            Point::new(h - 1, 0).at(0),
            Point::new(-h + 5, h - 6).at(5),
            c.at(1 << 60),
            c.at(h - 1),
        ] {
            assert_eq!(in_light_cone(level, c, e), pyramid(level, c, e), "{e:?}");
            assert!(in_light_cone(level, c, e), "{e:?}");
        }

        for e in [
            Point::new(h, 0).at(0),
            Point::new(-h, -h).at(1),
            c.at(h),
        ] {
            assert!(!in_light_cone(level, c, e), "{e:?}");
        }

        assert_eq!(advance(level), 1 << 60);
    }

    #[test]
    #[should_panic(expected = "coordinates only reach level 62")]
    fn cells_beyond_coordinates_are_rejected() {
        in_light_cone(63, Point::default(), Point::default().at(0));
    }

    #[test]
    #[should_panic(expected = "no generation count")]
    fn advance_beyond_coordinates_is_rejected() {
        advance(70);
    }

    proptest! {
        #[test]
        fn matches_closed_form(
            level in 0u32..10,
            cx in -100i64..100,
            cy in -100i64..100,
            dx in -600i64..600,
            dy in -600i64..600,
            t in -4i64..600,
        ) {
            let c = Point::new(cx, cy);
            let e = c.offset(dx >> (10 - level), dy >> (10 - level)).at(t >> (10 - level));

            prop_assert_eq!(in_light_cone(level, c, e), pyramid(level, c, e));
        }
    }
}
