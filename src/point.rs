use core::fmt::Debug;

use crate::Generation;
use crate::WorldOffset;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    pub x: WorldOffset,
    pub y: WorldOffset,
}

impl Point {
    pub const fn new(x: WorldOffset, y: WorldOffset) -> Self {
        Self { x, y }
    }

    /// Translate the current `Point` by `(dx, dy)`.
    pub const fn offset(&self, dx: WorldOffset, dy: WorldOffset) -> Self {
        Point {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// This `Point`, `t` generations after the reference time.
    pub const fn at(&self, t: Generation) -> Spacetime {
        Spacetime {
            x: self.x,
            y: self.y,
            t,
        }
    }
}

impl Debug for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A cell coordinate together with a generation offset.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Spacetime {
    pub x: WorldOffset,
    pub y: WorldOffset,
    pub t: Generation,
}

impl Spacetime {
    pub const fn new(x: WorldOffset, y: WorldOffset, t: Generation) -> Self {
        Self { x, y, t }
    }

    pub const fn point(&self) -> Point {
        Point {
            x: self.x,
            y: self.y,
        }
    }

    /// Move the reference time forward by `dt`, so the same event happens `dt` generations
    /// sooner.
    pub const fn shifted(&self, dt: Generation) -> Self {
        Spacetime {
            t: self.t - dt,
            ..*self
        }
    }
}

impl Debug for Spacetime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}; t{:+})", self.x, self.y, self.t)
    }
}

#[cfg(test)]
mod test {
    use super::Point;
    use super::Spacetime;

    #[test]
    fn shifting_rebases_time() {
        let p = Point::new(3, -2).at(5);

        assert_eq!(p.shifted(2), Spacetime::new(3, -2, 3));
        assert_eq!(p.shifted(2).point(), Point::new(3, -2));
    }

    #[test]
    fn debug_format() {
        assert_eq!(format!("{:?}", Point::new(1, -1)), "(1, -1)");
        assert_eq!(format!("{:?}", Spacetime::new(0, 4, -3)), "(0, 4; t-3)");
    }
}
