use core::ops::{Add, Sub};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point2d {
    pub x: f64,
    pub y: f64,
}

/// Additive translation between two coordinate frames.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Offset2d {
    pub dx: f64,
    pub dy: f64,
}

impl Offset2d {
    pub fn new(dx: f64, dy: f64) -> Self {
        Self { dx, dy }
    }

    /// Drops the fractional part of both components.
    pub fn truncated(self) -> Self {
        Self {
            dx: self.dx.trunc(),
            dy: self.dy.trunc(),
        }
    }
}

impl Add<Offset2d> for Point2d {
    type Output = Point2d;

    fn add(self, rhs: Offset2d) -> Self::Output {
        Point2d {
            x: self.x + rhs.dx,
            y: self.y + rhs.dy,
        }
    }
}

impl Sub<Offset2d> for Point2d {
    type Output = Point2d;

    fn sub(self, rhs: Offset2d) -> Self::Output {
        Point2d {
            x: self.x - rhs.dx,
            y: self.y - rhs.dy,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Pixel {
    pub x: i64,
    pub y: i64,
}

impl Pixel {
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// Truncates toward zero, matching integer casts of the source data.
    pub fn from_point(p: Point2d) -> Self {
        Self {
            x: p.x.trunc() as i64,
            y: p.y.trunc() as i64,
        }
    }

    pub fn dist_sq(self, other: Pixel) -> i64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }
}

/// Inclusive axis-aligned pixel box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub min: Pixel,
    pub max: Pixel,
}

impl BoundingBox {
    pub fn new(min: Pixel, max: Pixel) -> Self {
        Self { min, max }
    }

    pub fn from_pixels<'a>(pixels: impl IntoIterator<Item = &'a Pixel>) -> Option<Self> {
        let mut iter = pixels.into_iter();
        let first = *iter.next()?;
        let mut bb = Self {
            min: first,
            max: first,
        };
        for p in iter {
            bb.min.x = bb.min.x.min(p.x);
            bb.min.y = bb.min.y.min(p.y);
            bb.max.x = bb.max.x.max(p.x);
            bb.max.y = bb.max.y.max(p.y);
        }
        Some(bb)
    }

    pub fn width(&self) -> i64 {
        self.max.x - self.min.x + 1
    }

    pub fn height(&self) -> i64 {
        self.max.y - self.min.y + 1
    }

    pub fn contains(&self, p: Pixel) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    pub fn overlaps(&self, other: &BoundingBox) -> bool {
        if other.min.x > self.max.x || self.min.x > other.max.x {
            return false;
        }
        if other.min.y > self.max.y || self.min.y > other.max.y {
            return false;
        }
        true
    }
}
