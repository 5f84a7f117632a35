//! Small 2D primitives shared by the crop geometry and resampling stages.

/// A 2D point/vector with f64 coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean length when treated as a vector.
    pub fn hypot(&self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Counter-clockwise quarter turn: `(-y, x)`.
    pub fn rot90(&self) -> Self {
        Self::new(-self.y, self.x)
    }
}

impl std::ops::Add for Point {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::Sub for Point {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl std::ops::Mul<f64> for Point {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self::Output {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

/// The four-corner parallelogram in source-image coordinates that maps onto
/// the output square. Corner order is fixed: top-left, bottom-left,
/// bottom-right, top-right relative to the crop basis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quad {
    pub corners: [Point; 4],
}

impl Quad {
    pub fn new(corners: [Point; 4]) -> Self {
        Self { corners }
    }

    pub fn translated(&self, offset: Point) -> Self {
        Self::new(self.corners.map(|p| p + offset))
    }

    pub fn scaled(&self, factor: f64) -> Self {
        Self::new(self.corners.map(|p| p * factor))
    }

    /// Axis-aligned bounds as (min_x, min_y, max_x, max_y).
    pub fn bounds(&self) -> (f64, f64, f64, f64) {
        let mut min_x = f64::INFINITY;
        let mut min_y = f64::INFINITY;
        let mut max_x = f64::NEG_INFINITY;
        let mut max_y = f64::NEG_INFINITY;
        for p in &self.corners {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        (min_x, min_y, max_x, max_y)
    }
}

/// Integer rectangle in raster coordinates. `right` and `bottom` are
/// exclusive when used as crop extents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BBox {
    pub left: i64,
    pub top: i64,
    pub right: i64,
    pub bottom: i64,
}

impl BBox {
    /// Tight integer bounds of a quad: floored minima, ceiled maxima.
    pub fn of_quad(quad: &Quad) -> Self {
        let (min_x, min_y, max_x, max_y) = quad.bounds();
        Self {
            left: min_x.floor() as i64,
            top: min_y.floor() as i64,
            right: max_x.ceil() as i64,
            bottom: max_y.ceil() as i64,
        }
    }

    pub fn expand(self, border: i64) -> Self {
        Self {
            left: self.left - border,
            top: self.top - border,
            right: self.right + border,
            bottom: self.bottom + border,
        }
    }

    /// Intersect with raster bounds. Always applied before cropping.
    pub fn clamp(self, width: u32, height: u32) -> Self {
        Self {
            left: self.left.max(0),
            top: self.top.max(0),
            right: self.right.min(width as i64),
            bottom: self.bottom.min(height as i64),
        }
    }

    pub fn width(&self) -> i64 {
        self.right - self.left
    }

    pub fn height(&self) -> i64 {
        self.bottom - self.top
    }

    /// Strict containment used by the shift sampler: the box must not touch
    /// the right/bottom raster edge.
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.left >= 0 && self.top >= 0 && self.right < width as i64 && self.bottom < height as i64
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.left as f64
            && p.y >= self.top as f64
            && p.x <= self.right as f64
            && p.y <= self.bottom as f64
    }
}
