//! Geometry Primitives
//!
//! Points, rectangles and the line clipping used by the hash pattern
//! generator, plus the unit conversion between board internal units and
//! millimetres.
//!
//! Board coordinates follow the layout editor convention: x grows to the
//! right and y grows downwards, so a rectangle's `top` is numerically
//! smaller than its `bottom`.

use serde::{Deserialize, Serialize};

/// Default board resolution: 1 nm internal units.
pub const IU_PER_MM: f64 = 1_000_000.0;

/// Conversion between board internal units and millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Units {
    pub iu_per_mm: f64,
}

impl Default for Units {
    fn default() -> Self {
        Self { iu_per_mm: IU_PER_MM }
    }
}

impl Units {
    pub fn new(iu_per_mm: f64) -> Self {
        Self { iu_per_mm }
    }

    /// Board units to millimetres
    pub fn to_mm(&self, units: f64) -> f64 {
        units / self.iu_per_mm
    }

    /// Millimetres to board units
    pub fn from_mm(&self, mm: f64) -> f64 {
        mm * self.iu_per_mm
    }

    pub fn point_to_mm(&self, p: Point) -> Point {
        Point::new(self.to_mm(p.x), self.to_mm(p.y))
    }
}

/// A 2D point in board units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Per-side distances subtracted from a source rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Offsets {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

impl Offsets {
    pub fn new(left: f64, right: f64, top: f64, bottom: f64) -> Self {
        Self { left, right, top, bottom }
    }

    pub fn uniform(amount: f64) -> Self {
        Self::new(amount, amount, amount, amount)
    }

    /// The four values in left, right, top, bottom order
    pub fn sides(&self) -> [(&'static str, f64); 4] {
        [
            ("left", self.left),
            ("right", self.right),
            ("top", self.top),
            ("bottom", self.bottom),
        ]
    }
}

/// Axis-aligned rectangle in board units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Rectangle {
    pub fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self { left, top, right, bottom }
    }

    /// Smallest rectangle holding every point, `None` for an empty input.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Point>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut rect = Rectangle::new(first.x, first.y, first.x, first.y);
        for p in iter {
            rect.left = rect.left.min(p.x);
            rect.top = rect.top.min(p.y);
            rect.right = rect.right.max(p.x);
            rect.bottom = rect.bottom.max(p.y);
        }
        Some(rect)
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    pub fn diagonal(&self) -> f64 {
        let dx = self.width();
        let dy = self.height();
        (dx * dx + dy * dy).sqrt()
    }

    /// True when both extents are non-negative.
    pub fn is_valid(&self) -> bool {
        self.left <= self.right && self.top <= self.bottom
    }

    /// Inclusive point membership test.
    pub fn contains(&self, p: Point) -> bool {
        within(p.x, self.left, self.right) && within(p.y, self.top, self.bottom)
    }

    pub fn union(&self, other: &Rectangle) -> Rectangle {
        Rectangle::new(
            self.left.min(other.left),
            self.top.min(other.top),
            self.right.max(other.right),
            self.bottom.max(other.bottom),
        )
    }

    /// Move each side inwards by its offset. The result is not validated.
    pub fn inset(&self, offsets: &Offsets) -> Rectangle {
        Rectangle::new(
            self.left + offsets.left,
            self.top + offsets.top,
            self.right - offsets.right,
            self.bottom - offsets.bottom,
        )
    }

    /// Move every side inwards by the same amount.
    pub fn shrink(&self, amount: f64) -> Rectangle {
        self.inset(&Offsets::uniform(amount))
    }

    /// Corners in top-left, top-right, bottom-right, bottom-left order.
    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.left, self.top),
            Point::new(self.right, self.top),
            Point::new(self.right, self.bottom),
            Point::new(self.left, self.bottom),
        ]
    }
}

/// Euclidean distance between two board points, in millimetres.
///
/// Both points go through the same conversion before the difference is
/// taken.
pub fn length(units: &Units, p1: Point, p2: Point) -> f64 {
    let a = units.point_to_mm(p1);
    let b = units.point_to_mm(p2);
    ((b.y - a.y).powi(2) + (b.x - a.x).powi(2)).sqrt()
}

/// Inclusive range test.
#[inline]
pub fn within(value: f64, low: f64, high: f64) -> bool {
    value >= low && value <= high
}

#[derive(Debug, Clone, Copy)]
enum Edge {
    Left,
    Right,
    Top,
    Bottom,
}

impl Edge {
    fn snap(self, p: &mut Point, rect: &Rectangle) {
        match self {
            Edge::Left => p.x = rect.left,
            Edge::Right => p.x = rect.right,
            Edge::Top => p.y = rect.top,
            Edge::Bottom => p.y = rect.bottom,
        }
    }
}

/// Clip the segment `p1 -> p2` to `rect` (Liang-Barsky).
///
/// Returns the surviving part in the original direction, or `None` when the
/// segment misses the rectangle or only touches it in a single point.
/// Endpoints produced by clipping are placed exactly on the edge they were
/// clipped against, and the other coordinate is clamped into the rectangle
/// to absorb rounding.
pub fn clip_segment_to_rect(p1: Point, p2: Point, rect: &Rectangle) -> Option<(Point, Point)> {
    if !rect.is_valid() {
        return None;
    }

    let dx = p2.x - p1.x;
    let dy = p2.y - p1.y;

    let mut t0 = 0.0_f64;
    let mut t1 = 1.0_f64;
    let mut enter: Option<Edge> = None;
    let mut exit: Option<Edge> = None;

    let checks = [
        (-dx, p1.x - rect.left, Edge::Left),
        (dx, rect.right - p1.x, Edge::Right),
        (-dy, p1.y - rect.top, Edge::Top),
        (dy, rect.bottom - p1.y, Edge::Bottom),
    ];

    for (p, q, edge) in checks {
        if p == 0.0 {
            // Parallel to this edge: either fully outside or unconstrained
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            if r > t0 {
                t0 = r;
                enter = Some(edge);
            }
        } else {
            if r < t0 {
                return None;
            }
            if r < t1 {
                t1 = r;
                exit = Some(edge);
            }
        }
    }

    if t0 >= t1 {
        return None;
    }

    let mut a = Point::new(p1.x + t0 * dx, p1.y + t0 * dy);
    let mut b = Point::new(p1.x + t1 * dx, p1.y + t1 * dy);
    if let Some(edge) = enter {
        edge.snap(&mut a, rect);
    }
    if let Some(edge) = exit {
        edge.snap(&mut b, rect);
    }
    for p in [&mut a, &mut b] {
        p.x = p.x.clamp(rect.left, rect.right);
        p.y = p.y.clamp(rect.top, rect.bottom);
    }

    if a == b {
        return None;
    }
    Some((a, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Rectangle {
        Rectangle::new(0.0, 0.0, 10.0, 10.0)
    }

    fn assert_close(actual: Point, expected: Point) {
        assert!(
            (actual.x - expected.x).abs() < 1e-9 && (actual.y - expected.y).abs() < 1e-9,
            "expected {:?}, got {:?}",
            expected,
            actual
        );
    }

    #[test]
    fn test_length_converts_units() {
        let units = Units::default();
        let len = length(&units, Point::new(0.0, 0.0), Point::new(1_000_000.0, 0.0));
        assert_eq!(len, 1.0);
    }

    #[test]
    fn test_length_pythagoras() {
        let units = Units::new(1.0);
        assert_eq!(length(&units, Point::new(0.0, 0.0), Point::new(3.0, 4.0)), 5.0);
    }

    #[test]
    fn test_within_is_inclusive() {
        assert!(within(0.0, 0.0, 1.0));
        assert!(within(1.0, 0.0, 1.0));
        assert!(!within(1.0000001, 0.0, 1.0));
        assert!(!within(-0.1, 0.0, 1.0));
    }

    #[test]
    fn test_rectangle_inset_and_validity() {
        let rect = square().inset(&Offsets::new(1.0, 2.0, 3.0, 4.0));
        assert_eq!(rect, Rectangle::new(1.0, 3.0, 8.0, 6.0));
        assert!(rect.is_valid());

        let collapsed = square().shrink(6.0);
        assert!(!collapsed.is_valid());
    }

    #[test]
    fn test_rectangle_from_points() {
        let rect = Rectangle::from_points(vec![
            Point::new(5.0, -1.0),
            Point::new(-2.0, 4.0),
            Point::new(1.0, 1.0),
        ])
        .unwrap();
        assert_eq!(rect, Rectangle::new(-2.0, -1.0, 5.0, 4.0));
        assert!(Rectangle::from_points(Vec::new()).is_none());
    }

    #[test]
    fn test_clip_segment_inside_unchanged() {
        let a = Point::new(2.0, 2.0);
        let b = Point::new(8.0, 5.0);
        assert_eq!(clip_segment_to_rect(a, b, &square()), Some((a, b)));
    }

    #[test]
    fn test_clip_segment_outside() {
        let result = clip_segment_to_rect(Point::new(11.0, 0.0), Point::new(20.0, 5.0), &square());
        assert!(result.is_none());
    }

    #[test]
    fn test_clip_segment_from_left() {
        let (a, b) =
            clip_segment_to_rect(Point::new(-5.0, 5.0), Point::new(5.0, 5.0), &square()).unwrap();
        assert_eq!(a, Point::new(0.0, 5.0));
        assert_eq!(b, Point::new(5.0, 5.0));
    }

    #[test]
    fn test_clip_segment_both_ends_negative_slope() {
        // Rising line (y decreases to the right) crossing bottom and right edges
        let (a, b) =
            clip_segment_to_rect(Point::new(0.0, 15.0), Point::new(15.0, 0.0), &square()).unwrap();
        assert_close(a, Point::new(5.0, 10.0));
        assert_close(b, Point::new(10.0, 5.0));
        assert_eq!(a.y, 10.0);
        assert_eq!(b.x, 10.0);
    }

    #[test]
    fn test_clip_segment_both_ends_positive_slope() {
        let (a, b) =
            clip_segment_to_rect(Point::new(-5.0, 0.0), Point::new(15.0, 20.0), &square()).unwrap();
        assert_eq!(a, Point::new(0.0, 5.0));
        assert_eq!(b, Point::new(5.0, 10.0));
    }

    #[test]
    fn test_clip_segment_corner_touch_is_empty() {
        let result = clip_segment_to_rect(Point::new(-5.0, 5.0), Point::new(5.0, -5.0), &square());
        assert!(result.is_none());
    }

    #[test]
    fn test_clip_segment_on_edge() {
        let (a, b) =
            clip_segment_to_rect(Point::new(-5.0, 0.0), Point::new(15.0, 0.0), &square()).unwrap();
        assert_eq!(a, Point::new(0.0, 0.0));
        assert_eq!(b, Point::new(10.0, 0.0));
    }
}
