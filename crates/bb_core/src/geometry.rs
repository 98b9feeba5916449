//! Basic field geometry: points, bearings and cardinal direction buckets.

use serde::{Deserialize, Serialize};
use std::f32::consts::FRAC_1_SQRT_2;

/// A position on the canvas, in canvas units (y grows downward).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance(&self, other: Point) -> f32 {
        ((other.x - self.x).powi(2) + (other.y - self.y).powi(2)).sqrt()
    }

    /// Bearing from this point to another, in radians (atan2 convention).
    pub fn angle_to(&self, other: Point) -> f32 {
        (other.y - self.y).atan2(other.x - self.x)
    }

    /// Midpoint between this point and another.
    pub fn midpoint(&self, other: Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }
}

/// Cardinal direction bucket derived from a facing angle.
///
/// Used to pick directional animation rows, never as a physics input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Dir {
    Up,
    Left,
    Down,
    Right,
}

impl Dir {
    /// Buckets an angle into four octant-derived cardinals; ties favor Right.
    pub fn from_angle(angle: f32) -> Dir {
        let cos = angle.cos();
        let sin = angle.sin();
        if sin <= -FRAC_1_SQRT_2 {
            Dir::Up
        } else if sin >= FRAC_1_SQRT_2 {
            Dir::Down
        } else if cos <= -FRAC_1_SQRT_2 {
            Dir::Left
        } else {
            Dir::Right
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn test_distance_and_angle() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert!((a.distance(b) - 5.0).abs() < 1e-6);
        assert!((a.angle_to(Point::new(0.0, 1.0)) - PI / 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_midpoint() {
        let m = Point::new(0.0, 2.0).midpoint(Point::new(4.0, 6.0));
        assert_eq!(m, Point::new(2.0, 4.0));
    }

    #[test]
    fn test_dir_buckets() {
        // Canvas y grows downward, so -PI/2 points up.
        assert_eq!(Dir::from_angle(-PI / 2.0), Dir::Up);
        assert_eq!(Dir::from_angle(PI / 2.0), Dir::Down);
        assert_eq!(Dir::from_angle(PI), Dir::Left);
        assert_eq!(Dir::from_angle(0.0), Dir::Right);
    }

    #[test]
    fn test_dir_diagonal_ties_favor_right() {
        // Exactly 45 degrees down-right: sin == sqrt(2)/2 picks Down,
        // slightly under the threshold picks Right.
        assert_eq!(Dir::from_angle(PI / 4.0 - 0.01), Dir::Right);
        assert_eq!(Dir::from_angle(-PI / 4.0 + 0.01), Dir::Right);
    }
}
