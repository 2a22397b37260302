//! Point math shared by the gesture classifier.
//!
//! Coordinates are normalized image coordinates as produced by the hand
//! landmark model: `x` and `y` lie in `[0, 1]`, `z` is depth in roughly
//! the same unit. Every threshold in the crate is expressed in this unit.

use serde::Deserialize;

/// A single 3-D landmark position.
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize)]
pub struct Point3 {
    /// X coordinate (0.0 to 1.0, normalized to image width)
    pub x: f32,
    /// Y coordinate (0.0 to 1.0, normalized to image height, grows downward)
    pub y: f32,
    /// Z coordinate (depth, relative to the wrist)
    pub z: f32,
}

impl Point3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Componentwise offset.
    pub fn offset(self, dx: f32, dy: f32, dz: f32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }
}

/// Euclidean distance between two landmarks.
pub fn distance_3d(a: Point3, b: Point3) -> f32 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    let dz = a.z - b.z;
    (dx * dx + dy * dy + dz * dz).sqrt()
}

/// Jitter filter: true when the point moved less than `sensitivity` on
/// every axis since the previous frame.
///
/// This is a per-axis box test, not a radius test. A movement that stays
/// under the threshold on all three axes counts as noise even when the
/// diagonal distance exceeds it.
pub fn is_shaking(point: Point3, previous: Point3, sensitivity: f32) -> bool {
    (point.x - previous.x).abs() < sensitivity
        && (point.y - previous.y).abs() < sensitivity
        && (point.z - previous.z).abs() < sensitivity
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_to_self_is_zero() {
        let points = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.3, 0.7, -0.1),
            Point3::new(1.0, 1.0, 0.5),
        ];
        for p in points {
            assert_eq!(distance_3d(p, p), 0.0);
        }
    }

    #[test]
    fn test_distance_is_symmetric() {
        let a = Point3::new(0.1, 0.2, 0.3);
        let b = Point3::new(0.4, 0.6, -0.2);
        assert_eq!(distance_3d(a, b), distance_3d(b, a));
    }

    #[test]
    fn test_distance_uses_all_three_axes() {
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(0.3, 0.4, 0.0);
        assert!((distance_3d(a, b) - 0.5).abs() < 1e-6);

        let c = Point3::new(0.0, 0.0, 0.2);
        assert!((distance_3d(a, c) - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_small_move_is_shaking() {
        let prev = Point3::new(0.5, 0.5, 0.0);
        let p = prev.offset(0.001, -0.001, 0.001);
        assert!(is_shaking(p, prev, 0.002));
    }

    #[test]
    fn test_move_on_single_axis_is_not_shaking() {
        let prev = Point3::new(0.5, 0.5, 0.0);
        assert!(!is_shaking(prev.offset(0.0, 0.0, 0.01), prev, 0.002));
        assert!(!is_shaking(prev.offset(0.01, 0.0, 0.0), prev, 0.002));
    }

    #[test]
    fn test_shaking_is_box_not_radius() {
        // Diagonal length ~0.0026 exceeds 0.002, but every axis stays below it.
        let prev = Point3::new(0.5, 0.5, 0.0);
        let p = prev.offset(0.0015, 0.0015, 0.0015);
        assert!(distance_3d(p, prev) > 0.002);
        assert!(is_shaking(p, prev, 0.002));
    }

    #[test]
    fn test_zero_sensitivity_never_shakes() {
        let p = Point3::new(0.5, 0.5, 0.0);
        assert!(!is_shaking(p, p, 0.0));
    }
}
