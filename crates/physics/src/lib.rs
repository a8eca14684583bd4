#![warn(missing_docs)]
//! Collision primitives for the gallery room (boxes and the collider set).

use glam::Vec3;

/// Vertical distance from the eye to the feet of the player.
pub const FEET_OFFSET: f32 = 0.4;

/// Axis-aligned bounding box used for collisions.
///
/// Corners may be supplied in either order per axis; every query normalizes
/// them first, so `(a, b)` and `(b, a)` describe the same box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// First corner (x, y, z).
    pub min: [f32; 3],
    /// Opposite corner (x, y, z).
    pub max: [f32; 3],
}

impl Aabb {
    /// Create a new AABB from two opposite corners.
    pub fn new(min: [f32; 3], max: [f32; 3]) -> Self {
        Self { min, max }
    }

    /// Returns the corners sorted so that `lo <= hi` on every axis.
    pub fn normalized(&self) -> ([f32; 3], [f32; 3]) {
        let mut lo = [0.0; 3];
        let mut hi = [0.0; 3];
        for axis in 0..3 {
            lo[axis] = self.min[axis].min(self.max[axis]);
            hi[axis] = self.min[axis].max(self.max[axis]);
        }
        (lo, hi)
    }

    /// Tests whether `point` lies inside the box, boundary included.
    pub fn contains(&self, point: Vec3) -> bool {
        let (lo, hi) = self.normalized();
        let p = point.to_array();
        (0..3).all(|axis| p[axis] >= lo[axis] && p[axis] <= hi[axis])
    }
}

/// Static collection of blocking volumes, scanned linearly.
#[derive(Debug, Clone, Default)]
pub struct ColliderSet {
    boxes: Vec<Aabb>,
}

impl ColliderSet {
    /// Create a collider set from the given boxes.
    pub fn new(boxes: Vec<Aabb>) -> Self {
        Self { boxes }
    }

    /// Boxes in registration order.
    pub fn boxes(&self) -> &[Aabb] {
        &self.boxes
    }

    /// True when `point` is inside any box.
    pub fn blocks(&self, point: Vec3) -> bool {
        self.boxes.iter().any(|aabb| aabb.contains(point))
    }

    /// True when the feet belonging to an eye at `eye_position` are inside any box.
    pub fn blocks_feet(&self, eye_position: Vec3) -> bool {
        self.blocks(feet_position(eye_position))
    }
}

/// Feet position for an eye position.
pub fn feet_position(eye_position: Vec3) -> Vec3 {
    eye_position - Vec3::new(0.0, FEET_OFFSET, 0.0)
}
