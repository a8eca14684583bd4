//! Collision-constrained walking on the horizontal plane.

use gallery_camera::PlayerPose;
use gallery_physics::ColliderSet;
use glam::Vec3;

/// Walking speed in world units per second.
pub const MOVE_SPEED: f32 = 1.0;

/// Directional movement intents held this frame. Any combination may be active.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveIntent {
    /// Walk along the flattened view direction.
    pub forward: bool,
    /// Walk against the flattened view direction.
    pub backward: bool,
    /// Strafe left.
    pub left: bool,
    /// Strafe right.
    pub right: bool,
}

impl MoveIntent {
    /// True when no intent is held.
    pub fn is_idle(&self) -> bool {
        !(self.forward || self.backward || self.left || self.right)
    }
}

/// Result of one movement step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// No displacement was proposed.
    Idle,
    /// The displacement was applied in full.
    Moved,
    /// The feet would have entered a collider; the pose did not change.
    Blocked,
}

/// Sum of the active intent directions scaled by `speed * dt`.
///
/// Directions are not normalized, so holding two perpendicular intents
/// moves faster than one. Returns zero when the view direction has no
/// horizontal component.
pub fn propose_displacement(pose: &PlayerPose, intent: MoveIntent, speed: f32, dt: f32) -> Vec3 {
    let forward = pose.forward();
    let Some(flat_forward) = Vec3::new(forward.x, 0.0, forward.z).try_normalize() else {
        return Vec3::ZERO;
    };
    let right = flat_forward.cross(pose.up()).normalize();
    let step = speed * dt;

    let mut displacement = Vec3::ZERO;
    if intent.forward {
        displacement += flat_forward * step;
    }
    if intent.backward {
        displacement -= flat_forward * step;
    }
    if intent.left {
        displacement -= right * step;
    }
    if intent.right {
        displacement += right * step;
    }
    displacement
}

/// Move the pose by the proposed displacement unless the feet would land in a collider.
///
/// There is no sliding: a blocked step leaves the pose untouched.
pub fn step_movement(
    pose: &mut PlayerPose,
    intent: MoveIntent,
    colliders: &ColliderSet,
    speed: f32,
    dt: f32,
) -> MoveOutcome {
    let displacement = propose_displacement(pose, intent, speed, dt);
    if displacement == Vec3::ZERO {
        return MoveOutcome::Idle;
    }

    let proposed = pose.position + displacement;
    if colliders.blocks_feet(proposed) {
        return MoveOutcome::Blocked;
    }

    pose.position = proposed;
    MoveOutcome::Moved
}

#[cfg(test)]
mod tests {
    use super::*;
    use gallery_physics::Aabb;

    fn forward_only() -> MoveIntent {
        MoveIntent {
            forward: true,
            ..Default::default()
        }
    }

    #[test]
    fn idle_intent_proposes_nothing() {
        let mut pose = PlayerPose::default();
        let before = pose;
        let outcome = step_movement(&mut pose, MoveIntent::default(), &ColliderSet::default(), 1.0, 0.1);
        assert_eq!(outcome, MoveOutcome::Idle);
        assert_eq!(pose, before);
    }

    #[test]
    fn pitch_does_not_lift_the_player() {
        let mut pose = PlayerPose::new(Vec3::ZERO);
        pose.rotate(0.0, 60.0);
        let displacement = propose_displacement(&pose, forward_only(), 1.0, 0.5);
        assert!(displacement.y.abs() < 1e-6);
        assert!((displacement.length() - 0.5).abs() < 1e-5);
    }

    #[test]
    fn opposite_intents_cancel() {
        let pose = PlayerPose::new(Vec3::ZERO);
        let intent = MoveIntent {
            left: true,
            right: true,
            ..Default::default()
        };
        assert!(propose_displacement(&pose, intent, 1.0, 1.0).length() < 1e-6);
    }

    #[test]
    fn strafe_right_moves_along_positive_x_at_spawn() {
        let pose = PlayerPose::new(Vec3::ZERO);
        let intent = MoveIntent {
            right: true,
            ..Default::default()
        };
        let displacement = propose_displacement(&pose, intent, 1.0, 1.0);
        assert!((displacement.x - 1.0).abs() < 1e-5);
    }

    #[test]
    fn blocked_step_keeps_pose() {
        let colliders = ColliderSet::new(vec![Aabb::new([-1.0, 0.0, -1.0], [1.0, 1.0, -0.05])]);
        let mut pose = PlayerPose::new(Vec3::new(0.0, 0.5, 0.0));
        let outcome = step_movement(&mut pose, forward_only(), &colliders, 1.0, 0.1);
        assert_eq!(outcome, MoveOutcome::Blocked);
        assert_eq!(pose.position, Vec3::new(0.0, 0.5, 0.0));
    }
}
