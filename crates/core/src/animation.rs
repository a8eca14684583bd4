//! Cosmetic model transforms for interactables.
//!
//! These are pure functions of elapsed time, the camera basis and the hand
//! phase. Nothing here feeds back into the simulation.

use gallery_camera::PlayerPose;
use glam::{Mat4, Vec3};

use crate::interaction::Phase;
use crate::layout::Interactable;

const HOVER_AMPLITUDE: f32 = 0.02;
const HOVER_SPEED: f32 = 2.0;
const HOVER_PHASE_STEP: f32 = 5.0;
const SPIN_DEGREES_PER_SECOND: f32 = 60.0;

const HELD_FORWARD: f32 = 0.3;
const HELD_UP: f32 = -0.15;
const CONSUMING_FORWARD: f32 = 0.25;
const CONSUMING_UP: f32 = 0.05;
const CONSUMING_TILT_DEGREES: f32 = 120.0;

/// Resting interactable: bob up and down and spin about Y.
///
/// Each index is phase-shifted so neighbours do not bob in lockstep.
pub fn idle_transform(item: &Interactable, index: usize, time: f32) -> Mat4 {
    let hover = ((time + index as f32 * HOVER_PHASE_STEP) * HOVER_SPEED).sin() * HOVER_AMPLITUDE;
    let spin = (time * SPIN_DEGREES_PER_SECOND).to_radians();
    Mat4::from_translation(item.position + Vec3::new(0.0, hover, 0.0))
        * Mat4::from_rotation_y(spin)
        * Mat4::from_scale(Vec3::splat(item.scale))
}

/// Interactable carried in front of the camera, tilted up while consuming.
pub fn carried_transform(item: &Interactable, pose: &PlayerPose, consuming: bool) -> Mat4 {
    let forward = pose.forward();
    let up = pose.up();
    let position = if consuming {
        pose.position + forward * CONSUMING_FORWARD + up * CONSUMING_UP
    } else {
        pose.position + forward * HELD_FORWARD + up * HELD_UP
    };

    let facing = forward.x.atan2(forward.z) + 180f32.to_radians();
    let mut transform = Mat4::from_translation(position) * Mat4::from_rotation_y(facing);
    if consuming {
        transform *= Mat4::from_rotation_x(CONSUMING_TILT_DEGREES.to_radians());
    }
    transform * Mat4::from_scale(Vec3::splat(item.scale))
}

/// Model matrix for interactable `index` given the current hand phase.
pub fn interactable_transform(
    item: &Interactable,
    index: usize,
    phase: Phase,
    pose: &PlayerPose,
    time: f32,
) -> Mat4 {
    match phase {
        Phase::Held { index: held } if held == index => carried_transform(item, pose, false),
        Phase::Consuming { index: held, .. } if held == index => {
            carried_transform(item, pose, true)
        }
        _ => idle_transform(item, index, time),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ModelId;

    fn bottle() -> Interactable {
        Interactable {
            model: ModelId(0),
            position: Vec3::new(0.4, 0.35, -1.3),
            scale: 1.0,
        }
    }

    #[test]
    fn idle_bob_stays_within_amplitude() {
        let item = bottle();
        for step in 0..50 {
            let t = step as f32 * 0.13;
            let translation = idle_transform(&item, 2, t).w_axis.truncate();
            assert!((translation.y - item.position.y).abs() <= HOVER_AMPLITUDE + 1e-6);
            assert!((translation.x - item.position.x).abs() < 1e-6);
        }
    }

    #[test]
    fn held_item_hangs_below_the_view_line() {
        let pose = PlayerPose::default();
        let transform = carried_transform(&bottle(), &pose, false);
        let translation = transform.w_axis.truncate();
        let expected = pose.position + pose.forward() * HELD_FORWARD + Vec3::Y * HELD_UP;
        assert!(translation.distance(expected) < 1e-5);
    }

    #[test]
    fn consuming_lifts_toward_the_face() {
        let pose = PlayerPose::default();
        let held = carried_transform(&bottle(), &pose, false).w_axis.truncate();
        let consuming = carried_transform(&bottle(), &pose, true).w_axis.truncate();
        assert!(consuming.y > held.y);
        assert!(consuming.distance(pose.position) < held.distance(pose.position));
    }

    #[test]
    fn only_the_held_index_follows_the_camera() {
        let pose = PlayerPose::default();
        let item = bottle();
        let phase = Phase::Held { index: 1 };
        let other = interactable_transform(&item, 0, phase, &pose, 0.0);
        assert_eq!(other, idle_transform(&item, 0, 0.0));
        let carried = interactable_transform(&item, 1, phase, &pose, 0.0);
        assert_eq!(carried, carried_transform(&item, &pose, false));
    }
}
