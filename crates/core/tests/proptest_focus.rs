//! Property tests for focus detection and light transforms.

use gallery_camera::PlayerPose;
use gallery_core::focus::FOCUS_MAX_DISTANCE;
use gallery_core::light::cube_face_transforms;
use gallery_core::{find_focused, CubeFace, Interactable, ModelId};
use glam::Vec3;
use proptest::prelude::*;

fn pose(position: [f32; 3], yaw: f32, pitch: f32) -> PlayerPose {
    let mut pose = PlayerPose::new(Vec3::from_array(position));
    pose.yaw = yaw;
    pose.pitch = pitch;
    pose
}

fn single(position: Vec3) -> [Interactable; 1] {
    [Interactable {
        model: ModelId(0),
        position,
        scale: 1.0,
    }]
}

proptest! {
    /// Property: a center on the ray inside the range is found even with zero radius
    #[test]
    fn center_on_ray_is_found(
        origin in prop::array::uniform3(-3.0f32..3.0),
        yaw in -360.0f32..360.0,
        pitch in -89.0f32..89.0,
        distance in 0.0f32..0.49,
    ) {
        let pose = pose(origin, yaw, pitch);
        let items = single(pose.position + pose.forward() * distance);
        prop_assert_eq!(find_focused(&pose, &items, FOCUS_MAX_DISTANCE, 0.0), Some(0));
    }

    /// Property: nothing beyond the max distance is ever focused
    #[test]
    fn beyond_max_distance_is_never_found(
        origin in prop::array::uniform3(-3.0f32..3.0),
        yaw in -360.0f32..360.0,
        pitch in -89.0f32..89.0,
        distance in 0.51f32..20.0,
        radius in 0.0f32..2.0,
    ) {
        let pose = pose(origin, yaw, pitch);
        let items = single(pose.position + pose.forward() * distance);
        prop_assert_eq!(find_focused(&pose, &items, FOCUS_MAX_DISTANCE, radius), None);
    }

    /// Property: cube views look along six distinct axes and share one projection
    #[test]
    fn cube_views_are_distinct(
        light in prop::array::uniform3(-5.0f32..5.0),
        far in 1.0f32..50.0,
    ) {
        let transforms = cube_face_transforms(Vec3::from_array(light), 0.05, far);
        for (i, a) in CubeFace::ALL.iter().enumerate() {
            for b in CubeFace::ALL.iter().skip(i + 1) {
                prop_assert_ne!(a.direction(), b.direction());
                prop_assert_ne!(transforms.views[a.layer() as usize], transforms.views[b.layer() as usize]);
            }
            // A view maps its own face direction onto its forward (+Z) axis.
            let forward = transforms.views[a.layer() as usize].transform_vector3(a.direction());
            prop_assert!((forward - Vec3::Z).length() < 1e-4);
        }
        let again = cube_face_transforms(Vec3::from_array(light), 0.05, far);
        prop_assert_eq!(transforms.projection, again.projection);
    }
}
