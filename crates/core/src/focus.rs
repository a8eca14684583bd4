//! Ray-based focus detection against interactable centers.

use gallery_camera::PlayerPose;

use crate::layout::Interactable;

/// Furthest distance along the view ray an interactable can be focused at.
pub const FOCUS_MAX_DISTANCE: f32 = 0.5;

/// Radius around an interactable center that the view ray must pass through.
pub const FOCUS_RADIUS: f32 = 0.15;

// Squared-distance slack for centers that lie on the ray up to float rounding.
const ON_RAY_TOLERANCE_SQ: f32 = 1e-10;

/// Returns the index of the first interactable, in registration order, whose
/// center lies within `radius` of the view ray and between 0 and
/// `max_distance` along it.
///
/// Both bounds are inclusive, so a center exactly on the ray is found even
/// with a zero radius. The first match wins, not the nearest one.
pub fn find_focused(
    pose: &PlayerPose,
    interactables: &[Interactable],
    max_distance: f32,
    radius: f32,
) -> Option<usize> {
    let origin = pose.position;
    let direction = pose.forward().normalize();
    let radius_sq = radius * radius + ON_RAY_TOLERANCE_SQ;

    interactables.iter().position(|item| {
        let to_center = item.position - origin;
        let projection = to_center.dot(direction);
        if projection < 0.0 || projection > max_distance {
            return false;
        }
        let closest = origin + direction * projection;
        item.position.distance_squared(closest) <= radius_sq
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ModelId;
    use glam::Vec3;

    fn bottle_at(position: Vec3) -> Interactable {
        Interactable {
            model: ModelId(0),
            position,
            scale: 1.0,
        }
    }

    fn pose_facing_negative_z() -> PlayerPose {
        PlayerPose::new(Vec3::ZERO)
    }

    #[test]
    fn empty_set_has_no_focus() {
        assert_eq!(
            find_focused(&pose_facing_negative_z(), &[], FOCUS_MAX_DISTANCE, FOCUS_RADIUS),
            None
        );
    }

    #[test]
    fn behind_the_viewer_is_ignored() {
        let items = [bottle_at(Vec3::new(0.0, 0.0, 0.3))];
        assert_eq!(
            find_focused(&pose_facing_negative_z(), &items, FOCUS_MAX_DISTANCE, FOCUS_RADIUS),
            None
        );
    }

    #[test]
    fn off_axis_within_radius_is_found() {
        let items = [bottle_at(Vec3::new(0.1, 0.0, -0.3))];
        assert_eq!(
            find_focused(&pose_facing_negative_z(), &items, FOCUS_MAX_DISTANCE, FOCUS_RADIUS),
            Some(0)
        );
        let far_off = [bottle_at(Vec3::new(0.2, 0.0, -0.3))];
        assert_eq!(
            find_focused(&pose_facing_negative_z(), &far_off, FOCUS_MAX_DISTANCE, FOCUS_RADIUS),
            None
        );
    }

    #[test]
    fn first_registered_match_wins_over_nearer_one() {
        let items = [
            bottle_at(Vec3::new(0.0, 0.0, -0.45)),
            bottle_at(Vec3::new(0.0, 0.0, -0.2)),
        ];
        assert_eq!(
            find_focused(&pose_facing_negative_z(), &items, FOCUS_MAX_DISTANCE, FOCUS_RADIUS),
            Some(0)
        );
    }

    #[test]
    fn center_on_ray_with_zero_radius_is_found() {
        let items = [bottle_at(Vec3::new(0.0, 0.0, -0.25))];
        assert_eq!(
            find_focused(&pose_facing_negative_z(), &items, FOCUS_MAX_DISTANCE, 0.0),
            Some(0)
        );
    }
}
