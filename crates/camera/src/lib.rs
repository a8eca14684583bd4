#![warn(missing_docs)]
//! First-person pose and projection for the gallery camera.

use glam::{Mat4, Vec3};

/// Pitch is kept strictly inside this many degrees of the horizon.
pub const PITCH_LIMIT_DEGREES: f32 = 89.0;

/// Eye position the player spawns at.
pub const SPAWN_POSITION: Vec3 = Vec3::new(1.0, 0.5, -0.4);

/// Initial yaw in degrees, facing down -Z.
pub const SPAWN_YAW_DEGREES: f32 = -90.0;

/// Player eye position and look angles.
///
/// Angles are stored in degrees. `forward` is derived from them on demand;
/// `up` is the rig's world up and does not tilt with pitch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerPose {
    /// Eye position in world space.
    pub position: Vec3,
    /// Horizontal angle in degrees (around Y).
    pub yaw: f32,
    /// Vertical angle in degrees, clamped to +/- [`PITCH_LIMIT_DEGREES`].
    pub pitch: f32,
}

impl Default for PlayerPose {
    fn default() -> Self {
        Self {
            position: SPAWN_POSITION,
            yaw: SPAWN_YAW_DEGREES,
            pitch: 0.0,
        }
    }
}

impl PlayerPose {
    /// Create a pose at `position` with the spawn orientation.
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Get the forward direction vector (where the player is looking).
    pub fn forward(&self) -> Vec3 {
        let yaw = self.yaw.to_radians();
        let pitch = self.pitch.to_radians();
        Vec3::new(
            yaw.cos() * pitch.cos(),
            pitch.sin(),
            yaw.sin() * pitch.cos(),
        )
        .normalize()
    }

    /// World up used by the camera rig.
    pub fn up(&self) -> Vec3 {
        Vec3::Y
    }

    /// Get the right direction vector.
    pub fn right(&self) -> Vec3 {
        self.forward().cross(self.up()).normalize()
    }

    /// Add angle deltas (degrees) and clamp pitch.
    pub fn rotate(&mut self, delta_yaw: f32, delta_pitch: f32) {
        self.yaw += delta_yaw;
        self.pitch = clamp_pitch(self.pitch + delta_pitch);
    }

    /// Apply a cursor delta in pixels. Moving the cursor up looks up.
    pub fn look(&mut self, dx: f32, dy: f32, sensitivity: f32) {
        self.rotate(dx * sensitivity, -dy * sensitivity);
    }

    /// Compute the view matrix (world space -> camera space).
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.forward(), self.up())
    }
}

/// Clamp a pitch angle in degrees to the allowed range.
pub fn clamp_pitch(pitch: f32) -> f32 {
    pitch.clamp(-PITCH_LIMIT_DEGREES, PITCH_LIMIT_DEGREES)
}

/// Perspective projection parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    /// Aspect ratio (width / height).
    pub aspect: f32,
    /// Near clipping plane distance.
    pub near: f32,
    /// Far clipping plane distance.
    pub far: f32,
}

impl Default for Projection {
    fn default() -> Self {
        Self {
            fov_degrees: 50.0,
            aspect: 800.0 / 600.0,
            near: 0.01,
            far: 50.0,
        }
    }
}

impl Projection {
    /// Update the aspect ratio (call when window resizes).
    pub fn set_aspect(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    /// Compute the projection matrix (camera space -> clip space).
    pub fn matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_degrees.to_radians(), self.aspect, self.near, self.far)
    }

    /// Combined view-projection matrix for a pose.
    pub fn view_projection(&self, pose: &PlayerPose) -> Mat4 {
        self.matrix() * pose.view_matrix()
    }
}
