//! Point lights and the six light-space transforms used to render their
//! shadow cubemaps.

use glam::{Mat4, Vec3};

/// Number of shadow-casting lights in the scene.
pub const LIGHT_COUNT: usize = 2;

/// Near plane for shadow cubemap projections.
pub const SHADOW_NEAR_PLANE: f32 = 0.02;

/// Identity of a light in the [`LightTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LightId(pub usize);

/// Omnidirectional light with a fixed position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    /// World-space position.
    pub position: Vec3,
    /// Linear RGB color.
    pub color: Vec3,
    /// Distance at which shadow depth saturates.
    pub far_plane: f32,
}

impl PointLight {
    /// Create a light.
    pub fn new(position: Vec3, color: Vec3, far_plane: f32) -> Self {
        Self {
            position,
            color,
            far_plane,
        }
    }

    /// Cube transforms for this light's shadow map.
    pub fn cube_transforms(&self) -> CubeTransforms {
        cube_face_transforms(self.position, SHADOW_NEAR_PLANE, self.far_plane)
    }
}

/// Fixed-size table of lights keyed by [`LightId`].
#[derive(Debug, Clone, PartialEq)]
pub struct LightTable {
    lights: [PointLight; LIGHT_COUNT],
}

impl LightTable {
    /// Build a table from its lights.
    pub fn new(lights: [PointLight; LIGHT_COUNT]) -> Self {
        Self { lights }
    }

    /// Look up a light.
    pub fn get(&self, id: LightId) -> Option<&PointLight> {
        self.lights.get(id.0)
    }

    /// Iterate lights with their ids.
    pub fn iter(&self) -> impl Iterator<Item = (LightId, &PointLight)> {
        self.lights
            .iter()
            .enumerate()
            .map(|(i, light)| (LightId(i), light))
    }

    /// Override every light's far plane.
    pub fn set_far_plane(&mut self, far_plane: f32) {
        for light in &mut self.lights {
            light.far_plane = far_plane;
        }
    }

    /// Lights as a slice, in id order.
    pub fn as_slice(&self) -> &[PointLight] {
        &self.lights
    }
}

/// Cubemap face, in array-layer order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CubeFace {
    /// +X
    PositiveX,
    /// -X
    NegativeX,
    /// +Y
    PositiveY,
    /// -Y
    NegativeY,
    /// +Z
    PositiveZ,
    /// -Z
    NegativeZ,
}

impl CubeFace {
    /// All faces in layer order.
    pub const ALL: [CubeFace; 6] = [
        CubeFace::PositiveX,
        CubeFace::NegativeX,
        CubeFace::PositiveY,
        CubeFace::NegativeY,
        CubeFace::PositiveZ,
        CubeFace::NegativeZ,
    ];

    /// Array layer of this face in a cube texture.
    pub fn layer(self) -> u32 {
        self as u32
    }

    /// Direction the face looks along.
    pub fn direction(self) -> Vec3 {
        match self {
            CubeFace::PositiveX => Vec3::X,
            CubeFace::NegativeX => Vec3::NEG_X,
            CubeFace::PositiveY => Vec3::Y,
            CubeFace::NegativeY => Vec3::NEG_Y,
            CubeFace::PositiveZ => Vec3::Z,
            CubeFace::NegativeZ => Vec3::NEG_Z,
        }
    }

    /// Up vector for the face view, matching how the GPU addresses cube texels.
    pub fn up(self) -> Vec3 {
        match self {
            CubeFace::PositiveY => Vec3::NEG_Z,
            CubeFace::NegativeY => Vec3::Z,
            _ => Vec3::Y,
        }
    }
}

/// Shared projection plus one view per cube face.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubeTransforms {
    /// 90 degree, aspect 1 projection shared by all faces.
    pub projection: Mat4,
    /// Face views in [`CubeFace::ALL`] order.
    pub views: [Mat4; 6],
}

impl CubeTransforms {
    /// Combined view-projection for a face.
    pub fn view_projection(&self, face: CubeFace) -> Mat4 {
        self.projection * self.views[face.layer() as usize]
    }

    /// All six view-projections in layer order.
    pub fn view_projections(&self) -> [Mat4; 6] {
        CubeFace::ALL.map(|face| self.view_projection(face))
    }
}

/// Build the six light-space transforms for a point light at `position`.
///
/// Views are left-handed so that face `k` rendered into layer `k` lines up
/// with hardware cube sampling of `fragment - position`.
pub fn cube_face_transforms(position: Vec3, near: f32, far: f32) -> CubeTransforms {
    let projection = Mat4::perspective_lh(90f32.to_radians(), 1.0, near, far);
    let views = CubeFace::ALL
        .map(|face| Mat4::look_at_lh(position, position + face.direction(), face.up()));
    CubeTransforms { projection, views }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn face_direction_maps_to_clip_center() {
        let light = Vec3::new(1.0, 2.0, 3.0);
        let transforms = cube_face_transforms(light, 0.1, 10.0);
        for face in CubeFace::ALL {
            let target = light + face.direction() * 2.0;
            let clip = transforms.view_projection(face) * target.extend(1.0);
            let ndc = clip.truncate() / clip.w;
            assert!(ndc.x.abs() < 1e-4, "{face:?} x = {}", ndc.x);
            assert!(ndc.y.abs() < 1e-4, "{face:?} y = {}", ndc.y);
            assert!(ndc.z > 0.0 && ndc.z < 1.0);
        }
    }

    #[test]
    fn positive_x_face_matches_cube_addressing() {
        // For the +X face, texel u grows toward -Z and v grows toward -Y.
        let transforms = cube_face_transforms(Vec3::ZERO, 0.1, 10.0);
        let clip = transforms.view_projection(CubeFace::PositiveX) * Vec3::new(1.0, 0.5, -0.5).extend(1.0);
        let ndc = clip.truncate() / clip.w;
        assert!((ndc.x - 0.5).abs() < 1e-4);
        assert!((ndc.y - 0.5).abs() < 1e-4);
    }

    #[test]
    fn light_table_iterates_in_id_order() {
        let table = LightTable::new([
            PointLight::new(Vec3::X, Vec3::ONE, 5.0),
            PointLight::new(Vec3::Y, Vec3::ONE, 5.0),
        ]);
        let ids: Vec<LightId> = table.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![LightId(0), LightId(1)]);
        assert_eq!(table.get(LightId(1)).map(|l| l.position), Some(Vec3::Y));
        assert!(table.get(LightId(LIGHT_COUNT)).is_none());
    }
}
