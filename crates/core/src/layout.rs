//! Static description of the gallery room: models, props, interactables,
//! colliders and lights.

use std::path::PathBuf;

use gallery_camera::SPAWN_POSITION;
use gallery_physics::{Aabb, ColliderSet};
use glam::{Mat4, Vec3};

use crate::light::{LightTable, PointLight};
use crate::ModelId;

const SHELF_ROWS: usize = 3;
const SHELF_COLUMNS: usize = 5;
const SHELF_ORIGIN: Vec3 = Vec3::new(0.2, 0.24, -2.25);
const SHELF_COLUMN_STEP: f32 = 0.4;
const SHELF_ROW_STEP: f32 = 0.235;
const SHELF_BOTTLE_SCALE: f32 = 0.5;

const LAMP_SCALE: f32 = 1.25;
const LIGHT_COLOR: Vec3 = Vec3::new(1.0, 1.0, 0.9);

/// Default far plane for shadow cubemaps.
pub const SHADOW_FAR_PLANE: f32 = 10.0;

/// A renderable asset the scene refers to by [`ModelId`].
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSpec {
    /// Human-readable name used in logs.
    pub name: String,
    /// Path relative to the asset root.
    pub path: PathBuf,
}

/// A static, non-interactive placement of a model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PropSpec {
    /// Model to draw.
    pub model: ModelId,
    /// World-space translation.
    pub position: Vec3,
    /// Rotation about Y in degrees.
    pub rotation_y_degrees: f32,
    /// Per-axis scale.
    pub scale: Vec3,
    /// Emissive props are drawn unlit and at full brightness.
    pub emissive: bool,
}

impl PropSpec {
    fn at(model: ModelId, position: Vec3) -> Self {
        Self {
            model,
            position,
            rotation_y_degrees: 0.0,
            scale: Vec3::ONE,
            emissive: false,
        }
    }

    /// Model matrix: translate, rotate about Y, then scale.
    pub fn transform(&self) -> Mat4 {
        Mat4::from_translation(self.position)
            * Mat4::from_rotation_y(self.rotation_y_degrees.to_radians())
            * Mat4::from_scale(self.scale)
    }
}

/// An object the player can focus, pick up and consume.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interactable {
    /// Model to draw.
    pub model: ModelId,
    /// Rest position (also the focus target).
    pub position: Vec3,
    /// Uniform scale.
    pub scale: f32,
}

/// Everything about the room that does not change while playing.
#[derive(Debug, Clone)]
pub struct SceneLayout {
    /// Models to load, indexed by [`ModelId`].
    pub models: Vec<ModelSpec>,
    /// Static props in draw order.
    pub props: Vec<PropSpec>,
    /// Interactables in registration order.
    pub interactables: Vec<Interactable>,
    /// Blocking volumes.
    pub colliders: ColliderSet,
    /// Shadow-casting point lights.
    pub lights: LightTable,
    /// Eye position the player starts at.
    pub spawn: Vec3,
}

impl SceneLayout {
    /// Look up a model by id.
    pub fn model(&self, id: ModelId) -> Option<&ModelSpec> {
        self.models.get(id.index())
    }

    /// The gallery room.
    pub fn gallery() -> Self {
        let mut models = Vec::new();
        let mut register = |name: &str| {
            let id = ModelId(models.len());
            models.push(ModelSpec {
                name: name.to_string(),
                path: PathBuf::from(format!("models/{name}/{name}.glb")),
            });
            id
        };

        let desk = register("desk");
        let door = register("door");
        let floor = register("floor");
        let shelves = register("shelves");
        let walls = register("walls");
        let ceiling = register("ceiling");
        let lamp = register("lamp");
        let shelf_bottles = register("shelf_bottles");
        let drinkables = [
            register("drinkable1"),
            register("drinkable2"),
            register("drinkable3"),
            register("drinkable4"),
        ];

        let mut props = vec![
            PropSpec {
                scale: Vec3::new(1.0, 0.64, 1.0),
                ..PropSpec::at(desk, Vec3::ZERO)
            },
            PropSpec::at(door, Vec3::ZERO),
            PropSpec::at(floor, Vec3::ZERO),
            PropSpec::at(shelves, Vec3::ZERO),
            PropSpec::at(walls, Vec3::ZERO),
            PropSpec::at(ceiling, Vec3::new(0.0, 1.1, 0.0)),
        ];

        for (position, rotation) in [
            (Vec3::new(2.47, 0.6, -1.5), -90.0),
            (Vec3::new(0.04, 0.6, -1.5), 90.0),
        ] {
            props.push(PropSpec {
                rotation_y_degrees: rotation,
                scale: Vec3::splat(LAMP_SCALE),
                emissive: true,
                ..PropSpec::at(lamp, position)
            });
        }

        for row in 0..SHELF_ROWS {
            for column in 0..SHELF_COLUMNS {
                let offset = Vec3::new(
                    column as f32 * SHELF_COLUMN_STEP,
                    row as f32 * SHELF_ROW_STEP,
                    0.0,
                );
                props.push(PropSpec {
                    scale: Vec3::splat(SHELF_BOTTLE_SCALE),
                    ..PropSpec::at(shelf_bottles, SHELF_ORIGIN + offset)
                });
            }
        }

        let interactables = drinkables
            .iter()
            .zip([1.0, 0.8, 0.035, 0.85])
            .enumerate()
            .map(|(i, (&model, scale))| Interactable {
                model,
                position: Vec3::new(0.4 * (i + 1) as f32, 0.35, -1.3),
                scale,
            })
            .collect();

        let colliders = ColliderSet::new(vec![
            // desk
            Aabb::new([0.03, 0.01, -1.79], [2.43, 0.31, -1.13]),
            // left wall
            Aabb::new([0.07, 0.01, -1.25], [-0.03, 0.74, -0.05]),
            // right wall
            Aabb::new([2.54, 0.04, -1.72], [2.38, 0.87, 0.02]),
            // back wall and door
            Aabb::new([2.56, -0.06, -0.15], [-0.07, 1.03, 0.14]),
        ]);

        let lights = LightTable::new([
            PointLight::new(Vec3::new(2.3, 0.75, -1.52), LIGHT_COLOR, SHADOW_FAR_PLANE),
            PointLight::new(Vec3::new(0.21, 0.75, -1.52), LIGHT_COLOR, SHADOW_FAR_PLANE),
        ]);

        Self {
            models,
            props,
            interactables,
            colliders,
            lights,
            spawn: SPAWN_POSITION,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_reference_resolves_to_a_model() {
        let layout = SceneLayout::gallery();
        for prop in &layout.props {
            assert!(layout.model(prop.model).is_some());
        }
        for item in &layout.interactables {
            assert!(layout.model(item.model).is_some());
        }
    }

    #[test]
    fn gallery_has_expected_population() {
        let layout = SceneLayout::gallery();
        assert_eq!(layout.interactables.len(), 4);
        assert_eq!(layout.colliders.boxes().len(), 4);
        // Six room pieces, two lamps, fifteen shelf bottles.
        assert_eq!(layout.props.len(), 6 + 2 + SHELF_ROWS * SHELF_COLUMNS);
        assert_eq!(layout.props.iter().filter(|p| p.emissive).count(), 2);
    }

    #[test]
    fn interactables_sit_on_the_desk_row() {
        let layout = SceneLayout::gallery();
        let xs: Vec<f32> = layout.interactables.iter().map(|i| i.position.x).collect();
        for (x, expected) in xs.iter().zip([0.4, 0.8, 1.2, 1.6]) {
            assert!((x - expected).abs() < 1e-6);
        }
        assert_eq!(layout.interactables[2].scale, 0.035);
    }

    #[test]
    fn spawn_is_not_inside_a_collider() {
        let layout = SceneLayout::gallery();
        assert!(!layout.colliders.blocks_feet(layout.spawn));
    }

    #[test]
    fn model_paths_use_name_directories() {
        let layout = SceneLayout::gallery();
        let desk = layout.model(ModelId(0)).expect("desk registered first");
        assert_eq!(desk.path, PathBuf::from("models/desk/desk.glb"));
    }
}
