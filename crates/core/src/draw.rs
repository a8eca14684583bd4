//! Per-frame list of everything to draw.
//!
//! The shadow depth pass and the lit pass both consume the same list, so
//! they always agree on which objects exist and where they are.

use glam::{Mat3, Mat4};

use crate::animation::interactable_transform;
use crate::layout::SceneLayout;
use crate::scene::SceneState;
use crate::ModelId;

/// One model placement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawItem {
    /// Model to draw.
    pub model: ModelId,
    /// Model matrix.
    pub transform: Mat4,
    /// Skip lighting and shadowing.
    pub emissive: bool,
}

impl DrawItem {
    /// Inverse-transpose of the upper 3x3, for transforming normals.
    pub fn normal_matrix(&self) -> Mat3 {
        Mat3::from_mat4(self.transform).inverse().transpose()
    }
}

/// Ordered draw items for a frame: static props first, then interactables.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrawList {
    items: Vec<DrawItem>,
}

impl DrawList {
    /// Build the list for the current scene state.
    pub fn build(layout: &SceneLayout, state: &SceneState) -> Self {
        let mut items = Vec::with_capacity(layout.props.len() + layout.interactables.len());

        items.extend(layout.props.iter().map(|prop| DrawItem {
            model: prop.model,
            transform: prop.transform(),
            emissive: prop.emissive,
        }));

        let phase = state.interaction.phase;
        items.extend(
            layout
                .interactables
                .iter()
                .enumerate()
                .map(|(index, item)| DrawItem {
                    model: item.model,
                    transform: interactable_transform(
                        item,
                        index,
                        phase,
                        &state.pose,
                        state.total_time,
                    ),
                    emissive: false,
                }),
        );

        Self { items }
    }

    /// Items in draw order.
    pub fn items(&self) -> &[DrawItem] {
        &self.items
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True when there is nothing to draw.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn list_covers_props_and_interactables() {
        let layout = SceneLayout::gallery();
        let state = SceneState::new(layout.spawn);
        let list = DrawList::build(&layout, &state);
        assert_eq!(list.len(), layout.props.len() + layout.interactables.len());
        assert_eq!(list.items().iter().filter(|item| item.emissive).count(), 2);
    }

    #[test]
    fn building_twice_is_identical() {
        let layout = SceneLayout::gallery();
        let mut state = SceneState::new(layout.spawn);
        state.total_time = 4.2;
        assert_eq!(DrawList::build(&layout, &state), DrawList::build(&layout, &state));
    }

    #[test]
    fn normal_matrix_undoes_non_uniform_scale() {
        let item = DrawItem {
            model: ModelId(0),
            transform: Mat4::from_scale(Vec3::new(1.0, 0.5, 1.0)),
            emissive: false,
        };
        let normal = item.normal_matrix() * Vec3::Y;
        assert!((normal.y - 2.0).abs() < 1e-5);
    }
}
