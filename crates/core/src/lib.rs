#![warn(missing_docs)]
//! Simulation core for the gallery: movement, focus, pickup/consume state and the draw list.

pub mod animation;
pub mod controller;
pub mod draw;
pub mod focus;
pub mod interaction;
pub mod layout;
pub mod light;
pub mod scene;

// Re-export commonly used types
pub use controller::{MoveIntent, MoveOutcome};
pub use draw::{DrawItem, DrawList};
pub use focus::find_focused;
pub use interaction::{InteractionEvent, InteractionState, Intoxication, Phase};
pub use layout::{Interactable, ModelSpec, PropSpec, SceneLayout, SHADOW_FAR_PLANE};
pub use light::{CubeFace, CubeTransforms, LightId, LightTable, PointLight, LIGHT_COUNT};
pub use scene::{FrameInput, FrameReport, SceneSettings, SceneState};

/// Index of a renderable registered in a [`SceneLayout`].
///
/// The renderer loads `SceneLayout::models` in order, so the id doubles as
/// the slot of the uploaded GPU model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModelId(pub usize);

impl ModelId {
    /// Slot index of the model.
    pub fn index(self) -> usize {
        self.0
    }
}
