//! Mutable per-session state and the fixed per-frame update order.

use gallery_camera::{clamp_pitch, PlayerPose};
use glam::Vec3;

use crate::controller::{step_movement, MoveIntent, MoveOutcome, MOVE_SPEED};
use crate::focus::{find_focused, FOCUS_MAX_DISTANCE, FOCUS_RADIUS};
use crate::interaction::{InteractionEvent, InteractionState};
use crate::layout::SceneLayout;

/// Player intent for one frame, already resolved from raw input.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameInput {
    /// Held movement intents.
    pub movement: MoveIntent,
    /// Cursor delta in pixels since the last frame.
    pub look_delta: (f32, f32),
    /// Pickup went down this frame.
    pub pickup_pressed: bool,
    /// Consume went down this frame.
    pub consume_pressed: bool,
}

/// Tunables for the simulation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneSettings {
    /// Degrees of rotation per pixel of cursor motion.
    pub mouse_sensitivity: f32,
    /// Flip vertical look.
    pub invert_y: bool,
    /// Walking speed in units per second.
    pub move_speed: f32,
    /// Focus ray length.
    pub focus_max_distance: f32,
    /// Focus ray radius.
    pub focus_radius: f32,
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            mouse_sensitivity: 0.05,
            invert_y: false,
            move_speed: MOVE_SPEED,
            focus_max_distance: FOCUS_MAX_DISTANCE,
            focus_radius: FOCUS_RADIUS,
        }
    }
}

/// What happened during one [`SceneState::update`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameReport {
    /// Movement result, `None` when no movement was attempted.
    pub movement: Option<MoveOutcome>,
    /// Interaction transitions in the order they fired.
    pub events: Vec<InteractionEvent>,
}

/// All state that changes while playing.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneState {
    /// Player eye and look angles.
    pub pose: PlayerPose,
    /// Hand phase and intoxication.
    pub interaction: InteractionState,
    /// Seconds since the session began.
    pub total_time: f32,
    /// Interactable under the crosshair after the last update.
    pub focused: Option<usize>,
}

impl SceneState {
    /// Fresh state with the player at `spawn`.
    pub fn new(spawn: Vec3) -> Self {
        Self {
            pose: PlayerPose::new(spawn),
            interaction: InteractionState::default(),
            total_time: 0.0,
            focused: None,
        }
    }

    /// Advance one frame.
    ///
    /// Order: look, walk, intoxication decay, camera shake, consume
    /// countdown, focus, then pickup and consume presses.
    pub fn update(
        &mut self,
        layout: &SceneLayout,
        settings: &SceneSettings,
        input: &FrameInput,
        dt: f32,
    ) -> FrameReport {
        let dt = dt.max(0.0);
        let mut report = FrameReport::default();
        self.total_time += dt;

        let (dx, dy) = input.look_delta;
        let dy = if settings.invert_y { -dy } else { dy };
        self.pose.look(dx, dy, settings.mouse_sensitivity);

        if !input.movement.is_idle() {
            report.movement = Some(step_movement(
                &mut self.pose,
                input.movement,
                &layout.colliders,
                settings.move_speed,
                dt,
            ));
        }

        report.events.extend(self.interaction.tick_intoxication(dt));

        if let Some((yaw, pitch)) = self.interaction.intoxication.shake(self.total_time) {
            self.pose.yaw += yaw;
            self.pose.pitch = clamp_pitch(self.pose.pitch + pitch);
        }

        report.events.extend(self.interaction.tick_consume(dt));

        self.focused = find_focused(
            &self.pose,
            &layout.interactables,
            settings.focus_max_distance,
            settings.focus_radius,
        );

        if input.pickup_pressed {
            report
                .events
                .extend(self.interaction.press_pickup(self.focused));
        }
        if input.consume_pressed {
            report.events.extend(self.interaction.press_consume());
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_accumulates() {
        let layout = SceneLayout::gallery();
        let mut state = SceneState::new(layout.spawn);
        for _ in 0..4 {
            state.update(&layout, &SceneSettings::default(), &FrameInput::default(), 0.25);
        }
        assert!((state.total_time - 1.0).abs() < 1e-6);
    }

    #[test]
    fn negative_dt_is_ignored() {
        let layout = SceneLayout::gallery();
        let mut state = SceneState::new(layout.spawn);
        state.update(&layout, &SceneSettings::default(), &FrameInput::default(), -1.0);
        assert_eq!(state.total_time, 0.0);
    }

    #[test]
    fn invert_y_flips_pitch() {
        let layout = SceneLayout::gallery();
        let input = FrameInput {
            look_delta: (0.0, -10.0),
            ..Default::default()
        };

        let mut normal = SceneState::new(layout.spawn);
        normal.update(&layout, &SceneSettings::default(), &input, 0.0);
        assert!(normal.pose.pitch > 0.0);

        let inverted_settings = SceneSettings {
            invert_y: true,
            ..Default::default()
        };
        let mut inverted = SceneState::new(layout.spawn);
        inverted.update(&layout, &inverted_settings, &input, 0.0);
        assert!(inverted.pose.pitch < 0.0);
    }
}
