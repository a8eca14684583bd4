#![warn(missing_docs)]
//! Keyboard and mouse input tracking with held and pressed-this-frame sets.

use anyhow::Result;
use std::collections::HashSet;
use tracing::warn;
use winit::event::{DeviceEvent, ElementState, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::Window;

/// Snapshot of per-frame input data.
#[derive(Debug, Clone, Default)]
pub struct InputSnapshot {
    /// Keys that were held when the snapshot was taken.
    pub keys_pressed: HashSet<KeyCode>,
    /// Keys that went down at least once during the frame.
    pub keys_just_pressed: HashSet<KeyCode>,
    /// Raw device delta accumulated this frame, in pixels.
    pub mouse_delta: (f64, f64),
    /// Whether the cursor was captured when the snapshot was taken.
    pub cursor_captured: bool,
}

impl InputSnapshot {
    /// Check if a key is held.
    pub fn is_held(&self, key: KeyCode) -> bool {
        self.keys_pressed.contains(&key)
    }

    /// Check if a key went down this frame.
    pub fn was_pressed(&self, key: KeyCode) -> bool {
        self.keys_just_pressed.contains(&key)
    }
}

/// Input state accumulated between frames.
#[derive(Debug, Clone)]
pub struct InputState {
    /// Keys currently pressed.
    pub keys_pressed: HashSet<KeyCode>,
    /// Keys pressed this frame (edge-triggered).
    pub keys_just_pressed: HashSet<KeyCode>,
    /// Raw mouse delta reported by device events.
    pub mouse_delta: (f64, f64),
    /// Whether cursor is currently captured/hidden.
    pub cursor_captured: bool,
    /// Whether the window currently has focus.
    pub focused: bool,
    /// Whether cursor should be captured when focus is regained.
    pub wants_cursor_capture: bool,
}

impl Default for InputState {
    fn default() -> Self {
        Self {
            keys_pressed: HashSet::new(),
            keys_just_pressed: HashSet::new(),
            mouse_delta: (0.0, 0.0),
            cursor_captured: false,
            focused: true,
            wants_cursor_capture: false,
        }
    }
}

impl InputState {
    /// Create a new input state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return an immutable snapshot and reset per-frame state.
    pub fn snapshot(&mut self) -> InputSnapshot {
        let snapshot = InputSnapshot {
            keys_pressed: self.keys_pressed.clone(),
            keys_just_pressed: self.keys_just_pressed.clone(),
            mouse_delta: self.mouse_delta,
            cursor_captured: self.cursor_captured,
        };
        self.reset_frame();
        snapshot
    }

    /// Reset per-frame state (mouse delta and edge set).
    pub fn reset_frame(&mut self) {
        self.mouse_delta = (0.0, 0.0);
        self.keys_just_pressed.clear();
    }

    /// Record a key going down. Auto-repeat does not count as a new press.
    pub fn press_key(&mut self, key: KeyCode) {
        if self.keys_pressed.insert(key) {
            self.keys_just_pressed.insert(key);
        }
    }

    /// Record a key going up.
    pub fn release_key(&mut self, key: KeyCode) {
        self.keys_pressed.remove(&key);
    }

    /// Accumulate a raw mouse movement.
    pub fn add_mouse_delta(&mut self, dx: f64, dy: f64) {
        self.mouse_delta.0 += dx;
        self.mouse_delta.1 += dy;
    }

    /// Handle a window event and update state.
    pub fn handle_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(keycode) = event.physical_key {
                    match event.state {
                        ElementState::Pressed => self.press_key(keycode),
                        ElementState::Released => self.release_key(keycode),
                    }
                }
            }
            WindowEvent::Focused(focused) => {
                self.focused = *focused;
                if !focused {
                    // Keys released while unfocused never reach us.
                    self.keys_pressed.clear();
                    self.wants_cursor_capture = self.cursor_captured;
                }
            }
            _ => {}
        }
    }

    /// Handle device-level events (raw mouse motion).
    ///
    /// Motion is only accumulated while the cursor is captured.
    pub fn handle_device_event(&mut self, event: &DeviceEvent) {
        if let DeviceEvent::MouseMotion { delta } = event {
            if self.cursor_captured {
                self.add_mouse_delta(delta.0, delta.1);
            }
        }
    }

    /// Toggle cursor grab state.
    pub fn toggle_cursor_grab(&mut self, window: &Window) -> Result<()> {
        let capture = !self.cursor_captured;
        self.set_cursor_capture(window, capture)
    }

    /// Explicitly set cursor capture state.
    pub fn set_cursor_capture(&mut self, window: &Window, capture: bool) -> Result<()> {
        use winit::window::CursorGrabMode;

        self.wants_cursor_capture = capture;

        if capture {
            // Locked breaks device event delivery on some Linux setups.
            #[cfg(target_os = "linux")]
            let grab_result = window.set_cursor_grab(CursorGrabMode::Confined);

            #[cfg(not(target_os = "linux"))]
            let grab_result = window
                .set_cursor_grab(CursorGrabMode::Locked)
                .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined));

            if let Err(err) = grab_result {
                warn!("Failed to capture cursor: {err}");
                self.cursor_captured = false;
                return Ok(());
            }
            window.set_cursor_visible(false);
            self.cursor_captured = true;
        } else {
            if let Err(err) = window.set_cursor_grab(CursorGrabMode::None) {
                warn!("Failed to release cursor grab: {err}");
            }
            window.set_cursor_visible(true);
            self.cursor_captured = false;
        }

        Ok(())
    }

    /// Recapture the cursor after focus returns, if it was captured before.
    pub fn handle_focus_regained(&mut self, window: &Window) -> Result<()> {
        if self.wants_cursor_capture && !self.cursor_captured {
            self.set_cursor_capture(window, true)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_state_creation() {
        let input = InputState::new();
        assert_eq!(input.mouse_delta, (0.0, 0.0));
        assert!(!input.cursor_captured);
        assert!(input.focused);
    }

    #[test]
    fn press_is_reported_once() {
        let mut input = InputState::new();
        input.press_key(KeyCode::KeyE);

        let first = input.snapshot();
        assert!(first.is_held(KeyCode::KeyE));
        assert!(first.was_pressed(KeyCode::KeyE));

        // Key still held, OS auto-repeat fires again.
        input.press_key(KeyCode::KeyE);
        let second = input.snapshot();
        assert!(second.is_held(KeyCode::KeyE));
        assert!(!second.was_pressed(KeyCode::KeyE));
    }

    #[test]
    fn tap_within_one_frame_still_counts() {
        let mut input = InputState::new();
        input.press_key(KeyCode::KeyF);
        input.release_key(KeyCode::KeyF);

        let snapshot = input.snapshot();
        assert!(!snapshot.is_held(KeyCode::KeyF));
        assert!(snapshot.was_pressed(KeyCode::KeyF));
    }

    #[test]
    fn snapshot_resets_mouse_delta() {
        let mut input = InputState::new();
        input.add_mouse_delta(3.0, -2.0);
        input.add_mouse_delta(1.0, 1.0);

        assert_eq!(input.snapshot().mouse_delta, (4.0, -1.0));
        assert_eq!(input.snapshot().mouse_delta, (0.0, 0.0));
    }

    #[test]
    fn motion_ignored_without_capture() {
        let mut input = InputState::new();
        input.handle_device_event(&DeviceEvent::MouseMotion { delta: (5.0, 5.0) });
        assert_eq!(input.mouse_delta, (0.0, 0.0));

        input.cursor_captured = true;
        input.handle_device_event(&DeviceEvent::MouseMotion { delta: (5.0, 5.0) });
        assert_eq!(input.mouse_delta, (5.0, 5.0));
    }

    #[test]
    fn losing_focus_drops_held_keys() {
        let mut input = InputState::new();
        input.cursor_captured = true;
        input.press_key(KeyCode::KeyW);
        input.handle_event(&WindowEvent::Focused(false));
        assert!(input.keys_pressed.is_empty());
        assert!(input.wants_cursor_capture);
        assert!(!input.focused);
    }
}
