use std::collections::HashMap;

use gallery_core::{FrameInput, MoveIntent};
use gallery_input::InputSnapshot;
use tracing::warn;
use winit::keyboard::KeyCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    MoveForward,
    MoveBackward,
    MoveLeft,
    MoveRight,
    Pickup,
    Consume,
    ToggleCursor,
    Quit,
}

#[derive(Debug, Clone)]
pub struct Bindings {
    map: HashMap<Action, Vec<KeyCode>>,
}

impl Bindings {
    pub fn from_overrides(overrides: &HashMap<String, Vec<String>>) -> Self {
        let mut map: HashMap<Action, Vec<KeyCode>> = default_bindings().into_iter().collect();

        for (action_name, keys) in overrides {
            match parse_action(action_name) {
                Some(action) => {
                    map.insert(action, parse_keys(keys));
                }
                None => warn!("Unknown action '{}' in bindings", action_name),
            }
        }

        Self { map }
    }

    fn keys_for(&self, action: Action) -> &[KeyCode] {
        self.map.get(&action).map(|v| v.as_slice()).unwrap_or(&[])
    }
}

/// Per-frame actions resolved from one input snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ActionState {
    pub frame: FrameInput,
    pub toggle_cursor: bool,
    pub quit: bool,
}

#[derive(Debug)]
pub struct InputProcessor {
    bindings: Bindings,
}

impl InputProcessor {
    pub fn new(overrides: &HashMap<String, Vec<String>>) -> Self {
        Self {
            bindings: Bindings::from_overrides(overrides),
        }
    }

    pub fn process(&self, snapshot: &InputSnapshot) -> ActionState {
        let look_delta = if snapshot.cursor_captured {
            (snapshot.mouse_delta.0 as f32, snapshot.mouse_delta.1 as f32)
        } else {
            (0.0, 0.0)
        };

        ActionState {
            frame: FrameInput {
                movement: MoveIntent {
                    forward: self.action_active(Action::MoveForward, snapshot),
                    backward: self.action_active(Action::MoveBackward, snapshot),
                    left: self.action_active(Action::MoveLeft, snapshot),
                    right: self.action_active(Action::MoveRight, snapshot),
                },
                look_delta,
                pickup_pressed: self.action_triggered(Action::Pickup, snapshot),
                consume_pressed: self.action_triggered(Action::Consume, snapshot),
            },
            toggle_cursor: self.action_triggered(Action::ToggleCursor, snapshot),
            quit: self.action_triggered(Action::Quit, snapshot),
        }
    }

    fn action_active(&self, action: Action, snapshot: &InputSnapshot) -> bool {
        self.bindings
            .keys_for(action)
            .iter()
            .any(|key| snapshot.is_held(*key))
    }

    fn action_triggered(&self, action: Action, snapshot: &InputSnapshot) -> bool {
        self.bindings
            .keys_for(action)
            .iter()
            .any(|key| snapshot.was_pressed(*key))
    }
}

fn default_bindings() -> Vec<(Action, Vec<KeyCode>)> {
    vec![
        (Action::MoveForward, vec![KeyCode::KeyW]),
        (Action::MoveBackward, vec![KeyCode::KeyS]),
        (Action::MoveLeft, vec![KeyCode::KeyA]),
        (Action::MoveRight, vec![KeyCode::KeyD]),
        (Action::Pickup, vec![KeyCode::KeyE]),
        (Action::Consume, vec![KeyCode::KeyF]),
        (Action::ToggleCursor, vec![KeyCode::Tab]),
        (Action::Quit, vec![KeyCode::Escape]),
    ]
}

fn parse_keys(tokens: &[String]) -> Vec<KeyCode> {
    tokens
        .iter()
        .filter_map(|token| {
            parse_key_code(token).or_else(|| {
                warn!("Unknown key '{}'; ignoring", token);
                None
            })
        })
        .collect()
}

fn parse_key_code(name: &str) -> Option<KeyCode> {
    Some(match name {
        "KeyW" => KeyCode::KeyW,
        "KeyA" => KeyCode::KeyA,
        "KeyS" => KeyCode::KeyS,
        "KeyD" => KeyCode::KeyD,
        "KeyQ" => KeyCode::KeyQ,
        "KeyE" => KeyCode::KeyE,
        "KeyR" => KeyCode::KeyR,
        "KeyF" => KeyCode::KeyF,
        "KeyG" => KeyCode::KeyG,
        "KeyC" => KeyCode::KeyC,
        "KeyV" => KeyCode::KeyV,
        "ArrowUp" => KeyCode::ArrowUp,
        "ArrowDown" => KeyCode::ArrowDown,
        "ArrowLeft" => KeyCode::ArrowLeft,
        "ArrowRight" => KeyCode::ArrowRight,
        "Space" => KeyCode::Space,
        "Enter" => KeyCode::Enter,
        "ShiftLeft" => KeyCode::ShiftLeft,
        "ControlLeft" => KeyCode::ControlLeft,
        "Tab" => KeyCode::Tab,
        "Escape" => KeyCode::Escape,
        _ => return None,
    })
}

fn parse_action(name: &str) -> Option<Action> {
    match name {
        "MoveForward" => Some(Action::MoveForward),
        "MoveBackward" => Some(Action::MoveBackward),
        "MoveLeft" => Some(Action::MoveLeft),
        "MoveRight" => Some(Action::MoveRight),
        "Pickup" => Some(Action::Pickup),
        "Consume" => Some(Action::Consume),
        "ToggleCursor" => Some(Action::ToggleCursor),
        "Quit" => Some(Action::Quit),
        _ => None,
    }
}
