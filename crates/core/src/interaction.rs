//! Pickup, drop and consume state machine with the intoxication timer.
//!
//! The hand is in exactly one [`Phase`]. Intoxication is tracked on its own
//! axis: it only rises when a consume finishes and falls back to zero in a
//! single step once its timer runs out.

use std::f32::consts::TAU;

use tracing::{debug, info};

/// Seconds a consume action takes.
///
/// The countdown subtracts each frame's `dt` in f32 and finishes on the first
/// frame it reaches zero, so fractional frame times can add one extra frame
/// (181 frames at 60 fps, 31 at 10 fps).
pub const DRINK_DURATION: f32 = 3.0;

/// Seconds intoxication lasts after the most recent consume.
pub const INTOXICATION_DURATION: f32 = 10.0;

/// Highest intoxication level.
pub const MAX_INTOXICATION: u8 = 4;

/// What the player's hand is doing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Phase {
    /// Nothing held.
    Idle,
    /// Holding the interactable at `index`.
    Held {
        /// Registration index of the held interactable.
        index: usize,
    },
    /// Consuming the interactable at `index`; cannot be cancelled.
    Consuming {
        /// Registration index of the interactable being consumed.
        index: usize,
        /// Seconds until the consume completes.
        remaining: f32,
    },
}

/// Transitions reported by the state machine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InteractionEvent {
    /// An interactable was picked up.
    PickedUp(usize),
    /// The held interactable was put back.
    Dropped(usize),
    /// Consumption of the held interactable began.
    ConsumeStarted(usize),
    /// Consumption finished and intoxication rose to `level`.
    Consumed {
        /// Interactable that was consumed.
        index: usize,
        /// Intoxication level after the consume.
        level: u8,
    },
    /// The intoxication timer ran out and the level reset to zero.
    Sobered,
}

/// Intoxication level with its decay timer.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Intoxication {
    level: u8,
    remaining: f32,
}

impl Intoxication {
    /// Construct with an explicit level and timer. Level is capped at [`MAX_INTOXICATION`].
    pub fn new(level: u8, remaining: f32) -> Self {
        Self {
            level: level.min(MAX_INTOXICATION),
            remaining,
        }
    }

    /// Current level in `0..=MAX_INTOXICATION`.
    pub fn level(&self) -> u8 {
        self.level
    }

    /// Seconds left before the level resets.
    pub fn remaining(&self) -> f32 {
        self.remaining
    }

    /// Raise the level by one (saturating) and restart the timer.
    pub fn raise(&mut self) {
        self.level = (self.level + 1).min(MAX_INTOXICATION);
        self.remaining = INTOXICATION_DURATION;
    }

    /// Count the timer down. Returns true when this call reset the level.
    ///
    /// The timer only runs while positive.
    pub fn decay(&mut self, dt: f32) -> bool {
        if self.remaining <= 0.0 {
            return false;
        }
        self.remaining -= dt;
        if self.remaining <= 0.0 {
            self.level = 0;
            return true;
        }
        false
    }

    /// Camera shake offset `(yaw, pitch)` in degrees at time `t`, if any.
    pub fn shake(&self, t: f32) -> Option<(f32, f32)> {
        shake_offset(self.level, t)
    }
}

/// Sinusoidal look offset for an intoxication level at time `t` (seconds).
///
/// Frequency and amplitude both grow with the level; level zero does not shake.
pub fn shake_offset(level: u8, t: f32) -> Option<(f32, f32)> {
    if level == 0 {
        return None;
    }
    let level = f32::from(level);
    let frequency = 1.8 + 0.3 * level;
    let amplitude = 0.15 + 0.05 * level;
    let phase = t * frequency * TAU;
    Some((phase.sin() * amplitude, phase.cos() * amplitude))
}

/// Complete interaction state: hand phase plus intoxication.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InteractionState {
    /// Current hand phase.
    pub phase: Phase,
    /// Intoxication axis.
    pub intoxication: Intoxication,
}

impl Default for InteractionState {
    fn default() -> Self {
        Self {
            phase: Phase::Idle,
            intoxication: Intoxication::default(),
        }
    }
}

impl InteractionState {
    /// Index of the held (or consumed) interactable.
    pub fn held(&self) -> Option<usize> {
        match self.phase {
            Phase::Idle => None,
            Phase::Held { index } | Phase::Consuming { index, .. } => Some(index),
        }
    }

    /// True while a consume is in progress.
    pub fn is_consuming(&self) -> bool {
        matches!(self.phase, Phase::Consuming { .. })
    }

    /// Seconds left on the current consume, zero when not consuming.
    pub fn consume_remaining(&self) -> f32 {
        match self.phase {
            Phase::Consuming { remaining, .. } => remaining,
            _ => 0.0,
        }
    }

    /// Current intoxication level.
    pub fn intoxication_level(&self) -> u8 {
        self.intoxication.level()
    }

    /// Advance the consume countdown. Completing a consume empties the hand
    /// and raises intoxication.
    pub fn tick_consume(&mut self, dt: f32) -> Option<InteractionEvent> {
        let Phase::Consuming { index, remaining } = self.phase else {
            return None;
        };

        let remaining = remaining - dt;
        if remaining > 0.0 {
            self.phase = Phase::Consuming { index, remaining };
            return None;
        }

        self.phase = Phase::Idle;
        self.intoxication.raise();
        let level = self.intoxication.level();
        info!(index, level, "Finished consuming");
        Some(InteractionEvent::Consumed { index, level })
    }

    /// Count the intoxication timer down.
    pub fn tick_intoxication(&mut self, dt: f32) -> Option<InteractionEvent> {
        if self.intoxication.decay(dt) {
            info!("Intoxication wore off");
            Some(InteractionEvent::Sobered)
        } else {
            None
        }
    }

    /// Handle a pickup press: pick up the focused interactable when idle,
    /// drop when holding. Ignored while consuming.
    pub fn press_pickup(&mut self, focused: Option<usize>) -> Option<InteractionEvent> {
        match self.phase {
            Phase::Idle => {
                let index = focused?;
                self.phase = Phase::Held { index };
                debug!(index, "Picked up interactable");
                Some(InteractionEvent::PickedUp(index))
            }
            Phase::Held { index } => {
                self.phase = Phase::Idle;
                debug!(index, "Dropped interactable");
                Some(InteractionEvent::Dropped(index))
            }
            Phase::Consuming { .. } => None,
        }
    }

    /// Handle a consume press: only valid while holding something.
    pub fn press_consume(&mut self) -> Option<InteractionEvent> {
        let Phase::Held { index } = self.phase else {
            return None;
        };
        self.phase = Phase::Consuming {
            index,
            remaining: DRINK_DURATION,
        };
        debug!(index, "Started consuming");
        Some(InteractionEvent::ConsumeStarted(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pickup_needs_focus() {
        let mut state = InteractionState::default();
        assert_eq!(state.press_pickup(None), None);
        assert_eq!(state.phase, Phase::Idle);
    }

    #[test]
    fn pickup_while_holding_drops_even_without_focus() {
        let mut state = InteractionState::default();
        state.press_pickup(Some(1));
        assert_eq!(state.press_pickup(None), Some(InteractionEvent::Dropped(1)));
        assert_eq!(state.held(), None);
    }

    #[test]
    fn consume_requires_held_item() {
        let mut state = InteractionState::default();
        assert_eq!(state.press_consume(), None);
        assert!(!state.is_consuming());
    }

    #[test]
    fn presses_ignored_while_consuming() {
        let mut state = InteractionState::default();
        state.press_pickup(Some(2));
        state.press_consume();

        assert_eq!(state.press_pickup(Some(0)), None);
        assert_eq!(state.press_consume(), None);
        assert_eq!(state.held(), Some(2));
        assert_eq!(state.consume_remaining(), DRINK_DURATION);
    }

    fn frames_to_finish(dt: f32) -> usize {
        let mut state = InteractionState::default();
        state.press_pickup(Some(0));
        state.press_consume();
        let mut frames = 0;
        while state.is_consuming() {
            state.tick_consume(dt);
            frames += 1;
            assert!(frames < 1000, "consume never finished");
        }
        frames
    }

    #[test]
    fn consume_finishes_within_one_extra_frame() {
        // Binary-exact steps land on zero.
        assert_eq!(frames_to_finish(0.5), 6);
        // Rounding in f32 may leave a sliver for one more frame.
        let at_60 = frames_to_finish(1.0 / 60.0);
        assert!((180..=181).contains(&at_60), "took {at_60} frames");
        let at_10 = frames_to_finish(0.1);
        assert!((30..=31).contains(&at_10), "took {at_10} frames");
    }

    #[test]
    fn level_saturates_at_max() {
        let mut intox = Intoxication::new(MAX_INTOXICATION, 3.0);
        intox.raise();
        assert_eq!(intox.level(), MAX_INTOXICATION);
        assert_eq!(intox.remaining(), INTOXICATION_DURATION);
    }

    #[test]
    fn decay_only_runs_while_positive() {
        let mut intox = Intoxication::new(3, 0.0);
        assert!(!intox.decay(1.0));
        assert_eq!(intox.level(), 3);
        assert_eq!(intox.remaining(), 0.0);
    }

    #[test]
    fn shake_grows_with_level() {
        assert_eq!(shake_offset(0, 1.0), None);
        let (_, pitch_one) = shake_offset(1, 0.0).expect("level 1 shakes");
        let (_, pitch_four) = shake_offset(4, 0.0).expect("level 4 shakes");
        // At t = 0 the pitch offset equals the amplitude.
        assert!((pitch_one - 0.20).abs() < 1e-6);
        assert!((pitch_four - 0.35).abs() < 1e-6);
    }
}
