//! Gesture translation: turns a hand's current and previous pose into
//! keyboard or mouse actions.
//!
//! Keyboard gestures (one hand):
//!
//! | Keyboard action     | Gesture                                        |
//! |---------------------|------------------------------------------------|
//! | Space               | touch index finger and thumb, then open        |
//! | Enter               | touch middle finger and thumb, then open       |
//! | Backspace           | touch ring finger and thumb, then open         |
//! | Escape              | touch pinkie and thumb, then open              |
//! | Alt + Tab           | make a fist (held until the fist opens)        |
//! | Navigate Alt + Tab  | move left, right, down or up while in a fist   |
//!
//! Mouse gestures (other hand):
//!
//! | Mouse action        | Gesture                                        |
//! |---------------------|------------------------------------------------|
//! | Left click          | index finger and thumb touching                |
//! | Right click         | ring finger and thumb touching                 |
//! | Scroll              | middle finger and thumb touching, move up/down |
//! | Move cursor         | move an open hand                              |
//! | Lift mouse          | make a fist                                    |
//!
//! Finger keys are edge-triggered: they fire once, when a touching finger
//! lets go of the thumb. Mouse clicks are level-triggered: they fire on
//! every call while the finger touches the thumb.

use serde::Deserialize;
use tracing::debug;

use crate::action::{KeyChord, KeyName, KeyboardAction, MouseAction};
use crate::geometry::{distance_3d, is_shaking};
use crate::skeleton::{Finger, HandPose, Skeleton};

/// Extra deadzone added to `shake_sensitivity` while navigating the
/// window switcher with a fist.
pub const FIST_NAVIGATION_SLACK: f32 = 0.008;

fn default_distance_threshold() -> f32 { 0.06 }
fn default_shake_sensitivity() -> f32 { 0.002 }
fn default_mouse_sensitivity() -> f32 { 3000.0 }
fn default_scroll_sensitivity() -> f32 { 200.0 }

/// Tunable thresholds, in normalized landmark units.
///
/// Values are not validated. Thresholds share the unit of the landmark
/// coordinates, so anything above ~1 disables the gesture it controls.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TranslatorConfig {
    /// Fingertip to thumb-tip distance at or below which the two touch.
    #[serde(default = "default_distance_threshold")]
    distance_threshold: f32,
    /// Palm movement per axis below which a frame counts as jitter.
    #[serde(default = "default_shake_sensitivity")]
    shake_sensitivity: f32,
    /// Screen pixels per normalized unit of palm movement.
    #[serde(default = "default_mouse_sensitivity")]
    mouse_sensitivity: f32,
    /// Wheel clicks per normalized unit of vertical palm movement.
    #[serde(default = "default_scroll_sensitivity")]
    scroll_sensitivity: f32,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            distance_threshold: default_distance_threshold(),
            shake_sensitivity: default_shake_sensitivity(),
            mouse_sensitivity: default_mouse_sensitivity(),
            scroll_sensitivity: default_scroll_sensitivity(),
        }
    }
}

impl TranslatorConfig {
    pub fn new(
        distance_threshold: f32,
        shake_sensitivity: f32,
        mouse_sensitivity: f32,
        scroll_sensitivity: f32,
    ) -> Self {
        Self {
            distance_threshold,
            shake_sensitivity,
            mouse_sensitivity,
            scroll_sensitivity,
        }
    }

    pub fn distance_threshold(&self) -> f32 {
        self.distance_threshold
    }

    pub fn set_distance_threshold(&mut self, distance_threshold: f32) {
        self.distance_threshold = distance_threshold;
    }

    pub fn shake_sensitivity(&self) -> f32 {
        self.shake_sensitivity
    }

    pub fn set_shake_sensitivity(&mut self, shake_sensitivity: f32) {
        self.shake_sensitivity = shake_sensitivity;
    }

    pub fn mouse_sensitivity(&self) -> f32 {
        self.mouse_sensitivity
    }

    pub fn set_mouse_sensitivity(&mut self, mouse_sensitivity: f32) {
        self.mouse_sensitivity = mouse_sensitivity;
    }

    pub fn scroll_sensitivity(&self) -> f32 {
        self.scroll_sensitivity
    }

    pub fn set_scroll_sensitivity(&mut self, scroll_sensitivity: f32) {
        self.scroll_sensitivity = scroll_sensitivity;
    }
}

/// Key sent when `finger` lets go of the thumb.
fn finger_key(finger: Finger) -> KeyName {
    match finger {
        Finger::Index => KeyName::Space,
        Finger::Middle => KeyName::Enter,
        Finger::Ring => KeyName::Backspace,
        Finger::Pinkie => KeyName::Escape,
    }
}

/// Stateless gesture classifier.
///
/// All edge detection comes from comparing the two poses handed in; the
/// translator keeps nothing between calls except its configuration.
#[derive(Debug, Clone, Default)]
pub struct Translator {
    config: TranslatorConfig,
}

impl Translator {
    pub fn new(config: TranslatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TranslatorConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut TranslatorConfig {
        &mut self.config
    }

    /// Classify the keyboard hand.
    ///
    /// Returns nothing unless both skeletons are detected. At most one
    /// action is returned, except on the frame a fist closes while moving:
    /// then the `alt+tab` press is followed by one navigation key.
    pub fn classify_keyboard(
        &self,
        current: &Skeleton,
        previous: &Skeleton,
    ) -> Vec<KeyboardAction> {
        match (current, previous) {
            (Skeleton::Detected(current), Skeleton::Detected(previous)) => {
                self.keyboard_action(current, previous)
            }
            _ => Vec::new(),
        }
    }

    fn keyboard_action(&self, current: &HandPose, previous: &HandPose) -> Vec<KeyboardAction> {
        let mut actions = Vec::new();
        let now = current.named_points();
        let past = previous.named_points();
        let was_fist = previous.is_fist();

        if current.is_fist() {
            if !was_fist {
                actions.push(KeyboardAction::Press(KeyChord::alt_tab()));
            }

            let deadzone = self.config.shake_sensitivity + FIST_NAVIGATION_SLACK;
            if !is_shaking(now.palm, past.palm, deadzone) {
                // Horizontal movement always wins over vertical.
                let chord = if now.palm.x <= past.palm.x {
                    KeyChord::shift_tab()
                } else if now.palm.x > past.palm.x {
                    KeyChord::single(KeyName::Tab)
                } else if now.palm.y <= past.palm.y {
                    KeyChord::single(KeyName::Down)
                } else {
                    KeyChord::single(KeyName::Up)
                };
                actions.push(KeyboardAction::Send(chord));
            }
            return actions;
        }

        let threshold = self.config.distance_threshold;
        for finger in Finger::ALL {
            let distance = distance_3d(now.fingertip(finger), now.thumb);
            let past_distance = distance_3d(past.fingertip(finger), past.thumb);
            if distance > threshold && past_distance <= threshold {
                debug!(finger = finger.as_str(), distance, "finger released from thumb");
                actions.push(KeyboardAction::Send(KeyChord::single(finger_key(finger))));
                return actions;
            }
        }

        if was_fist {
            actions.push(KeyboardAction::Release(KeyChord::alt_tab()));
        }
        actions
    }

    /// Classify the mouse hand.
    ///
    /// `cursor` is the OS cursor position right now; cursor moves are
    /// relative to it so external pointer motion is preserved.
    pub fn classify_mouse(
        &self,
        current: &Skeleton,
        previous: &Skeleton,
        cursor: (f32, f32),
    ) -> Option<MouseAction> {
        match (current, previous) {
            (Skeleton::Detected(current), Skeleton::Detected(previous)) => {
                self.mouse_action(current, previous, cursor)
            }
            _ => None,
        }
    }

    fn mouse_action(
        &self,
        current: &HandPose,
        previous: &HandPose,
        cursor: (f32, f32),
    ) -> Option<MouseAction> {
        let now = current.named_points();
        let past_palm = previous.named_points().palm;

        if is_shaking(now.palm, past_palm, self.config.shake_sensitivity) {
            return None;
        }

        // A fist lifts the mouse.
        if current.is_fist() {
            return None;
        }

        let threshold = self.config.distance_threshold;
        let touching = |finger: Finger| distance_3d(now.fingertip(finger), now.thumb) <= threshold;

        if touching(Finger::Index) {
            return Some(MouseAction::Click);
        }
        if touching(Finger::Ring) {
            return Some(MouseAction::RightClick);
        }

        let dx = now.palm.x - past_palm.x;
        let dy = now.palm.y - past_palm.y;

        if touching(Finger::Middle) {
            // Palm moving up the image scrolls up.
            let clicks = (self.config.scroll_sensitivity * dy).round() as i32;
            return Some(MouseAction::Scroll(clicks.saturating_neg()));
        }

        Some(MouseAction::MoveTo {
            x: cursor.0 + self.config.mouse_sensitivity * dx,
            y: cursor.1 + self.config.mouse_sensitivity * dy,
        })
    }
}
