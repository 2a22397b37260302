//! Scoped ownership of the action sink.
//!
//! A chord pressed through the session stays latched until it is released
//! or the session is torn down. Teardown releases every latched chord so a
//! held `alt` never outlives the program.

use tracing::{debug, info, warn};

use crate::action::{ActionSink, KeyChord, KeyboardAction, MouseAction};

pub struct InputSession<K: ActionSink> {
    sink: K,
    /// Chords pressed and not yet released, in press order
    latched: Vec<KeyChord>,
    closed: bool,
}

impl<K: ActionSink> InputSession<K> {
    pub fn new(sink: K) -> Self {
        Self {
            sink,
            latched: Vec::new(),
            closed: false,
        }
    }

    pub fn latched(&self) -> &[KeyChord] {
        &self.latched
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    /// Cursor position, or `None` when the OS will not tell us.
    pub fn cursor_position(&mut self) -> Option<(f32, f32)> {
        match self.sink.cursor_position() {
            Ok((x, y)) => Some((x as f32, y as f32)),
            Err(e) => {
                warn!("{:#}", e);
                None
            }
        }
    }

    pub fn apply_keyboard(&mut self, action: &KeyboardAction) {
        debug!("keyboard: {}", action);
        let result = match action {
            KeyboardAction::Press(chord) => {
                let result = self.sink.press_key(chord);
                if !self.latched.contains(chord) {
                    self.latched.push(chord.clone());
                }
                result
            }
            KeyboardAction::Release(chord) => {
                self.latched.retain(|held| held != chord);
                self.sink.release_key(chord)
            }
            KeyboardAction::Send(chord) => self.sink.send_key(chord),
        };
        if let Err(e) = result {
            warn!("{}: {:#}", action, e);
        }
    }

    pub fn apply_mouse(&mut self, action: &MouseAction) {
        debug!("mouse: {:?}", action);
        let result = match *action {
            MouseAction::MoveTo { x, y } => {
                self.sink.move_cursor_to(x.round() as i32, y.round() as i32)
            }
            MouseAction::Click => self.sink.click(),
            MouseAction::RightClick => self.sink.right_click(),
            MouseAction::Scroll(amount) => self.sink.scroll(amount),
        };
        if let Err(e) = result {
            warn!("{:?}: {:#}", action, e);
        }
    }

    /// Release every latched chord, newest first. Every release is
    /// attempted even if an earlier one fails. Safe to call more than once.
    pub fn teardown(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;

        while let Some(chord) = self.latched.pop() {
            info!("releasing held {}", chord);
            if let Err(e) = self.sink.release_key(&chord) {
                warn!("failed to release {}: {:#}", chord, e);
            }
        }
    }
}

impl<K: ActionSink> Drop for InputSession<K> {
    fn drop(&mut self) {
        self.teardown();
    }
}
