//! OS input through enigo.

use anyhow::{Context, Result};
use enigo::{Axis, Button, Coordinate, Direction, Enigo, Key, Keyboard, Mouse, Settings};

use crate::action::{ActionSink, KeyChord, KeyName};

fn enigo_key(key: KeyName) -> Key {
    match key {
        KeyName::Alt => Key::Alt,
        KeyName::Shift => Key::Shift,
        KeyName::Control => Key::Control,
        KeyName::Tab => Key::Tab,
        KeyName::Up => Key::UpArrow,
        KeyName::Down => Key::DownArrow,
        KeyName::Left => Key::LeftArrow,
        KeyName::Right => Key::RightArrow,
        KeyName::Space => Key::Space,
        KeyName::Enter => Key::Return,
        KeyName::Backspace => Key::Backspace,
        KeyName::Escape => Key::Escape,
    }
}

/// Press every key of `keys` in order, then release them in reverse.
///
/// If a press fails, the keys already down are released before the error
/// is returned. Every release is attempted even if one fails.
fn tap_chord<F>(keys: &[KeyName], mut key: F) -> Result<()>
where
    F: FnMut(KeyName, Direction) -> Result<()>,
{
    let mut pressed = 0;
    let mut result = Ok(());
    for &name in keys {
        if let Err(e) = key(name, Direction::Press) {
            result = Err(e);
            break;
        }
        pressed += 1;
    }
    for &name in keys[..pressed].iter().rev() {
        let released = key(name, Direction::Release);
        if result.is_ok() {
            result = released;
        }
    }
    result
}

/// [`ActionSink`] driving the real mouse and keyboard.
pub struct EnigoSink {
    enigo: Enigo,
}

impl EnigoSink {
    pub fn new() -> Result<Self> {
        let enigo = Enigo::new(&Settings::default())
            .context("failed to connect to the OS input layer")?;
        Ok(Self { enigo })
    }

    fn key(&mut self, key: KeyName, direction: Direction) -> Result<()> {
        self.enigo
            .key(enigo_key(key), direction)
            .with_context(|| format!("key {} failed", key.as_str()))
    }

    fn keys(&mut self, keys: &[KeyName], direction: Direction) -> Result<()> {
        for &key in keys {
            self.key(key, direction)?;
        }
        Ok(())
    }

    fn release_reversed(&mut self, chord: &KeyChord) -> Result<()> {
        let reversed: Vec<KeyName> = chord.keys().iter().rev().copied().collect();
        self.keys(&reversed, Direction::Release)
    }
}

impl ActionSink for EnigoSink {
    fn cursor_position(&mut self) -> Result<(i32, i32)> {
        self.enigo.location().context("failed to read cursor position")
    }

    fn move_cursor_to(&mut self, x: i32, y: i32) -> Result<()> {
        self.enigo
            .move_mouse(x, y, Coordinate::Abs)
            .context("failed to move cursor")
    }

    fn click(&mut self) -> Result<()> {
        self.enigo
            .button(Button::Left, Direction::Click)
            .context("left click failed")
    }

    fn right_click(&mut self) -> Result<()> {
        self.enigo
            .button(Button::Right, Direction::Click)
            .context("right click failed")
    }

    fn scroll(&mut self, amount: i32) -> Result<()> {
        // enigo scrolls down for positive lengths.
        self.enigo
            .scroll(amount.saturating_neg(), Axis::Vertical)
            .context("scroll failed")
    }

    fn press_key(&mut self, chord: &KeyChord) -> Result<()> {
        self.keys(chord.keys(), Direction::Press)
    }

    fn release_key(&mut self, chord: &KeyChord) -> Result<()> {
        self.release_reversed(chord)
    }

    fn send_key(&mut self, chord: &KeyChord) -> Result<()> {
        tap_chord(chord.keys(), |key, direction| self.key(key, direction))
    }
}
