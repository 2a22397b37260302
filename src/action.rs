//! Output actions and the sink that performs them.

use std::fmt;
use std::str::FromStr;

use anyhow::{bail, Result};

/// A single named key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyName {
    Alt,
    Shift,
    Control,
    Tab,
    Up,
    Down,
    Left,
    Right,
    Space,
    Enter,
    Backspace,
    Escape,
}

impl KeyName {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Alt => "alt",
            Self::Shift => "shift",
            Self::Control => "ctrl",
            Self::Tab => "tab",
            Self::Up => "up",
            Self::Down => "down",
            Self::Left => "left",
            Self::Right => "right",
            Self::Space => "space",
            Self::Enter => "enter",
            Self::Backspace => "backspace",
            Self::Escape => "escape",
        }
    }
}

impl FromStr for KeyName {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let key = match s.trim().to_ascii_lowercase().as_str() {
            "alt" => Self::Alt,
            "shift" => Self::Shift,
            "ctrl" | "control" => Self::Control,
            "tab" => Self::Tab,
            "up" | "up arrow" => Self::Up,
            "down" | "down arrow" => Self::Down,
            "left" | "left arrow" => Self::Left,
            "right" | "right arrow" => Self::Right,
            "space" => Self::Space,
            "enter" | "return" => Self::Enter,
            "backspace" => Self::Backspace,
            "escape" | "esc" => Self::Escape,
            other => bail!("unknown key name: {:?}", other),
        };
        Ok(key)
    }
}

/// A `+`-separated key combination such as `alt+tab`.
///
/// Keys are pressed in order and released in reverse order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyChord {
    keys: Vec<KeyName>,
}

impl KeyChord {
    pub fn new(keys: Vec<KeyName>) -> Self {
        Self { keys }
    }

    pub fn single(key: KeyName) -> Self {
        Self { keys: vec![key] }
    }

    pub fn keys(&self) -> &[KeyName] {
        &self.keys
    }

    /// `alt+tab`: opens and holds the window switcher.
    pub fn alt_tab() -> Self {
        Self::new(vec![KeyName::Alt, KeyName::Tab])
    }

    /// `shift+tab`: step backwards in the window switcher.
    pub fn shift_tab() -> Self {
        Self::new(vec![KeyName::Shift, KeyName::Tab])
    }
}

impl FromStr for KeyChord {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let keys = s
            .split('+')
            .map(str::parse)
            .collect::<Result<Vec<KeyName>>>()?;
        Ok(Self { keys })
    }
}

impl fmt::Display for KeyChord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, key) in self.keys.iter().enumerate() {
            if i > 0 {
                f.write_str("+")?;
            }
            f.write_str(key.as_str())?;
        }
        Ok(())
    }
}

/// Output of the keyboard channel.
#[derive(Debug, Clone, PartialEq)]
pub enum KeyboardAction {
    /// Hold a chord down until it is released.
    Press(KeyChord),
    /// Release a previously pressed chord.
    Release(KeyChord),
    /// Press and release as one event.
    Send(KeyChord),
}

impl fmt::Display for KeyboardAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Press(chord) => write!(f, "press({chord})"),
            Self::Release(chord) => write!(f, "release({chord})"),
            Self::Send(chord) => write!(f, "send({chord})"),
        }
    }
}

/// Output of the mouse channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MouseAction {
    /// Move the cursor to an absolute screen position.
    MoveTo { x: f32, y: f32 },
    Click,
    RightClick,
    /// Wheel clicks; positive scrolls up.
    Scroll(i32),
}

/// The OS input layer.
///
/// The classifier never looks at what these calls return beyond logging
/// failures.
pub trait ActionSink {
    /// Current cursor position in screen pixels.
    fn cursor_position(&mut self) -> Result<(i32, i32)>;
    fn move_cursor_to(&mut self, x: i32, y: i32) -> Result<()>;
    fn click(&mut self) -> Result<()>;
    fn right_click(&mut self) -> Result<()>;
    /// Scroll by `amount` wheel clicks; positive scrolls up.
    fn scroll(&mut self, amount: i32) -> Result<()>;
    fn press_key(&mut self, chord: &KeyChord) -> Result<()>;
    fn release_key(&mut self, chord: &KeyChord) -> Result<()>;
    /// Press and release `chord` as one event.
    fn send_key(&mut self, chord: &KeyChord) -> Result<()>;
}

/// Sink double that records every call.
#[cfg(test)]
pub(crate) mod recording {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    pub(crate) enum Call {
        MoveTo(i32, i32),
        Click,
        RightClick,
        Scroll(i32),
        Press(String),
        Release(String),
        Send(String),
    }

    #[derive(Debug, Default)]
    pub(crate) struct RecordingSink {
        pub(crate) calls: Vec<Call>,
        pub(crate) cursor: (i32, i32),
        /// Make `release_key` fail for this many calls.
        pub(crate) failing_releases: usize,
    }

    impl ActionSink for RecordingSink {
        fn cursor_position(&mut self) -> Result<(i32, i32)> {
            Ok(self.cursor)
        }

        fn move_cursor_to(&mut self, x: i32, y: i32) -> Result<()> {
            self.cursor = (x, y);
            self.calls.push(Call::MoveTo(x, y));
            Ok(())
        }

        fn click(&mut self) -> Result<()> {
            self.calls.push(Call::Click);
            Ok(())
        }

        fn right_click(&mut self) -> Result<()> {
            self.calls.push(Call::RightClick);
            Ok(())
        }

        fn scroll(&mut self, amount: i32) -> Result<()> {
            self.calls.push(Call::Scroll(amount));
            Ok(())
        }

        fn press_key(&mut self, chord: &KeyChord) -> Result<()> {
            self.calls.push(Call::Press(chord.to_string()));
            Ok(())
        }

        fn release_key(&mut self, chord: &KeyChord) -> Result<()> {
            self.calls.push(Call::Release(chord.to_string()));
            if self.failing_releases > 0 {
                self.failing_releases -= 1;
                bail!("release of {} refused", chord);
            }
            Ok(())
        }

        fn send_key(&mut self, chord: &KeyChord) -> Result<()> {
            self.calls.push(Call::Send(chord.to_string()));
            Ok(())
        }
    }
}
