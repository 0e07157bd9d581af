//! Control intents
//!
//! Every player is driven by the same four-boolean intent no matter where it
//! comes from. Keyboard, touch and the AI all implement [`IntentSource`].

use serde::{Deserialize, Serialize};

/// Directional/jump/dive intent for a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlIntent {
    pub left: bool,
    pub right: bool,
    /// Jump (edge-triggered by the player)
    pub up: bool,
    /// Dive while airborne
    pub down: bool,
}

impl ControlIntent {
    pub const NONE: ControlIntent = ControlIntent {
        left: false,
        right: false,
        up: false,
        down: false,
    };

    /// Logical OR of two intents
    pub fn merge(self, other: ControlIntent) -> ControlIntent {
        ControlIntent {
            left: self.left || other.left,
            right: self.right || other.right,
            up: self.up || other.up,
            down: self.down || other.down,
        }
    }

    pub fn is_idle(&self) -> bool {
        *self == Self::NONE
    }
}

/// Anything that can produce a control intent
pub trait IntentSource {
    fn intent(&self) -> ControlIntent;
}

/// Held keys (WASD or arrows, mapped by the platform layer)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyboardState {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl IntentSource for KeyboardState {
    fn intent(&self) -> ControlIntent {
        ControlIntent {
            left: self.left,
            right: self.right,
            up: self.up,
            down: self.down,
        }
    }
}

/// On-screen button state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TouchState {
    pub jump: bool,
    pub dive: bool,
    pub left: bool,
    pub right: bool,
}

impl IntentSource for TouchState {
    fn intent(&self) -> ControlIntent {
        ControlIntent {
            left: self.left,
            right: self.right,
            up: self.jump,
            down: self.dive,
        }
    }
}

/// The concrete origin of a player's intent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlSource {
    Keyboard(KeyboardState),
    Touch(TouchState),
    /// Keyboard and touch pressed together are merged
    KeyboardTouch(KeyboardState, TouchState),
    /// Written by the AI controller every tick
    Scripted(ControlIntent),
}

impl Default for ControlSource {
    fn default() -> Self {
        ControlSource::Keyboard(KeyboardState::default())
    }
}

impl IntentSource for ControlSource {
    fn intent(&self) -> ControlIntent {
        match self {
            ControlSource::Keyboard(keys) => keys.intent(),
            ControlSource::Touch(touch) => touch.intent(),
            ControlSource::KeyboardTouch(keys, touch) => keys.intent().merge(touch.intent()),
            ControlSource::Scripted(intent) => *intent,
        }
    }
}
