//! Android key names and their key-event codes.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A named hardware or soft key understood by `input keyevent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AndroidKey {
    /// Enter / Return
    Enter,
    /// Backspace (KEYCODE_DEL)
    Backspace,
    /// Forward delete (KEYCODE_FORWARD_DEL)
    Delete,
    /// Tab
    Tab,
    /// Space bar
    Space,
    /// Home button
    Home,
    /// Back button
    Back,
    /// Menu button
    Menu,
    /// Search button
    Search,
    /// Volume up
    VolumeUp,
    /// Volume down
    VolumeDown,
    /// Power button
    Power,
    /// Escape
    Escape,
    /// D-pad up
    DpadUp,
    /// D-pad down
    DpadDown,
    /// D-pad left
    DpadLeft,
    /// D-pad right
    DpadRight,
    /// Recent apps / overview
    AppSwitch,
}

impl AndroidKey {
    /// Every supported key.
    pub const ALL: [AndroidKey; 18] = [
        AndroidKey::Enter,
        AndroidKey::Backspace,
        AndroidKey::Delete,
        AndroidKey::Tab,
        AndroidKey::Space,
        AndroidKey::Home,
        AndroidKey::Back,
        AndroidKey::Menu,
        AndroidKey::Search,
        AndroidKey::VolumeUp,
        AndroidKey::VolumeDown,
        AndroidKey::Power,
        AndroidKey::Escape,
        AndroidKey::DpadUp,
        AndroidKey::DpadDown,
        AndroidKey::DpadLeft,
        AndroidKey::DpadRight,
        AndroidKey::AppSwitch,
    ];

    /// Parse a key name.
    ///
    /// Matching is case-insensitive and treats `-` and spaces like `_`.
    /// A handful of aliases are accepted:
    /// - "return" -> Enter
    /// - "esc" -> Escape
    /// - "del" -> Delete
    /// - "up" / "down" / "left" / "right" -> D-pad
    /// - "recent_apps" -> AppSwitch
    pub fn parse(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");

        match normalized.as_str() {
            "return" => return Ok(AndroidKey::Enter),
            "esc" => return Ok(AndroidKey::Escape),
            "del" => return Ok(AndroidKey::Delete),
            "up" => return Ok(AndroidKey::DpadUp),
            "down" => return Ok(AndroidKey::DpadDown),
            "left" => return Ok(AndroidKey::DpadLeft),
            "right" => return Ok(AndroidKey::DpadRight),
            "recent_apps" | "recents" => return Ok(AndroidKey::AppSwitch),
            _ => {}
        }

        Self::ALL
            .into_iter()
            .find(|key| key.name() == normalized)
            .ok_or_else(|| Error::UnknownKey(s.to_string()))
    }

    /// Canonical snake_case name.
    pub fn name(self) -> &'static str {
        match self {
            AndroidKey::Enter => "enter",
            AndroidKey::Backspace => "backspace",
            AndroidKey::Delete => "delete",
            AndroidKey::Tab => "tab",
            AndroidKey::Space => "space",
            AndroidKey::Home => "home",
            AndroidKey::Back => "back",
            AndroidKey::Menu => "menu",
            AndroidKey::Search => "search",
            AndroidKey::VolumeUp => "volume_up",
            AndroidKey::VolumeDown => "volume_down",
            AndroidKey::Power => "power",
            AndroidKey::Escape => "escape",
            AndroidKey::DpadUp => "dpad_up",
            AndroidKey::DpadDown => "dpad_down",
            AndroidKey::DpadLeft => "dpad_left",
            AndroidKey::DpadRight => "dpad_right",
            AndroidKey::AppSwitch => "app_switch",
        }
    }

    /// Android key-event code (`KeyEvent.KEYCODE_*`).
    pub fn code(self) -> u16 {
        match self {
            AndroidKey::Enter => 66,
            AndroidKey::Backspace => 67,
            AndroidKey::Delete => 112,
            AndroidKey::Tab => 61,
            AndroidKey::Space => 62,
            AndroidKey::Home => 3,
            AndroidKey::Back => 4,
            AndroidKey::Menu => 82,
            AndroidKey::Search => 84,
            AndroidKey::VolumeUp => 24,
            AndroidKey::VolumeDown => 25,
            AndroidKey::Power => 26,
            AndroidKey::Escape => 111,
            AndroidKey::DpadUp => 19,
            AndroidKey::DpadDown => 20,
            AndroidKey::DpadLeft => 21,
            AndroidKey::DpadRight => 22,
            AndroidKey::AppSwitch => 187,
        }
    }
}

impl std::fmt::Display for AndroidKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
