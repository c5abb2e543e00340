//! Mapping from the two virtual outputs to platform keys

use super::VirtualKey;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A platform key that a virtual output can be bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoundKey {
    /// A printable key, injected by its character
    Char(char),
    Shift,
    Control,
    Alt,
    Space,
}

impl BoundKey {
    /// Short label for indicators and log lines
    pub fn label(&self) -> String {
        match self {
            Self::Char(c) => c.to_uppercase().to_string(),
            Self::Shift => "Shift".to_string(),
            Self::Control => "Ctrl".to_string(),
            Self::Alt => "Alt".to_string(),
            Self::Space => "Space".to_string(),
        }
    }

    #[cfg(feature = "virtual-send")]
    pub(crate) fn to_enigo(self) -> enigo::Key {
        match self {
            Self::Char(c) => enigo::Key::Unicode(c),
            Self::Shift => enigo::Key::Shift,
            Self::Control => enigo::Key::Control,
            Self::Alt => enigo::Key::Alt,
            Self::Space => enigo::Key::Space,
        }
    }
}

impl fmt::Display for BoundKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// Platform keys used for the forward and sprint outputs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    pub forward: BoundKey,
    pub sprint: BoundKey,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            forward: BoundKey::Char('w'),
            sprint: BoundKey::Shift,
        }
    }
}

impl KeyBindings {
    /// Platform key bound to a virtual output
    pub fn key_for(&self, key: VirtualKey) -> BoundKey {
        match key {
            VirtualKey::Forward => self.forward,
            VirtualKey::Sprint => self.sprint,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_bindings_are_w_and_shift() {
        let bindings = KeyBindings::default();
        assert_eq!(bindings.key_for(VirtualKey::Forward), BoundKey::Char('w'));
        assert_eq!(bindings.key_for(VirtualKey::Sprint), BoundKey::Shift);
    }

    #[test]
    fn labels_are_display_friendly() {
        assert_eq!(BoundKey::Char('w').label(), "W");
        assert_eq!(BoundKey::Shift.to_string(), "Shift");
        assert_eq!(BoundKey::Control.label(), "Ctrl");
    }

    #[test]
    fn bindings_deserialize_from_toml() {
        let toml_str = r#"
forward = { Char = "e" }
sprint = "Control"
"#;
        let bindings: KeyBindings = toml::from_str(toml_str).expect("Failed to deserialize");
        assert_eq!(bindings.forward, BoundKey::Char('e'));
        assert_eq!(bindings.sprint, BoundKey::Control);
    }
}
