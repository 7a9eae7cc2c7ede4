//! Key combinations used as menu shortcuts.
//!
//! A [`Keys`] value is one key plus the modifiers held with it, e.g.
//! `Ctrl+S` or `Alt+F4`. It is the lookup key of every strip's shortcut
//! index, and the unit [`is_valid_shortcut`] judges.
//!
//! # String Format
//!
//! ```
//! use horizon_toolstrip::keys::{Key, Keys};
//!
//! let save: Keys = "Ctrl+S".parse().unwrap();
//! assert_eq!(save, Keys::ctrl(Key::S));
//! assert_eq!(save.to_string(), "Ctrl+S");
//! ```

use std::fmt;
use std::str::FromStr;

use winit::keyboard::{Key as WinitKey, ModifiersState, NamedKey};

/// A key on the keyboard, independent of modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    I,
    J,
    K,
    L,
    M,
    N,
    O,
    P,
    Q,
    R,
    S,
    T,
    U,
    V,
    W,
    X,
    Y,
    Z,
    Digit0,
    Digit1,
    Digit2,
    Digit3,
    Digit4,
    Digit5,
    Digit6,
    Digit7,
    Digit8,
    Digit9,
    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
    F7,
    F8,
    F9,
    F10,
    F11,
    F12,
    F13,
    F14,
    F15,
    F16,
    F17,
    F18,
    F19,
    F20,
    F21,
    F22,
    F23,
    F24,
    Delete,
    Insert,
    Backspace,
    Enter,
    Tab,
    Space,
    Escape,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Home,
    End,
    PageUp,
    PageDown,
    /// The Alt key itself.
    Menu,
    /// The Control key itself.
    ControlKey,
    /// The Shift key itself.
    ShiftKey,
}

impl Key {
    /// Function keys F1 through F24.
    pub fn is_function_key(self) -> bool {
        self.function_number().is_some()
    }

    fn function_number(self) -> Option<u8> {
        use Key::*;
        let n = match self {
            F1 => 1,
            F2 => 2,
            F3 => 3,
            F4 => 4,
            F5 => 5,
            F6 => 6,
            F7 => 7,
            F8 => 8,
            F9 => 9,
            F10 => 10,
            F11 => 11,
            F12 => 12,
            F13 => 13,
            F14 => 14,
            F15 => 15,
            F16 => 16,
            F17 => 17,
            F18 => 18,
            F19 => 19,
            F20 => 20,
            F21 => 21,
            F22 => 22,
            F23 => 23,
            F24 => 24,
            _ => return None,
        };
        Some(n)
    }

    /// A bare modifier key (Alt, Control or Shift) pressed on its own.
    pub fn is_modifier_key(self) -> bool {
        matches!(self, Key::Menu | Key::ControlKey | Key::ShiftKey)
    }

    fn name(self) -> &'static str {
        use Key::*;
        match self {
            A => "A",
            B => "B",
            C => "C",
            D => "D",
            E => "E",
            F => "F",
            G => "G",
            H => "H",
            I => "I",
            J => "J",
            K => "K",
            L => "L",
            M => "M",
            N => "N",
            O => "O",
            P => "P",
            Q => "Q",
            R => "R",
            S => "S",
            T => "T",
            U => "U",
            V => "V",
            W => "W",
            X => "X",
            Y => "Y",
            Z => "Z",
            Digit0 => "0",
            Digit1 => "1",
            Digit2 => "2",
            Digit3 => "3",
            Digit4 => "4",
            Digit5 => "5",
            Digit6 => "6",
            Digit7 => "7",
            Digit8 => "8",
            Digit9 => "9",
            F1 => "F1",
            F2 => "F2",
            F3 => "F3",
            F4 => "F4",
            F5 => "F5",
            F6 => "F6",
            F7 => "F7",
            F8 => "F8",
            F9 => "F9",
            F10 => "F10",
            F11 => "F11",
            F12 => "F12",
            F13 => "F13",
            F14 => "F14",
            F15 => "F15",
            F16 => "F16",
            F17 => "F17",
            F18 => "F18",
            F19 => "F19",
            F20 => "F20",
            F21 => "F21",
            F22 => "F22",
            F23 => "F23",
            F24 => "F24",
            Delete => "Del",
            Insert => "Ins",
            Backspace => "Backspace",
            Enter => "Enter",
            Tab => "Tab",
            Space => "Space",
            Escape => "Esc",
            ArrowUp => "Up",
            ArrowDown => "Down",
            ArrowLeft => "Left",
            ArrowRight => "Right",
            Home => "Home",
            End => "End",
            PageUp => "PgUp",
            PageDown => "PgDown",
            Menu => "Menu",
            ControlKey => "ControlKey",
            ShiftKey => "ShiftKey",
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Modifier keys held with a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub control: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    /// No modifiers.
    pub const NONE: Self = Self {
        shift: false,
        control: false,
        alt: false,
        meta: false,
    };
    /// Control only.
    pub const CTRL: Self = Self {
        control: true,
        ..Self::NONE
    };
    /// Alt only.
    pub const ALT: Self = Self {
        alt: true,
        ..Self::NONE
    };
    /// Shift only.
    pub const SHIFT: Self = Self {
        shift: true,
        ..Self::NONE
    };
    /// Control and Shift.
    pub const CTRL_SHIFT: Self = Self {
        control: true,
        shift: true,
        ..Self::NONE
    };

    /// Whether no modifier is held.
    pub fn is_empty(self) -> bool {
        self == Self::NONE
    }
}

/// A key combination: an optional key plus modifiers.
///
/// `key` is `None` when only modifiers are held (or nothing at all).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Keys {
    pub key: Option<Key>,
    pub modifiers: Modifiers,
}

impl Keys {
    /// The empty combination.
    pub const NONE: Self = Self {
        key: None,
        modifiers: Modifiers::NONE,
    };

    /// Create a combination from a key and modifiers.
    pub fn new(key: Key, modifiers: Modifiers) -> Self {
        Self {
            key: Some(key),
            modifiers,
        }
    }

    /// A key with no modifiers.
    pub fn key_only(key: Key) -> Self {
        Self::new(key, Modifiers::NONE)
    }

    /// Modifiers with no key.
    pub fn modifiers_only(modifiers: Modifiers) -> Self {
        Self {
            key: None,
            modifiers,
        }
    }

    pub fn ctrl(key: Key) -> Self {
        Self::new(key, Modifiers::CTRL)
    }

    pub fn alt(key: Key) -> Self {
        Self::new(key, Modifiers::ALT)
    }

    pub fn shift(key: Key) -> Self {
        Self::new(key, Modifiers::SHIFT)
    }

    pub fn ctrl_shift(key: Key) -> Self {
        Self::new(key, Modifiers::CTRL_SHIFT)
    }

    /// Whether this is the empty combination.
    pub fn is_none(&self) -> bool {
        *self == Self::NONE
    }
}

impl From<Key> for Keys {
    fn from(key: Key) -> Self {
        Self::key_only(key)
    }
}

impl fmt::Display for Keys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();

        if self.modifiers.control {
            parts.push("Ctrl");
        }
        if self.modifiers.alt {
            parts.push("Alt");
        }
        if self.modifiers.shift {
            parts.push("Shift");
        }
        if self.modifiers.meta {
            parts.push("Meta");
        }
        if let Some(key) = self.key {
            parts.push(key.name());
        }

        if parts.is_empty() {
            f.write_str("None")
        } else {
            write!(f, "{}", parts.join("+"))
        }
    }
}

/// Error type for parsing key combinations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeysParseError {
    /// The string is empty.
    Empty,
    /// No key was specified (only modifiers).
    NoKey,
    /// Unknown key name.
    UnknownKey(String),
    /// More than one non-modifier key.
    TooManyKeys,
}

impl fmt::Display for KeysParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty key combination"),
            Self::NoKey => write!(f, "no key specified (only modifiers)"),
            Self::UnknownKey(s) => write!(f, "unknown key: {s}"),
            Self::TooManyKeys => write!(f, "more than one key in combination"),
        }
    }
}

impl std::error::Error for KeysParseError {}

impl FromStr for Keys {
    type Err = KeysParseError;

    /// Parse a combination such as `"Ctrl+Shift+N"` or `"F5"`.
    ///
    /// Modifier names are case-insensitive: `Ctrl`/`Control`, `Alt`/`Option`,
    /// `Shift`, `Meta`/`Cmd`/`Win`/`Super`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(KeysParseError::Empty);
        }

        let mut modifiers = Modifiers::NONE;
        let mut key: Option<Key> = None;

        for part in s.split('+') {
            let part = part.trim();
            match part.to_lowercase().as_str() {
                "ctrl" | "control" => modifiers.control = true,
                "alt" | "option" => modifiers.alt = true,
                "shift" => modifiers.shift = true,
                "meta" | "cmd" | "command" | "win" | "windows" | "super" => modifiers.meta = true,
                _ => {
                    if key.is_some() {
                        return Err(KeysParseError::TooManyKeys);
                    }
                    key = Some(parse_key(part)?);
                }
            }
        }

        match key {
            Some(key) => Ok(Keys::new(key, modifiers)),
            None => Err(KeysParseError::NoKey),
        }
    }
}

/// Parse a key name to a Key enum value.
fn parse_key(s: &str) -> Result<Key, KeysParseError> {
    use Key::*;

    let mut chars = s.chars();
    if let (Some(ch), None) = (chars.next(), chars.next()) {
        let key = match ch.to_ascii_uppercase() {
            'A' => A,
            'B' => B,
            'C' => C,
            'D' => D,
            'E' => E,
            'F' => F,
            'G' => G,
            'H' => H,
            'I' => I,
            'J' => J,
            'K' => K,
            'L' => L,
            'M' => M,
            'N' => N,
            'O' => O,
            'P' => P,
            'Q' => Q,
            'R' => R,
            'S' => S,
            'T' => T,
            'U' => U,
            'V' => V,
            'W' => W,
            'X' => X,
            'Y' => Y,
            'Z' => Z,
            '0' => Digit0,
            '1' => Digit1,
            '2' => Digit2,
            '3' => Digit3,
            '4' => Digit4,
            '5' => Digit5,
            '6' => Digit6,
            '7' => Digit7,
            '8' => Digit8,
            '9' => Digit9,
            _ => return Err(KeysParseError::UnknownKey(s.to_string())),
        };
        return Ok(key);
    }

    let lower = s.to_lowercase();
    if let Some(n) = lower.strip_prefix('f').and_then(|n| n.parse::<u8>().ok())
        && let Some(key) = function_key(n)
    {
        return Ok(key);
    }

    match lower.as_str() {
        "delete" | "del" => Ok(Delete),
        "insert" | "ins" => Ok(Insert),
        "backspace" | "back" => Ok(Backspace),
        "enter" | "return" => Ok(Enter),
        "tab" => Ok(Tab),
        "space" | "spacebar" => Ok(Space),
        "escape" | "esc" => Ok(Escape),
        "up" | "arrowup" => Ok(ArrowUp),
        "down" | "arrowdown" => Ok(ArrowDown),
        "left" | "arrowleft" => Ok(ArrowLeft),
        "right" | "arrowright" => Ok(ArrowRight),
        "home" => Ok(Home),
        "end" => Ok(End),
        "pageup" | "pgup" => Ok(PageUp),
        "pagedown" | "pgdown" | "pgdn" => Ok(PageDown),
        "menu" => Ok(Menu),
        "controlkey" => Ok(ControlKey),
        "shiftkey" => Ok(ShiftKey),
        _ => Err(KeysParseError::UnknownKey(s.to_string())),
    }
}

fn function_key(n: u8) -> Option<Key> {
    use Key::*;
    const KEYS: [Key; 24] = [
        F1, F2, F3, F4, F5, F6, F7, F8, F9, F10, F11, F12, F13, F14, F15, F16, F17, F18, F19, F20,
        F21, F22, F23, F24,
    ];
    KEYS.get(usize::from(n).checked_sub(1)?).copied()
}

/// Whether a combination may be used as a menu shortcut.
///
/// Delete, Insert and the function keys are valid with or without
/// modifiers. Any other key needs a modifier, must not itself be a bare
/// modifier key, and Shift alone does not count.
pub fn is_valid_shortcut(shortcut: Keys) -> bool {
    let Some(key) = shortcut.key else {
        return false;
    };
    if matches!(key, Key::Delete | Key::Insert) || key.is_function_key() {
        return true;
    }
    if shortcut.modifiers.is_empty() || key.is_modifier_key() {
        return false;
    }
    shortcut.modifiers != Modifiers::SHIFT
}

/// Whether the key activates the menu bar (Alt or F10).
pub fn is_menu_key(keys: Keys) -> bool {
    matches!(keys.key, Some(Key::Menu) | Some(Key::F10))
}

/// Converts a winit logical key to a toolstrip key.
///
/// Returns `None` for keys that can never take part in a shortcut.
pub fn from_winit_key(key: &WinitKey) -> Option<Key> {
    match key {
        WinitKey::Named(named) => from_winit_named_key(named),
        WinitKey::Character(c) => parse_key(c.as_str()).ok(),
        WinitKey::Unidentified(_) | WinitKey::Dead(_) => None,
    }
}

fn from_winit_named_key(key: &NamedKey) -> Option<Key> {
    use Key::*;
    let key = match key {
        NamedKey::ArrowUp => ArrowUp,
        NamedKey::ArrowDown => ArrowDown,
        NamedKey::ArrowLeft => ArrowLeft,
        NamedKey::ArrowRight => ArrowRight,
        NamedKey::Home => Home,
        NamedKey::End => End,
        NamedKey::PageUp => PageUp,
        NamedKey::PageDown => PageDown,

        NamedKey::Backspace => Backspace,
        NamedKey::Delete => Delete,
        NamedKey::Insert => Insert,
        NamedKey::Enter => Enter,
        NamedKey::Tab => Tab,
        NamedKey::Space => Space,
        NamedKey::Escape => Escape,

        NamedKey::Alt => Menu,
        NamedKey::Control => ControlKey,
        NamedKey::Shift => ShiftKey,

        NamedKey::F1 => F1,
        NamedKey::F2 => F2,
        NamedKey::F3 => F3,
        NamedKey::F4 => F4,
        NamedKey::F5 => F5,
        NamedKey::F6 => F6,
        NamedKey::F7 => F7,
        NamedKey::F8 => F8,
        NamedKey::F9 => F9,
        NamedKey::F10 => F10,
        NamedKey::F11 => F11,
        NamedKey::F12 => F12,
        NamedKey::F13 => F13,
        NamedKey::F14 => F14,
        NamedKey::F15 => F15,
        NamedKey::F16 => F16,
        NamedKey::F17 => F17,
        NamedKey::F18 => F18,
        NamedKey::F19 => F19,
        NamedKey::F20 => F20,
        NamedKey::F21 => F21,
        NamedKey::F22 => F22,
        NamedKey::F23 => F23,
        NamedKey::F24 => F24,

        _ => return None,
    };
    Some(key)
}

/// Converts winit modifier state to toolstrip modifiers.
pub fn from_winit_modifiers(state: ModifiersState) -> Modifiers {
    Modifiers {
        shift: state.shift_key(),
        control: state.control_key(),
        alt: state.alt_key(),
        meta: state.super_key(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shortcut_validity() {
        assert!(!is_valid_shortcut(Keys::NONE));
        assert!(is_valid_shortcut(Keys::key_only(Key::Delete)));
        assert!(is_valid_shortcut(Keys::shift(Key::Insert)));
        assert!(is_valid_shortcut(Keys::key_only(Key::F5)));
        assert!(is_valid_shortcut(Keys::shift(Key::F24)));
        assert!(is_valid_shortcut(Keys::ctrl(Key::A)));
        assert!(is_valid_shortcut(Keys::ctrl_shift(Key::N)));
        assert!(!is_valid_shortcut(Keys::shift(Key::A)));
        assert!(!is_valid_shortcut(Keys::key_only(Key::A)));
        assert!(!is_valid_shortcut(Keys::modifiers_only(Modifiers::ALT)));
        assert!(!is_valid_shortcut(Keys::alt(Key::Menu)));
        assert!(!is_valid_shortcut(Keys::ctrl(Key::ShiftKey)));
    }

    #[test]
    fn test_menu_key() {
        assert!(is_menu_key(Keys::key_only(Key::Menu)));
        assert!(is_menu_key(Keys::shift(Key::F10)));
        assert!(!is_menu_key(Keys::key_only(Key::F11)));
        assert!(!is_menu_key(Keys::NONE));
    }

    #[test]
    fn test_display() {
        assert_eq!(Keys::ctrl_shift(Key::S).to_string(), "Ctrl+Shift+S");
        assert_eq!(Keys::alt(Key::F4).to_string(), "Alt+F4");
        assert_eq!(Keys::key_only(Key::Delete).to_string(), "Del");
        assert_eq!(Keys::NONE.to_string(), "None");
    }

    #[test]
    fn test_parse() {
        assert_eq!("ctrl+s".parse::<Keys>(), Ok(Keys::ctrl(Key::S)));
        assert_eq!("Control + Shift + 1".parse::<Keys>(), Ok(Keys::ctrl_shift(Key::Digit1)));
        assert_eq!("F24".parse::<Keys>(), Ok(Keys::key_only(Key::F24)));
        assert_eq!("".parse::<Keys>(), Err(KeysParseError::Empty));
        assert_eq!("Ctrl+Alt".parse::<Keys>(), Err(KeysParseError::NoKey));
        assert_eq!("Ctrl+A+B".parse::<Keys>(), Err(KeysParseError::TooManyKeys));
        assert_eq!(
            "Ctrl+F25".parse::<Keys>(),
            Err(KeysParseError::UnknownKey("F25".to_string()))
        );
    }

    #[test]
    fn test_winit_bridge() {
        assert_eq!(from_winit_key(&WinitKey::Named(NamedKey::F10)), Some(Key::F10));
        assert_eq!(from_winit_key(&WinitKey::Named(NamedKey::Alt)), Some(Key::Menu));
        assert_eq!(from_winit_key(&WinitKey::Named(NamedKey::CapsLock)), None);

        let modifiers = from_winit_modifiers(ModifiersState::CONTROL | ModifiersState::SHIFT);
        assert_eq!(modifiers, Modifiers::CTRL_SHIFT);
    }
}
