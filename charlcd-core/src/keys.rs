//! Keys and key masks
//!
//! Keypads report a bit per pressed key. The bit layout matches the key
//! port of the MCP23017 keypad board, so that port can be passed through
//! unchanged; other inputs are mapped onto it.

/// A named key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Key {
    Enter,
    Right,
    Down,
    Up,
    Left,
    Escape,
}

impl Key {
    /// All keys in mask bit order
    pub const ALL: [Key; 6] = [
        Key::Enter,
        Key::Right,
        Key::Down,
        Key::Up,
        Key::Left,
        Key::Escape,
    ];

    pub const fn mask(self) -> KeyMask {
        KeyMask(match self {
            Key::Enter => KeyMask::ENTER,
            Key::Right => KeyMask::RIGHT,
            Key::Down => KeyMask::DOWN,
            Key::Up => KeyMask::UP,
            Key::Left => KeyMask::LEFT,
            Key::Escape => KeyMask::ESCAPE,
        })
    }

    pub const fn name(self) -> &'static str {
        match self {
            Key::Enter => "Enter",
            Key::Right => "Right",
            Key::Down => "Down",
            Key::Up => "Up",
            Key::Left => "Left",
            Key::Escape => "Escape",
        }
    }

    /// Key for a byte received from a terminal attached to a POS display
    pub const fn from_pos_byte(byte: u8) -> Option<Key> {
        match byte {
            0x0D => Some(Key::Enter),
            b'A' => Some(Key::Up),
            b'B' => Some(Key::Down),
            b'C' => Some(Key::Right),
            b'D' => Some(Key::Left),
            0x08 => Some(Key::Escape),
            _ => None,
        }
    }
}

/// Set of pressed keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyMask(u8);

impl KeyMask {
    pub const ENTER: u8 = 0x01;
    pub const RIGHT: u8 = 0x02;
    pub const DOWN: u8 = 0x04;
    pub const UP: u8 = 0x08;
    pub const LEFT: u8 = 0x10;
    pub const ESCAPE: u8 = 0x20;

    pub const EMPTY: Self = Self(0);

    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & 0x3F)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn contains(self, key: Key) -> bool {
        self.0 & key.mask().0 != 0
    }

    /// Pressed keys in bit order
    pub fn keys(self) -> impl Iterator<Item = Key> {
        Key::ALL.into_iter().filter(move |&key| self.contains(key))
    }

    /// Lowest-bit pressed key
    pub fn first(self) -> Option<Key> {
        self.keys().next()
    }
}

impl From<Key> for KeyMask {
    fn from(key: Key) -> Self {
        key.mask()
    }
}
