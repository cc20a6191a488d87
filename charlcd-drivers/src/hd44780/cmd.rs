//! HD44780 instruction set

pub const CLEAR: u8 = 0x01;

pub const HOME: u8 = 0x02;

pub const ENTRYMODE: u8 = 0x04;
pub const E_MOVERIGHT: u8 = 0x02;
pub const E_MOVELEFT: u8 = 0x00;
pub const NOSCROLL: u8 = 0x00;

pub const ONOFFCTRL: u8 = 0x08;
pub const DISPON: u8 = 0x04;
pub const DISPOFF: u8 = 0x00;
pub const CURSORON: u8 = 0x02;
pub const CURSOROFF: u8 = 0x00;
pub const CURSORBLINK: u8 = 0x01;
pub const CURSORNOBLINK: u8 = 0x00;

pub const FUNCSET: u8 = 0x20;
pub const IF_8BIT: u8 = 0x10;
pub const IF_4BIT: u8 = 0x00;
pub const TWOLINE: u8 = 0x08;
pub const ONELINE: u8 = 0x00;
pub const SMALLCHAR: u8 = 0x00;
/// KS0073: select the extended register set
pub const EXTREG: u8 = 0x04;

/// KS0073 extended function set (needs [`EXTREG`])
pub const EXTMODESET: u8 = 0x08;
pub const FOURLINE: u8 = 0x01;

/// Set CGRAM address
pub const SETCHAR: u8 = 0x40;

/// Set DDRAM address
pub const POSITION: u8 = 0x80;

/// Execution pauses in microseconds
pub mod pause {
    /// Most instructions and data writes
    pub const SHORT_US: u32 = 40;
    /// Clear and home
    pub const LONG_US: u32 = 1600;
    /// After the first resync function set
    pub const RESYNC_FIRST_US: u32 = 4100;
    /// After the second resync function set
    pub const RESYNC_SECOND_US: u32 = 100;
}
