//! Transport contract
//!
//! The protocol core only ever asks a transport to move one byte to the
//! instruction or data register, to switch the backlight, and optionally
//! to read keys. Everything electrical lives behind [`Transport`].
//!
//! 4-bit buses share the strobe discipline in [`strobe_byte`]: each byte is
//! two nibbles, high first, and each nibble is presented with enable low,
//! pulsed high, and returned low with a pause after every step.

use charlcd_core::{KeyMask, TransportError};
use charlcd_hal::DelayNs;

/// Target register of a write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegisterSelect {
    Instruction,
    Data,
}

impl RegisterSelect {
    pub const fn is_data(self) -> bool {
        matches!(self, RegisterSelect::Data)
    }
}

/// Interface width, selects the power-on resynchronisation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusWidth {
    /// D4..D7 only; resync with single nibbles
    Four,
    /// D0..D7; resync with full bytes
    Eight,
    /// Framed serial protocol that always carries whole bytes; no resync
    Serial,
}

/// Byte-level access to one HD44780 controller
pub trait Transport {
    fn bus_width(&self) -> BusWidth;

    /// Write one byte to the selected register
    fn send(&mut self, rs: RegisterSelect, byte: u8) -> Result<(), TransportError>;

    /// Strobe a single instruction nibble; used only while resynchronising
    /// a 4-bit bus
    fn send_nibble(&mut self, _nibble: u8) -> Result<(), TransportError> {
        Err(TransportError::Unsupported)
    }

    fn set_backlight(&mut self, on: bool) -> Result<(), TransportError>;

    /// Contrast 0..=255; hardware without contrast control ignores it
    fn set_contrast(&mut self, _value: u8) -> Result<(), TransportError> {
        Ok(())
    }

    /// Drive the general purpose output latch, where wired
    fn output(&mut self, _value: u8) -> Result<(), TransportError> {
        Ok(())
    }

    /// Pressed keys, `None` when the bus has no keypad
    fn scan_keys(&mut self) -> Result<Option<KeyMask>, TransportError> {
        Ok(None)
    }

    /// Release bus resources early; must be idempotent
    fn close(&mut self) {}
}

/// One parallel write of RS, D4..D7 and EN on a 4-bit bus
pub trait NibbleBus {
    fn present(&mut self, rs: RegisterSelect, nibble: u8, enable: bool)
        -> Result<(), TransportError>;
}

/// Latch one nibble: enable low, high, low, pausing `pulse_us` after each
pub fn strobe_nibble<B, D>(
    bus: &mut B,
    delay: &mut D,
    rs: RegisterSelect,
    nibble: u8,
    pulse_us: u32,
) -> Result<(), TransportError>
where
    B: NibbleBus + ?Sized,
    D: DelayNs,
{
    let nibble = nibble & 0x0F;
    bus.present(rs, nibble, false)?;
    delay.delay_us(pulse_us);
    bus.present(rs, nibble, true)?;
    delay.delay_us(pulse_us);
    bus.present(rs, nibble, false)?;
    delay.delay_us(pulse_us);
    Ok(())
}

/// Latch a full byte as two nibbles, high first
pub fn strobe_byte<B, D>(
    bus: &mut B,
    delay: &mut D,
    rs: RegisterSelect,
    byte: u8,
    pulse_us: u32,
) -> Result<(), TransportError>
where
    B: NibbleBus + ?Sized,
    D: DelayNs,
{
    strobe_nibble(bus, delay, rs, byte >> 4, pulse_us)?;
    strobe_nibble(bus, delay, rs, byte & 0x0F, pulse_us)
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn bus_width(&self) -> BusWidth {
        T::bus_width(self)
    }

    fn send(&mut self, rs: RegisterSelect, byte: u8) -> Result<(), TransportError> {
        T::send(self, rs, byte)
    }

    fn send_nibble(&mut self, nibble: u8) -> Result<(), TransportError> {
        T::send_nibble(self, nibble)
    }

    fn set_backlight(&mut self, on: bool) -> Result<(), TransportError> {
        T::set_backlight(self, on)
    }

    fn set_contrast(&mut self, value: u8) -> Result<(), TransportError> {
        T::set_contrast(self, value)
    }

    fn output(&mut self, value: u8) -> Result<(), TransportError> {
        T::output(self, value)
    }

    fn scan_keys(&mut self) -> Result<Option<KeyMask>, TransportError> {
        T::scan_keys(self)
    }

    fn close(&mut self) {
        T::close(self)
    }
}
