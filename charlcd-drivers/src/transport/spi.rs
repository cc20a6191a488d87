//! KS0073 in serial (SPI) mode
//!
//! Every transfer is three bytes: a start byte with the RS flag, then the
//! payload bit-reversed and split into two left-aligned nibbles. The
//! backlight, when present, is a separate switch (a sysfs file on most
//! boards).

use charlcd_core::{InitError, TransportError};
use charlcd_hal::{OutputPin, SpiBus};

use crate::hd44780::{BusWidth, RegisterSelect, Transport};

/// Start byte: five sync bits, RW = 0, RS, trailing 0
pub const SYNC: u8 = 0xF8;

/// RS flag in the start byte
pub const SYNC_RS: u8 = 0x02;

/// Encode one transfer
pub fn frame(rs: RegisterSelect, byte: u8) -> [u8; 3] {
    let start = if rs.is_data() { SYNC | SYNC_RS } else { SYNC };
    let reversed = byte.reverse_bits();
    [start, reversed & 0xF0, (reversed & 0x0F) << 4]
}

/// KS0073 on SPI with an optional backlight switch
pub struct SpiKs0073<S, L> {
    spi: S,
    backlight: Option<L>,
}

impl<S: SpiBus, L: OutputPin> SpiKs0073<S, L> {
    pub fn new(spi: S, backlight: Option<L>) -> Result<Self, InitError> {
        if backlight.is_none() {
            log::info!("hd44780: spi: no backlight switch configured");
        }
        Ok(Self { spi, backlight })
    }
}

impl<S: SpiBus, L: OutputPin> Transport for SpiKs0073<S, L> {
    fn bus_width(&self) -> BusWidth {
        BusWidth::Serial
    }

    fn send(&mut self, rs: RegisterSelect, byte: u8) -> Result<(), TransportError> {
        self.spi
            .write(&frame(rs, byte))
            .map_err(|_| TransportError::Write)
    }

    fn set_backlight(&mut self, on: bool) -> Result<(), TransportError> {
        match self.backlight.as_mut() {
            Some(switch) => switch.set_state(on).map_err(|_| TransportError::Write),
            None => Ok(()),
        }
    }
}
