//! Power-on initialization state machine
//!
//! ```text
//!  PowerOn ──resync──▶ InterfaceSelected ──configure──▶ Configured
//! ```
//!
//! Resync sends the 8-bit function set three times (4.1 ms, 100 us, then no
//! pause) so the controller ends up in 8-bit mode from any state, including
//! half-way through a 4-bit byte. A 4-bit bus then sends the lone `0x2`
//! nibble. Configuration fixes the mode and brings the display to a blank,
//! cursor-off steady state.

use charlcd_core::TransportError;
use charlcd_hal::DelayNs;

use super::cmd::{self, pause};
use super::config::Model;
use super::transport::{BusWidth, RegisterSelect, Transport};

/// Progress through the init sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InitPhase {
    PowerOn,
    InterfaceSelected,
    Configured,
}

/// Drives one controller through the init sequence
pub(crate) struct Sequencer<'a, T, D> {
    pub transport: &'a mut T,
    pub delay: &'a mut D,
    pub multiplier: u32,
}

impl<T: Transport, D: DelayNs> Sequencer<'_, T, D> {
    pub fn pause(&mut self, us: u32) {
        if us > 0 {
            self.delay.delay_us(us.saturating_mul(self.multiplier));
        }
    }

    pub fn instruction(&mut self, byte: u8, pause_us: u32) -> Result<(), TransportError> {
        self.transport.send(RegisterSelect::Instruction, byte)?;
        self.pause(pause_us);
        Ok(())
    }

    /// Force a known interface width; returns the function-set interface bit
    pub fn resynchronize(&mut self) -> Result<u8, TransportError> {
        let pauses = [pause::RESYNC_FIRST_US, pause::RESYNC_SECOND_US, 0];
        match self.transport.bus_width() {
            BusWidth::Four => {
                for us in pauses {
                    self.transport.send_nibble(0x3)?;
                    self.pause(us);
                }
                self.transport.send_nibble(0x2)?;
                self.pause(pause::SHORT_US);
                Ok(cmd::IF_4BIT)
            }
            BusWidth::Eight => {
                for us in pauses {
                    self.transport
                        .send(RegisterSelect::Instruction, cmd::FUNCSET | cmd::IF_8BIT)?;
                    self.pause(us);
                }
                self.instruction(
                    cmd::FUNCSET | cmd::IF_8BIT | cmd::TWOLINE | cmd::SMALLCHAR,
                    pause::SHORT_US,
                )?;
                Ok(cmd::IF_8BIT)
            }
            BusWidth::Serial => Ok(cmd::IF_8BIT),
        }
    }

    /// Function set plus display off, clear, entry mode, home, display on
    pub fn configure(&mut self, interface: u8, model: Model) -> Result<(), TransportError> {
        let function = cmd::FUNCSET | interface | cmd::TWOLINE | cmd::SMALLCHAR;
        if model == Model::Extended {
            self.instruction(function | cmd::EXTREG, pause::SHORT_US)?;
            self.instruction(cmd::EXTMODESET | cmd::FOURLINE, pause::SHORT_US)?;
        }
        self.instruction(function, pause::SHORT_US)?;
        self.instruction(
            cmd::ONOFFCTRL | cmd::DISPOFF | cmd::CURSOROFF | cmd::CURSORNOBLINK,
            pause::SHORT_US,
        )?;
        self.instruction(cmd::CLEAR, pause::LONG_US)?;
        self.instruction(
            cmd::ENTRYMODE | cmd::E_MOVERIGHT | cmd::NOSCROLL,
            pause::SHORT_US,
        )?;
        self.instruction(cmd::HOME, pause::LONG_US)?;
        self.instruction(
            cmd::ONOFFCTRL | cmd::DISPON | cmd::CURSOROFF | cmd::CURSORNOBLINK,
            pause::SHORT_US,
        )
    }
}
