//! 8-bit HD44780 bus on a PC parallel port
//!
//! ```text
//!   data register  D0..D7 ──> display D0..D7, output latch, keypad drive
//!   control STRB   ────────> RS
//!   control INIT   ────────> EN
//!   control SEL    ────────> backlight (low = on), output latch enable
//!   status  5 bits <──────── direct keys
//! ```
//!
//! Every access (one byte, a backlight change, a key scan or a latch write)
//! runs under the port's exclusive lock so that several processes can share
//! one port.

use charlcd_core::{InitError, KeyMask, TransportError};
use charlcd_hal::parport::{control, status, ParallelPort, PortAccess};
use charlcd_hal::DelayNs;

use super::DEFAULT_PULSE_US;
use crate::hd44780::{BusWidth, RegisterSelect, Transport};

const RS: u8 = control::STRB;
const EN: u8 = control::INIT;
const BL: u8 = control::SEL;
const LE: u8 = control::SEL;

/// Status bits of the direct keys, in key order
const KEY_LINES: [u8; 5] = [
    status::ACK,
    status::BUSY,
    status::PAPEREND,
    status::SELIN,
    status::FAULT,
];

/// HD44780 on a parallel port with optional keypad and output latch
pub struct Parallel8Bit<P, D> {
    port: P,
    delay: D,
    pulse_us: u32,
    /// Control bits for the current backlight state
    backlight_bit: u8,
    keypad: bool,
    /// Inputs that read as pressed with nothing touched
    stuck: u8,
}

fn write_err<E>(_: E) -> TransportError {
    TransportError::Write
}

impl<P: ParallelPort, D: DelayNs> Parallel8Bit<P, D> {
    /// With `keypad`, the key lines are sampled once so that stuck inputs
    /// can be masked from every later scan.
    pub fn new(port: P, delay: D, keypad: bool) -> Result<Self, InitError> {
        let mut lcd = Self {
            port,
            delay,
            pulse_us: DEFAULT_PULSE_US,
            backlight_bit: 0,
            keypad,
            stuck: 0,
        };
        if keypad {
            lcd.stuck = lcd.read_direct().map_err(|_| InitError::ChannelOpen)?;
            if lcd.stuck != 0 {
                log::warn!("hd44780: parallel: masking stuck key inputs {:#04x}", lcd.stuck);
            }
        }
        Ok(lcd)
    }

    /// Pause after each enable edge; zero disables bus delays
    pub fn with_pulse(mut self, pulse_us: u32) -> Self {
        self.pulse_us = pulse_us;
        self
    }

    fn pulse(delay: &mut D, pulse_us: u32) {
        if pulse_us > 0 {
            delay.delay_us(pulse_us);
        }
    }

    /// Raw key bits 0..=4, stuck lines not yet removed
    fn read_direct(&mut self) -> Result<u8, TransportError> {
        let idle = self.backlight_bit ^ control::OUTMASK;
        // Data lines and STRB all driven inactive while sampling
        let sample = (control::STRB | self.backlight_bit) ^ control::OUTMASK;
        let mut port = self.port.acquire().map_err(|_| TransportError::Read)?;
        port.write_data(0xFF).map_err(|_| TransportError::Read)?;
        port.write_control(sample).map_err(|_| TransportError::Read)?;
        Self::pulse(&mut self.delay, self.pulse_us);

        let value = !port.read_status().map_err(|_| TransportError::Read)? ^ status::INMASK;
        port.write_data(idle).map_err(|_| TransportError::Read)?;

        Ok(KEY_LINES
            .iter()
            .enumerate()
            .filter(|(_, line)| value & **line != 0)
            .fold(0, |bits, (i, _)| bits | (1 << i)))
    }
}

impl<P: ParallelPort, D: DelayNs> Transport for Parallel8Bit<P, D> {
    fn bus_width(&self) -> BusWidth {
        BusWidth::Eight
    }

    fn send(&mut self, rs: RegisterSelect, byte: u8) -> Result<(), TransportError> {
        let lines = if rs.is_data() { RS } else { 0 } | self.backlight_bit;
        let mut port = self.port.acquire().map_err(write_err)?;
        port.write_control(lines ^ control::OUTMASK).map_err(write_err)?;
        port.write_data(byte).map_err(write_err)?;
        Self::pulse(&mut self.delay, self.pulse_us);
        port.write_control((EN | lines) ^ control::OUTMASK)
            .map_err(write_err)?;
        Self::pulse(&mut self.delay, self.pulse_us);
        port.write_control(lines ^ control::OUTMASK).map_err(write_err)
    }

    fn set_backlight(&mut self, on: bool) -> Result<(), TransportError> {
        self.backlight_bit = if on { 0 } else { BL };
        let mut port = self.port.acquire().map_err(write_err)?;
        port.write_control(self.backlight_bit ^ control::OUTMASK)
            .map_err(write_err)
    }

    fn output(&mut self, value: u8) -> Result<(), TransportError> {
        let mut port = self.port.acquire().map_err(write_err)?;
        port.write_data(value).map_err(write_err)?;
        port.write_control((LE | self.backlight_bit) ^ control::OUTMASK)
            .map_err(write_err)?;
        Self::pulse(&mut self.delay, self.pulse_us);
        port.write_control(self.backlight_bit ^ control::OUTMASK)
            .map_err(write_err)?;
        Self::pulse(&mut self.delay, self.pulse_us);
        Ok(())
    }

    fn scan_keys(&mut self) -> Result<Option<KeyMask>, TransportError> {
        if !self.keypad {
            return Ok(None);
        }
        let bits = self.read_direct()? & !self.stuck;
        Ok(Some(KeyMask::from_bits(bits)))
    }
}
