//! LIS2 and MPlay serial displays
//!
//! Both speak whole bytes over a UART, with `0x00` as a command prefix, so
//! the HD44780 instruction stream is translated:
//!
//! - DDRAM positioning becomes `00 A1+y x A7`
//! - CGRAM uploads are intercepted; LIS2 takes one row at a time, MPlay
//!   takes all eight glyphs at once after the last row of any glyph
//! - low character codes are shifted so they never look like the prefix
//!
//! MPlay boards also report temperatures and drive fans.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use charlcd_core::TransportError;
use charlcd_hal::{UartRx, UartTx};
use heapless::Vec;

use crate::hd44780::cmd::{POSITION, SETCHAR};
use crate::hd44780::{BusWidth, RegisterSelect, Transport};

const PREFIX: u8 = 0x00;

mod op {
    pub const GOTO_ROW: u8 = 0xA1;
    pub const GOTO_END: u8 = 0xA7;
    pub const LIS2_GLYPH_ROW: u8 = 0xAB;
    pub const LIS2_FANS: u8 = 0xAE;
    pub const MPLAY_FAN_INIT: u8 = 0xA4;
    pub const MPLAY_FANS: u8 = 0xAC;
    pub const MPLAY_GLYPHS: u8 = 0xAD;
    pub const MPLAY_TEMPS: u8 = 0xAF;
}

/// Glyph slots on the device
const SLOTS: usize = 8;

/// Offset between a raw temperature byte and degrees Celsius
const TEMPERATURE_OFFSET: i16 = 150;

/// Most temperature sensors on any board
pub const MAX_SENSORS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum SerialDialect {
    #[default]
    Lis2,
    MPlay,
}

impl SerialDialect {
    /// LIS2 always runs at 19200 baud; MPlay honours the configured rate
    pub fn baudrate(self, configured: Option<u32>) -> u32 {
        match self {
            SerialDialect::Lis2 => 19200,
            SerialDialect::MPlay => configured.unwrap_or(38400),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Upload {
    Idle,
    Glyph { slot: usize, row: u8 },
}

/// LIS2 / MPlay display on a serial port
pub struct Lis2Serial<U> {
    port: U,
    dialect: SerialDialect,
    cell_height: u8,
    extended: bool,
    upload: Upload,
    glyphs: [[u8; 8]; SLOTS],
    fans_ready: bool,
}

impl<U: UartTx> Lis2Serial<U> {
    /// `extended` selects 0x20 instead of 0x40 as the DDRAM row stride
    pub fn new(port: U, dialect: SerialDialect, cell_height: u8, extended: bool) -> Self {
        Self {
            port,
            dialect,
            cell_height: cell_height.clamp(1, 8),
            extended,
            upload: Upload::Idle,
            glyphs: [[0; 8]; SLOTS],
            fans_ready: false,
        }
    }

    pub fn dialect(&self) -> SerialDialect {
        self.dialect
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        self.port
            .write_blocking(bytes)
            .map_err(|_| TransportError::Write)
    }

    fn glyph_row(&mut self, slot: usize, row: u8, bits: u8) -> Result<(), TransportError> {
        match self.dialect {
            SerialDialect::Lis2 => {
                // Glyph 0 would collide with the prefix
                let number = (slot as u8 + 1).min(7);
                self.write(&[PREFIX, op::LIS2_GLYPH_ROW, number, row, bits])
            }
            SerialDialect::MPlay => {
                self.glyphs[slot][usize::from(row)] = bits;
                if row + 1 < self.cell_height {
                    return Ok(());
                }
                let mut frame = [0u8; 2 + SLOTS * 8];
                frame[0] = PREFIX;
                frame[1] = op::MPLAY_GLYPHS;
                for (dst, src) in frame[2..].chunks_mut(8).zip(self.glyphs.iter()) {
                    dst.copy_from_slice(src);
                }
                self.write(&frame)
            }
        }
    }

    fn character(&self, byte: u8) -> u8 {
        match self.dialect {
            SerialDialect::Lis2 if byte < 7 => byte + 1,
            // Codes 8..16 mirror the glyph slots
            SerialDialect::MPlay if byte < 8 => byte + 8,
            _ => byte,
        }
    }

    /// Set fan speeds: any number on MPlay, four on LIS2
    pub fn set_fans(&mut self, speeds: &[u8]) -> Result<(), TransportError> {
        match self.dialect {
            SerialDialect::MPlay => {
                if !self.fans_ready {
                    self.write(&[PREFIX, op::MPLAY_FAN_INIT, 0x7D])?;
                    self.fans_ready = true;
                }
                self.write(&[PREFIX, op::MPLAY_FANS])?;
                self.write(speeds)
            }
            SerialDialect::Lis2 => {
                let [f1, f2, f3, f4] = match speeds {
                    [a, b, c, d] => [*a, *b, *c, *d],
                    _ => return Err(TransportError::Unsupported),
                };
                self.write(&[
                    PREFIX,
                    op::LIS2_FANS,
                    0,
                    0,
                    f1,
                    0,
                    f2,
                    0,
                    f3,
                    0,
                    f4,
                    0,
                    0,
                ])
            }
        }
    }
}

impl<U: UartTx + UartRx> Lis2Serial<U> {
    /// Read `count` sensors in degrees Celsius (MPlay only)
    pub fn read_temperatures(&mut self, count: usize) -> Result<Vec<i16, MAX_SENSORS>, TransportError> {
        if self.dialect != SerialDialect::MPlay || count > MAX_SENSORS {
            return Err(TransportError::Unsupported);
        }
        self.write(&[PREFIX, op::MPLAY_TEMPS])?;

        let mut raw = [0u8; MAX_SENSORS];
        let mut filled = 0;
        while filled < count {
            let n = self
                .port
                .read_blocking(&mut raw[filled..count])
                .map_err(|_| TransportError::Read)?;
            if n == 0 {
                return Err(TransportError::Read);
            }
            filled += n;
        }
        Ok(raw[..count]
            .iter()
            .map(|&r| i16::from(r) - TEMPERATURE_OFFSET)
            .collect())
    }
}

impl<U: UartTx> Transport for Lis2Serial<U> {
    fn bus_width(&self) -> BusWidth {
        BusWidth::Serial
    }

    fn send(&mut self, rs: RegisterSelect, byte: u8) -> Result<(), TransportError> {
        match (rs, self.upload) {
            (RegisterSelect::Data, Upload::Glyph { slot, row }) => {
                let next = row + 1;
                self.upload = if next >= self.cell_height {
                    Upload::Idle
                } else {
                    Upload::Glyph { slot, row: next }
                };
                self.glyph_row(slot, row, byte)
            }
            (RegisterSelect::Data, Upload::Idle) => {
                let byte = self.character(byte);
                self.write(&[byte])
            }
            (RegisterSelect::Instruction, _) => {
                self.upload = Upload::Idle;
                if byte & POSITION != 0 {
                    let address = byte & !POSITION;
                    let stride = if self.extended { 0x20 } else { 0x40 };
                    self.write(&[
                        PREFIX,
                        op::GOTO_ROW + address / stride,
                        address % stride,
                        op::GOTO_END,
                    ])
                } else if byte & SETCHAR != 0 {
                    let slot = usize::from((byte & !SETCHAR) / 8);
                    self.upload = Upload::Glyph { slot, row: 0 };
                    Ok(())
                } else {
                    self.write(&[byte])
                }
            }
        }
    }

    /// No backlight control on these boards
    fn set_backlight(&mut self, _on: bool) -> Result<(), TransportError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    #[derive(Default)]
    struct MockUart {
        sent: std::vec::Vec<u8>,
        incoming: VecDeque<u8>,
    }

    impl UartTx for MockUart {
        type Error = ();

        fn write_blocking(&mut self, data: &[u8]) -> Result<(), ()> {
            self.sent.extend_from_slice(data);
            Ok(())
        }

        fn flush(&mut self) -> Result<(), ()> {
            Ok(())
        }
    }

    impl UartRx for MockUart {
        type Error = ();

        fn read_blocking(&mut self, buf: &mut [u8]) -> Result<usize, ()> {
            let mut n = 0;
            while n < buf.len() {
                match self.incoming.pop_front() {
                    Some(b) => {
                        buf[n] = b;
                        n += 1;
                    }
                    None => break,
                }
            }
            Ok(n)
        }
    }

    fn serial(dialect: SerialDialect) -> Lis2Serial<MockUart> {
        Lis2Serial::new(MockUart::default(), dialect, 8, false)
    }

    #[test]
    fn test_position() {
        let mut lcd = serial(SerialDialect::Lis2);
        lcd.send(RegisterSelect::Instruction, POSITION | 0x45).unwrap();
        assert_eq!(lcd.port.sent, [0x00, 0xA2, 0x05, 0xA7]);

        let mut ext = Lis2Serial::new(MockUart::default(), SerialDialect::Lis2, 8, true);
        ext.send(RegisterSelect::Instruction, POSITION | 0x65).unwrap();
        assert_eq!(ext.port.sent, [0x00, 0xA4, 0x05, 0xA7]);
    }

    #[test]
    fn test_low_codes_avoid_prefix() {
        let mut lis2 = serial(SerialDialect::Lis2);
        for b in [0, 6, 7, b'A'] {
            lis2.send(RegisterSelect::Data, b).unwrap();
        }
        assert_eq!(lis2.port.sent, [1, 7, 7, b'A']);

        let mut mplay = serial(SerialDialect::MPlay);
        for b in [0, 7, 8] {
            mplay.send(RegisterSelect::Data, b).unwrap();
        }
        assert_eq!(mplay.port.sent, [8, 15, 8]);
    }

    #[test]
    fn test_lis2_glyph_rows() {
        let mut lcd = serial(SerialDialect::Lis2);
        lcd.send(RegisterSelect::Instruction, SETCHAR | (2 << 3)).unwrap();
        lcd.send(RegisterSelect::Data, 0x1F).unwrap();
        assert_eq!(lcd.port.sent, [0x00, 0xAB, 3, 0, 0x1F]);
    }

    #[test]
    fn test_lis2_glyph_index_clamped() {
        let mut lcd = serial(SerialDialect::Lis2);
        lcd.send(RegisterSelect::Instruction, SETCHAR | (7 << 3)).unwrap();
        lcd.send(RegisterSelect::Data, 0x01).unwrap();
        assert_eq!(lcd.port.sent[2], 7);
    }

    #[test]
    fn test_upload_ends_after_cell_height() {
        let mut lcd = serial(SerialDialect::Lis2);
        lcd.send(RegisterSelect::Instruction, SETCHAR).unwrap();
        for row in 0..8 {
            lcd.send(RegisterSelect::Data, row).unwrap();
        }
        lcd.port.sent.clear();
        lcd.send(RegisterSelect::Data, b'x').unwrap();
        assert_eq!(lcd.port.sent, [b'x']);
    }

    #[test]
    fn test_mplay_uploads_all_glyphs() {
        let mut lcd = serial(SerialDialect::MPlay);
        lcd.send(RegisterSelect::Instruction, SETCHAR | (1 << 3)).unwrap();
        for row in 0..7 {
            lcd.send(RegisterSelect::Data, row).unwrap();
        }
        assert!(lcd.port.sent.is_empty());
        lcd.send(RegisterSelect::Data, 0x1F).unwrap();
        assert_eq!(lcd.port.sent.len(), 2 + 64);
        assert_eq!(&lcd.port.sent[..2], &[0x00, 0xAD]);
        assert_eq!(&lcd.port.sent[10..18], &[0, 1, 2, 3, 4, 5, 6, 0x1F]);
    }

    #[test]
    fn test_other_instructions_raw() {
        let mut lcd = serial(SerialDialect::Lis2);
        lcd.send(RegisterSelect::Instruction, 0x01).unwrap();
        assert_eq!(lcd.port.sent, [0x01]);
    }

    #[test]
    fn test_mplay_temperatures() {
        let mut lcd = serial(SerialDialect::MPlay);
        lcd.port.incoming.extend([150, 175, 140]);
        let temps = lcd.read_temperatures(3).unwrap();
        assert_eq!(temps.as_slice(), &[0, 25, -10]);
        assert_eq!(lcd.port.sent, [0x00, 0xAF]);

        assert_eq!(lcd.read_temperatures(2), Err(TransportError::Read));
        assert_eq!(
            serial(SerialDialect::Lis2).read_temperatures(1),
            Err(TransportError::Unsupported)
        );
    }

    #[test]
    fn test_fans() {
        let mut mplay = serial(SerialDialect::MPlay);
        mplay.set_fans(&[10, 20]).unwrap();
        mplay.set_fans(&[30]).unwrap();
        assert_eq!(
            mplay.port.sent,
            [0x00, 0xA4, 0x7D, 0x00, 0xAC, 10, 20, 0x00, 0xAC, 30]
        );

        let mut lis2 = serial(SerialDialect::Lis2);
        lis2.set_fans(&[1, 2, 3, 4]).unwrap();
        assert_eq!(
            lis2.port.sent,
            [0x00, 0xAE, 0, 0, 1, 0, 2, 0, 3, 0, 4, 0, 0]
        );
        assert_eq!(lis2.set_fans(&[1]), Err(TransportError::Unsupported));
    }

    #[test]
    fn test_baudrate() {
        assert_eq!(SerialDialect::Lis2.baudrate(Some(9600)), 19200);
        assert_eq!(SerialDialect::MPlay.baudrate(None), 38400);
        assert_eq!(SerialDialect::MPlay.baudrate(Some(9600)), 9600);
    }
}
