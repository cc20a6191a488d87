//! POS customer display driver
//!
//! Owns the serial port, the display state and one command buffer sized
//! once from the backend's bound. Drawing only touches the frame buffer;
//! `flush` encodes and writes in one go.

use alloc::vec;
use alloc::vec::Vec;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use charlcd_core::glyph::{BarGlyphs, MAX_CUSTOM_CHARS};
use charlcd_core::{bar, CellSize, CharDisplay, CursorStyle, DisplayError, FailureReporter};
use charlcd_core::{Geometry, InitError, Key, KeyMask, TransportError};
use charlcd_hal::{UartRx, UartTx};

use crate::error::ProtocolError;
use crate::pos::{Emulation, PosProtocol, PosState};

/// Serial POS display settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PosConfig {
    pub geometry: Geometry,
    pub emulation: Emulation,
    /// Glyph slots to use for bar graphs, 0..=32
    pub custom_chars: usize,
}

impl Default for PosConfig {
    fn default() -> Self {
        Self {
            geometry: Geometry::new(16, 2, CellSize::default()),
            emulation: Emulation::Aedex,
            custom_chars: 0,
        }
    }
}

/// Bar glyph codes resolved once per draw
struct BarCodes {
    glyphs: BarGlyphs,
    codes: heapless::Vec<u8, MAX_CUSTOM_CHARS>,
}

impl BarCodes {
    fn code(&self, slot: Option<usize>) -> Option<u8> {
        slot.and_then(|i| self.codes.get(i).copied())
    }
}

pub struct PosDisplay<U> {
    port: U,
    protocol: Emulation,
    state: PosState,
    buf: Vec<u8>,
    reporter: FailureReporter,
    closed: bool,
}

impl<U: UartTx + UartRx> PosDisplay<U> {
    /// Encode and send the init sequence
    pub fn new(mut port: U, config: PosConfig) -> Result<Self, InitError> {
        let protocol = config.emulation;
        let mut state = PosState::new(config.geometry, config.custom_chars)?;
        let mut buf = vec![0u8; protocol.required_buffer_size(&state)];

        let len = protocol.init(&mut state, &mut buf).map_err(|err| match err {
            ProtocolError::Init(e) => e,
            ProtocolError::Capacity(e) => {
                log::error!("{}: init: {}", protocol.name(), e);
                InitError::InvalidSetting
            }
        })?;
        port.write_blocking(&buf[..len])
            .map_err(|_| InitError::Transport(TransportError::Write))?;

        log::info!(
            "{}: {}x{} display, {} custom chars",
            protocol.name(),
            state.width(),
            state.height(),
            state.custom_chars
        );
        Ok(Self {
            port,
            protocol,
            state,
            buf,
            reporter: FailureReporter::new("serial pos"),
            closed: false,
        })
    }

    pub fn emulation(&self) -> Emulation {
        self.protocol
    }

    pub fn state(&self) -> &PosState {
        &self.state
    }

    pub fn port(&self) -> &U {
        &self.port
    }

    pub fn port_mut(&mut self) -> &mut U {
        &mut self.port
    }

    /// Character code of custom glyph `index`
    pub fn custom_char_code(&self, index: usize) -> Result<u8, DisplayError> {
        Ok(self.protocol.custom_char_code(&self.state, index)?)
    }

    fn bar_codes(&self) -> BarCodes {
        let glyphs = self.state.glyphs;
        let codes = (0..glyphs.reserved())
            .map_while(|i| self.protocol.custom_char_code(&self.state, i).ok())
            .collect();
        BarCodes { glyphs, codes }
    }
}

impl<U: UartTx + UartRx> CharDisplay for PosDisplay<U> {
    fn width(&self) -> usize {
        self.state.width()
    }

    fn height(&self) -> usize {
        self.state.height()
    }

    fn cell_size(&self) -> CellSize {
        self.state.cell
    }

    fn write(&mut self, x: i32, y: i32, text: &[u8]) {
        self.state.frame.write(x, y, text);
    }

    fn clear(&mut self) {
        self.state.frame.clear();
    }

    fn set_backlight(&mut self, on: bool) {
        self.state.misc.desired.backlight = on;
    }

    /// No contrast control on POS displays
    fn set_contrast(&mut self, _promille: u16) {}

    fn set_brightness(&mut self, promille: u16) {
        self.state.misc.desired.brightness = promille.min(1000);
    }

    fn set_cursor(&mut self, x: u8, y: u8, style: CursorStyle) {
        let desired = &mut self.state.misc.desired;
        desired.cursor_x = x;
        desired.cursor_y = y;
        desired.cursor = style;
    }

    fn hbar(&mut self, x: i32, y: i32, len: usize, promille: u16) {
        let cell = self.state.cell;
        if !self.state.glyphs.has_hbar() {
            bar::ascii_hbar(&mut self.state.frame, x, y, len, promille, cell.width);
            return;
        }
        let codes = self.bar_codes();
        bar::hbar(&mut self.state.frame, x, y, len, promille, cell.width, |pixels| {
            codes.code(codes.glyphs.hbar_index(pixels)).unwrap_or(b' ')
        });
    }

    fn vbar(&mut self, x: i32, y: i32, len: usize, promille: u16) {
        let cell = self.state.cell;
        if !self.state.glyphs.has_vbar() {
            bar::ascii_vbar(&mut self.state.frame, x, y, len, promille, cell.height);
            return;
        }
        let codes = self.bar_codes();
        bar::vbar(&mut self.state.frame, x, y, len, promille, cell.height, |pixels| {
            if pixels >= cell.height {
                // A full-width horizontal glyph is a solid cell
                codes
                    .code(codes.glyphs.hbar_index(cell.width))
                    .unwrap_or(b'%')
            } else {
                codes.code(codes.glyphs.vbar_index(pixels)).unwrap_or(b' ')
            }
        });
    }

    fn flush(&mut self) -> Result<(), DisplayError> {
        if self.closed {
            return Ok(());
        }
        // Encoding commits rows and device state; undone if the bytes never go out
        let pending = self.state.frame.pending();
        let confirmed = self.state.misc.confirmed;
        let sent = match self.protocol.flush(&mut self.state, &mut self.buf) {
            Ok(0) => true,
            Ok(len) => {
                let result = self
                    .port
                    .write_blocking(&self.buf[..len])
                    .map_err(|_| TransportError::Write);
                self.reporter.check("write", result).is_some()
            }
            Err(err) => {
                self.state.frame.invalidate_rows(pending);
                self.state.misc.confirmed = confirmed;
                return Err(err.into());
            }
        };
        if !sent {
            self.state.frame.invalidate_rows(pending);
            self.state.misc.confirmed = confirmed;
        }
        match self.reporter.take_failures() {
            0 => Ok(()),
            failures => Err(DisplayError::Transport { failures }),
        }
    }

    fn scan_keys(&mut self) -> Option<KeyMask> {
        if self.closed {
            return None;
        }
        let result = self.port.read_byte().map_err(|_| TransportError::Read);
        let byte = self.reporter.check("read key", result).flatten()?;
        match Key::from_pos_byte(byte) {
            Some(key) => Some(key.mask()),
            None => {
                log::debug!("{}: ignoring key byte {:#04x}", self.protocol.name(), byte);
                None
            }
        }
    }

    fn close(&mut self) {
        if !self.closed {
            let result = self.port.flush().map_err(|_| TransportError::Write);
            self.reporter.check("drain", result);
            self.closed = true;
        }
    }
}
