//! HD44780 display driver
//!
//! Owns a transport, the diff engine and the CGRAM cache, and turns a
//! flush into position commands, row data and glyph uploads.

use charlcd_core::bar;
use charlcd_core::glyph::{self, CGRAM_ROWS};
use charlcd_core::{
    CellSize, CharDisplay, CursorStyle, DisplayError, FailureReporter, FrameBuffer, InitError,
    KeyMask, LineMask, MiscState,
};
use charlcd_hal::DelayNs;

use super::cmd::{self, pause};
use super::config::{Hd44780Config, Model};
use super::init::{InitPhase, Sequencer};
use super::transport::{RegisterSelect, Transport};

/// Widest supported display
pub const MAX_WIDTH: usize = 80;

/// Tallest supported display on one controller
pub const MAX_HEIGHT: usize = 4;

/// CGRAM slots on the controller
pub const CGRAM_SLOTS: usize = 8;

/// HD44780 ROM full block
const FULL_BLOCK: u8 = 0xFF;

/// What the CGRAM currently holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GlyphMode {
    /// Caller-defined characters (or nothing)
    Standard,
    HBar,
    VBar,
}

#[derive(Debug, Clone, Copy, Default)]
struct CgramSlot {
    rows: [u8; CGRAM_ROWS],
    dirty: bool,
}

/// HD44780 controller on some transport
pub struct Hd44780<T, D> {
    transport: T,
    delay: D,
    config: Hd44780Config,
    frame: FrameBuffer,
    misc: MiscState,
    cgram: [CgramSlot; CGRAM_SLOTS],
    glyph_mode: GlyphMode,
    cursor_sent: Option<CursorStyle>,
    contrast: Option<u8>,
    contrast_sent: Option<u8>,
    reporter: FailureReporter,
    phase: InitPhase,
    closed: bool,
}

impl<T: Transport, D: DelayNs> Hd44780<T, D> {
    /// Run the power-on sequence and return a blank display
    pub fn new(transport: T, delay: D, config: Hd44780Config) -> Result<Self, InitError> {
        config.geometry.check(MAX_WIDTH, MAX_HEIGHT)?;
        if config.delay_multiplier == 0 || config.delay_multiplier > 1000 {
            return Err(InitError::InvalidSetting);
        }
        let frame = FrameBuffer::new(config.geometry.width, config.geometry.height)?;

        let mut display = Self {
            transport,
            delay,
            config,
            frame,
            misc: MiscState::default(),
            cgram: [CgramSlot::default(); CGRAM_SLOTS],
            glyph_mode: GlyphMode::Standard,
            cursor_sent: Some(CursorStyle::Off),
            contrast: None,
            contrast_sent: None,
            reporter: FailureReporter::new("hd44780"),
            phase: InitPhase::PowerOn,
            closed: false,
        };
        display.initialize()?;
        if !display.config.backlight {
            log::info!("hd44780: backlight control disabled");
        }
        Ok(display)
    }

    fn sequencer(&mut self) -> Sequencer<'_, T, D> {
        Sequencer {
            transport: &mut self.transport,
            delay: &mut self.delay,
            multiplier: self.config.delay_multiplier,
        }
    }

    fn initialize(&mut self) -> Result<(), InitError> {
        self.phase = InitPhase::PowerOn;
        let model = self.config.model;

        let interface = self.sequencer().resynchronize().map_err(|err| {
            log::error!("hd44780: interface resync failed: {}", err);
            InitError::from(err)
        })?;
        self.phase = InitPhase::InterfaceSelected;

        self.sequencer().configure(interface, model).map_err(|err| {
            log::error!("hd44780: configuration failed: {}", err);
            InitError::from(err)
        })?;
        self.phase = InitPhase::Configured;
        log::debug!(
            "hd44780: {}x{} initialized ({:?})",
            self.frame.width(),
            self.frame.height(),
            model
        );
        Ok(())
    }

    /// Re-run the init sequence and force every row out on the next flush
    pub fn reinitialize(&mut self) -> Result<(), InitError> {
        self.initialize()?;
        self.frame.invalidate();
        for slot in &mut self.cgram {
            slot.dirty = true;
        }
        self.cursor_sent = Some(CursorStyle::Off);
        self.misc.confirmed = Default::default();
        Ok(())
    }

    pub fn phase(&self) -> InitPhase {
        self.phase
    }

    pub fn glyph_mode(&self) -> GlyphMode {
        self.glyph_mode
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Transport specific extras (fans, temperatures)
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// DDRAM address of 0-based column `x`, row `y`
    pub fn ddram_address(&self, x: usize, y: usize) -> u8 {
        let width = self.frame.width();
        let address = match self.config.model {
            Model::Extended => x + y * usize::from(self.config.line_address),
            Model::Standard => {
                if width == 16 && self.frame.height() == 1 && x >= 8 {
                    // 16x1 modules are wired as 8x2
                    x - 8 + 0x40
                } else {
                    let mut address = x + (y % 2) * 0x40;
                    if y % 4 >= 2 {
                        address += width;
                    }
                    address
                }
            }
        };
        (address & 0x7F) as u8
    }

    /// Define custom character `slot` (0..8) from `cell height` pixel rows
    pub fn set_char(&mut self, slot: usize, rows: &[u8]) {
        let Some(cached) = self.cgram.get_mut(slot) else {
            log::warn!("hd44780: custom char {} out of range", slot);
            return;
        };
        let cell = self.config.geometry.cell;
        let mask = ((1u16 << cell.width.min(8)) - 1) as u8;
        let height = usize::from(cell.height).min(CGRAM_ROWS);

        for row in 0..height {
            let mut value = rows.get(row).copied().unwrap_or(0) & mask;
            if row == height - 1 && !self.config.lastline {
                value = 0;
            }
            if cached.rows[row] != value {
                cached.dirty = true;
            }
            cached.rows[row] = value;
        }
    }

    /// Free CGRAM slots for caller-defined characters
    pub fn free_chars(&self) -> usize {
        match self.glyph_mode {
            GlyphMode::Standard => CGRAM_SLOTS,
            _ => 0,
        }
    }

    /// Write the output latch, where the transport has one
    pub fn output(&mut self, value: u8) {
        let result = self.transport.output(value);
        self.reporter.check("output", result);
    }

    /// Send one byte, pausing afterwards; false if the transport failed
    fn send(&mut self, rs: RegisterSelect, byte: u8, pause_us: u32) -> bool {
        let result = self.transport.send(rs, byte);
        let sent = self.reporter.check("send", result).is_some();
        if sent && pause_us > 0 {
            self.delay
                .delay_us(pause_us.saturating_mul(self.config.delay_multiplier));
        }
        sent
    }

    fn write_row(&mut self, row: usize) {
        let width = self.frame.width();
        let split_16x1 = self.config.model == Model::Standard
            && width == 16
            && self.frame.height() == 1;

        let address = self.ddram_address(0, row);
        let mut sent = self.send(
            RegisterSelect::Instruction,
            cmd::POSITION | address,
            pause::SHORT_US,
        );
        for col in 0..width {
            if split_16x1 && col == 8 {
                let address = self.ddram_address(col, row);
                sent &= self.send(
                    RegisterSelect::Instruction,
                    cmd::POSITION | address,
                    pause::SHORT_US,
                );
            }
            let byte = self.frame.row(row)[col];
            sent &= self.send(RegisterSelect::Data, byte, pause::SHORT_US);
        }
        if !sent {
            let mut retry = LineMask::EMPTY;
            retry.insert(row);
            self.frame.invalidate_rows(retry);
        }
    }

    fn upload_glyphs(&mut self) -> bool {
        let height = usize::from(self.config.geometry.cell.height).min(CGRAM_ROWS);
        let mut uploaded = false;
        for slot in 0..CGRAM_SLOTS {
            if !self.cgram[slot].dirty {
                continue;
            }
            let mut sent = self.send(
                RegisterSelect::Instruction,
                cmd::SETCHAR | ((slot as u8) << 3),
                pause::SHORT_US,
            );
            for row in 0..height {
                let value = self.cgram[slot].rows[row];
                sent &= self.send(RegisterSelect::Data, value, pause::SHORT_US);
            }
            // A partial upload stays dirty and is resent on the next flush
            self.cgram[slot].dirty = !sent;
            uploaded = true;
        }
        uploaded
    }

    fn apply_cursor(&mut self, moved: bool) {
        let style = self.misc.desired.cursor;
        if self.cursor_sent != Some(style) {
            let bits = match style {
                CursorStyle::Off => cmd::CURSOROFF | cmd::CURSORNOBLINK,
                CursorStyle::Underline => cmd::CURSORON | cmd::CURSORNOBLINK,
                CursorStyle::On | CursorStyle::Block => cmd::CURSOROFF | cmd::CURSORBLINK,
            };
            if self.send(
                RegisterSelect::Instruction,
                cmd::ONOFFCTRL | cmd::DISPON | bits,
                pause::SHORT_US,
            ) {
                self.cursor_sent = Some(style);
                self.misc.confirm_cursor_visible(style.is_visible());
            }
        }

        if moved {
            self.misc.confirmed.cursor_position = None;
        }
        if let Some((x, y)) = self.misc.cursor_position_change() {
            let col = usize::from(x.max(1) - 1).min(self.frame.width() - 1);
            let row = usize::from(y.max(1) - 1).min(self.frame.height() - 1);
            let address = self.ddram_address(col, row);
            if self.send(RegisterSelect::Instruction, cmd::POSITION | address, pause::SHORT_US) {
                self.misc.confirm_cursor_position((x, y));
            }
        }
    }

    fn apply_backlight(&mut self) {
        if !self.config.backlight {
            return;
        }
        if let Some(on) = self.misc.backlight_change() {
            let result = self.transport.set_backlight(on);
            if self.reporter.check("backlight", result).is_some() {
                self.misc.confirm_backlight(on);
            }
        }
    }

    fn apply_contrast(&mut self) {
        if let Some(value) = self.contrast {
            if self.contrast_sent != Some(value) {
                let result = self.transport.set_contrast(value);
                if self.reporter.check("contrast", result).is_some() {
                    self.contrast_sent = Some(value);
                }
            }
        }
    }

    fn claim_glyphs(&mut self, mode: GlyphMode) -> bool {
        if self.glyph_mode == mode {
            return true;
        }
        if self.glyph_mode != GlyphMode::Standard {
            log::warn!("hd44780: cannot combine two modes using user-defined characters");
            return false;
        }
        self.glyph_mode = mode;
        let cell = self.config.geometry.cell;
        match mode {
            GlyphMode::HBar => {
                for pixels in 1..=cell.width {
                    self.set_char(usize::from(pixels), &glyph::row_hbar(pixels, cell));
                }
            }
            GlyphMode::VBar => {
                for pixels in 1..cell.height {
                    self.set_char(usize::from(pixels), &glyph::row_vbar(pixels, cell));
                }
            }
            GlyphMode::Standard => {}
        }
        true
    }
}

impl<T: Transport, D: DelayNs> CharDisplay for Hd44780<T, D> {
    fn width(&self) -> usize {
        self.frame.width()
    }

    fn height(&self) -> usize {
        self.frame.height()
    }

    fn cell_size(&self) -> CellSize {
        self.config.geometry.cell
    }

    fn write(&mut self, x: i32, y: i32, text: &[u8]) {
        self.frame.write(x, y, text);
    }

    fn clear(&mut self) {
        self.frame.clear();
        self.glyph_mode = GlyphMode::Standard;
    }

    fn set_backlight(&mut self, on: bool) {
        self.misc.desired.backlight = on;
    }

    fn set_contrast(&mut self, promille: u16) {
        let promille = u32::from(promille.min(1000));
        self.contrast = Some((promille * 255 / 1000) as u8);
    }

    fn set_cursor(&mut self, x: u8, y: u8, style: CursorStyle) {
        self.misc.desired.cursor_x = x;
        self.misc.desired.cursor_y = y;
        self.misc.desired.cursor = style;
    }

    fn hbar(&mut self, x: i32, y: i32, len: usize, promille: u16) {
        if !self.claim_glyphs(GlyphMode::HBar) {
            return;
        }
        let width = self.config.geometry.cell.width;
        bar::hbar(&mut self.frame, x, y, len, promille, width, |pixels| pixels);
    }

    fn vbar(&mut self, x: i32, y: i32, len: usize, promille: u16) {
        if !self.claim_glyphs(GlyphMode::VBar) {
            return;
        }
        let height = self.config.geometry.cell.height;
        bar::vbar(&mut self.frame, x, y, len, promille, height, |pixels| {
            if pixels >= height {
                FULL_BLOCK
            } else {
                pixels
            }
        });
    }

    fn flush(&mut self) -> Result<(), DisplayError> {
        if self.closed {
            return Ok(());
        }
        let changed = self.frame.lines_changed();
        for row in changed.iter() {
            self.write_row(row);
        }
        let uploaded = self.upload_glyphs();
        self.apply_cursor(!changed.is_empty() || uploaded);
        self.apply_backlight();
        self.apply_contrast();

        match self.reporter.take_failures() {
            0 => Ok(()),
            failures => Err(DisplayError::Transport { failures }),
        }
    }

    fn scan_keys(&mut self) -> Option<KeyMask> {
        if !self.config.keypad || self.closed {
            return None;
        }
        let result = self.transport.scan_keys();
        self.reporter
            .check("scan keys", result)
            .flatten()
            .filter(|keys| !keys.is_empty())
    }

    fn close(&mut self) {
        if !self.closed {
            self.transport.close();
            self.closed = true;
        }
    }
}
