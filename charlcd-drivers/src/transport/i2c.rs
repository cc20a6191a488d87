//! 4-bit HD44780 bus behind an I2C port expander
//!
//! One expander output byte carries RS, RW, EN, the backlight and D4..D7.
//! Which bit drives which signal differs between boards, so the mapping is
//! configurable. Two dialects exist:
//!
//! - PCF8574: the output byte is written as-is
//! - PCA9554: every write is prefixed with the output register, and the
//!   polarity and direction registers are cleared at start-up

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use charlcd_core::{InitError, TransportError};
use charlcd_hal::{DelayNs, I2cBus};

use super::DEFAULT_PULSE_US;
use crate::hd44780::{strobe_byte, strobe_nibble, BusWidth, NibbleBus, RegisterSelect, Transport};

/// PCA9554 registers
mod reg {
    pub const OUTPUT: u8 = 0x01;
    pub const POLARITY: u8 = 0x02;
    pub const CONFIG: u8 = 0x03;
}

/// Expander chip family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Dialect {
    #[default]
    Pcf8574,
    Pca9554,
}

impl Dialect {
    /// Address flag that selects the PCA9554 dialect in legacy configs
    pub const PCA9554_FLAG: u16 = 0x80;

    /// Split a legacy address (7-bit address plus dialect flag)
    pub fn from_legacy_address(address: u16) -> (Dialect, u8) {
        let dialect = if address & Self::PCA9554_FLAG != 0 {
            Dialect::Pca9554
        } else {
            Dialect::Pcf8574
        };
        (dialect, (address & 0x7F) as u8)
    }
}

/// Expander bit for each display signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LineMap {
    pub rs: u8,
    pub rw: u8,
    pub en: u8,
    pub bl: u8,
    pub d4: u8,
    pub d5: u8,
    pub d6: u8,
    pub d7: u8,
}

impl Default for LineMap {
    fn default() -> Self {
        Self {
            rs: 0x10,
            rw: 0x20,
            en: 0x40,
            bl: 0x80,
            d4: 0x01,
            d5: 0x02,
            d6: 0x04,
            d7: 0x08,
        }
    }
}

impl LineMap {
    fn bits(&self) -> [u8; 8] {
        [
            self.rs, self.rw, self.en, self.bl, self.d4, self.d5, self.d6, self.d7,
        ]
    }

    /// Every signal must be exactly one bit, and no two signals may share
    /// a bit
    pub fn validate(&self) -> Result<(), InitError> {
        let mut seen = 0u8;
        for bit in self.bits() {
            if bit.count_ones() != 1 || seen & bit != 0 {
                return Err(InitError::InvalidPinMapping);
            }
            seen |= bit;
        }
        Ok(())
    }

    fn data(&self, nibble: u8) -> u8 {
        let mut out = 0;
        for (i, bit) in [self.d4, self.d5, self.d6, self.d7].into_iter().enumerate() {
            if nibble & (1 << i) != 0 {
                out |= bit;
            }
        }
        out
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct I2cExpanderConfig {
    /// 7-bit bus address
    pub address: u8,
    pub dialect: Dialect,
    pub lines: LineMap,
    /// Backlight bit set means light on
    pub backlight_active_high: bool,
}

impl Default for I2cExpanderConfig {
    fn default() -> Self {
        Self {
            address: 0x27,
            dialect: Dialect::Pcf8574,
            lines: LineMap::default(),
            backlight_active_high: false,
        }
    }
}

struct Port<B> {
    bus: B,
    config: I2cExpanderConfig,
    backlight_bits: u8,
}

impl<B: I2cBus> Port<B> {
    fn write(&mut self, value: u8) -> Result<(), TransportError> {
        let address = self.config.address;
        let result = match self.config.dialect {
            Dialect::Pcf8574 => self.bus.write(address, &[value]),
            Dialect::Pca9554 => self.bus.write(address, &[reg::OUTPUT, value]),
        };
        result.map_err(|_| TransportError::Write)
    }
}

impl<B: I2cBus> NibbleBus for Port<B> {
    fn present(
        &mut self,
        rs: RegisterSelect,
        nibble: u8,
        enable: bool,
    ) -> Result<(), TransportError> {
        let lines = self.config.lines;
        let mut value = lines.data(nibble) | self.backlight_bits;
        if rs.is_data() {
            value |= lines.rs;
        }
        if enable {
            value |= lines.en;
        }
        self.write(value)
    }
}

/// HD44780 behind a PCF8574 or PCA9554
pub struct I2cExpander<B, D> {
    port: Port<B>,
    delay: D,
    pulse_us: u32,
}

impl<B: I2cBus, D: DelayNs> I2cExpander<B, D> {
    pub fn new(bus: B, delay: D, config: I2cExpanderConfig) -> Result<Self, InitError> {
        config.lines.validate()?;
        let mut expander = Self {
            port: Port {
                bus,
                config,
                backlight_bits: 0,
            },
            delay,
            pulse_us: DEFAULT_PULSE_US,
        };
        expander.port.backlight_bits = expander.backlight_bits(true);

        if config.dialect == Dialect::Pca9554 {
            let address = config.address;
            for register in [reg::POLARITY, reg::CONFIG] {
                expander
                    .port
                    .bus
                    .write(address, &[register, 0x00])
                    .map_err(|_| {
                        log::error!("hd44780: i2c: cannot configure PCA9554 at {:#04x}", address);
                        InitError::ChannelOpen
                    })?;
            }
        }
        log::info!(
            "hd44780: i2c: using {:?} at {:#04x}",
            config.dialect,
            config.address
        );
        Ok(expander)
    }

    fn backlight_bits(&self, on: bool) -> u8 {
        let config = &self.port.config;
        if on == config.backlight_active_high {
            config.lines.bl
        } else {
            0
        }
    }
}

impl<B: I2cBus, D: DelayNs> Transport for I2cExpander<B, D> {
    fn bus_width(&self) -> BusWidth {
        BusWidth::Four
    }

    fn send(&mut self, rs: RegisterSelect, byte: u8) -> Result<(), TransportError> {
        strobe_byte(&mut self.port, &mut self.delay, rs, byte, self.pulse_us)
    }

    fn send_nibble(&mut self, nibble: u8) -> Result<(), TransportError> {
        strobe_nibble(
            &mut self.port,
            &mut self.delay,
            RegisterSelect::Instruction,
            nibble,
            self.pulse_us,
        )
    }

    fn set_backlight(&mut self, on: bool) -> Result<(), TransportError> {
        self.port.backlight_bits = self.backlight_bits(on);
        let value = self.port.backlight_bits;
        self.port.write(value)
    }
}
