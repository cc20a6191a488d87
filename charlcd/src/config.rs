//! Display configuration
//!
//! A config file is one table whose `driver` key selects the settings
//! struct. Every field has a default, so the smallest valid file is just
//! `driver = "pos"`.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use charlcd_core::config::parse_size;
use charlcd_core::{CellSize, Geometry};
use charlcd_drivers::transport::{LineMap, SerialDialect};
use charlcd_drivers::Model;
use charlcd_hal_linux::DEFAULT_LOCK_PATH;
use charlcd_protocol::Emulation;

use crate::error::OpenError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "driver", rename_all = "lowercase")]
pub enum Config {
    Hd44780(Hd44780Settings),
    Pos(PosSettings),
}

impl Config {
    pub fn from_toml_str(text: &str) -> Result<Self, OpenError> {
        Ok(toml::from_str(text)?)
    }
}

/// How an HD44780 is wired to the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Connection {
    /// 8-bit on the PC parallel port
    #[default]
    Parallel,
    /// 4-bit on sysfs GPIO lines
    Gpio,
    /// PCF8574 / PCA9554 expander
    I2c,
    /// MCP23017 keypad board
    Piplate,
    /// KS0073 serial mode
    Spi,
    Lis2,
    Mplay,
}

impl Connection {
    pub fn name(self) -> &'static str {
        match self {
            Connection::Parallel => "parallel",
            Connection::Gpio => "gpio",
            Connection::I2c => "i2c",
            Connection::Piplate => "piplate",
            Connection::Spi => "spi",
            Connection::Lis2 => "lis2",
            Connection::Mplay => "mplay",
        }
    }

    fn default_device(self) -> Option<&'static str> {
        match self {
            Connection::I2c => Some("/dev/i2c-0"),
            Connection::Piplate => Some("/dev/i2c-1"),
            Connection::Spi => Some("/dev/spidev0.0"),
            Connection::Lis2 | Connection::Mplay => Some("/dev/ttyUSB0"),
            Connection::Parallel | Connection::Gpio => None,
        }
    }

    fn default_address(self) -> u16 {
        match self {
            Connection::Piplate => 0x20,
            _ => 0x27,
        }
    }

    pub(crate) fn serial_dialect(self) -> Option<SerialDialect> {
        match self {
            Connection::Lis2 => Some(SerialDialect::Lis2),
            Connection::Mplay => Some(SerialDialect::MPlay),
            _ => None,
        }
    }
}

/// GPIO line numbers for the 4-bit connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GpioLines {
    pub en: Option<u64>,
    pub rs: Option<u64>,
    pub d4: Option<u64>,
    pub d5: Option<u64>,
    pub d6: Option<u64>,
    pub d7: Option<u64>,
    pub rw: Option<u64>,
    pub bl: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Hd44780Settings {
    pub connection: Connection,
    /// Device node; each connection has its own default
    pub device: Option<String>,
    /// I2C address; the 0x80 flag selects the PCA9554 dialect
    pub address: Option<u16>,
    /// Parallel port I/O base
    pub port: u16,
    pub lock_file: PathBuf,
    /// Bit rate: SPI clock in Hz, or MPlay baud rate
    pub speed: Option<u32>,
    pub size: String,
    pub cell: CellSize,
    pub model: Model,
    pub line_address: u8,
    pub backlight: bool,
    pub backlight_active_high: bool,
    /// File taking `1`/`0` that switches the backlight on SPI boards
    pub backlight_switch: Option<PathBuf>,
    pub keypad: bool,
    pub lastline: bool,
    pub delay_multiplier: u32,
    pub pins: GpioLines,
    /// Expander bit of each signal
    pub lines: LineMap,
}

impl Default for Hd44780Settings {
    fn default() -> Self {
        Self {
            connection: Connection::default(),
            device: None,
            address: None,
            port: 0x378,
            lock_file: PathBuf::from(DEFAULT_LOCK_PATH),
            speed: None,
            size: "20x4".into(),
            cell: CellSize::HD44780,
            model: Model::Standard,
            line_address: 0x20,
            backlight: false,
            backlight_active_high: false,
            backlight_switch: None,
            keypad: false,
            lastline: true,
            delay_multiplier: 1,
            pins: GpioLines::default(),
            lines: LineMap::default(),
        }
    }
}

impl Hd44780Settings {
    pub fn geometry(&self) -> Result<Geometry, OpenError> {
        geometry(&self.size, self.cell)
    }

    pub fn device(&self) -> Result<&str, OpenError> {
        self.device
            .as_deref()
            .or(self.connection.default_device())
            .ok_or(OpenError::Missing {
                connection: self.connection.name(),
                field: "device",
            })
    }

    pub fn address(&self) -> u16 {
        self.address
            .unwrap_or(self.connection.default_address())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PosSettings {
    pub device: String,
    pub speed: u32,
    pub size: String,
    pub cell: CellSize,
    pub emulation: Emulation,
    pub custom_chars: usize,
}

impl Default for PosSettings {
    fn default() -> Self {
        Self {
            device: "/dev/lcd".into(),
            speed: 9600,
            size: "16x2".into(),
            cell: CellSize::default(),
            emulation: Emulation::default(),
            custom_chars: 0,
        }
    }
}

impl PosSettings {
    pub fn geometry(&self) -> Result<Geometry, OpenError> {
        geometry(&self.size, self.cell)
    }
}

fn geometry(size: &str, cell: CellSize) -> Result<Geometry, OpenError> {
    let (width, height) = parse_size(size).ok_or_else(|| OpenError::Size(size.into()))?;
    Ok(Geometry::new(width, height, cell))
}

#[cfg(test)]
mod tests {
    use super::*;
    use charlcd_drivers::transport::Dialect;

    #[test]
    fn test_minimal_pos() {
        let config = Config::from_toml_str(r#"driver = "pos""#).unwrap();
        assert_eq!(config, Config::Pos(PosSettings::default()));
    }

    #[test]
    fn test_pos_settings() {
        let config = Config::from_toml_str(
            r#"
            driver = "pos"
            device = "/dev/ttyS1"
            speed = 19200
            size = "20x2"
            emulation = "cd5220"
            custom_chars = 4
            cell = { width = 5, height = 7 }
            "#,
        )
        .unwrap();
        let Config::Pos(pos) = config else {
            panic!("expected pos settings");
        };
        assert_eq!(pos.device, "/dev/ttyS1");
        assert_eq!(pos.speed, 19200);
        assert_eq!(pos.emulation, Emulation::Cd5220);
        assert_eq!(pos.custom_chars, 4);
        assert_eq!(
            pos.geometry().unwrap(),
            Geometry::new(20, 2, CellSize::POS)
        );
    }

    #[test]
    fn test_i2c_settings() {
        let config = Config::from_toml_str(
            r#"
            driver = "hd44780"
            connection = "i2c"
            address = 0xA7
            backlight = true
            size = "16x2"

            [lines]
            rs = 0x01
            rw = 0x02
            en = 0x04
            bl = 0x08
            d4 = 0x10
            d5 = 0x20
            d6 = 0x40
            d7 = 0x80
            "#,
        )
        .unwrap();
        let Config::Hd44780(hd) = config else {
            panic!("expected hd44780 settings");
        };
        assert_eq!(hd.connection, Connection::I2c);
        assert_eq!(hd.device().unwrap(), "/dev/i2c-0");
        assert_eq!(
            Dialect::from_legacy_address(hd.address()),
            (Dialect::Pca9554, 0x27)
        );
        assert_eq!(hd.lines.d7, 0x80);
        assert!(hd.lines.validate().is_ok());
        assert_eq!(hd.geometry().unwrap().width, 16);
    }

    #[test]
    fn test_gpio_pins() {
        let config = Config::from_toml_str(
            r#"
            driver = "hd44780"
            connection = "gpio"
            pins = { en = 22, rs = 27, d4 = 25, d5 = 24, d6 = 23, d7 = 18 }
            "#,
        )
        .unwrap();
        let Config::Hd44780(hd) = config else {
            panic!("expected hd44780 settings");
        };
        assert_eq!(hd.pins.en, Some(22));
        assert_eq!(hd.pins.bl, None);
        assert!(matches!(
            hd.device(),
            Err(OpenError::Missing {
                connection: "gpio",
                field: "device"
            })
        ));
    }

    #[test]
    fn test_connection_defaults() {
        let piplate = Hd44780Settings {
            connection: Connection::Piplate,
            ..Hd44780Settings::default()
        };
        assert_eq!(piplate.address(), 0x20);
        assert_eq!(piplate.device().unwrap(), "/dev/i2c-1");

        let mplay = Hd44780Settings {
            connection: Connection::Mplay,
            ..Hd44780Settings::default()
        };
        assert_eq!(mplay.connection.serial_dialect(), Some(SerialDialect::MPlay));
        assert_eq!(mplay.device().unwrap(), "/dev/ttyUSB0");
    }

    #[test]
    fn test_model_and_timing() {
        let config = Config::from_toml_str(
            r#"
            driver = "hd44780"
            connection = "spi"
            model = "extended"
            delay_multiplier = 4
            backlight_switch = "/sys/class/leds/lcd/brightness"
            "#,
        )
        .unwrap();
        let Config::Hd44780(hd) = config else {
            panic!("expected hd44780 settings");
        };
        assert_eq!(hd.model, Model::Extended);
        assert_eq!(hd.delay_multiplier, 4);
        assert!(hd.backlight_switch.is_some());
    }

    #[test]
    fn test_bad_size() {
        let settings = PosSettings {
            size: "wide".into(),
            ..PosSettings::default()
        };
        assert!(matches!(settings.geometry(), Err(OpenError::Size(_))));
    }

    #[test]
    fn test_unknown_driver() {
        let err = Config::from_toml_str(r#"driver = "vfd""#).unwrap_err();
        assert!(matches!(err, OpenError::Config(_)));
    }
}
