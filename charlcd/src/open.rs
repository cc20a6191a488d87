//! Turn a [`Config`] into a running display

use charlcd_core::{CharDisplay, InitError};
use charlcd_drivers::transport::{
    Dialect, Gpio4Bit, GpioPins, I2cExpander, I2cExpanderConfig, Lis2Serial, Parallel8Bit,
    PiPlate, SpiKs0073,
};
use charlcd_drivers::{Hd44780, Hd44780Config, Model, Transport};
use charlcd_hal::spi::SpiConfig;
use charlcd_hal_linux::{
    Delay, DevPort, FileSwitch, I2cDevice, SerialUart, SpiDevice, SysfsLine,
};
use charlcd_protocol::{PosConfig, PosDisplay};

use crate::config::{Config, Connection, GpioLines, Hd44780Settings, PosSettings};
use crate::error::OpenError;

pub type BoxedDisplay = Box<dyn CharDisplay + Send>;

/// Open the configured device and run its init sequence
pub fn open(config: &Config) -> Result<BoxedDisplay, OpenError> {
    match config {
        Config::Hd44780(settings) => open_hd44780(settings),
        Config::Pos(settings) => open_pos(settings),
    }
}

fn open_pos(settings: &PosSettings) -> Result<BoxedDisplay, OpenError> {
    let config = PosConfig {
        geometry: settings.geometry()?,
        emulation: settings.emulation,
        custom_chars: settings.custom_chars,
    };
    let port = SerialUart::open(&settings.device, settings.speed)?;
    let display = PosDisplay::new(port, config).inspect_err(|e| {
        log::error!("pos: {}: {}", settings.device, e);
    })?;
    Ok(Box::new(display))
}

fn open_hd44780(settings: &Hd44780Settings) -> Result<BoxedDisplay, OpenError> {
    let config = Hd44780Config {
        geometry: settings.geometry()?,
        model: settings.model,
        line_address: settings.line_address,
        backlight: settings.backlight,
        keypad: settings.keypad,
        lastline: settings.lastline,
        delay_multiplier: settings.delay_multiplier,
    };
    let connection = settings.connection;
    log::info!("hd44780: using {} connection", connection.name());

    match connection {
        Connection::Parallel => {
            let port = DevPort::open(settings.port)?.with_lock_path(&settings.lock_file);
            let transport = Parallel8Bit::new(port, Delay, settings.keypad)?;
            start(transport, config)
        }
        Connection::Gpio => {
            let pins = export_pins(&settings.pins)?;
            start(Gpio4Bit::new(pins, Delay)?, config)
        }
        Connection::I2c => {
            let bus = I2cDevice::open(settings.device()?)?;
            let (dialect, address) = Dialect::from_legacy_address(settings.address());
            log::info!("hd44780: i2c: {:?} at {:#04x}", dialect, address);
            let expander = I2cExpanderConfig {
                address,
                dialect,
                lines: settings.lines,
                backlight_active_high: settings.backlight_active_high,
            };
            start(I2cExpander::new(bus, Delay, expander)?, config)
        }
        Connection::Piplate => {
            let bus = I2cDevice::open(settings.device()?)?;
            let address = u8::try_from(settings.address()).map_err(|_| {
                log::error!("hd44780: piplate: address {:#x} out of range", settings.address());
                InitError::InvalidSetting
            })?;
            start(PiPlate::new(bus, Delay, address)?, config)
        }
        Connection::Spi => {
            let spi_config = SpiConfig {
                frequency: settings.speed.unwrap_or(SpiConfig::default().frequency),
                ..SpiConfig::default()
            };
            let spi = SpiDevice::open(settings.device()?, &spi_config)?;
            let switch = settings
                .backlight_switch
                .as_ref()
                .map(FileSwitch::open)
                .transpose()?;
            start(SpiKs0073::new(spi, switch)?, config)
        }
        Connection::Lis2 | Connection::Mplay => {
            let Some(dialect) = connection.serial_dialect() else {
                return Err(InitError::InvalidSetting.into());
            };
            let port = SerialUart::open(settings.device()?, dialect.baudrate(settings.speed))?;
            let extended = settings.model == Model::Extended;
            let transport = Lis2Serial::new(port, dialect, settings.cell.height, extended);
            start(transport, config)
        }
    }
}

fn start<T>(transport: T, config: Hd44780Config) -> Result<BoxedDisplay, OpenError>
where
    T: Transport + Send + 'static,
{
    let display = Hd44780::new(transport, Delay, config).inspect_err(|e| {
        log::error!("hd44780: {}", e);
    })?;
    Ok(Box::new(display))
}

/// Check the line map before exporting anything
fn pin_numbers(lines: &GpioLines) -> Result<GpioPins<u64>, InitError> {
    let required = |line: Option<u64>, name: &str| {
        line.ok_or_else(|| {
            log::error!("hd44780: gpio: no line configured for {}", name);
            InitError::InvalidPinMapping
        })
    };
    let pins = GpioPins {
        en: required(lines.en, "EN")?,
        rs: required(lines.rs, "RS")?,
        d4: required(lines.d4, "D4")?,
        d5: required(lines.d5, "D5")?,
        d6: required(lines.d6, "D6")?,
        d7: required(lines.d7, "D7")?,
        rw: lines.rw,
        bl: lines.bl,
    };

    let mut used: Vec<u64> = [pins.en, pins.rs, pins.d4, pins.d5, pins.d6, pins.d7]
        .into_iter()
        .chain(pins.rw)
        .chain(pins.bl)
        .collect();
    let count = used.len();
    used.sort_unstable();
    used.dedup();
    if used.len() != count {
        log::error!("hd44780: gpio: a line is mapped to two signals");
        return Err(InitError::InvalidPinMapping);
    }
    Ok(pins)
}

fn export_pins(lines: &GpioLines) -> Result<GpioPins<SysfsLine>, OpenError> {
    let pins = pin_numbers(lines)?;
    Ok(GpioPins {
        en: SysfsLine::output(pins.en)?,
        rs: SysfsLine::output(pins.rs)?,
        d4: SysfsLine::output(pins.d4)?,
        d5: SysfsLine::output(pins.d5)?,
        d6: SysfsLine::output(pins.d6)?,
        d7: SysfsLine::output(pins.d7)?,
        rw: pins.rw.map(SysfsLine::output).transpose()?,
        bl: pins.bl.map(SysfsLine::output).transpose()?,
    })
}
