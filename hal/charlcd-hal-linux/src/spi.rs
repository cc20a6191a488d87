//! spidev adapter

use std::path::Path;

use charlcd_hal::spi::{Mode, SpiConfig};
use charlcd_hal::SpiBus;
use embedded_hal::spi::{Error as _, SpiDevice as _};
use linux_embedded_hal::spidev::{SpiModeFlags, SpidevOptions};
use linux_embedded_hal::SpidevDevice;

use crate::error::HalError;

/// An `/dev/spidevB.C` device with its chip select handled by the kernel
pub struct SpiDevice {
    dev: SpidevDevice,
}

fn mode_flags(mode: Mode) -> SpiModeFlags {
    match mode {
        Mode::Mode0 => SpiModeFlags::SPI_MODE_0,
        Mode::Mode1 => SpiModeFlags::SPI_MODE_1,
        Mode::Mode2 => SpiModeFlags::SPI_MODE_2,
        Mode::Mode3 => SpiModeFlags::SPI_MODE_3,
    }
}

impl SpiDevice {
    pub fn open(path: impl AsRef<Path>, config: &SpiConfig) -> Result<Self, HalError> {
        let path = path.as_ref();
        let open_err = |reason: String| HalError::OpenBus {
            path: path.to_path_buf(),
            reason,
        };

        let mut dev = SpidevDevice::open(path).map_err(|e| open_err(format!("{:?}", e)))?;
        let options = SpidevOptions::new()
            .bits_per_word(8)
            .max_speed_hz(config.frequency)
            .lsb_first(config.lsb_first)
            .mode(mode_flags(config.mode))
            .build();
        dev.configure(&options)
            .map_err(|e| open_err(format!("{:?}", e)))?;

        log::info!(
            "spi: opened {} at {} Hz, {:?}",
            path.display(),
            config.frequency,
            config.mode
        );
        Ok(Self { dev })
    }
}

impl SpiBus for SpiDevice {
    type Error = HalError;

    fn write(&mut self, data: &[u8]) -> Result<(), HalError> {
        self.dev.write(data).map_err(|e| HalError::Spi(e.kind()))
    }
}
