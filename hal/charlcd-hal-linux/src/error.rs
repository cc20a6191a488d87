use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Host device errors
#[derive(Debug, Error)]
pub enum HalError {
    #[error("cannot open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot open {}: {reason}", path.display())]
    OpenBus { path: PathBuf, reason: String },

    #[error("gpio {line}: {source}")]
    Gpio {
        line: u64,
        #[source]
        source: linux_embedded_hal::sysfs_gpio::Error,
    },

    #[error("i2c: {0}")]
    I2c(embedded_hal::i2c::ErrorKind),

    #[error("spi: {0}")]
    Spi(embedded_hal::spi::ErrorKind),

    #[error("serial: {0}")]
    Serial(#[from] serialport::Error),

    #[error("unsupported baud rate {0}")]
    Baudrate(u32),

    #[error("lock {}: {source}", path.display())]
    Lock {
        path: PathBuf,
        #[source]
        source: nix::errno::Errno,
    },

    #[error(transparent)]
    Io(#[from] io::Error),
}
