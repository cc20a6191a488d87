//! Serial port adapter
//!
//! Reads use a short timeout so key polling never blocks a render loop;
//! a timeout with nothing received reads as zero bytes.

use std::io::{self, Read, Write};
use std::time::Duration;

use charlcd_hal::uart::UartConfig;
use charlcd_hal::{UartRx, UartTx};
use serialport::SerialPort;

use crate::error::HalError;

const READ_TIMEOUT: Duration = Duration::from_millis(10);

pub struct SerialUart {
    port: Box<dyn SerialPort>,
}

impl SerialUart {
    /// Open `path` as 8N1 at `baudrate`
    pub fn open(path: &str, baudrate: u32) -> Result<Self, HalError> {
        let config = UartConfig::new(baudrate).map_err(|e| HalError::Baudrate(e.0))?;
        let port = serialport::new(path, config.baudrate)
            .data_bits(serialport::DataBits::Eight)
            .parity(serialport::Parity::None)
            .stop_bits(serialport::StopBits::One)
            .flow_control(serialport::FlowControl::None)
            .timeout(READ_TIMEOUT)
            .open()?;
        log::info!("serial: opened {} at {} baud", path, config.baudrate);
        Ok(Self { port })
    }
}

impl UartTx for SerialUart {
    type Error = HalError;

    fn write_blocking(&mut self, data: &[u8]) -> Result<(), HalError> {
        self.port.write_all(data)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), HalError> {
        self.port.flush()?;
        Ok(())
    }
}

impl UartRx for SerialUart {
    type Error = HalError;

    fn read_blocking(&mut self, buf: &mut [u8]) -> Result<usize, HalError> {
        match self.port.read(buf) {
            Ok(n) => Ok(n),
            Err(e) if e.kind() == io::ErrorKind::TimedOut => Ok(0),
            Err(e) => Err(e.into()),
        }
    }
}
