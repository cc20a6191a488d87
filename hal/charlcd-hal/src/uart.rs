//! UART abstractions
//!
//! Blocking writes, timed reads. Reads are expected to time out quickly so
//! that key polling never stalls a refresh. Frames are always 8N1.

/// UART transmitter
pub trait UartTx {
    /// Error type for transmit operations
    type Error;

    /// Write all of `data`, blocking until done or failed
    fn write_blocking(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Wait until buffered output has left the port
    fn flush(&mut self) -> Result<(), Self::Error>;
}

/// UART receiver
pub trait UartRx {
    /// Error type for receive operations
    type Error;

    /// Read into `buf`
    ///
    /// Returns the number of bytes read; `Ok(0)` when nothing arrived before
    /// the implementation's read timeout.
    fn read_blocking(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;

    /// Read a single byte, `None` on timeout
    fn read_byte(&mut self) -> Result<Option<u8>, Self::Error> {
        let mut buf = [0u8; 1];
        match self.read_blocking(&mut buf)? {
            0 => Ok(None),
            _ => Ok(Some(buf[0])),
        }
    }
}

/// Bit rates accepted by [`UartConfig::new`]
pub const SUPPORTED_BAUDRATES: &[u32] = &[
    50, 75, 110, 134, 150, 200, 300, 600, 1200, 1800, 2400, 4800, 9600, 19200, 38400, 57600,
    115200, 230400,
];

/// Requested bit rate is not in [`SUPPORTED_BAUDRATES`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UnsupportedBaudrate(pub u32);

/// Validated port settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UartConfig {
    /// Baud rate in bits per second
    pub baudrate: u32,
}

impl UartConfig {
    /// Reject rates the line discipline cannot express
    pub fn new(baudrate: u32) -> Result<Self, UnsupportedBaudrate> {
        if !SUPPORTED_BAUDRATES.contains(&baudrate) {
            return Err(UnsupportedBaudrate(baudrate));
        }
        Ok(Self { baudrate })
    }
}
