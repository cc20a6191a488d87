//! PC parallel port abstraction
//!
//! The port has three registers at consecutive I/O addresses: data (write),
//! status (read) and control (write). Several display drivers may share one
//! port, so every access happens through a scoped guard obtained from
//! [`ParallelPort::acquire`]. Implementations must hold a cross-process
//! exclusive lock for the lifetime of the guard.

/// Control register bits as seen on the connector
pub mod control {
    /// Pin 1, nStrobe
    pub const STRB: u8 = 0x01;
    /// Pin 14, nAutoFeed
    pub const LF: u8 = 0x02;
    /// Pin 16, nInit
    pub const INIT: u8 = 0x04;
    /// Pin 17, nSelectIn
    pub const SEL: u8 = 0x08;
    /// Bits the port hardware inverts on output
    pub const OUTMASK: u8 = 0x0B;
}

/// Status register bits as seen on the connector
pub mod status {
    /// Pin 15, nError
    pub const FAULT: u8 = 0x08;
    /// Pin 13, Select
    pub const SELIN: u8 = 0x10;
    /// Pin 12, PaperEnd
    pub const PAPEREND: u8 = 0x20;
    /// Pin 10, nAck
    pub const ACK: u8 = 0x40;
    /// Pin 11, Busy
    pub const BUSY: u8 = 0x80;
    /// Bits the port hardware inverts on input
    pub const INMASK: u8 = 0x84;
}

/// Register access while the port is held
pub trait PortAccess {
    /// Error type for register access
    type Error;

    /// Write the data register
    fn write_data(&mut self, value: u8) -> Result<(), Self::Error>;

    /// Write the control register (raw, caller applies [`control::OUTMASK`])
    fn write_control(&mut self, value: u8) -> Result<(), Self::Error>;

    /// Read the status register (raw, caller applies [`status::INMASK`])
    fn read_status(&mut self) -> Result<u8, Self::Error>;
}

/// A parallel port that hands out exclusive, scoped access
pub trait ParallelPort {
    /// Error type for locking and register access
    type Error;

    /// Guard type; dropping it releases the lock
    type Access<'a>: PortAccess<Error = Self::Error>
    where
        Self: 'a;

    /// Block until exclusive access is granted
    fn acquire(&mut self) -> Result<Self::Access<'_>, Self::Error>;
}
