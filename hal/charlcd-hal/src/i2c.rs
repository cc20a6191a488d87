//! I2C bus abstractions

/// I2C bus master talking to 7-bit addressed port expanders
pub trait I2cBus {
    /// Error type for I2C operations
    type Error;

    /// Write `data` to the device at `address`
    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), Self::Error>;

    /// Write a register number, then read its contents with a repeated start
    fn write_read(
        &mut self,
        address: u8,
        write_data: &[u8],
        read_buf: &mut [u8],
    ) -> Result<(), Self::Error>;
}
