//! GPIO line abstractions
//!
//! Display transports only drive lines; inputs are read through their bus
//! (status register, expander port). Every write reports failure
//! explicitly since a sysfs write can fail at any time.

/// Digital output line
pub trait OutputPin {
    /// Error type for line writes
    type Error;

    /// Drive the line to a specific level
    fn set_state(&mut self, high: bool) -> Result<(), Self::Error>;

    /// Drive the line high (logic 1)
    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.set_state(true)
    }

    /// Drive the line low (logic 0)
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.set_state(false)
    }
}

impl<T: OutputPin + ?Sized> OutputPin for &mut T {
    type Error = T::Error;

    fn set_state(&mut self, high: bool) -> Result<(), Self::Error> {
        T::set_state(self, high)
    }
}
