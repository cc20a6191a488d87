//! Shared test doubles: everything records into one ordered event log so
//! bus writes and pauses can be checked together.

use std::cell::RefCell;
use std::rc::Rc;
use std::vec::Vec;

use charlcd_core::{KeyMask, TransportError};
use charlcd_hal::DelayNs;

use crate::hd44780::{BusWidth, RegisterSelect, Transport};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Pause(u32),
    Pin(&'static str, bool),
    I2cWrite(u8, Vec<u8>),
    Spi(Vec<u8>),
    Uart(Vec<u8>),
    Data(u8),
    Control(u8),
    Send(RegisterSelect, u8),
    Nibble(u8),
    Backlight(bool),
    Contrast(u8),
}

pub type Log = Rc<RefCell<Vec<Event>>>;

pub fn log() -> Log {
    Rc::new(RefCell::new(Vec::new()))
}

pub fn take(log: &Log) -> Vec<Event> {
    core::mem::take(&mut *log.borrow_mut())
}

pub struct MockDelay(pub Log);

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.0.borrow_mut().push(Event::Pause(ns / 1000));
    }

    fn delay_us(&mut self, us: u32) {
        self.0.borrow_mut().push(Event::Pause(us));
    }

    fn delay_ms(&mut self, ms: u32) {
        self.0.borrow_mut().push(Event::Pause(ms * 1000));
    }
}

/// Transport that records what the protocol core asks for
pub struct MockTransport {
    pub log: Log,
    pub width: BusWidth,
    pub keys: Option<KeyMask>,
    pub fail: bool,
}

impl MockTransport {
    pub fn new(log: &Log, width: BusWidth) -> Self {
        Self {
            log: log.clone(),
            width,
            keys: None,
            fail: false,
        }
    }
}

impl Transport for MockTransport {
    fn bus_width(&self) -> BusWidth {
        self.width
    }

    fn send(&mut self, rs: RegisterSelect, byte: u8) -> Result<(), TransportError> {
        if self.fail {
            return Err(TransportError::Write);
        }
        self.log.borrow_mut().push(Event::Send(rs, byte));
        Ok(())
    }

    fn send_nibble(&mut self, nibble: u8) -> Result<(), TransportError> {
        self.log.borrow_mut().push(Event::Nibble(nibble));
        Ok(())
    }

    fn set_backlight(&mut self, on: bool) -> Result<(), TransportError> {
        self.log.borrow_mut().push(Event::Backlight(on));
        Ok(())
    }

    fn set_contrast(&mut self, value: u8) -> Result<(), TransportError> {
        self.log.borrow_mut().push(Event::Contrast(value));
        Ok(())
    }

    fn scan_keys(&mut self) -> Result<Option<KeyMask>, TransportError> {
        Ok(self.keys)
    }
}

/// Only the bytes sent to the controller, pauses dropped
pub fn sends(events: &[Event]) -> Vec<(RegisterSelect, u8)> {
    events
        .iter()
        .filter_map(|e| match e {
            Event::Send(rs, b) => Some((*rs, *b)),
            _ => None,
        })
        .collect()
}
