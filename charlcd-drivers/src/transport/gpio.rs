//! 4-bit HD44780 bus on individual GPIO lines
//!
//! EN, RS and D4..D7 are required. RW is optional and held low (write
//! only). BL is optional; without it backlight requests are ignored.
//!
//! Sysfs writes are slow, so a line is only written when its level
//! actually changes. Pauses are never skipped.

use charlcd_core::{InitError, TransportError};
use charlcd_hal::{DelayNs, OutputPin};

use crate::hd44780::{strobe_byte, strobe_nibble, BusWidth, NibbleBus, RegisterSelect, Transport};

/// Pause around each enable edge
pub const PULSE_US: u32 = 50;

/// The lines wired to the display
pub struct GpioPins<P> {
    pub en: P,
    pub rs: P,
    pub d4: P,
    pub d5: P,
    pub d6: P,
    pub d7: P,
    pub rw: Option<P>,
    pub bl: Option<P>,
}

/// Output line with write suppression
struct Line<P> {
    pin: P,
    last: Option<bool>,
}

impl<P: OutputPin> Line<P> {
    fn new(pin: P) -> Self {
        Self { pin, last: None }
    }

    fn set(&mut self, high: bool) -> Result<(), TransportError> {
        if self.last == Some(high) {
            return Ok(());
        }
        self.pin
            .set_state(high)
            .map_err(|_| TransportError::Write)?;
        self.last = Some(high);
        Ok(())
    }
}

struct Lines<P> {
    en: Line<P>,
    rs: Line<P>,
    data: [Line<P>; 4],
    bl: Option<Line<P>>,
    // Only ever driven low
    _rw: Option<Line<P>>,
}

impl<P: OutputPin> NibbleBus for Lines<P> {
    fn present(
        &mut self,
        rs: RegisterSelect,
        nibble: u8,
        enable: bool,
    ) -> Result<(), TransportError> {
        self.rs.set(rs.is_data())?;
        for (bit, line) in self.data.iter_mut().enumerate() {
            line.set(nibble & (1 << bit) != 0)?;
        }
        self.en.set(enable)
    }
}

/// HD44780 on GPIO lines
pub struct Gpio4Bit<P, D> {
    lines: Lines<P>,
    delay: D,
    pulse_us: u32,
}

impl<P: OutputPin, D: DelayNs> Gpio4Bit<P, D> {
    pub fn new(pins: GpioPins<P>, delay: D) -> Result<Self, InitError> {
        let GpioPins {
            en,
            rs,
            d4,
            d5,
            d6,
            d7,
            rw,
            bl,
        } = pins;

        let mut rw = rw.map(Line::new);
        if let Some(line) = rw.as_mut() {
            line.set(false)?;
        }
        if bl.is_none() {
            log::warn!("hd44780: gpio: no BL line, backlight control disabled");
        }
        let mut en = Line::new(en);
        en.set(false)?;

        Ok(Self {
            lines: Lines {
                en,
                rs: Line::new(rs),
                data: [Line::new(d4), Line::new(d5), Line::new(d6), Line::new(d7)],
                bl: bl.map(Line::new),
                _rw: rw,
            },
            delay,
            pulse_us: PULSE_US,
        })
    }
}

impl<P: OutputPin, D: DelayNs> Transport for Gpio4Bit<P, D> {
    fn bus_width(&self) -> BusWidth {
        BusWidth::Four
    }

    fn send(&mut self, rs: RegisterSelect, byte: u8) -> Result<(), TransportError> {
        strobe_byte(&mut self.lines, &mut self.delay, rs, byte, self.pulse_us)
    }

    fn send_nibble(&mut self, nibble: u8) -> Result<(), TransportError> {
        strobe_nibble(
            &mut self.lines,
            &mut self.delay,
            RegisterSelect::Instruction,
            nibble,
            self.pulse_us,
        )
    }

    fn set_backlight(&mut self, on: bool) -> Result<(), TransportError> {
        match self.lines.bl.as_mut() {
            Some(line) => line.set(on),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{self, Event, Log, MockDelay};

    struct MockPin {
        name: &'static str,
        log: Log,
    }

    impl OutputPin for MockPin {
        type Error = ();

        fn set_state(&mut self, high: bool) -> Result<(), ()> {
            self.log.borrow_mut().push(Event::Pin(self.name, high));
            Ok(())
        }
    }

    fn pins(log: &Log, with_bl: bool) -> GpioPins<MockPin> {
        let pin = |name| MockPin {
            name,
            log: log.clone(),
        };
        GpioPins {
            en: pin("en"),
            rs: pin("rs"),
            d4: pin("d4"),
            d5: pin("d5"),
            d6: pin("d6"),
            d7: pin("d7"),
            rw: Some(pin("rw")),
            bl: with_bl.then(|| pin("bl")),
        }
    }

    fn transport(log: &Log) -> Gpio4Bit<MockPin, MockDelay> {
        let bus = Gpio4Bit::new(pins(log, true), MockDelay(log.clone())).unwrap();
        mock::take(log);
        bus
    }

    /// Enable edges and pauses only
    fn strobes(events: &[Event]) -> Vec<Event> {
        events
            .iter()
            .filter(|e| matches!(e, Event::Pin("en", _) | Event::Pause(_)))
            .cloned()
            .collect()
    }

    #[test]
    fn test_rw_held_low_at_start() {
        let log = mock::log();
        let _bus = Gpio4Bit::new(pins(&log, true), MockDelay(log.clone())).unwrap();
        let events = mock::take(&log);
        assert_eq!(events[0], Event::Pin("rw", false));
        assert_eq!(events[1], Event::Pin("en", false));
    }

    #[test]
    fn test_two_strobes_per_byte() {
        for byte in [0x00, 0xFF, 0xA5] {
            let log = mock::log();
            let mut bus = transport(&log);
            bus.send(RegisterSelect::Data, byte).unwrap();
            let events = strobes(&mock::take(&log));
            let strobe = [
                Event::Pause(PULSE_US),
                Event::Pin("en", true),
                Event::Pause(PULSE_US),
                Event::Pin("en", false),
                Event::Pause(PULSE_US),
            ];
            assert_eq!(&events[..5], &strobe, "byte {:#04x}", byte);
            assert_eq!(&events[5..], &strobe, "byte {:#04x}", byte);
        }
    }

    #[test]
    fn test_unchanged_lines_not_rewritten() {
        let log = mock::log();
        let mut bus = transport(&log);
        bus.send(RegisterSelect::Data, 0x00).unwrap();
        mock::take(&log);
        bus.send(RegisterSelect::Data, 0x00).unwrap();
        // Only the enable line toggles
        let pins: Vec<Event> = mock::take(&log)
            .into_iter()
            .filter(|e| matches!(e, Event::Pin(..)))
            .collect();
        assert_eq!(
            pins,
            [
                Event::Pin("en", true),
                Event::Pin("en", false),
                Event::Pin("en", true),
                Event::Pin("en", false),
            ]
        );
    }

    #[test]
    fn test_high_nibble_first() {
        let log = mock::log();
        let mut bus = transport(&log);
        bus.send(RegisterSelect::Data, 0x81).unwrap();
        let events = mock::take(&log);
        let first_en = events
            .iter()
            .position(|e| *e == Event::Pin("en", true))
            .unwrap();
        // d7 set before the first strobe, d4 not
        assert!(events[..first_en].contains(&Event::Pin("d7", true)));
        assert!(events[..first_en].contains(&Event::Pin("d4", false)));
        assert!(events[first_en..].contains(&Event::Pin("d4", true)));
    }

    #[test]
    fn test_missing_backlight_is_ignored() {
        let log = mock::log();
        let mut bus = Gpio4Bit::new(pins(&log, false), MockDelay(log.clone())).unwrap();
        mock::take(&log);
        assert!(bus.set_backlight(true).is_ok());
        assert!(mock::take(&log).is_empty());
    }
}
