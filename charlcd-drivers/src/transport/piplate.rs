//! MCP23017 keypad/backlight board ("piplate")
//!
//! Port A carries five key switches (inputs with pull-ups) and the red and
//! green backlight LEDs. Port B carries the display bus and the blue LED.
//! All three LEDs are active low. The data lines are wired in reverse order
//! one bit up from the bottom of port B.

use charlcd_core::{InitError, KeyMask, TransportError};
use charlcd_hal::{DelayNs, I2cBus};

use super::DEFAULT_PULSE_US;
use crate::hd44780::{strobe_byte, strobe_nibble, BusWidth, NibbleBus, RegisterSelect, Transport};

/// MCP23017 registers (IOCON.BANK = 0)
pub mod reg {
    pub const IODIRA: u8 = 0x00;
    pub const IODIRB: u8 = 0x01;
    pub const GPPUA: u8 = 0x0C;
    pub const GPPUB: u8 = 0x0D;
    pub const GPIOA: u8 = 0x12;
    pub const GPIOB: u8 = 0x13;
}

/// Port A bits
pub mod port_a {
    pub const KEY_SELECT: u8 = 0x01;
    pub const KEY_RIGHT: u8 = 0x02;
    pub const KEY_DOWN: u8 = 0x04;
    pub const KEY_UP: u8 = 0x08;
    pub const KEY_LEFT: u8 = 0x10;
    pub const KEYS: u8 = 0x1F;
    pub const LED_RED: u8 = 0x40;
    pub const LED_GREEN: u8 = 0x80;
}

/// Port B bits
pub mod port_b {
    pub const LED_BLUE: u8 = 0x01;
    pub const D7: u8 = 0x02;
    pub const D6: u8 = 0x04;
    pub const D5: u8 = 0x08;
    pub const D4: u8 = 0x10;
    pub const EN: u8 = 0x20;
    pub const RW: u8 = 0x40;
    pub const RS: u8 = 0x80;
}

/// Default bus address of the board
pub const DEFAULT_ADDRESS: u8 = 0x20;

/// Nibble bit 0..3 onto D4..D7 of port B
fn data_bits(nibble: u8) -> u8 {
    let mut out = 0;
    for (i, bit) in [port_b::D4, port_b::D5, port_b::D6, port_b::D7]
        .into_iter()
        .enumerate()
    {
        if nibble & (1 << i) != 0 {
            out |= bit;
        }
    }
    out
}

struct Chip<B> {
    bus: B,
    address: u8,
    backlight_on: bool,
}

impl<B: I2cBus> Chip<B> {
    fn write_reg(&mut self, register: u8, value: u8) -> Result<(), TransportError> {
        self.bus
            .write(self.address, &[register, value])
            .map_err(|_| TransportError::Write)
    }

    fn read_reg(&mut self, register: u8) -> Result<u8, TransportError> {
        let mut value = [0u8; 1];
        self.bus
            .write_read(self.address, &[register], &mut value)
            .map_err(|_| TransportError::Read)?;
        Ok(value[0])
    }
}

impl<B: I2cBus> NibbleBus for Chip<B> {
    fn present(
        &mut self,
        rs: RegisterSelect,
        nibble: u8,
        enable: bool,
    ) -> Result<(), TransportError> {
        let mut value = data_bits(nibble);
        if rs.is_data() {
            value |= port_b::RS;
        }
        if !self.backlight_on {
            value |= port_b::LED_BLUE;
        }
        if enable {
            value |= port_b::EN;
        }
        self.write_reg(reg::GPIOB, value)
    }
}

/// HD44780 plus keypad on an MCP23017
pub struct PiPlate<B, D> {
    chip: Chip<B>,
    delay: D,
    pulse_us: u32,
}

impl<B: I2cBus, D: DelayNs> PiPlate<B, D> {
    pub fn new(bus: B, delay: D, address: u8) -> Result<Self, InitError> {
        let mut chip = Chip {
            bus,
            address,
            backlight_on: true,
        };
        let setup = [
            // Keys in, LEDs out
            (reg::IODIRA, port_a::KEYS),
            // Display bus and blue LED out
            (reg::IODIRB, 0x00),
            (reg::GPPUA, port_a::KEYS),
            (reg::GPPUB, 0x00),
        ];
        for (register, value) in setup {
            chip.write_reg(register, value).map_err(|_| {
                log::error!("hd44780: piplate: no MCP23017 at {:#04x}", address);
                InitError::ChannelOpen
            })?;
        }
        log::info!("hd44780: piplate: MCP23017 at {:#04x}", address);
        Ok(Self {
            chip,
            delay,
            pulse_us: DEFAULT_PULSE_US,
        })
    }
}

impl<B: I2cBus, D: DelayNs> Transport for PiPlate<B, D> {
    fn bus_width(&self) -> BusWidth {
        BusWidth::Four
    }

    fn send(&mut self, rs: RegisterSelect, byte: u8) -> Result<(), TransportError> {
        strobe_byte(&mut self.chip, &mut self.delay, rs, byte, self.pulse_us)
    }

    fn send_nibble(&mut self, nibble: u8) -> Result<(), TransportError> {
        strobe_nibble(
            &mut self.chip,
            &mut self.delay,
            RegisterSelect::Instruction,
            nibble,
            self.pulse_us,
        )
    }

    /// Read-modify-write of both ports; LEDs light when their bits are clear
    fn set_backlight(&mut self, on: bool) -> Result<(), TransportError> {
        let mut a = self.chip.read_reg(reg::GPIOA)?;
        let mut b = self.chip.read_reg(reg::GPIOB)?;
        if on {
            a &= !(port_a::LED_RED | port_a::LED_GREEN);
            b &= !port_b::LED_BLUE;
        } else {
            a |= port_a::LED_RED | port_a::LED_GREEN;
            b |= port_b::LED_BLUE;
        }
        self.chip.write_reg(reg::GPIOA, a)?;
        self.chip.write_reg(reg::GPIOB, b)?;
        self.chip.backlight_on = on;
        Ok(())
    }

    /// Keys pull their inputs low
    fn scan_keys(&mut self) -> Result<Option<KeyMask>, TransportError> {
        let a = self.chip.read_reg(reg::GPIOA)?;
        Ok(Some(KeyMask::from_bits(!a & port_a::KEYS)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    /// Register file standing in for the chip
    #[derive(Default)]
    struct MockChip {
        regs: HashMap<u8, u8>,
        writes: Vec<(u8, u8)>,
    }

    impl I2cBus for MockChip {
        type Error = ();

        fn write(&mut self, _address: u8, data: &[u8]) -> Result<(), ()> {
            self.regs.insert(data[0], data[1]);
            self.writes.push((data[0], data[1]));
            Ok(())
        }

        fn write_read(&mut self, _address: u8, w: &[u8], r: &mut [u8]) -> Result<(), ()> {
            r[0] = self.regs.get(&w[0]).copied().unwrap_or(0);
            Ok(())
        }
    }

    struct NoDelay;

    impl DelayNs for NoDelay {
        fn delay_ns(&mut self, _ns: u32) {}
    }

    fn plate() -> PiPlate<MockChip, NoDelay> {
        let mut plate = PiPlate::new(MockChip::default(), NoDelay, DEFAULT_ADDRESS).unwrap();
        plate.chip.bus.writes.clear();
        plate
    }

    #[test]
    fn test_setup_registers() {
        let plate = PiPlate::new(MockChip::default(), NoDelay, DEFAULT_ADDRESS).unwrap();
        assert_eq!(
            plate.chip.bus.writes,
            [(0x00, 0x1F), (0x01, 0x00), (0x0C, 0x1F), (0x0D, 0x00)]
        );
    }

    #[test]
    fn test_data_bits_reversed() {
        assert_eq!(data_bits(0x1), 0x10);
        assert_eq!(data_bits(0x8), 0x02);
        assert_eq!(data_bits(0xF), 0x1E);
    }

    #[test]
    fn test_two_strobes_per_byte() {
        for byte in [0x00, 0xFF] {
            let mut plate = plate();
            plate.send(RegisterSelect::Data, byte).unwrap();
            let writes = &plate.chip.bus.writes;
            assert_eq!(writes.len(), 6);
            let pulses = writes.iter().filter(|(_, v)| v & port_b::EN != 0).count();
            assert_eq!(pulses, 2);
            assert!(writes.iter().all(|(r, v)| *r == reg::GPIOB && v & port_b::RS != 0));
        }
    }

    #[test]
    fn test_backlight_read_modify_write() {
        let mut plate = plate();
        plate.chip.bus.regs.insert(reg::GPIOA, 0x05);
        plate.chip.bus.regs.insert(reg::GPIOB, 0x80);

        plate.set_backlight(false).unwrap();
        assert_eq!(plate.chip.bus.regs[&reg::GPIOA], 0xC5);
        assert_eq!(plate.chip.bus.regs[&reg::GPIOB], 0x81);

        plate.set_backlight(true).unwrap();
        assert_eq!(plate.chip.bus.regs[&reg::GPIOA], 0x05);
        assert_eq!(plate.chip.bus.regs[&reg::GPIOB], 0x80);
    }

    #[test]
    fn test_blue_led_kept_off_during_writes() {
        let mut plate = plate();
        plate.set_backlight(false).unwrap();
        plate.chip.bus.writes.clear();
        plate.send(RegisterSelect::Instruction, 0x01).unwrap();
        assert!(plate
            .chip
            .bus
            .writes
            .iter()
            .all(|(_, v)| v & port_b::LED_BLUE != 0));
    }

    #[test]
    fn test_keys_active_low() {
        let mut plate = plate();
        // Up pressed: its input reads low, the others high
        plate
            .chip
            .bus
            .regs
            .insert(reg::GPIOA, port_a::KEYS & !port_a::KEY_UP);
        let keys = plate.scan_keys().unwrap().unwrap();
        assert_eq!(keys.bits(), KeyMask::UP);

        plate.chip.bus.regs.insert(reg::GPIOA, 0xFF);
        assert!(plate.scan_keys().unwrap().unwrap().is_empty());
    }
}
