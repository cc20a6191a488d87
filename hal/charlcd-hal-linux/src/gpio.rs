//! Output lines
//!
//! [`SysfsLine`] drives a kernel GPIO through sysfs. Export is idempotent: a
//! line that is already exported is adopted, and only lines exported here
//! are unexported again on drop.
//!
//! [`FileSwitch`] writes `1` or `0` into a file, for backlight switches
//! exposed by other drivers.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use charlcd_hal::OutputPin;
use linux_embedded_hal::sysfs_gpio::{Direction, Pin};

use crate::error::HalError;

pub struct SysfsLine {
    pin: Pin,
    line: u64,
    exported_here: bool,
}

impl SysfsLine {
    /// Export `line` and make it an output driven low
    pub fn output(line: u64) -> Result<Self, HalError> {
        let pin = Pin::new(line);
        let gpio_err = |source| HalError::Gpio { line, source };

        let exported_here = !pin.is_exported();
        if exported_here {
            pin.export().map_err(gpio_err)?;
        } else {
            log::debug!("gpio {}: already exported", line);
        }
        let this = Self {
            pin,
            line,
            exported_here,
        };
        this.pin.set_direction(Direction::Low).map_err(gpio_err)?;
        log::info!("gpio {}: output", line);
        Ok(this)
    }

    pub fn line(&self) -> u64 {
        self.line
    }
}

impl OutputPin for SysfsLine {
    type Error = HalError;

    fn set_state(&mut self, high: bool) -> Result<(), HalError> {
        self.pin
            .set_value(u8::from(high))
            .map_err(|source| HalError::Gpio {
                line: self.line,
                source,
            })
    }
}

impl Drop for SysfsLine {
    fn drop(&mut self) {
        if self.exported_here {
            if let Err(e) = self.pin.unexport() {
                log::warn!("gpio {}: unexport failed: {}", self.line, e);
            }
        }
    }
}

pub struct FileSwitch {
    path: PathBuf,
    file: File,
}

impl FileSwitch {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, HalError> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .write(true)
            .open(&path)
            .map_err(|source| HalError::Open {
                path: path.clone(),
                source,
            })?;
        Ok(Self { path, file })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl OutputPin for FileSwitch {
    type Error = HalError;

    fn set_state(&mut self, high: bool) -> Result<(), HalError> {
        self.file.write_all(if high { b"1" } else { b"0" })?;
        self.file.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_file_switch_writes_digits() {
        let path = std::env::temp_dir().join(format!("charlcd-switch-{}", std::process::id()));
        fs::write(&path, b"").unwrap();

        let mut switch = FileSwitch::open(&path).unwrap();
        switch.set_high().unwrap();
        switch.set_low().unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"10");

        drop(switch);
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_file_switch_missing_file() {
        let err = FileSwitch::open("/nonexistent/charlcd/switch").err().unwrap();
        assert!(matches!(err, HalError::Open { .. }));
    }
}
