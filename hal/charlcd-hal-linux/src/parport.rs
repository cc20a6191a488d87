//! Parallel port through `/dev/port`
//!
//! Register access goes through positioned reads and writes on `/dev/port`,
//! so the process needs `CAP_SYS_RAWIO` but no `ioperm` call. Every
//! [`DevPort::acquire`] takes an exclusive `flock` on a lock file shared by
//! all processes driving displays on the same machine, which keeps strobe
//! sequences from interleaving.

use std::fs::{File, OpenOptions};
use std::os::unix::fs::FileExt;
use std::path::{Path, PathBuf};

use charlcd_hal::{ParallelPort, PortAccess};
use nix::fcntl::{Flock, FlockArg};

use crate::error::HalError;

/// Lock file shared by every parallel port user on the host
pub const DEFAULT_LOCK_PATH: &str = "/var/lock/charlcd-parport.lock";

const DEV_PORT: &str = "/dev/port";

/// Register offsets from the port base
mod reg {
    pub const DATA: u64 = 0;
    pub const STATUS: u64 = 1;
    pub const CONTROL: u64 = 2;
}

pub struct DevPort {
    file: File,
    base: u64,
    lock_path: PathBuf,
}

impl DevPort {
    /// Open the port at I/O address `base` (usually 0x378)
    pub fn open(base: u16) -> Result<Self, HalError> {
        Self::open_at(DEV_PORT, base)
    }

    /// Open `base` inside an arbitrary port file
    pub fn open_at(path: impl AsRef<Path>, base: u16) -> Result<Self, HalError> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(|source| HalError::Open {
                path: path.to_path_buf(),
                source,
            })?;
        log::info!("parport: using {} base {:#x}", path.display(), base);
        Ok(Self {
            file,
            base: u64::from(base),
            lock_path: PathBuf::from(DEFAULT_LOCK_PATH),
        })
    }

    pub fn with_lock_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.lock_path = path.into();
        self
    }

    pub fn base(&self) -> u64 {
        self.base
    }

    fn lock(&self) -> Result<Flock<File>, HalError> {
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&self.lock_path)
            .map_err(|source| HalError::Open {
                path: self.lock_path.clone(),
                source,
            })?;
        Flock::lock(file, FlockArg::LockExclusive).map_err(|(_, source)| HalError::Lock {
            path: self.lock_path.clone(),
            source,
        })
    }
}

/// Held port; the lock is released on drop
pub struct PortGuard<'a> {
    port: &'a DevPort,
    _lock: Flock<File>,
}

impl PortGuard<'_> {
    fn write_reg(&self, offset: u64, value: u8) -> Result<(), HalError> {
        self.port
            .file
            .write_all_at(&[value], self.port.base + offset)?;
        Ok(())
    }
}

impl PortAccess for PortGuard<'_> {
    type Error = HalError;

    fn write_data(&mut self, value: u8) -> Result<(), HalError> {
        self.write_reg(reg::DATA, value)
    }

    fn write_control(&mut self, value: u8) -> Result<(), HalError> {
        self.write_reg(reg::CONTROL, value)
    }

    fn read_status(&mut self) -> Result<u8, HalError> {
        let mut value = [0u8];
        self.port
            .file
            .read_exact_at(&mut value, self.port.base + reg::STATUS)?;
        Ok(value[0])
    }
}

impl ParallelPort for DevPort {
    type Error = HalError;
    type Access<'a> = PortGuard<'a>;

    fn acquire(&mut self) -> Result<PortGuard<'_>, HalError> {
        let lock = self.lock()?;
        Ok(PortGuard {
            port: self,
            _lock: lock,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn scratch(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("charlcd-{}-{}", name, std::process::id()))
    }

    #[test]
    fn test_registers_at_base_offsets() {
        let port_file = scratch("port");
        let lock_file = scratch("lock");
        fs::write(&port_file, [0, 0, 0, 0, 0x5A, 0, 0, 0]).unwrap();

        let mut port = DevPort::open_at(&port_file, 3)
            .unwrap()
            .with_lock_path(&lock_file);
        {
            let mut access = port.acquire().unwrap();
            access.write_data(0x41).unwrap();
            access.write_control(0x0B).unwrap();
            assert_eq!(access.read_status().unwrap(), 0x5A);
        }
        assert_eq!(fs::read(&port_file).unwrap(), [0, 0, 0, 0x41, 0x5A, 0x0B, 0, 0]);

        fs::remove_file(&port_file).unwrap();
        fs::remove_file(&lock_file).unwrap();
    }

    #[test]
    fn test_reacquire_after_guard_dropped() {
        let port_file = scratch("port2");
        let lock_file = scratch("lock2");
        fs::write(&port_file, [0u8; 4]).unwrap();

        let mut port = DevPort::open_at(&port_file, 0)
            .unwrap()
            .with_lock_path(&lock_file);
        drop(port.acquire().unwrap());
        assert!(port.acquire().is_ok());

        fs::remove_file(&port_file).unwrap();
        fs::remove_file(&lock_file).unwrap();
    }

    #[test]
    fn test_missing_lock_dir_fails_acquire() {
        let port_file = scratch("port3");
        fs::write(&port_file, [0u8; 4]).unwrap();

        let mut port = DevPort::open_at(&port_file, 0)
            .unwrap()
            .with_lock_path("/nonexistent/charlcd/lock");
        assert!(matches!(port.acquire(), Err(HalError::Open { .. })));

        fs::remove_file(&port_file).unwrap();
    }
}
