//! Rate-limited reporting of transport failures
//!
//! A disconnected bus fails on every byte of every refresh. The first
//! failure is logged at error level, later ones at debug level, and all of
//! them are counted so a flush can return the total.

use crate::error::TransportError;

/// Per-instance failure log
#[derive(Debug, Clone)]
pub struct FailureReporter {
    name: &'static str,
    reported: bool,
    failures: u32,
}

impl FailureReporter {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            reported: false,
            failures: 0,
        }
    }

    /// Log one failure of `operation`
    pub fn record(&mut self, operation: &str, err: TransportError) {
        self.failures = self.failures.saturating_add(1);
        if self.reported {
            log::debug!("{}: {}: {}", self.name, operation, err);
        } else {
            self.reported = true;
            log::error!("{}: {}: {}", self.name, operation, err);
        }
    }

    /// Log the error of `result`, if any, and turn it into `None`
    pub fn check<T>(&mut self, operation: &str, result: Result<T, TransportError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                self.record(operation, err);
                None
            }
        }
    }

    /// Failures since the last call
    pub fn take_failures(&mut self) -> u32 {
        core::mem::take(&mut self.failures)
    }

    /// True once anything has been logged at error level
    pub fn has_reported(&self) -> bool {
        self.reported
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_and_demotes() {
        let mut reporter = FailureReporter::new("test");
        assert!(!reporter.has_reported());
        reporter.record("write", TransportError::Write);
        reporter.record("write", TransportError::Write);
        assert!(reporter.has_reported());
        assert_eq!(reporter.take_failures(), 2);
        assert_eq!(reporter.take_failures(), 0);
    }

    #[test]
    fn test_check_passes_values() {
        let mut reporter = FailureReporter::new("test");
        assert_eq!(reporter.check("read", Ok(3)), Some(3));
        assert_eq!(reporter.check::<u8>("read", Err(TransportError::Read)), None);
        assert_eq!(reporter.take_failures(), 1);
    }
}
