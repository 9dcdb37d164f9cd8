//! Time providers.
//!
//! Code crash if there is a physical inconsistency (unrecoverable state).

/// Source of the current time.
pub trait Clock: Send + Sync {
    /// Get the current Unix timestamp in seconds.
    fn now(&self) -> u64;
}

/// System clock using the OS time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl SystemClock {
    pub fn new() -> Self {
        Self
    }
}

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("system time before Unix epoch")
            .as_secs()
    }
}

/// Clock frozen at a given timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock {
    timestamp: u64,
}

impl FixedClock {
    pub fn new(timestamp: u64) -> Self {
        Self { timestamp }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> u64 {
        self.timestamp
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> u64 {
        (**self).now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock() {
        // 2020-09-13T12:26:40Z.
        assert!(SystemClock::new().now() > 1_600_000_000);
    }

    #[test]
    fn test_fixed_clock() {
        let clock = FixedClock::new(59);
        assert_eq!(clock.now(), 59);
        assert_eq!((&clock).now(), 59);
    }
}
