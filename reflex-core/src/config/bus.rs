//! Bus master configuration

use reflex_hal::{ClockDivisor, I2cConfig};

/// Default poll budget for one bus event
///
/// A byte at 100 kHz takes roughly 90 µs; at 16 MHz even a slow poll loop
/// sees the flag within a few hundred iterations.
pub const DEFAULT_POLL_LIMIT: u32 = 20_000;

/// Two-wire bus master configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TwiConfig {
    /// CPU clock in Hz
    pub cpu_hz: u32,
    /// Bus clock divisor derived from the CPU and target bus frequency
    pub divisor: ClockDivisor,
    /// Maximum polls of the event-complete flag per bus event
    ///
    /// `None` spins until the flag rises, hanging on a stuck bus.
    pub poll_limit: Option<u32>,
}

impl TwiConfig {
    /// Configuration for a CPU clock and target bus frequency
    pub const fn new(cpu_hz: u32, bus: I2cConfig) -> Self {
        Self {
            cpu_hz,
            divisor: ClockDivisor::from_frequencies(cpu_hz, bus.frequency),
            poll_limit: Some(DEFAULT_POLL_LIMIT),
        }
    }

    /// 16 MHz CPU, 100 kHz standard-mode bus
    pub const UNO_STANDARD: Self = Self::new(16_000_000, I2cConfig::STANDARD);

    /// Use a different poll budget
    ///
    /// A budget of zero would time out every event, so it is raised to one.
    pub const fn with_poll_limit(mut self, polls: u32) -> Self {
        self.poll_limit = Some(if polls == 0 { 1 } else { polls });
        self
    }

    /// Wait for bus events without a bound
    pub const fn unbounded(mut self) -> Self {
        self.poll_limit = None;
        self
    }

    /// Actual bus clock in Hz
    pub const fn bus_hz(&self) -> u32 {
        self.divisor.scl_hz(self.cpu_hz)
    }
}

impl Default for TwiConfig {
    fn default() -> Self {
        Self::UNO_STANDARD
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uno_standard() {
        let config = TwiConfig::UNO_STANDARD;
        assert_eq!(config.divisor.bit_rate, 73);
        assert_eq!(config.poll_limit, Some(DEFAULT_POLL_LIMIT));
        assert!(config.bus_hz() <= 100_000);
        assert!(config.bus_hz() > 95_000);
    }

    #[test]
    fn test_poll_limit_builders() {
        let config = TwiConfig::new(8_000_000, I2cConfig::FAST).with_poll_limit(10);
        assert_eq!(config.poll_limit, Some(10));
        assert_eq!(config.unbounded().poll_limit, None);
    }

    #[test]
    fn test_zero_poll_limit_is_raised() {
        let config = TwiConfig::UNO_STANDARD.with_poll_limit(0);
        assert_eq!(config.poll_limit, Some(1));
    }
}
