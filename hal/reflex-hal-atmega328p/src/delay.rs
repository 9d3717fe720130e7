//! Busy-loop delay for the ATmega328P
//!
//! The LCD gives no busy signal over I2C, so every command is followed by
//! a fixed wait. Without a timer peripheral reserved for that, the wait is
//! a calibrated spin loop.

use embedded_hal::delay::DelayNs;

/// Lower bound on CPU cycles spent per loop iteration
///
/// Counter update, compare and branch take at least this long on AVR, so
/// the loop never returns early; it may overshoot.
const CYCLES_PER_ITERATION: u64 = 4;

/// Delay provider that spins for a number of CPU cycles
///
/// `CPU_HZ` is the core clock the firmware is built for.
#[derive(Debug, Clone, Copy, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CycleDelay<const CPU_HZ: u32>;

impl<const CPU_HZ: u32> CycleDelay<CPU_HZ> {
    /// Create a new delay provider
    pub const fn new() -> Self {
        Self
    }

    /// Loop iterations needed to wait at least `ns` nanoseconds
    pub const fn iterations(ns: u32) -> u64 {
        let cycles = (ns as u64 * CPU_HZ as u64).div_ceil(1_000_000_000);
        cycles.div_ceil(CYCLES_PER_ITERATION)
    }
}

impl<const CPU_HZ: u32> DelayNs for CycleDelay<CPU_HZ> {
    fn delay_ns(&mut self, ns: u32) {
        for i in 0..Self::iterations(ns) {
            core::hint::black_box(i);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iterations_round_up() {
        // 16 MHz: 62.5 ns per cycle
        assert_eq!(CycleDelay::<16_000_000>::iterations(0), 0);
        assert_eq!(CycleDelay::<16_000_000>::iterations(1), 1);
        // 1 µs = 16 cycles = 4 iterations
        assert_eq!(CycleDelay::<16_000_000>::iterations(1_000), 4);
        // 2000 µs clear delay = 32000 cycles
        assert_eq!(CycleDelay::<16_000_000>::iterations(2_000_000), 8_000);
    }

    #[test]
    fn test_slower_clock_needs_fewer_iterations() {
        let fast = CycleDelay::<16_000_000>::iterations(4_500_000);
        let slow = CycleDelay::<8_000_000>::iterations(4_500_000);
        assert_eq!(fast, slow * 2);
    }
}
