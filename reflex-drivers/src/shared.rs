//! Interrupt-safe ownership cell
//!
//! The bus master and the display are owned by the main loop, but the
//! game also updates the backlight from timer interrupts. [`Shared`] holds
//! a driver in a `static` and hands out `&mut` access inside a critical
//! section, so a transaction can never be interleaved with another one.
//!
//! ```ignore
//! static DISPLAY: Shared<Display> = Shared::new();
//!
//! DISPLAY.install(display);
//! DISPLAY.lock(|lcd| lcd.set_color(color::RED));
//! ```

use core::cell::RefCell;

use critical_section::Mutex;

/// A value shared between the main loop and interrupt handlers
pub struct Shared<T> {
    slot: Mutex<RefCell<Option<T>>>,
}

impl<T> Shared<T> {
    /// Empty cell, usable in a `static`
    pub const fn new() -> Self {
        Self {
            slot: Mutex::new(RefCell::new(None)),
        }
    }

    /// Store a value, returning the previous one
    ///
    /// Fails with the given value if called from inside [`lock`](Self::lock).
    pub fn install(&self, value: T) -> Result<Option<T>, T> {
        critical_section::with(|cs| match self.slot.borrow(cs).try_borrow_mut() {
            Ok(mut slot) => Ok(slot.replace(value)),
            Err(_) => Err(value),
        })
    }

    /// Run `f` with exclusive access to the value
    ///
    /// Interrupts are masked while `f` runs. Returns `None` if no value is
    /// installed or the cell is already locked further up the stack.
    pub fn lock<R>(&self, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        critical_section::with(|cs| {
            let mut slot = self.slot.borrow(cs).try_borrow_mut().ok()?;
            slot.as_mut().map(f)
        })
    }

    /// Remove the value
    ///
    /// Returns `None` if empty or locked.
    pub fn take(&self) -> Option<T> {
        critical_section::with(|cs| {
            self.slot
                .borrow(cs)
                .try_borrow_mut()
                .ok()
                .and_then(|mut slot| slot.take())
        })
    }

    /// Whether a value is installed
    pub fn is_installed(&self) -> bool {
        critical_section::with(|cs| match self.slot.borrow(cs).try_borrow() {
            Ok(slot) => slot.is_some(),
            // Locked, so something is installed
            Err(_) => true,
        })
    }
}

impl<T> Default for Shared<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_lock() {
        let shared: Shared<u32> = Shared::new();
        assert!(!shared.is_installed());
        assert_eq!(shared.lock(|v| *v), None);
    }

    #[test]
    fn test_install_lock_take() {
        let shared = Shared::new();
        assert_eq!(shared.install(1u32), Ok(None));
        assert_eq!(shared.install(2), Ok(Some(1)));

        let bumped = shared.lock(|v| {
            *v += 1;
            *v
        });
        assert_eq!(bumped, Some(3));
        assert_eq!(shared.take(), Some(3));
        assert!(!shared.is_installed());
    }

    #[test]
    fn test_nested_lock_is_refused() {
        let shared = Shared::new();
        shared.install(7u8).unwrap();

        let inner = shared.lock(|_| {
            assert!(shared.is_installed());
            assert_eq!(shared.install(9), Err(9));
            assert_eq!(shared.take(), None);
            shared.lock(|v| *v)
        });
        assert_eq!(inner, Some(None));
        assert_eq!(shared.lock(|v| *v), Some(7));
    }

    #[test]
    fn test_static_cell() {
        static COUNTER: Shared<u16> = Shared::new();
        COUNTER.install(0).unwrap();
        for _ in 0..5 {
            COUNTER.lock(|c| *c += 1);
        }
        assert_eq!(COUNTER.take(), Some(5));
    }
}
