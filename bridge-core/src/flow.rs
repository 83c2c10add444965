//! Flow control: the armed/disarmed state of each data direction.
//!
//! The two interrupt enable bits share one control register with unrelated
//! bits, and are written from both the UART interrupt (disarm on exhaustion)
//! and the USB callbacks (re-arm on buffer availability). Every
//! read-modify-write runs inside `critical_section::with`, so the other
//! context can never observe or clobber a half-finished update.

use crate::peripheral::UartPeripheral;
use crate::types::FlowState;

/// Guarded view over a UART's data-direction interrupt enables.
pub struct FlowControl<'a, U> {
    uart: &'a U,
}

impl<'a, U: UartPeripheral> FlowControl<'a, U> {
    #[inline]
    #[must_use]
    pub fn new(uart: &'a U) -> Self {
        Self { uart }
    }

    /// Current enable bits.
    #[inline]
    #[must_use]
    pub fn state(&self) -> FlowState {
        critical_section::with(|_| self.uart.interrupts())
    }

    /// Resume draining host data onto the wire.
    #[inline]
    pub fn arm_tx(&self) {
        self.modify(|s| s.tx_enabled = true);
    }

    /// Pause transmission until the host sends more data.
    #[inline]
    pub fn disarm_tx(&self) {
        self.modify(|s| s.tx_enabled = false);
    }

    /// Resume forwarding wire data to the host.
    #[inline]
    pub fn arm_rx(&self) {
        self.modify(|s| s.rx_enabled = true);
    }

    /// Pause reception until the host frees buffer space.
    #[inline]
    pub fn disarm_rx(&self) {
        self.modify(|s| s.rx_enabled = false);
    }

    fn modify(&self, f: impl FnOnce(&mut FlowState)) {
        critical_section::with(|_| {
            let mut state = self.uart.interrupts();
            f(&mut state);
            self.uart.set_interrupts(state);
        });
    }
}
