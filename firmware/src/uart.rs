//! USART1 register access.

use cdc_bridge_core::{FlowState, Parity, StopBits, UartPeripheral, UartStatus, WordLength};
use embassy_stm32::pac;
use embassy_stm32::pac::usart::{regs, vals};

/// Receiver timeout clear flag (ICR.RTOCF).
const ICR_RTOCF: u32 = 1 << 11;
/// Overrun clear flag (ICR.ORECF).
const ICR_ORECF: u32 = 1 << 3;
/// RTOR.RTO is 24 bits wide.
const RTO_MASK: u32 = 0x00FF_FFFF;

/// [`UartPeripheral`] over the USART1 register block.
///
/// The peripheral clock and pins must already be enabled, e.g. by keeping a
/// blocking `embassy_stm32::usart::Uart` alive for the lifetime of the
/// program. This type only touches the registers the bridge owns.
pub struct Usart1 {
    clock_hz: u32,
}

impl Usart1 {
    /// `clock_hz` is the USART1 kernel clock.
    #[must_use]
    pub const fn new(clock_hz: u32) -> Self {
        Self { clock_hz }
    }

    #[inline]
    fn regs(&self) -> pac::usart::Usart {
        pac::USART1
    }
}

impl UartPeripheral for Usart1 {
    fn clock_hz(&self) -> u32 {
        self.clock_hz
    }

    fn status(&self) -> UartStatus {
        let isr = self.regs().isr().read();
        let mut status = UartStatus::NONE;
        if isr.txe() {
            status = status | UartStatus::TX_READY;
        }
        if isr.rxne() {
            status = status | UartStatus::RX_READY;
        }
        if isr.rtof() {
            status = status | UartStatus::RX_TIMEOUT;
        }
        if isr.ore() {
            status = status | UartStatus::OVERRUN;
        }
        status
    }

    fn read_data(&self) -> u8 {
        // Bit 8 holds the parity bit in 9-bit frames.
        (self.regs().rdr().read().dr() & 0xFF) as u8
    }

    fn write_data(&self, byte: u8) {
        self.regs().tdr().write(|w| w.set_dr(u16::from(byte)));
    }

    fn clear_receiver_timeout(&self) {
        self.regs().icr().write_value(regs::Icr(ICR_RTOCF));
    }

    fn clear_overrun(&self) {
        self.regs().icr().write_value(regs::Icr(ICR_ORECF));
    }

    fn interrupts(&self) -> FlowState {
        let cr1 = self.regs().cr1().read();
        FlowState {
            tx_enabled: cr1.txeie(),
            rx_enabled: cr1.rxneie(),
        }
    }

    fn set_interrupts(&self, state: FlowState) {
        self.regs().cr1().modify(|w| {
            w.set_txeie(state.tx_enabled);
            w.set_rxneie(state.rx_enabled);
        });
    }

    fn enable(&self) {
        self.regs().cr1().modify(|w| w.set_ue(true));
    }

    fn disable(&self) {
        self.regs().cr1().modify(|w| w.set_ue(false));
    }

    fn max_baud_divisor(&self) -> u32 {
        u32::from(u16::MAX)
    }

    fn set_baud_divisor(&self, divisor: u32) {
        // Bounded by max_baud_divisor in apply_link.
        self.regs().brr().write(|w| w.set_brr(divisor as u16));
    }

    fn set_frame(&self, word_length: WordLength, parity: Parity) {
        self.regs().cr1().modify(|w| {
            w.set_m0(match word_length {
                WordLength::Eight => vals::M0::BIT8,
                WordLength::Nine => vals::M0::BIT9,
            });
            w.set_pce(parity.is_enabled());
            if parity == Parity::Odd {
                w.set_ps(vals::Ps::ODD);
            } else {
                w.set_ps(vals::Ps::EVEN);
            }
        });
    }

    fn set_stop_bits(&self, stop_bits: StopBits) {
        self.regs().cr2().modify(|w| {
            w.set_stop(match stop_bits {
                StopBits::One => vals::Stop::STOP1,
                StopBits::OnePointFive => vals::Stop::STOP1P5,
                StopBits::Two => vals::Stop::STOP2,
            });
        });
    }

    fn enable_receiver_timeout(&self, bit_times: u32) {
        self.regs().rtor().write(|w| w.set_rto(bit_times & RTO_MASK));
        self.regs().cr2().modify(|w| w.set_rtoen(true));
        self.regs().cr1().modify(|w| w.set_rtoie(true));
    }
}
