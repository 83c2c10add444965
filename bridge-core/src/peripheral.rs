//! Interfaces the bridge drives: the UART, the USB CDC FIFOs and the
//! control outputs.
//!
//! All methods take `&self`. They model hardware registers and FIFOs that
//! are touched from both the UART interrupt and the USB callback context,
//! so implementations use interior mutability (volatile register access on
//! target, `Cell`/`RefCell` in host tests).

use crate::types::{FlowState, Level, Parity, StopBits, UartStatus, WordLength};

/// The serial peripheral, as a set of named register operations.
///
/// # `no_std` Compatibility
///
/// All implementations must be `#![no_std]` compatible with no heap allocation.
pub trait UartPeripheral {
    /// Input clock of the peripheral in Hz, used to derive the baud divisor.
    fn clock_hz(&self) -> u32;

    /// Snapshot of the pending conditions.
    fn status(&self) -> UartStatus;

    /// Read the receive data register. Clears `RX_READY`.
    fn read_data(&self) -> u8;

    /// Load the transmit data register. Clears `TX_READY` until the byte
    /// moves to the shift register.
    fn write_data(&self, byte: u8);

    /// Acknowledge the receiver timeout condition.
    fn clear_receiver_timeout(&self);

    /// Acknowledge the overrun condition.
    fn clear_overrun(&self);

    /// Current enable bits of the transmit-ready and receive-ready interrupts.
    fn interrupts(&self) -> FlowState;

    /// Write both interrupt enable bits, leaving every other control bit as is.
    ///
    /// Callers serialize read-modify-write sequences through
    /// [`FlowControl`](crate::flow::FlowControl).
    fn set_interrupts(&self, state: FlowState);

    /// Set the peripheral master enable.
    fn enable(&self);

    /// Clear the peripheral master enable. Framing registers may only be
    /// written while disabled.
    fn disable(&self);

    /// Largest divisor the baud rate register holds.
    fn max_baud_divisor(&self) -> u32 {
        u32::MAX
    }

    /// Program the baud rate divisor. Never called with more than
    /// [`max_baud_divisor`](Self::max_baud_divisor).
    fn set_baud_divisor(&self, divisor: u32);

    /// Program frame width and parity mode together.
    fn set_frame(&self, word_length: WordLength, parity: Parity);

    /// Program the number of stop bits.
    fn set_stop_bits(&self, stop_bits: StopBits);

    /// Enable the receiver timeout and its interrupt, firing after
    /// `bit_times` idle bit periods on the receive line.
    fn enable_receiver_timeout(&self, bit_times: u32);
}

/// The USB CDC side: one receive FIFO (host to wire) and one transmit FIFO
/// (wire to host) per interface.
pub trait CdcPort {
    /// Bytes received from the host and not yet consumed.
    fn available(&self, interface: u8) -> usize;

    /// Free space in the buffer towards the host.
    fn write_available(&self, interface: u8) -> usize;

    /// Take one byte received from the host.
    ///
    /// Only called when [`available`](Self::available) is non-zero.
    fn read_byte(&self, interface: u8) -> Option<u8>;

    /// Queue one byte towards the host. Returns `false` if it was refused.
    ///
    /// Only called when [`write_available`](Self::write_available) is non-zero.
    fn write_byte(&self, interface: u8, byte: u8) -> bool;

    /// Send any partially filled packet to the host now.
    fn flush(&self, interface: u8);
}

/// Push-to-talk line driven by the host's DTR/RTS.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Ptt {
    /// Asserted by DTR alone.
    One,
    /// Asserted by RTS alone.
    Two,
}

/// Status indicator paired with a PTT line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Indicator {
    /// Follows [`Ptt::One`].
    A,
    /// Follows [`Ptt::Two`].
    B,
}

/// Discrete outputs controlled by the USB line state.
pub trait ControlOutputs {
    /// Drive a PTT line.
    fn set_ptt(&self, ptt: Ptt, asserted: bool);

    /// Set an indicator brightness.
    fn set_indicator(&self, indicator: Indicator, level: Level);
}
