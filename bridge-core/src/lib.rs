//! Platform-agnostic USB CDC-ACM to UART bridge.
//!
//! This crate holds the whole data path of a USB-to-serial adapter without
//! any chip-specific dependencies. It can be used both in embedded `no_std`
//! firmware and on host for testing.
//!
//! # Overview
//!
//! - [`types`]: Link configuration, line state and status snapshots
//! - [`peripheral`]: The UART, CDC and control-output interfaces the bridge drives
//! - [`flow`]: Interrupt-enable flow control guarded by a critical section
//! - [`config`]: Defaults, baud divisor and line-coding application
//! - [`line_state`]: DTR/RTS projection onto PTT lines and indicators
//! - [`control`]: Change detection for snapshot-style USB control reporting
//! - [`bridge`]: The interrupt handler and the USB event callbacks ([`SerialBridge`])
//!
//! # Data Flow
//!
//! ```text
//!   host OUT ──► CDC rx FIFO ──(TX_READY, 1 byte)──► UART TDR ──► wire
//!   wire ──► UART RDR ──(RX_READY, 1 byte)──► CDC tx FIFO ──► host IN
//! ```
//!
//! Each direction is paused by clearing its interrupt enable when its FIFO
//! runs dry or full, and resumed by the matching USB event.
//!
//! # Features
//!
//! - **`std`**: Enable standard library support (for host testing)
//! - **`defmt`**: Enable defmt formatting and logging (for embedded targets)

#![cfg_attr(not(any(test, feature = "std")), no_std)]

#[cfg(feature = "std")]
extern crate std;

#[macro_use]
mod fmt;

pub mod bridge;
pub mod config;
pub mod control;
pub mod error;
pub mod flow;
pub mod line_state;
pub mod peripheral;
pub mod types;

#[cfg(test)]
mod mock;

// Re-export main types at crate root
pub use bridge::{CdcEvents, SerialBridge};
pub use config::{
    apply_link, baud_divisor, BridgeConfig, CDC_INTERFACE, DEFAULT_BAUD_RATE, RECEIVER_TIMEOUT_BITS,
};
pub use control::ControlTracker;
pub use error::Fault;
pub use flow::FlowControl;
pub use line_state::{project, ControlProjection};
pub use peripheral::{CdcPort, ControlOutputs, Indicator, Ptt, UartPeripheral};
pub use types::{
    FlowState, Level, LineCoding, LineState, LinkConfig, Parity, StopBits, UartStatus, WordLength,
};
