//! USB CDC-ACM to UART bridge for STM32F302.
//!
//! This crate provides the embedded implementations of the
//! `cdc-bridge-core` interfaces: USART1 registers, pipe-backed CDC FIFOs and
//! GPIO control outputs, plus the embassy-usb packet pumps.

#![no_std]

// Re-export core types for convenience
pub use cdc_bridge_core::{
    BridgeConfig, CdcEvents, ControlTracker, Fault, LineCoding, LinkConfig, SerialBridge,
    CDC_INTERFACE, DEFAULT_BAUD_RATE,
};

pub mod cdc;
pub mod outputs;
pub mod uart;
pub mod usb;

pub use cdc::{BytePipe, FlushSignal, PipeCdcPort, FIFO_SIZE, MAX_PACKET_SIZE};
pub use outputs::PinOutputs;
pub use uart::Usart1;
pub use usb::{
    configure_usb_cdc, control_tracker, forward_to_host, forward_to_wire, line_coding_from,
    LinkError,
};
