//! SerialBridge: moves bytes between the UART and the USB CDC FIFOs.

use core::cell::Cell;

use critical_section::Mutex;

use crate::config::{apply_link, BridgeConfig};
use crate::error::Fault;
use crate::flow::FlowControl;
use crate::line_state::project;
use crate::peripheral::{CdcPort, ControlOutputs, UartPeripheral};
use crate::types::{FlowState, LineCoding, LineState, LinkConfig, UartStatus};

/// Events raised by the USB CDC stack.
///
/// Implemented by [`SerialBridge`] and invoked by the platform's USB glue,
/// from an interrupt or from a task. Every method runs to completion.
pub trait CdcEvents {
    /// The host sent data; the receive FIFO gained bytes.
    fn on_data_received(&self, interface: u8);

    /// The host acknowledged data; the transmit FIFO gained space.
    fn on_write_space_freed(&self, interface: u8);

    /// The host issued SET_LINE_CODING.
    fn on_line_coding_changed(&self, interface: u8, coding: &LineCoding) -> Result<(), Fault>;

    /// The host issued SET_CONTROL_LINE_STATE.
    fn on_line_state_changed(&self, interface: u8, dtr: bool, rts: bool);
}

/// A USB CDC-ACM to UART bridge.
///
/// Owns one UART, one CDC port and the PTT/indicator outputs. The UART
/// interrupt calls [`on_uart_interrupt`](Self::on_uart_interrupt); the USB
/// stack calls the [`CdcEvents`] methods. Both only need `&self`, so a single
/// instance can be shared between the two contexts.
///
/// # Error Handling
///
/// Backpressure is never an error: a direction whose FIFO is empty or full
/// is paused by clearing its interrupt enable and resumed by the matching
/// USB event. Everything that returns a [`Fault`] is unrecoverable and the
/// caller is expected to stop the bridge.
pub struct SerialBridge<U, C, O> {
    uart: U,
    cdc: C,
    outputs: O,
    config: BridgeConfig,
    link: Mutex<Cell<LinkConfig>>,
}

impl<U: UartPeripheral, C: CdcPort, O: ControlOutputs> SerialBridge<U, C, O> {
    /// Create a bridge. Nothing is written to the hardware until
    /// [`init`](Self::init).
    pub fn new(uart: U, cdc: C, outputs: O, config: BridgeConfig) -> Self {
        Self {
            uart,
            cdc,
            outputs,
            config,
            link: Mutex::new(Cell::new(config.default_link)),
        }
    }

    /// Bring the link up with the default configuration.
    ///
    /// Programs the receiver timeout and default framing, arms both
    /// directions and releases both PTT lines. The platform still has to
    /// unmask the UART interrupt in the interrupt controller afterwards.
    pub fn init(&self) -> Result<(), Fault> {
        let link = self.config.default_link;

        critical_section::with(|cs| {
            self.uart.disable();
            self.uart
                .enable_receiver_timeout(self.config.receiver_timeout_bits);
            apply_link(&self.uart, &link)?;
            self.uart.set_interrupts(FlowState::ARMED);
            self.link.borrow(cs).set(link);
            Ok::<(), Fault>(())
        })?;

        project(LineState::default()).drive(&self.outputs);
        debug!("bridge up on interface {}", self.config.interface);
        Ok(())
    }

    /// Service one UART interrupt.
    ///
    /// Moves at most one byte per direction, then handles the receiver
    /// timeout (flush towards the host) and overrun conditions. An overrun
    /// is acknowledged and reported as [`Fault::Overrun`] after the other
    /// conditions of the same event have been serviced.
    pub fn on_uart_interrupt(&self) -> Result<(), Fault> {
        let status = self.uart.status();
        let interface = self.config.interface;

        if status.contains(UartStatus::TX_READY) {
            self.pump_to_wire(interface)?;
        }

        if status.contains(UartStatus::RX_READY) {
            self.pump_from_wire(interface)?;
        }

        if status.contains(UartStatus::RX_TIMEOUT) {
            self.uart.clear_receiver_timeout();
            self.cdc.flush(interface);
            trace!("rx idle, flushed");
        }

        if status.contains(UartStatus::OVERRUN) {
            self.uart.clear_overrun();
            error!("uart overrun, received data lost");
            return Err(Fault::Overrun);
        }

        Ok(())
    }

    /// Host to wire: load one byte into the transmit register, or pause.
    fn pump_to_wire(&self, interface: u8) -> Result<(), Fault> {
        if self.cdc.available(interface) > 0 {
            let byte = self.cdc.read_byte(interface).ok_or(Fault::CdcReadEmpty)?;
            self.uart.write_data(byte);
        } else {
            self.flow().disarm_tx();
            trace!("tx drained, paused");
        }
        Ok(())
    }

    /// Wire to host: forward one received byte, or pause.
    fn pump_from_wire(&self, interface: u8) -> Result<(), Fault> {
        if self.cdc.write_available(interface) > 0 {
            let byte = self.uart.read_data();
            if !self.cdc.write_byte(interface, byte) {
                return Err(Fault::CdcWriteFull);
            }
        } else {
            self.flow().disarm_rx();
            trace!("host buffer full, rx paused");
        }
        Ok(())
    }

    /// Guarded access to the direction enables.
    #[inline]
    #[must_use]
    pub fn flow(&self) -> FlowControl<'_, U> {
        FlowControl::new(&self.uart)
    }

    /// Snapshot of the direction enables.
    #[inline]
    #[must_use]
    pub fn flow_state(&self) -> FlowState {
        self.flow().state()
    }

    /// The link configuration currently applied to the UART.
    #[must_use]
    pub fn link_config(&self) -> LinkConfig {
        critical_section::with(|cs| self.link.borrow(cs).get())
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    #[inline]
    #[must_use]
    pub fn uart(&self) -> &U {
        &self.uart
    }

    #[inline]
    #[must_use]
    pub fn cdc(&self) -> &C {
        &self.cdc
    }

    #[inline]
    #[must_use]
    pub fn outputs(&self) -> &O {
        &self.outputs
    }

    /// Decompose the bridge into its peripherals.
    pub fn into_parts(self) -> (U, C, O) {
        (self.uart, self.cdc, self.outputs)
    }

    #[inline]
    fn serves(&self, interface: u8) -> bool {
        interface == self.config.interface
    }
}

impl<U: UartPeripheral, C: CdcPort, O: ControlOutputs> CdcEvents for SerialBridge<U, C, O> {
    fn on_data_received(&self, interface: u8) {
        if self.serves(interface) {
            self.flow().arm_tx();
        }
    }

    fn on_write_space_freed(&self, interface: u8) {
        if self.serves(interface) {
            self.flow().arm_rx();
        }
    }

    fn on_line_coding_changed(&self, interface: u8, coding: &LineCoding) -> Result<(), Fault> {
        if !self.serves(interface) {
            return Ok(());
        }

        let link = LinkConfig::try_from(*coding).map_err(|fault| {
            error!("rejected line coding {}: {}", coding, fault);
            fault
        })?;

        critical_section::with(|cs| {
            apply_link(&self.uart, &link)?;
            self.link.borrow(cs).set(link);
            Ok(())
        })
    }

    fn on_line_state_changed(&self, interface: u8, dtr: bool, rts: bool) {
        if !self.serves(interface) {
            return;
        }
        let projection = project(LineState::new(dtr, rts));
        trace!("dtr {} rts {} -> {}", dtr, rts, projection);
        projection.drive(&self.outputs);
    }
}
