//! CDC FIFOs backed by `embassy-sync` pipes.

use cdc_bridge_core::CdcPort;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::pipe::Pipe;
use embassy_sync::signal::Signal;

/// Capacity of each direction's FIFO.
pub const FIFO_SIZE: usize = 256;

/// Full-speed bulk packet size.
pub const MAX_PACKET_SIZE: usize = 64;

/// Byte FIFO shared between the UART interrupt and the USB tasks.
pub type BytePipe = Pipe<CriticalSectionRawMutex, FIFO_SIZE>;

/// Raised when buffered wire data should go out to the host.
pub type FlushSignal = Signal<CriticalSectionRawMutex, ()>;

/// [`CdcPort`] over two pipes and a flush signal.
///
/// The USB tasks fill `host_to_wire` from OUT packets and drain
/// `wire_to_host` into IN packets whenever `flush` is raised. `flush` is
/// raised by an explicit [`CdcPort::flush`] and whenever a whole packet is
/// buffered.
pub struct PipeCdcPort {
    interface: u8,
    host_to_wire: &'static BytePipe,
    wire_to_host: &'static BytePipe,
    flush: &'static FlushSignal,
}

impl PipeCdcPort {
    #[must_use]
    pub const fn new(
        interface: u8,
        host_to_wire: &'static BytePipe,
        wire_to_host: &'static BytePipe,
        flush: &'static FlushSignal,
    ) -> Self {
        Self {
            interface,
            host_to_wire,
            wire_to_host,
            flush,
        }
    }
}

impl CdcPort for PipeCdcPort {
    fn available(&self, interface: u8) -> usize {
        if interface == self.interface {
            self.host_to_wire.len()
        } else {
            0
        }
    }

    fn write_available(&self, interface: u8) -> usize {
        if interface == self.interface {
            self.wire_to_host.free_capacity()
        } else {
            0
        }
    }

    fn read_byte(&self, interface: u8) -> Option<u8> {
        if interface != self.interface {
            return None;
        }
        let mut byte = [0u8; 1];
        match self.host_to_wire.try_read(&mut byte) {
            Ok(1) => Some(byte[0]),
            _ => None,
        }
    }

    fn write_byte(&self, interface: u8, byte: u8) -> bool {
        if interface != self.interface {
            return false;
        }
        match self.wire_to_host.try_write(&[byte]) {
            Ok(1) => {
                if self.wire_to_host.len() >= MAX_PACKET_SIZE {
                    self.flush.signal(());
                }
                true
            }
            _ => false,
        }
    }

    fn flush(&self, interface: u8) {
        if interface == self.interface {
            self.flush.signal(());
        }
    }
}
