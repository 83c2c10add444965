//! USB CDC-ACM glue: class setup, control-change dispatch and the packet
//! pumps between the endpoints and the pipes.

use cdc_bridge_core::{CdcEvents, ControlTracker, Fault, LineCoding};
use defmt::debug;
use embassy_futures::select::{select, Either};
use embassy_usb::class::cdc_acm::{self, CdcAcmClass, ControlChanged, Receiver, Sender, State};
use embassy_usb::driver::{Driver, EndpointError};
use embassy_usb::Builder;

use crate::cdc::{BytePipe, FlushSignal, MAX_PACKET_SIZE};

/// Why a pump stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinkError {
    /// The endpoint went away (host disconnected or bus reset).
    Endpoint(EndpointError),
    /// The bridge reported an unrecoverable condition.
    Fault(Fault),
}

impl From<EndpointError> for LinkError {
    fn from(e: EndpointError) -> Self {
        Self::Endpoint(e)
    }
}

impl From<Fault> for LinkError {
    fn from(f: Fault) -> Self {
        Self::Fault(f)
    }
}

/// Convert embassy-usb's line coding into the raw request values.
///
/// embassy-usb decodes the request before it gets here: unknown parity codes
/// arrive as none and unknown stop-bit codes as one stop bit. Only data bits,
/// bit rate and the mark/space parities can still be rejected by the bridge.
#[must_use]
pub fn line_coding_from(coding: &cdc_acm::LineCoding) -> LineCoding {
    LineCoding::new(
        coding.data_rate(),
        coding.data_bits(),
        coding.parity_type() as u8,
        coding.stop_bits() as u8,
    )
}

/// A tracker that ignores embassy-usb's line coding placeholder, which is
/// reported before the first SET_LINE_CODING and after every bus reset.
#[must_use]
pub fn control_tracker() -> ControlTracker {
    ControlTracker::new(line_coding_from(&cdc_acm::LineCoding::default()))
}

fn sync_control<'d, D: Driver<'d>, E: CdcEvents>(
    tracker: &mut ControlTracker,
    sender: &Sender<'d, D>,
    events: &E,
    interface: u8,
) -> Result<(), Fault> {
    let coding = line_coding_from(&sender.line_coding());
    tracker.update(events, interface, coding, sender.dtr(), sender.rts())
}

/// Configure the CDC-ACM class in the USB builder.
///
/// Returns the IN half, the OUT half and the control-change notifier.
pub fn configure_usb_cdc<'d, D: Driver<'d>>(
    builder: &mut Builder<'d, D>,
    state: &'d mut State<'d>,
) -> (Sender<'d, D>, Receiver<'d, D>, ControlChanged<'d>) {
    CdcAcmClass::new(builder, state, MAX_PACKET_SIZE as u16).split_with_control()
}

/// Host to wire: copy OUT packets into `pipe` until the endpoint fails.
///
/// The bridge is told about new data after every chunk that fits, so the
/// transmit interrupt drains the pipe while the rest of a packet waits for
/// space.
pub async fn forward_to_wire<'d, D: Driver<'d>, E: CdcEvents>(
    receiver: &mut Receiver<'d, D>,
    pipe: &BytePipe,
    events: &E,
    interface: u8,
) -> Result<(), LinkError> {
    let mut packet = [0u8; MAX_PACKET_SIZE];
    loop {
        let n = receiver.read_packet(&mut packet).await?;
        let mut pending = &packet[..n];
        while !pending.is_empty() {
            let written = pipe.write(pending).await;
            events.on_data_received(interface);
            pending = &pending[written..];
        }
    }
}

/// Wire to host: send buffered bytes whenever `flush` is raised, and pass
/// control changes on to the bridge.
///
/// A transfer that ends on a full packet is terminated with a zero-length
/// packet so the host does not wait for more.
pub async fn forward_to_host<'d, D: Driver<'d>, E: CdcEvents>(
    sender: &mut Sender<'d, D>,
    control: &ControlChanged<'d>,
    tracker: &mut ControlTracker,
    pipe: &BytePipe,
    flush: &FlushSignal,
    events: &E,
    interface: u8,
) -> Result<(), LinkError> {
    let mut packet = [0u8; MAX_PACKET_SIZE];
    sync_control(tracker, sender, events, interface)?;

    loop {
        match select(flush.wait(), control.control_changed()).await {
            Either::First(()) => {
                let mut ended_full = false;
                while let Ok(n) = pipe.try_read(&mut packet) {
                    sender.write_packet(&packet[..n]).await?;
                    events.on_write_space_freed(interface);
                    ended_full = n == MAX_PACKET_SIZE;
                }
                if ended_full {
                    sender.write_packet(&[]).await?;
                }
            }
            Either::Second(()) => {
                debug!("control changed");
                sync_control(tracker, sender, events, interface)?;
            }
        }
    }
}
