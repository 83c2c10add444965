//! Control-change dispatch for USB stacks that report line coding and line
//! state as snapshots instead of per-request callbacks.

use crate::bridge::CdcEvents;
use crate::error::Fault;
use crate::types::LineCoding;

/// Turns control snapshots into [`CdcEvents`] calls, skipping values that
/// were already forwarded.
///
/// Some stacks keep a placeholder line coding until the host sends a real
/// SET_LINE_CODING, and restore it on every bus reset. That placeholder is
/// never forwarded, so the link keeps its current configuration until the
/// host actually asks for another one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ControlTracker {
    placeholder: LineCoding,
    coding: Option<LineCoding>,
    lines: Option<(bool, bool)>,
}

impl ControlTracker {
    /// `placeholder` is the coding the stack reports when no request has
    /// been received.
    #[must_use]
    pub const fn new(placeholder: LineCoding) -> Self {
        Self {
            placeholder,
            coding: None,
            lines: None,
        }
    }

    /// Last line coding passed on, if any.
    #[must_use]
    pub const fn coding(&self) -> Option<LineCoding> {
        self.coding
    }

    /// Forward whatever changed since the previous snapshot.
    ///
    /// A rejected coding is not remembered, so the same request faults again
    /// if it is reported again.
    pub fn update<E: CdcEvents>(
        &mut self,
        events: &E,
        interface: u8,
        coding: LineCoding,
        dtr: bool,
        rts: bool,
    ) -> Result<(), Fault> {
        if coding != self.placeholder && self.coding != Some(coding) {
            events.on_line_coding_changed(interface, &coding)?;
            self.coding = Some(coding);
        }
        if self.lines != Some((dtr, rts)) {
            events.on_line_state_changed(interface, dtr, rts);
            self.lines = Some((dtr, rts));
        }
        Ok(())
    }
}
