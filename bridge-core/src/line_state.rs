//! Line-state projection: host DTR/RTS onto the two PTT lines and their
//! indicators.
//!
//! | dtr | rts | PTT1 | Indicator A | PTT2 | Indicator B |
//! |-----|-----|------|-------------|------|-------------|
//! | 0   | 0   | off  | Idle        | off  | Idle        |
//! | 1   | 0   | on   | Full        | off  | Idle        |
//! | 0   | 1   | off  | Idle        | on   | Full        |
//! | 1   | 1   | off  | Idle        | off  | Idle        |

use crate::peripheral::{ControlOutputs, Indicator, Ptt};
use crate::types::{Level, LineState};

/// Output levels derived from one line-state notification.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ControlProjection {
    pub ptt1: bool,
    pub ptt2: bool,
    pub indicator_a: Level,
    pub indicator_b: Level,
}

impl ControlProjection {
    /// Write all four outputs.
    pub fn drive<O: ControlOutputs>(&self, outputs: &O) {
        outputs.set_ptt(Ptt::One, self.ptt1);
        outputs.set_indicator(Indicator::A, level(self.ptt1));
        outputs.set_ptt(Ptt::Two, self.ptt2);
        outputs.set_indicator(Indicator::B, level(self.ptt2));
    }
}

impl From<LineState> for ControlProjection {
    fn from(state: LineState) -> Self {
        project(state)
    }
}

/// Map a line state to output levels.
///
/// DTR alone keys PTT1, RTS alone keys PTT2; both or neither key nothing.
#[must_use]
pub const fn project(state: LineState) -> ControlProjection {
    let ptt1 = state.dtr && !state.rts;
    let ptt2 = !state.dtr && state.rts;

    ControlProjection {
        ptt1,
        ptt2,
        indicator_a: level(ptt1),
        indicator_b: level(ptt2),
    }
}

#[inline]
const fn level(keyed: bool) -> Level {
    if keyed {
        Level::Full
    } else {
        Level::Idle
    }
}
