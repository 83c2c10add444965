//! PTT lines and indicator LEDs on GPIO.

use core::cell::RefCell;

use cdc_bridge_core::{ControlOutputs, Indicator, Level, Ptt};
use defmt::warn;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embedded_hal::digital::{OutputPin, PinState};

struct Pins<P> {
    ptt1: P,
    ptt2: P,
    led_a: P,
    led_b: P,
}

/// [`ControlOutputs`] over four push-pull pins.
///
/// PTT lines are active high. LEDs are on at [`Level::Full`] and off at
/// [`Level::Idle`].
pub struct PinOutputs<P> {
    pins: Mutex<CriticalSectionRawMutex, RefCell<Pins<P>>>,
}

impl<P: OutputPin> PinOutputs<P> {
    pub fn new(ptt1: P, ptt2: P, led_a: P, led_b: P) -> Self {
        Self {
            pins: Mutex::new(RefCell::new(Pins {
                ptt1,
                ptt2,
                led_a,
                led_b,
            })),
        }
    }

    fn drive(&self, select: impl FnOnce(&mut Pins<P>) -> &mut P, state: PinState) {
        self.pins.lock(|cell| {
            let mut pins = cell.borrow_mut();
            if select(&mut *pins).set_state(state).is_err() {
                warn!("output pin write failed");
            }
        });
    }
}

impl<P: OutputPin> ControlOutputs for PinOutputs<P> {
    fn set_ptt(&self, ptt: Ptt, asserted: bool) {
        let state = PinState::from(asserted);
        match ptt {
            Ptt::One => self.drive(|p| &mut p.ptt1, state),
            Ptt::Two => self.drive(|p| &mut p.ptt2, state),
        }
    }

    fn set_indicator(&self, indicator: Indicator, level: Level) {
        let state = PinState::from(level == Level::Full);
        match indicator {
            Indicator::A => self.drive(|p| &mut p.led_a, state),
            Indicator::B => self.drive(|p| &mut p.led_b, state),
        }
    }
}
