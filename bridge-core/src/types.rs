//! Core bridge types: LineCoding, LinkConfig, LineState, FlowState, UartStatus.

use core::ops::BitOr;

use crate::error::Fault;

/// Raw CDC line coding as delivered by a SET_LINE_CODING request.
///
/// Field encodings follow the CDC PSTN subclass:
/// - `parity`: 0 none, 1 odd, 2 even, 3 mark, 4 space
/// - `stop_bits`: 0 = 1, 1 = 1.5, 2 = 2
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LineCoding {
    /// Requested bit rate in bits per second.
    pub bit_rate: u32,
    /// Character width (5, 6, 7, 8 or 16).
    pub data_bits: u8,
    /// Parity code.
    pub parity: u8,
    /// Stop-bit code.
    pub stop_bits: u8,
}

impl LineCoding {
    /// Parity code for no parity.
    pub const PARITY_NONE: u8 = 0;
    /// Parity code for odd parity.
    pub const PARITY_ODD: u8 = 1;
    /// Parity code for even parity.
    pub const PARITY_EVEN: u8 = 2;

    /// Stop-bit code for one stop bit.
    pub const STOP_BITS_1: u8 = 0;
    /// Stop-bit code for one and a half stop bits.
    pub const STOP_BITS_1_5: u8 = 1;
    /// Stop-bit code for two stop bits.
    pub const STOP_BITS_2: u8 = 2;

    #[must_use]
    pub const fn new(bit_rate: u32, data_bits: u8, parity: u8, stop_bits: u8) -> Self {
        Self {
            bit_rate,
            data_bits,
            parity,
            stop_bits,
        }
    }
}

impl From<LinkConfig> for LineCoding {
    fn from(link: LinkConfig) -> Self {
        Self {
            bit_rate: link.baud_rate,
            data_bits: LinkConfig::DATA_BITS,
            parity: link.parity as u8,
            stop_bits: link.stop_bits as u8,
        }
    }
}

/// Parity mode supported on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Parity {
    None = 0,
    Odd = 1,
    Even = 2,
}

impl Parity {
    /// Whether a parity bit is generated and checked.
    #[inline]
    #[must_use]
    pub const fn is_enabled(self) -> bool {
        !matches!(self, Parity::None)
    }
}

impl TryFrom<u8> for Parity {
    type Error = Fault;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            LineCoding::PARITY_NONE => Ok(Parity::None),
            LineCoding::PARITY_ODD => Ok(Parity::Odd),
            LineCoding::PARITY_EVEN => Ok(Parity::Even),
            other => Err(Fault::UnsupportedParity(other)),
        }
    }
}

/// Number of stop-bit periods per frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StopBits {
    One = 0,
    OnePointFive = 1,
    Two = 2,
}

impl TryFrom<u8> for StopBits {
    type Error = Fault;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            LineCoding::STOP_BITS_1 => Ok(StopBits::One),
            LineCoding::STOP_BITS_1_5 => Ok(StopBits::OnePointFive),
            LineCoding::STOP_BITS_2 => Ok(StopBits::Two),
            other => Err(Fault::UnsupportedStopBits(other)),
        }
    }
}

/// Frame width programmed into the UART, parity bit included.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WordLength {
    Eight,
    Nine,
}

/// Validated configuration of the physical serial link.
///
/// Character width is always 8 data bits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkConfig {
    pub baud_rate: u32,
    pub parity: Parity,
    pub stop_bits: StopBits,
}

impl LinkConfig {
    /// The only supported character width.
    pub const DATA_BITS: u8 = 8;

    /// 8N1 at the given rate.
    #[must_use]
    pub const fn new(baud_rate: u32) -> Self {
        Self {
            baud_rate,
            parity: Parity::None,
            stop_bits: StopBits::One,
        }
    }

    #[must_use]
    pub const fn with_parity(mut self, parity: Parity) -> Self {
        self.parity = parity;
        self
    }

    #[must_use]
    pub const fn with_stop_bits(mut self, stop_bits: StopBits) -> Self {
        self.stop_bits = stop_bits;
        self
    }

    /// Frame width needed to carry 8 data bits.
    ///
    /// The parity bit occupies the most significant frame bit, so any parity
    /// mode widens the frame to 9 bits.
    #[inline]
    #[must_use]
    pub const fn word_length(&self) -> WordLength {
        if self.parity.is_enabled() {
            WordLength::Nine
        } else {
            WordLength::Eight
        }
    }
}

impl TryFrom<LineCoding> for LinkConfig {
    type Error = Fault;

    /// Validate a host request. Nothing is applied unless every field is
    /// supported.
    fn try_from(coding: LineCoding) -> Result<Self, Self::Error> {
        if coding.bit_rate == 0 {
            return Err(Fault::ZeroBaudRate);
        }
        if coding.data_bits != Self::DATA_BITS {
            return Err(Fault::UnsupportedDataBits(coding.data_bits));
        }

        Ok(Self {
            baud_rate: coding.bit_rate,
            parity: Parity::try_from(coding.parity)?,
            stop_bits: StopBits::try_from(coding.stop_bits)?,
        })
    }
}

/// DTR/RTS control lines as last set by the host.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LineState {
    pub dtr: bool,
    pub rts: bool,
}

impl LineState {
    #[must_use]
    pub const fn new(dtr: bool, rts: bool) -> Self {
        Self { dtr, rts }
    }
}

/// Indicator brightness.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Level {
    #[default]
    Idle,
    Full,
}

/// Enable bits of the two data-direction interrupt sources.
///
/// `tx_enabled` gates the transmit-ready interrupt (host to wire),
/// `rx_enabled` gates the receive-ready interrupt (wire to host).
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FlowState {
    pub tx_enabled: bool,
    pub rx_enabled: bool,
}

impl FlowState {
    /// Both directions armed.
    pub const ARMED: Self = Self {
        tx_enabled: true,
        rx_enabled: true,
    };

    /// Both directions paused.
    pub const DISARMED: Self = Self {
        tx_enabled: false,
        rx_enabled: false,
    };
}

/// Snapshot of the UART status register, reduced to the conditions the
/// bridge services.
///
/// # Example
///
/// ```
/// use cdc_bridge_core::UartStatus;
///
/// let status = UartStatus::TX_READY | UartStatus::RX_TIMEOUT;
/// assert!(status.contains(UartStatus::TX_READY));
/// assert!(!status.contains(UartStatus::OVERRUN));
/// ```
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UartStatus(pub u8);

impl UartStatus {
    /// Transmit data register empty.
    pub const TX_READY: Self = Self(1 << 0);
    /// Receive data register holds a byte.
    pub const RX_READY: Self = Self(1 << 1);
    /// Receive line idle for the configured number of bit times.
    pub const RX_TIMEOUT: Self = Self(1 << 2);
    /// A byte arrived before the previous one was read.
    pub const OVERRUN: Self = Self(1 << 3);

    /// No condition pending.
    pub const NONE: Self = Self(0);

    #[inline]
    #[must_use]
    pub const fn contains(self, flag: UartStatus) -> bool {
        (self.0 & flag.0) == flag.0
    }

    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for UartStatus {
    type Output = Self;

    #[inline]
    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}
