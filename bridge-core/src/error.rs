//! Unrecoverable bridge faults.

/// A condition the bridge cannot recover from on its own.
///
/// The bridge has no retransmission or sequencing, so none of these are
/// retried. The surrounding runtime decides whether to halt, reset or report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Fault {
    /// UART receive overrun: a byte was lost before it could be read.
    Overrun,
    /// Host requested a character width other than 8 bits.
    UnsupportedDataBits(u8),
    /// Host requested mark, space or an unknown parity code.
    UnsupportedParity(u8),
    /// Host requested an unknown stop-bit code.
    UnsupportedStopBits(u8),
    /// Host requested a bit rate of zero.
    ZeroBaudRate,
    /// Host requested a bit rate too slow for the baud rate register.
    BaudRateTooLow(u32),
    /// CDC port reported data available but yielded no byte.
    CdcReadEmpty,
    /// CDC port reported free space but refused the byte.
    CdcWriteFull,
}

impl Fault {
    /// Whether wire data has already been lost.
    #[inline]
    #[must_use]
    pub const fn is_data_loss(self) -> bool {
        matches!(self, Fault::Overrun)
    }

    /// Whether the host asked for a line coding outside the advertised set.
    #[inline]
    #[must_use]
    pub const fn is_unsupported_coding(self) -> bool {
        matches!(
            self,
            Fault::UnsupportedDataBits(_)
                | Fault::UnsupportedParity(_)
                | Fault::UnsupportedStopBits(_)
                | Fault::ZeroBaudRate
                | Fault::BaudRateTooLow(_)
        )
    }
}
