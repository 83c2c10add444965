//! Peripheral configuration: defaults, baud divisor and line-coding
//! application.

use crate::error::Fault;
use crate::peripheral::UartPeripheral;
use crate::types::LinkConfig;

/// Baud rate the link starts at before the host sends a line coding.
pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// Idle bit times on the receive line before a partial USB packet is flushed.
pub const RECEIVER_TIMEOUT_BITS: u32 = 20;

/// CDC interface number the bridge serves.
pub const CDC_INTERFACE: u8 = 0;

/// Static configuration of a [`SerialBridge`](crate::SerialBridge).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BridgeConfig {
    /// CDC interface whose events are handled; others are ignored.
    pub interface: u8,
    /// Link configuration applied by `init`.
    pub default_link: LinkConfig,
    /// Receiver timeout in bit times.
    pub receiver_timeout_bits: u32,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            interface: CDC_INTERFACE,
            default_link: LinkConfig::new(DEFAULT_BAUD_RATE),
            receiver_timeout_bits: RECEIVER_TIMEOUT_BITS,
        }
    }
}

/// Baud rate divisor for a peripheral clocked at `clock_hz`, rounded to the
/// nearest integer.
///
/// # Example
///
/// ```
/// use cdc_bridge_core::baud_divisor;
///
/// assert_eq!(baud_divisor(72_000_000, 115_200), Ok(625));
/// assert_eq!(baud_divisor(8_000_000, 115_200), Ok(69));
/// ```
pub fn baud_divisor(clock_hz: u32, baud_rate: u32) -> Result<u32, Fault> {
    if baud_rate == 0 {
        return Err(Fault::ZeroBaudRate);
    }
    let clock = u64::from(clock_hz);
    let baud = u64::from(baud_rate);
    // Quotient never exceeds clock_hz, so it fits back into u32.
    Ok(((clock + baud / 2) / baud) as u32)
}

/// Reprogram framing and baud rate.
///
/// The peripheral is disabled for the whole sequence and re-enabled at the
/// end. Interrupt enable bits are left untouched. A rate whose divisor does
/// not fit the register is rejected before anything is written.
pub fn apply_link<U: UartPeripheral>(uart: &U, link: &LinkConfig) -> Result<(), Fault> {
    let divisor = baud_divisor(uart.clock_hz(), link.baud_rate)?;
    if divisor > uart.max_baud_divisor() {
        return Err(Fault::BaudRateTooLow(link.baud_rate));
    }

    uart.disable();
    uart.set_baud_divisor(divisor);
    uart.set_frame(link.word_length(), link.parity);
    uart.set_stop_bits(link.stop_bits);
    uart.enable();

    debug!(
        "link: {} baud, divisor {}, parity {}, stop bits {}",
        link.baud_rate, divisor, link.parity, link.stop_bits
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockUart, UartOp, MOCK_CLOCK_HZ};
    use crate::types::{FlowState, Parity, StopBits, WordLength};

    #[test]
    fn test_divisor_exact() {
        assert_eq!(baud_divisor(72_000_000, 115_200), Ok(625));
        assert_eq!(baud_divisor(72_000_000, 9600), Ok(7500));
    }

    #[test]
    fn test_divisor_rounds_to_nearest() {
        // 72e6 / 230400 = 312.5 -> 313
        assert_eq!(baud_divisor(72_000_000, 230_400), Ok(313));
        // 48e6 / 115200 = 416.67 -> 417
        assert_eq!(baud_divisor(48_000_000, 115_200), Ok(417));
        // 48e6 / 921600 = 52.08 -> 52
        assert_eq!(baud_divisor(48_000_000, 921_600), Ok(52));
    }

    #[test]
    fn test_divisor_zero_rate() {
        assert_eq!(baud_divisor(72_000_000, 0), Err(Fault::ZeroBaudRate));
    }

    #[test]
    fn test_divisor_no_overflow_near_u32_max() {
        assert_eq!(baud_divisor(u32::MAX, 1), Ok(u32::MAX));
        assert_eq!(baud_divisor(u32::MAX, u32::MAX), Ok(1));
    }

    #[test]
    fn test_default_config() {
        let config = BridgeConfig::default();
        assert_eq!(config.interface, CDC_INTERFACE);
        assert_eq!(config.default_link, LinkConfig::new(DEFAULT_BAUD_RATE));
        assert_eq!(config.receiver_timeout_bits, RECEIVER_TIMEOUT_BITS);
    }

    #[test]
    fn test_apply_link_order() {
        let uart = MockUart::new();
        let link = LinkConfig::new(9600);
        apply_link(&uart, &link).unwrap();

        assert_eq!(
            uart.ops(),
            [
                UartOp::Disable,
                UartOp::BaudDivisor(MOCK_CLOCK_HZ / 9600),
                UartOp::Frame(WordLength::Eight, Parity::None),
                UartOp::StopBits(StopBits::One),
                UartOp::Enable,
            ]
        );
    }

    #[test]
    fn test_apply_link_keeps_interrupts() {
        let uart = MockUart::new();
        uart.set_interrupts(FlowState {
            tx_enabled: false,
            rx_enabled: true,
        });
        uart.clear_ops();

        apply_link(&uart, &LinkConfig::new(19_200).with_parity(Parity::Odd)).unwrap();

        assert!(!uart
            .ops()
            .iter()
            .any(|op| matches!(op, UartOp::Interrupts(_))));
        assert_eq!(
            uart.registers().interrupts,
            FlowState {
                tx_enabled: false,
                rx_enabled: true
            }
        );
    }

    #[test]
    fn test_apply_link_rejects_divisor_overflow() {
        let uart = MockUart::new();
        // 72e6 / 1000 = 72000 does not fit 16 bits.
        assert_eq!(
            apply_link(&uart, &LinkConfig::new(1000)),
            Err(Fault::BaudRateTooLow(1000))
        );
        assert!(uart.ops().is_empty());

        // 72e6 / 1100 = 65455 still fits.
        apply_link(&uart, &LinkConfig::new(1100)).unwrap();
        assert_eq!(uart.registers().divisor, 65_455);
    }

    #[test]
    fn test_apply_link_twice_is_idempotent() {
        let uart = MockUart::new();
        let link = LinkConfig::new(38_400)
            .with_parity(Parity::Even)
            .with_stop_bits(StopBits::Two);

        apply_link(&uart, &link).unwrap();
        let once = uart.registers();
        apply_link(&uart, &link).unwrap();
        assert_eq!(uart.registers(), once);
        assert_eq!(once.word_length, WordLength::Nine);
        assert!(once.enabled);
    }
}
