//! Simulated peripherals for unit tests.

extern crate std;

use core::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::vec::Vec;

use crate::peripheral::{CdcPort, ControlOutputs, Indicator, Ptt, UartPeripheral};
use crate::types::{FlowState, Level, Parity, StopBits, UartStatus, WordLength};

/// 72 MHz, the USART kernel clock of the reference board.
pub const MOCK_CLOCK_HZ: u32 = 72_000_000;

/// 16-bit baud rate register.
pub const MOCK_MAX_DIVISOR: u32 = 0xFFFF;

/// One register access, in call order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UartOp {
    Enable,
    Disable,
    BaudDivisor(u32),
    Frame(WordLength, Parity),
    StopBits(StopBits),
    Interrupts(FlowState),
    ReceiverTimeout(u32),
    ClearTimeout,
    ClearOverrun,
    Read(u8),
    Write(u8),
}

/// Configuration-relevant register contents.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MockRegisters {
    pub enabled: bool,
    pub divisor: u32,
    pub word_length: WordLength,
    pub parity: Parity,
    pub stop_bits: StopBits,
    pub interrupts: FlowState,
    pub receiver_timeout: Option<u32>,
}

/// Simulated UART with a register access log.
pub struct MockUart {
    status: Cell<UartStatus>,
    rx_data: RefCell<VecDeque<u8>>,
    regs: Cell<MockRegisters>,
    ops: RefCell<Vec<UartOp>>,
}

impl MockUart {
    pub fn new() -> Self {
        Self {
            status: Cell::new(UartStatus::NONE),
            rx_data: RefCell::new(VecDeque::new()),
            regs: Cell::new(MockRegisters {
                enabled: false,
                divisor: 0,
                word_length: WordLength::Eight,
                parity: Parity::None,
                stop_bits: StopBits::One,
                interrupts: FlowState::DISARMED,
                receiver_timeout: None,
            }),
            ops: RefCell::new(Vec::new()),
        }
    }

    /// Set the status snapshot the next `status()` call returns.
    pub fn raise(&self, status: UartStatus) {
        self.status.set(status);
    }

    /// Queue a byte in the receive data register.
    pub fn push_rx(&self, byte: u8) {
        self.rx_data.borrow_mut().push_back(byte);
    }

    pub fn rx_pending(&self) -> usize {
        self.rx_data.borrow().len()
    }

    pub fn registers(&self) -> MockRegisters {
        self.regs.get()
    }

    pub fn ops(&self) -> Vec<UartOp> {
        self.ops.borrow().clone()
    }

    pub fn clear_ops(&self) {
        self.ops.borrow_mut().clear();
    }

    /// Bytes loaded into the transmit data register, in order.
    pub fn sent(&self) -> Vec<u8> {
        self.ops
            .borrow()
            .iter()
            .filter_map(|op| match op {
                UartOp::Write(b) => Some(*b),
                _ => None,
            })
            .collect()
    }

    fn log(&self, op: UartOp) {
        self.ops.borrow_mut().push(op);
    }

    fn update(&self, f: impl FnOnce(&mut MockRegisters)) {
        let mut regs = self.regs.get();
        f(&mut regs);
        self.regs.set(regs);
    }
}

impl UartPeripheral for MockUart {
    fn clock_hz(&self) -> u32 {
        MOCK_CLOCK_HZ
    }

    fn max_baud_divisor(&self) -> u32 {
        MOCK_MAX_DIVISOR
    }

    fn status(&self) -> UartStatus {
        self.status.get()
    }

    fn read_data(&self) -> u8 {
        let byte = self.rx_data.borrow_mut().pop_front().unwrap_or(0);
        self.log(UartOp::Read(byte));
        byte
    }

    fn write_data(&self, byte: u8) {
        self.log(UartOp::Write(byte));
    }

    fn clear_receiver_timeout(&self) {
        self.log(UartOp::ClearTimeout);
    }

    fn clear_overrun(&self) {
        self.log(UartOp::ClearOverrun);
    }

    fn interrupts(&self) -> FlowState {
        self.regs.get().interrupts
    }

    fn set_interrupts(&self, state: FlowState) {
        self.log(UartOp::Interrupts(state));
        self.update(|r| r.interrupts = state);
    }

    fn enable(&self) {
        self.log(UartOp::Enable);
        self.update(|r| r.enabled = true);
    }

    fn disable(&self) {
        self.log(UartOp::Disable);
        self.update(|r| r.enabled = false);
    }

    fn set_baud_divisor(&self, divisor: u32) {
        self.log(UartOp::BaudDivisor(divisor));
        self.update(|r| r.divisor = divisor);
    }

    fn set_frame(&self, word_length: WordLength, parity: Parity) {
        self.log(UartOp::Frame(word_length, parity));
        self.update(|r| {
            r.word_length = word_length;
            r.parity = parity;
        });
    }

    fn set_stop_bits(&self, stop_bits: StopBits) {
        self.log(UartOp::StopBits(stop_bits));
        self.update(|r| r.stop_bits = stop_bits);
    }

    fn enable_receiver_timeout(&self, bit_times: u32) {
        self.log(UartOp::ReceiverTimeout(bit_times));
        self.update(|r| r.receiver_timeout = Some(bit_times));
    }
}

/// Simulated CDC FIFOs.
pub struct MockCdc {
    /// Host to wire.
    rx: RefCell<VecDeque<u8>>,
    /// Wire to host.
    tx: RefCell<Vec<u8>>,
    tx_capacity: Cell<usize>,
    flushes: Cell<usize>,
    /// Report one byte available even when empty.
    phantom_data: Cell<bool>,
    /// Report free space but refuse every write.
    refuse_writes: Cell<bool>,
}

impl MockCdc {
    pub fn new(tx_capacity: usize) -> Self {
        Self {
            rx: RefCell::new(VecDeque::new()),
            tx: RefCell::new(Vec::new()),
            tx_capacity: Cell::new(tx_capacity),
            flushes: Cell::new(0),
            phantom_data: Cell::new(false),
            refuse_writes: Cell::new(false),
        }
    }

    /// Queue bytes as if received from the host.
    pub fn host_sends(&self, data: &[u8]) {
        self.rx.borrow_mut().extend(data.iter().copied());
    }

    /// Bytes queued towards the host.
    pub fn to_host(&self) -> Vec<u8> {
        self.tx.borrow().clone()
    }

    /// Simulate the host draining the IN buffer.
    pub fn host_drains(&self) -> Vec<u8> {
        core::mem::take(&mut *self.tx.borrow_mut())
    }

    pub fn from_host_pending(&self) -> usize {
        self.rx.borrow().len()
    }

    pub fn flushes(&self) -> usize {
        self.flushes.get()
    }

    pub fn set_phantom_data(&self, on: bool) {
        self.phantom_data.set(on);
    }

    pub fn set_refuse_writes(&self, on: bool) {
        self.refuse_writes.set(on);
    }
}

impl CdcPort for MockCdc {
    fn available(&self, _interface: u8) -> usize {
        let len = self.rx.borrow().len();
        if len == 0 && self.phantom_data.get() {
            1
        } else {
            len
        }
    }

    fn write_available(&self, _interface: u8) -> usize {
        self.tx_capacity
            .get()
            .saturating_sub(self.tx.borrow().len())
    }

    fn read_byte(&self, _interface: u8) -> Option<u8> {
        self.rx.borrow_mut().pop_front()
    }

    fn write_byte(&self, interface: u8, byte: u8) -> bool {
        if self.refuse_writes.get() || self.write_available(interface) == 0 {
            return false;
        }
        self.tx.borrow_mut().push(byte);
        true
    }

    fn flush(&self, _interface: u8) {
        self.flushes.set(self.flushes.get() + 1);
    }
}

/// Recording PTT lines and indicators.
pub struct MockOutputs {
    ptt: Cell<[bool; 2]>,
    indicators: Cell<[Level; 2]>,
    writes: Cell<usize>,
}

impl MockOutputs {
    pub fn new() -> Self {
        Self {
            // Start from a state no projection produces, so tests see every write.
            ptt: Cell::new([true, true]),
            indicators: Cell::new([Level::Full, Level::Full]),
            writes: Cell::new(0),
        }
    }

    pub fn ptt(&self, ptt: Ptt) -> bool {
        self.ptt.get()[ptt as usize]
    }

    pub fn indicator(&self, indicator: Indicator) -> Level {
        self.indicators.get()[indicator as usize]
    }

    pub fn writes(&self) -> usize {
        self.writes.get()
    }
}

impl ControlOutputs for MockOutputs {
    fn set_ptt(&self, ptt: Ptt, asserted: bool) {
        let mut lines = self.ptt.get();
        lines[ptt as usize] = asserted;
        self.ptt.set(lines);
        self.writes.set(self.writes.get() + 1);
    }

    fn set_indicator(&self, indicator: Indicator, level: Level) {
        let mut levels = self.indicators.get();
        levels[indicator as usize] = level;
        self.indicators.set(levels);
        self.writes.set(self.writes.get() + 1);
    }
}
