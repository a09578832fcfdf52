//! Mock implementations of the HAL traits, for testing the planner and
//! engine state machine on the host without hardware.
//!
//! Modeled on `test_utils.rs`'s `MockMdioBus`: `RefCell`-backed state so
//! the mocks can be shared behind `&self` the way the real peripherals
//! are (volatile registers don't need `&mut` to be poked).

#![cfg(test)]
#![allow(missing_docs)]

extern crate std;

use core::cell::RefCell;
use std::vec::Vec;

use crate::hal::{ChipSelectPin, DelayNs, DmaChannel, SpiBus};

/// Mock SPI peripheral. `write_data` pushes onto a log; `read_data` pops
/// from a pre-seeded receive queue (default 0xFF, mirroring the
/// controller's idle shift-register contents).
#[derive(Debug, Default)]
pub struct MockSpiBus {
    written: RefCell<Vec<u8>>,
    rx_queue: RefCell<Vec<u8>>,
    transmit_empty: RefCell<bool>,
    receive_ready: RefCell<bool>,
    overrun: RefCell<bool>,
}

impl MockSpiBus {
    pub fn new() -> Self {
        Self {
            transmit_empty: RefCell::new(true),
            ..Self::default()
        }
    }

    pub fn written(&self) -> Vec<u8> {
        self.written.borrow().clone()
    }

    pub fn set_transmit_empty(&self, value: bool) {
        *self.transmit_empty.borrow_mut() = value;
    }

    pub fn set_receive_ready(&self, value: bool) {
        *self.receive_ready.borrow_mut() = value;
    }

    pub fn set_overrun(&self, value: bool) {
        *self.overrun.borrow_mut() = value;
    }

    /// Queues a byte to be returned by a future `read_data`, for tests
    /// that drive the synchronous register protocol (write then read back
    /// a shifted-in value).
    pub fn push_rx(&self, byte: u8) {
        self.rx_queue.borrow_mut().push(byte);
        *self.receive_ready.borrow_mut() = true;
    }
}

impl SpiBus for MockSpiBus {
    fn write_data(&mut self, byte: u8) {
        self.written.borrow_mut().push(byte);
        // A real shifter becomes ready the instant the write completes;
        // the synchronous register protocol in `driver.rs` spins on
        // `receive_ready` right after every `write_data`.
        *self.receive_ready.borrow_mut() = true;
    }

    fn read_data(&mut self) -> u8 {
        if self.rx_queue.borrow().is_empty() {
            *self.receive_ready.borrow_mut() = false;
            *self.overrun.borrow_mut() = false;
            return 0xFF;
        }
        let byte = self.rx_queue.borrow_mut().remove(0);
        if self.rx_queue.borrow().is_empty() {
            *self.receive_ready.borrow_mut() = false;
        }
        byte
    }

    fn transmit_empty(&self) -> bool {
        *self.transmit_empty.borrow()
    }

    fn receive_ready(&self) -> bool {
        *self.receive_ready.borrow()
    }

    fn overrun(&self) -> bool {
        *self.overrun.borrow()
    }

    fn transmit_data_address(&self) -> u32 {
        0x4000_0000
    }

    fn receive_data_address(&self) -> u32 {
        0x4000_0004
    }
}

/// Mock chip-select pin. Tracks the sequence of `set_high`/`set_low`
/// calls so tests can assert on assert/de-assert ordering.
#[derive(Debug)]
pub struct MockChipSelectPin {
    state_log: RefCell<Vec<bool>>,
    mask_addr: u32,
    set_register_address: u32,
    clear_register_address: u32,
}

impl MockChipSelectPin {
    pub fn new() -> Self {
        Self {
            state_log: RefCell::new(Vec::new()),
            mask_addr: 0x5000_0000,
            set_register_address: 0x5000_0010,
            clear_register_address: 0x5000_0014,
        }
    }

    pub fn state_log(&self) -> Vec<bool> {
        self.state_log.borrow().clone()
    }
}

impl Default for MockChipSelectPin {
    fn default() -> Self {
        Self::new()
    }
}

impl ChipSelectPin for MockChipSelectPin {
    fn set_high(&mut self) {
        self.state_log.borrow_mut().push(true);
    }

    fn set_low(&mut self) {
        self.state_log.borrow_mut().push(false);
    }

    fn mask_addr(&self) -> u32 {
        self.mask_addr
    }

    fn set_register_address(&self) -> u32 {
        self.set_register_address
    }

    fn clear_register_address(&self) -> u32 {
        self.clear_register_address
    }
}

/// Mock DMA channel. `transfer_done`/`take_interrupt_status` are driven
/// by test code via `set_transfer_done`/`raise_interrupt` to simulate the
/// hardware completing a chain.
#[derive(Debug, Default)]
pub struct MockDmaChannel {
    enabled: RefCell<bool>,
    interrupt_enabled: RefCell<bool>,
    next_descriptor: RefCell<u32>,
    interrupt_pending: RefCell<bool>,
    transfer_done: RefCell<bool>,
    configure_calls: RefCell<u32>,
}

impl MockDmaChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self) -> bool {
        *self.enabled.borrow()
    }

    pub fn next_descriptor(&self) -> u32 {
        *self.next_descriptor.borrow()
    }

    pub fn raise_interrupt(&self) {
        *self.interrupt_pending.borrow_mut() = true;
    }

    pub fn set_transfer_done(&self, done: bool) {
        *self.transfer_done.borrow_mut() = done;
    }

    pub fn configure_calls(&self) -> u32 {
        *self.configure_calls.borrow()
    }
}

impl DmaChannel for MockDmaChannel {
    fn disable(&mut self) {
        *self.enabled.borrow_mut() = false;
    }

    fn enable(&mut self) {
        *self.enabled.borrow_mut() = true;
    }

    fn set_next_descriptor(&mut self, addr: u32) {
        *self.next_descriptor.borrow_mut() = addr;
    }

    fn configure_memory_to_peripheral(&mut self) {
        *self.configure_calls.borrow_mut() += 1;
    }

    fn enable_interrupt(&mut self) {
        *self.interrupt_enabled.borrow_mut() = true;
    }

    fn disable_interrupt(&mut self) {
        *self.interrupt_enabled.borrow_mut() = false;
    }

    fn take_interrupt_status(&mut self) -> bool {
        let pending = *self.interrupt_pending.borrow();
        *self.interrupt_pending.borrow_mut() = false;
        pending
    }

    fn transfer_done(&self) -> bool {
        *self.transfer_done.borrow()
    }
}

/// Mock delay. Records elapsed milliseconds without actually waiting, and
/// can be told to make `transfer_done` true after a given number of
/// calls, to exercise [`crate::engine::poll_until_done`]'s timeout path.
#[derive(Debug, Default)]
pub struct MockDelay {
    total_ms: RefCell<u32>,
}

impl MockDelay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total_ms(&self) -> u32 {
        *self.total_ms.borrow()
    }
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        *self.total_ms.borrow_mut() += ns / 1_000_000;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_spi_bus_logs_writes() {
        let mut spi = MockSpiBus::new();
        spi.write_data(0x80);
        spi.write_data(0x46);
        assert_eq!(spi.written(), [0x80, 0x46]);
    }

    #[test]
    fn mock_spi_bus_read_defaults_to_fill_byte() {
        let mut spi = MockSpiBus::new();
        assert_eq!(spi.read_data(), 0xFF);
    }

    #[test]
    fn mock_cs_pin_logs_transitions() {
        let mut cs = MockChipSelectPin::new();
        cs.set_low();
        cs.set_high();
        assert_eq!(cs.state_log(), [false, true]);
    }

    #[test]
    fn mock_dma_channel_tracks_enable_state() {
        let mut dma = MockDmaChannel::new();
        assert!(!dma.is_enabled());
        dma.enable();
        assert!(dma.is_enabled());
        dma.disable();
        assert!(!dma.is_enabled());
    }

    #[test]
    fn mock_dma_channel_interrupt_status_clears_on_take() {
        let mut dma = MockDmaChannel::new();
        assert!(!dma.take_interrupt_status());
        dma.raise_interrupt();
        assert!(dma.take_interrupt_status());
        assert!(!dma.take_interrupt_status());
    }

    #[test]
    fn mock_delay_accumulates_ms() {
        let mut delay = MockDelay::new();
        delay.delay_ms(5);
        delay.delay_ms(3);
        assert_eq!(delay.total_ms(), 8);
    }
}
