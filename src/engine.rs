//! DMA Engine Adapter: programs the DMA channel and drives the
//! interrupt-completion state machine idle -> armed -> (refilling ->
//! armed)* -> completing -> idle.
//!
//! Grounded in `SpiDueDriver.cpp`'s `sendChain`/`nextDMA` (channel
//! programming and the completion check) and `Adafruit_RA8875_Due.cpp`'s
//! `onDMAInterrupt` (the SPI-shifter flush performed before the
//! completion decision). The three function-pointer calls `nextDMA` made
//! (`is_complete`, `fetch_next_batch`, `on_complete`) are replaced here by
//! direct calls into [`crate::operation`] and [`crate::planner`].

use crate::config::DriverConfig;
use crate::descriptor::Descriptor;
use crate::error::RingResult;
use crate::hal::{DelayNs, DmaChannel, SpiBus};
use crate::operation::OperationState;
use crate::planner;
use crate::ring::DescriptorRing;

/// Where the engine is in the arm/refill/complete cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EngineState {
    /// No chain programmed; the channel is disabled.
    #[default]
    Idle,
    /// A chain is programmed and the channel is running.
    Armed,
    /// Inside the interrupt handler, building the next batch before
    /// re-arming. Never observed outside [`Engine::service_interrupt`].
    Refilling,
    /// Inside the interrupt handler, running the operation's completion
    /// callback before returning to idle.
    Completing,
}

/// Drives one DMA channel through the arm/refill/complete cycle.
///
/// Holds no descriptor or operation state itself — those live in the
/// caller's [`DescriptorRing`] and [`OperationState`] — only the current
/// phase of the cycle, for diagnostics and to guard against re-arming
/// from the wrong state.
#[derive(Debug, Default)]
pub struct Engine {
    state: EngineState,
}

impl Engine {
    /// A new engine, idle.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: EngineState::Idle,
        }
    }

    /// Current phase.
    #[must_use]
    pub const fn state(&self) -> EngineState {
        self.state
    }

    /// Programs `dma` with `head` and starts it, mirroring `sendChain`:
    /// disable, point `DSCR`/next-descriptor at the chain head, set
    /// incrementing-source/fixed-destination flow control, enable the
    /// completion interrupt, enable the channel.
    pub fn arm<D: DmaChannel>(&mut self, dma: &mut D, head: *const Descriptor) {
        dma.disable();
        dma.set_next_descriptor(head as u32);
        dma.configure_memory_to_peripheral();
        dma.enable_interrupt();
        dma.enable();
        self.state = EngineState::Armed;
    }

    /// Services one end-of-chain interrupt.
    ///
    /// Returns `Ok(false)` if the interrupt did not belong to this
    /// channel (spurious) or if it refilled and re-armed for another
    /// batch; returns `Ok(true)` once the operation's last batch has
    /// drained and its completion callback has run.
    ///
    /// # Errors
    /// Returns [`crate::error::RingError::Full`] if the planner cannot
    /// refill the ring (a caller bug: the ring's const generics must
    /// match `config`).
    pub fn service_interrupt<D, S, const CAP_FRAMES: usize, const CAP_BYTES: usize>(
        &mut self,
        dma: &mut D,
        spi: &mut S,
        ring: &mut DescriptorRing<CAP_FRAMES, CAP_BYTES>,
        op_state: &mut OperationState,
        config: &DriverConfig,
    ) -> RingResult<bool>
    where
        D: DmaChannel,
        S: SpiBus,
    {
        if !dma.take_interrupt_status() {
            return Ok(false);
        }

        flush_spi(spi);

        if op_state.is_complete() {
            self.state = EngineState::Completing;
            dma.disable_interrupt();
            dma.disable();
            op_state.complete(ring.storage_idx());
            self.state = EngineState::Idle;
            Ok(true)
        } else {
            self.state = EngineState::Refilling;
            let head = planner::refill(ring, op_state, config)?;
            self.arm(dma, head);
            Ok(false)
        }
    }
}

/// Drains the SPI shifter the way `onDMAInterrupt` does before trusting
/// the chain has actually finished: wait for the transmit FIFO to empty,
/// then read away any byte left in the receive-data register (clearing
/// overrun along with it). The core never uses received data, so nothing
/// is returned.
fn flush_spi<S: SpiBus>(spi: &mut S) {
    while !spi.transmit_empty() {}
    while spi.receive_ready() || spi.overrun() {
        let _ = spi.read_data();
    }
}

/// Polls `dma.transfer_done()` until it is true or `timeout_ms`
/// milliseconds have elapsed.
///
/// The original's equivalent loops (`while
/// (!dmac_channel_transfer_done(...))` in `SpiDriver::send`/`receive`)
/// never time out and can hang forever against a wedged controller; this
/// is the bounded replacement, used by the synchronous path (§4.6).
pub fn poll_until_done<D: DmaChannel, T: DelayNs>(
    dma: &D,
    delay: &mut T,
    timeout_ms: u32,
) -> bool {
    let mut waited_ms = 0u32;
    while !dma.transfer_done() {
        if waited_ms >= timeout_ms {
            return false;
        }
        delay.delay_ms(1);
        waited_ms += 1;
    }
    true
}
