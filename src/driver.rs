//! Top-level driver facade: owns the SPI peripheral, chip-select pin, DMA
//! channel, descriptor ring, and operation state, and exposes the
//! `draw_pixel_area` entry point plus the synchronous register-access path
//! every graphics-API call built on top of this crate would use.
//!
//! Grounded in `driver/emac.rs`'s facade shape (a single struct owning
//! the HAL handles, a const `new()`, and state accessors) and
//! `Adafruit_RA8875.cpp`'s `writeCommand`/`writeData`/`readData`/`readReg`
//! (the synchronous byte-at-a-time register protocol).

use crate::config::DriverConfig;
use crate::constants::{CMD_WRITE, DATA_READ, DATA_WRITE, DEVICE_ID, ID_REGISTER, MWCR0, MWCR0_DIR_MASK};
use crate::engine::{self, Engine, EngineState};
use crate::error::{Error, InitError, Result};
use crate::geometry;
use crate::hal::{ChipSelectPin, DelayNs, DmaChannel, SpiBus};
use crate::operation::{Callback, OperationState};
use crate::planner::{self, PlannerAddresses};
use crate::ring::DescriptorRing;

/// Owns every collaborator the DMA pixel-streaming core touches directly:
/// the SPI peripheral, the chip-select pin, the DMA channel, the
/// descriptor ring, and the in-progress operation's state.
///
/// # Type Parameters
/// * `S` - SPI peripheral handle
/// * `C` - chip-select pin handle
/// * `D` - DMA channel handle
/// * `CAP_FRAMES`/`CAP_BYTES` - descriptor ring capacity; must equal
///   `config.cap_frames()`/`config.cap_bytes()` for the `DriverConfig`
///   passed to [`Self::new`]
pub struct Ra8875Dma<S, C, D, const CAP_FRAMES: usize, const CAP_BYTES: usize>
where
    S: SpiBus,
    C: ChipSelectPin,
    D: DmaChannel,
{
    spi: S,
    cs: C,
    dma: D,
    engine: Engine,
    ring: DescriptorRing<CAP_FRAMES, CAP_BYTES>,
    op_state: OperationState,
    config: DriverConfig,
}

impl<S, C, D, const CAP_FRAMES: usize, const CAP_BYTES: usize>
    Ra8875Dma<S, C, D, CAP_FRAMES, CAP_BYTES>
where
    S: SpiBus,
    C: ChipSelectPin,
    D: DmaChannel,
{
    /// Takes ownership of the peripheral handles and a panel
    /// configuration. The ring starts empty; nothing is sent to the
    /// controller until a register write or `draw_pixel_area` call.
    #[must_use]
    pub const fn new(spi: S, cs: C, dma: D, config: DriverConfig) -> Self {
        Self {
            spi,
            cs,
            dma,
            engine: Engine::new(),
            ring: DescriptorRing::new(),
            op_state: OperationState::new(),
            config,
        }
    }

    /// Current phase of the DMA arm/refill/complete cycle.
    #[must_use]
    pub const fn engine_state(&self) -> EngineState {
        self.engine.state()
    }

    /// True while a `draw_pixel_area` operation is in progress.
    #[must_use]
    pub const fn is_busy(&self) -> bool {
        !matches!(self.engine.state(), EngineState::Idle)
    }

    /// Confirms the controller's identification register reads back
    /// [`DEVICE_ID`], the one bring-up check within this core's scope
    /// (PLL and display-timing programming are an external collaborator).
    ///
    /// # Errors
    /// Returns [`InitError::BadDeviceId`] if the register does not read
    /// back the expected value.
    pub fn verify_device_id(&mut self) -> Result<()> {
        let id = self.read_register(ID_REGISTER);
        if id == DEVICE_ID {
            Ok(())
        } else {
            Err(Error::Init(InitError::BadDeviceId(id)))
        }
    }

    /// One synchronous byte: write it, wait for the shifted-in byte to be
    /// ready, and return it. Mirrors `SPI.transfer()` in the byte-at-a-time
    /// register protocol (§4.6).
    fn transfer_byte(&mut self, byte: u8) -> u8 {
        self.spi.write_data(byte);
        while !self.spi.receive_ready() {}
        self.spi.read_data()
    }

    /// Selects a register for a following `write_data_byte`/`read_data_byte`.
    fn write_command(&mut self, reg: u8) {
        self.cs.set_low();
        self.transfer_byte(CMD_WRITE);
        self.transfer_byte(reg);
        self.cs.set_high();
    }

    /// Writes one data byte to the register last selected by
    /// `write_command`.
    fn write_data_byte(&mut self, value: u8) {
        self.cs.set_low();
        self.transfer_byte(DATA_WRITE);
        self.transfer_byte(value);
        self.cs.set_high();
    }

    /// Reads one data byte from the register last selected by
    /// `write_command`.
    fn read_data_byte(&mut self) -> u8 {
        self.cs.set_low();
        self.transfer_byte(DATA_READ);
        let value = self.transfer_byte(0x00);
        self.cs.set_high();
        value
    }

    /// Writes a single register: `write_command` then `write_data_byte`.
    pub fn write_register(&mut self, reg: u8, value: u8) {
        self.write_command(reg);
        self.write_data_byte(value);
    }

    /// Reads a single register: `write_command` then `read_data_byte`.
    pub fn read_register(&mut self, reg: u8) -> u8 {
        self.write_command(reg);
        self.read_data_byte()
    }

    fn planner_addresses(&self) -> PlannerAddresses {
        PlannerAddresses {
            cs_mask_addr: self.cs.mask_addr(),
            cs_set_addr: self.cs.set_register_address(),
            cs_clear_addr: self.cs.clear_register_address(),
            spi_transmit_addr: self.spi.transmit_data_address(),
        }
    }

    /// Streams a rectangular pixel region starting at logical `(x, y)`,
    /// `width` pixels wide, `num` pixels total (row-major, 16 bits per
    /// pixel, already resident at `pixels_addr`). Rotation and `v_offset`
    /// are applied to `(x, y)` before planning; `callback`, if given, runs
    /// once the whole region has shipped, from inside the completion
    /// interrupt of the last batch.
    ///
    /// Returns once the first batch is armed; the remainder streams
    /// asynchronously. Call [`Self::service_interrupt`] from the DMA
    /// channel's completion interrupt to drive refills and completion.
    ///
    /// # Errors
    /// Returns a ring error if `CAP_FRAMES`/`CAP_BYTES` do not match the
    /// configuration this driver was constructed with.
    pub fn draw_pixel_area(
        &mut self,
        pixels_addr: u32,
        num: u32,
        x: i32,
        y: i32,
        width: u16,
        callback: Option<Callback>,
    ) -> Result<()> {
        let (px, py) = geometry::physical_point(
            x,
            y,
            self.config.width(),
            self.config.height(),
            self.config.rotation(),
            self.config.v_offset(),
        );
        self.op_state.callback = callback;
        let addrs = self.planner_addresses();
        let head = planner::start_draw_pixel_area(
            &mut self.ring,
            &mut self.op_state,
            &self.config,
            addrs,
            pixels_addr,
            num,
            px,
            py,
            width,
        )?;

        // Spec step 2: set the write-direction register once, synchronously,
        // before the engine starts streaming (S3: rotation 2 needs MWCR0
        // set to right-to-left, top-to-bottom).
        let current = self.read_register(MWCR0);
        let direction = geometry::write_direction_bits(self.config.rotation());
        self.write_register(MWCR0, (current & !MWCR0_DIR_MASK) | direction);

        self.engine.arm(&mut self.dma, head);
        Ok(())
    }

    /// Services one end-of-chain interrupt. Call this from the DMA
    /// channel's completion ISR; it is not re-entrant and must not run
    /// concurrently with itself or with [`Self::draw_pixel_area`].
    ///
    /// Returns `true` once the operation has fully drained and its
    /// completion callback, if any, has run.
    ///
    /// # Errors
    /// Returns a ring error if the planner cannot refill the ring (a
    /// configuration mismatch between `CAP_FRAMES`/`CAP_BYTES` and
    /// `DriverConfig`).
    pub fn service_interrupt(&mut self) -> Result<bool> {
        Ok(self.engine.service_interrupt(
            &mut self.dma,
            &mut self.spi,
            &mut self.ring,
            &mut self.op_state,
            &self.config,
        )?)
    }

    /// Blocks until the current DMA transfer reports complete or
    /// `dma_timeout_ms` elapses, for the short blocking multi-byte path of
    /// §4.6. Returns `false` on timeout.
    ///
    /// The original's equivalent loop never times out; see
    /// [`engine::poll_until_done`].
    pub fn poll_transfer_done<T: DelayNs>(&self, delay: &mut T) -> bool {
        engine::poll_until_done(&self.dma, delay, self.config.dma_timeout_ms())
    }
}

/// Descriptor ring sized for the recognized defaults (21 descriptors and
/// 19 working-storage bytes per line, 8 lines per batch): `168` frames,
/// `152` bytes. Matches [`DriverConfig::new`]'s defaults.
pub type Ra8875DmaDefault<S, C, D> = Ra8875Dma<S, C, D, 168, 152>;

#[cfg(test)]
impl<S, C, D, const CAP_FRAMES: usize, const CAP_BYTES: usize>
    Ra8875Dma<S, C, D, CAP_FRAMES, CAP_BYTES>
where
    S: SpiBus,
    C: ChipSelectPin,
    D: DmaChannel,
{
    pub(crate) fn spi(&self) -> &S {
        &self.spi
    }

    pub(crate) fn cs(&self) -> &C {
        &self.cs
    }

    pub(crate) fn dma(&self) -> &D {
        &self.dma
    }
}
