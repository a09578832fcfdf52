//! Batch Planner: fills the descriptor ring with as many rows of a pending
//! `draw_pixel_area` as fit, then hands the finalized chain to the caller
//! to arm.
//!
//! Grounded in `Adafruit_RA8875_Due.cpp`'s `drawPixelsAreaDMA` (operation
//! start, cold-vs-reuse decision) and `drawPixelsDMADelegateRows` (the
//! per-batch row patch, reusing row-template memory by direct offset
//! rather than rebuilding descriptors).
//!
//! Row layout within one `frames_per_line`-descriptor template (indices
//! fixed by the sequencing idiom in §4.3): CS-low(0), `CurH0` send(1),
//! dummy(2), CS-high(3); CS-low(4), `CurH1` send(5), dummy(6), CS-high(7);
//! CS-low(8), `CurV0` send(9), dummy(10), CS-high(11); CS-low(12), `CurV1`
//! send(13), dummy(14), CS-high(15); CS-low(16), pixel-prefix send(17),
//! pixel-block send(18), dummy(19), CS-high(20).

use crate::config::DriverConfig;
use crate::constants::CursorRegister;
use crate::descriptor::Descriptor;
use crate::error::RingResult;
use crate::frame_builder::{add_coord_bits, add_dummy, add_pin_toggle, add_spi_draw_pixels};
use crate::operation::{DrawAreaData, OperationKind, OperationState};
use crate::ring::DescriptorRing;

/// Descriptor offset, within a row template, of the pixel-block send
/// descriptor (the second of the two descriptors `add_spi_draw_pixels`
/// appends).
const PIXEL_DESCRIPTOR_OFFSET: usize = 18;
/// Descriptor offsets, within a row template, of the four coordinate-send
/// descriptors, in `CurH0, CurH1, CurV0, CurV1` order.
const COORD_DESCRIPTOR_OFFSETS: [usize; 4] = [1, 5, 9, 13];
/// Byte offset of `coordinate_byte` within a 4-byte coordinate-entry
/// record.
const COORDINATE_BYTE_OFFSET: usize = 3;

/// External addresses the planner needs to build and patch descriptors.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PlannerAddresses {
    /// Stable address of the chip-select pin's bitmask.
    pub cs_mask_addr: u32,
    /// PIO "set output" register for the chip-select pin.
    pub cs_set_addr: u32,
    /// PIO "clear output" register for the chip-select pin.
    pub cs_clear_addr: u32,
    /// SPI transmit-data register.
    pub spi_transmit_addr: u32,
}

fn build_row_skeleton<const CAP_FRAMES: usize, const CAP_BYTES: usize>(
    ring: &mut DescriptorRing<CAP_FRAMES, CAP_BYTES>,
    config: &DriverConfig,
    addrs: PlannerAddresses,
) -> RingResult<()> {
    for register in [
        CursorRegister::CurH0,
        CursorRegister::CurH1,
        CursorRegister::CurV0,
        CursorRegister::CurV1,
    ] {
        add_pin_toggle(
            ring,
            false,
            addrs.cs_mask_addr,
            addrs.cs_set_addr,
            addrs.cs_clear_addr,
            2,
        )?;
        add_coord_bits(ring, addrs.spi_transmit_addr, 0, register).map_err(|_| {
            crate::error::RingError::Full
        })?;
        add_dummy(ring, addrs.spi_transmit_addr, config.dummy_transfers())?;
        add_pin_toggle(
            ring,
            true,
            addrs.cs_mask_addr,
            addrs.cs_set_addr,
            addrs.cs_clear_addr,
            config.cs_high_transfers(),
        )?;
    }
    add_pin_toggle(
        ring,
        false,
        addrs.cs_mask_addr,
        addrs.cs_set_addr,
        addrs.cs_clear_addr,
        2,
    )?;
    add_spi_draw_pixels(ring, addrs.spi_transmit_addr, 0, 0).map_err(|_| {
        crate::error::RingError::Full
    })?;
    add_dummy(ring, addrs.spi_transmit_addr, config.dummy_transfers())?;
    add_pin_toggle(
        ring,
        true,
        addrs.cs_mask_addr,
        addrs.cs_set_addr,
        addrs.cs_clear_addr,
        config.cs_high_transfers(),
    )?;
    Ok(())
}

/// Builds the full `lines_per_batch`-row skeleton once, for a ring that
/// has no reusable row templates yet (cold build).
///
/// # Errors
/// Returns [`crate::error::RingError::Full`] if the ring's capacity does
/// not match `config` (a caller bug: `CAP_FRAMES` must equal
/// `config.cap_frames()`).
pub fn build_skeleton<const CAP_FRAMES: usize, const CAP_BYTES: usize>(
    ring: &mut DescriptorRing<CAP_FRAMES, CAP_BYTES>,
    config: &DriverConfig,
    addrs: PlannerAddresses,
) -> RingResult<()> {
    ring.clear_frames();
    for _ in 0..config.lines_per_batch() {
        build_row_skeleton(ring, config, addrs)?;
    }
    Ok(())
}

fn patch_row<const CAP_FRAMES: usize, const CAP_BYTES: usize>(
    ring: &mut DescriptorRing<CAP_FRAMES, CAP_BYTES>,
    config: &DriverConfig,
    row_in_batch: usize,
    x: i32,
    y_row: i32,
    pixel_addr: u32,
    byte_count: u16,
) {
    let storage_stride = config.working_data_per_line() as usize;
    let storage_base = row_in_batch * storage_stride;
    let coord_bytes = [
        (x as u16 & 0xFF) as u8,
        (x as u16 >> 8) as u8,
        (y_row as u16 & 0xFF) as u8,
        (y_row as u16 >> 8) as u8,
    ];
    for (i, byte) in coord_bytes.into_iter().enumerate() {
        ring.patch_working_byte(storage_base + i * 4 + COORDINATE_BYTE_OFFSET, byte);
    }

    let frame_stride = config.frames_per_line() as usize;
    let pixel_idx = row_in_batch * frame_stride + PIXEL_DESCRIPTOR_OFFSET;
    if let Some(descriptor) = ring.get_raw(pixel_idx) {
        descriptor.set_source_address(pixel_addr);
        descriptor.set_byte_count(byte_count);
    }
}

fn fill_batch<const CAP_FRAMES: usize, const CAP_BYTES: usize>(
    ring: &mut DescriptorRing<CAP_FRAMES, CAP_BYTES>,
    state: &mut OperationState,
    config: &DriverConfig,
) -> RingResult<usize> {
    ring.clear_frames();
    let lines_per_batch = config.lines_per_batch() as usize;
    let frame_stride = config.frames_per_line() as usize;
    let mut rows_in_batch = 0;
    while rows_in_batch < lines_per_batch && state.draw_area.remaining > 0 {
        let y_row = state.draw_area.y + i32::from(state.draw_area.rows_completed);
        let width = u32::from(state.draw_area.width);
        let to_transfer = state.draw_area.remaining.min(width);
        let pixel_addr = state.draw_area.pixels_addr
            + u32::from(state.draw_area.rows_completed) * width * 2;
        let byte_count = (to_transfer * 2) as u16;

        patch_row(
            ring,
            config,
            rows_in_batch,
            state.draw_area.x,
            y_row,
            pixel_addr,
            byte_count,
        );
        ring.increment_size(frame_stride)?;

        state.draw_area.remaining -= to_transfer;
        state.draw_area.rows_completed += 1;
        rows_in_batch += 1;
    }
    Ok(rows_in_batch)
}

/// Starts a new `draw_pixel_area` operation and fills its first batch.
///
/// Builds the row skeleton from scratch unless `config` allows reuse and
/// the previously completed operation was also `draw_pixel_area`.
/// Coordinates are expected already rotated (§6); this function does not
/// apply the rotation transform.
///
/// # Errors
/// Returns [`crate::error::RingError::Full`] on ring/storage exhaustion
/// while building the skeleton.
#[allow(clippy::too_many_arguments)]
pub fn start_draw_pixel_area<const CAP_FRAMES: usize, const CAP_BYTES: usize>(
    ring: &mut DescriptorRing<CAP_FRAMES, CAP_BYTES>,
    state: &mut OperationState,
    config: &DriverConfig,
    addrs: PlannerAddresses,
    pixels_addr: u32,
    num: u32,
    x: i32,
    y: i32,
    width: u16,
) -> RingResult<*const Descriptor> {
    state.kind = OperationKind::DrawPixelArea;
    state.draw_area = DrawAreaData {
        pixels_addr,
        remaining: num,
        x,
        y,
        width,
        rows_completed: 0,
    };

    if !state.can_hot_patch(config.reuse_dma_frames_if_available()) {
        build_skeleton(ring, config, addrs)?;
    }

    refill(ring, state, config)
}

/// Refills the ring for the next batch of an in-progress operation and
/// returns the finalized chain head.
///
/// Called by the interrupt handler when `is_complete` is false (§4.5).
///
/// # Errors
/// Returns [`crate::error::RingError::Full`] if `increment_size` cannot
/// advance (a caller bug: `CAP_FRAMES` not matching `config.cap_frames()`).
pub fn refill<const CAP_FRAMES: usize, const CAP_BYTES: usize>(
    ring: &mut DescriptorRing<CAP_FRAMES, CAP_BYTES>,
    state: &mut OperationState,
    config: &DriverConfig,
) -> RingResult<*const Descriptor> {
    fill_batch(ring, state, config)?;
    Ok(ring.finalize().unwrap_or(core::ptr::null()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Rotation;

    const FRAMES_PER_LINE: usize = 21;
    const LINES_PER_BATCH: usize = 8;
    const WORKING_DATA_PER_LINE: usize = 19;
    type TestRing = DescriptorRing<{ FRAMES_PER_LINE * LINES_PER_BATCH }, { WORKING_DATA_PER_LINE * LINES_PER_BATCH }>;

    fn test_config() -> DriverConfig {
        DriverConfig::new(800, 480).with_rotation(Rotation::Zero)
    }

    fn test_addrs() -> PlannerAddresses {
        PlannerAddresses {
            cs_mask_addr: 0x1000,
            cs_set_addr: 0x2000,
            cs_clear_addr: 0x2004,
            spi_transmit_addr: 0x4000_0000,
        }
    }

    #[test]
    fn s1_single_row_chain_length() {
        // 480x80 panel, rotation 0, v_offset 192; one 480-pixel-wide row
        // at physical (0, 192).
        let mut ring = TestRing::new();
        let mut state = OperationState::new();
        let config = DriverConfig::new(480, 80).with_v_offset(192);

        let head = start_draw_pixel_area(
            &mut ring,
            &mut state,
            &config,
            test_addrs(),
            0x2000_0000,
            480,
            0,
            192,
            480,
        )
        .unwrap();

        assert!(!head.is_null());
        assert_eq!(state.draw_area.remaining, 0);
        assert_eq!(state.draw_area.rows_completed, 1);
        assert_eq!(ring.size(), FRAMES_PER_LINE);
    }

    #[test]
    fn s2_eight_rows_one_batch() {
        // 800x480 panel, rotation 0: width=100, num=800 (8 rows) at (10,20).
        let mut ring = TestRing::new();
        let mut state = OperationState::new();
        let config = test_config();

        start_draw_pixel_area(
            &mut ring,
            &mut state,
            &config,
            test_addrs(),
            0x2000_0000,
            800,
            10,
            20,
            100,
        )
        .unwrap();

        assert_eq!(state.draw_area.remaining, 0);
        assert_eq!(state.draw_area.rows_completed, 8);
        assert_eq!(ring.size(), FRAMES_PER_LINE * 8);

        // Last row's pixel descriptor sources from row 7's slice of the
        // pixel buffer: pixels_addr + 7 * width * 2.
        let last_row_pixel_idx = 7 * FRAMES_PER_LINE + PIXEL_DESCRIPTOR_OFFSET;
        let d = ring.get_raw(last_row_pixel_idx).unwrap();
        assert_eq!(d.source_address(), 0x2000_0000 + 7 * 100 * 2);
        assert_eq!(d.byte_count(), 100 * 2);
    }

    #[test]
    fn s4_two_batches_nine_rows() {
        // 480x272 panel, rotation 0: width=50, num=450 (9 rows), LINES_PER_BATCH=8.
        let mut ring = TestRing::new();
        let mut state = OperationState::new();
        let config = DriverConfig::new(480, 272);

        start_draw_pixel_area(
            &mut ring,
            &mut state,
            &config,
            test_addrs(),
            0x2000_0000,
            450,
            0,
            0,
            50,
        )
        .unwrap();
        assert_eq!(state.draw_area.rows_completed, 8);
        assert_eq!(state.draw_area.remaining, 450 - 8 * 50);
        assert_eq!(ring.size(), FRAMES_PER_LINE * 8);

        let head2 = refill(&mut ring, &mut state, &config).unwrap();
        assert!(!head2.is_null());
        assert_eq!(state.draw_area.rows_completed, 9);
        assert_eq!(state.draw_area.remaining, 0);
        assert_eq!(ring.size(), FRAMES_PER_LINE);
    }

    #[test]
    fn s5_reuse_keeps_same_descriptor_addresses() {
        let mut ring = TestRing::new();
        let mut state = OperationState::new();
        let config = DriverConfig::new(480, 272);

        start_draw_pixel_area(
            &mut ring,
            &mut state,
            &config,
            test_addrs(),
            0x2000_0000,
            400,
            0,
            0,
            50,
        )
        .unwrap();
        state.complete(ring.storage_idx());
        let first_pixel_descriptor_addr =
            core::ptr::from_ref(ring.get_raw(PIXEL_DESCRIPTOR_OFFSET).unwrap());

        start_draw_pixel_area(
            &mut ring,
            &mut state,
            &config,
            test_addrs(),
            0x2001_0000,
            400,
            0,
            0,
            50,
        )
        .unwrap();
        let second_pixel_descriptor_addr =
            core::ptr::from_ref(ring.get_raw(PIXEL_DESCRIPTOR_OFFSET).unwrap());

        assert_eq!(first_pixel_descriptor_addr, second_pixel_descriptor_addr);
        assert_eq!(
            ring.get_raw(PIXEL_DESCRIPTOR_OFFSET).unwrap().source_address(),
            0x2001_0000
        );
    }

    #[test]
    fn last_row_truncates_byte_count() {
        let mut ring = TestRing::new();
        let mut state = OperationState::new();
        let config = DriverConfig::new(480, 272);

        // width=50 but only 30 pixels remain for the single row.
        start_draw_pixel_area(
            &mut ring,
            &mut state,
            &config,
            test_addrs(),
            0x2000_0000,
            30,
            0,
            0,
            50,
        )
        .unwrap();

        let pixel_descriptor = ring.get_raw(PIXEL_DESCRIPTOR_OFFSET).unwrap();
        assert_eq!(pixel_descriptor.byte_count(), 30 * 2);
        assert_eq!(state.draw_area.remaining, 0);
    }
}
