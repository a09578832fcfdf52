//! Typed constructors that append descriptor sequences for the primitives
//! the chain is built from: pin toggle, dummy fill, byte-stream SPI send,
//! coordinate-register write, pixel-block write.
//!
//! Grounded in `DMAManagerDue.cpp`'s `add_entry_*` family. Each builder
//! here returns `Err` on ring/storage exhaustion exactly where the
//! original returns `false`/`nullptr`; callers treat that as "flush and
//! retry."

use crate::constants::{CMD_WRITE, DATA_WRITE, MRWC};
use crate::descriptor::{AddressMode, FlowControl, TransferWidth};
use crate::error::{Error, RingResult};
use crate::hal::ChipSelectPin;
use crate::ring::DescriptorRing;

/// Stable fill byte used as the DMA source for dummy transfers and for
/// null-buffer byte-stream sends, mirroring the original's file-scope
/// `static uint8_t ff = 0xFF`. DMA reads it repeatedly with a fixed
/// (non-incrementing) source address.
static DUMMY_FILL_BYTE: u8 = 0xFF;

fn dummy_fill_addr() -> u32 {
    core::ptr::from_ref(&DUMMY_FILL_BYTE) as u32
}

/// Appends one descriptor that drives `pin` to `state` for `n_transfers`
/// word-wide beats, sourced from the pin's stable bitmask address.
///
/// # Errors
/// Returns [`crate::error::RingError::Full`] if the ring has no free slot.
pub fn add_pin_toggle<const CAP_FRAMES: usize, const CAP_BYTES: usize>(
    ring: &mut DescriptorRing<CAP_FRAMES, CAP_BYTES>,
    state: bool,
    mask_addr: u32,
    set_register_addr: u32,
    clear_register_addr: u32,
    n_transfers: u16,
) -> RingResult<()> {
    let destination = if state {
        set_register_addr
    } else {
        clear_register_addr
    };
    ring.add(|d| {
        d.program(
            mask_addr,
            destination,
            n_transfers,
            TransferWidth::Word,
            TransferWidth::Word,
            AddressMode::Fixed,
            AddressMode::Fixed,
            FlowControl::MemoryToMemory,
        );
    })
    .map(|_| ())
}

/// Specializes [`add_pin_toggle`] to the chip-select pin captured at
/// construction, using `cs_high_transfers` as the default transfer count —
/// large enough to give the RA8875 the required chip-select hold time.
///
/// # Errors
/// Returns [`crate::error::RingError::Full`] if the ring has no free slot.
pub fn add_cs_toggle<C: ChipSelectPin, const CAP_FRAMES: usize, const CAP_BYTES: usize>(
    ring: &mut DescriptorRing<CAP_FRAMES, CAP_BYTES>,
    cs: &C,
    state: bool,
    n_transfers: u16,
) -> RingResult<()> {
    add_pin_toggle(
        ring,
        state,
        cs.mask_addr(),
        cs.set_register_address(),
        cs.clear_register_address(),
        n_transfers,
    )
}

/// Appends one descriptor that shifts out `n` bytes, flushing the SPI
/// shifter before chip-select is de-asserted.
///
/// # Errors
/// Returns [`crate::error::RingError::Full`] if the ring has no free slot.
pub fn add_dummy<const CAP_FRAMES: usize, const CAP_BYTES: usize>(
    ring: &mut DescriptorRing<CAP_FRAMES, CAP_BYTES>,
    spi_transmit_addr: u32,
    n: u16,
) -> RingResult<()> {
    add_spi_transfer(ring, None, spi_transmit_addr, n)
}

/// Appends one memory-to-peripheral descriptor sending `n` bytes from
/// `source_addr` to the SPI transmit-data register. `None` sources from
/// the stable fill byte instead, with a fixed (non-incrementing) source
/// address, for pure filler transfers.
///
/// # Errors
/// Returns [`crate::error::RingError::Full`] if the ring has no free slot.
pub fn add_spi_transfer<const CAP_FRAMES: usize, const CAP_BYTES: usize>(
    ring: &mut DescriptorRing<CAP_FRAMES, CAP_BYTES>,
    source_addr: Option<u32>,
    spi_transmit_addr: u32,
    n: u16,
) -> RingResult<()> {
    let (source, src_mode) = match source_addr {
        Some(addr) => (addr, AddressMode::Incrementing),
        None => (dummy_fill_addr(), AddressMode::Fixed),
    };
    ring.add(|d| {
        d.program(
            source,
            spi_transmit_addr,
            n,
            TransferWidth::Byte,
            TransferWidth::Byte,
            src_mode,
            AddressMode::Fixed,
            FlowControl::MemoryToPeripheral,
        );
    })
    .map(|_| ())
}

/// Stages the 4-byte coordinate-entry command (`command_select,
/// target_register, data_select, coordinate_byte`) in working storage and
/// appends a send descriptor referencing it, picking the low byte of
/// `value` for `CurH0`/`CurV0` and the high byte for `CurH1`/`CurV1`.
///
/// Returns the working-storage index of the staged record so the planner
/// can later patch the coordinate byte (offset 3) in place during a hot
/// patch (§4.4).
///
/// # Errors
/// Returns [`Error::Ring`] on ring/storage exhaustion. The accepted
/// register set is closed by [`crate::constants::CursorRegister`]'s type,
/// so there is no runtime "invalid register" case to report here.
pub fn add_coord_bits<const CAP_FRAMES: usize, const CAP_BYTES: usize>(
    ring: &mut DescriptorRing<CAP_FRAMES, CAP_BYTES>,
    spi_transmit_addr: u32,
    value: u16,
    register: crate::constants::CursorRegister,
) -> Result<usize, Error> {
    let coordinate_byte = if register.is_high_byte() {
        (value >> 8) as u8
    } else {
        (value & 0xFF) as u8
    };
    let record = [CMD_WRITE, register as u8, DATA_WRITE, coordinate_byte];
    let idx = ring.add_working_data(&record)?;
    add_spi_transfer(
        ring,
        Some(ring.working_data_addr(idx)),
        spi_transmit_addr,
        record.len() as u16,
    )?;
    Ok(idx)
}

/// Stages the 3-byte memory-write-cursor command prefix and appends a send
/// descriptor for it, followed by a send descriptor for the pixel buffer
/// itself.
///
/// Returns the working-storage index of the staged command prefix, for
/// symmetry with [`add_coord_bits`] (the prefix never needs patching, but
/// the pixel-block send descriptor returned by [`DescriptorRing::get_last`]
/// does, via `source_address`/`byte_count`).
///
/// # Errors
/// Returns [`Error::Ring`] on ring/storage exhaustion.
pub fn add_spi_draw_pixels<const CAP_FRAMES: usize, const CAP_BYTES: usize>(
    ring: &mut DescriptorRing<CAP_FRAMES, CAP_BYTES>,
    spi_transmit_addr: u32,
    pixel_buf_addr: u32,
    n_bytes: u16,
) -> Result<usize, Error> {
    let prefix = [CMD_WRITE, MRWC, DATA_WRITE];
    let idx = ring.add_working_data(&prefix)?;
    add_spi_transfer(
        ring,
        Some(ring.working_data_addr(idx)),
        spi_transmit_addr,
        prefix.len() as u16,
    )?;
    add_spi_transfer(ring, Some(pixel_buf_addr), spi_transmit_addr, n_bytes)?;
    Ok(idx)
}
