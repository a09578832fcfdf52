//! Fixed-capacity descriptor ring and working-storage arena.
//!
//! This is a linear ring, not the teacher's circular `DescriptorRing` — the
//! semantics here are grounded in `DMAManager`/`DMAManagerDue.cpp`'s
//! `size`/`storage_idx` bookkeeping, which fills from index 0 every batch
//! rather than wrapping. The teacher's const-generic array-of-descriptors
//! shape and method-per-test style are kept.

use crate::descriptor::Descriptor;
use crate::error::{RingError, RingResult};

/// Fixed-capacity descriptor storage plus a side arena for the small
/// control-byte payloads descriptors reference.
///
/// `CAP_FRAMES` and `CAP_BYTES` come from [`crate::config::DriverConfig`]
/// (`frames_per_line * lines_per_batch` and `working_data_per_line *
/// lines_per_batch`).
pub struct DescriptorRing<const CAP_FRAMES: usize, const CAP_BYTES: usize> {
    frames: [Descriptor; CAP_FRAMES],
    working_storage: [u8; CAP_BYTES],
    size: usize,
    storage_idx: usize,
}

impl<const CAP_FRAMES: usize, const CAP_BYTES: usize> DescriptorRing<CAP_FRAMES, CAP_BYTES> {
    /// Creates an empty ring.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            frames: [const { Descriptor::new() }; CAP_FRAMES],
            working_storage: [0; CAP_BYTES],
            size: 0,
            storage_idx: 0,
        }
    }

    /// Count of currently-used descriptor slots.
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Count of used working-storage bytes.
    #[must_use]
    pub const fn storage_idx(&self) -> usize {
        self.storage_idx
    }

    /// True if `n` more descriptors fit.
    #[must_use]
    pub const fn can_add(&self, n: usize) -> bool {
        self.size + n < CAP_FRAMES
    }

    /// True if `n` more working-storage bytes fit.
    ///
    /// The original computes `(storage_idx - 1) + size < CAP_BYTES`, which
    /// underflows when `storage_idx == 0` on an unsigned counter (callers
    /// happen to always request a few bytes first, so it never surfaces).
    /// This is the corrected boundary check: `storage_idx + n <= CAP_BYTES`.
    #[must_use]
    pub const fn can_add_working_data(&self, n: usize) -> bool {
        self.storage_idx + n <= CAP_BYTES
    }

    /// Appends a descriptor's fields to the next free slot.
    ///
    /// # Errors
    /// Returns [`RingError::Full`] if the ring has no free slots.
    pub fn add(
        &mut self,
        program: impl FnOnce(&Descriptor),
    ) -> RingResult<&Descriptor> {
        if self.size >= CAP_FRAMES {
            return Err(RingError::Full);
        }
        let idx = self.size;
        program(&self.frames[idx]);
        self.size += 1;
        Ok(&self.frames[idx])
    }

    /// Advances `size` by `n` without touching descriptor contents.
    ///
    /// Used to reuse a previously-programmed row skeleton across batches:
    /// the descriptor fields at the newly-covered indices were set once by
    /// [`Self::add`] during the last cold build and are only patched
    /// in-place afterward, never reprogrammed.
    ///
    /// # Errors
    /// Returns [`RingError::Full`] if `size + n` would exceed `CAP_FRAMES`.
    pub fn increment_size(&mut self, n: usize) -> RingResult<()> {
        if self.size + n > CAP_FRAMES {
            return Err(RingError::Full);
        }
        self.size += n;
        Ok(())
    }

    /// Returns the descriptor at `idx`, if occupied.
    #[must_use]
    pub fn get(&self, idx: usize) -> Option<&Descriptor> {
        if idx < self.size {
            Some(&self.frames[idx])
        } else {
            None
        }
    }

    /// Returns the descriptor at `idx` regardless of logical `size`,
    /// bounded only by physical capacity.
    ///
    /// For patching a row skeleton back into this batch's active range
    /// before [`Self::increment_size`] has made it visible to
    /// [`Self::get`].
    #[must_use]
    pub fn get_raw(&self, idx: usize) -> Option<&Descriptor> {
        self.frames.get(idx)
    }

    /// Returns the most recently added descriptor.
    #[must_use]
    pub fn get_last(&self) -> Option<&Descriptor> {
        self.size.checked_sub(1).map(|i| &self.frames[i])
    }

    /// Copies `buf` into working storage and returns the index of the
    /// copied prefix. Pair with [`Self::working_data_addr`] to get the
    /// stable address a descriptor's source field needs, or
    /// [`Self::patch_working_byte`] to overwrite a byte in place later.
    ///
    /// # Errors
    /// Returns [`RingError::WorkingStorageFull`] if `buf` does not fit.
    pub fn add_working_data(&mut self, buf: &[u8]) -> RingResult<usize> {
        if !self.can_add_working_data(buf.len()) {
            return Err(RingError::WorkingStorageFull);
        }
        let start = self.storage_idx;
        self.working_storage[start..start + buf.len()].copy_from_slice(buf);
        self.storage_idx += buf.len();
        Ok(start)
    }

    /// Address of the working-storage byte at `idx`, for a descriptor's
    /// stable source field. DMA dereferences this asynchronously, so it
    /// must come from `&self` backed by storage that outlives the chain,
    /// never a stack temporary.
    #[must_use]
    pub fn working_data_addr(&self, idx: usize) -> u32 {
        core::ptr::from_ref(&self.working_storage[idx]) as u32
    }

    /// Overwrites a single working-storage byte in place. Used by the
    /// hot-patch path to update a pre-staged coordinate byte without
    /// rebuilding the descriptor that references it.
    pub fn patch_working_byte(&mut self, idx: usize, value: u8) {
        self.working_storage[idx] = value;
    }

    /// Writes each slot's `next` to the address of the following slot, in
    /// order, with the last slot's `next` cleared to zero and its done bit
    /// explicitly cleared.
    ///
    /// Must be the last operation before the chain head address is handed
    /// to the DMA engine; `add` must not be called again for the duration
    /// of that run.
    pub fn finalize(&self) -> Option<*const Descriptor> {
        if self.size == 0 {
            return None;
        }
        for i in 0..self.size - 1 {
            let next_addr = core::ptr::from_ref(&self.frames[i + 1]) as u32;
            self.frames[i].set_next(next_addr);
        }
        self.frames[self.size - 1].set_next(0);
        self.frames[self.size - 1].clear_done();
        Some(core::ptr::from_ref(&self.frames[0]))
    }

    /// Clears `size` to zero, discarding the descriptor slots (but not
    /// working storage).
    pub fn clear_frames(&mut self) {
        self.size = 0;
    }

    /// Clears `size` and `storage_idx`. When `full` is false, working
    /// storage contents are left in place (only the cursor resets) so a
    /// subsequent hot patch can still see prior bytes until overwritten;
    /// callers that need a truly clean slate pass `full = true`.
    pub fn reset(&mut self, full: bool) {
        self.clear_frames();
        if full {
            self.storage_idx = 0;
        }
    }
}

impl<const CAP_FRAMES: usize, const CAP_BYTES: usize> Default
    for DescriptorRing<CAP_FRAMES, CAP_BYTES>
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{AddressMode, FlowControl, TransferWidth};

    type TestRing = DescriptorRing<4, 16>;

    #[test]
    fn new_ring_is_empty() {
        let ring = TestRing::new();
        assert_eq!(ring.size(), 0);
        assert_eq!(ring.storage_idx(), 0);
    }

    #[test]
    fn add_increments_size() {
        let mut ring = TestRing::new();
        ring.add(|d| d.program(0, 0, 1, TransferWidth::Byte, TransferWidth::Byte, AddressMode::Fixed, AddressMode::Fixed, FlowControl::MemoryToPeripheral)).unwrap();
        assert_eq!(ring.size(), 1);
    }

    #[test]
    fn add_fails_when_full() {
        let mut ring = TestRing::new();
        for _ in 0..4 {
            ring.add(|_| {}).unwrap();
        }
        assert_eq!(ring.add(|_| {}).unwrap_err(), RingError::Full);
    }

    #[test]
    fn get_returns_none_past_size() {
        let mut ring = TestRing::new();
        ring.add(|_| {}).unwrap();
        assert!(ring.get(0).is_some());
        assert!(ring.get(1).is_none());
    }

    #[test]
    fn get_last_tracks_most_recent() {
        let mut ring = TestRing::new();
        assert!(ring.get_last().is_none());
        ring.add(|d| d.set_source_address(1)).unwrap();
        ring.add(|d| d.set_source_address(2)).unwrap();
        assert_eq!(ring.get_last().unwrap().source_address(), 2);
    }

    #[test]
    fn add_working_data_returns_stable_prefix() {
        let mut ring = TestRing::new();
        let idx = ring.add_working_data(&[1, 2, 3]).unwrap();
        assert_eq!(idx, 0);
        assert_eq!(ring.storage_idx(), 3);
        let addr = ring.working_data_addr(idx);
        assert_ne!(addr, 0);
    }

    #[test]
    fn patch_working_byte_overwrites_in_place() {
        let mut ring = TestRing::new();
        let idx = ring.add_working_data(&[1, 2, 3, 4]).unwrap();
        ring.patch_working_byte(idx + 3, 0xAA);
        assert_eq!(ring.working_storage[idx + 3], 0xAA);
    }

    #[test]
    fn add_working_data_fails_when_full() {
        let mut ring = TestRing::new();
        ring.add_working_data(&[0; 16]).unwrap();
        assert_eq!(
            ring.add_working_data(&[0; 1]).unwrap_err(),
            RingError::WorkingStorageFull
        );
    }

    #[test]
    fn can_add_working_data_no_underflow_at_zero() {
        // The corrected boundary check must not underflow when
        // storage_idx == 0, unlike the original `(storage_idx - 1) + n`.
        let ring = TestRing::new();
        assert!(ring.can_add_working_data(16));
        assert!(!ring.can_add_working_data(17));
    }

    #[test]
    fn finalize_links_chain_in_order() {
        let mut ring = TestRing::new();
        ring.add(|_| {}).unwrap();
        ring.add(|_| {}).unwrap();
        ring.add(|_| {}).unwrap();
        let head = ring.finalize().unwrap();
        assert_eq!(head, core::ptr::from_ref(ring.get(0).unwrap()));
        let d0 = ring.get(0).unwrap();
        let d1 = ring.get(1).unwrap();
        let d2 = ring.get(2).unwrap();
        assert_eq!(d0.next(), core::ptr::from_ref(d1) as u32);
        assert_eq!(d1.next(), core::ptr::from_ref(d2) as u32);
        assert_eq!(d2.next(), 0);
        assert!(!d2.is_done());
    }

    #[test]
    fn finalize_empty_ring_returns_none() {
        let ring = TestRing::new();
        assert!(ring.finalize().is_none());
    }

    #[test]
    fn increment_size_advances_without_programming() {
        let mut ring = TestRing::new();
        ring.add(|d| d.set_source_address(7)).unwrap();
        ring.clear_frames();
        ring.increment_size(1).unwrap();
        assert_eq!(ring.size(), 1);
        // The descriptor contents from the earlier `add` survive.
        assert_eq!(ring.get(0).unwrap().source_address(), 7);
    }

    #[test]
    fn increment_size_fails_past_capacity() {
        let mut ring = TestRing::new();
        assert_eq!(
            ring.increment_size(5).unwrap_err(),
            RingError::Full
        );
    }

    #[test]
    fn get_raw_bypasses_logical_size() {
        let mut ring = TestRing::new();
        ring.add(|d| d.set_source_address(3)).unwrap();
        ring.clear_frames();
        assert!(ring.get(0).is_none());
        assert_eq!(ring.get_raw(0).unwrap().source_address(), 3);
    }

    #[test]
    fn clear_frames_resets_size_only() {
        let mut ring = TestRing::new();
        ring.add_working_data(&[9, 9]).unwrap();
        ring.add(|_| {}).unwrap();
        ring.clear_frames();
        assert_eq!(ring.size(), 0);
        assert_eq!(ring.storage_idx(), 2);
    }

    #[test]
    fn reset_full_clears_storage_idx_too() {
        let mut ring = TestRing::new();
        ring.add_working_data(&[9, 9]).unwrap();
        ring.add(|_| {}).unwrap();
        ring.reset(true);
        assert_eq!(ring.size(), 0);
        assert_eq!(ring.storage_idx(), 0);
    }

    #[test]
    fn reset_partial_preserves_storage_idx() {
        let mut ring = TestRing::new();
        ring.add_working_data(&[9, 9]).unwrap();
        ring.add(|_| {}).unwrap();
        ring.reset(false);
        assert_eq!(ring.size(), 0);
        assert_eq!(ring.storage_idx(), 2);
    }
}
