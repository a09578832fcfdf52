//! Build-time configuration for the RA8875 DMA pixel-streaming driver.
//!
//! Replaces the original driver's global preprocessor macros
//! (`FRAMES_PER_LINE`, `LINES_PER_BATCH`, ...) with a single const-constructible
//! record passed to the driver at construction. Panel geometry travels in the
//! same record since it is fixed for the lifetime of a driver instance.

/// The two rotation states the coordinate transform in
/// [`crate::geometry`] recognizes.
///
/// Not a raw integer: the original driver accepts any rotation value but
/// only ever implements these two, so the closed set is made explicit here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Rotation {
    /// No rotation.
    #[default]
    Zero,
    /// 180-degree rotation.
    Two,
}

/// Recognized build-time configuration for the DMA pixel-streaming core.
///
/// `CAP_FRAMES` and `CAP_BYTES` (the descriptor ring's const generic
/// parameters) are derived from `frames_per_line * lines_per_batch` and
/// `working_data_per_line * lines_per_batch` respectively; callers pick
/// const generics matching their chosen `DriverConfig`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DriverConfig {
    frames_per_line: u16,
    lines_per_batch: u16,
    working_data_per_line: u16,
    dummy_transfers: u16,
    cs_high_transfers: u16,
    reuse_dma_frames_if_available: bool,
    dma_timeout_ms: u32,
    width: u16,
    height: u16,
    rotation: Rotation,
    v_offset: u16,
}

impl DriverConfig {
    /// Creates a configuration for a panel of the given size with the
    /// recognized defaults: 21 descriptors per line, 8 lines per batch, 19
    /// working-storage bytes per line, 100 dummy transfers, 120 chip-select
    /// hold transfers, hot-patch reuse enabled, a 100 ms synchronous
    /// timeout, rotation 0, and no vertical offset.
    #[must_use]
    pub const fn new(width: u16, height: u16) -> Self {
        Self {
            frames_per_line: 21,
            lines_per_batch: 8,
            working_data_per_line: 19,
            dummy_transfers: 100,
            cs_high_transfers: 120,
            reuse_dma_frames_if_available: true,
            dma_timeout_ms: 100,
            width,
            height,
            rotation: Rotation::Zero,
            v_offset: 0,
        }
    }

    /// Sets the descriptor budget per row.
    ///
    /// Reducing it below 21 requires eliminating dummy or toggle frames and
    /// is unsupported by the rest of the core.
    #[must_use]
    pub const fn with_frames_per_line(mut self, frames_per_line: u16) -> Self {
        self.frames_per_line = frames_per_line;
        self
    }

    /// Sets the number of rows built per DMA arm.
    ///
    /// Larger values reduce interrupt frequency but raise descriptor
    /// storage requirements.
    #[must_use]
    pub const fn with_lines_per_batch(mut self, lines_per_batch: u16) -> Self {
        self.lines_per_batch = lines_per_batch;
        self
    }

    /// Sets the working-storage bytes allocated per row template.
    #[must_use]
    pub const fn with_working_data_per_line(mut self, working_data_per_line: u16) -> Self {
        self.working_data_per_line = working_data_per_line;
        self
    }

    /// Sets the shifter-flush transfer count.
    #[must_use]
    pub const fn with_dummy_transfers(mut self, dummy_transfers: u16) -> Self {
        self.dummy_transfers = dummy_transfers;
        self
    }

    /// Sets the chip-select hold width, in transfers.
    #[must_use]
    pub const fn with_cs_high_transfers(mut self, cs_high_transfers: u16) -> Self {
        self.cs_high_transfers = cs_high_transfers;
        self
    }

    /// Enables or disables hot-patch mode across back-to-back
    /// `draw_pixel_area` calls of the same kind.
    #[must_use]
    pub const fn with_reuse_dma_frames_if_available(mut self, reuse: bool) -> Self {
        self.reuse_dma_frames_if_available = reuse;
        self
    }

    /// Sets the synchronous-path receive timeout, in milliseconds.
    #[must_use]
    pub const fn with_dma_timeout_ms(mut self, dma_timeout_ms: u32) -> Self {
        self.dma_timeout_ms = dma_timeout_ms;
        self
    }

    /// Sets the panel rotation.
    #[must_use]
    pub const fn with_rotation(mut self, rotation: Rotation) -> Self {
        self.rotation = rotation;
        self
    }

    /// Sets the vertical offset used by the coordinate transform.
    ///
    /// Zero for most panels; the 480x80 variant uses the bottom 80 rows of
    /// a 272-row controller and needs `v_offset = 192`.
    #[must_use]
    pub const fn with_v_offset(mut self, v_offset: u16) -> Self {
        self.v_offset = v_offset;
        self
    }

    /// Descriptor budget per row.
    #[must_use]
    pub const fn frames_per_line(&self) -> u16 {
        self.frames_per_line
    }

    /// Rows built per DMA arm.
    #[must_use]
    pub const fn lines_per_batch(&self) -> u16 {
        self.lines_per_batch
    }

    /// Working-storage bytes allocated per row template.
    #[must_use]
    pub const fn working_data_per_line(&self) -> u16 {
        self.working_data_per_line
    }

    /// Shifter-flush transfer count.
    #[must_use]
    pub const fn dummy_transfers(&self) -> u16 {
        self.dummy_transfers
    }

    /// Chip-select hold width, in transfers.
    #[must_use]
    pub const fn cs_high_transfers(&self) -> u16 {
        self.cs_high_transfers
    }

    /// Whether hot-patch mode is allowed across back-to-back operations.
    #[must_use]
    pub const fn reuse_dma_frames_if_available(&self) -> bool {
        self.reuse_dma_frames_if_available
    }

    /// Synchronous-path receive timeout, in milliseconds.
    #[must_use]
    pub const fn dma_timeout_ms(&self) -> u32 {
        self.dma_timeout_ms
    }

    /// Panel width, in pixels.
    #[must_use]
    pub const fn width(&self) -> u16 {
        self.width
    }

    /// Panel height, in pixels.
    #[must_use]
    pub const fn height(&self) -> u16 {
        self.height
    }

    /// Panel rotation.
    #[must_use]
    pub const fn rotation(&self) -> Rotation {
        self.rotation
    }

    /// Vertical offset used by the coordinate transform.
    #[must_use]
    pub const fn v_offset(&self) -> u16 {
        self.v_offset
    }

    /// Descriptor-ring capacity implied by this configuration:
    /// `frames_per_line * lines_per_batch`.
    #[must_use]
    pub const fn cap_frames(&self) -> usize {
        self.frames_per_line as usize * self.lines_per_batch as usize
    }

    /// Working-storage arena capacity implied by this configuration:
    /// `working_data_per_line * lines_per_batch`.
    #[must_use]
    pub const fn cap_bytes(&self) -> usize {
        self.working_data_per_line as usize * self.lines_per_batch as usize
    }
}
