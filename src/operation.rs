//! Operation state: the per-operation record the Batch Planner and DMA
//! Engine Adapter mutate between arms.
//!
//! The original's `DMA_Data` installs three function pointers per
//! operation (`is_complete`, `fetch_next_batch`, `on_complete`). Per the
//! redesign note in the core specification, this is modeled as a small
//! tagged enum instead: `OperationKind` says which payload is active, and
//! `is_complete`/`on_complete` become plain matches on that tag. New kinds
//! are added by adding variants, not by installing pointers at runtime.

/// The closed set of operations the engine can be running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OperationKind {
    /// No operation in progress.
    #[default]
    None,
    /// Streaming a rectangular pixel region (`draw_pixel_area`).
    DrawPixelArea,
}

/// Per-operation payload for [`OperationKind::DrawPixelArea`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DrawAreaData {
    /// Address of the source pixel buffer (row-major, 16 bits per pixel).
    pub pixels_addr: u32,
    /// Pixels remaining to be shipped.
    pub remaining: u32,
    /// Physical top-left X.
    pub x: i32,
    /// Physical top-left Y.
    pub y: i32,
    /// Row width, in pixels.
    pub width: u16,
    /// Rows emitted since the operation started.
    pub rows_completed: u16,
}

impl DrawAreaData {
    /// True once every pixel has been shipped.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.remaining == 0
    }
}

/// User completion callback: an opaque data pointer plus a function that
/// consumes it. Mirrors the original's `void (*complete_cb)(void *)`.
#[derive(Clone, Copy)]
pub struct Callback {
    func: fn(*mut ()),
    data: *mut (),
}

impl Callback {
    /// Wraps a callback function and its opaque data pointer.
    #[must_use]
    pub const fn new(func: fn(*mut ()), data: *mut ()) -> Self {
        Self { func, data }
    }

    /// Invokes the callback.
    pub fn call(&self) {
        (self.func)(self.data);
    }
}

impl core::fmt::Debug for Callback {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Callback")
            .field("func", &(self.func as usize))
            .field("data", &self.data)
            .finish()
    }
}

/// Per-operation record: which kind is active, its payload, the snapshot
/// used to decide hot-patch eligibility on the next call, and the
/// completion callback.
///
/// Lifecycle: created by the draw-pixel-area entry point, mutated
/// exclusively by the planner and the interrupt handler, cleared on
/// completion. Exactly one operation is active at a time.
#[derive(Debug, Clone, Copy, Default)]
pub struct OperationState {
    /// The operation currently in progress.
    pub kind: OperationKind,
    /// The kind of the most recently completed operation, used to decide
    /// whether the ring can be hot-patched instead of rebuilt.
    pub last_kind: OperationKind,
    /// Working-storage cursor snapshotted at the end of the last batch.
    pub last_storage_idx: usize,
    /// Payload for [`OperationKind::DrawPixelArea`].
    pub draw_area: DrawAreaData,
    /// Completion callback, set when `kind` is anything but `None`.
    pub callback: Option<Callback>,
}

impl OperationState {
    /// An idle operation state.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            kind: OperationKind::None,
            last_kind: OperationKind::None,
            last_storage_idx: 0,
            draw_area: DrawAreaData {
                pixels_addr: 0,
                remaining: 0,
                x: 0,
                y: 0,
                width: 0,
                rows_completed: 0,
            },
            callback: None,
        }
    }

    /// `is_complete`: true when the active operation has nothing left to
    /// stream.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        match self.kind {
            OperationKind::None => true,
            OperationKind::DrawPixelArea => self.draw_area.is_complete(),
        }
    }

    /// Whether a new `draw_pixel_area` call may hot-patch the ring left
    /// behind by this state rather than rebuilding it, per the
    /// `REUSE_DMA_FRAMES_IF_AVAILABLE` policy.
    #[must_use]
    pub const fn can_hot_patch(&self, reuse_enabled: bool) -> bool {
        reuse_enabled && matches!(self.last_kind, OperationKind::DrawPixelArea)
    }

    /// `on_complete`: snapshots `last_kind`/`last_storage_idx` for the next
    /// call's hot-patch decision, invokes the user callback if one is set,
    /// and returns to idle.
    pub fn complete(&mut self, storage_idx: usize) {
        self.last_kind = self.kind;
        self.last_storage_idx = storage_idx;
        if let Some(callback) = self.callback.take() {
            callback.call();
        }
        self.kind = OperationKind::None;
    }
}
