//! Async/await support for `draw_pixel_area` completion.
//!
//! The original state machine has one terminal event (the last batch of
//! a region has drained), unlike a network MAC's independent RX/TX/error
//! conditions, so this mirrors `sync::asynch`'s waker plumbing with a
//! single completion waker rather than a trio.

use core::future::Future;
use core::pin::Pin;
use core::task::{Context, Poll, Waker};

use super::primitives::AtomicWaker;
use super::shared::AsyncSharedRa8875Dma;
use crate::hal::{ChipSelectPin, DmaChannel, SpiBus};

/// Per-instance waker storage for `draw_pixel_area` completion.
///
/// Store this in static memory alongside the [`AsyncSharedRa8875Dma`] it
/// serves, and pass a reference to [`async_interrupt_handler`] and
/// [`AsyncRa8875DmaExt::wait_done`].
pub struct AsyncCompletionState {
    waker: AtomicWaker,
}

impl AsyncCompletionState {
    /// Create a new async completion state.
    pub const fn new() -> Self {
        Self {
            waker: AtomicWaker::new(),
        }
    }

    pub(crate) fn register(&self, waker: &Waker) {
        self.waker.register(waker);
    }

    /// Wake the waiting task, if any (call when reinitializing the
    /// driver, to release a `wait_done` caller stuck on an aborted
    /// operation).
    pub fn reset(&self) {
        self.waker.wake();
    }
}

impl Default for AsyncCompletionState {
    fn default() -> Self {
        Self::new()
    }
}

/// Async-aware interrupt handler for a [`AsyncSharedRa8875Dma`].
///
/// Call from the DMA channel's completion interrupt when using
/// [`AsyncRa8875DmaExt::wait_done`] instead of calling
/// [`AsyncSharedRa8875Dma::service_interrupt`] directly; this wakes the
/// waiting task once the operation has actually drained.
///
/// # Errors
/// Propagates errors from the driver's `service_interrupt`.
///
/// # Example
///
/// ```ignore
/// static STATE: AsyncCompletionState = AsyncCompletionState::new();
///
/// #[interrupt]
/// fn DMA_IRQ() {
///     ra8875_dma::sync::asynch::async_interrupt_handler(&PANEL, &STATE).unwrap();
/// }
/// ```
pub fn async_interrupt_handler<S, C, D, const CAP_FRAMES: usize, const CAP_BYTES: usize>(
    panel: &AsyncSharedRa8875Dma<S, C, D, CAP_FRAMES, CAP_BYTES>,
    state: &AsyncCompletionState,
) -> crate::error::Result<()>
where
    S: SpiBus,
    C: ChipSelectPin,
    D: DmaChannel,
{
    if panel.service_interrupt()? {
        state.waker.wake();
    }
    Ok(())
}

/// Future that resolves once the driver's current `draw_pixel_area`
/// region has fully drained.
#[must_use = "futures do nothing unless you `.await` or poll them"]
pub struct DoneFuture<'a, S, C, D, const CAP_FRAMES: usize, const CAP_BYTES: usize>
where
    S: SpiBus,
    C: ChipSelectPin,
    D: DmaChannel,
{
    panel: &'a AsyncSharedRa8875Dma<S, C, D, CAP_FRAMES, CAP_BYTES>,
    state: &'a AsyncCompletionState,
}

impl<'a, S, C, D, const CAP_FRAMES: usize, const CAP_BYTES: usize>
    DoneFuture<'a, S, C, D, CAP_FRAMES, CAP_BYTES>
where
    S: SpiBus,
    C: ChipSelectPin,
    D: DmaChannel,
{
    /// Create a new completion future.
    pub fn new(
        panel: &'a AsyncSharedRa8875Dma<S, C, D, CAP_FRAMES, CAP_BYTES>,
        state: &'a AsyncCompletionState,
    ) -> Self {
        Self { panel, state }
    }
}

impl<S, C, D, const CAP_FRAMES: usize, const CAP_BYTES: usize> Future
    for DoneFuture<'_, S, C, D, CAP_FRAMES, CAP_BYTES>
where
    S: SpiBus,
    C: ChipSelectPin,
    D: DmaChannel,
{
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        if !self.panel.is_busy() {
            return Poll::Ready(());
        }
        self.state.register(cx.waker());
        if !self.panel.is_busy() {
            return Poll::Ready(());
        }
        Poll::Pending
    }
}

/// Extension trait adding [`Self::wait_done`] to [`AsyncSharedRa8875Dma`].
pub trait AsyncRa8875DmaExt<S, C, D, const CAP_FRAMES: usize, const CAP_BYTES: usize>
where
    S: SpiBus,
    C: ChipSelectPin,
    D: DmaChannel,
{
    /// Waits for the current `draw_pixel_area` region to fully drain.
    ///
    /// Resolves immediately if the driver is already idle.
    fn wait_done<'a>(
        &'a self,
        state: &'a AsyncCompletionState,
    ) -> impl Future<Output = ()> + 'a;
}

impl<S, C, D, const CAP_FRAMES: usize, const CAP_BYTES: usize>
    AsyncRa8875DmaExt<S, C, D, CAP_FRAMES, CAP_BYTES>
    for AsyncSharedRa8875Dma<S, C, D, CAP_FRAMES, CAP_BYTES>
where
    S: SpiBus,
    C: ChipSelectPin,
    D: DmaChannel,
{
    fn wait_done<'a>(&'a self, state: &'a AsyncCompletionState) -> impl Future<Output = ()> + 'a {
        DoneFuture::new(self, state)
    }
}

#[cfg(test)]
#[allow(clippy::std_instead_of_core, clippy::std_instead_of_alloc)]
mod tests {
    extern crate std;

    use super::*;
    use crate::config::DriverConfig;
    use crate::testing::{MockChipSelectPin, MockDmaChannel, MockSpiBus};
    use core::task::{RawWaker, RawWakerVTable};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct WakeCounter {
        count: AtomicUsize,
    }

    impl WakeCounter {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                count: AtomicUsize::new(0),
            })
        }

        fn count(&self) -> usize {
            self.count.load(Ordering::SeqCst)
        }
    }

    fn test_waker(counter: Arc<WakeCounter>) -> Waker {
        fn clone_fn(ptr: *const ()) -> RawWaker {
            // SAFETY: `ptr` originates from `Arc::into_raw` in this test helper.
            let arc = unsafe { Arc::from_raw(ptr as *const WakeCounter) };
            let cloned = arc.clone();
            core::mem::forget(arc);
            RawWaker::new(Arc::into_raw(cloned) as *const (), &VTABLE)
        }

        fn wake_fn(ptr: *const ()) {
            // SAFETY: `ptr` originates from `Arc::into_raw` in this test helper.
            let arc = unsafe { Arc::from_raw(ptr as *const WakeCounter) };
            arc.count.fetch_add(1, Ordering::SeqCst);
        }

        fn wake_by_ref_fn(ptr: *const ()) {
            // SAFETY: `ptr` originates from `Arc::into_raw` in this test helper.
            let arc = unsafe { Arc::from_raw(ptr as *const WakeCounter) };
            arc.count.fetch_add(1, Ordering::SeqCst);
            core::mem::forget(arc);
        }

        fn drop_fn(ptr: *const ()) {
            // SAFETY: `ptr` originates from `Arc::into_raw` in this test helper.
            unsafe {
                Arc::from_raw(ptr as *const WakeCounter);
            }
        }

        static VTABLE: RawWakerVTable =
            RawWakerVTable::new(clone_fn, wake_fn, wake_by_ref_fn, drop_fn);

        let raw = RawWaker::new(Arc::into_raw(counter) as *const (), &VTABLE);
        // SAFETY: `raw` is built from a valid `RawWakerVTable` and pointer.
        unsafe { Waker::from_raw(raw) }
    }

    type TestPanel = AsyncSharedRa8875Dma<MockSpiBus, MockChipSelectPin, MockDmaChannel, 168, 152>;

    fn panel() -> TestPanel {
        AsyncSharedRa8875Dma::new(
            MockSpiBus::new(),
            MockChipSelectPin::new(),
            MockDmaChannel::new(),
            DriverConfig::new(480, 272),
        )
    }

    #[test]
    fn async_completion_state_new_has_no_waiters() {
        let state = AsyncCompletionState::new();
        state.reset();
    }

    #[test]
    fn done_future_ready_immediately_when_idle() {
        let panel = panel();
        let state = AsyncCompletionState::new();
        let future = DoneFuture::new(&panel, &state);
        let counter = WakeCounter::new();
        let waker = test_waker(counter.clone());
        let mut cx = Context::from_waker(&waker);
        let mut future = core::pin::pin!(future);
        assert_eq!(future.as_mut().poll(&mut cx), Poll::Ready(()));
    }

    #[test]
    fn done_future_pending_while_busy_then_ready_after_interrupt_handled() {
        let panel = panel();
        let state = AsyncCompletionState::new();
        // 800 pixels at width 100 fits exactly one batch (8 rows), so the
        // single completion interrupt both drains and completes it.
        panel
            .draw_pixel_area(0x2000_0000, 800, 10, 20, 100, None)
            .unwrap();
        assert!(panel.is_busy());

        let counter = WakeCounter::new();
        let waker = test_waker(counter.clone());
        let mut cx = Context::from_waker(&waker);
        {
            let future = DoneFuture::new(&panel, &state);
            let mut future = core::pin::pin!(future);
            assert_eq!(future.as_mut().poll(&mut cx), Poll::Pending);
        }
        assert_eq!(counter.count(), 0);

        panel.with(|d| d.dma().raise_interrupt());
        async_interrupt_handler(&panel, &state).unwrap();

        assert_eq!(counter.count(), 1);
        assert!(!panel.is_busy());
    }
}
