//! Synchronization and Concurrency Support
//!
//! ISR-safe wrappers around [`crate::driver::Ra8875Dma`] for use in the
//! single-foreground-plus-one-interrupt scheduling model this core
//! assumes: the driver itself needs no internal locking (the completion
//! interrupt is the only cross-context handoff, and it acts as a release
//! barrier for the ring contents), but a *shared, static* instance still
//! needs a critical section around the handful of call sites that touch
//! it from both contexts.
//!
//! - **Primitives** (`primitives`): [`CriticalSectionCell`], the
//!   `critical_section`-backed interior-mutability cell everything else
//!   here is built from, plus [`AtomicWaker`] for the `async` feature.
//! - **Shared wrappers** (`shared`): [`SharedRa8875Dma`] for synchronous
//!   ISR-safe access, and [`AsyncSharedRa8875Dma`] for the async-capable
//!   variant.
//! - **Async support** (`asynch`): [`asynch::AsyncRa8875DmaExt::wait_done`]
//!   and the interrupt handler that wakes it.
//!
//! # Feature Flags
//!
//! - `critical-section`: enables this module.
//! - `async`: enables the `asynch` submodule (also requires
//!   `critical-section`, which `async` pulls in).
//!
//! # Example
//!
//! ```ignore
//! use ra8875_dma::sync::SharedRa8875Dma;
//!
//! static PANEL: SharedRa8875Dma<Spi, Cs, Dma, 168, 152> =
//!     SharedRa8875Dma::new(spi, cs, dma, DriverConfig::new(480, 272));
//!
//! PANEL.with(|panel| panel.draw_pixel_area(addr, 800, 0, 0, 100, None).unwrap());
//!
//! #[interrupt]
//! fn DMA_IRQ() {
//!     PANEL.service_interrupt().ok();
//! }
//! ```

mod primitives;

#[cfg(feature = "async")]
pub use primitives::AtomicWaker;
pub use primitives::CriticalSectionCell;

mod shared;

pub use shared::{
    AsyncSharedRa8875Dma, AsyncSharedRa8875DmaDefault, SharedRa8875Dma, SharedRa8875DmaDefault,
};

#[cfg(feature = "async")]
pub mod asynch;

#[cfg(feature = "async")]
pub use asynch::{AsyncCompletionState, AsyncRa8875DmaExt, async_interrupt_handler};
