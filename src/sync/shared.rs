//! ISR-safe driver wrappers using critical sections.
//!
//! Provides [`SharedRa8875Dma`] for synchronous ISR-safe access and
//! [`AsyncSharedRa8875Dma`] for async-capable ISR-safe access.

use super::primitives::CriticalSectionCell;
use crate::driver::Ra8875Dma;
use crate::error::Result;
use crate::hal::{ChipSelectPin, DmaChannel, SpiBus};
use crate::operation::Callback;

/// ISR-safe driver wrapper using critical sections.
///
/// All access goes through `critical_section::with()`, disabling
/// interrupts for the duration of the closure. The completion interrupt
/// handler and the foreground both reach the driver through the same
/// `with` call, so [`Ra8875Dma::service_interrupt`] and
/// [`Ra8875Dma::draw_pixel_area`] never run concurrently with each other.
///
/// # Example
///
/// ```ignore
/// static PANEL: SharedRa8875Dma<Spi, Cs, Dma, 168, 152> =
///     SharedRa8875Dma::new(spi, cs, dma, DriverConfig::new(480, 272));
///
/// PANEL.with(|panel| panel.draw_pixel_area(addr, 800, 0, 0, 100, None).unwrap());
/// ```
pub struct SharedRa8875Dma<S, C, D, const CAP_FRAMES: usize, const CAP_BYTES: usize>
where
    S: SpiBus,
    C: ChipSelectPin,
    D: DmaChannel,
{
    inner: CriticalSectionCell<Ra8875Dma<S, C, D, CAP_FRAMES, CAP_BYTES>>,
}

impl<S, C, D, const CAP_FRAMES: usize, const CAP_BYTES: usize>
    SharedRa8875Dma<S, C, D, CAP_FRAMES, CAP_BYTES>
where
    S: SpiBus,
    C: ChipSelectPin,
    D: DmaChannel,
{
    /// Create a new shared driver instance (const, suitable for static
    /// initialization).
    pub const fn new(spi: S, cs: C, dma: D, config: crate::config::DriverConfig) -> Self {
        Self {
            inner: CriticalSectionCell::new(Ra8875Dma::new(spi, cs, dma, config)),
        }
    }

    /// Execute a closure with exclusive access to the driver.
    ///
    /// Interrupts are disabled for the duration of the closure.
    #[inline]
    pub fn with<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&mut Ra8875Dma<S, C, D, CAP_FRAMES, CAP_BYTES>) -> R,
    {
        self.inner.with(f)
    }

    /// Try to execute a closure, returning `None` if already borrowed.
    #[inline]
    pub fn try_with<R, F>(&self, f: F) -> Option<R>
    where
        F: FnOnce(&mut Ra8875Dma<S, C, D, CAP_FRAMES, CAP_BYTES>) -> R,
    {
        self.inner.try_with(f)
    }

    /// Service one end-of-chain interrupt. Call this from the DMA
    /// channel's completion ISR.
    ///
    /// # Errors
    /// Propagates errors from [`Ra8875Dma::service_interrupt`].
    pub fn service_interrupt(&self) -> Result<bool> {
        self.inner.with(Ra8875Dma::service_interrupt)
    }
}

/// ISR-safe async-capable driver wrapper.
///
/// Combines the ISR-safety of [`SharedRa8875Dma`] with an async
/// [`Self::wait_done`] that resolves once the completion interrupt has
/// drained the whole `draw_pixel_area` region.
///
/// # Example
///
/// ```ignore
/// static PANEL: AsyncSharedRa8875Dma<Spi, Cs, Dma, 168, 152> =
///     AsyncSharedRa8875Dma::new(spi, cs, dma, DriverConfig::new(480, 272));
///
/// async fn task() {
///     PANEL.with(|p| p.draw_pixel_area(addr, 800, 0, 0, 100, None).unwrap());
///     PANEL.wait_done().await;
/// }
/// ```
pub struct AsyncSharedRa8875Dma<S, C, D, const CAP_FRAMES: usize, const CAP_BYTES: usize>
where
    S: SpiBus,
    C: ChipSelectPin,
    D: DmaChannel,
{
    inner: CriticalSectionCell<Ra8875Dma<S, C, D, CAP_FRAMES, CAP_BYTES>>,
}

impl<S, C, D, const CAP_FRAMES: usize, const CAP_BYTES: usize>
    AsyncSharedRa8875Dma<S, C, D, CAP_FRAMES, CAP_BYTES>
where
    S: SpiBus,
    C: ChipSelectPin,
    D: DmaChannel,
{
    /// Create a new async shared driver instance (const, suitable for
    /// static initialization).
    pub const fn new(spi: S, cs: C, dma: D, config: crate::config::DriverConfig) -> Self {
        Self {
            inner: CriticalSectionCell::new(Ra8875Dma::new(spi, cs, dma, config)),
        }
    }

    /// Execute a closure with exclusive access to the driver (synchronous).
    #[inline]
    pub fn with<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&mut Ra8875Dma<S, C, D, CAP_FRAMES, CAP_BYTES>) -> R,
    {
        self.inner.with(f)
    }

    /// Try to execute a closure, returning `None` if already borrowed.
    #[inline]
    pub fn try_with<R, F>(&self, f: F) -> Option<R>
    where
        F: FnOnce(&mut Ra8875Dma<S, C, D, CAP_FRAMES, CAP_BYTES>) -> R,
    {
        self.inner.try_with(f)
    }

    /// True while a `draw_pixel_area` operation is in progress.
    pub fn is_busy(&self) -> bool {
        self.inner.with(Ra8875Dma::is_busy)
    }

    /// Service one end-of-chain interrupt, same as
    /// [`Ra8875Dma::service_interrupt`], from behind the critical section.
    ///
    /// # Errors
    /// Propagates errors from [`Ra8875Dma::service_interrupt`].
    pub fn service_interrupt(&self) -> Result<bool> {
        self.inner.with(Ra8875Dma::service_interrupt)
    }

    /// Starts streaming a rectangular pixel region, same as
    /// [`Ra8875Dma::draw_pixel_area`], from behind the critical section.
    ///
    /// # Errors
    /// Propagates errors from [`Ra8875Dma::draw_pixel_area`].
    pub fn draw_pixel_area(
        &self,
        pixels_addr: u32,
        num: u32,
        x: i32,
        y: i32,
        width: u16,
        callback: Option<Callback>,
    ) -> Result<()> {
        self.inner
            .with(|d| d.draw_pixel_area(pixels_addr, num, x, y, width, callback))
    }
}

/// Default async-capable shared driver, sized for
/// [`crate::config::DriverConfig::new`]'s 21-descriptor/19-byte-per-line
/// defaults at 8 lines per batch.
pub type AsyncSharedRa8875DmaDefault<S, C, D> = AsyncSharedRa8875Dma<S, C, D, 168, 152>;

/// Default shared driver, sized the same way.
pub type SharedRa8875DmaDefault<S, C, D> = SharedRa8875Dma<S, C, D, 168, 152>;
