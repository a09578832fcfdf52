//! Error types for the RA8875 DMA pixel-streaming driver
//!
//! Errors are organized by domain for better diagnostics:
//! - [`RingError`]: descriptor ring / working-storage exhaustion
//! - [`CoordError`]: coordinate-register programmer errors
//! - [`SpiError`]: synchronous SPI path failures (timeout, overrun)
//! - [`InitError`]: bring-up failures
//!
//! The unified [`Error`] enum wraps all domain errors and is returned
//! by the fallible entry points on the driver facade.

// =============================================================================
// Ring Errors
// =============================================================================

/// Descriptor ring and working-storage errors.
///
/// These occur while a cold build or hot patch is filling the descriptor
/// ring; they are recovered locally (the planner simply stops adding rows
/// and the next interrupt refills) rather than aborting the operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RingError {
    /// The descriptor array has no free slots.
    Full,
    /// The working-storage arena has no room for the requested bytes.
    WorkingStorageFull,
}

impl core::fmt::Display for RingError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl RingError {
    /// Returns a human-readable description of the error
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            RingError::Full => "descriptor ring full",
            RingError::WorkingStorageFull => "working storage full",
        }
    }
}

// =============================================================================
// Coordinate Errors
// =============================================================================

/// Coordinate-register programmer errors.
///
/// `add_coord_bits` only accepts the four recognized cursor registers; any
/// other tag is a programmer error, not a runtime condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CoordError {
    /// The register tag was not one of CURH0, CURH1, CURV0, CURV1.
    InvalidRegister,
}

impl core::fmt::Display for CoordError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl CoordError {
    /// Returns a human-readable description of the error
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            CoordError::InvalidRegister => "invalid cursor register tag",
        }
    }
}

// =============================================================================
// SPI Errors
// =============================================================================

/// Synchronous SPI path errors.
///
/// Timeout and overrun can be reported together from a single receive, so
/// they are represented as independent flags rather than an exclusive enum
/// (mirroring the bit-packed status the original driver returns).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SpiError {
    /// The blocking receive exceeded the configured `dma_timeout_ms`.
    pub timeout: bool,
    /// The SPI overrun-error status bit was set after the receive.
    pub overrun: bool,
}

impl SpiError {
    /// No error condition set.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            timeout: false,
            overrun: false,
        }
    }

    /// True if either `timeout` or `overrun` is set.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        self.timeout || self.overrun
    }
}

impl core::fmt::Display for SpiError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match (self.timeout, self.overrun) {
            (true, true) => f.write_str("spi timeout and overrun"),
            (true, false) => f.write_str("spi timeout"),
            (false, true) => f.write_str("spi overrun"),
            (false, false) => f.write_str("no spi error"),
        }
    }
}

// =============================================================================
// Init Errors
// =============================================================================

/// Bring-up failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InitError {
    /// The identification register did not return the expected `0x75`.
    BadDeviceId(u8),
}

impl core::fmt::Display for InitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            InitError::BadDeviceId(id) => write!(f, "unexpected device id 0x{id:02X}"),
        }
    }
}

// =============================================================================
// Unified Error Type
// =============================================================================

/// Wraps all domain-specific errors for unified error handling.
///
/// ```ignore
/// match result {
///     Err(Error::Ring(RingError::Full)) => { /* retry smaller region */ }
///     Err(Error::Spi(e)) if e.timeout => { /* ... */ }
///     _ => {}
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Descriptor ring / working-storage error
    Ring(RingError),
    /// Coordinate-register programmer error
    Coord(CoordError),
    /// Synchronous SPI path error
    Spi(SpiError),
    /// Bring-up error
    Init(InitError),
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::Ring(e) => write!(f, "ring: {}", e.as_str()),
            Error::Coord(e) => write!(f, "coord: {}", e.as_str()),
            Error::Spi(e) => write!(f, "spi: {e}"),
            Error::Init(e) => write!(f, "init: {e}"),
        }
    }
}

impl From<RingError> for Error {
    fn from(e: RingError) -> Self {
        Error::Ring(e)
    }
}

impl From<CoordError> for Error {
    fn from(e: CoordError) -> Self {
        Error::Coord(e)
    }
}

impl From<SpiError> for Error {
    fn from(e: SpiError) -> Self {
        Error::Spi(e)
    }
}

impl From<InitError> for Error {
    fn from(e: InitError) -> Self {
        Error::Init(e)
    }
}

/// Result type alias for driver operations
pub type Result<T> = core::result::Result<T, Error>;

/// Result type alias for ring operations
pub type RingResult<T> = core::result::Result<T, RingError>;

/// Result type alias for coordinate-register operations
pub type CoordResult<T> = core::result::Result<T, CoordError>;

/// Result type alias for synchronous SPI operations
pub type SpiResult<T> = core::result::Result<T, SpiError>;

/// Result type alias for bring-up
pub type InitResult<T> = core::result::Result<T, InitError>;

// =============================================================================
// Unit Tests
// =============================================================================
