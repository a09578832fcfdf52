//! RA8875 DMA Pixel-Streaming Driver
//!
//! A `no_std`, `no_alloc` Rust implementation of the RA8875 TFT LCD
//! controller's DMA pixel-streaming subsystem.
//!
//! This crate provides a bare-metal driver for shipping rectangular pixel
//! regions to an RA8875 over SPI using a scatter-gather DMA descriptor
//! chain (a "linked list item", or LLI, chain on ARM DMA controllers),
//! built from the controller's 4-register direct-cursor-write protocol
//! rather than its command FIFO.
//!
//! # Architecture
//!
//! 1. **Geometry** ([`geometry`]): logical-to-physical coordinate
//!    rotation and the panel's vertical offset.
//! 2. **Planning** ([`planner`]): builds the fixed-size descriptor
//!    skeleton for a batch of rows once, then "hot-patches" per-row
//!    coordinates and pixel source addresses directly into the ring
//!    rather than rebuilding it for every batch.
//! 3. **Ring storage** ([`ring`], [`descriptor`], [`frame_builder`]):
//!    the const-generic descriptor array and its matching
//!    working-storage byte array, with volatile accessors matching the
//!    controller's descriptor layout.
//! 4. **Engine** ([`engine`]): programs the DMA channel and drives the
//!    idle -> armed -> (refilling -> armed)* -> completing -> idle
//!    interrupt state machine.
//! 5. **Facade** ([`driver`]): [`driver::Ra8875Dma`], the single type
//!    application code constructs and calls.
//!
//! Display initialization (PLL/timing programming), the 2D
//! hardware-accelerated drawing primitives, touch-panel sampling, PWM
//! backlight control, and the non-DMA byte-at-a-time pixel fallback are
//! all external collaborators and out of scope for this crate.
//!
//! # Features
//!
//! - `defmt`: implement `defmt::Format` for error and status types.
//! - `critical-section`: enable the ISR-safe [`sync::SharedRa8875Dma`]
//!   wrapper.
//! - `async`: enable async/await support ([`sync::asynch`]) on top of
//!   `critical-section`.
//!
//! # Example
//!
//! ```ignore
//! use ra8875_dma::{DriverConfig, Ra8875Dma};
//!
//! let mut panel = Ra8875Dma::new(spi, cs, dma, DriverConfig::new(480, 272));
//! panel.verify_device_id().unwrap();
//! panel.draw_pixel_area(framebuffer_addr, 480 * 272, 0, 0, 480, None).unwrap();
//!
//! // From the DMA channel's completion interrupt:
//! // panel.service_interrupt().unwrap();
//! ```

#![no_std]
#![deny(missing_docs)]
#![allow(unsafe_code)]
#![deny(unsafe_op_in_unsafe_fn)]
// Clippy lint levels live here; thresholds and config are in Cargo.toml's [lints].
#![deny(clippy::correctness)]
#![warn(
    clippy::suspicious,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::cloned_instead_of_copied,
    clippy::explicit_iter_loop,
    clippy::implicit_clone,
    clippy::inconsistent_struct_constructor,
    clippy::manual_assert,
    clippy::manual_let_else,
    clippy::match_same_arms,
    clippy::needless_pass_by_value,
    clippy::semicolon_if_nothing_returned,
    clippy::uninlined_format_args,
    clippy::unnested_or_patterns,
    clippy::std_instead_of_core,
    clippy::std_instead_of_alloc,
    clippy::alloc_instead_of_core
)]
#![allow(
    clippy::mod_module_files,
    clippy::self_named_module_files,
    clippy::similar_names,
    clippy::too_many_arguments,
    clippy::struct_excessive_bools,
    clippy::fn_params_excessive_bools,
    clippy::type_complexity,
    clippy::must_use_candidate,
    clippy::assertions_on_constants,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss,
    clippy::cast_lossless,
    clippy::panic_in_result_fn,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::module_name_repetitions,
    clippy::wildcard_imports,
    clippy::items_after_statements,
    clippy::let_underscore_future
)]

// =============================================================================
// Modules
// =============================================================================

pub mod config;
pub mod constants;
pub mod descriptor;
pub mod driver;
pub mod engine;
pub mod error;
pub mod frame_builder;
pub mod geometry;
pub mod hal;
pub mod operation;
pub mod planner;
pub mod ring;

#[cfg(feature = "critical-section")]
#[cfg_attr(docsrs, doc(cfg(feature = "critical-section")))]
pub mod sync;

// Test utilities (only available during testing)
#[cfg(test)]
pub mod testing;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{DriverConfig, Rotation};
pub use driver::{Ra8875Dma, Ra8875DmaDefault};
pub use error::{
    CoordError, CoordResult, Error, InitError, InitResult, Result, RingError, RingResult,
    SpiError, SpiResult,
};
pub use operation::{Callback, OperationKind};

// Re-export sync types when critical-section is enabled
#[cfg(feature = "critical-section")]
pub use sync::{CriticalSectionCell, SharedRa8875Dma, SharedRa8875DmaDefault};

// Re-export async types when the async feature is enabled
#[cfg(feature = "async")]
#[cfg_attr(docsrs, doc(cfg(feature = "async")))]
pub use sync::{
    AsyncRa8875DmaExt, AsyncSharedRa8875Dma, AsyncSharedRa8875DmaDefault, async_interrupt_handler,
};
