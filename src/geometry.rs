//! Logical-to-physical coordinate transform.
//!
//! Grounded in `applyRotationX`/`applyRotationY` (declared in
//! `Adafruit_RA8875.h`) and the two write-direction branches in
//! `drawPixelsAreaDMA`/`drawPixelsDMADelegateRows`.

use crate::config::Rotation;

/// Transforms a logical X coordinate to a physical one.
///
/// Rotation 0 passes `x` through unchanged; rotation 2 mirrors it across
/// the panel width.
#[must_use]
pub const fn physical_x(x: i32, width: u16, rotation: Rotation) -> i32 {
    match rotation {
        Rotation::Zero => x,
        Rotation::Two => width as i32 - 1 - x,
    }
}

/// Transforms a logical Y coordinate to a physical one.
///
/// Rotation 0 adds `v_offset`; rotation 2 mirrors across the panel height
/// before adding it.
#[must_use]
pub const fn physical_y(y: i32, height: u16, rotation: Rotation, v_offset: u16) -> i32 {
    match rotation {
        Rotation::Zero => y + v_offset as i32,
        Rotation::Two => height as i32 - 1 - y + v_offset as i32,
    }
}

/// Transforms a logical `(x, y)` point to physical panel coordinates.
#[must_use]
pub const fn physical_point(
    x: i32,
    y: i32,
    width: u16,
    height: u16,
    rotation: Rotation,
    v_offset: u16,
) -> (i32, i32) {
    (
        physical_x(x, width, rotation),
        physical_y(y, height, rotation, v_offset),
    )
}

/// Transforms a logical `(x, y, w, h)` rectangle by running both corners
/// through [`physical_point`].
///
/// This reproduces a known bug in the source this crate was ported from:
/// the rotation helper is correct for a coordinate but not for a size, so
/// the `(w, h)` pair it returns is wrong under [`Rotation::Two`]. Scroll
/// windows and area fills under rotation 2 inherit this; it is preserved
/// here rather than fixed, matching behavior callers may already depend on.
#[must_use]
pub const fn physical_rect(
    x: i32,
    y: i32,
    w: i32,
    h: i32,
    width: u16,
    height: u16,
    rotation: Rotation,
    v_offset: u16,
) -> (i32, i32, i32, i32) {
    let (px, py) = physical_point(x, y, width, height, rotation, v_offset);
    let (pw, ph) = physical_point(w, h, width, height, rotation, v_offset);
    (px, py, pw, ph)
}

/// Returns the memory-write-control direction bits for the given rotation:
/// left-to-right/top-to-bottom for rotation 0, right-to-left/top-to-bottom
/// for rotation 2.
#[must_use]
pub const fn write_direction_bits(rotation: Rotation) -> u8 {
    match rotation {
        Rotation::Zero => crate::constants::MWCR0_LRTD,
        Rotation::Two => crate::constants::MWCR0_RLTD,
    }
}
