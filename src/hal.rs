//! Hardware abstraction boundary: the SPI peripheral, the chip-select pin,
//! and the DMA channel the core programs directly.
//!
//! These stand in for the driver's three external collaborators. None of
//! them is `embedded_hal::spi::SpiBus` — that trait assumes the HAL already
//! drives DMA internally and hides the descriptor-chain mechanics this
//! crate exists to implement. Instead each trait here is a narrow,
//! register-level boundary this crate owns, the same way the teacher owns
//! `MdioBus` rather than reusing a bus trait that doesn't fit MDIO framing.

pub use embedded_hal::delay::DelayNs;

/// Register-level access to the SPI peripheral.
///
/// Used directly by the synchronous path (§4.6) and by the DMA Engine
/// Adapter to read the status bits that gate interrupt completion.
pub trait SpiBus {
    /// Writes a byte to the transmit-data register.
    fn write_data(&mut self, byte: u8);

    /// Reads the receive-data register.
    fn read_data(&mut self) -> u8;

    /// True when the transmit FIFO has accepted the last byte written
    /// ("transmit empty").
    fn transmit_empty(&self) -> bool;

    /// True when a byte is available in the receive-data register.
    fn receive_ready(&self) -> bool;

    /// True when the overrun-error status bit is set.
    fn overrun(&self) -> bool;

    /// Address of the transmit-data register, for programming a DMA
    /// descriptor's fixed destination.
    fn transmit_data_address(&self) -> u32;

    /// Address of the receive-data register.
    fn receive_data_address(&self) -> u32;
}

/// The chip-select pin the Frame Builder toggles via DMA.
///
/// `mask_addr` returns a long-lived address rather than borrowing the pin:
/// DMA dereferences it asynchronously, well after this call returns, so it
/// cannot be satisfied by a transient `&mut` reference.
pub trait ChipSelectPin {
    /// Drives the pin high, synchronously.
    fn set_high(&mut self);

    /// Drives the pin low, synchronously.
    fn set_low(&mut self);

    /// Address of a stable word holding this pin's bitmask, suitable as a
    /// DMA source for pin-toggle descriptors (§4.3).
    fn mask_addr(&self) -> u32;

    /// Address of the PIO "set output" register this pin belongs to.
    fn set_register_address(&self) -> u32;

    /// Address of the PIO "clear output" register this pin belongs to.
    fn clear_register_address(&self) -> u32;
}

/// Register-level programming of the DMA channel that streams descriptors
/// from the ring.
pub trait DmaChannel {
    /// Disables the channel.
    fn disable(&mut self);

    /// Enables the channel.
    fn enable(&mut self);

    /// Writes the address of the head descriptor to the channel's
    /// next-descriptor register.
    fn set_next_descriptor(&mut self, addr: u32);

    /// Sets the channel control bits for incrementing source, fixed
    /// destination, and peripheral hardware handshake on the SPI transmit
    /// line.
    fn configure_memory_to_peripheral(&mut self);

    /// Enables the end-of-chain interrupt source.
    fn enable_interrupt(&mut self);

    /// Disables the end-of-chain interrupt source.
    fn disable_interrupt(&mut self);

    /// Reads and clears the controller's interrupt-status word; returns
    /// true if this channel's completion bit was set.
    fn take_interrupt_status(&mut self) -> bool;

    /// True once the channel has retired every descriptor in the chain.
    ///
    /// Used both by the interrupt handler and by the short blocking
    /// multi-byte path of §4.6.
    fn transfer_done(&self) -> bool;
}
