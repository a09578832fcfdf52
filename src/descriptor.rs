//! The DMA linked-list descriptor: one chained transfer record.
//!
//! Grounded in the teacher's `VolatileCell`/`TxDescriptor` pattern
//! (`src/internal/dma/descriptor/{mod,tx}.rs`) and the field layout of
//! `DMA_LLI_Due.h`'s `_LLI`/`CTRLA_Field`/`CTRLB_Field`.

/// Volatile cell wrapper for descriptor fields.
///
/// Ensures every access is volatile so the compiler cannot reorder or cache
/// reads/writes the DMA engine performs concurrently with the foreground.
#[repr(transparent)]
pub(crate) struct VolatileCell<T: Copy> {
    value: core::cell::UnsafeCell<T>,
}

// Safety: all access goes through volatile operations; u32-sized fields are
// read/written atomically by both the CPU and the DMA engine on the target
// architectures this crate supports.
unsafe impl<T: Copy> Sync for VolatileCell<T> {}

impl<T: Copy> VolatileCell<T> {
    #[inline(always)]
    pub const fn new(value: T) -> Self {
        Self {
            value: core::cell::UnsafeCell::new(value),
        }
    }

    #[inline(always)]
    pub fn get(&self) -> T {
        unsafe { core::ptr::read_volatile(self.value.get()) }
    }

    #[inline(always)]
    pub fn set(&self, value: T) {
        unsafe { core::ptr::write_volatile(self.value.get(), value) }
    }
}

impl<T: Copy + Default> Default for VolatileCell<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

/// Transfer widths the controller's `CTRLA` field recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum TransferWidth {
    /// One byte per beat.
    Byte = 0,
    /// Two bytes per beat.
    HalfWord = 1,
    /// Four bytes per beat.
    Word = 2,
}

/// Flow-control direction the controller's `CTRLB` field recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum FlowControl {
    /// Memory-to-memory, DMA controller paced.
    MemoryToMemory = 0,
    /// Memory-to-peripheral, peripheral paced (SPI transmit).
    MemoryToPeripheral = 1,
}

/// Whether an endpoint address increments each beat or stays fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AddressMode {
    /// The address is re-read/re-written every beat (e.g. a peripheral
    /// data register or a broadcast byte).
    Fixed,
    /// The address advances by the transfer width each beat.
    Incrementing,
}

const CTRLA_DONE_BIT: u32 = 1 << 31;
const CTRLA_SRC_WIDTH_SHIFT: u32 = 24;
const CTRLA_DST_WIDTH_SHIFT: u32 = 28;
const CTRLA_BTSIZE_MASK: u32 = 0x0000_FFFF;

const CTRLB_SRC_INCR_SHIFT: u32 = 24;
const CTRLB_DST_INCR_SHIFT: u32 = 28;
const CTRLB_FC_SHIFT: u32 = 21;
const CTRLB_FC_MASK: u32 = 0b111 << CTRLB_FC_SHIFT;

const ADDR_MODE_FIXED: u32 = 0;
const ADDR_MODE_INCR: u32 = 1;

const fn addr_mode_bits(mode: AddressMode) -> u32 {
    match mode {
        AddressMode::Fixed => ADDR_MODE_FIXED,
        AddressMode::Incrementing => ADDR_MODE_INCR,
    }
}

/// One linked-list transfer record: source, destination, transfer-control
/// bitfields, and the address of the following descriptor.
///
/// Descriptors live in a fixed-size contiguous array; `next` is stale or
/// zero until [`crate::ring::DescriptorRing::finalize`] writes it in a
/// single pass (§4.2).
#[repr(C)]
#[repr(align(4))]
pub struct Descriptor {
    source_address: VolatileCell<u32>,
    destination_address: VolatileCell<u32>,
    control_a: VolatileCell<u32>,
    control_b: VolatileCell<u32>,
    next: VolatileCell<u32>,
}

impl Descriptor {
    /// A zeroed descriptor. Not a valid chain member until [`Self::program`]
    /// is called.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            source_address: VolatileCell::new(0),
            destination_address: VolatileCell::new(0),
            control_a: VolatileCell::new(0),
            control_b: VolatileCell::new(0),
            next: VolatileCell::new(0),
        }
    }

    /// Programs every field of this descriptor for one transfer.
    #[allow(clippy::too_many_arguments)]
    pub fn program(
        &self,
        source_address: u32,
        destination_address: u32,
        byte_count: u16,
        src_width: TransferWidth,
        dst_width: TransferWidth,
        src_mode: AddressMode,
        dst_mode: AddressMode,
        flow_control: FlowControl,
    ) {
        self.source_address.set(source_address);
        self.destination_address.set(destination_address);
        let control_a = (byte_count as u32 & CTRLA_BTSIZE_MASK)
            | ((src_width as u32) << CTRLA_SRC_WIDTH_SHIFT)
            | ((dst_width as u32) << CTRLA_DST_WIDTH_SHIFT);
        self.control_a.set(control_a);
        let control_b = (addr_mode_bits(src_mode) << CTRLB_SRC_INCR_SHIFT)
            | (addr_mode_bits(dst_mode) << CTRLB_DST_INCR_SHIFT)
            | ((flow_control as u32) << CTRLB_FC_SHIFT & CTRLB_FC_MASK);
        self.control_b.set(control_b);
    }

    /// Source address field.
    #[must_use]
    pub fn source_address(&self) -> u32 {
        self.source_address.get()
    }

    /// Destination address field.
    #[must_use]
    pub fn destination_address(&self) -> u32 {
        self.destination_address.get()
    }

    /// Patches the source address in place, for hot-patch row refills.
    pub fn set_source_address(&self, addr: u32) {
        self.source_address.set(addr);
    }

    /// Transfer count (`BTSIZE`): the number of beats this descriptor
    /// moves, each `src_width`/`dst_width` wide. For byte-width transfers
    /// this equals the byte count.
    #[must_use]
    pub fn byte_count(&self) -> u16 {
        (self.control_a.get() & CTRLA_BTSIZE_MASK) as u16
    }

    /// Patches the transfer count in place, preserving width/done bits.
    pub fn set_byte_count(&self, byte_count: u16) {
        let current = self.control_a.get();
        self.control_a
            .set((current & !CTRLA_BTSIZE_MASK) | (byte_count as u32 & CTRLA_BTSIZE_MASK));
    }

    /// Address of the next descriptor in the chain, or zero at the tail.
    #[must_use]
    pub fn next(&self) -> u32 {
        self.next.get()
    }

    /// Writes the address of the next descriptor. Called only from
    /// [`crate::ring::DescriptorRing::finalize`].
    pub fn set_next(&self, addr: u32) {
        self.next.set(addr);
    }

    /// True once the DMA engine has retired this descriptor.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.control_a.get() & CTRLA_DONE_BIT != 0
    }

    /// Clears the done bit, preparing this slot for reuse or for the tail
    /// position of a finalized chain.
    pub fn clear_done(&self) {
        self.control_a.update_done(false);
    }
}

impl VolatileCell<u32> {
    fn update_done(&self, done: bool) {
        let v = self.get();
        self.set(if done {
            v | CTRLA_DONE_BIT
        } else {
            v & !CTRLA_DONE_BIT
        });
    }
}

impl Default for Descriptor {
    fn default() -> Self {
        Self::new()
    }
}
