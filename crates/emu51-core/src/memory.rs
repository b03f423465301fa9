//! Data and program memory models.
//!
//! `DataMemory` is the byte-addressable read/write space with an overlapping
//! bit-addressable view; `ProgramMemory` is the separate execution-read-only
//! space used by the code-lookup instructions. Both report out-of-range
//! accesses as terminal faults rather than wrapping or clamping.

use crate::fault::Fault;

/// Default data-memory size: the 8051 internal data space.
pub const DATA_MEMORY_BYTES: usize = 256;

/// Default program-memory size used when no image is supplied.
pub const PROGRAM_MEMORY_BYTES: usize = 256;

/// Number of bit addresses carried by each byte of data memory.
pub const BITS_PER_BYTE: usize = 8;

/// Byte-addressable data memory with an aliased bit-addressable view.
///
/// There is exactly one backing store. Bit address `b` names bit `b % 8`
/// (low to high) of byte `b / 8`, so a byte write is always observable as
/// eight individual bits and vice versa.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct DataMemory {
    bytes: Box<[u8]>,
}

impl Default for DataMemory {
    fn default() -> Self {
        Self::new(DATA_MEMORY_BYTES)
    }
}

impl DataMemory {
    /// Allocates a zeroed data memory of `size_bytes` bytes.
    #[must_use]
    pub fn new(size_bytes: usize) -> Self {
        Self {
            bytes: vec![0; size_bytes].into_boxed_slice(),
        }
    }

    /// Size of the byte-addressable space.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns `true` when the memory has zero capacity.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Number of valid bit addresses (eight per byte).
    #[must_use]
    pub fn bit_len(&self) -> usize {
        self.bytes.len() * BITS_PER_BYTE
    }

    /// Reads the byte at `addr`.
    ///
    /// # Errors
    ///
    /// Returns [`Fault::ByteAddressOutOfRange`] when `addr` is outside the
    /// configured size.
    pub fn byte(&self, addr: usize) -> Result<u8, Fault> {
        self.bytes
            .get(addr)
            .copied()
            .ok_or(Fault::ByteAddressOutOfRange { addr })
    }

    /// Stores `value` at byte address `addr`.
    ///
    /// # Errors
    ///
    /// Returns [`Fault::ByteAddressOutOfRange`] when `addr` is outside the
    /// configured size.
    pub fn write_byte(&mut self, addr: usize, value: u8) -> Result<(), Fault> {
        let cell = self
            .bytes
            .get_mut(addr)
            .ok_or(Fault::ByteAddressOutOfRange { addr })?;
        *cell = value;
        Ok(())
    }

    /// Reads the bit at bit address `addr`, returning 0 or 1.
    ///
    /// # Errors
    ///
    /// Returns [`Fault::BitAddressOutOfRange`] when `addr` has no backing
    /// byte.
    pub fn bit(&self, addr: usize) -> Result<u8, Fault> {
        let byte = self
            .bytes
            .get(addr / BITS_PER_BYTE)
            .ok_or(Fault::BitAddressOutOfRange { addr })?;
        Ok((byte >> (addr % BITS_PER_BYTE)) & 1)
    }

    /// Writes the bit at bit address `addr`; any nonzero `value` stores 1.
    ///
    /// The other seven bits of the underlying byte are left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`Fault::BitAddressOutOfRange`] when `addr` has no backing
    /// byte.
    pub fn write_bit(&mut self, addr: usize, value: u8) -> Result<(), Fault> {
        let byte = self
            .bytes
            .get_mut(addr / BITS_PER_BYTE)
            .ok_or(Fault::BitAddressOutOfRange { addr })?;
        let mask = 1u8 << (addr % BITS_PER_BYTE);
        if value == 0 {
            *byte &= !mask;
        } else {
            *byte |= mask;
        }
        Ok(())
    }

    /// Sets the bit at `addr` to 1.
    ///
    /// # Errors
    ///
    /// Returns [`Fault::BitAddressOutOfRange`] when `addr` has no backing
    /// byte.
    pub fn set(&mut self, addr: usize) -> Result<(), Fault> {
        self.write_bit(addr, 1)
    }

    /// Clears the bit at `addr` to 0.
    ///
    /// # Errors
    ///
    /// Returns [`Fault::BitAddressOutOfRange`] when `addr` has no backing
    /// byte.
    pub fn clear(&mut self, addr: usize) -> Result<(), Fault> {
        self.write_bit(addr, 0)
    }
}

/// Execution-read-only program memory (ROM / code-lookup space).
///
/// No instruction in the set writes to it, so the type exposes no write
/// operation at all.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct ProgramMemory {
    bytes: Box<[u8]>,
}

impl Default for ProgramMemory {
    fn default() -> Self {
        Self::new(PROGRAM_MEMORY_BYTES)
    }
}

impl ProgramMemory {
    /// Allocates a zero-filled program memory of `size_bytes` bytes.
    #[must_use]
    pub fn new(size_bytes: usize) -> Self {
        Self {
            bytes: vec![0; size_bytes].into_boxed_slice(),
        }
    }

    /// Wraps a pre-built lookup-table image.
    #[must_use]
    pub fn from_image(image: Vec<u8>) -> Self {
        Self {
            bytes: image.into_boxed_slice(),
        }
    }

    /// Size of the program-memory space.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns `true` when the memory has zero capacity.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Reads the byte at `addr`.
    ///
    /// # Errors
    ///
    /// Returns [`Fault::RomAddressOutOfRange`] when `addr` is outside the
    /// image.
    pub fn read(&self, addr: usize) -> Result<u8, Fault> {
        self.bytes
            .get(addr)
            .copied()
            .ok_or(Fault::RomAddressOutOfRange { addr })
    }
}

#[cfg(test)]
mod tests {
    use super::{DataMemory, ProgramMemory, BITS_PER_BYTE, DATA_MEMORY_BYTES};
    use crate::fault::Fault;
    use proptest::prelude::*;

    #[test]
    fn default_data_memory_is_zeroed_internal_space() {
        let ram = DataMemory::default();
        assert_eq!(ram.len(), DATA_MEMORY_BYTES);
        assert_eq!(ram.bit_len(), DATA_MEMORY_BYTES * BITS_PER_BYTE);
        for addr in 0..ram.len() {
            assert_eq!(ram.byte(addr), Ok(0));
        }
    }

    #[test]
    fn byte_write_is_visible_through_the_bit_view() {
        let mut ram = DataMemory::default();
        ram.write_byte(0x20, 0b1010_0101).unwrap();
        let bits: Vec<u8> = (0..8).map(|i| ram.bit(0x20 * 8 + i).unwrap()).collect();
        assert_eq!(bits, [1, 0, 1, 0, 0, 1, 0, 1]);
    }

    #[test]
    fn bit_writes_compose_into_the_byte_view() {
        let mut ram = DataMemory::default();
        for (i, bit) in [1u8, 1, 0, 0, 1, 0, 1, 1].iter().enumerate() {
            ram.write_bit(0x30 * 8 + i, *bit).unwrap();
        }
        assert_eq!(ram.byte(0x30), Ok(0b1101_0011));
    }

    #[test]
    fn bit_write_leaves_other_seven_bits_untouched() {
        let mut ram = DataMemory::default();
        ram.write_byte(0x10, 0xFF).unwrap();
        ram.write_bit(0x10 * 8 + 3, 0).unwrap();
        assert_eq!(ram.byte(0x10), Ok(0b1111_0111));
        ram.set(0x10 * 8 + 3).unwrap();
        assert_eq!(ram.byte(0x10), Ok(0xFF));
    }

    #[test]
    fn nonzero_bit_values_store_one() {
        let mut ram = DataMemory::default();
        ram.write_bit(5, 0xFF).unwrap();
        assert_eq!(ram.bit(5), Ok(1));
        ram.clear(5).unwrap();
        assert_eq!(ram.bit(5), Ok(0));
    }

    #[test]
    fn out_of_range_accesses_fault() {
        let mut ram = DataMemory::new(16);
        assert_eq!(
            ram.byte(16),
            Err(Fault::ByteAddressOutOfRange { addr: 16 })
        );
        assert_eq!(
            ram.write_byte(100, 1),
            Err(Fault::ByteAddressOutOfRange { addr: 100 })
        );
        assert_eq!(
            ram.bit(16 * 8),
            Err(Fault::BitAddressOutOfRange { addr: 128 })
        );
        assert_eq!(
            ram.set(16 * 8),
            Err(Fault::BitAddressOutOfRange { addr: 128 })
        );
    }

    #[test]
    fn rom_reads_back_its_image_and_faults_past_it() {
        let rom = ProgramMemory::from_image(vec![0xDE, 0xAD, 0xBE, 0xEF]);
        assert_eq!(rom.len(), 4);
        assert_eq!(rom.read(0), Ok(0xDE));
        assert_eq!(rom.read(3), Ok(0xEF));
        assert_eq!(rom.read(4), Err(Fault::RomAddressOutOfRange { addr: 4 }));
    }

    proptest! {
        #[test]
        fn property_byte_and_bit_views_alias_one_store(
            addr in 0usize..DATA_MEMORY_BYTES,
            value in any::<u8>(),
        ) {
            let mut ram = DataMemory::default();
            ram.write_byte(addr, value).unwrap();
            let mut composed = 0u8;
            for i in 0..8 {
                composed |= ram.bit(addr * 8 + i).unwrap() << i;
            }
            prop_assert_eq!(composed, value);

            let mut other = DataMemory::default();
            for i in 0..8 {
                other.write_bit(addr * 8 + i, (value >> i) & 1).unwrap();
            }
            prop_assert_eq!(other.byte(addr).unwrap(), value);
        }
    }
}
