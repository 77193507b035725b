use crate::{bit_reader::BitReader, bit_writer::BitWrite, error::SerdeErr, BitCounter};

/// A type that can be written to and read back from a bit stream.
///
/// Replicated values must also be comparable and duplicable, since every
/// container keeps several snapshots of its value to diff against.
pub trait Serde: Sized + Clone + PartialEq {
    /// Serialize Self into a BitWrite
    fn ser(&self, writer: &mut dyn BitWrite);

    /// Parse Self from a BitReader
    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr>;

    /// Return the number of bits this value occupies once serialized
    fn bit_length(&self) -> u32 {
        let mut counter = BitCounter::new();
        self.ser(&mut counter);
        counter.bits_needed()
    }
}

/// Implemented by types whose serialized size never depends on the value
pub trait ConstBitLength {
    fn const_bit_length() -> u32;
}
