use crate::{
    bit_reader::BitReader, bit_writer::BitWrite, error::SerdeErr, serde::Serde, ConstBitLength,
    UnsignedVariableInteger,
};

// Unit

impl Serde for () {
    fn ser(&self, _: &mut dyn BitWrite) {}

    fn de(_: &mut BitReader) -> Result<Self, SerdeErr> {
        Ok(())
    }

    fn bit_length(&self) -> u32 {
        0
    }
}

// Boolean

impl Serde for bool {
    fn ser(&self, writer: &mut dyn BitWrite) {
        writer.write_bit(*self);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        reader.read_bit()
    }

    fn bit_length(&self) -> u32 {
        1
    }
}

impl ConstBitLength for bool {
    fn const_bit_length() -> u32 {
        1
    }
}

// Numbers are written byte-wise, little endian

macro_rules! impl_serde_for_number {
    ($impl_type:ty, $bytes:expr) => {
        impl Serde for $impl_type {
            fn ser(&self, writer: &mut dyn BitWrite) {
                for byte in self.to_le_bytes() {
                    writer.write_byte(byte);
                }
            }

            fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
                let mut bytes = [0u8; $bytes];
                for byte in bytes.iter_mut() {
                    *byte = reader.read_byte()?;
                }
                Ok(<$impl_type>::from_le_bytes(bytes))
            }

            fn bit_length(&self) -> u32 {
                <Self as ConstBitLength>::const_bit_length()
            }
        }

        impl ConstBitLength for $impl_type {
            fn const_bit_length() -> u32 {
                $bytes * 8
            }
        }
    };
}

impl_serde_for_number!(u8, 1);
impl_serde_for_number!(u16, 2);
impl_serde_for_number!(u32, 4);
impl_serde_for_number!(u64, 8);
impl_serde_for_number!(i8, 1);
impl_serde_for_number!(i16, 2);
impl_serde_for_number!(i32, 4);
impl_serde_for_number!(i64, 8);
impl_serde_for_number!(f32, 4);
impl_serde_for_number!(f64, 8);

// Collections

fn write_length(length: usize, writer: &mut dyn BitWrite) {
    UnsignedVariableInteger::<5>::new(length as u64).ser(writer);
}

fn read_length(reader: &mut BitReader) -> Result<usize, SerdeErr> {
    UnsignedVariableInteger::<5>::de(reader)?.to::<usize>()
}

fn length_bits(length: usize) -> u32 {
    UnsignedVariableInteger::<5>::new(length as u64).bit_length()
}

impl Serde for String {
    fn ser(&self, writer: &mut dyn BitWrite) {
        write_length(self.len(), writer);
        for byte in self.as_bytes() {
            writer.write_byte(*byte);
        }
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        let length = read_length(reader)?;
        let mut bytes = Vec::new();
        for _ in 0..length {
            bytes.push(reader.read_byte()?);
        }
        String::from_utf8(bytes).map_err(|_| SerdeErr::InvalidUtf8)
    }

    fn bit_length(&self) -> u32 {
        length_bits(self.len()) + (self.len() as u32) * 8
    }
}

impl<T: Serde> Serde for Vec<T> {
    fn ser(&self, writer: &mut dyn BitWrite) {
        write_length(self.len(), writer);
        for item in self {
            item.ser(writer);
        }
    }

    // no preallocation: a hostile length runs into EndOfBuffer instead of a huge allocation
    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        let length = read_length(reader)?;
        let mut output = Vec::new();
        for _ in 0..length {
            output.push(T::de(reader)?);
        }
        Ok(output)
    }

    fn bit_length(&self) -> u32 {
        length_bits(self.len()) + self.iter().map(Serde::bit_length).sum::<u32>()
    }
}

impl<T: Serde> Serde for Option<T> {
    fn ser(&self, writer: &mut dyn BitWrite) {
        writer.write_bit(self.is_some());
        if let Some(value) = self {
            value.ser(writer);
        }
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        if reader.read_bit()? {
            Ok(Some(T::de(reader)?))
        } else {
            Ok(None)
        }
    }

    fn bit_length(&self) -> u32 {
        1 + self.as_ref().map_or(0, Serde::bit_length)
    }
}

// Tuples

impl<A: Serde, B: Serde> Serde for (A, B) {
    fn ser(&self, writer: &mut dyn BitWrite) {
        self.0.ser(writer);
        self.1.ser(writer);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        Ok((A::de(reader)?, B::de(reader)?))
    }

    fn bit_length(&self) -> u32 {
        self.0.bit_length() + self.1.bit_length()
    }
}

impl<A: Serde, B: Serde, C: Serde> Serde for (A, B, C) {
    fn ser(&self, writer: &mut dyn BitWrite) {
        self.0.ser(writer);
        self.1.ser(writer);
        self.2.ser(writer);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        Ok((A::de(reader)?, B::de(reader)?, C::de(reader)?))
    }

    fn bit_length(&self) -> u32 {
        self.0.bit_length() + self.1.bit_length() + self.2.bit_length()
    }
}
