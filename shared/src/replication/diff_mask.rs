use tandem_serde::{BitReader, BitWrite, SerdeErr};

/// A fixed-length bit mask, one bit per replicated field of an entity
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiffMask {
    mask: Vec<u8>,
}

impl DiffMask {
    /// Create a mask with room for `byte_number * 8` fields
    pub fn new(byte_number: u8) -> Self {
        Self {
            mask: vec![0; byte_number as usize],
        }
    }

    /// Create a mask just large enough for `field_count` fields
    pub fn for_fields(field_count: usize) -> Self {
        Self {
            mask: vec![0; field_count.div_ceil(8)],
        }
    }

    pub fn bit(&self, index: u8) -> Option<bool> {
        let byte = self.mask.get((index / 8) as usize)?;
        Some(byte & (1u8 << (index % 8)) != 0)
    }

    /// Set a bit, growing the mask if the index lies beyond it
    pub fn set_bit(&mut self, index: u8, value: bool) {
        let byte_index = (index / 8) as usize;
        if byte_index >= self.mask.len() {
            if !value {
                return;
            }
            self.mask.resize(byte_index + 1, 0);
        }
        let bit: u8 = 1 << (index % 8);
        if value {
            self.mask[byte_index] |= bit;
        } else {
            self.mask[byte_index] &= !bit;
        }
    }

    pub fn clear(&mut self) {
        self.mask.iter_mut().for_each(|byte| *byte = 0);
    }

    pub fn is_clear(&self) -> bool {
        self.mask.iter().all(|byte| *byte == 0)
    }

    pub fn byte_number(&self) -> usize {
        self.mask.len()
    }

    /// Indices of every set bit, ascending
    pub fn ones(&self) -> impl Iterator<Item = usize> + '_ {
        self.mask.iter().enumerate().flat_map(|(byte_index, byte)| {
            (0..8usize)
                .filter(move |bit| byte & (1u8 << bit) != 0)
                .map(move |bit| byte_index * 8 + bit)
        })
    }

    pub fn or(&mut self, other: &DiffMask) {
        if other.mask.len() > self.mask.len() {
            self.mask.resize(other.mask.len(), 0);
        }
        for (byte, other_byte) in self.mask.iter_mut().zip(other.mask.iter()) {
            *byte |= other_byte;
        }
    }

    pub fn ser(&self, writer: &mut dyn BitWrite) {
        for byte in &self.mask {
            writer.write_byte(*byte);
        }
    }

    /// Read a mask whose byte length both sides already agree on
    pub fn de(reader: &mut BitReader, byte_number: usize) -> Result<Self, SerdeErr> {
        let mut mask = Vec::with_capacity(byte_number);
        for _ in 0..byte_number {
            mask.push(reader.read_byte()?);
        }
        Ok(Self { mask })
    }
}
