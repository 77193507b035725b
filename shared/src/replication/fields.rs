use log::warn;

use tandem_serde::{BitReader, BitWrite, Serde};

use crate::{
    replication::{
        diff_mask::DiffMask, error::VarError, owner::OwnerHandle, replicated::Replicated,
    },
    types::{ClientId, Tick},
};

/// An entity's replicated fields, in declaration order. Both sides of a
/// connection must declare the same fields in the same order.
pub trait ReplicatedFields {
    fn fields(&self) -> Vec<&dyn Replicated>;

    fn fields_mut(&mut self) -> Vec<&mut dyn Replicated>;

    /// Assign field indices and initialize every field. Returns `false` if
    /// any field is not ready yet; calling again later retries only those.
    fn initialize_fields(&mut self, owner: &OwnerHandle) -> bool {
        let mut ready = true;
        for (index, field) in self.fields_mut().into_iter().enumerate() {
            let Ok(field_index) = u8::try_from(index) else {
                warn!("Field {} exceeds the 256 replicated fields an entity may declare", index);
                ready = false;
                continue;
            };
            field.core_mut().set_field_index(field_index);
            ready &= field.initialize(owner);
        }
        ready
    }

    fn deinitialize_fields(&mut self) {
        for field in self.fields_mut() {
            field.deinitialize();
        }
    }

    fn dispose_fields(&mut self) {
        for field in self.fields_mut() {
            field.dispose();
        }
    }
}

/// Write the deltas of every field that is ready to send at `now` and
/// readable by `client`, preceded by a mask of which fields are present.
/// `client` is `None` when the destination is the authority.
///
/// Returns the mask, so the caller can `reset_sent` once this was the last
/// destination for the cycle.
pub fn write_updates(
    fields: &[&dyn Replicated],
    now: Tick,
    client: Option<ClientId>,
    writer: &mut dyn BitWrite,
) -> DiffMask {
    let mut mask = DiffMask::for_fields(fields.len());
    for (index, field) in fields.iter().enumerate() {
        let Ok(field_index) = u8::try_from(index) else {
            break;
        };
        let readable = client.map_or(true, |client| field.can_read(client));
        if readable && field.ready_to_send(now) {
            mask.set_bit(field_index, true);
        }
    }

    mask.ser(writer);
    for index in mask.ones() {
        fields[index].write_delta(writer);
    }
    mask
}

/// Read a payload produced by `write_updates` on `sender`, where `None` is
/// the authority. No field is touched if the mask names a field this side
/// does not declare.
///
/// Fields `sender` may not write are skipped over and left out of the
/// returned mask, so `post_read` does not settle them.
pub fn read_updates(
    fields: &mut [&mut dyn Replicated],
    reader: &mut BitReader,
    keep_dirty: bool,
    sender: Option<ClientId>,
) -> Result<DiffMask, VarError> {
    let field_count = fields.len();
    let mut mask = DiffMask::de(reader, field_count.div_ceil(8))?;
    if let Some(index) = mask.ones().find(|index| *index >= field_count) {
        return Err(VarError::UnknownField { index, field_count });
    }
    let indices: Vec<usize> = mask.ones().collect();
    for index in indices {
        let applied = fields[index].read_delta_from(reader, keep_dirty, sender)?;
        if !applied {
            if let Ok(field_index) = u8::try_from(index) {
                mask.set_bit(field_index, false);
            }
        }
    }
    Ok(mask)
}

/// Adopt new baselines for the fields in `mask` after the last send of a cycle
pub fn reset_sent(fields: &mut [&mut dyn Replicated], mask: &DiffMask) {
    for index in mask.ones() {
        if let Some(field) = fields.get_mut(index) {
            field.reset_dirty();
        }
    }
}

/// Settle the fields in `mask` once every forward of an inbound update is written
pub fn post_read(fields: &mut [&mut dyn Replicated], mask: &DiffMask) {
    for index in mask.ones() {
        if let Some(field) = fields.get_mut(index) {
            field.post_delta_read();
        }
    }
}

/// Full state for an observer that has never received this entity. Fields
/// `client` may not read are skipped.
pub fn write_full(fields: &[&dyn Replicated], client: Option<ClientId>, writer: &mut dyn BitWrite) {
    for field in fields {
        let readable = client.map_or(true, |client| field.can_read(client));
        readable.ser(writer);
        if readable {
            field.write_field_synchronization(writer);
        }
    }
}

pub fn read_full(fields: &mut [&mut dyn Replicated], reader: &mut BitReader) -> Result<(), VarError> {
    for field in fields.iter_mut() {
        if bool::de(reader)? {
            field.read_field(reader)?;
        }
    }
    Ok(())
}
