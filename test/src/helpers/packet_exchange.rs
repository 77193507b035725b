use log::debug;

use tandem_shared::{BitReader, BitWrite, BitWriter, Replicated, VarError};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Run `write` against a fresh writer and return the bytes
pub fn encode(write: impl FnOnce(&mut dyn BitWrite)) -> Vec<u8> {
    let mut writer = BitWriter::new();
    write(&mut writer);
    writer.to_bytes()
}

pub fn encode_delta(source: &dyn Replicated) -> Vec<u8> {
    encode(|writer| source.write_delta(writer))
}

/// Full state as a late joiner would receive it
pub fn encode_full(source: &dyn Replicated) -> Vec<u8> {
    encode(|writer| source.write_field_synchronization(writer))
}

/// Decode a delta on a terminal consumer and settle it
pub fn deliver_delta(target: &mut dyn Replicated, bytes: &[u8]) -> Result<(), VarError> {
    debug!("delivering {} byte delta to field {}", bytes.len(), target.core().field_index());
    target.read_delta(&mut BitReader::new(bytes), false)?;
    target.post_delta_read();
    Ok(())
}

pub fn deliver_full(target: &mut dyn Replicated, bytes: &[u8]) -> Result<(), VarError> {
    target.read_field(&mut BitReader::new(bytes))
}
