use thiserror::Error;

use tandem_serde::SerdeErr;

/// Errors raised while decoding replicated state.
///
/// Every variant is a protocol violation: decoding of the current payload
/// stops and the affected container keeps the state it had before the call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VarError {
    /// The payload could not be parsed at the bit level
    #[error(transparent)]
    Serde(#[from] SerdeErr),

    /// An index-based list event referenced a position outside the sequence
    #[error("{event} index {index} is out of range for a list of length {len}")]
    IndexOutOfRange {
        event: &'static str,
        index: usize,
        len: usize,
    },

    /// A list event tag that no known event maps to
    #[error("Unrecognized list event tag {tag}")]
    UnknownEventTag { tag: u8 },

    /// A value-based list event referenced an element the list does not contain
    #[error("{event} references an element that is not in the list")]
    ElementNotFound { event: &'static str },

    /// An update mask marked a field the receiving entity does not declare
    #[error("Update references field {index}, but the entity only declares {field_count} fields")]
    UnknownField { index: usize, field_count: usize },

    /// A decoded length or index does not fit in the local address space
    #[error("Decoded length {value} does not fit in usize")]
    LengthOverflow { value: i128 },
}
