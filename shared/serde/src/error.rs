use thiserror::Error;

/// Errors that can occur while deserializing a value from a bit stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SerdeErr {
    /// The reader ran out of bits before the value was complete
    #[error("attempted to read past the end of the buffer")]
    EndOfBuffer,

    /// A string payload was not valid UTF-8
    #[error("string payload is not valid utf-8")]
    InvalidUtf8,

    /// The bits decoded to a value the type cannot represent
    #[error("decoded an invalid value: {0}")]
    InvalidValue(&'static str),
}
