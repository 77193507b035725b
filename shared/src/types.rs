use std::fmt;

/// Logical network clock value, wrapping at `u16::MAX`
pub type Tick = u16;

/// Identifies a remote node (a connected client) from the authority's point of view
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClientId(pub u64);

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "client#{}", self.0)
    }
}
