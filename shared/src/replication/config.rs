use crate::replication::{
    dirty::SendCadence,
    permission::{ReadPolicy, WritePolicy},
};

/// Default bound on a list's pending event log
pub const DEFAULT_EVENT_LOG_CAPACITY: usize = 256;

/// Settings fixed at construction of a replicated variable
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VarConfig {
    pub read_policy: ReadPolicy,
    pub write_policy: WritePolicy,
    pub cadence: SendCadence,
    /// Lists only. Once this many events are pending, the log is dropped in
    /// favor of a full resend.
    pub event_log_capacity: usize,
}

impl VarConfig {
    pub fn with_read_policy(mut self, read_policy: ReadPolicy) -> Self {
        self.read_policy = read_policy;
        self
    }

    pub fn with_write_policy(mut self, write_policy: WritePolicy) -> Self {
        self.write_policy = write_policy;
        self
    }

    pub fn with_cadence(mut self, cadence: SendCadence) -> Self {
        self.cadence = cadence;
        self
    }

    pub fn with_event_log_capacity(mut self, event_log_capacity: usize) -> Self {
        self.event_log_capacity = event_log_capacity;
        self
    }
}

impl Default for VarConfig {
    fn default() -> Self {
        Self {
            read_policy: ReadPolicy::default(),
            write_policy: WritePolicy::default(),
            cadence: SendCadence::default(),
            event_log_capacity: DEFAULT_EVENT_LOG_CAPACITY,
        }
    }
}
