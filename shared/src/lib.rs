//! # Tandem Shared
//! Replicated state variables for an authority node and its remote replicas:
//! change tracking, read/write permissions, send cadence, delta encoding, and
//! relay forwarding of deltas through an intermediate authority.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

pub use tandem_serde::{
    BitCounter, BitReader, BitWrite, BitWriter, ConstBitLength, Serde, SerdeErr,
    SerdeIntegerConversion, SignedInteger, SignedVariableInteger, UnsignedInteger,
    UnsignedVariableInteger,
};

mod replication;
mod tick;
mod types;

pub use replication::{
    config::{VarConfig, DEFAULT_EVENT_LOG_CAPACITY},
    diff_mask::DiffMask,
    dirty::{DirtyTracker, SendCadence},
    error::VarError,
    fields::{post_read, read_full, read_updates, reset_sent, write_full, write_updates, ReplicatedFields},
    list::{ListChange, ListEvent, ListOperation, SyncList},
    owner::{OwnerHandle, SharedOwner, VarOwner},
    permission::{PermissionGate, ReadPolicy, WritePolicy},
    replicated::{ChangeOrigin, Replicated},
    scalar::{exceeds_epsilon, SyncVar},
    snapshot::SnapshotStore,
    var_core::VarCore,
};
pub use types::{ClientId, Tick};
pub use tick::{tick_diff, tick_greater_than, ticks_elapsed};
