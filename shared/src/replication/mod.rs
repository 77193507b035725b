pub mod config;
pub mod diff_mask;
pub mod dirty;
pub mod error;
pub mod fields;
pub mod list;
pub mod owner;
pub mod permission;
pub mod replicated;
pub mod scalar;
pub mod snapshot;
pub mod var_core;
