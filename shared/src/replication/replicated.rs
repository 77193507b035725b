use log::warn;

use tandem_serde::{BitReader, BitWrite};

use crate::{
    replication::{var_core::VarCore, error::VarError, owner::OwnerHandle},
    types::{ClientId, Tick},
};

/// Where a change that a notification reports came from
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChangeOrigin {
    /// A write made on this node
    Local,
    /// A value decoded from the network
    Remote,
}

/// The contract every replicated container implements, so a driver can
/// handle scalars and collections uniformly.
///
/// Per cycle the driver asks `ready_to_send`, encodes with `write_delta` (or
/// `write_field`/`write_field_synchronization` for a destination that has
/// never received the value) and then calls `reset_dirty` exactly once. On the
/// receiving side it decodes with `read_field`/`read_delta` and, once any
/// forwarding is done, calls `post_delta_read`.
pub trait Replicated: Send {
    fn core(&self) -> &VarCore;

    fn core_mut(&mut self) -> &mut VarCore;

    /// Bind to the owning entity and prime all snapshots. Returns `false`,
    /// without side effects, while the owner is not ready.
    fn initialize(&mut self, owner: &OwnerHandle) -> bool;

    /// Unbind on despawn, so a reused entity primes again on its next spawn
    fn deinitialize(&mut self);

    /// Release owned buffers and callbacks. Calling it again does nothing.
    fn dispose(&mut self);

    /// Whether a change significant enough to send is pending
    fn is_dirty(&self) -> bool;

    /// Whether anything at all differs from the last transmitted baseline,
    /// ignoring dirtiness thresholds
    fn has_pending_change(&self) -> bool;

    /// Adopt the current value as the new baseline after a send
    fn reset_dirty(&mut self);

    /// Re-scan for edits made behind the write accessor. Without write
    /// permission such edits are reverted; with it they are marked for sending,
    /// and `force_full` requests a full resend even when nothing changed.
    fn check_dirty_state(&mut self, force_full: bool);

    fn write_field(&self, writer: &mut dyn BitWrite);

    /// Full value for an observer that is joining while a delta may be
    /// pending: the last transmitted baseline is sent so the pending delta
    /// still applies on top of it
    fn write_field_synchronization(&self, writer: &mut dyn BitWrite);

    fn write_delta(&self, writer: &mut dyn BitWrite);

    fn read_field(&mut self, reader: &mut BitReader) -> Result<(), VarError>;

    /// Apply a delta without checking who wrote it. `keep_dirty` is set by a
    /// node that will forward the delta onward, so it stays pending for the
    /// next `write_delta`.
    fn read_delta(&mut self, reader: &mut BitReader, keep_dirty: bool) -> Result<(), VarError>;

    /// Consume a delta without applying it, leaving the reader at the next field
    fn skip_delta(&self, reader: &mut BitReader) -> Result<(), VarError>;

    /// Settle baselines once every forward of the inbound delta is written
    fn post_delta_read(&mut self);

    /// Whether a decoded delta is pending onward delivery
    fn is_forwarding(&self) -> bool;

    /// Apply a delta written by client `sender`, or by the authority when
    /// `sender` is `None`. A delta from a client without write permission is
    /// consumed and dropped. Returns whether the delta was applied.
    fn read_delta_from(
        &mut self,
        reader: &mut BitReader,
        keep_dirty: bool,
        sender: Option<ClientId>,
    ) -> Result<bool, VarError> {
        if let Some(sender) = sender {
            if !self.core().can_client_write(sender) {
                warn!(
                    "Dropping delta for field {} from {} without write permission ({:?})",
                    self.core().field_index(),
                    sender,
                    self.core().permissions().write_policy()
                );
                self.skip_delta(reader)?;
                return Ok(false);
            }
        }
        self.read_delta(reader, keep_dirty)?;
        Ok(true)
    }

    fn is_initialized(&self) -> bool {
        self.core().is_initialized()
    }

    fn can_read(&self, client: ClientId) -> bool {
        self.core().can_read(client)
    }

    /// Dirty and allowed to go out at `now` under the cadence policy. A node
    /// without write permission only sends what it is forwarding.
    fn ready_to_send(&self, now: Tick) -> bool {
        let core = self.core();
        core.is_initialized()
            && (core.can_write() || self.is_forwarding())
            && core
                .tracker()
                .should_send(now, self.is_dirty(), self.has_pending_change())
    }
}
