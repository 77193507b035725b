use std::{fmt, ops::Deref};

use log::{debug, warn};

use tandem_serde::{BitReader, BitWrite, Serde};

use crate::replication::{
    config::VarConfig,
    var_core::VarCore,
    error::VarError,
    list::event::{read_count, write_count, ListChange, ListEvent, ListOperation},
    owner::OwnerHandle,
    replicated::{ChangeOrigin, Replicated},
    snapshot::SnapshotStore,
};

type ChangeHandler<T> = Box<dyn FnMut(&ListChange<T>) + Send>;

/// A replicated ordered sequence.
///
/// Local mutations are recorded as `ListEvent`s and only that log is sent,
/// unless a wholesale resend has been forced, in which case a single
/// `FullSnapshot` goes out instead.
pub struct SyncList<T: Serde> {
    core: VarCore,
    snapshots: SnapshotStore<Vec<T>>,
    log: Vec<ListEvent<T>>,
    event_log_capacity: usize,
    resend_all: bool,
    on_change: Option<ChangeHandler<T>>,
}

impl<T: Serde> SyncList<T> {
    pub fn new(config: VarConfig) -> Self {
        Self::from_vec(Vec::new(), config)
    }

    pub fn from_vec(values: Vec<T>, config: VarConfig) -> Self {
        Self {
            core: VarCore::new(&config),
            snapshots: SnapshotStore::new(values),
            log: Vec::new(),
            event_log_capacity: config.event_log_capacity,
            resend_all: false,
            on_change: None,
        }
    }

    /// Called once per applied change, local or remote, before the mutating
    /// call returns
    pub fn on_change<F>(&mut self, handler: F)
    where
        F: FnMut(&ListChange<T>) + Send + 'static,
    {
        self.on_change = Some(Box::new(handler));
    }

    // Mutation

    pub fn add(&mut self, value: T) {
        // Add cannot be rejected by position
        let _ = self.apply_local(ListEvent::Add(value));
    }

    pub fn insert(&mut self, index: usize, value: T) -> Result<(), VarError> {
        self.apply_local(ListEvent::Insert(index, value)).map(|_| ())
    }

    /// Remove the first element equal to `value`. Returns whether one was removed.
    pub fn remove(&mut self, value: &T) -> bool {
        if !self.snapshots.current().contains(value) {
            return false;
        }
        self.apply_local(ListEvent::Remove(value.clone()))
            .unwrap_or(false)
    }

    pub fn remove_at(&mut self, index: usize) -> Result<(), VarError> {
        self.apply_local(ListEvent::RemoveAt(index)).map(|_| ())
    }

    pub fn set_at(&mut self, index: usize, value: T) -> Result<(), VarError> {
        let previous = value.clone();
        self.apply_local(ListEvent::SetAt {
            index,
            value,
            previous,
        })
        .map(|_| ())
    }

    pub fn clear(&mut self) {
        let _ = self.apply_local(ListEvent::Clear);
    }

    /// Mutable access to one element that bypasses the event log. Edits made
    /// through it are picked up by `is_dirty` and resent in full.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.snapshots.current_mut().get_mut(index)
    }

    // Queries

    pub fn as_slice(&self) -> &[T] {
        self.snapshots.current()
    }

    /// The sequence as of the last send, which the pending log replays against
    pub fn transmitted(&self) -> &[T] {
        self.snapshots.transmitted()
    }

    pub fn pending_events(&self) -> &[ListEvent<T>] {
        &self.log
    }

    /// Whether the next delta is a `FullSnapshot` rather than the event log
    pub fn is_resending_all(&self) -> bool {
        self.resend_all || (self.core.can_write() && self.snapshots.differs_from_observed())
    }

    // Internals

    fn apply_local(&mut self, mut event: ListEvent<T>) -> Result<bool, VarError> {
        if !self.core.can_write() {
            warn!(
                "Ignoring {} on field {} without write permission ({:?})",
                event.name(),
                self.core.field_index(),
                self.core.permissions().write_policy()
            );
            return Ok(false);
        }

        let (current, observed) = self.snapshots.current_and_observed_mut();
        let change = event.apply(current, ChangeOrigin::Local)?;
        mirror_change(observed, &change, current);

        if self.core.is_initialized() {
            self.log_event(event);
            self.core.mark_dirty();
        }
        self.notify(&change);
        Ok(true)
    }

    fn log_event(&mut self, event: ListEvent<T>) {
        if self.resend_all {
            return;
        }
        match event {
            ListEvent::FullSnapshot(_) => {
                self.log.clear();
                self.resend_all = true;
            }
            event => {
                // nothing logged before a Clear can affect the result
                if matches!(event, ListEvent::Clear) {
                    self.log.clear();
                }
                if self.log.len() >= self.event_log_capacity {
                    debug!(
                        "field {} event log reached {} entries, resending in full",
                        self.core.field_index(),
                        self.event_log_capacity
                    );
                    self.log.clear();
                    self.resend_all = true;
                } else {
                    self.log.push(event);
                }
            }
        }
    }

    fn force_resend_all(&mut self) {
        if !self.core.is_initialized() {
            return;
        }
        debug!("field {} forced to resend in full", self.core.field_index());
        self.log.clear();
        self.resend_all = true;
        self.core.mark_dirty();
    }

    fn notify(&mut self, change: &ListChange<T>) {
        if let Some(handler) = self.on_change.as_mut() {
            handler(change);
        }
    }
}

fn decode_events<T: Serde>(reader: &mut BitReader) -> Result<Vec<ListEvent<T>>, VarError> {
    let count = read_count(reader)?;
    let mut events = Vec::new();
    for _ in 0..count {
        events.push(ListEvent::<T>::de(reader)?);
    }
    Ok(events)
}

/// Apply an already validated change to the observed snapshot, which has
/// the same length as the live sequence
fn mirror_change<T: Clone>(observed: &mut Vec<T>, change: &ListChange<T>, current: &[T]) {
    match (change.operation, change.index, &change.value) {
        (ListOperation::Add, _, Some(value)) => observed.push(value.clone()),
        (ListOperation::Insert, Some(index), Some(value)) if index <= observed.len() => {
            observed.insert(index, value.clone())
        }
        (ListOperation::RemoveAt, Some(index), _) if index < observed.len() => {
            observed.remove(index);
        }
        (ListOperation::Set, Some(index), Some(value)) => {
            if let Some(slot) = observed.get_mut(index) {
                *slot = value.clone();
            }
        }
        (ListOperation::Clear, _, _) => observed.clear(),
        _ => {
            observed.clear();
            observed.extend_from_slice(current);
        }
    }
}

impl<T: Serde> Deref for SyncList<T> {
    type Target = [T];

    fn deref(&self) -> &Self::Target {
        self.as_slice()
    }
}

impl<T: Serde + fmt::Debug> fmt::Debug for SyncList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncList")
            .field("current", self.snapshots.current())
            .field("log", &self.log)
            .field("resend_all", &self.resend_all)
            .field("core", &self.core)
            .finish()
    }
}

impl<T: Serde + Send> Replicated for SyncList<T> {
    fn core(&self) -> &VarCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut VarCore {
        &mut self.core
    }

    fn initialize(&mut self, owner: &OwnerHandle) -> bool {
        if self.core.is_initialized() {
            return true;
        }
        if !self.core.initialize(owner) {
            return false;
        }
        self.snapshots.prime();
        self.log.clear();
        self.resend_all = false;
        true
    }

    fn deinitialize(&mut self) {
        self.core.deinitialize();
        self.snapshots.unprime();
        self.log.clear();
        self.resend_all = false;
    }

    fn dispose(&mut self) {
        if !self.core.dispose() {
            return;
        }
        self.snapshots.unprime();
        self.log = Vec::new();
        self.resend_all = false;
        self.on_change = None;
    }

    fn is_dirty(&self) -> bool {
        self.resend_all || !self.log.is_empty() || self.snapshots.differs_from_observed()
    }

    fn has_pending_change(&self) -> bool {
        self.is_dirty()
    }

    fn reset_dirty(&mut self) {
        let pending = self.is_dirty();
        self.log.clear();
        self.resend_all = false;
        self.snapshots.commit();
        if pending {
            self.core.sent();
        } else {
            self.core.clear_dirty();
        }
    }

    fn check_dirty_state(&mut self, force_full: bool) {
        let diverged = self.snapshots.differs_from_observed();
        let can_write = self.core.can_write();

        if diverged && !can_write {
            warn!(
                "Reverting local edit of list field {} made without write permission",
                self.core.field_index()
            );
            self.snapshots.revert();
            return;
        }

        if can_write && (diverged || force_full) {
            self.snapshots.observe();
            self.force_resend_all();
        }
    }

    fn write_field(&self, writer: &mut dyn BitWrite) {
        self.snapshots.current().ser(writer);
    }

    fn write_field_synchronization(&self, writer: &mut dyn BitWrite) {
        if self.is_dirty() {
            self.snapshots.transmitted().ser(writer);
        } else {
            self.snapshots.current().ser(writer);
        }
    }

    fn write_delta(&self, writer: &mut dyn BitWrite) {
        if self.is_resending_all() {
            // a relay without write permission forwards what it accepted, never a local edit
            let values = if self.core.can_write() {
                self.snapshots.current()
            } else {
                self.snapshots.observed()
            };
            write_count(1, writer);
            ListEvent::ser_full_snapshot(values, writer);
            return;
        }
        write_count(self.log.len(), writer);
        for event in &self.log {
            event.ser(writer);
        }
    }

    fn read_field(&mut self, reader: &mut BitReader) -> Result<(), VarError> {
        let values = Vec::<T>::de(reader)?;
        self.snapshots.overwrite(values);
        self.log.clear();
        self.resend_all = false;
        self.core.clear_dirty();
        let change = ListChange {
            operation: ListOperation::Complete,
            index: None,
            previous: None,
            value: None,
            origin: ChangeOrigin::Remote,
        };
        self.notify(&change);
        Ok(())
    }

    fn read_delta(&mut self, reader: &mut BitReader, keep_dirty: bool) -> Result<(), VarError> {
        let mut events = decode_events::<T>(reader)?;

        let current = self.snapshots.current_mut();
        let applied: Result<Vec<_>, VarError> = events
            .iter_mut()
            .map(|event| event.apply(current, ChangeOrigin::Remote))
            .collect();
        let changes = match applied {
            Ok(changes) => changes,
            Err(error) => {
                warn!(
                    "Rejecting delta for list field {}: {}",
                    self.core.field_index(),
                    error
                );
                self.snapshots.revert();
                return Err(error);
            }
        };
        self.snapshots.observe();

        if keep_dirty {
            for event in events {
                self.log_event(event);
            }
            self.core.mark_dirty();
        }

        for change in &changes {
            self.notify(change);
        }
        Ok(())
    }

    fn skip_delta(&self, reader: &mut BitReader) -> Result<(), VarError> {
        decode_events::<T>(reader)?;
        Ok(())
    }

    fn is_forwarding(&self) -> bool {
        self.resend_all || !self.log.is_empty()
    }

    fn post_delta_read(&mut self) {
        self.snapshots.observe();
        // a relay that is not the authority still owes its own downstream send
        if self.core.is_authority() || (self.log.is_empty() && !self.resend_all) {
            self.log.clear();
            self.resend_all = false;
            self.snapshots.commit();
            self.core.clear_dirty();
        }
    }
}
