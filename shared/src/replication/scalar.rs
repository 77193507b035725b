use std::{fmt, ops::Deref};

use log::warn;

use tandem_serde::{BitReader, BitWrite, Serde};

use crate::replication::{
    config::VarConfig,
    var_core::VarCore,
    error::VarError,
    owner::OwnerHandle,
    replicated::{ChangeOrigin, Replicated},
    snapshot::SnapshotStore,
};

type Threshold<T> = Box<dyn Fn(&T, &T) -> bool + Send>;
type ChangeHandler<T> = Box<dyn FnMut(&T, &T, ChangeOrigin) + Send>;

/// A threshold for numeric values: a change counts once it moves further
/// than `epsilon` from the last transmitted value
pub fn exceeds_epsilon<N>(epsilon: f64) -> impl Fn(&N, &N) -> bool + Send
where
    N: Copy + Into<f64>,
{
    move |transmitted: &N, current: &N| {
        let transmitted: f64 = (*transmitted).into();
        let current: f64 = (*current).into();
        (current - transmitted).abs() > epsilon
    }
}

/// A single replicated value
pub struct SyncVar<T: Serde> {
    core: VarCore,
    snapshots: SnapshotStore<T>,
    threshold: Option<Threshold<T>>,
    on_change: Option<ChangeHandler<T>>,
    // pending regardless of value comparison: forwarded deltas and forced resends
    forced: bool,
}

impl<T: Serde> SyncVar<T> {
    pub fn new(value: T, config: VarConfig) -> Self {
        Self {
            core: VarCore::new(&config),
            snapshots: SnapshotStore::new(value),
            threshold: None,
            on_change: None,
            forced: false,
        }
    }

    /// Only report the variable dirty when `exceeds(transmitted, current)`
    /// holds. The predicate is not consulted before the first `initialize`,
    /// so the first observed state always goes out.
    pub fn with_threshold<F>(mut self, exceeds: F) -> Self
    where
        F: Fn(&T, &T) -> bool + Send + 'static,
    {
        self.threshold = Some(Box::new(exceeds));
        self
    }

    /// Called with `(previous, new, origin)` whenever the value changes
    pub fn on_change<F>(&mut self, handler: F)
    where
        F: FnMut(&T, &T, ChangeOrigin) + Send + 'static,
    {
        self.on_change = Some(Box::new(handler));
    }

    pub fn get(&self) -> &T {
        self.snapshots.current()
    }

    /// Write through the accessor. Ignored, with a warning, when the local
    /// node lacks write permission.
    pub fn set(&mut self, value: T) {
        if !self.core.can_write() {
            warn!(
                "Ignoring write to field {} without write permission ({:?})",
                self.core.field_index(),
                self.core.permissions().write_policy()
            );
            return;
        }
        if *self.snapshots.current() == value {
            return;
        }
        let previous = self.snapshots.replace(value);
        self.snapshots.observe();
        self.core.mark_dirty();
        self.notify(&previous, ChangeOrigin::Local);
    }

    /// Mutable access that bypasses change tracking. Edits made through it
    /// are picked up by `is_dirty` and reconciled by `check_dirty_state`.
    pub fn value_mut(&mut self) -> &mut T {
        self.snapshots.current_mut()
    }

    pub fn observed(&self) -> &T {
        self.snapshots.observed()
    }

    pub fn transmitted(&self) -> &T {
        self.snapshots.transmitted()
    }

    fn notify(&mut self, previous: &T, origin: ChangeOrigin) {
        if let Some(handler) = self.on_change.as_mut() {
            handler(previous, self.snapshots.current(), origin);
        }
    }

    fn exceeds_threshold(&self) -> bool {
        match &self.threshold {
            Some(exceeds) if self.snapshots.is_primed() => {
                exceeds(self.snapshots.transmitted(), self.snapshots.current())
            }
            _ => true,
        }
    }
}

impl<T: Serde> Deref for SyncVar<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        self.get()
    }
}

impl<T: Serde + fmt::Debug> fmt::Debug for SyncVar<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncVar")
            .field("current", self.snapshots.current())
            .field("transmitted", self.snapshots.transmitted())
            .field("forced", &self.forced)
            .field("core", &self.core)
            .finish()
    }
}

impl<T: Serde + Send> Replicated for SyncVar<T> {
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
        self.forced = false;
        true
    }

    fn deinitialize(&mut self) {
        self.core.deinitialize();
        self.snapshots.unprime();
        self.forced = false;
    }

    fn dispose(&mut self) {
        if !self.core.dispose() {
            return;
        }
        self.snapshots.unprime();
        self.threshold = None;
        self.on_change = None;
        self.forced = false;
    }

    fn is_dirty(&self) -> bool {
        if self.forced {
            return true;
        }
        if !self.has_pending_change() {
            return false;
        }
        self.exceeds_threshold()
    }

    fn has_pending_change(&self) -> bool {
        self.forced
            || self.snapshots.differs_from_transmitted()
            || self.snapshots.differs_from_observed()
    }

    fn reset_dirty(&mut self) {
        let pending = self.has_pending_change();
        self.snapshots.commit();
        self.forced = false;
        if pending {
            self.core.sent();
        } else {
            self.core.clear_dirty();
        }
    }

    fn check_dirty_state(&mut self, force_full: bool) {
        let can_write = self.core.can_write();

        if !self.snapshots.differs_from_observed() {
            if force_full && can_write && self.core.is_initialized() {
                self.forced = true;
                self.core.mark_dirty();
            }
            return;
        }

        if !can_write {
            warn!(
                "Reverting local edit of field {} made without write permission",
                self.core.field_index()
            );
            self.snapshots.revert();
            return;
        }

        let previous = self.snapshots.observed().clone();
        self.snapshots.observe();
        if force_full && self.core.is_initialized() {
            self.forced = true;
        }
        self.core.mark_dirty();
        self.notify(&previous, ChangeOrigin::Local);
    }

    fn write_field(&self, writer: &mut dyn BitWrite) {
        self.snapshots.current().ser(writer);
    }

    fn write_field_synchronization(&self, writer: &mut dyn BitWrite) {
        if self.has_pending_change() {
            self.snapshots.transmitted().ser(writer);
        } else {
            self.snapshots.current().ser(writer);
        }
    }

    fn write_delta(&self, writer: &mut dyn BitWrite) {
        // a relay without write permission forwards what it accepted, never a local edit
        if self.core.can_write() {
            self.snapshots.current().ser(writer);
        } else {
            self.snapshots.observed().ser(writer);
        }
    }

    fn read_field(&mut self, reader: &mut BitReader) -> Result<(), VarError> {
        let value = T::de(reader)?;
        let previous = self.snapshots.overwrite(value);
        self.forced = false;
        self.core.clear_dirty();
        if previous != *self.snapshots.current() {
            self.notify(&previous, ChangeOrigin::Remote);
        }
        Ok(())
    }

    fn read_delta(&mut self, reader: &mut BitReader, keep_dirty: bool) -> Result<(), VarError> {
        let value = T::de(reader)?;
        let previous = self.snapshots.replace(value);
        if keep_dirty {
            self.snapshots.observe();
            self.forced = true;
            self.core.mark_dirty();
        } else {
            self.snapshots.commit();
        }
        if previous != *self.snapshots.current() {
            self.notify(&previous, ChangeOrigin::Remote);
        }
        Ok(())
    }

    fn skip_delta(&self, reader: &mut BitReader) -> Result<(), VarError> {
        T::de(reader)?;
        Ok(())
    }

    fn post_delta_read(&mut self) {
        self.snapshots.commit();
        self.forced = false;
        self.core.clear_dirty();
    }

    fn is_forwarding(&self) -> bool {
        self.forced
    }
}
