use log::debug;

use crate::{
    replication::{
        config::VarConfig,
        dirty::DirtyTracker,
        owner::{OwnerHandle, VarOwner},
        permission::PermissionGate,
    },
    types::{ClientId, Tick},
};

/// State every replicated container shares: its binding to an owner, its
/// permissions, and its dirty/cadence tracking
#[derive(Clone, Debug)]
pub struct VarCore {
    permissions: PermissionGate,
    tracker: DirtyTracker,
    owner: Option<OwnerHandle>,
    field_index: u8,
    initialized: bool,
    disposed: bool,
}

impl VarCore {
    pub fn new(config: &VarConfig) -> Self {
        Self {
            permissions: PermissionGate::new(config.read_policy, config.write_policy),
            tracker: DirtyTracker::new(config.cadence),
            owner: None,
            field_index: 0,
            initialized: false,
            disposed: false,
        }
    }

    // Lifecycle

    /// Bind to `owner`. Returns whether the core is initialized afterwards;
    /// `false` means the owner is not ready yet and the call should be retried.
    pub fn initialize(&mut self, owner: &OwnerHandle) -> bool {
        if self.initialized {
            return true;
        }
        if !owner.get().is_spawned() {
            debug!("field {} initialize deferred: owner not spawned", self.field_index);
            return false;
        }
        self.owner = Some(owner.clone());
        self.initialized = true;
        debug!("field {} initialized", self.field_index);
        true
    }

    pub fn deinitialize(&mut self) {
        if !self.initialized {
            return;
        }
        self.initialized = false;
        self.owner = None;
        self.tracker.forget();
        debug!("field {} deinitialized", self.field_index);
    }

    /// Returns `true` only on the first call
    pub fn dispose(&mut self) -> bool {
        if self.disposed {
            return false;
        }
        self.deinitialize();
        self.disposed = true;
        true
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn field_index(&self) -> u8 {
        self.field_index
    }

    pub fn set_field_index(&mut self, field_index: u8) {
        self.field_index = field_index;
    }

    // Owner queries

    pub fn owner(&self) -> Option<&dyn VarOwner> {
        self.owner.as_ref().map(OwnerHandle::get)
    }

    pub fn is_authority(&self) -> bool {
        self.owner().is_some_and(|owner| owner.is_authority())
    }

    pub fn now(&self) -> Tick {
        self.owner().map_or(0, |owner| owner.current_tick())
    }

    pub fn permissions(&self) -> &PermissionGate {
        &self.permissions
    }

    pub fn can_write(&self) -> bool {
        self.permissions.can_write(self.owner())
    }

    pub fn can_read(&self, client: ClientId) -> bool {
        self.permissions.can_read(self.owner(), client)
    }

    pub fn can_client_write(&self, sender: ClientId) -> bool {
        self.permissions.can_client_write(self.owner(), sender)
    }

    // Dirty tracking

    pub fn tracker(&self) -> &DirtyTracker {
        &self.tracker
    }

    pub fn is_dirty(&self) -> bool {
        self.tracker.is_dirty()
    }

    /// Set the dirty flag and flag the owning entity. Ignored until initialized.
    pub fn mark_dirty(&mut self) {
        if !self.initialized {
            return;
        }
        self.tracker.mark();
        if let Some(owner) = &self.owner {
            owner.get().mark_dirty(self.field_index);
        }
    }

    /// Record a completed send at the owner's current tick
    pub fn sent(&mut self) {
        let now = self.now();
        self.tracker.sent(now);
    }

    pub fn clear_dirty(&mut self) {
        self.tracker.clear();
    }
}
