use std::{
    fmt,
    sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use log::warn;

use crate::{
    replication::diff_mask::DiffMask,
    types::{ClientId, Tick},
};

/// The capabilities a replicated variable needs from the entity that owns it.
///
/// The surrounding system implements this; the variable never looks at the
/// concrete entity type.
pub trait VarOwner: Send + Sync {
    /// Whether the entity and the managers it depends on are fully set up.
    /// Until this is true, `initialize` is a retryable no-op.
    fn is_spawned(&self) -> bool;

    /// Whether the local node is the authority for this entity
    fn is_authority(&self) -> bool;

    /// The client that owns the entity, if any
    fn owner(&self) -> Option<ClientId>;

    /// The identity of the local node, when it is a client
    fn local_client(&self) -> Option<ClientId>;

    /// The logical network clock
    fn current_tick(&self) -> Tick;

    /// Flag the entity for a network update because field `field_index` changed
    fn mark_dirty(&self, field_index: u8);
}

/// Shared handle to a `VarOwner`
#[derive(Clone)]
pub struct OwnerHandle {
    inner: Arc<dyn VarOwner>,
}

impl OwnerHandle {
    pub fn new<O: VarOwner + 'static>(owner: O) -> Self {
        Self {
            inner: Arc::new(owner),
        }
    }

    pub fn from_arc(inner: Arc<dyn VarOwner>) -> Self {
        Self { inner }
    }

    pub fn get(&self) -> &dyn VarOwner {
        self.inner.as_ref()
    }
}

impl fmt::Debug for OwnerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OwnerHandle")
            .field("authority", &self.inner.is_authority())
            .field("owner", &self.inner.owner())
            .field("local_client", &self.inner.local_client())
            .finish()
    }
}

#[derive(Clone, Debug)]
struct OwnerState {
    spawned: bool,
    authority: bool,
    owner: Option<ClientId>,
    local_client: Option<ClientId>,
    tick: Tick,
    dirty: DiffMask,
}

/// A ready-made `VarOwner` for drivers that do not have their own entity type.
///
/// Cloning yields another handle onto the same state, so the driver can keep
/// one clone to advance the clock and collect dirty fields while the
/// variables hold others.
#[derive(Clone, Debug)]
pub struct SharedOwner {
    state: Arc<RwLock<OwnerState>>,
}

impl SharedOwner {
    /// An entity as seen by the authority node
    pub fn authority() -> Self {
        Self::with_state(true, None)
    }

    /// An entity as seen by a client node with identity `local_client`
    pub fn client(local_client: ClientId) -> Self {
        Self::with_state(false, Some(local_client))
    }

    fn with_state(authority: bool, local_client: Option<ClientId>) -> Self {
        Self {
            state: Arc::new(RwLock::new(OwnerState {
                spawned: true,
                authority,
                owner: None,
                local_client,
                tick: 0,
                dirty: DiffMask::new(1),
            })),
        }
    }

    fn read(&self) -> Option<RwLockReadGuard<'_, OwnerState>> {
        match self.state.read() {
            Ok(state) => Some(state),
            Err(_) => {
                warn!("SharedOwner state lock is poisoned");
                None
            }
        }
    }

    fn write(&self) -> Option<RwLockWriteGuard<'_, OwnerState>> {
        match self.state.write() {
            Ok(state) => Some(state),
            Err(_) => {
                warn!("SharedOwner state lock is poisoned");
                None
            }
        }
    }

    pub fn handle(&self) -> OwnerHandle {
        OwnerHandle::new(self.clone())
    }

    pub fn set_spawned(&self, spawned: bool) {
        if let Some(mut state) = self.write() {
            state.spawned = spawned;
        }
    }

    pub fn set_authority(&self, authority: bool) {
        if let Some(mut state) = self.write() {
            state.authority = authority;
        }
    }

    pub fn set_owner(&self, owner: Option<ClientId>) {
        if let Some(mut state) = self.write() {
            state.owner = owner;
        }
    }

    pub fn set_tick(&self, tick: Tick) {
        if let Some(mut state) = self.write() {
            state.tick = tick;
        }
    }

    pub fn advance_tick(&self, ticks: u16) {
        if let Some(mut state) = self.write() {
            state.tick = state.tick.wrapping_add(ticks);
        }
    }

    /// Fields marked dirty since the last call
    pub fn take_dirty_mask(&self) -> DiffMask {
        let Some(mut state) = self.write() else {
            return DiffMask::new(0);
        };
        let mask = state.dirty.clone();
        state.dirty.clear();
        mask
    }

    pub fn is_marked_dirty(&self) -> bool {
        self.read().map(|state| !state.dirty.is_clear()).unwrap_or(false)
    }
}

impl VarOwner for SharedOwner {
    fn is_spawned(&self) -> bool {
        self.read().map(|state| state.spawned).unwrap_or(false)
    }

    fn is_authority(&self) -> bool {
        self.read().map(|state| state.authority).unwrap_or(false)
    }

    fn owner(&self) -> Option<ClientId> {
        self.read().and_then(|state| state.owner)
    }

    fn local_client(&self) -> Option<ClientId> {
        self.read().and_then(|state| state.local_client)
    }

    fn current_tick(&self) -> Tick {
        self.read().map(|state| state.tick).unwrap_or(0)
    }

    fn mark_dirty(&self, field_index: u8) {
        if let Some(mut state) = self.write() {
            state.dirty.set_bit(field_index, true);
        }
    }
}
