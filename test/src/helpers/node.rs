use tandem_shared::{ClientId, OwnerHandle, SharedOwner, Tick, VarOwner};

/// One node's view of a single entity
#[derive(Clone)]
pub struct TestNode {
    pub owner: SharedOwner,
}

impl TestNode {
    /// The authority node, for an entity owned by `owning_client`
    pub fn authority(owning_client: Option<ClientId>) -> Self {
        let owner = SharedOwner::authority();
        owner.set_owner(owning_client);
        Self { owner }
    }

    /// A client node `local` observing an entity owned by `owning_client`
    pub fn client(local: ClientId, owning_client: Option<ClientId>) -> Self {
        let owner = SharedOwner::client(local);
        owner.set_owner(owning_client);
        Self { owner }
    }

    pub fn handle(&self) -> OwnerHandle {
        self.owner.handle()
    }

    pub fn tick(&self, tick: Tick) {
        self.owner.set_tick(tick);
    }

    pub fn now(&self) -> Tick {
        self.owner.current_tick()
    }
}
