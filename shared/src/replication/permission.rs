use crate::{replication::owner::VarOwner, types::ClientId};

/// Who may receive a variable's value
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ReadPolicy {
    /// Every observer of the owning entity
    #[default]
    Everyone,
    /// Only the client that owns the entity
    OwnerOnly,
}

/// Who may change a variable's value
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum WritePolicy {
    /// Only the authority node
    #[default]
    AuthorityOnly,
    /// Only the client that owns the entity. The authority relays such
    /// changes but does not originate them.
    OwnerOnly,
}

/// Evaluates read and write eligibility for one variable.
/// The policies are fixed for the variable's lifetime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct PermissionGate {
    read: ReadPolicy,
    write: WritePolicy,
}

impl PermissionGate {
    pub fn new(read: ReadPolicy, write: WritePolicy) -> Self {
        Self { read, write }
    }

    pub fn read_policy(&self) -> ReadPolicy {
        self.read
    }

    pub fn write_policy(&self) -> WritePolicy {
        self.write
    }

    /// Whether `client` may receive the value. Nothing is readable before the
    /// variable is bound to an owner.
    pub fn can_read(&self, owner: Option<&dyn VarOwner>, client: ClientId) -> bool {
        let Some(owner) = owner else {
            return false;
        };
        match self.read {
            ReadPolicy::Everyone => true,
            ReadPolicy::OwnerOnly => owner.owner() == Some(client),
        }
    }

    /// Whether the local node may change the value. Before the variable is
    /// bound to an owner every write is a local setup write and is allowed.
    pub fn can_write(&self, owner: Option<&dyn VarOwner>) -> bool {
        let Some(owner) = owner else {
            return true;
        };
        match self.write {
            WritePolicy::AuthorityOnly => owner.is_authority(),
            WritePolicy::OwnerOnly => match (owner.local_client(), owner.owner()) {
                (Some(local), Some(owning)) => local == owning,
                _ => false,
            },
        }
    }

    /// Whether a delta sent by client `sender` may be applied. Clients never
    /// write `AuthorityOnly` values, and an unbound variable accepts nothing.
    pub fn can_client_write(&self, owner: Option<&dyn VarOwner>, sender: ClientId) -> bool {
        let Some(owner) = owner else {
            return false;
        };
        match self.write {
            WritePolicy::AuthorityOnly => false,
            WritePolicy::OwnerOnly => owner.owner() == Some(sender),
        }
    }
}
