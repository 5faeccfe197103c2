use crate::{
    error::LedgerError,
    policy::OrgId,
    stub::{IdentityResolver, StateAccessor},
};

/// Everything one invocation is allowed to touch: who is calling, and the
/// store it runs against.
pub struct TxContext<'a> {
    identity: &'a dyn IdentityResolver,
    state: &'a mut dyn StateAccessor,
}

impl<'a> TxContext<'a> {
    pub fn new(identity: &'a dyn IdentityResolver, state: &'a mut dyn StateAccessor) -> Self {
        Self { identity, state }
    }

    pub fn caller(&self) -> Result<OrgId, LedgerError> {
        Ok(self.identity.organization()?)
    }

    pub fn state(&self) -> &dyn StateAccessor {
        &*self.state
    }

    pub fn state_mut(&mut self) -> &mut dyn StateAccessor {
        &mut *self.state
    }
}
