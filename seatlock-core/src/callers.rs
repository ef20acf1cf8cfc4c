use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use crate::ids::CallerId;
use crate::CoreResult;

/// Interns caller names into numeric ids.
///
/// Ids are handed out sequentially in registration order from the
/// registered half of the id space, so two distinct names never share an id
/// and no name can collide with a raw [`CallerId::new`] id. Names are never
/// forgotten once registered.
#[derive(Debug, Default)]
pub struct CallerRegistry {
    inner: RwLock<Interned>,
}

#[derive(Debug, Default)]
struct Interned {
    by_name: HashMap<String, CallerId>,
    names: Vec<String>,
}

impl CallerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id for `name`, registering it on first sight.
    pub fn resolve(&self, name: &str) -> CoreResult<CallerId> {
        if let Some(id) = self.lookup(name) {
            return Ok(id);
        }

        let mut interned = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        // Another thread may have registered it between the two locks.
        if let Some(id) = interned.by_name.get(name) {
            return Ok(*id);
        }
        let id = interned.next_id()?;
        interned.insert(name, id);
        Ok(id)
    }

    /// Run `attempt` with the id for `name`, keeping a new registration only
    /// if `attempt` succeeds.
    ///
    /// For an unknown name the write lock is held across `attempt`, so the
    /// candidate id can't be handed to anyone else meanwhile. `attempt` must
    /// not call back into the registry.
    pub fn resolve_with(&self, name: &str, attempt: impl FnOnce(CallerId) -> bool) -> CoreResult<bool> {
        if let Some(id) = self.lookup(name) {
            return Ok(attempt(id));
        }

        let mut interned = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(&id) = interned.by_name.get(name) {
            drop(interned);
            return Ok(attempt(id));
        }

        let id = interned.next_id()?;
        let accepted = attempt(id);
        if accepted {
            interned.insert(name, id);
        }
        Ok(accepted)
    }

    /// Id for an already registered `name`.
    pub fn lookup(&self, name: &str) -> Option<CallerId> {
        let interned = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        interned.by_name.get(name).copied()
    }

    pub fn name_of(&self, id: CallerId) -> Option<String> {
        let seq = id.sequence()?;
        let interned = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        interned.names.get(seq as usize - 1).cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Interned {
    fn next_id(&self) -> CoreResult<CallerId> {
        CallerId::registered(self.names.len() as u32 + 1)
    }

    fn insert(&mut self, name: &str, id: CallerId) {
        self.names.push(name.to_owned());
        self.by_name.insert(name.to_owned(), id);
    }
}
