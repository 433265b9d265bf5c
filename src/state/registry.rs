use std::{hash::Hash, sync::Arc};

use dashmap::{DashMap, mapref::entry::Entry};

use crate::{error::GameError, state::session::MatchSession};

/// Concurrent map from game identifier to its live [`MatchSession`].
///
/// Map guards are dropped before a session is handed out, so callers never
/// hold a registry shard lock while waiting on a session lock.
#[derive(Debug)]
pub struct SessionRegistry<C> {
    sessions: DashMap<String, Arc<MatchSession<C>>>,
}

impl<C> Default for SessionRegistry<C>
where
    C: Clone + Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<C> SessionRegistry<C>
where
    C: Clone + Eq + Hash,
{
    /// Empty registry.
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }

    /// Register a new empty session under `id`.
    ///
    /// Concurrent creators of the same id race on the shard entry: exactly one
    /// inserts, the others get [`GameError::SessionAlreadyExists`].
    pub fn create(&self, id: &str) -> Result<Arc<MatchSession<C>>, GameError> {
        match self.sessions.entry(id.to_owned()) {
            Entry::Occupied(_) => Err(GameError::SessionAlreadyExists),
            Entry::Vacant(entry) => {
                let session = Arc::new(MatchSession::new());
                entry.insert(session.clone());
                Ok(session)
            }
        }
    }

    /// Shared handle to the session registered under `id`.
    pub fn get(&self, id: &str) -> Result<Arc<MatchSession<C>>, GameError> {
        self.sessions
            .get(id)
            .map(|entry| entry.value().clone())
            .ok_or(GameError::SessionNotFound)
    }

    /// Drop the session registered under `id`; absent ids are ignored.
    pub fn delete(&self, id: &str) {
        self.sessions.remove(id);
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether no session is live.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
