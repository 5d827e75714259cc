//! In-memory session store.

use dashmap::DashMap;
use serde_json::{Map, Value};
use uuid::Uuid;

use super::store::{SessionError, SessionStore};
use super::Session;

/// Sessions kept in a concurrent map for the lifetime of the process.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sessions: DashMap<Uuid, Map<String, Value>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl SessionStore for MemorySessionStore {
    async fn save(&self, session: &Session) -> Result<(), SessionError> {
        self.sessions.insert(session.id(), session.data().clone());
        Ok(())
    }

    async fn load(&self, id: Uuid) -> Result<Option<Session>, SessionError> {
        Ok(self
            .sessions
            .get(&id)
            .map(|entry| Session::from_parts(id, entry.value().clone())))
    }

    async fn destroy(&self, id: Uuid) -> Result<(), SessionError> {
        self.sessions
            .remove(&id)
            .map(|_| ())
            .ok_or(SessionError::NotFound(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{dispose_session, save_session};

    #[tokio::test]
    async fn test_save_load_dispose() {
        let store = MemorySessionStore::new();
        let mut session = Session::new();
        session.insert("theme", &"dark").unwrap();

        save_session(&store, &session).await.unwrap();
        assert_eq!(store.len(), 1);

        let loaded = store.load(session.id()).await.unwrap().unwrap();
        assert_eq!(loaded, session);

        dispose_session(&store, session.clone()).await.unwrap();
        assert!(store.is_empty());
        assert!(store.load(session.id()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_replaces_data() {
        let store = MemorySessionStore::new();
        let mut session = Session::new();
        session.insert("step", &1).unwrap();
        save_session(&store, &session).await.unwrap();
        session.insert("step", &2).unwrap();
        save_session(&store, &session).await.unwrap();

        let loaded = store.load(session.id()).await.unwrap().unwrap();
        assert_eq!(loaded.get::<u32>("step").unwrap(), Some(2));
    }
}
