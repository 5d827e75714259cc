//! Server-side sessions.
//!
//! # Responsibilities
//! - `Session`: an id plus a JSON object of values
//! - `SessionStore`: persistence seam (save, load, destroy)
//! - Save and dispose helpers that log failures with the session id
//!
//! # Design Decisions
//! - Disposal either awaits the store or runs detached; both destroy exactly once
//! - `MemorySessionStore` backs tests and single-process deployments

pub mod memory;
pub mod store;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

pub use memory::MemorySessionStore;
pub use store::{
    dispose_session, dispose_session_detached, save_session, SessionError, SessionStore,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    id: Uuid,
    #[serde(default)]
    data: Map<String, Value>,
}

impl Session {
    /// Fresh session with a random id.
    pub fn new() -> Self {
        Self::with_id(Uuid::new_v4())
    }

    pub fn with_id(id: Uuid) -> Self {
        Self { id, data: Map::new() }
    }

    pub(crate) fn from_parts(id: Uuid, data: Map<String, Value>) -> Self {
        Self { id, data }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, SessionError> {
        self.data
            .get(key)
            .map(|value| serde_json::from_value(value.clone()))
            .transpose()
            .map_err(SessionError::from)
    }

    pub fn insert<T: Serialize>(
        &mut self,
        key: impl Into<String>,
        value: &T,
    ) -> Result<(), SessionError> {
        self.data.insert(key.into(), serde_json::to_value(value)?);
        Ok(())
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.data.remove(key)
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_values() {
        let mut session = Session::new();
        session.insert("user_id", &42u64).unwrap();
        session.insert("roles", &vec!["admin", "editor"]).unwrap();

        assert_eq!(session.get::<u64>("user_id").unwrap(), Some(42));
        assert_eq!(
            session.get::<Vec<String>>("roles").unwrap(),
            Some(vec!["admin".to_string(), "editor".to_string()])
        );
        assert_eq!(session.get::<u64>("missing").unwrap(), None);
        assert!(session.get::<u64>("roles").is_err());
    }

    #[test]
    fn test_new_sessions_have_distinct_ids() {
        assert_ne!(Session::new().id(), Session::new().id());
        assert!(Session::new().is_empty());
    }
}
