//! Session persistence seam and lifecycle helpers.

use std::future::Future;
use std::sync::Arc;

use thiserror::Error;
use tokio::task::JoinHandle;
use uuid::Uuid;

use super::Session;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session {0} does not exist")]
    NotFound(Uuid),

    #[error("session store failed: {0}")]
    Store(String),

    #[error("session value could not be converted: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Storage backend for sessions.
pub trait SessionStore: Send + Sync + 'static {
    /// Insert or replace the session.
    fn save(&self, session: &Session) -> impl Future<Output = Result<(), SessionError>> + Send;

    fn load(&self, id: Uuid) -> impl Future<Output = Result<Option<Session>, SessionError>> + Send;

    /// Remove the session. Destroying an unknown id is [`SessionError::NotFound`].
    fn destroy(&self, id: Uuid) -> impl Future<Output = Result<(), SessionError>> + Send;
}

/// Persist `session`, logging a failure before returning it.
pub async fn save_session<S: SessionStore>(
    store: &S,
    session: &Session,
) -> Result<(), SessionError> {
    store.save(session).await.inspect_err(|e| {
        tracing::error!(session_id = %session.id(), error = %e, "Failed to save session");
    })
}

/// Destroy `session` and wait for the store to finish.
pub async fn dispose_session<S: SessionStore>(
    store: &S,
    session: Session,
) -> Result<(), SessionError> {
    let id = session.id();
    store.destroy(id).await.inspect_err(|e| {
        tracing::error!(session_id = %id, error = %e, "Failed to dispose session");
    })?;
    tracing::debug!(session_id = %id, "Session disposed");
    Ok(())
}

/// Destroy `session` in the background. Failures are logged only.
pub fn dispose_session_detached<S: SessionStore>(
    store: Arc<S>,
    session: Session,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let _ = dispose_session(store.as_ref(), session).await;
    })
}
