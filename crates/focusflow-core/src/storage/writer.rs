//! Hand-off from the timer to the session store.
//!
//! The timer never waits on persistence: [`SessionWriter::submit`] returns a
//! [`PendingAppend`] right away and the store's verdict arrives on it later.

use std::fmt;
use std::sync::Arc;

use tokio::sync::oneshot;
use tracing::{debug, warn};

use super::SessionStore;
use crate::error::StoreError;
use crate::session::FocusSession;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriteMode {
    Inline,
    Background,
}

/// Submits completed sessions to a [`SessionStore`].
#[derive(Clone)]
pub struct SessionWriter {
    store: Arc<dyn SessionStore>,
    mode: WriteMode,
}

impl fmt::Debug for SessionWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionWriter")
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

impl SessionWriter {
    /// Append on tokio's blocking pool. Needs a running tokio runtime at
    /// submit time; without one the append is reported as unavailable.
    pub fn background(store: Arc<dyn SessionStore>) -> Self {
        Self {
            store,
            mode: WriteMode::Background,
        }
    }

    /// Append synchronously on the caller's thread.
    pub fn inline(store: Arc<dyn SessionStore>) -> Self {
        Self {
            store,
            mode: WriteMode::Inline,
        }
    }

    pub fn submit(&self, session: FocusSession) -> PendingAppend {
        let (tx, rx) = oneshot::channel();
        let session_id = session.id.clone();
        debug!(session_id = %session_id, mode = ?self.mode, "submitting session");

        match self.mode {
            WriteMode::Inline => {
                let _ = tx.send(self.store.append(&session));
            }
            WriteMode::Background => match tokio::runtime::Handle::try_current() {
                Ok(handle) => {
                    let store = Arc::clone(&self.store);
                    handle.spawn_blocking(move || {
                        let result = store.append(&session);
                        if let Err(ref e) = result {
                            warn!(session_id = %session.id, error = %e, "session append failed");
                        }
                        // Receiver may have been dropped; the write still happened.
                        let _ = tx.send(result);
                    });
                }
                Err(_) => {
                    let _ = tx.send(Err(StoreError::Unavailable(
                        "no async runtime to run the append".into(),
                    )));
                }
            },
        }

        PendingAppend { session_id, rx }
    }
}

/// The eventual outcome of one append.
#[derive(Debug)]
pub struct PendingAppend {
    session_id: String,
    rx: oneshot::Receiver<Result<(), StoreError>>,
}

impl PendingAppend {
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Wait for the store to answer.
    pub async fn wait(self) -> Result<(), StoreError> {
        self.rx
            .await
            .unwrap_or_else(|_| Err(StoreError::Unavailable("append task dropped".into())))
    }

    /// Non-blocking check. `None` while the store has not answered yet.
    pub fn try_result(&mut self) -> Option<Result<(), StoreError>> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(oneshot::error::TryRecvError::Empty) => None,
            Err(oneshot::error::TryRecvError::Closed) => Some(Err(StoreError::Unavailable(
                "append task dropped".into(),
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Mode;
    use crate::storage::MemorySessionStore;
    use chrono::Utc;

    #[test]
    fn inline_resolves_immediately() {
        let store = Arc::new(MemorySessionStore::new());
        let writer = SessionWriter::inline(store.clone());
        let session = FocusSession::new(None, Mode::Focus, 60, Utc::now());
        let id = session.id.clone();

        let mut pending = writer.submit(session);
        assert_eq!(pending.session_id(), id);
        assert_eq!(pending.try_result(), Some(Ok(())));
        assert_eq!(store.list_all().unwrap().len(), 1);
    }

    #[test]
    fn inline_reports_store_failure() {
        let store = Arc::new(MemorySessionStore::new());
        store.fail_next_appends(1);
        let writer = SessionWriter::inline(store.clone());

        let mut pending = writer.submit(FocusSession::new(None, Mode::Focus, 60, Utc::now()));
        assert!(matches!(pending.try_result(), Some(Err(StoreError::Unavailable(_)))));
        assert!(store.list_all().unwrap().is_empty());
    }

    #[test]
    fn background_without_runtime_is_unavailable() {
        let store = Arc::new(MemorySessionStore::new());
        let writer = SessionWriter::background(store);
        let mut pending = writer.submit(FocusSession::new(None, Mode::Focus, 60, Utc::now()));
        assert!(matches!(pending.try_result(), Some(Err(StoreError::Unavailable(_)))));
    }

    #[tokio::test]
    async fn background_append_lands_in_store() {
        let store = Arc::new(MemorySessionStore::new());
        let writer = SessionWriter::background(store.clone());
        let pending = writer.submit(FocusSession::new(Some(1), Mode::Focus, 60, Utc::now()));
        assert_eq!(pending.wait().await, Ok(()));
        assert_eq!(store.list_all().unwrap().len(), 1);
    }
}
