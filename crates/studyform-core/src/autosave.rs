//! Debounced auto-save.
//!
//! Bursts of edits are coalesced into a single write once the session has
//! been quiet for the configured delay.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::persistence::{save_active, SavedStates, StateStore};
use crate::session::SessionState;

/// Background task that persists the latest session state after a quiet period.
///
/// Dropping the saver cancels any pending write; call [`AutoSaver::finish`]
/// to write it first.
pub struct AutoSaver {
    tx: mpsc::UnboundedSender<Command>,
    handle: JoinHandle<()>,
}

enum Command {
    Touch(SessionState),
    Flush(oneshot::Sender<Result<()>>),
}

impl AutoSaver {
    /// Spawn the saver on the current tokio runtime.
    pub fn spawn(store: Arc<dyn StateStore>, delay: Duration) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<Command>();

        let handle = tokio::spawn(async move {
            let mut pending: Option<SessionState> = None;
            loop {
                tokio::select! {
                    msg = rx.recv() => match msg {
                        Some(Command::Touch(state)) => pending = Some(state),
                        Some(Command::Flush(reply)) => {
                            let result = match pending.take() {
                                Some(state) => flush(store.as_ref(), state),
                                None => Ok(()),
                            };
                            let _ = reply.send(result);
                        }
                        None => break,
                    },
                    _ = tokio::time::sleep(delay), if pending.is_some() => {
                        if let Some(state) = pending.take() {
                            if let Err(e) = flush(store.as_ref(), state) {
                                tracing::error!("auto-save failed: {e:#}");
                            }
                        }
                    }
                }
            }
            tracing::debug!("auto-saver stopped");
        });

        Self { tx, handle }
    }

    /// Record that `state` changed; restarts the quiet period.
    pub fn touch(&self, state: &SessionState) {
        if self.tx.send(Command::Touch(state.snapshot())).is_err() {
            tracing::warn!("auto-saver is no longer running");
        }
    }

    /// Write any pending state now, then stop the saver.
    pub async fn finish(self) -> Result<()> {
        let (reply, done) = oneshot::channel();
        self.tx
            .send(Command::Flush(reply))
            .map_err(|_| anyhow!("auto-saver is no longer running"))?;
        done.await.context("auto-saver stopped before flushing")?
    }

    /// Stop the saver, discarding any write that has not fired yet.
    pub fn shutdown(self) {
        self.handle.abort();
    }
}

impl Drop for AutoSaver {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn flush(store: &dyn StateStore, state: SessionState) -> Result<()> {
    save_active(store, &state)?;
    let id = state.id;
    SavedStates::update(store, |saved| saved.upsert(state))?;
    tracing::info!(session = %id, "auto-saved session");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::StudyLayout;
    use crate::persistence::{load_active, MemoryStore};

    fn session() -> SessionState {
        SessionState::new("P 9", "", vec![], StudyLayout::default()).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn burst_of_edits_is_one_write() {
        let store = Arc::new(MemoryStore::new());
        let saver = AutoSaver::spawn(store.clone(), Duration::from_millis(500));
        let mut state = session();

        for i in 0..5 {
            state.overall_comment = format!("edit {i}");
            saver.touch(&state);
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        assert_eq!(store.save_count(), 0);

        tokio::time::sleep(Duration::from_millis(600)).await;
        // active state plus the saved collection
        assert_eq!(store.save_count(), 2);

        let active = load_active(store.as_ref()).unwrap().unwrap();
        assert_eq!(active.overall_comment, "edit 4");
        assert_eq!(SavedStates::load(store.as_ref()).unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn finish_writes_pending_state_immediately() {
        let store = Arc::new(MemoryStore::new());
        let saver = AutoSaver::spawn(store.clone(), Duration::from_secs(60));
        let mut state = session();
        state.overall_comment = "last edit".into();
        saver.touch(&state);

        saver.finish().await.unwrap();
        assert_eq!(store.save_count(), 2);
        assert_eq!(
            load_active(store.as_ref()).unwrap().unwrap().overall_comment,
            "last edit"
        );
        let saved = SavedStates::load(store.as_ref()).unwrap();
        assert_eq!(saved.get(state.id).unwrap().overall_comment, "last edit");
    }

    #[tokio::test(start_paused = true)]
    async fn finish_without_pending_edits_writes_nothing() {
        let store = Arc::new(MemoryStore::new());
        let saver = AutoSaver::spawn(store.clone(), Duration::from_millis(500));
        saver.finish().await.unwrap();
        assert_eq!(store.save_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_discards_pending_write() {
        let store = Arc::new(MemoryStore::new());
        let saver = AutoSaver::spawn(store.clone(), Duration::from_millis(500));
        saver.touch(&session());
        tokio::time::sleep(Duration::from_millis(100)).await;

        saver.shutdown();
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(store.save_count(), 0);
    }
}
