use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// A handle for a background refresh task.
///
/// Dropping the handle aborts the task, so a view that owns one cannot be updated after it
/// is torn down.
#[derive(Debug)]
pub struct RefreshHandle {
    join: Option<JoinHandle<()>>,
    stop_tx: Option<oneshot::Sender<()>>,
}

impl RefreshHandle {
    pub(crate) fn new(join: JoinHandle<()>, stop_tx: oneshot::Sender<()>) -> Self {
        Self {
            join: Some(join),
            stop_tx: Some(stop_tx),
        }
    }

    /// Politely ask the task to stop and wait for it to finish.
    pub async fn stop(mut self) {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
        if let Some(join) = self.join.take() {
            let _ = join.await;
        }
    }

    /// Immediately abort the background task.
    pub fn abort(mut self) {
        if let Some(join) = self.join.take() {
            join.abort();
        }
    }

    /// Whether the task has ended.
    pub fn is_finished(&self) -> bool {
        self.join.as_ref().is_none_or(JoinHandle::is_finished)
    }
}

impl Drop for RefreshHandle {
    fn drop(&mut self) {
        if let Some(join) = self.join.take() {
            join.abort();
        }
    }
}
