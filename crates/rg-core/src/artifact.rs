use std::sync::{Mutex, MutexGuard, PoisonError};

use rg_lang::Value;
use tokio::sync::mpsc;

/// Output of one successful rule evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    /// Producing rule. `None` only for synthetic artifacts.
    pub id: Option<String>,
    /// Success-action result; `None` when the rule has no action.
    pub value: Option<Value>,
}

impl Artifact {
    pub fn new(id: impl Into<String>, value: Option<Value>) -> Self {
        Self {
            id: Some(id.into()),
            value,
        }
    }
}

#[derive(Default)]
struct LogInner {
    items: Vec<Artifact>,
    subscribers: Vec<mpsc::UnboundedSender<Artifact>>,
}

/// Append-only artifact list shared by every run of an engine.
///
/// Subscribers are notified inside the append critical section, so each
/// receiver observes artifacts in log order.
#[derive(Default)]
pub(crate) struct ArtifactLog {
    inner: Mutex<LogInner>,
}

impl ArtifactLog {
    fn lock(&self) -> MutexGuard<'_, LogInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn append(&self, artifact: Artifact) {
        let mut inner = self.lock();
        inner.items.push(artifact.clone());
        // Dropped receivers are pruned here.
        inner
            .subscribers
            .retain(|tx| tx.send(artifact.clone()).is_ok());
    }

    pub(crate) fn snapshot(&self) -> Vec<Artifact> {
        self.lock().items.clone()
    }

    pub(crate) fn clear(&self) {
        self.lock().items.clear();
    }

    pub(crate) fn subscribe(&self) -> mpsc::UnboundedReceiver<Artifact> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.lock().subscribers.push(tx);
        rx
    }
}
