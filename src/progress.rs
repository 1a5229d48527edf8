//! Best-effort progress reporting for long-running report generation.
//!
//! Stages emit an event after each completed step. Delivery is advisory:
//! a dropped or unconsumed receiver never stalls or fails a run.

use serde::Serialize;
use serde_json::Value;
use tokio::sync::mpsc;

/// One completed step inside a run.
///
/// `node` identifies the step; `diff` is the structured partial state the
/// step contributed (section name, content delta, grade verdict), so a
/// consumer can fold events into a live view of the run.
#[derive(Debug, Clone, Serialize)]
pub struct ProgressEvent {
    pub node: String,
    pub diff: Value,
}

/// Cloneable handle stages use to report progress.
#[derive(Clone)]
pub struct ProgressSender {
    tx: Option<mpsc::UnboundedSender<ProgressEvent>>,
}

impl ProgressSender {
    /// A sender whose events are delivered to the paired receiver.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ProgressEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx: Some(tx) }, rx)
    }

    /// A sender that discards every event.
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    /// Emit an event. Send failures are ignored: progress is observability,
    /// not control flow.
    pub fn emit(&self, node: impl Into<String>, diff: Value) {
        if let Some(tx) = &self.tx {
            let _ = tx.send(ProgressEvent {
                node: node.into(),
                diff,
            });
        }
    }
}
