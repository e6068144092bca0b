use std::sync::Arc;

/// Error surface of an epoch listener; opaque to the coordinator.
pub type ListenerError = Box<dyn std::error::Error + Send + Sync>;

/// Callback notified once per completed epoch with the new global snapshot.
///
/// Invoked synchronously from the coordination task. The snapshot is shared
/// read-only; the coordinator replaces its own reference on the next
/// reduction instead of mutating it in place. A returned error is logged and
/// swallowed, it never affects the termination decision.
pub trait EpochListener<M>: Send {
    fn epoch_complete(&mut self, snapshot: Arc<M>) -> Result<(), ListenerError>;
}
