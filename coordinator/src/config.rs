use std::num::NonZeroUsize;

use model::NetSpec;

/// Topic identifiers the coordinator publishes on.
///
/// Passed in at construction so no global topic constants exist.
#[derive(Debug, Clone)]
pub struct Topics {
    broadcast: String,
    control: String,
}

impl Topics {
    /// Creates a new topic set.
    ///
    /// # Arguments
    /// * `broadcast` - Topic carrying model snapshots and relayed requests.
    /// * `control` - Topic carrying run-level announcements like the epoch target.
    pub fn new(broadcast: impl Into<String>, control: impl Into<String>) -> Self {
        Self {
            broadcast: broadcast.into(),
            control: control.into(),
        }
    }

    pub fn broadcast(&self) -> &str {
        &self.broadcast
    }

    pub fn control(&self) -> &str {
        &self.control
    }
}

/// Immutable run configuration, read once at setup and never mutated.
#[derive(Debug, Clone)]
pub struct TrainConfig {
    net: NetSpec,
    pretrain_epochs: usize,
    partition: NonZeroUsize,
}

impl TrainConfig {
    /// Creates a new training configuration.
    ///
    /// # Arguments
    /// * `net` - The network spec the initial snapshot is built from.
    /// * `pretrain_epochs` - Number of collect/reduce cycles before termination.
    /// * `partition` - Worker contributions required before a reduction fires.
    pub fn new(net: NetSpec, pretrain_epochs: usize, partition: NonZeroUsize) -> Self {
        Self {
            net,
            pretrain_epochs,
            partition,
        }
    }

    pub fn net(&self) -> &NetSpec {
        &self.net
    }

    pub fn pretrain_epochs(&self) -> usize {
        self.pretrain_epochs
    }

    pub fn partition(&self) -> NonZeroUsize {
        self.partition
    }
}
