use std::{io, sync::Arc};

use comms::NodeId;
use coordinator::{Bulletin, CoordinatorHandle};
use log::{debug, info, warn};
use model::{Example, Reducible};
use tokio::{
    sync::{broadcast, mpsc},
    task,
};

use crate::metrics::WorkerStats;

/// Co-located worker harness.
///
/// Tracks the latest global snapshot from the broadcast topic, buffers the
/// unit rows assigned to it, and fires one contribution per snapshot refresh
/// into the coordinator inbox.
///
/// Concurrency note:
/// - Compute is CPU-bound and runs on Tokio's blocking pool via `spawn_blocking`.
/// - The unit buffer is moved out wholesale to satisfy `'static` without cloning.
pub struct WorkerLoop<M, C> {
    id: NodeId,
    bulletins: broadcast::Receiver<Bulletin<M>>,
    units: mpsc::UnboundedReceiver<Example>,
    handle: CoordinatorHandle<M>,
    compute: C,

    current: Option<Arc<M>>,
    buffer: Vec<Example>,
    fresh_round: bool,
    stats: WorkerStats,
}

impl<M, C> WorkerLoop<M, C> {
    /// Creates a new worker loop.
    ///
    /// # Args
    /// * `id` - Identifier used for observability.
    /// * `bulletins` - Subscription on the model broadcast topic.
    /// * `units` - This worker's share of dispatched unit rows.
    /// * `handle` - Coordinator inbox handle contributions are fired into.
    /// * `compute` - Maps the current snapshot plus assigned units into a
    ///   partial model update.
    pub fn new(
        id: NodeId,
        bulletins: broadcast::Receiver<Bulletin<M>>,
        units: mpsc::UnboundedReceiver<Example>,
        handle: CoordinatorHandle<M>,
        compute: C,
    ) -> Self {
        Self {
            id,
            bulletins,
            units,
            handle,
            compute,
            current: None,
            buffer: Vec::new(),
            fresh_round: false,
            stats: WorkerStats::default(),
        }
    }

    pub fn stats(&self) -> &WorkerStats {
        &self.stats
    }
}

impl<M, C> WorkerLoop<M, C>
where
    M: Reducible,
    C: Fn(&M, &[Example]) -> M + Send + Sync + Clone + 'static,
{
    /// Runs until both inbound channels are gone.
    pub async fn run(mut self) -> io::Result<WorkerStats> {
        loop {
            tokio::select! {
                bulletin = self.bulletins.recv() => match bulletin {
                    Ok(Bulletin::Model(snapshot)) => {
                        debug!(worker_id = self.id; "received refreshed model");
                        self.current = Some(snapshot);
                        self.fresh_round = true;
                        self.try_contribute().await?;
                    }
                    Ok(Bulletin::EpochTarget(target)) => {
                        debug!(worker_id = self.id, target = target; "epoch target announced");
                    }
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        warn!(worker_id = self.id, missed = missed; "lagged behind the broadcast topic");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                },

                unit = self.units.recv() => match unit {
                    Some(unit) => {
                        self.buffer.push(unit);
                        self.stats.add_units(1);
                        self.try_contribute().await?;
                    }
                    None => break,
                },
            }
        }

        info!(worker_id = self.id, contributions = self.stats.contributions; "worker finished");
        Ok(self.stats)
    }

    /// Contributes once per refreshed snapshot, as soon as work is buffered.
    async fn try_contribute(&mut self) -> io::Result<()> {
        if !self.fresh_round || self.buffer.is_empty() {
            return Ok(());
        }
        let Some(snapshot) = self.current.clone() else {
            return Ok(());
        };

        let units = std::mem::take(&mut self.buffer);
        let compute = self.compute.clone();

        let update = task::spawn_blocking(move || compute(&snapshot, &units))
            .await
            .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("compute join error: {e}")))?;

        self.handle.contribute(update);
        self.fresh_round = false;
        self.stats.bump_contribution();
        Ok(())
    }
}
