use std::sync::Arc;

use comms::{Mediator, Membership, NodeId};
use log::{debug, error, info, warn};
use model::{Example, Reducible};
use tokio::sync::mpsc;

use crate::{
    accumulator::Accumulator,
    config::{Topics, TrainConfig},
    error::CoordinatorErr,
    handle::CoordinatorHandle,
    listener::EpochListener,
    msg::{Bulletin, ExampleBatch, FeedEvent, Inbound},
    splitter::split_rows,
};

/// Outbound collaborator handles the coordinator drives.
pub struct Collaborators<M> {
    /// Pub/sub fabric for model bulletins and relayed requests.
    pub mediator: Arc<Mediator<Bulletin<M>>>,
    /// Cluster membership, told `down` then `leave` at termination.
    pub membership: Arc<dyn Membership>,
    /// Data-producing collaborator, told to reset and advance per epoch.
    pub feed: mpsc::UnboundedSender<FeedEvent<M>>,
    /// Unit-row dispatcher that assigns work to individual workers.
    pub dispatch: mpsc::UnboundedSender<Example>,
}

/// The iterative-reduce coordinator.
///
/// One dedicated task consumes the inbox and handles each message start to
/// finish before looking at the next, so the pending set, epoch counter,
/// termination flag and held snapshot need no locks. All outbound effects
/// are non-awaited sends; the coordinator never waits for a specific worker,
/// only for the pending set to reach the partition size.
pub struct Coordinator<M: Reducible> {
    partition: usize,
    pretrain_epochs: usize,
    topics: Topics,
    node_id: NodeId,

    inbox: mpsc::UnboundedReceiver<Inbound<M>>,
    collab: Collaborators<M>,
    listener: Option<Box<dyn EpochListener<M>>>,

    accumulator: Accumulator<M>,
    pending: Vec<M>,
    snapshot: Arc<M>,
    epochs_done: usize,
    done: bool,
}

impl<M: Reducible> Coordinator<M> {
    /// Creates the coordinator and the handle that feeds its inbox.
    ///
    /// # Arguments
    /// * `config` - Immutable run configuration; only the partition size and
    ///   epoch target are consumed here.
    /// * `topics` - Topic identifiers to publish on.
    /// * `node_id` - This node's membership identity.
    /// * `snapshot` - The initial global model snapshot.
    /// * `collab` - Outbound collaborator handles.
    pub fn new(
        config: &TrainConfig,
        topics: Topics,
        node_id: NodeId,
        snapshot: M,
        collab: Collaborators<M>,
    ) -> (Self, CoordinatorHandle<M>) {
        let (tx, inbox) = mpsc::unbounded_channel();
        let partition = config.partition().get();

        let coordinator = Self {
            partition,
            pretrain_epochs: config.pretrain_epochs(),
            topics,
            node_id,
            inbox,
            collab,
            listener: None,
            accumulator: Accumulator::new(),
            pending: Vec::with_capacity(partition),
            snapshot: Arc::new(snapshot),
            epochs_done: 0,
            done: false,
        };

        (coordinator, CoordinatorHandle::new(tx))
    }

    /// Number of contributions buffered for the current epoch.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Completed non-terminal epochs.
    pub fn epochs_done(&self) -> usize {
        self.epochs_done
    }

    /// Whether the termination sequence has run.
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// The currently held global snapshot.
    pub fn snapshot(&self) -> &Arc<M> {
        &self.snapshot
    }

    /// Consumes the inbox until the epoch target is reached.
    ///
    /// # Returns
    /// The final global snapshot after the termination sequence has run.
    ///
    /// # Errors
    /// Returns `CoordinatorErr::Interrupted` if every handle was dropped
    /// before the target was reached.
    pub async fn run(mut self) -> Result<Arc<M>, CoordinatorErr> {
        self.setup();

        while !self.done {
            match self.inbox.recv().await {
                Some(msg) => self.handle(msg),
                None => {
                    return Err(CoordinatorErr::Interrupted {
                        epochs_done: self.epochs_done,
                    });
                }
            }
        }

        Ok(self.snapshot)
    }

    /// Handles exactly one inbound message, start to finish.
    pub fn handle(&mut self, msg: Inbound<M>) {
        if self.done {
            debug!(kind = msg.kind(); "message after termination ignored");
            return;
        }

        match msg {
            Inbound::SubscribeAck(ack) => {
                info!(topic = ack.topic(), subscribers = ack.subscribers(); "subscription acknowledged");
            }

            Inbound::RegisterListener(listener) => {
                self.listener = Some(listener);
                info!("epoch listener set");
            }

            Inbound::Contribution(update) => self.on_contribution(update),

            Inbound::BroadcastRequest(bulletin) => {
                let kind = bulletin.kind();
                let subscribers = self.collab.mediator.publish(self.topics.broadcast(), bulletin);
                debug!(kind = kind, subscribers = subscribers; "relayed broadcast request");
            }

            Inbound::Examples(batch) => self.on_examples(batch),

            Inbound::Unrecognized(detail) => {
                warn!(detail = detail.as_str(); "unrecognized message dropped");
            }
        }
    }

    /// Initial broadcast of the starting model and the epoch target.
    fn setup(&self) {
        let subscribers = self
            .collab
            .mediator
            .publish(self.topics.broadcast(), Bulletin::Model(Arc::clone(&self.snapshot)));
        info!(subscribers = subscribers; "broadcast initial model");

        self.collab
            .mediator
            .publish(self.topics.control(), Bulletin::EpochTarget(self.pretrain_epochs));
    }

    fn on_contribution(&mut self, update: M) {
        self.pending.push(update);
        info!(pending = self.pending.len(), partition = self.partition; "worker update received");

        // Edge-triggered: fires exactly once per threshold crossing. The
        // pending set is drained synchronously below, so it can never grow
        // past the partition size.
        if self.pending.len() == self.partition {
            self.reduce();
        }
    }

    /// Reduce, notify, then decide between continuation and termination.
    fn reduce(&mut self) {
        // Non-empty by construction: only called at the partition threshold.
        let Some(last) = self.pending.last().cloned() else {
            return;
        };

        for contribution in self.pending.drain(..) {
            self.accumulator.accumulate(contribution);
        }

        let averaged = match self.accumulator.averaged() {
            Ok(m) => m,
            Err(e) => {
                error!(epoch = self.epochs_done; "reduction failed: {e}");
                return;
            }
        };

        self.snapshot = Arc::new(averaged);
        self.notify_listener();

        if self.epochs_done + 1 >= self.pretrain_epochs {
            self.terminate(last);
        } else {
            self.advance(last);
        }
    }

    /// Listener failures are isolated here so they can never corrupt state
    /// or change the continuation decision.
    fn notify_listener(&mut self) {
        if let Some(listener) = self.listener.as_mut() {
            if let Err(e) = listener.epoch_complete(Arc::clone(&self.snapshot)) {
                warn!(epoch = self.epochs_done; "epoch listener failed: {e}");
            }
        }
    }

    /// Non-terminal epoch boundary: reset the feed, acknowledge it with the
    /// update that crossed the threshold, publish the refreshed model.
    fn advance(&mut self, last: M) {
        self.epochs_done += 1;

        self.send_feed(FeedEvent::Reset);
        self.send_feed(FeedEvent::Advance(last));

        let subscribers = self
            .collab
            .mediator
            .publish(self.topics.broadcast(), Bulletin::Model(Arc::clone(&self.snapshot)));
        info!(epoch = self.epochs_done, subscribers = subscribers; "epoch complete, collecting next round");
    }

    /// Fixed shutdown sequence: notify downstream, clear state, leave the
    /// membership group, stop. Ordered this way because leaving may end
    /// message delivery to this node.
    fn terminate(&mut self, last: M) {
        self.done = true;

        self.send_feed(FeedEvent::Advance(last));
        self.pending.clear();

        self.collab.membership.down(self.node_id);
        self.collab.membership.leave(self.node_id);

        info!(node = self.node_id, target = self.pretrain_epochs; "pretrain target reached, left cluster");
    }

    fn on_examples(&mut self, batch: ExampleBatch) {
        let units = split_rows(batch);
        debug!(units = units.len(); "dispatching example rows");

        for unit in units {
            if self.collab.dispatch.send(unit).is_err() {
                debug!("dispatcher gone, remaining units dropped");
                return;
            }
        }
    }

    fn send_feed(&self, event: FeedEvent<M>) {
        let kind = event.kind();
        if self.collab.feed.send(event).is_err() {
            debug!(kind = kind; "data feed gone, event dropped");
        }
    }
}
