use comms::SubscribeAck;
use log::debug;
use tokio::sync::mpsc;

use crate::{
    listener::EpochListener,
    msg::{Bulletin, ExampleBatch, Inbound},
};

/// Cloneable handle feeding the coordinator's inbox.
///
/// Every send is fire-and-forget; once the coordinator has terminated the
/// message is simply dropped, matching the protocol's "ignore after
/// shutdown" rule.
pub struct CoordinatorHandle<M> {
    tx: mpsc::UnboundedSender<Inbound<M>>,
}

impl<M> Clone for CoordinatorHandle<M> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<M> CoordinatorHandle<M> {
    pub(crate) fn new(tx: mpsc::UnboundedSender<Inbound<M>>) -> Self {
        Self { tx }
    }

    /// Enqueues any inbound message.
    pub fn send(&self, msg: Inbound<M>) {
        let kind = msg.kind();
        if self.tx.send(msg).is_err() {
            debug!(kind = kind; "coordinator gone, message dropped");
        }
    }

    /// Submits one worker's snapshot for the current epoch.
    pub fn contribute(&self, update: M) {
        self.send(Inbound::Contribution(update));
    }

    /// Installs the epoch-completion listener, replacing any prior one.
    pub fn register_listener(&self, listener: Box<dyn EpochListener<M>>) {
        self.send(Inbound::RegisterListener(listener));
    }

    /// Asks the coordinator to republish a bulletin to all subscribers.
    pub fn relay(&self, bulletin: Bulletin<M>) {
        self.send(Inbound::BroadcastRequest(bulletin));
    }

    /// Hands bulk training examples over for splitting and dispatch.
    pub fn examples(&self, batch: ExampleBatch) {
        self.send(Inbound::Examples(batch));
    }

    /// Forwards a subscription receipt for logging.
    pub fn ack(&self, ack: SubscribeAck) {
        self.send(Inbound::SubscribeAck(ack));
    }
}
