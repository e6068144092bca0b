use std::sync::Arc;

use comms::SubscribeAck;
use model::ExamplePair;

use crate::listener::EpochListener;

/// Payloads published on the mediator topics.
pub enum Bulletin<M> {
    /// The current global model snapshot.
    Model(Arc<M>),
    /// The configured number of pretrain epochs.
    EpochTarget(usize),
}

impl<M> Bulletin<M> {
    pub fn kind(&self) -> &'static str {
        match self {
            Bulletin::Model(_) => "bulletin/model",
            Bulletin::EpochTarget(_) => "bulletin/epoch_target",
        }
    }
}

impl<M> Clone for Bulletin<M> {
    fn clone(&self) -> Self {
        match self {
            Bulletin::Model(snapshot) => Bulletin::Model(Arc::clone(snapshot)),
            Bulletin::EpochTarget(target) => Bulletin::EpochTarget(*target),
        }
    }
}

/// Control events sent to the data-producing collaborator.
pub enum FeedEvent<M> {
    /// Request a fresh pass over the training data.
    Reset,
    /// Epoch boundary acknowledgment carrying the update that crossed it.
    Advance(M),
}

impl<M> FeedEvent<M> {
    pub fn kind(&self) -> &'static str {
        match self {
            FeedEvent::Reset => "feed/reset",
            FeedEvent::Advance(_) => "feed/advance",
        }
    }
}

/// Bulk training examples awaiting decomposition into unit rows.
pub enum ExampleBatch {
    /// A single, possibly multi-row, input/label pair.
    Pair(ExamplePair),
    /// A pre-split list of pairs.
    List(Vec<ExamplePair>),
}

impl ExampleBatch {
    /// Number of example rows the batch logically represents.
    pub fn rows(&self) -> usize {
        match self {
            ExampleBatch::Pair(pair) => pair.rows(),
            ExampleBatch::List(pairs) => pairs.iter().map(ExamplePair::rows).sum(),
        }
    }
}

/// Every message shape the coordinator accepts, dispatched exhaustively.
pub enum Inbound<M> {
    /// Informational subscription receipt; logged, nothing else.
    SubscribeAck(SubscribeAck),
    /// Installs the epoch-completion callback, replacing any prior one.
    RegisterListener(Box<dyn EpochListener<M>>),
    /// One worker's model snapshot for the current epoch.
    Contribution(M),
    /// Republished verbatim on the broadcast topic, in any state.
    BroadcastRequest(Bulletin<M>),
    /// Bulk training examples to split into unit rows and dispatch.
    Examples(ExampleBatch),
    /// Anything that matched no known shape; logged and dropped.
    Unrecognized(String),
}

impl<M> Inbound<M> {
    pub fn kind(&self) -> &'static str {
        match self {
            Inbound::SubscribeAck(_) => "subscribe_ack",
            Inbound::RegisterListener(_) => "register_listener",
            Inbound::Contribution(_) => "contribution",
            Inbound::BroadcastRequest(_) => "broadcast_request",
            Inbound::Examples(_) => "examples",
            Inbound::Unrecognized(_) => "unrecognized",
        }
    }
}
