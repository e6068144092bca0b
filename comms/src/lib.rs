mod mediator;
mod membership;

pub use mediator::{Mediator, SubscribeAck};
pub use membership::{LocalRoster, Membership, NodeId, NodeStatus};
