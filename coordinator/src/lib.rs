mod accumulator;
mod config;
mod coordinator;
mod error;
mod handle;
mod listener;
mod msg;
mod splitter;

pub use accumulator::Accumulator;
pub use config::{Topics, TrainConfig};
pub use coordinator::{Collaborators, Coordinator};
pub use error::{CoordinatorErr, ReduceError, Result};
pub use handle::CoordinatorHandle;
pub use listener::{EpochListener, ListenerError};
pub use msg::{Bulletin, ExampleBatch, FeedEvent, Inbound};
pub use splitter::split_rows;
