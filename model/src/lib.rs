mod data;
mod error;
mod net;
mod reduce;
mod spec;

pub use data::{Example, ExamplePair};
pub use error::{ModelError, Result};
pub use net::NetParams;
pub use reduce::Reducible;
pub use spec::{NetSpec, NetVariant};
