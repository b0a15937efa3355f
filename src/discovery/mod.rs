pub mod docker;
pub mod error;
pub mod output;
pub mod poller;
pub mod runtime;
pub mod target;

pub use error::DiscoveryError;
pub use poller::{Discoverer, DiscoverySettings};
