//! Live notification fan-out adapters.

mod registry;

pub use registry::{ChannelRegistry, DEFAULT_QUEUE_CAPACITY};
