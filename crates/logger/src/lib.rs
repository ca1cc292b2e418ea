//! Process-wide `tracing` setup shared by the pingwatch binaries.

mod subscriber;

pub use subscriber::{LogFormat, init_tracing};
