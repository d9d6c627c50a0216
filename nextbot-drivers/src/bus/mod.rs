//! Slave-side bus plumbing

pub mod target;

pub use target::{TargetBuffer, RX_CAPACITY};
