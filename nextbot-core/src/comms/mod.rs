//! Bus communicators
//!
//! The master side sends one command at a time and blocks, by bounded
//! polling, for the correlated response. The slave side is driven by the
//! main loop: each [`Slave::poll`] call advances motion control by one step
//! and moves command dispatch forward by at most one phase.

pub mod error;
pub mod id;
pub mod master;
pub mod slave;

pub use error::CommsError;
pub use id::IdGenerator;
pub use master::Master;
pub use slave::{Phase, Slave};
