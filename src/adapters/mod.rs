//! Adapter implementations for the port traits.

pub mod live;
pub mod memory;
pub mod recording;
pub mod replaying;
