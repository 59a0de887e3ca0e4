// Adapters layer: concrete implementations of the breach source and store ports.

pub mod http;
pub mod memory;
pub mod mongo;
