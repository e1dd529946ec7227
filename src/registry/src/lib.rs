//! The per-site registry of glidein queues, canonicalised and keyed by
//! resource class.

pub mod registry;

pub use registry::{ClientRegistry, QueueInput, QueueState, QueueStatusEntry};
