//! Execution helpers shared by the tree and ring layers.

pub mod parallel;

pub use parallel::{default_workers, WorkerPool};
