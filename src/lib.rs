//! OVN garbage collector service
//!
//! Wires the engine to its Kubernetes and `ovn-nbctl` backends and runs it
//! on a schedule.

#![deny(missing_docs)]

pub mod scheduler;
pub mod teardown;
pub mod telemetry;

#[cfg(test)]
mod testing;

pub use scheduler::{GcPass, Scheduler, DEFAULT_GC_INTERVAL};
pub use teardown::ClusterTeardown;
pub use telemetry::{init_tracing, LogFormat};
