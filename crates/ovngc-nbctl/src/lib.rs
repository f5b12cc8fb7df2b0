//! OVN northbound access through `ovn-nbctl`
//!
//! [`OvnNbClient`] implements the engine's [`ovngc_engine::SdnClient`] by
//! shelling out to nbctl. Invocations are retried with backoff and bounded
//! by a per-command timeout.

#![deny(missing_docs)]

pub mod client;
pub mod parse;

pub use client::{NbctlConfig, NbctlExecutor, OvnNbClient, ProcessExecutor, DEFAULT_COMMAND_TIMEOUT};
