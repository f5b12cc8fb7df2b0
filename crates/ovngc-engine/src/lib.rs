//! Garbage collection of OVN logical objects
//!
//! Each reconciler compares the names a live cluster resource would give an
//! OVN object against the objects present in the northbound database and
//! removes the difference:
//!
//! - [`node`] - node IP records without a Node
//! - [`logical_switch`] - switches without a Subnet
//! - [`logical_router`] - routers without a VPC
//! - [`switch_port`] - ports without a pod or node, confirmed twice
//! - [`load_balancer`] - VIPs without a Service port
//! - [`port_group`] - port groups without a NetworkPolicy
//! - [`static_route`] - routes to unallocated addresses
//!
//! [`GarbageCollector`] runs them in that order.

#![deny(missing_docs)]

pub mod client;
pub mod collector;
pub mod context;
pub mod load_balancer;
pub mod logical_router;
pub mod logical_switch;
pub mod node;
pub mod port_group;
pub mod static_route;
pub mod switch_port;

#[cfg(test)]
mod testing;

pub use client::{AddressSpace, IpRecordStore, ResourceSnapshot, SdnClient, Teardown};
pub use collector::{GarbageCollector, GcSummary};
pub use context::{GcConfig, GcContext, LoadBalancerNames, DEFAULT_CONFIRM_DELAY};
