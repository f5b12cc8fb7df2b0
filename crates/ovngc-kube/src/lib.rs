//! Kubernetes side of the OVN garbage collector
//!
//! - [`KubeSnapshot`] lists the cluster resources that own OVN objects
//! - [`KubeIpRecordStore`] deletes IP allocation records
//! - [`Ipam`] answers whether an address is still allocated

#![deny(missing_docs)]

pub mod client;
pub mod crd;
pub mod ip_record;
pub mod ipam;
pub mod snapshot;

pub use client::create_client;
pub use ip_record::KubeIpRecordStore;
pub use ipam::Ipam;
pub use snapshot::KubeSnapshot;
