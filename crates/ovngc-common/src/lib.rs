//! Common types for the OVN garbage collector: errors, typed keys, domain model

#![deny(missing_docs)]

pub mod error;
pub mod keys;
pub mod model;
pub mod retry;

pub use error::Error;

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Logical switch interconnecting clusters; never garbage collected
pub const INTERCONNECTION_SWITCH: &str = "ts";

/// Logical switch attached to the external gateway; never garbage collected
pub const EXTERNAL_GATEWAY_SWITCH: &str = "ovn-external";

/// Router of the default VPC; never garbage collected
pub const DEFAULT_VPC: &str = "ovn-cluster";

/// Annotation set on pods once an address has been allocated
pub const ALLOCATED_ANNOTATION: &str = "ovn.kubernetes.io/allocated";

/// Default name of the plain TCP cluster load balancer
pub const DEFAULT_TCP_LB: &str = "cluster-tcp-loadbalancer";

/// Default name of the plain UDP cluster load balancer
pub const DEFAULT_UDP_LB: &str = "cluster-udp-loadbalancer";

/// Default name of the client-IP sticky TCP cluster load balancer
pub const DEFAULT_TCP_SESSION_LB: &str = "cluster-tcp-session-loadbalancer";

/// Default name of the client-IP sticky UDP cluster load balancer
pub const DEFAULT_UDP_SESSION_LB: &str = "cluster-udp-session-loadbalancer";
