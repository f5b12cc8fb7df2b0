//! Configuration and shared collaborators for a garbage collection pass

use std::sync::Arc;
use std::time::Duration;

use ovngc_common::{
    DEFAULT_TCP_LB, DEFAULT_TCP_SESSION_LB, DEFAULT_UDP_LB, DEFAULT_UDP_SESSION_LB, DEFAULT_VPC,
};

use crate::client::{AddressSpace, IpRecordStore, ResourceSnapshot, SdnClient, Teardown};

/// Delay between the two switch port comparisons of a pass
pub const DEFAULT_CONFIRM_DELAY: Duration = Duration::from_secs(3);

/// Names of the four cluster load balancers
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadBalancerNames {
    /// Plain TCP
    pub tcp: String,
    /// Plain UDP
    pub udp: String,
    /// Client-IP sticky TCP
    pub tcp_session: String,
    /// Client-IP sticky UDP
    pub udp_session: String,
}

impl Default for LoadBalancerNames {
    fn default() -> Self {
        Self {
            tcp: DEFAULT_TCP_LB.to_string(),
            udp: DEFAULT_UDP_LB.to_string(),
            tcp_session: DEFAULT_TCP_SESSION_LB.to_string(),
            udp_session: DEFAULT_UDP_SESSION_LB.to_string(),
        }
    }
}

/// Tunables of the collector
#[derive(Clone, Debug)]
pub struct GcConfig {
    /// Pause between the two switch port comparisons
    pub confirm_delay: Duration,
    /// Cluster load balancer names
    pub load_balancers: LoadBalancerNames,
    /// Router whose static routes are collected
    pub cluster_router: String,
}

impl Default for GcConfig {
    fn default() -> Self {
        Self {
            confirm_delay: DEFAULT_CONFIRM_DELAY,
            load_balancers: LoadBalancerNames::default(),
            cluster_router: DEFAULT_VPC.to_string(),
        }
    }
}

/// Everything a reconciler talks to
#[derive(Clone)]
pub struct GcContext {
    /// Cluster resource listings
    pub snapshot: Arc<dyn ResourceSnapshot>,
    /// OVN northbound client
    pub sdn: Arc<dyn SdnClient>,
    /// Cascading deletes
    pub teardown: Arc<dyn Teardown>,
    /// IP allocation records
    pub ip_records: Arc<dyn IpRecordStore>,
    /// Allocated address space
    pub address_space: Arc<dyn AddressSpace>,
    /// Tunables
    pub config: GcConfig,
}
