//! Domain model shared by the collector and its clients
//!
//! Cluster-side types are flattened projections of Kubernetes objects holding
//! only the fields garbage collection reads. OVN-side types mirror rows of the
//! northbound database.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;
use crate::keys::{PolicyKey, PortKey};

// =============================================================================
// Cluster resources
// =============================================================================

/// A cluster node
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
    /// Node name
    pub name: String,
}

impl Node {
    /// Create a node
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// A pod, reduced to what the port collector needs
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pod {
    /// Pod name
    pub name: String,
    /// Pod namespace
    pub namespace: String,
    /// Not terminating and not in a terminal phase
    pub alive: bool,
    /// Carries `ovn.kubernetes.io/allocated: "true"`
    pub allocated: bool,
}

impl Pod {
    /// Key of the logical switch port that belongs to this pod
    pub fn port_key(&self) -> PortKey {
        PortKey::pod(&self.name, &self.namespace)
    }
}

/// A subnet; each subnet is backed by a logical switch of the same name
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Subnet {
    /// Subnet name
    pub name: String,
}

/// A VPC; each VPC is backed by a logical router of the same name
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Vpc {
    /// VPC name
    pub name: String,
}

/// Transport protocol of a service port
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Protocol {
    /// TCP
    Tcp,
    /// UDP
    Udp,
    /// SCTP
    Sctp,
}

impl FromStr for Protocol {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TCP" | "tcp" => Ok(Self::Tcp),
            "UDP" | "udp" => Ok(Self::Udp),
            "SCTP" | "sctp" => Ok(Self::Sctp),
            other => Err(Error::parse("protocol", other)),
        }
    }
}

/// Session affinity of a service
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SessionAffinity {
    /// No stickiness
    #[default]
    None,
    /// Sticky by client IP
    ClientIp,
}

/// One declared port of a service
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServicePort {
    /// Port protocol
    pub protocol: Protocol,
    /// Service port number
    pub port: i32,
}

/// A service with a cluster IP
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Service {
    /// Cluster IP (may be empty or "None" for headless services)
    pub cluster_ip: String,
    /// Declared ports
    pub ports: Vec<ServicePort>,
    /// Session affinity
    pub session_affinity: SessionAffinity,
}

/// A network policy
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NetworkPolicy {
    /// Policy namespace
    pub namespace: String,
    /// Policy name
    pub name: String,
}

impl NetworkPolicy {
    /// Key that port groups reference
    pub fn key(&self) -> PolicyKey {
        PolicyKey::new(&self.namespace, &self.name)
    }
}

/// An IP allocation record (`ips.kubeovn.io`)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IpRecord {
    /// `<pod>.<namespace>` or `node-<node>`
    pub name: String,
    /// Allocated addresses (one per address family)
    pub addresses: Vec<String>,
}

impl IpRecord {
    /// Node name if this is a node record
    pub fn node_name(&self) -> Option<String> {
        PortKey::parse(&self.name).and_then(|k| k.node_name().map(str::to_string))
    }
}

// =============================================================================
// OVN objects
// =============================================================================

/// A port group and the network policy it was created for
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PortGroup {
    /// Port group name
    pub name: String,
    /// Owning policy, if the port group was created for one
    pub policy: Option<PolicyKey>,
}

/// Routing policy of a static route
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum RoutePolicy {
    /// No explicit policy; OVN treats it as destination routing
    #[default]
    Unspecified,
    /// Match on destination IP
    DstIp,
    /// Match on source IP (reroute style)
    SrcIp,
}

impl RoutePolicy {
    /// Whether the route is keyed on its next hop rather than its prefix
    pub fn routes_by_destination(self) -> bool {
        matches!(self, Self::Unspecified | Self::DstIp)
    }
}

impl FromStr for RoutePolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" => Ok(Self::Unspecified),
            "dst-ip" => Ok(Self::DstIp),
            "src-ip" => Ok(Self::SrcIp),
            other => Err(Error::parse("route policy", other)),
        }
    }
}

impl fmt::Display for RoutePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unspecified => write!(f, ""),
            Self::DstIp => write!(f, "dst-ip"),
            Self::SrcIp => write!(f, "src-ip"),
        }
    }
}

/// A static route on a logical router
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StaticRoute {
    /// Routing policy
    pub policy: RoutePolicy,
    /// Prefix: a CIDR, or a bare address for per-host reroutes
    pub cidr: String,
    /// Next hop address
    pub next_hop: String,
}

impl StaticRoute {
    /// Whether the prefix is CIDR-notated
    pub fn is_cidr(&self) -> bool {
        self.cidr.contains('/')
    }
}
