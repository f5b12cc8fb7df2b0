//! Collaborator traits the reconcilers are written against
//!
//! Production implementations live in `ovngc-kube` (cluster snapshot, IP
//! records, address space) and `ovngc-nbctl` (OVN northbound). Tests use the
//! generated mocks.

use std::collections::HashMap;

use async_trait::async_trait;
use ovngc_common::model::{
    IpRecord, NetworkPolicy, Node, Pod, PortGroup, Service, StaticRoute, Subnet, Vpc,
};
use ovngc_common::Result;

#[cfg(test)]
use mockall::automock;

/// Read-only listings of cluster resources.
///
/// Listings come from caches that may lag the cluster; callers must not
/// assume an object missing from a listing is gone for good.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ResourceSnapshot: Send + Sync {
    /// List all nodes
    async fn list_nodes(&self) -> Result<Vec<Node>>;

    /// List all pods in all namespaces
    async fn list_pods(&self) -> Result<Vec<Pod>>;

    /// List all subnets
    async fn list_subnets(&self) -> Result<Vec<Subnet>>;

    /// List all VPCs
    async fn list_vpcs(&self) -> Result<Vec<Vpc>>;

    /// List all services in all namespaces
    async fn list_services(&self) -> Result<Vec<Service>>;

    /// List all network policies in all namespaces
    async fn list_network_policies(&self) -> Result<Vec<NetworkPolicy>>;

    /// List all IP allocation records
    async fn list_ip_records(&self) -> Result<Vec<IpRecord>>;
}

/// Primitives over OVN northbound objects
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SdnClient: Send + Sync {
    /// Names of all logical switches
    async fn list_logical_switches(&self) -> Result<Vec<String>>;

    /// Names of all logical routers
    async fn list_logical_routers(&self) -> Result<Vec<String>>;

    /// Names of all regular (untyped) logical switch ports
    async fn list_logical_switch_ports(&self) -> Result<Vec<String>>;

    /// Delete a logical switch port; absent ports are not an error
    async fn delete_logical_switch_port(&self, name: &str) -> Result<()>;

    /// Resolve a configured load balancer name to its row id
    ///
    /// Returns `None` when no load balancer with that name exists.
    async fn find_load_balancer(&self, name: &str) -> Result<Option<String>>;

    /// VIP to backend mapping of a load balancer
    async fn get_load_balancer_vips(&self, id: &str) -> Result<HashMap<String, String>>;

    /// Remove one VIP from the named load balancer
    async fn delete_load_balancer_vip(&self, vip: &str, lb_name: &str) -> Result<()>;

    /// All port groups with their owning policy association
    async fn list_port_groups(&self) -> Result<Vec<PortGroup>>;

    /// Static routes of a logical router
    async fn list_static_routes(&self, router: &str) -> Result<Vec<StaticRoute>>;

    /// Delete every route on `router` that uses `next_hop`
    async fn delete_static_route_by_next_hop(&self, router: &str, next_hop: &str) -> Result<()>;

    /// Delete the route for `cidr` on `router`
    async fn delete_static_route(&self, router: &str, cidr: &str) -> Result<()>;

    /// Delete a logical switch and everything attached to it
    async fn delete_logical_switch(&self, name: &str) -> Result<()>;

    /// Delete a logical router and everything attached to it
    async fn delete_logical_router(&self, name: &str) -> Result<()>;

    /// Delete a port group
    async fn delete_port_group(&self, name: &str) -> Result<()>;
}

/// Cascading teardown of everything owned by a cluster resource
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Teardown: Send + Sync {
    /// Remove the node's port, IP record and routes
    async fn delete_node(&self, name: &str) -> Result<()>;

    /// Remove a subnet's logical switch and its router attachment
    async fn delete_logical_switch(&self, name: &str) -> Result<()>;

    /// Remove a VPC's logical router
    async fn delete_logical_router(&self, name: &str) -> Result<()>;

    /// Remove the port group (and its ACLs) created for a network policy
    async fn delete_network_policy(&self, port_group: &PortGroup) -> Result<()>;
}

/// Deletion of IP allocation records
#[cfg_attr(test, automock)]
#[async_trait]
pub trait IpRecordStore: Send + Sync {
    /// Delete the named record. A record that is already gone is success.
    async fn delete_ip_record(&self, name: &str) -> Result<()>;
}

/// Containment test against the live allocated address space
#[cfg_attr(test, automock)]
pub trait AddressSpace: Send + Sync {
    /// Whether `address` is currently allocated to a workload or node
    fn contains_address(&self, address: &str) -> bool;
}
