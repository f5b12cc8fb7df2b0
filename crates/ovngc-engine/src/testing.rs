//! Test fixtures: model constructors, a mock-backed context builder, and an
//! in-memory cluster for multi-pass stories.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use ovngc_common::keys::{PolicyKey, PortKey};
use ovngc_common::model::{
    IpRecord, NetworkPolicy, Node, Pod, PortGroup, Protocol, RoutePolicy, Service, ServicePort,
    SessionAffinity, StaticRoute, Subnet, Vpc,
};
use ovngc_common::{Error, Result};

use crate::client::{
    AddressSpace, IpRecordStore, MockAddressSpace, MockIpRecordStore, MockResourceSnapshot,
    MockSdnClient, MockTeardown, ResourceSnapshot, SdnClient, Teardown,
};
use crate::context::{GcConfig, GcContext};

// =============================================================================
// Model fixtures
// =============================================================================

pub fn node(name: &str) -> Node {
    Node::new(name)
}

/// An alive pod with an allocated address
pub fn pod(name: &str, namespace: &str) -> Pod {
    Pod {
        name: name.to_string(),
        namespace: namespace.to_string(),
        alive: true,
        allocated: true,
    }
}

pub fn subnet(name: &str) -> Subnet {
    Subnet {
        name: name.to_string(),
    }
}

pub fn vpc(name: &str) -> Vpc {
    Vpc {
        name: name.to_string(),
    }
}

pub fn ip_record(name: &str, address: &str) -> IpRecord {
    IpRecord {
        name: name.to_string(),
        addresses: vec![address.to_string()],
    }
}

pub fn network_policy(namespace: &str, name: &str) -> NetworkPolicy {
    NetworkPolicy {
        namespace: namespace.to_string(),
        name: name.to_string(),
    }
}

pub fn service(cluster_ip: &str, ports: &[(Protocol, i32)], affinity: SessionAffinity) -> Service {
    Service {
        cluster_ip: cluster_ip.to_string(),
        ports: ports
            .iter()
            .map(|&(protocol, port)| ServicePort { protocol, port })
            .collect(),
        session_affinity: affinity,
    }
}

pub fn route(policy: RoutePolicy, cidr: &str, next_hop: &str) -> StaticRoute {
    StaticRoute {
        policy,
        cidr: cidr.to_string(),
        next_hop: next_hop.to_string(),
    }
}

fn test_config() -> GcConfig {
    GcConfig {
        confirm_delay: Duration::ZERO,
        ..Default::default()
    }
}

// =============================================================================
// Mock-backed context
// =============================================================================

/// Builds a context from mocks. Collaborators that are not set get a mock
/// with no expectations, so any call to them fails the test.
pub struct ContextBuilder {
    snapshot: MockResourceSnapshot,
    sdn: MockSdnClient,
    teardown: MockTeardown,
    ip_records: MockIpRecordStore,
    address_space: MockAddressSpace,
}

impl ContextBuilder {
    pub fn new() -> Self {
        Self {
            snapshot: MockResourceSnapshot::new(),
            sdn: MockSdnClient::new(),
            teardown: MockTeardown::new(),
            ip_records: MockIpRecordStore::new(),
            address_space: MockAddressSpace::new(),
        }
    }

    pub fn snapshot(mut self, snapshot: MockResourceSnapshot) -> Self {
        self.snapshot = snapshot;
        self
    }

    pub fn sdn(mut self, sdn: MockSdnClient) -> Self {
        self.sdn = sdn;
        self
    }

    pub fn teardown(mut self, teardown: MockTeardown) -> Self {
        self.teardown = teardown;
        self
    }

    pub fn ip_records(mut self, ip_records: MockIpRecordStore) -> Self {
        self.ip_records = ip_records;
        self
    }

    pub fn address_space(mut self, address_space: MockAddressSpace) -> Self {
        self.address_space = address_space;
        self
    }

    pub fn build(self) -> GcContext {
        GcContext {
            snapshot: Arc::new(self.snapshot),
            sdn: Arc::new(self.sdn),
            teardown: Arc::new(self.teardown),
            ip_records: Arc::new(self.ip_records),
            address_space: Arc::new(self.address_space),
            config: test_config(),
        }
    }
}

// =============================================================================
// In-memory cluster
// =============================================================================

#[derive(Default)]
struct State {
    nodes: Vec<Node>,
    pods: Vec<Pod>,
    subnets: Vec<Subnet>,
    vpcs: Vec<Vpc>,
    services: Vec<Service>,
    policies: Vec<NetworkPolicy>,
    ip_records: Vec<IpRecord>,
    switches: BTreeSet<String>,
    routers: BTreeSet<String>,
    ports: BTreeSet<String>,
    load_balancers: HashMap<String, HashMap<String, String>>,
    port_groups: Vec<PortGroup>,
    routes: Vec<StaticRoute>,
    failing: HashSet<String>,
}

impl State {
    fn check(&self, name: &str, op: &str) -> Result<()> {
        if self.failing.contains(name) {
            return Err(Error::ovn(format!("{op} {name}"), "injected failure"));
        }
        Ok(())
    }
}

/// Shared in-memory cluster and OVN database implementing every
/// collaborator trait. Teardown removes what the real teardown would.
#[derive(Clone, Default)]
pub struct FakeCluster {
    state: Arc<Mutex<State>>,
}

impl FakeCluster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn context(&self) -> GcContext {
        GcContext {
            snapshot: Arc::new(self.clone()),
            sdn: Arc::new(self.clone()),
            teardown: Arc::new(self.clone()),
            ip_records: Arc::new(self.clone()),
            address_space: Arc::new(self.clone()),
            config: test_config(),
        }
    }

    fn with<T>(&self, f: impl FnOnce(&mut State) -> T) -> T {
        f(&mut self.state.lock().unwrap())
    }

    pub fn add_node(&self, node: Node) {
        self.with(|s| s.nodes.push(node));
    }

    pub fn add_pod(&self, pod: Pod) {
        self.with(|s| s.pods.push(pod));
    }

    pub fn remove_pod(&self, name: &str, namespace: &str) {
        self.with(|s| s.pods.retain(|p| p.name != name || p.namespace != namespace));
    }

    pub fn add_subnet(&self, subnet: Subnet) {
        self.with(|s| s.subnets.push(subnet));
    }

    pub fn add_vpc(&self, vpc: Vpc) {
        self.with(|s| s.vpcs.push(vpc));
    }

    pub fn add_ip_record(&self, name: &str, address: &str) {
        self.with(|s| s.ip_records.push(ip_record(name, address)));
    }

    pub fn has_ip_record(&self, name: &str) -> bool {
        self.with(|s| s.ip_records.iter().any(|r| r.name == name))
    }

    pub fn add_switch(&self, name: &str) {
        self.with(|s| s.switches.insert(name.to_string()));
    }

    pub fn has_switch(&self, name: &str) -> bool {
        self.with(|s| s.switches.contains(name))
    }

    pub fn add_router(&self, name: &str) {
        self.with(|s| s.routers.insert(name.to_string()));
    }

    pub fn has_router(&self, name: &str) -> bool {
        self.with(|s| s.routers.contains(name))
    }

    pub fn add_port(&self, name: &str) {
        self.with(|s| s.ports.insert(name.to_string()));
    }

    pub fn has_port(&self, name: &str) -> bool {
        self.with(|s| s.ports.contains(name))
    }

    pub fn add_service(&self, service: Service) {
        self.with(|s| s.services.push(service));
    }

    pub fn add_policy(&self, policy: NetworkPolicy) {
        self.with(|s| s.policies.push(policy));
    }

    /// Create a load balancer, looked up by `name`, holding `vips`
    pub fn add_load_balancer(&self, name: &str, vips: &[&str]) {
        let vips = vips
            .iter()
            .map(|v| (v.to_string(), "10.16.0.5:8080".to_string()))
            .collect();
        self.with(|s| s.load_balancers.insert(name.to_string(), vips));
    }

    pub fn has_vip(&self, lb: &str, vip: &str) -> bool {
        self.with(|s| s.load_balancers.get(lb).is_some_and(|v| v.contains_key(vip)))
    }

    pub fn add_port_group(&self, name: &str, policy: Option<PolicyKey>) {
        self.with(|s| {
            s.port_groups.push(PortGroup {
                name: name.to_string(),
                policy,
            })
        });
    }

    pub fn has_port_group(&self, name: &str) -> bool {
        self.with(|s| s.port_groups.iter().any(|pg| pg.name == name))
    }

    pub fn add_route(&self, route: StaticRoute) {
        self.with(|s| s.routes.push(route));
    }

    /// Make every delete of `name` fail
    pub fn fail_deletes_of(&self, name: &str) {
        self.with(|s| s.failing.insert(name.to_string()));
    }

    /// Number of OVN objects and IP records left
    pub fn object_count(&self) -> usize {
        self.with(|s| {
            s.switches.len()
                + s.routers.len()
                + s.ports.len()
                + s.load_balancers.values().map(HashMap::len).sum::<usize>()
                + s.port_groups.len()
                + s.routes.len()
                + s.ip_records.len()
        })
    }
}

#[async_trait]
impl ResourceSnapshot for FakeCluster {
    async fn list_nodes(&self) -> Result<Vec<Node>> {
        Ok(self.with(|s| s.nodes.clone()))
    }

    async fn list_pods(&self) -> Result<Vec<Pod>> {
        Ok(self.with(|s| s.pods.clone()))
    }

    async fn list_subnets(&self) -> Result<Vec<Subnet>> {
        Ok(self.with(|s| s.subnets.clone()))
    }

    async fn list_vpcs(&self) -> Result<Vec<Vpc>> {
        Ok(self.with(|s| s.vpcs.clone()))
    }

    async fn list_services(&self) -> Result<Vec<Service>> {
        Ok(self.with(|s| s.services.clone()))
    }

    async fn list_network_policies(&self) -> Result<Vec<NetworkPolicy>> {
        Ok(self.with(|s| s.policies.clone()))
    }

    async fn list_ip_records(&self) -> Result<Vec<IpRecord>> {
        Ok(self.with(|s| s.ip_records.clone()))
    }
}

#[async_trait]
impl SdnClient for FakeCluster {
    async fn list_logical_switches(&self) -> Result<Vec<String>> {
        Ok(self.with(|s| s.switches.iter().cloned().collect()))
    }

    async fn list_logical_routers(&self) -> Result<Vec<String>> {
        Ok(self.with(|s| s.routers.iter().cloned().collect()))
    }

    async fn list_logical_switch_ports(&self) -> Result<Vec<String>> {
        Ok(self.with(|s| s.ports.iter().cloned().collect()))
    }

    async fn delete_logical_switch_port(&self, name: &str) -> Result<()> {
        self.with(|s| {
            s.check(name, "lsp-del")?;
            s.ports.remove(name);
            Ok(())
        })
    }

    async fn find_load_balancer(&self, name: &str) -> Result<Option<String>> {
        Ok(self.with(|s| s.load_balancers.contains_key(name).then(|| name.to_string())))
    }

    async fn get_load_balancer_vips(&self, id: &str) -> Result<HashMap<String, String>> {
        Ok(self.with(|s| s.load_balancers.get(id).cloned().unwrap_or_default()))
    }

    async fn delete_load_balancer_vip(&self, vip: &str, lb_name: &str) -> Result<()> {
        self.with(|s| {
            s.check(vip, "lb-del")?;
            if let Some(vips) = s.load_balancers.get_mut(lb_name) {
                vips.remove(vip);
            }
            Ok(())
        })
    }

    async fn list_port_groups(&self) -> Result<Vec<PortGroup>> {
        Ok(self.with(|s| s.port_groups.clone()))
    }

    async fn list_static_routes(&self, _router: &str) -> Result<Vec<StaticRoute>> {
        Ok(self.with(|s| s.routes.clone()))
    }

    async fn delete_static_route_by_next_hop(&self, _router: &str, next_hop: &str) -> Result<()> {
        self.with(|s| {
            s.check(next_hop, "lr-route-del")?;
            s.routes.retain(|r| r.next_hop != next_hop);
            Ok(())
        })
    }

    async fn delete_static_route(&self, _router: &str, cidr: &str) -> Result<()> {
        self.with(|s| {
            s.check(cidr, "lr-route-del")?;
            s.routes.retain(|r| r.cidr != cidr);
            Ok(())
        })
    }

    async fn delete_logical_switch(&self, name: &str) -> Result<()> {
        self.with(|s| {
            s.check(name, "ls-del")?;
            s.switches.remove(name);
            Ok(())
        })
    }

    async fn delete_logical_router(&self, name: &str) -> Result<()> {
        self.with(|s| {
            s.check(name, "lr-del")?;
            s.routers.remove(name);
            Ok(())
        })
    }

    async fn delete_port_group(&self, name: &str) -> Result<()> {
        self.with(|s| {
            s.check(name, "pg-del")?;
            s.port_groups.retain(|pg| pg.name != name);
            Ok(())
        })
    }
}

#[async_trait]
impl Teardown for FakeCluster {
    async fn delete_node(&self, name: &str) -> Result<()> {
        let key = PortKey::node(name).to_string();
        SdnClient::delete_logical_switch_port(self, &key).await?;
        self.delete_ip_record(&key).await
    }

    async fn delete_logical_switch(&self, name: &str) -> Result<()> {
        SdnClient::delete_logical_switch(self, name).await
    }

    async fn delete_logical_router(&self, name: &str) -> Result<()> {
        SdnClient::delete_logical_router(self, name).await
    }

    async fn delete_network_policy(&self, port_group: &PortGroup) -> Result<()> {
        self.delete_port_group(&port_group.name).await
    }
}

#[async_trait]
impl IpRecordStore for FakeCluster {
    async fn delete_ip_record(&self, name: &str) -> Result<()> {
        self.with(|s| {
            s.check(name, "delete ip")?;
            s.ip_records.retain(|r| r.name != name);
            Ok(())
        })
    }
}

impl AddressSpace for FakeCluster {
    fn contains_address(&self, address: &str) -> bool {
        self.with(|s| {
            s.ip_records
                .iter()
                .any(|r| r.addresses.iter().any(|a| a == address))
        })
    }
}
