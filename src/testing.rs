//! Mocks of the engine's collaborator traits for tests in this crate

use std::collections::HashMap;

use mockall::mock;
use ovngc_common::model::{
    IpRecord, NetworkPolicy, Node, Pod, PortGroup, Service, StaticRoute, Subnet, Vpc,
};
use ovngc_common::Result;
use ovngc_engine::{IpRecordStore, ResourceSnapshot, SdnClient};

mock! {
    pub Snapshot {}

    #[async_trait::async_trait]
    impl ResourceSnapshot for Snapshot {
        async fn list_nodes(&self) -> Result<Vec<Node>>;
        async fn list_pods(&self) -> Result<Vec<Pod>>;
        async fn list_subnets(&self) -> Result<Vec<Subnet>>;
        async fn list_vpcs(&self) -> Result<Vec<Vpc>>;
        async fn list_services(&self) -> Result<Vec<Service>>;
        async fn list_network_policies(&self) -> Result<Vec<NetworkPolicy>>;
        async fn list_ip_records(&self) -> Result<Vec<IpRecord>>;
    }
}

mock! {
    pub Sdn {}

    #[async_trait::async_trait]
    impl SdnClient for Sdn {
        async fn list_logical_switches(&self) -> Result<Vec<String>>;
        async fn list_logical_routers(&self) -> Result<Vec<String>>;
        async fn list_logical_switch_ports(&self) -> Result<Vec<String>>;
        async fn delete_logical_switch_port(&self, name: &str) -> Result<()>;
        async fn find_load_balancer(&self, name: &str) -> Result<Option<String>>;
        async fn get_load_balancer_vips(&self, id: &str) -> Result<HashMap<String, String>>;
        async fn delete_load_balancer_vip(&self, vip: &str, lb_name: &str) -> Result<()>;
        async fn list_port_groups(&self) -> Result<Vec<PortGroup>>;
        async fn list_static_routes(&self, router: &str) -> Result<Vec<StaticRoute>>;
        async fn delete_static_route_by_next_hop(&self, router: &str, next_hop: &str) -> Result<()>;
        async fn delete_static_route(&self, router: &str, cidr: &str) -> Result<()>;
        async fn delete_logical_switch(&self, name: &str) -> Result<()>;
        async fn delete_logical_router(&self, name: &str) -> Result<()>;
        async fn delete_port_group(&self, name: &str) -> Result<()>;
    }
}

mock! {
    pub IpRecords {}

    #[async_trait::async_trait]
    impl IpRecordStore for IpRecords {
        async fn delete_ip_record(&self, name: &str) -> Result<()>;
    }
}

pub fn ip_record(name: &str, addresses: &[&str]) -> IpRecord {
    IpRecord {
        name: name.to_string(),
        addresses: addresses.iter().map(|a| a.to_string()).collect(),
    }
}
