//! Cascading deletes invoked for orphaned cluster objects
//!
//! The reconcilers decide *what* is orphaned; this module knows which OVN
//! rows and IP records hang off each object.

use std::sync::Arc;

use async_trait::async_trait;
use ovngc_common::keys::PortKey;
use ovngc_common::model::PortGroup;
use ovngc_common::Result;
use ovngc_engine::{IpRecordStore, ResourceSnapshot, SdnClient, Teardown};
use tracing::info;

/// [`Teardown`] over the OVN client and the IP record store
pub struct ClusterTeardown {
    sdn: Arc<dyn SdnClient>,
    ip_records: Arc<dyn IpRecordStore>,
    snapshot: Arc<dyn ResourceSnapshot>,
    cluster_router: String,
}

impl ClusterTeardown {
    /// Create a teardown that removes node routes from `cluster_router`
    pub fn new(
        sdn: Arc<dyn SdnClient>,
        ip_records: Arc<dyn IpRecordStore>,
        snapshot: Arc<dyn ResourceSnapshot>,
        cluster_router: impl Into<String>,
    ) -> Self {
        Self {
            sdn,
            ip_records,
            snapshot,
            cluster_router: cluster_router.into(),
        }
    }
}

#[async_trait]
impl Teardown for ClusterTeardown {
    /// Removes the node's routes, its join port and its IP record.
    ///
    /// Routes go first: they are found through the addresses on the IP
    /// record, which is gone afterwards.
    async fn delete_node(&self, name: &str) -> Result<()> {
        let port = PortKey::node(name).to_string();
        let addresses = self
            .snapshot
            .list_ip_records()
            .await?
            .into_iter()
            .find(|r| r.name == port)
            .map(|r| r.addresses)
            .unwrap_or_default();

        for address in &addresses {
            self.sdn
                .delete_static_route_by_next_hop(&self.cluster_router, address)
                .await?;
        }
        self.sdn.delete_logical_switch_port(&port).await?;
        self.ip_records.delete_ip_record(&port).await?;
        info!(node = %name, routes_via = ?addresses, "tore down node");
        Ok(())
    }

    async fn delete_logical_switch(&self, name: &str) -> Result<()> {
        self.sdn.delete_logical_switch(name).await
    }

    async fn delete_logical_router(&self, name: &str) -> Result<()> {
        self.sdn.delete_logical_router(name).await
    }

    async fn delete_network_policy(&self, port_group: &PortGroup) -> Result<()> {
        self.sdn.delete_port_group(&port_group.name).await
    }
}
