//! Deletion of `ips.kubeovn.io` records

use async_trait::async_trait;
use kube::api::{Api, DeleteParams};
use kube::Client;
use ovngc_common::error::is_not_found;
use ovngc_common::Result;
use ovngc_engine::IpRecordStore;
use tracing::{debug, info};

use crate::crd::IP;

/// [`IpRecordStore`] backed by the `IP` custom resource
#[derive(Clone)]
pub struct KubeIpRecordStore {
    client: Client,
}

impl KubeIpRecordStore {
    /// Create a store
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl IpRecordStore for KubeIpRecordStore {
    async fn delete_ip_record(&self, name: &str) -> Result<()> {
        let api: Api<IP> = Api::all(self.client.clone());
        let result = api.delete(name, &DeleteParams::default()).await.map(|_| ());
        if tolerate_not_found(result)? {
            info!(ip = %name, "deleted ip record");
        } else {
            debug!(ip = %name, "ip record already gone");
        }
        Ok(())
    }
}

/// `Ok(true)` when deleted, `Ok(false)` when it was already absent
fn tolerate_not_found(result: std::result::Result<(), kube::Error>) -> Result<bool> {
    match result {
        Ok(()) => Ok(true),
        Err(e) if is_not_found(&e) => Ok(false),
        Err(e) => Err(e.into()),
    }
}
