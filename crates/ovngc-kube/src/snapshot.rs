//! Resource snapshots listed from the Kubernetes API
//!
//! Each listing is a full `Api::list` against the API server; the
//! conversions below project the returned objects onto the collector's
//! model and drop objects missing the fields that identify them.

use async_trait::async_trait;
use k8s_openapi::api::core::v1::{Node as K8sNode, Pod as K8sPod, Service as K8sService};
use k8s_openapi::api::networking::v1::NetworkPolicy as K8sNetworkPolicy;
use kube::api::{Api, ListParams};
use kube::{Client, ResourceExt};
use ovngc_common::model::{
    IpRecord, NetworkPolicy, Node, Pod, Protocol, Service, ServicePort, SessionAffinity, Subnet,
    Vpc,
};
use ovngc_common::{Result, ALLOCATED_ANNOTATION};
use ovngc_engine::ResourceSnapshot;
use tracing::{debug, warn};

use crate::crd::{Subnet as SubnetCrd, Vpc as VpcCrd, IP};

/// Whether a pod still holds its network identity.
///
/// Terminating pods are dead. Pods in a terminal phase are dead unless
/// their restart policy would bring them back: `Never` covers both terminal
/// phases, `OnFailure` only `Succeeded`.
pub fn is_pod_alive(pod: &K8sPod) -> bool {
    if pod.metadata.deletion_timestamp.is_some() {
        return false;
    }
    let phase = pod.status.as_ref().and_then(|s| s.phase.as_deref());
    let restart_policy = pod.spec.as_ref().and_then(|s| s.restart_policy.as_deref());
    !matches!(
        (phase, restart_policy),
        (Some("Succeeded") | Some("Failed"), Some("Never"))
            | (Some("Succeeded"), Some("OnFailure"))
    )
}

/// Project a pod; `None` when it has no name or namespace
pub fn pod_from_k8s(pod: &K8sPod) -> Option<Pod> {
    let name = pod.metadata.name.clone()?;
    let namespace = pod.metadata.namespace.clone()?;
    let allocated = pod
        .annotations()
        .get(ALLOCATED_ANNOTATION)
        .is_some_and(|v| v == "true");
    Some(Pod {
        name,
        namespace,
        alive: is_pod_alive(pod),
        allocated,
    })
}

/// Project a service.
///
/// Ports default to TCP when no protocol is declared. A port with an
/// unknown protocol is skipped.
pub fn service_from_k8s(svc: &K8sService) -> Option<Service> {
    let spec = svc.spec.as_ref()?;
    let session_affinity = match spec.session_affinity.as_deref() {
        Some("ClientIP") => SessionAffinity::ClientIp,
        _ => SessionAffinity::None,
    };
    let ports = spec
        .ports
        .iter()
        .flatten()
        .filter_map(|p| {
            let protocol = match p.protocol.as_deref() {
                None => Protocol::Tcp,
                Some(raw) => match raw.parse::<Protocol>() {
                    Ok(protocol) => protocol,
                    Err(e) => {
                        warn!(service = %svc.name_any(), error = %e, "skipping service port");
                        return None;
                    }
                },
            };
            Some(ServicePort {
                protocol,
                port: p.port,
            })
        })
        .collect();
    Some(Service {
        cluster_ip: spec.cluster_ip.clone().unwrap_or_default(),
        ports,
        session_affinity,
    })
}

/// Project an IP record; dual stack addresses are split
pub fn ip_record_from_crd(ip: &IP) -> IpRecord {
    IpRecord {
        name: ip.name_any(),
        addresses: split_addresses(&ip.spec.ip_address),
    }
}

fn split_addresses(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .map(str::to_string)
        .collect()
}

/// [`ResourceSnapshot`] backed by the Kubernetes API
#[derive(Clone)]
pub struct KubeSnapshot {
    client: Client,
}

impl KubeSnapshot {
    /// Create a snapshot provider
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ResourceSnapshot for KubeSnapshot {
    async fn list_nodes(&self) -> Result<Vec<Node>> {
        let api: Api<K8sNode> = Api::all(self.client.clone());
        let list = api.list(&ListParams::default()).await?;
        Ok(list.items.iter().map(|n| Node::new(n.name_any())).collect())
    }

    async fn list_pods(&self) -> Result<Vec<Pod>> {
        let api: Api<K8sPod> = Api::all(self.client.clone());
        let list = api.list(&ListParams::default()).await?;
        let pods: Vec<Pod> = list.items.iter().filter_map(pod_from_k8s).collect();
        debug!(count = pods.len(), "listed pods");
        Ok(pods)
    }

    async fn list_subnets(&self) -> Result<Vec<Subnet>> {
        let api: Api<SubnetCrd> = Api::all(self.client.clone());
        let list = api.list(&ListParams::default()).await?;
        Ok(list
            .items
            .iter()
            .map(|s| Subnet { name: s.name_any() })
            .collect())
    }

    async fn list_vpcs(&self) -> Result<Vec<Vpc>> {
        let api: Api<VpcCrd> = Api::all(self.client.clone());
        let list = api.list(&ListParams::default()).await?;
        Ok(list.items.iter().map(|v| Vpc { name: v.name_any() }).collect())
    }

    async fn list_services(&self) -> Result<Vec<Service>> {
        let api: Api<K8sService> = Api::all(self.client.clone());
        let list = api.list(&ListParams::default()).await?;
        Ok(list.items.iter().filter_map(service_from_k8s).collect())
    }

    async fn list_network_policies(&self) -> Result<Vec<NetworkPolicy>> {
        let api: Api<K8sNetworkPolicy> = Api::all(self.client.clone());
        let list = api.list(&ListParams::default()).await?;
        Ok(list
            .items
            .iter()
            .filter_map(|np| {
                Some(NetworkPolicy {
                    namespace: np.metadata.namespace.clone()?,
                    name: np.metadata.name.clone()?,
                })
            })
            .collect())
    }

    async fn list_ip_records(&self) -> Result<Vec<IpRecord>> {
        let api: Api<IP> = Api::all(self.client.clone());
        let list = api.list(&ListParams::default()).await?;
        Ok(list.items.iter().map(ip_record_from_crd).collect())
    }
}
