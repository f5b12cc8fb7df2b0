//! kube-ovn custom resources read by the collector
//!
//! Only the fields garbage collection needs are modelled; unknown fields are
//! ignored on deserialization.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Subnet backed by a logical switch of the same name
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(group = "kubeovn.io", version = "v1", kind = "Subnet", plural = "subnets")]
#[serde(rename_all = "camelCase")]
pub struct SubnetSpec {
    /// Owning VPC
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vpc: Option<String>,
    /// Address range(s), comma separated for dual stack
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cidr_block: Option<String>,
}

/// VPC backed by a logical router of the same name
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(group = "kubeovn.io", version = "v1", kind = "Vpc", plural = "vpcs")]
#[serde(rename_all = "camelCase")]
pub struct VpcSpec {
    /// Namespaces bound to this VPC
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub namespaces: Vec<String>,
}

/// IP allocation record, named `<pod>.<namespace>` or `node-<node>`
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(group = "kubeovn.io", version = "v1", kind = "IP", plural = "ips")]
#[serde(rename_all = "camelCase")]
pub struct IPSpec {
    /// Pod name, empty for node records
    #[serde(default)]
    pub pod_name: String,
    /// Pod namespace, empty for node records
    #[serde(default)]
    pub namespace: String,
    /// Node the address lives on
    #[serde(default)]
    pub node_name: String,
    /// Allocated address; dual stack records hold `v4,v6`
    #[serde(default)]
    pub ip_address: String,
}
