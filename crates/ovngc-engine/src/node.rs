//! Node collection
//!
//! Node IP records (`node-<node>`) outlive their node when a node is removed
//! while the controller is down. Any such record triggers a full node
//! teardown.

use std::collections::HashSet;

use ovngc_common::Result;
use tracing::{error, info};

use crate::context::GcContext;

/// Tear down every node that still has an IP record but no Node object.
///
/// Returns the number of nodes torn down.
pub async fn gc_nodes(ctx: &GcContext) -> Result<usize> {
    info!("start to gc nodes");

    let nodes = ctx.snapshot.list_nodes().await.inspect_err(|e| {
        error!(error = %e, "failed to list nodes");
    })?;
    let live: HashSet<String> = nodes.into_iter().map(|n| n.name).collect();

    let records = ctx.snapshot.list_ip_records().await.inspect_err(|e| {
        error!(error = %e, "failed to list ip records");
    })?;

    let mut deleted = 0;
    for node in records.iter().filter_map(|r| r.node_name()) {
        if live.contains(&node) {
            continue;
        }
        info!(node = %node, "gc node");
        ctx.teardown.delete_node(&node).await.inspect_err(|e| {
            error!(node = %node, error = %e, "failed to gc node");
        })?;
        deleted += 1;
    }
    Ok(deleted)
}
