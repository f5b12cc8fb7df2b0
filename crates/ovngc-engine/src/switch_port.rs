//! Logical switch port collection with confirm-before-delete
//!
//! The pod and node listings come from caches that can lag the cluster: a
//! port created for a pod the cache has not seen yet looks exactly like a
//! port whose pod is gone. Deleting on first sight would race live pods, so a
//! port must be seen orphaned by two consecutive comparisons before it is
//! deleted.
//!
//! Each comparison moves every orphaned port one step along
//! `unmarked -> candidate -> deleted`. A port that reappears in the desired
//! set falls back to `unmarked`. The candidate set produced by a comparison
//! replaces the previous one, so candidates older than one comparison are
//! forgotten.
//!
//! A pass runs two comparisons separated by [`GcConfig::confirm_delay`];
//! the second comparison's candidates carry over to the next pass.
//!
//! [`GcConfig::confirm_delay`]: crate::context::GcConfig::confirm_delay

use std::collections::HashSet;

use ovngc_common::keys::PortKey;
use ovngc_common::model::{Node, Pod};
use ovngc_common::Result;
use tokio::sync::Mutex;
use tracing::{debug, error, info};

use crate::context::GcContext;

/// What one comparison does with a port
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PortVerdict {
    /// Port has a live owner
    Keep,
    /// First sighting as an orphan
    Mark,
    /// Orphaned on two consecutive comparisons
    Delete,
}

/// Transition for one port given desired-set membership and whether the
/// previous comparison marked it.
pub fn verdict(present: bool, was_candidate: bool) -> PortVerdict {
    match (present, was_candidate) {
        (true, _) => PortVerdict::Keep,
        (false, false) => PortVerdict::Mark,
        (false, true) => PortVerdict::Delete,
    }
}

/// Names of all ports that should exist: one per alive, allocated pod and
/// one per node.
pub fn desired_ports(pods: &[Pod], nodes: &[Node]) -> HashSet<String> {
    pods.iter()
        .filter(|p| p.alive && p.allocated)
        .map(|p| p.port_key().to_string())
        .chain(nodes.iter().map(|n| PortKey::node(&n.name).to_string()))
        .collect()
}

/// Switch port collector owning the confirm-delete state
#[derive(Debug, Default)]
pub struct SwitchPortGc {
    candidates: Mutex<HashSet<String>>,
}

impl SwitchPortGc {
    /// Create a collector with no candidates
    pub fn new() -> Self {
        Self::default()
    }

    /// Ports marked by the most recent successful comparison
    pub async fn candidates(&self) -> HashSet<String> {
        self.candidates.lock().await.clone()
    }

    /// Run both comparisons of a pass. Returns the number of ports deleted.
    pub async fn run(&self, ctx: &GcContext) -> Result<usize> {
        info!("start to gc logical switch port");
        let mut deleted = self.mark_and_clean(ctx).await?;
        tokio::time::sleep(ctx.config.confirm_delay).await;
        deleted += self.mark_and_clean(ctx).await?;
        Ok(deleted)
    }

    /// One comparison: delete confirmed orphans, mark new ones.
    ///
    /// The candidate set is only replaced when the comparison completes; a
    /// failure leaves the previous candidates in place.
    pub async fn mark_and_clean(&self, ctx: &GcContext) -> Result<usize> {
        // Held for the whole comparison so the replace below is not
        // interleaved with another reader.
        let mut candidates = self.candidates.lock().await;

        let pods = ctx.snapshot.list_pods().await.inspect_err(|e| {
            error!(error = %e, "failed to list pods");
        })?;
        let nodes = ctx.snapshot.list_nodes().await.inspect_err(|e| {
            error!(error = %e, "failed to list nodes");
        })?;
        let desired = desired_ports(&pods, &nodes);

        let ports = ctx.sdn.list_logical_switch_ports().await.inspect_err(|e| {
            error!(error = %e, "failed to list logical switch ports");
        })?;

        let mut marked = HashSet::new();
        let mut deleted = 0;
        for lsp in ports {
            match verdict(desired.contains(&lsp), candidates.contains(&lsp)) {
                PortVerdict::Keep => {}
                PortVerdict::Mark => {
                    debug!(port = %lsp, "logical switch port has no owner, marking");
                    marked.insert(lsp);
                }
                PortVerdict::Delete => {
                    info!(port = %lsp, "gc logical switch port");
                    ctx.sdn
                        .delete_logical_switch_port(&lsp)
                        .await
                        .inspect_err(|e| {
                            error!(port = %lsp, error = %e, "failed to delete lsp");
                        })?;
                    ctx.ip_records
                        .delete_ip_record(&lsp)
                        .await
                        .inspect_err(|e| {
                            error!(ip = %lsp, error = %e, "failed to delete ip");
                        })?;
                    deleted += 1;
                }
            }
        }

        *candidates = marked;
        Ok(deleted)
    }
}
