//! Logical router collection: one router per VPC

use std::collections::HashSet;

use ovngc_common::{Result, DEFAULT_VPC};
use tracing::{debug, error, info};

use crate::context::GcContext;

/// Delete logical routers whose VPC no longer exists. The default VPC
/// router is always kept.
pub async fn gc_logical_routers(ctx: &GcContext) -> Result<usize> {
    info!("start to gc logical router");

    let vpcs = ctx.snapshot.list_vpcs().await.inspect_err(|e| {
        error!(error = %e, "failed to list vpcs");
    })?;
    let live: HashSet<String> = vpcs.into_iter().map(|v| v.name).collect();

    let routers = ctx.sdn.list_logical_routers().await.inspect_err(|e| {
        error!(error = %e, "failed to list logical routers");
    })?;
    debug!(routers = ?routers, vpcs = ?live, "comparing logical routers to vpcs");

    let mut deleted = 0;
    for lr in routers {
        if lr == DEFAULT_VPC || live.contains(&lr) {
            continue;
        }
        info!(router = %lr, "gc router");
        ctx.teardown
            .delete_logical_router(&lr)
            .await
            .inspect_err(|e| {
                error!(router = %lr, error = %e, "failed to delete router");
            })?;
        deleted += 1;
    }
    Ok(deleted)
}
