//! Logical switch collection: one switch per subnet

use std::collections::HashSet;

use ovngc_common::{Result, EXTERNAL_GATEWAY_SWITCH, INTERCONNECTION_SWITCH};
use tracing::{debug, error, info};

use crate::context::GcContext;

/// Delete logical switches whose subnet no longer exists.
///
/// The interconnection and external gateway switches are not backed by a
/// subnet and are always kept.
pub async fn gc_logical_switches(ctx: &GcContext) -> Result<usize> {
    info!("start to gc logical switch");

    let subnets = ctx.snapshot.list_subnets().await.inspect_err(|e| {
        error!(error = %e, "failed to list subnets");
    })?;
    let live: HashSet<String> = subnets.into_iter().map(|s| s.name).collect();

    let switches = ctx.sdn.list_logical_switches().await.inspect_err(|e| {
        error!(error = %e, "failed to list logical switches");
    })?;
    debug!(switches = ?switches, subnets = ?live, "comparing logical switches to subnets");

    let mut deleted = 0;
    for ls in switches {
        if ls == INTERCONNECTION_SWITCH || ls == EXTERNAL_GATEWAY_SWITCH || live.contains(&ls) {
            continue;
        }
        info!(switch = %ls, "gc subnet");
        ctx.teardown
            .delete_logical_switch(&ls)
            .await
            .inspect_err(|e| {
                error!(switch = %ls, error = %e, "failed to gc subnet");
            })?;
        deleted += 1;
    }
    Ok(deleted)
}
