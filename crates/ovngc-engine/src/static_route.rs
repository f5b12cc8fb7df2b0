//! Static route collection on the cluster router
//!
//! Unlike the other reconcilers this one is best effort: a failed delete is
//! logged and the scan moves on to the next route.

use std::collections::HashSet;

use ovngc_common::model::StaticRoute;
use ovngc_common::Result;
use tracing::{error, info};

use crate::client::AddressSpace;
use crate::context::GcContext;

/// How a route should be removed, if at all
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RouteAction {
    /// Route is still backed by an allocated address, or is a subnet route
    Keep,
    /// Remove every route using this next hop
    DeleteByNextHop(String),
    /// Remove the route for this prefix
    DeleteByPrefix(String),
}

/// Decide what to do with one route.
///
/// Destination routes live as long as their next hop is allocated. Reroute
/// routes with a CIDR prefix are subnet routes and are never collected; a
/// reroute route for a single host lives as long as that host's address is
/// allocated.
pub fn classify(route: &StaticRoute, space: &dyn AddressSpace) -> RouteAction {
    if route.policy.routes_by_destination() {
        if space.contains_address(&route.next_hop) {
            RouteAction::Keep
        } else {
            RouteAction::DeleteByNextHop(route.next_hop.clone())
        }
    } else if route.is_cidr() || space.contains_address(&route.cidr) {
        RouteAction::Keep
    } else {
        RouteAction::DeleteByPrefix(route.cidr.clone())
    }
}

/// Delete static routes that point at, or route for, addresses no longer
/// allocated. Only a listing failure is returned as an error.
///
/// Each dead next hop is cleared with one call, which removes every route
/// through it; the count is of routes removed.
pub async fn gc_static_routes(ctx: &GcContext) -> Result<usize> {
    info!("start to gc static routes");
    let router = &ctx.config.cluster_router;

    let routes = ctx
        .sdn
        .list_static_routes(router)
        .await
        .inspect_err(|e| {
            error!(router = %router, error = %e, "failed to list static route");
        })?;

    let mut deleted = 0;
    let mut handled_next_hops: HashSet<&str> = HashSet::new();
    for route in &routes {
        if handled_next_hops.contains(route.next_hop.as_str()) {
            continue;
        }
        match classify(route, ctx.address_space.as_ref()) {
            RouteAction::Keep => {}
            RouteAction::DeleteByNextHop(next_hop) => {
                info!(policy = %route.policy, cidr = %route.cidr, next_hop = %route.next_hop, "gc static route");
                handled_next_hops.insert(route.next_hop.as_str());
                let result = ctx
                    .sdn
                    .delete_static_route_by_next_hop(router, &next_hop)
                    .await
                    .inspect_err(|e| {
                        error!(next_hop = %next_hop, error = %e, "failed to delete stale nexthop route");
                    });
                if result.is_ok() {
                    deleted += routes.iter().filter(|r| r.next_hop == next_hop).count();
                }
            }
            RouteAction::DeleteByPrefix(cidr) => {
                info!(policy = %route.policy, cidr = %route.cidr, next_hop = %route.next_hop, "gc static route");
                let result = ctx
                    .sdn
                    .delete_static_route(router, &cidr)
                    .await
                    .inspect_err(|e| {
                        error!(cidr = %cidr, error = %e, "failed to delete stale route");
                    });
                if result.is_ok() {
                    deleted += 1;
                }
            }
        }
    }
    Ok(deleted)
}
