//! Load balancer VIP collection
//!
//! Service VIPs are spread over four cluster load balancers by protocol and
//! session affinity. Each load balancer is compared only against the VIPs
//! that belong in it.

use std::collections::HashSet;

use ovngc_common::keys::VipKey;
use ovngc_common::model::{Protocol, Service, SessionAffinity};
use ovngc_common::{Error, Result};
use tracing::{error, info, warn};

use crate::context::GcContext;

/// Desired VIPs per load balancer
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VipBuckets {
    /// Plain TCP
    pub tcp: HashSet<String>,
    /// Plain UDP
    pub udp: HashSet<String>,
    /// Client-IP sticky TCP
    pub tcp_session: HashSet<String>,
    /// Client-IP sticky UDP
    pub udp_session: HashSet<String>,
}

impl VipBuckets {
    /// Sort every declared service port into its bucket. Non-TCP ports go to
    /// the UDP load balancers. Headless services have no VIP.
    pub fn from_services(services: &[Service]) -> Self {
        let mut buckets = Self::default();
        for svc in services {
            if svc.cluster_ip.is_empty() || svc.cluster_ip == "None" {
                continue;
            }
            let sticky = svc.session_affinity == SessionAffinity::ClientIp;
            for port in &svc.ports {
                let key = VipKey::new(&svc.cluster_ip, port.port).to_string();
                let bucket = match (port.protocol == Protocol::Tcp, sticky) {
                    (true, false) => &mut buckets.tcp,
                    (true, true) => &mut buckets.tcp_session,
                    (false, false) => &mut buckets.udp,
                    (false, true) => &mut buckets.udp_session,
                };
                bucket.insert(key);
            }
        }
        buckets
    }
}

/// Remove VIPs of deleted services from all four cluster load balancers.
///
/// Any lookup or delete failure aborts the reconciler.
pub async fn gc_load_balancers(ctx: &GcContext) -> Result<usize> {
    info!("start to gc loadbalancers");

    let services = ctx.snapshot.list_services().await.inspect_err(|e| {
        error!(error = %e, "failed to list services");
    })?;
    let buckets = VipBuckets::from_services(&services);
    let names = &ctx.config.load_balancers;

    let mut deleted = 0;
    deleted += gc_load_balancer(ctx, &names.tcp, &buckets.tcp).await?;
    deleted += gc_load_balancer(ctx, &names.tcp_session, &buckets.tcp_session).await?;
    deleted += gc_load_balancer(ctx, &names.udp, &buckets.udp).await?;
    deleted += gc_load_balancer(ctx, &names.udp_session, &buckets.udp_session).await?;
    Ok(deleted)
}

async fn gc_load_balancer(ctx: &GcContext, lb: &str, desired: &HashSet<String>) -> Result<usize> {
    let id = match ctx.sdn.find_load_balancer(lb).await {
        Ok(Some(id)) => id,
        Ok(None) => {
            warn!(lb = %lb, "load balancer not found, skipping");
            return Ok(0);
        }
        Err(e) => {
            error!(lb = %lb, error = %e, "failed to get lb");
            return Err(Error::lb_lookup(lb, e.to_string()));
        }
    };

    let vips = ctx.sdn.get_load_balancer_vips(&id).await.inspect_err(|e| {
        error!(lb = %lb, error = %e, "failed to get lb vips");
    })?;

    let mut deleted = 0;
    for vip in vips.keys() {
        if desired.contains(vip) {
            continue;
        }
        info!(lb = %lb, vip = %vip, "gc load balancer vip");
        ctx.sdn
            .delete_load_balancer_vip(vip, lb)
            .await
            .inspect_err(|e| {
                error!(lb = %lb, vip = %vip, error = %e, "failed to delete vip");
            })?;
        deleted += 1;
    }
    Ok(deleted)
}
