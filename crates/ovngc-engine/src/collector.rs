//! Garbage collection pass orchestration
//!
//! A pass runs every reconciler in a fixed order and stops at the first
//! error. Nothing is rolled back: objects removed before the failure stay
//! removed and the next pass starts over from the beginning.

use std::fmt;

use ovngc_common::{Error, Result};
use tokio::sync::Mutex;
use tracing::{info, instrument};

use crate::context::GcContext;
use crate::load_balancer::gc_load_balancers;
use crate::logical_router::gc_logical_routers;
use crate::logical_switch::gc_logical_switches;
use crate::node::gc_nodes;
use crate::port_group::gc_port_groups;
use crate::static_route::gc_static_routes;
use crate::switch_port::SwitchPortGc;

/// Objects removed by one pass, per reconciler
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GcSummary {
    /// Nodes torn down
    pub nodes: usize,
    /// Logical switches deleted
    pub logical_switches: usize,
    /// Logical routers deleted
    pub logical_routers: usize,
    /// Logical switch ports deleted
    pub switch_ports: usize,
    /// Load balancer VIPs deleted
    pub vips: usize,
    /// Port groups torn down
    pub port_groups: usize,
    /// Static routes deleted
    pub static_routes: usize,
}

impl GcSummary {
    /// Total number of objects removed
    pub fn total(&self) -> usize {
        self.nodes
            + self.logical_switches
            + self.logical_routers
            + self.switch_ports
            + self.vips
            + self.port_groups
            + self.static_routes
    }
}

impl fmt::Display for GcSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "nodes={} switches={} routers={} ports={} vips={} port_groups={} routes={}",
            self.nodes,
            self.logical_switches,
            self.logical_routers,
            self.switch_ports,
            self.vips,
            self.port_groups,
            self.static_routes
        )
    }
}

/// Entry point for garbage collection
pub struct GarbageCollector {
    ctx: GcContext,
    switch_ports: SwitchPortGc,
    pass: Mutex<()>,
}

impl GarbageCollector {
    /// Create a collector with empty confirm-delete state
    pub fn new(ctx: GcContext) -> Self {
        Self {
            ctx,
            switch_ports: SwitchPortGc::new(),
            pass: Mutex::new(()),
        }
    }

    /// Switch port collector, exposing the carried-over candidates
    pub fn switch_ports(&self) -> &SwitchPortGc {
        &self.switch_ports
    }

    /// Run one full pass.
    ///
    /// Reconcilers run as: nodes, logical switches, logical routers, switch
    /// ports, load balancers, port groups, static routes. The first error
    /// ends the pass. Fails with [`Error::GcInProgress`] if another pass
    /// is still running.
    #[instrument(skip(self))]
    pub async fn run_gc(&self) -> Result<GcSummary> {
        let _pass = self.pass.try_lock().map_err(|_| Error::GcInProgress)?;
        let ctx = &self.ctx;

        let summary = GcSummary {
            nodes: gc_nodes(ctx).await?,
            logical_switches: gc_logical_switches(ctx).await?,
            logical_routers: gc_logical_routers(ctx).await?,
            switch_ports: self.switch_ports.run(ctx).await?,
            vips: gc_load_balancers(ctx).await?,
            port_groups: gc_port_groups(ctx).await?,
            static_routes: gc_static_routes(ctx).await?,
        };

        info!(%summary, total = summary.total(), "gc pass complete");
        Ok(summary)
    }
}
