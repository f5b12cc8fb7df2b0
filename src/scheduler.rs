//! Periodic garbage collection
//!
//! Every tick refreshes the allocated address set from the IP records and
//! then runs one pass. The first tick fires immediately.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use ovngc_common::{Error, Result};
use ovngc_engine::{GarbageCollector, GcSummary, ResourceSnapshot};
use ovngc_kube::Ipam;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

#[cfg(test)]
use mockall::automock;

/// Default time between passes
pub const DEFAULT_GC_INTERVAL: Duration = Duration::from_secs(360);

/// One garbage collection pass
#[cfg_attr(test, automock)]
#[async_trait]
pub trait GcPass: Send + Sync {
    /// Run a pass and report what it removed
    async fn run_gc(&self) -> Result<GcSummary>;
}

#[async_trait]
impl GcPass for GarbageCollector {
    async fn run_gc(&self) -> Result<GcSummary> {
        GarbageCollector::run_gc(self).await
    }
}

/// Drives passes on a fixed interval
pub struct Scheduler {
    gc: Arc<dyn GcPass>,
    snapshot: Arc<dyn ResourceSnapshot>,
    ipam: Arc<Ipam>,
    interval: Duration,
}

impl Scheduler {
    /// Create a scheduler. The interval must be non-zero.
    pub fn new(
        gc: Arc<dyn GcPass>,
        snapshot: Arc<dyn ResourceSnapshot>,
        ipam: Arc<Ipam>,
        interval: Duration,
    ) -> Result<Self> {
        if interval.is_zero() {
            return Err(Error::Config("gc interval must be greater than zero".to_string()));
        }
        Ok(Self {
            gc,
            snapshot,
            ipam,
            interval,
        })
    }

    /// Refresh the address space and run a single pass
    pub async fn run_once(&self) -> Result<GcSummary> {
        let records = self.snapshot.list_ip_records().await?;
        self.ipam.sync(&records);
        self.gc.run_gc().await
    }

    /// Run passes until `shutdown` resolves.
    ///
    /// A pass in flight when shutdown is requested runs to completion.
    pub async fn run<F>(&self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(interval = ?self.interval, "starting gc scheduler");

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("gc scheduler stopped");
                    return;
                }
                _ = ticker.tick() => self.tick().await,
            }
        }
    }

    async fn tick(&self) {
        match self.run_once().await {
            Ok(summary) if summary.total() > 0 => info!(%summary, "gc removed orphaned objects"),
            Ok(_) => debug!("gc found nothing to remove"),
            Err(Error::GcInProgress) => warn!("skipping gc tick, previous pass still running"),
            Err(e) => error!(error = %e, "gc pass failed"),
        }
    }
}
