//! ovngc - removes OVN logical objects left behind by deleted cluster resources

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::info;

use ovngc::{init_tracing, ClusterTeardown, LogFormat, Scheduler};
use ovngc_common::{
    DEFAULT_TCP_LB, DEFAULT_TCP_SESSION_LB, DEFAULT_UDP_LB, DEFAULT_UDP_SESSION_LB, DEFAULT_VPC,
};
use ovngc_engine::{
    AddressSpace, GarbageCollector, GcConfig, GcContext, IpRecordStore, LoadBalancerNames,
    ResourceSnapshot, SdnClient,
};
use ovngc_kube::{create_client, Ipam, KubeIpRecordStore, KubeSnapshot};
use ovngc_nbctl::{NbctlConfig, OvnNbClient};

/// Garbage collector for OVN logical switches, routers, ports, load balancer
/// VIPs, port groups and static routes
#[derive(Parser, Debug)]
#[command(name = "ovngc", version, about, long_about = None)]
struct Cli {
    /// Seconds between garbage collection passes
    #[arg(long, env = "OVNGC_GC_INTERVAL", default_value_t = 360)]
    gc_interval: u64,

    /// Seconds between the two switch port comparisons of a pass
    #[arg(long, env = "OVNGC_CONFIRM_DELAY", default_value_t = 3)]
    confirm_delay: u64,

    /// Run a single pass and exit
    #[arg(long)]
    once: bool,

    /// Name of the TCP cluster load balancer
    #[arg(long, env = "OVNGC_TCP_LB", default_value = DEFAULT_TCP_LB)]
    cluster_tcp_loadbalancer: String,

    /// Name of the UDP cluster load balancer
    #[arg(long, env = "OVNGC_UDP_LB", default_value = DEFAULT_UDP_LB)]
    cluster_udp_loadbalancer: String,

    /// Name of the client-IP sticky TCP cluster load balancer
    #[arg(long, env = "OVNGC_TCP_SESSION_LB", default_value = DEFAULT_TCP_SESSION_LB)]
    cluster_tcp_session_loadbalancer: String,

    /// Name of the client-IP sticky UDP cluster load balancer
    #[arg(long, env = "OVNGC_UDP_SESSION_LB", default_value = DEFAULT_UDP_SESSION_LB)]
    cluster_udp_session_loadbalancer: String,

    /// Router holding the cluster's static routes
    #[arg(long, env = "OVNGC_CLUSTER_ROUTER", default_value = DEFAULT_VPC)]
    cluster_router: String,

    /// Path to the ovn-nbctl binary
    #[arg(long, env = "OVNGC_NBCTL", default_value = "ovn-nbctl")]
    nbctl: PathBuf,

    /// Northbound database address, e.g. tcp:10.96.0.20:6641
    #[arg(long, env = "OVNGC_OVN_NB_ADDR")]
    ovn_nb_addr: Option<String>,

    /// Seconds before an ovn-nbctl invocation is abandoned
    #[arg(long, env = "OVNGC_NBCTL_TIMEOUT", default_value_t = 30)]
    nbctl_timeout: u64,

    /// Path to a kubeconfig; in-cluster config is used when unset
    #[arg(long, env = "OVNGC_KUBECONFIG")]
    kubeconfig: Option<PathBuf>,

    /// Log output format
    #[arg(long, env = "OVNGC_LOG_FORMAT", value_enum, default_value_t = LogFormat::Plain)]
    log_format: LogFormat,
}

impl Cli {
    fn gc_config(&self) -> GcConfig {
        GcConfig {
            confirm_delay: Duration::from_secs(self.confirm_delay),
            load_balancers: LoadBalancerNames {
                tcp: self.cluster_tcp_loadbalancer.clone(),
                udp: self.cluster_udp_loadbalancer.clone(),
                tcp_session: self.cluster_tcp_session_loadbalancer.clone(),
                udp_session: self.cluster_udp_session_loadbalancer.clone(),
            },
            cluster_router: self.cluster_router.clone(),
        }
    }

    fn nbctl_config(&self) -> NbctlConfig {
        NbctlConfig {
            binary: self.nbctl.clone(),
            db: self.ovn_nb_addr.clone(),
            timeout: Duration::from_secs(self.nbctl_timeout),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.log_format)
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {}", e))?;

    let client = create_client(cli.kubeconfig.as_deref()).await?;

    let snapshot: Arc<dyn ResourceSnapshot> = Arc::new(KubeSnapshot::new(client.clone()));
    let ip_records: Arc<dyn IpRecordStore> = Arc::new(KubeIpRecordStore::new(client));
    let sdn: Arc<dyn SdnClient> = Arc::new(OvnNbClient::new(cli.nbctl_config()));
    let ipam = Arc::new(Ipam::new());
    let address_space: Arc<dyn AddressSpace> = ipam.clone();

    let teardown = Arc::new(ClusterTeardown::new(
        sdn.clone(),
        ip_records.clone(),
        snapshot.clone(),
        cli.cluster_router.clone(),
    ));

    let ctx = GcContext {
        snapshot: snapshot.clone(),
        sdn,
        teardown,
        ip_records,
        address_space,
        config: cli.gc_config(),
    };
    let gc = Arc::new(GarbageCollector::new(ctx));
    let scheduler = Scheduler::new(
        gc,
        snapshot,
        ipam,
        Duration::from_secs(cli.gc_interval),
    )?;

    if cli.once {
        let summary = scheduler.run_once().await?;
        info!(%summary, total = summary.total(), "single gc pass finished");
        return Ok(());
    }

    scheduler.run(shutdown_signal()).await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
