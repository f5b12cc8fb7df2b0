//! `ovn-nbctl` backed implementation of [`SdnClient`]
//!
//! Every operation is one or more nbctl invocations. Deletes use
//! `--if-exists` so that removing an object that is already gone succeeds.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use ovngc_common::model::{PortGroup, RoutePolicy, StaticRoute};
use ovngc_common::retry::{retry_with_backoff, RetryConfig};
use ovngc_common::{Error, Result};
use ovngc_engine::SdnClient;
use tokio::process::Command;
use tracing::{debug, warn};

#[cfg(test)]
use mockall::automock;

use crate::parse::{parse_names, parse_ovsdb_map, parse_port_groups, parse_route_list};

/// Default wall-clock limit for a single nbctl invocation
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

/// Runs nbctl with the given arguments and returns stdout
#[cfg_attr(test, automock)]
#[async_trait]
pub trait NbctlExecutor: Send + Sync {
    /// Execute one nbctl command
    async fn exec(&self, args: Vec<String>) -> Result<String>;
}

/// Connection settings for `ovn-nbctl`
#[derive(Clone, Debug)]
pub struct NbctlConfig {
    /// Path to the `ovn-nbctl` binary
    pub binary: PathBuf,
    /// Northbound database address (`--db`); local socket when unset
    pub db: Option<String>,
    /// Per-invocation timeout, also passed to nbctl as `--timeout`
    pub timeout: Duration,
}

impl Default for NbctlConfig {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("ovn-nbctl"),
            db: None,
            timeout: DEFAULT_COMMAND_TIMEOUT,
        }
    }
}

/// Executes nbctl as a child process
pub struct ProcessExecutor {
    config: NbctlConfig,
}

impl ProcessExecutor {
    /// Create an executor with the given settings
    pub fn new(config: NbctlConfig) -> Self {
        Self { config }
    }

    fn global_args(&self) -> Vec<String> {
        let mut args = vec![format!("--timeout={}", self.config.timeout.as_secs().max(1))];
        if let Some(db) = &self.config.db {
            args.push(format!("--db={}", db));
        }
        args
    }
}

#[async_trait]
impl NbctlExecutor for ProcessExecutor {
    async fn exec(&self, args: Vec<String>) -> Result<String> {
        let description = args.join(" ");
        let mut cmd = Command::new(&self.config.binary);
        cmd.args(self.global_args()).args(&args).kill_on_drop(true);

        debug!(command = %description, "running ovn-nbctl");
        let output = tokio::time::timeout(self.config.timeout, cmd.output())
            .await
            .map_err(|_| {
                warn!(command = %description, timeout = ?self.config.timeout, "ovn-nbctl timed out");
                Error::ovn(&description, format!("timed out after {:?}", self.config.timeout))
            })?
            .map_err(|e| Error::ovn(&description, format!("failed to execute: {}", e)))?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            Err(Error::ovn(description, stderr))
        }
    }
}

/// OVN northbound client
pub struct OvnNbClient<E = ProcessExecutor> {
    executor: E,
    retry: RetryConfig,
}

impl OvnNbClient<ProcessExecutor> {
    /// Client that runs the real `ovn-nbctl`
    pub fn new(config: NbctlConfig) -> Self {
        Self::with_executor(ProcessExecutor::new(config))
    }
}

impl<E: NbctlExecutor> OvnNbClient<E> {
    /// Client over a custom executor
    pub fn with_executor(executor: E) -> Self {
        Self {
            executor,
            retry: RetryConfig::default(),
        }
    }

    /// Override the retry policy applied to each invocation
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    async fn nbctl(&self, args: &[&str]) -> Result<String> {
        let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
        let name = args.join(" ");
        retry_with_backoff(&self.retry, &name, || self.executor.exec(args.clone())).await
    }

    async fn find_names(&self, table: &str, conditions: &[&str]) -> Result<Vec<String>> {
        let mut args = vec![
            "--format=csv",
            "--data=bare",
            "--no-heading",
            "--columns=name",
            "find",
            table,
        ];
        args.extend_from_slice(conditions);
        Ok(parse_names(&self.nbctl(&args).await?))
    }
}

#[async_trait]
impl<E: NbctlExecutor> SdnClient for OvnNbClient<E> {
    async fn list_logical_switches(&self) -> Result<Vec<String>> {
        self.find_names("logical_switch", &[]).await
    }

    async fn list_logical_routers(&self) -> Result<Vec<String>> {
        self.find_names("logical_router", &[]).await
    }

    async fn list_logical_switch_ports(&self) -> Result<Vec<String>> {
        self.find_names("logical_switch_port", &["type=\"\""]).await
    }

    async fn delete_logical_switch_port(&self, name: &str) -> Result<()> {
        self.nbctl(&["--if-exists", "lsp-del", name]).await?;
        Ok(())
    }

    async fn find_load_balancer(&self, name: &str) -> Result<Option<String>> {
        let condition = format!("name={}", name);
        let output = self
            .nbctl(&[
                "--data=bare",
                "--no-heading",
                "--columns=_uuid",
                "find",
                "load_balancer",
                &condition,
            ])
            .await?;
        Ok(parse_names(&output).into_iter().next())
    }

    async fn get_load_balancer_vips(&self, id: &str) -> Result<HashMap<String, String>> {
        let output = self
            .nbctl(&["--data=bare", "--no-heading", "get", "load_balancer", id, "vips"])
            .await?;
        parse_ovsdb_map(&output)
    }

    async fn delete_load_balancer_vip(&self, vip: &str, lb_name: &str) -> Result<()> {
        self.nbctl(&["--if-exists", "lb-del", lb_name, vip]).await?;
        Ok(())
    }

    async fn list_port_groups(&self) -> Result<Vec<PortGroup>> {
        let output = self
            .nbctl(&[
                "--format=csv",
                "--data=bare",
                "--no-heading",
                "--columns=name,external_ids",
                "find",
                "port_group",
            ])
            .await?;
        Ok(parse_port_groups(&output))
    }

    async fn list_static_routes(&self, router: &str) -> Result<Vec<StaticRoute>> {
        let output = self.nbctl(&["lr-route-list", router]).await?;
        parse_route_list(&output)
    }

    async fn delete_static_route_by_next_hop(&self, router: &str, next_hop: &str) -> Result<()> {
        let routes = self.list_static_routes(router).await?;
        for route in routes.iter().filter(|r| r.next_hop == next_hop) {
            let policy = format!("--policy={}", route.policy);
            let mut args = vec!["--if-exists"];
            if route.policy != RoutePolicy::Unspecified {
                args.push(policy.as_str());
            }
            args.extend(["lr-route-del", router, route.cidr.as_str(), next_hop]);
            self.nbctl(&args).await?;
        }
        Ok(())
    }

    async fn delete_static_route(&self, router: &str, cidr: &str) -> Result<()> {
        self.nbctl(&["--if-exists", "lr-route-del", router, cidr]).await?;
        Ok(())
    }

    async fn delete_logical_switch(&self, name: &str) -> Result<()> {
        self.nbctl(&["--if-exists", "ls-del", name]).await?;
        Ok(())
    }

    async fn delete_logical_router(&self, name: &str) -> Result<()> {
        self.nbctl(&["--if-exists", "lr-del", name]).await?;
        Ok(())
    }

    async fn delete_port_group(&self, name: &str) -> Result<()> {
        self.nbctl(&["--if-exists", "pg-del", name]).await?;
        Ok(())
    }
}
