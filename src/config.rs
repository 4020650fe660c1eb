// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Command-line and environment configuration.
//!
//! Every flag can also be given through an environment variable, so the
//! controller can be configured entirely from a pod spec:
//!
//! | Flag | Environment |
//! |------|-------------|
//! | `--hosts-file` | `HOSTS_FILE` |
//! | `--kubeconfig` | `KUBECONFIG` |
//! | `--interval-secs` | `RECONCILE_INTERVAL_SECS` |
//! | `--annotation` | `DNS_NAME_ANNOTATION` |
//! | `--label-selector` | `LABEL_SELECTOR` |
//! | `--sync-timeout-secs` | `CACHE_SYNC_TIMEOUT_SECS` |
//! | `--metrics-addr` | `METRICS_BIND_ADDRESS` |

use crate::constants::{
    DEFAULT_CACHE_SYNC_TIMEOUT_SECS, DEFAULT_DNS_NAME_ANNOTATION, DEFAULT_METRICS_BIND_ADDRESS,
    DEFAULT_RECONCILE_INTERVAL_SECS, METRICS_DISABLED,
};
use crate::errors::ConfigError;
use crate::reconciler::ReconcilerConfig;
use crate::selector::LabelSelector;
use anyhow::{Context as _, Result};
use clap::Parser;
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Raw command-line arguments.
#[derive(Debug, Parser)]
#[command(
    name = "ingress-hosts",
    version,
    about = "Write annotated Ingress load-balancer addresses to a hosts file"
)]
pub struct Cli {
    /// Path of the hosts file to generate
    #[arg(long, env = "HOSTS_FILE")]
    pub hosts_file: Option<PathBuf>,

    /// Kubeconfig to use; in-cluster credentials when unset
    #[arg(long, env = "KUBECONFIG")]
    pub kubeconfig: Option<PathBuf>,

    /// Seconds between reconcile cycles
    #[arg(long, env = "RECONCILE_INTERVAL_SECS", default_value_t = DEFAULT_RECONCILE_INTERVAL_SECS)]
    pub interval_secs: u64,

    /// Annotation holding the hostname to publish
    #[arg(long, env = "DNS_NAME_ANNOTATION", default_value = DEFAULT_DNS_NAME_ANNOTATION)]
    pub annotation: String,

    /// Only publish ingresses matching this `key=value,...` selector
    #[arg(long, env = "LABEL_SELECTOR", default_value = "")]
    pub label_selector: String,

    /// Seconds to wait for the initial cache sync before giving up
    #[arg(long, env = "CACHE_SYNC_TIMEOUT_SECS", default_value_t = DEFAULT_CACHE_SYNC_TIMEOUT_SECS)]
    pub sync_timeout_secs: u64,

    /// Metrics and health listener address, or `disabled`
    #[arg(long, env = "METRICS_BIND_ADDRESS", default_value = DEFAULT_METRICS_BIND_ADDRESS)]
    pub metrics_addr: String,
}

/// Validated controller settings.
#[derive(Clone, Debug)]
pub struct Settings {
    /// Destination hosts file
    pub hosts_file: PathBuf,
    /// Kubeconfig path; `None` selects in-cluster configuration
    pub kubeconfig: Option<PathBuf>,
    /// Time between reconcile cycles
    pub interval: Duration,
    /// Annotation key holding the hostname
    pub annotation: String,
    /// Selector applied when listing
    pub selector: LabelSelector,
    /// Upper bound on the initial cache sync
    pub sync_timeout: Duration,
    /// Metrics listener; `None` when disabled
    pub metrics_addr: Option<SocketAddr>,
}

impl Settings {
    /// Validate raw arguments.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] for a missing hosts file, a zero interval, an
    /// empty annotation key, a malformed selector or a bad metrics address.
    pub fn from_cli(cli: Cli) -> Result<Self, ConfigError> {
        let hosts_file = cli
            .hosts_file
            .filter(|path| !path.as_os_str().is_empty())
            .ok_or(ConfigError::MissingHostsFile)?;

        if cli.interval_secs == 0 {
            return Err(ConfigError::ZeroInterval);
        }

        let annotation = cli.annotation.trim().to_string();
        if annotation.is_empty() {
            return Err(ConfigError::EmptyAnnotation);
        }

        let metrics_addr = match cli.metrics_addr.trim() {
            METRICS_DISABLED => None,
            address => Some(address.parse::<SocketAddr>().map_err(|e| {
                ConfigError::InvalidMetricsAddress {
                    address: address.to_string(),
                    reason: e.to_string(),
                }
            })?),
        };

        Ok(Self {
            hosts_file,
            kubeconfig: cli.kubeconfig.filter(|path| !path.as_os_str().is_empty()),
            interval: Duration::from_secs(cli.interval_secs),
            annotation,
            selector: cli.label_selector.parse()?,
            sync_timeout: Duration::from_secs(cli.sync_timeout_secs),
            metrics_addr,
        })
    }

    /// Settings for the reconcile loop.
    #[must_use]
    pub fn reconciler_config(&self) -> ReconcilerConfig {
        ReconcilerConfig {
            hosts_file: self.hosts_file.clone(),
            annotation: self.annotation.clone(),
            selector: self.selector.clone(),
            interval: self.interval,
        }
    }
}

/// Build a Kubernetes client from `kubeconfig`, or from the in-cluster
/// service account when no kubeconfig is given.
///
/// # Errors
///
/// Returns an error if the kubeconfig cannot be read, the in-cluster
/// environment is missing, or the client cannot be constructed.
pub async fn build_client(kubeconfig: Option<&Path>) -> Result<Client> {
    let config = if let Some(path) = kubeconfig {
        debug!(path = %path.display(), "Loading kubeconfig");
        let kubeconfig = Kubeconfig::read_from(path)
            .with_context(|| format!("failed to read kubeconfig {}", path.display()))?;
        Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
            .await
            .with_context(|| format!("invalid kubeconfig {}", path.display()))?
    } else {
        debug!("Using in-cluster configuration");
        Config::incluster().context("failed to load in-cluster configuration")?
    };

    Client::try_from(config).context("failed to create Kubernetes client")
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
