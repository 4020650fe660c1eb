// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Periodic reconciliation of the hosts file.
//!
//! Each cycle takes one snapshot from the lister, derives one [`HostEntry`]
//! per eligible ingress and replaces the hosts file with them:
//!
//! 1. Ingresses without the dns-name annotation (or with an empty value) are
//!    skipped and logged at `info`.
//! 2. The first load-balancer ingress with a non-empty IP wins. Any further
//!    addresses on the same ingress are ignored.
//! 3. Ingresses with no address yet are skipped and logged at `warn`. The
//!    address usually shows up on a later cycle.
//!
//! The file is regenerated from scratch every cycle, so deleted ingresses drop
//! out within one interval.
//!
//! Listing and write failures never stop the loop. They are logged, counted,
//! and retried on the next tick with no other backoff.

use crate::errors::{ConfigError, ReconcileError};
use crate::hosts_file::{write_hosts_file, HostEntry};
use crate::lister::IngressLister;
use crate::metrics;
use crate::selector::LabelSelector;
use k8s_openapi::api::networking::v1::Ingress;
use kube::ResourceExt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Settings for the reconcile loop.
#[derive(Clone, Debug)]
pub struct ReconcilerConfig {
    /// Destination hosts file
    pub hosts_file: PathBuf,
    /// Annotation key holding the desired hostname
    pub annotation: String,
    /// Selector applied to every snapshot read
    pub selector: LabelSelector,
    /// Time between cycle starts
    pub interval: Duration,
}

/// Entries derived from one snapshot, plus what was left out.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Derivation {
    /// Entries in snapshot order
    pub entries: Vec<HostEntry>,
    /// Ingresses without a usable dns-name annotation
    pub missing_annotation: usize,
    /// Annotated ingresses without an assigned address
    pub missing_address: usize,
}

/// Outcome of a successful cycle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CycleReport {
    /// Number of ingresses in the snapshot
    pub ingresses: usize,
    /// Number of lines written
    pub entries: usize,
    /// Ingresses skipped for a missing annotation
    pub missing_annotation: usize,
    /// Ingresses skipped for a missing address
    pub missing_address: usize,
}

/// First non-empty load-balancer IP of `ingress`, in status order.
#[must_use]
pub fn first_address(ingress: &Ingress) -> Option<&str> {
    ingress
        .status
        .as_ref()?
        .load_balancer
        .as_ref()?
        .ingress
        .as_ref()?
        .iter()
        .find_map(|lb| lb.ip.as_deref().filter(|ip| !ip.is_empty()))
}

/// Derive hosts entries from `snapshot`, preserving its order.
#[must_use]
pub fn derive_entries(snapshot: &[Arc<Ingress>], annotation: &str) -> Derivation {
    let mut derivation = Derivation::default();

    for ingress in snapshot {
        let namespace = ingress.namespace().unwrap_or_default();
        let name = ingress.name_any();
        debug!(namespace = %namespace, name = %name, "Found ingress");

        let Some(dns_name) = ingress
            .annotations()
            .get(annotation)
            .filter(|value| !value.is_empty())
        else {
            info!(
                namespace = %namespace,
                name = %name,
                annotation = annotation,
                "Missing annotation on ingress; skipping"
            );
            derivation.missing_annotation += 1;
            continue;
        };

        if let Some(address) = first_address(ingress) {
            derivation.entries.push(HostEntry::new(address, dns_name));
        } else {
            warn!(
                namespace = %namespace,
                name = %name,
                "Couldn't find an address for ingress"
            );
            derivation.missing_address += 1;
        }
    }

    derivation
}

/// Timer-driven driver of list → derive → write cycles.
pub struct Reconciler<L> {
    lister: L,
    config: ReconcilerConfig,
}

impl<L: IngressLister> Reconciler<L> {
    /// Create a reconciler reading from `lister`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroInterval`] if `config.interval` is zero.
    pub fn new(lister: L, config: ReconcilerConfig) -> Result<Self, ConfigError> {
        if config.interval.is_zero() {
            return Err(ConfigError::ZeroInterval);
        }
        Ok(Self { lister, config })
    }

    /// The settings this reconciler runs with.
    pub fn config(&self) -> &ReconcilerConfig {
        &self.config
    }

    /// Run one cycle.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError::List`] if no snapshot could be taken (nothing
    /// is written) and [`ReconcileError::Write`] if the hosts file could not be
    /// replaced (the previous file is kept).
    pub async fn reconcile_once(&self) -> Result<CycleReport, ReconcileError> {
        let snapshot = self.lister.list(&self.config.selector)?;
        info!("Found {} ingresses", snapshot.len());

        let derivation = derive_entries(&snapshot, &self.config.annotation);
        metrics::record_skipped("missing_annotation", derivation.missing_annotation);
        metrics::record_skipped("missing_address", derivation.missing_address);

        write_hosts_file(&self.config.hosts_file, &derivation.entries).await?;

        Ok(CycleReport {
            ingresses: snapshot.len(),
            entries: derivation.entries.len(),
            missing_annotation: derivation.missing_annotation,
            missing_address: derivation.missing_address,
        })
    }

    /// Run cycles on every tick until `cancel` fires.
    ///
    /// The first cycle starts immediately. Cycles never overlap: a cycle that
    /// overruns the interval is followed straight away by the next one.
    /// Cancellation is observed between cycles, so an in-flight cycle always
    /// finishes its write.
    pub async fn run(&self, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(self.config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            hosts_file = %self.config.hosts_file.display(),
            interval_secs = self.config.interval.as_secs(),
            "Starting reconcile loop"
        );

        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                _ = ticker.tick() => self.run_cycle().await,
            }
        }

        info!("Reconcile loop stopped");
    }

    async fn run_cycle(&self) {
        let start = Instant::now();

        match self.reconcile_once().await {
            Ok(report) => {
                metrics::record_cycle_success(start.elapsed(), report.entries);
                info!(
                    ingresses = report.ingresses,
                    entries = report.entries,
                    missing_annotation = report.missing_annotation,
                    missing_address = report.missing_address,
                    "Hosts file updated"
                );
            }
            Err(e) => {
                metrics::record_cycle_failure(e.metric_status(), start.elapsed());
                error!("Reconcile cycle failed: {e}");
            }
        }
    }
}

#[cfg(test)]
#[path = "reconciler_tests.rs"]
mod reconciler_tests;
