// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Background watch cache for `Ingress` resources.
//!
//! [`IngressCache`] owns a kube-rs reflector store. Once [`IngressCache::start`]
//! is called, a background task runs a cluster-wide watcher that keeps the
//! store in sync until the cancellation token fires. Readers never talk to the
//! API server; they take snapshots from the store through [`StoreLister`].
//!
//! Synchronization progress is published on a `tokio::sync::watch` channel as a
//! [`SyncStatus`]. Startup blocks on [`IngressCache::wait_for_sync`] instead of
//! sleeping for a fixed time, and the lister refuses to serve reads until the
//! initial list has completed.
//!
//! Watch errors seen before the first complete list are published as
//! [`SyncStatus::Failed`]. After the first sync they are only logged: the
//! watcher retries with backoff and the last known mirror keeps being served.

use crate::errors::CacheError;
use crate::lister::StoreLister;
use crate::metrics;
use futures::StreamExt;
use k8s_openapi::api::networking::v1::Ingress;
use kube::runtime::reflector::{self, store::Writer, Store};
use kube::runtime::{watcher, WatchStreamExt};
use kube::{Api, ResourceExt};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Progress of the initial cache synchronization.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum SyncStatus {
    /// The initial list has not completed yet
    #[default]
    Pending,
    /// The initial list completed; the store holds a full view
    Synced,
    /// The watch failed before the initial list completed
    Failed(String),
}

impl SyncStatus {
    /// Returns `true` once the initial list has completed.
    #[must_use]
    pub fn is_synced(&self) -> bool {
        matches!(self, SyncStatus::Synced)
    }
}

/// In-memory mirror of all `Ingress` objects in the cluster.
pub struct IngressCache {
    store: Store<Ingress>,
    writer: Option<Writer<Ingress>>,
    status_tx: Option<watch::Sender<SyncStatus>>,
    status_rx: watch::Receiver<SyncStatus>,
}

impl Default for IngressCache {
    fn default() -> Self {
        Self::new()
    }
}

impl IngressCache {
    /// Create an empty, unsynced cache.
    #[must_use]
    pub fn new() -> Self {
        let (store, writer) = reflector::store();
        let (status_tx, status_rx) = watch::channel(SyncStatus::Pending);
        Self {
            store,
            writer: Some(writer),
            status_tx: Some(status_tx),
            status_rx,
        }
    }

    /// Start synchronizing the store from `api` in a background task.
    ///
    /// The task runs until `cancel` fires or the watch stream ends.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::AlreadyStarted`] on a second call.
    pub fn start(
        &mut self,
        api: Api<Ingress>,
        config: watcher::Config,
        cancel: CancellationToken,
    ) -> Result<JoinHandle<()>, CacheError> {
        let (Some(writer), Some(status_tx)) = (self.writer.take(), self.status_tx.take()) else {
            return Err(CacheError::AlreadyStarted);
        };

        info!("Starting ingress cache synchronization");
        metrics::set_cache_synced(false);

        Ok(tokio::spawn(run_sync(api, config, writer, status_tx, cancel)))
    }

    /// Block until the initial list has completed.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::SyncTimeout`] if `timeout` elapses first and
    /// [`CacheError::SyncStopped`] if the sync task ends first.
    pub async fn wait_for_sync(&self, timeout: Duration) -> Result<(), CacheError> {
        let mut status_rx = self.status_rx.clone();

        let synced = async {
            status_rx
                .wait_for(SyncStatus::is_synced)
                .await
                .map(|_| ())
        };

        let result = match tokio::time::timeout(timeout, synced).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(_)) => Err(CacheError::SyncStopped),
            Err(_) => Err(CacheError::SyncTimeout {
                timeout_secs: timeout.as_secs(),
            }),
        };
        result
    }

    /// Returns `true` once the initial list has completed.
    #[must_use]
    pub fn is_synced(&self) -> bool {
        self.status_rx.borrow().is_synced()
    }

    /// Current synchronization status.
    #[must_use]
    pub fn status(&self) -> SyncStatus {
        self.status_rx.borrow().clone()
    }

    /// A receiver that observes synchronization status changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SyncStatus> {
        self.status_rx.clone()
    }

    /// A snapshot reader over this cache.
    #[must_use]
    pub fn lister(&self) -> StoreLister {
        StoreLister::new(self.store.clone(), self.status_rx.clone())
    }
}

async fn run_sync(
    api: Api<Ingress>,
    config: watcher::Config,
    writer: Writer<Ingress>,
    status_tx: watch::Sender<SyncStatus>,
    cancel: CancellationToken,
) {
    let stream = watcher(api, config).default_backoff().reflect(writer);
    let mut stream = std::pin::pin!(stream);

    loop {
        tokio::select! {
            () = cancel.cancelled() => {
                info!("Ingress cache synchronization cancelled");
                break;
            }
            event = stream.next() => match event {
                Some(Ok(event)) => apply_sync_event(&status_tx, &event),
                Some(Err(e)) => apply_sync_error(&status_tx, &e.to_string()),
                None => {
                    warn!("Ingress watch stream ended");
                    break;
                }
            }
        }
    }

    metrics::set_cache_synced(false);
}

/// Update the sync status for a watcher event that has already been reflected.
fn apply_sync_event(status_tx: &watch::Sender<SyncStatus>, event: &watcher::Event<Ingress>) {
    match event {
        watcher::Event::Init => debug!("Ingress cache relist started"),
        watcher::Event::InitApply(ingress) | watcher::Event::Apply(ingress) => debug!(
            namespace = ?ingress.namespace(),
            name = %ingress.name_any(),
            "Ingress applied to cache"
        ),
        watcher::Event::Delete(ingress) => debug!(
            namespace = ?ingress.namespace(),
            name = %ingress.name_any(),
            "Ingress removed from cache"
        ),
        watcher::Event::InitDone => {
            let first_sync = status_tx.send_if_modified(|status| {
                if status.is_synced() {
                    false
                } else {
                    *status = SyncStatus::Synced;
                    true
                }
            });
            if first_sync {
                info!("Ingress cache synced");
                metrics::set_cache_synced(true);
            } else {
                debug!("Ingress cache relist completed");
            }
        }
    }
}

/// Record a watch error. Only errors before the first sync change the status.
fn apply_sync_error(status_tx: &watch::Sender<SyncStatus>, message: &str) {
    let before_first_sync = status_tx.send_if_modified(|status| {
        if status.is_synced() {
            false
        } else {
            *status = SyncStatus::Failed(message.to_string());
            true
        }
    });

    if before_first_sync {
        error!("Ingress watch failed before initial sync: {message}");
    } else {
        warn!("Ingress watch error, serving last known state: {message}");
    }
}

#[cfg(test)]
#[path = "cache_tests.rs"]
mod cache_tests;
