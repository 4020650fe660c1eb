// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Read-only snapshot access to the ingress cache.
//!
//! A [`Snapshot`] is an owned, ordered list of the `Ingress` objects the cache
//! held at the moment of the read. The reflector store is hash based, so the
//! lister orders snapshots by namespace and name. An unchanged cache therefore
//! always produces the same snapshot, and the same hosts file.

use crate::cache::SyncStatus;
use crate::errors::ListError;
use crate::selector::LabelSelector;
use k8s_openapi::api::networking::v1::Ingress;
use kube::runtime::reflector::Store;
use kube::ResourceExt;
use std::sync::Arc;
use tokio::sync::watch;

/// Point-in-time read of the cached ingresses.
pub type Snapshot = Vec<Arc<Ingress>>;

/// Source of ingress snapshots for the reconciler.
pub trait IngressLister: Send + Sync {
    /// Return every cached ingress matching `selector`.
    ///
    /// Never waits for fresher data.
    ///
    /// # Errors
    ///
    /// Returns [`ListError::CacheUnavailable`] before the initial sync and
    /// [`ListError::Transport`] if the initial sync failed.
    fn list(&self, selector: &LabelSelector) -> Result<Snapshot, ListError>;
}

/// [`IngressLister`] backed by a reflector store.
#[derive(Clone)]
pub struct StoreLister {
    store: Store<Ingress>,
    status: watch::Receiver<SyncStatus>,
}

impl StoreLister {
    /// Create a lister over `store`, gated by the cache's sync `status`.
    #[must_use]
    pub fn new(store: Store<Ingress>, status: watch::Receiver<SyncStatus>) -> Self {
        Self { store, status }
    }
}

impl IngressLister for StoreLister {
    fn list(&self, selector: &LabelSelector) -> Result<Snapshot, ListError> {
        let status = self.status.borrow().clone();
        match status {
            SyncStatus::Pending => return Err(ListError::CacheUnavailable),
            SyncStatus::Failed(message) => return Err(ListError::Transport { message }),
            SyncStatus::Synced => {}
        }

        let mut snapshot: Snapshot = if selector.is_everything() {
            self.store.state()
        } else {
            self.store
                .state()
                .into_iter()
                .filter(|ingress| selector.matches(ingress.labels()))
                .collect()
        };

        snapshot.sort_by(|a, b| {
            a.namespace()
                .cmp(&b.namespace())
                .then_with(|| a.name_any().cmp(&b.name_any()))
        });

        Ok(snapshot)
    }
}

#[cfg(test)]
#[path = "lister_tests.rs"]
mod lister_tests;
