// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Global constants for the ingress-hosts controller.
//!
//! Constants are organized by category for easy maintenance.

// ============================================================================
// Annotation Constants
// ============================================================================

/// Annotation on an `Ingress` carrying the hostname to publish in the hosts file
pub const DEFAULT_DNS_NAME_ANNOTATION: &str = "etchostsfilecontroller.weberc2.com/dns-name";

// ============================================================================
// Reconciliation Constants
// ============================================================================

/// Default interval between reconcile cycles (30 seconds)
pub const DEFAULT_RECONCILE_INTERVAL_SECS: u64 = 30;

/// Default upper bound on waiting for the initial cache sync (1 minute)
pub const DEFAULT_CACHE_SYNC_TIMEOUT_SECS: u64 = 60;

// ============================================================================
// Hosts File Constants
// ============================================================================

/// Permission bits of the generated hosts file (rw-r--r--)
pub const HOSTS_FILE_MODE: u32 = 0o644;

/// Separator between the address and the name on a hosts file line
pub const HOSTS_FIELD_SEPARATOR: char = '\t';

/// Separator between hosts file lines
pub const HOSTS_LINE_SEPARATOR: char = '\n';

/// Suffix of the sibling file used for atomic replacement
pub const TEMP_FILE_SUFFIX: &str = ".tmp";

// ============================================================================
// Metrics Server Constants
// ============================================================================

/// Default bind address of the metrics and health endpoint
pub const DEFAULT_METRICS_BIND_ADDRESS: &str = "0.0.0.0:8080";

/// Value of `--metrics-addr` that turns the metrics server off
pub const METRICS_DISABLED: &str = "disabled";

/// Namespace prefix for all Prometheus metrics
pub const METRICS_NAMESPACE: &str = "ingress_hosts";

// ============================================================================
// Runtime Constants
// ============================================================================

/// Number of tokio worker threads
pub const TOKIO_WORKER_THREADS: usize = 2;

/// Name given to tokio worker threads
pub const TOKIO_THREAD_NAME: &str = "ingress-hosts";
