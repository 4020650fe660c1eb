// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! # ingress-hosts - Ingress to hosts file controller for Kubernetes
//!
//! ingress-hosts watches `networking.k8s.io/v1` `Ingress` resources and keeps a
//! hosts-format file up to date with one `<address>\t<name>` line per
//! annotated ingress that has a load-balancer IP.
//!
//! ## Overview
//!
//! - A background watcher mirrors every `Ingress` into an in-memory reflector store
//! - On a fixed interval the reconciler takes a snapshot of the store, derives
//!   the entries and atomically replaces the hosts file
//! - Listing and write failures are logged and retried on the next tick
//!
//! ## Modules
//!
//! - [`cache`] - Reflector-backed watch cache with wait-for-sync
//! - [`lister`] - Snapshot reads over the cache
//! - [`reconciler`] - Entry derivation and the periodic loop
//! - [`hosts_file`] - Hosts file rendering and atomic writes
//! - [`selector`] - Label selector matching
//! - [`config`] - Command-line/environment configuration and client setup
//! - [`metrics`] - Prometheus metrics
//! - [`server`] - Metrics and health endpoints
//!
//! ## Example
//!
//! ```rust
//! use ingress_hosts::hosts_file::{render, HostEntry};
//!
//! let content = render(&[
//!     HostEntry::new("1.2.3.4", "a.example.com"),
//!     HostEntry::new("5.6.7.8", "b.example.com"),
//! ]);
//! assert_eq!(content, "1.2.3.4\ta.example.com\n5.6.7.8\tb.example.com");
//! ```

pub mod cache;
pub mod config;
pub mod constants;
pub mod errors;
pub mod hosts_file;
pub mod lister;
pub mod metrics;
pub mod reconciler;
pub mod selector;
pub mod server;
