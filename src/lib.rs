//! driftwatch - cloud resource inventory scanning
//!
//! This crate provides the shared execution framework behind periodic
//! resource-inventory scans of a remote cloud provider account. Each resource
//! type (identity principals, messaging topics, ...) is monitored by a
//! type-specific watcher; the framework owns the parts with real invariants:
//!
//! - [`page`] - walks cursor-based listing APIs to completion
//! - [`retry`] - wraps remote calls with throttling detection and backoff
//! - [`recorder`] - absorbs per-scope failures so a scan always finishes
//! - [`filter`] - ignore-list predicate over resource identities
//! - [`watcher`] - the per-resource-type control loop producing [`ChangeItem`]s
//! - [`provider`] - HTTP session plumbing for REST-style providers
//!
//! The per-resource-type field extraction lives outside this crate: callers
//! implement [`watcher::ResourceAdapter`] to supply the listing and
//! detail-fetch operations, and receive a complete snapshot plus a failure
//! report from [`watcher::Watcher::slurp`].
//!
//! # Example
//!
//! ```ignore
//! use driftwatch::watcher::Watcher;
//!
//! async fn scan(adapter: MyTopicAdapter) {
//!     let watcher = Watcher::new(adapter, vec!["prod-account".into()]);
//!     let (items, exceptions) = watcher.slurp().await;
//!     for item in &items {
//!         println!("{}/{}/{}", item.account(), item.region(), item.name());
//!     }
//!     for (location, error) in &exceptions {
//!         eprintln!("degraded at {location}: {error}");
//!     }
//! }
//! ```

pub mod config;
pub mod error;
pub mod filter;
pub mod item;
pub mod page;
pub mod provider;
pub mod recorder;
pub mod retry;
pub mod watcher;

pub use config::ScanConfig;
pub use error::ScanError;
pub use filter::ScopeFilter;
pub use item::{ChangeItem, UNIVERSAL_REGION};
pub use page::{Page, PaginationMode};
pub use recorder::{ExceptionRecorder, Location};
pub use retry::RetryPolicy;
pub use watcher::{DetailField, FieldShape, Presence, ResourceAdapter, Watcher};
