//! Watcher orchestration
//!
//! One [`Watcher`] drives a complete scan for one resource type: it iterates
//! accounts and regions, lists top-level resources through the paginator,
//! fetches each surviving resource's sub-detail collections through the
//! rate-limit wrapper, assembles the configuration payload, and emits one
//! [`ChangeItem`] per resource.
//!
//! Failure isolation is the point of the loop. A connect or listing failure
//! abandons only that account/region; a sub-fetch failure omits only that
//! configuration field. Everything lands in the scan's exception map and the
//! scan runs to completion.
//!
//! The resource-specific knowledge (what to list, how to fetch details, what
//! the configuration looks like) lives behind [`ResourceAdapter`].

use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::Instrument;
use uuid::Uuid;

use crate::config::ScanConfig;
use crate::error::ScanError;
use crate::filter::ScopeFilter;
use crate::item::{ChangeItem, UNIVERSAL_REGION};
use crate::page::{paginate, paginate_optional, Page, PaginationMode, DEFAULT_MAX_PAGES};
use crate::recorder::{ExceptionMap, ExceptionRecorder, Location};
use crate::retry::{call_rate_limited, RetryPolicy};

/// Whether a sub-fetch's absence is expected behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    /// Absence is a failure and is recorded.
    Required,
    /// Absence means "not configured" and is never recorded.
    Optional,
}

/// How a sub-fetch's items land in the configuration payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldShape {
    /// All fetched items, as an array.
    Collection,
    /// A single fetched value (a login-profile-style lookup).
    Scalar,
}

/// One sub-detail collection fetched per surviving resource.
#[derive(Debug, Clone)]
pub struct DetailField {
    /// Key under which the fetched data lands in the configuration payload.
    pub name: &'static str,
    pub presence: Presence,
    pub shape: FieldShape,
    /// Pagination convention of the detail API.
    pub mode: PaginationMode,
}

impl DetailField {
    pub fn collection(name: &'static str, mode: PaginationMode) -> Self {
        Self {
            name,
            presence: Presence::Required,
            shape: FieldShape::Collection,
            mode,
        }
    }

    pub fn scalar(name: &'static str) -> Self {
        Self {
            name,
            presence: Presence::Required,
            shape: FieldShape::Scalar,
            mode: PaginationMode::NextToken,
        }
    }

    pub fn optional(mut self) -> Self {
        self.presence = Presence::Optional;
        self
    }
}

/// Resource-type-specific collaborator supplying the remote operations for
/// one technology.
///
/// The framework never inspects the connection handle; it only threads it
/// from [`connect`](Self::connect) into the listing and detail calls.
#[async_trait]
pub trait ResourceAdapter: Send + Sync {
    /// Remote session handle produced by [`connect`](Self::connect).
    type Conn: Send + Sync;

    /// Short index naming this resource type (e.g. `"user"`, `"topic"`).
    fn index(&self) -> &'static str;

    /// Technology label used to scope the retry budget. Defaults to the
    /// index.
    fn technology(&self) -> &'static str {
        self.index()
    }

    /// Regions to iterate per account. An empty list marks the technology
    /// as global; it is then scanned once per account under the
    /// `"universal"` region.
    fn regions(&self) -> Vec<String> {
        Vec::new()
    }

    /// Pagination convention of the top-level listing API.
    fn list_mode(&self) -> PaginationMode;

    /// Sub-detail collections to fetch per surviving resource, in order.
    fn detail_fields(&self) -> Vec<DetailField> {
        Vec::new()
    }

    /// Establish a remote session for one account (and region, for regional
    /// technologies).
    async fn connect(&self, account: &str, region: &str) -> Result<Self::Conn, ScanError>;

    /// Fetch one page of top-level resources.
    async fn list_page(
        &self,
        conn: &Self::Conn,
        cursor: Option<String>,
    ) -> Result<Page, ScanError>;

    /// Provider-assigned unique identity of one listed record.
    fn identity(&self, item: &Value) -> Result<String, ScanError>;

    /// Display name derived from an identity. Defaults to the identity
    /// itself; a parse failure is recorded and the raw identity is used.
    fn name(&self, identity: &str) -> Result<String, ScanError> {
        Ok(identity.to_string())
    }

    /// Seed configuration assembled from the listed record, before any
    /// detail fields are merged in.
    fn base_config(&self, item: &Value) -> Map<String, Value>;

    /// Fetch one page of one sub-detail collection. `Ok(None)` means the
    /// sub-resource is not configured; for [`Presence::Optional`] fields
    /// that is expected behavior and is not recorded.
    async fn detail_page(
        &self,
        conn: &Self::Conn,
        identity: &str,
        field: &DetailField,
        cursor: Option<String>,
    ) -> Result<Option<Page>, ScanError>;
}

/// The per-resource-type control loop.
pub struct Watcher<A: ResourceAdapter> {
    adapter: A,
    accounts: Vec<String>,
    filter: ScopeFilter,
    retry: RetryPolicy,
    max_pages: usize,
}

impl<A: ResourceAdapter> Watcher<A> {
    pub fn new(adapter: A, accounts: Vec<String>) -> Self {
        Self {
            adapter,
            accounts,
            filter: ScopeFilter::default(),
            retry: RetryPolicy::default(),
            max_pages: DEFAULT_MAX_PAGES,
        }
    }

    /// Apply operator configuration (retry budget, page cap, ignore list).
    pub fn with_config(mut self, config: &ScanConfig) -> Self {
        self.retry = config.retry_policy();
        self.filter = config.scope_filter();
        self.max_pages = config.max_pages;
        self
    }

    pub fn with_filter(mut self, filter: ScopeFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages;
        self
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    /// Run one complete scan across all configured accounts and regions.
    ///
    /// Returns every emitted [`ChangeItem`] in listing order within each
    /// account/region, plus the map of failures encountered along the way.
    /// No failure inside the iteration structure escapes this call.
    pub async fn slurp(&self) -> (Vec<ChangeItem>, ExceptionMap) {
        let scan_id = Uuid::new_v4();
        let span = tracing::info_span!("scan", index = self.adapter.index(), %scan_id);
        self.run_scan().instrument(span).await
    }

    async fn run_scan(&self) -> (Vec<ChangeItem>, ExceptionMap) {
        let mut item_list = Vec::new();
        let mut recorder = ExceptionRecorder::new();

        let regions = self.adapter.regions();
        let regions = if regions.is_empty() {
            vec![UNIVERSAL_REGION.to_string()]
        } else {
            regions
        };

        for account in &self.accounts {
            for region in &regions {
                self.scan_scope(account, region, &mut item_list, &mut recorder)
                    .await;
            }
        }

        tracing::info!(
            items = item_list.len(),
            exceptions = recorder.len(),
            "scan complete"
        );
        (item_list, recorder.into_map())
    }

    /// Scan one account/region pair. Never fails; degraded scopes are
    /// recorded and skipped.
    async fn scan_scope(
        &self,
        account: &str,
        region: &str,
        item_list: &mut Vec<ChangeItem>,
        recorder: &mut ExceptionRecorder,
    ) {
        let index = self.adapter.index();
        tracing::debug!(account, region, "checking {index}");

        let (conn, listed) = match self.connect_and_list(account, region).await {
            Ok(result) => result,
            Err(err) => {
                recorder.record(Location::scope(index, account, region), err);
                return;
            }
        };
        tracing::debug!(count = listed.len(), account, region, "listed {index} resources");

        for raw in listed {
            let identity = match self.adapter.identity(&raw) {
                Ok(identity) => identity,
                Err(err) => {
                    recorder.record(Location::scope(index, account, region), err);
                    continue;
                }
            };

            if self.filter.is_ignored(&identity) {
                tracing::debug!(%identity, "ignored by scope filter");
                continue;
            }

            let name = match self.adapter.name(&identity) {
                Ok(name) => name,
                Err(err) => {
                    recorder.record(Location::resource(index, account, region, &identity), err);
                    identity.clone()
                }
            };

            tracing::debug!(%identity, account, "slurping {index}");
            let mut config = self.adapter.base_config(&raw);

            for field in self.adapter.detail_fields() {
                match self.collect_field(&conn, &identity, &field).await {
                    Ok(Some(value)) => {
                        config.insert(field.name.to_string(), value);
                    }
                    Ok(None) => {
                        // Absence is expected behavior only for optional
                        // fields; a required field with nothing behind it is
                        // a degraded resource.
                        if field.presence == Presence::Required {
                            recorder.record(
                                Location::resource(index, account, region, &identity),
                                ScanError::malformed(
                                    field.name,
                                    "required sub-resource is absent",
                                ),
                            );
                        }
                    }
                    Err(err) => {
                        recorder
                            .record(Location::resource(index, account, region, &identity), err);
                    }
                }
            }

            item_list.push(ChangeItem::new(
                index,
                region,
                account,
                name,
                Value::Object(config),
            ));
        }
    }

    async fn connect_and_list(
        &self,
        account: &str,
        region: &str,
    ) -> Result<(A::Conn, Vec<Value>), ScanError> {
        let conn = self.adapter.connect(account, region).await?;
        let conn_ref = &conn;
        let listed = paginate(self.adapter.list_mode(), self.max_pages, |cursor| {
            call_rate_limited(&self.retry, self.adapter.technology(), move || {
                self.adapter.list_page(conn_ref, cursor.clone())
            })
        })
        .await?;
        Ok((conn, listed))
    }

    /// Gather one detail field to completion. `Ok(None)` means the
    /// sub-resource is absent.
    async fn collect_field(
        &self,
        conn: &A::Conn,
        identity: &str,
        field: &DetailField,
    ) -> Result<Option<Value>, ScanError> {
        let gathered = paginate_optional(field.mode, self.max_pages, |cursor| {
            call_rate_limited(&self.retry, self.adapter.technology(), move || {
                self.adapter.detail_page(conn, identity, field, cursor.clone())
            })
        })
        .await?;

        Ok(match gathered {
            None => None,
            Some(items) => match field.shape {
                FieldShape::Collection => Some(Value::Array(items)),
                // A scalar fetch that yields nothing counts as absent.
                FieldShape::Scalar => items.into_iter().next(),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_field_builders_set_presence_and_shape() {
        let subs = DetailField::collection("subscriptions", PaginationMode::NextToken);
        assert_eq!(subs.presence, Presence::Required);
        assert_eq!(subs.shape, FieldShape::Collection);

        let profile = DetailField::scalar("loginprofile").optional();
        assert_eq!(profile.presence, Presence::Optional);
        assert_eq!(profile.shape, FieldShape::Scalar);
    }
}
