//! Scan-scoped exception accumulation
//!
//! A watcher never lets a per-account, per-region, or per-resource failure
//! abort the overall scan. Every catch site routes the error here and the
//! surrounding loop continues; operators read the finished map to learn
//! which scopes were degraded.

use std::collections::HashMap;
use std::fmt;

use crate::error::ScanError;

/// The scope at which a failure occurred.
///
/// `resource` is present only for per-resource failures; account- and
/// region-scoped failures leave it empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location {
    pub index: &'static str,
    pub account: String,
    pub region: String,
    pub resource: Option<String>,
}

impl Location {
    /// An account/region-scoped location.
    pub fn scope(index: &'static str, account: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            index,
            account: account.into(),
            region: region.into(),
            resource: None,
        }
    }

    /// A resource-scoped location.
    pub fn resource(
        index: &'static str,
        account: impl Into<String>,
        region: impl Into<String>,
        resource: impl Into<String>,
    ) -> Self {
        Self {
            index,
            account: account.into(),
            region: region.into(),
            resource: Some(resource.into()),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.index, self.account, self.region)?;
        if let Some(resource) = &self.resource {
            write!(f, "/{resource}")?;
        }
        Ok(())
    }
}

/// Map from failure scope to the error observed there, one per scan run.
pub type ExceptionMap = HashMap<Location, ScanError>;

/// Accumulates failures for one scan run.
///
/// Recording never fails and has no side effect beyond the map mutation and
/// a warn-level log line. A later failure at the same location overwrites
/// the earlier one.
#[derive(Debug, Default)]
pub struct ExceptionRecorder {
    map: ExceptionMap,
}

impl ExceptionRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, location: Location, error: ScanError) {
        tracing::warn!(%location, %error, "recording scan exception");
        self.map.insert(location, error);
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Consume the recorder at the end of a scan.
    pub fn into_map(self) -> ExceptionMap {
        self.map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_at_most_one_error_per_location() {
        let mut recorder = ExceptionRecorder::new();
        let location = Location::resource("topic", "acct-a", "us-east-1", "arn:topic/reports");

        recorder.record(location.clone(), ScanError::malformed("policy", "truncated"));
        recorder.record(location.clone(), ScanError::malformed("subscriptions", "not a list"));

        assert_eq!(recorder.len(), 1);
        let map = recorder.into_map();
        match map.get(&location) {
            Some(ScanError::MalformedPayload { field, .. }) => assert_eq!(field, "subscriptions"),
            other => panic!("unexpected entry: {other:?}"),
        }
    }

    #[test]
    fn scope_and_resource_locations_are_distinct_keys() {
        let mut recorder = ExceptionRecorder::new();
        recorder.record(
            Location::scope("user", "acct-a", "universal"),
            ScanError::Connectivity(anyhow::anyhow!("credentials rejected")),
        );
        recorder.record(
            Location::resource("user", "acct-a", "universal", "alice"),
            ScanError::malformed("accesskeys", "bad payload"),
        );

        assert_eq!(recorder.len(), 2);
    }

    #[test]
    fn location_display_includes_resource_when_present() {
        let scope = Location::scope("topic", "acct-a", "eu-west-1");
        assert_eq!(scope.to_string(), "topic/acct-a/eu-west-1");

        let resource = Location::resource("topic", "acct-a", "eu-west-1", "arn:topic/reports");
        assert_eq!(resource.to_string(), "topic/acct-a/eu-west-1/arn:topic/reports");
    }
}
