//! Change items
//!
//! A [`ChangeItem`] is the immutable record of one resource's observed
//! configuration at scan time. Later components diff items from successive
//! scans; this crate only produces them.

use serde::Serialize;
use serde_json::Value;

/// Region value used for technologies that are global rather than
/// region-scoped.
pub const UNIVERSAL_REGION: &str = "universal";

/// One resource's observed configuration at scan time.
///
/// Identity is `(index, region, account, name)`, unique within one scan's
/// output. The configuration payload is opaque to the framework; its shape
/// belongs to the resource-specific adapter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangeItem {
    index: &'static str,
    region: String,
    account: String,
    name: String,
    config: Value,
}

impl ChangeItem {
    pub fn new(
        index: &'static str,
        region: impl Into<String>,
        account: impl Into<String>,
        name: impl Into<String>,
        config: Value,
    ) -> Self {
        Self {
            index,
            region: region.into(),
            account: account.into(),
            name: name.into(),
            config,
        }
    }

    pub fn index(&self) -> &'static str {
        self.index
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn account(&self) -> &str {
        &self.account
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &Value {
        &self.config
    }

    /// The identity tuple under which this item is keyed.
    pub fn location(&self) -> (&str, &str, &str, &str) {
        (self.index, &self.region, &self.account, &self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn location_tuple_matches_fields() {
        let item = ChangeItem::new(
            "topic",
            UNIVERSAL_REGION,
            "acct-a",
            "reports",
            json!({"subscriptions": []}),
        );
        assert_eq!(item.location(), ("topic", "universal", "acct-a", "reports"));
    }

    #[test]
    fn serializes_with_config_payload() {
        let item = ChangeItem::new("user", "universal", "acct-a", "alice", json!({"mfadevices": {}}));
        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value["index"], "user");
        assert_eq!(value["config"]["mfadevices"], json!({}));
    }
}
