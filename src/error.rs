//! Error taxonomy for scan runs
//!
//! Nothing raised inside per-resource or per-sub-fetch processing escapes a
//! scan: every failure is funneled into the scan's
//! [`ExceptionRecorder`](crate::recorder::ExceptionRecorder) at the narrowest
//! scope that preserves forward progress. The variants here describe how far
//! a failure reaches, not which API produced it.

use thiserror::Error;

/// A failure observed while scanning a provider account.
///
/// Note that "optional sub-resource is absent" is deliberately not a variant:
/// adapters report it as `Ok(None)` so it can never be conflated with a real
/// error.
#[derive(Debug, Error)]
pub enum ScanError {
    /// A remote session could not be established, or a non-retryable
    /// transport error occurred. Abandons the remaining work for the
    /// account/region (or, at resource scope, the affected field).
    #[error("connectivity failure: {0}")]
    Connectivity(#[from] anyhow::Error),

    /// The provider throttled the call. Handled inside the retry wrapper;
    /// surfaces as [`ScanError::Connectivity`] once the retry budget is
    /// exhausted.
    #[error("rate limit exceeded")]
    RateLimited,

    /// A configuration field could not be decoded into structured data.
    /// The owning resource is still emitted without that field.
    #[error("malformed payload in field '{field}': {reason}")]
    MalformedPayload { field: String, reason: String },

    /// A resource name could not be derived from its provider-assigned
    /// identity string. The resource is still emitted under its raw identity.
    #[error("could not derive a name from identity '{identity}'")]
    IdentityParse { identity: String },
}

impl ScanError {
    /// Build a [`ScanError::MalformedPayload`] for a named configuration field.
    pub fn malformed(field: impl Into<String>, reason: impl ToString) -> Self {
        Self::MalformedPayload {
            field: field.into(),
            reason: reason.to_string(),
        }
    }

    /// True when this error would be retried by the rate-limit wrapper.
    pub fn is_throttle(&self) -> bool {
        matches!(self, Self::RateLimited)
    }
}
