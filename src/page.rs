//! Cursor-based pagination
//!
//! Remote listing APIs come in two observed conventions: a bare "next token"
//! whose absence signals completion, and an explicit "truncated" flag paired
//! with a marker value. [`PaginationMode`] is chosen per API at configuration
//! time so the walk never has to sniff response shapes at runtime.

use std::future::Future;

use serde_json::Value;

use crate::error::ScanError;

/// Upper bound on pages walked per listing when the caller does not supply
/// their own cap.
pub const DEFAULT_MAX_PAGES: usize = 1_000;

/// One page returned by a listing call.
///
/// Both continuation conventions are carried as plain typed fields; which of
/// them decides continuation is the [`PaginationMode`]'s business.
#[derive(Debug, Clone, Default)]
pub struct Page {
    /// Items in the order the provider returned them.
    pub items: Vec<Value>,
    /// Continuation token ("next token" convention).
    pub next_token: Option<String>,
    /// Truncation flag ("flag plus marker" convention).
    pub truncated: bool,
    /// Marker accompanying the truncation flag.
    pub marker: Option<String>,
}

impl Page {
    /// A final page: no continuation under either convention.
    pub fn complete(items: Vec<Value>) -> Self {
        Self {
            items,
            ..Self::default()
        }
    }

    /// A page continued by a next token.
    pub fn with_token(items: Vec<Value>, token: impl Into<String>) -> Self {
        Self {
            items,
            next_token: Some(token.into()),
            ..Self::default()
        }
    }

    /// A truncated page continued by a marker.
    pub fn with_marker(items: Vec<Value>, marker: impl Into<String>) -> Self {
        Self {
            items,
            truncated: true,
            marker: Some(marker.into()),
            ..Self::default()
        }
    }
}

/// Which continuation convention a listing API speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaginationMode {
    /// Presence of a next token means more pages exist.
    NextToken,
    /// A truncation flag plus a separate marker value; the flag alone
    /// decides continuation.
    Truncation,
}

impl PaginationMode {
    /// Cursor for the following page, or `None` when the walk is complete.
    pub fn next_cursor(&self, page: &Page) -> Option<String> {
        match self {
            Self::NextToken => page.next_token.clone(),
            Self::Truncation => {
                if page.truncated {
                    page.marker.clone()
                } else {
                    None
                }
            }
        }
    }
}

/// Walk a listing API to completion and return every item in order.
///
/// `fetch_page` is invoked with `None` first and then with each cursor the
/// previous page produced. The walk terminates when the mode reports no next
/// cursor, and defensively when a provider returns an empty page with a live
/// cursor or when `max_pages` is reached (some APIs hand back a non-empty
/// cursor forever).
pub async fn paginate<F, Fut>(
    mode: PaginationMode,
    max_pages: usize,
    mut fetch_page: F,
) -> Result<Vec<Value>, ScanError>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<Page, ScanError>>,
{
    let items = paginate_optional(mode, max_pages, |cursor| {
        let fut = fetch_page(cursor);
        async move { fut.await.map(Some) }
    })
    .await?;
    Ok(items.unwrap_or_default())
}

/// Like [`paginate`], for sub-fetches whose absence is meaningful.
///
/// A `None` page on the first fetch means the sub-resource is not configured
/// at all and yields `Ok(None)`; a `None` on a later fetch simply ends the
/// walk with what was gathered so far.
pub async fn paginate_optional<F, Fut>(
    mode: PaginationMode,
    max_pages: usize,
    mut fetch_page: F,
) -> Result<Option<Vec<Value>>, ScanError>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<Option<Page>, ScanError>>,
{
    let mut all_items = Vec::new();
    let mut cursor: Option<String> = None;
    let mut pages = 0usize;

    loop {
        let Some(page) = fetch_page(cursor.take()).await? else {
            if pages == 0 {
                return Ok(None);
            }
            break;
        };
        pages += 1;

        let next = mode.next_cursor(&page);
        let page_was_empty = page.items.is_empty();
        all_items.extend(page.items);

        match next {
            Some(_) if page_was_empty => {
                tracing::warn!(pages, "provider returned an empty page with a live cursor, stopping");
                break;
            }
            Some(_) if pages >= max_pages => {
                tracing::warn!(pages, "page cap reached before the listing completed, stopping");
                break;
            }
            Some(next_cursor) => cursor = Some(next_cursor),
            None => break,
        }
    }

    Ok(Some(all_items))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn names(items: &[Value]) -> Vec<&str> {
        items.iter().filter_map(|v| v.as_str()).collect()
    }

    #[tokio::test]
    async fn next_token_walk_concatenates_in_order() {
        let items = paginate(PaginationMode::NextToken, DEFAULT_MAX_PAGES, |cursor| async move {
            Ok(match cursor.as_deref() {
                None => Page::with_token(vec![json!("a"), json!("b")], "p2"),
                Some("p2") => Page::with_token(vec![json!("c")], "p3"),
                Some("p3") => Page::complete(vec![json!("d")]),
                Some(other) => panic!("unexpected cursor {other}"),
            })
        })
        .await
        .unwrap();

        assert_eq!(names(&items), vec!["a", "b", "c", "d"]);
    }

    #[tokio::test]
    async fn truncation_walk_stops_when_flag_clears() {
        let items = paginate(PaginationMode::Truncation, DEFAULT_MAX_PAGES, |cursor| async move {
            Ok(match cursor.as_deref() {
                None => Page::with_marker(vec![json!("a")], "m1"),
                Some("m1") => Page::with_marker(vec![json!("b")], "m2"),
                // Marker still present but the flag is down: must terminate.
                Some("m2") => Page {
                    items: vec![json!("c")],
                    marker: Some("stale".into()),
                    ..Page::default()
                },
                Some(other) => panic!("unexpected marker {other}"),
            })
        })
        .await
        .unwrap();

        assert_eq!(names(&items), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn empty_page_with_live_cursor_terminates() {
        let calls = AtomicUsize::new(0);
        let items = paginate(PaginationMode::NextToken, DEFAULT_MAX_PAGES, |_cursor| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok(Page::with_token(vec![], "again")) }
        })
        .await
        .unwrap();

        assert!(items.is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn page_cap_bounds_a_cursor_that_never_ends() {
        let items = paginate(PaginationMode::NextToken, 5, |_cursor| async {
            Ok(Page::with_token(vec![json!("x")], "again"))
        })
        .await
        .unwrap();

        assert_eq!(items.len(), 5);
    }

    #[tokio::test]
    async fn fetch_error_propagates() {
        let result = paginate(PaginationMode::NextToken, DEFAULT_MAX_PAGES, |_cursor| async {
            Err::<Page, _>(ScanError::Connectivity(anyhow::anyhow!("boom")))
        })
        .await;

        assert!(matches!(result, Err(ScanError::Connectivity(_))));
    }

    #[tokio::test]
    async fn optional_absent_on_first_page_is_none() {
        let result = paginate_optional(PaginationMode::NextToken, DEFAULT_MAX_PAGES, |_cursor| async {
            Ok(None)
        })
        .await
        .unwrap();

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn optional_absent_mid_walk_keeps_gathered_items() {
        let result = paginate_optional(PaginationMode::NextToken, DEFAULT_MAX_PAGES, |cursor| async move {
            Ok(match cursor.as_deref() {
                None => Some(Page::with_token(vec![json!("a")], "p2")),
                Some(_) => None,
            })
        })
        .await
        .unwrap();

        assert_eq!(names(&result.unwrap()), vec!["a"]);
    }
}
