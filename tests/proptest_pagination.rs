//! Property-based tests for the paginator
//!
//! For any scripted sequence of pages, the walk must return exactly the
//! concatenation of all pages' items in order, under both continuation
//! conventions.

use proptest::prelude::*;
use serde_json::{json, Value};

use driftwatch::page::{paginate, Page, PaginationMode};

/// Pages of at least one item each; empty mid-walk pages are the defensive
/// termination case and are covered by unit tests.
fn arb_pages() -> impl Strategy<Value = Vec<Vec<String>>> {
    prop::collection::vec(prop::collection::vec("[a-z0-9]{1,8}", 1..5), 1..8)
}

fn scripted_page(pages: &[Vec<String>], page_no: usize, mode: PaginationMode) -> Page {
    let items: Vec<Value> = pages[page_no].iter().map(|s| json!(s)).collect();
    let is_last = page_no + 1 == pages.len();
    match mode {
        _ if is_last => Page::complete(items),
        PaginationMode::NextToken => Page::with_token(items, (page_no + 1).to_string()),
        PaginationMode::Truncation => Page::with_marker(items, (page_no + 1).to_string()),
    }
}

fn walk(pages: Vec<Vec<String>>, mode: PaginationMode) -> Vec<String> {
    tokio_test::block_on(async {
        let pages = &pages;
        let items = paginate(mode, 1_000, |cursor| async move {
            let page_no: usize = match cursor.as_deref() {
                None => 0,
                Some(token) => token.parse().expect("scripted cursor"),
            };
            Ok(scripted_page(pages, page_no, mode))
        })
        .await
        .expect("scripted walk cannot fail");

        items
            .into_iter()
            .filter_map(|v| v.as_str().map(String::from))
            .collect()
    })
}

proptest! {
    #[test]
    fn next_token_walk_equals_concatenation(pages in arb_pages()) {
        let expected: Vec<String> = pages.iter().flatten().cloned().collect();
        prop_assert_eq!(walk(pages, PaginationMode::NextToken), expected);
    }

    #[test]
    fn truncation_walk_equals_concatenation(pages in arb_pages()) {
        let expected: Vec<String> = pages.iter().flatten().cloned().collect();
        prop_assert_eq!(walk(pages, PaginationMode::Truncation), expected);
    }
}
