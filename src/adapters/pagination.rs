//! Cursor pagination
//!
//! Edumate and Sentral both return an absolute URL for the next page; they
//! only differ in where it lives. A page without its pagination container
//! is malformed and reported as such instead of being read as the last page.

use crate::domain::{Result, VendorError, VendorKind};
use serde_json::Value;
use std::collections::HashSet;
use std::future::Future;

/// Where the next-page URL is found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorStyle {
    /// `{"pagination": {"next": "..."}}` (Edumate)
    PaginationNext,
    /// `{"links": {"next": "..."}}` (Sentral, JSON:API)
    LinksNext,
}

impl CursorStyle {
    fn container(&self) -> &'static str {
        match self {
            CursorStyle::PaginationNext => "pagination",
            CursorStyle::LinksNext => "links",
        }
    }
}

/// Records accumulated over every page
#[derive(Debug, Default)]
pub struct Pages {
    /// Concatenated `data` arrays
    pub data: Vec<Value>,
    /// Concatenated `included` arrays (JSON:API side-loads)
    pub included: Vec<Value>,
    /// Number of pages fetched
    pub pages: usize,
}

/// Read the next-page URL from `page`
///
/// A missing, `null`, `false` or empty `next` ends pagination. A missing
/// container or a `next` of any other type is an invalid response.
pub fn next_cursor(vendor: VendorKind, style: CursorStyle, page: &Value) -> Result<Option<String>> {
    let container = page
        .get(style.container())
        .filter(|c| c.is_object())
        .ok_or_else(|| {
            VendorError::invalid_response(
                vendor.to_string(),
                format!("page has no `{}` object", style.container()),
            )
        })?;

    match container.get("next") {
        None | Some(Value::Null) | Some(Value::Bool(false)) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(VendorError::invalid_response(
            vendor.to_string(),
            format!("`{}.next` is not a URL: {other}", style.container()),
        )
        .into()),
    }
}

/// The `data` array of a page
pub fn page_data(vendor: VendorKind, page: &Value) -> Result<&Vec<Value>> {
    page.get("data")
        .and_then(Value::as_array)
        .ok_or_else(|| VendorError::invalid_response(vendor.to_string(), "page has no `data` array").into())
}

/// Follow next-page URLs from `first_url` until exhausted
///
/// `fetch` performs one GET. The loop fails on a repeated URL and when
/// `max_pages` is exceeded.
pub async fn collect_pages<F, Fut>(
    vendor: VendorKind,
    style: CursorStyle,
    first_url: String,
    max_pages: usize,
    mut fetch: F,
) -> Result<Pages>
where
    F: FnMut(String, bool) -> Fut,
    Fut: Future<Output = Result<Value>>,
{
    let mut pages = Pages::default();
    let mut seen: HashSet<String> = HashSet::new();
    let mut url = first_url;
    let mut first = true;

    loop {
        if pages.pages >= max_pages {
            return Err(VendorError::invalid_response(
                vendor.to_string(),
                format!("pagination exceeded {max_pages} pages"),
            )
            .into());
        }
        seen.insert(url.clone());

        let page = fetch(url.clone(), first).await?;
        first = false;
        pages.pages += 1;

        pages.data.extend(page_data(vendor, &page)?.iter().cloned());
        if let Some(included) = page.get("included").and_then(Value::as_array) {
            pages.included.extend(included.iter().cloned());
        }

        tracing::debug!(
            vendor = %vendor,
            page = pages.pages,
            records = pages.data.len(),
            "Fetched page"
        );

        match next_cursor(vendor, style, &page)? {
            Some(next) if seen.contains(&next) => {
                return Err(VendorError::invalid_response(
                    vendor.to_string(),
                    format!("pagination loop detected at {next}"),
                )
                .into());
            }
            Some(next) => url = next,
            None => return Ok(pages),
        }
    }
}
