//! Offset/count pagination.
//!
//! List endpoints answer either with a bare JSON array or with an envelope
//! `{"count": N, "next": ..., "results": [...]}`. [`Page::from_value`]
//! normalizes both shapes; [`PageCursor`] plans the successive windows and is
//! driven by [`aggregate`] (async) or [`aggregate_blocking`].

use crate::error::ApiError;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::future::Future;

/// Largest `count` asked of the server in a single call.
pub const DEFAULT_PAGE_SIZE: usize = 1000;

/// One normalized response of a list endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Total result count advertised by the envelope, if any.
    pub total: Option<usize>,
    /// `false` when the envelope's `next` link is null.
    pub has_more: Option<bool>,
    /// Whether the response used the `results` envelope.
    pub enveloped: bool,
}

impl<T: DeserializeOwned> Page<T> {
    pub fn from_value(value: Value, endpoint: &str) -> Result<Self, ApiError> {
        match value {
            Value::Array(items) => Ok(Page {
                items: decode_items(items, endpoint)?,
                total: None,
                has_more: None,
                enveloped: false,
            }),
            Value::Object(mut map) => {
                let items = match map.remove("results") {
                    Some(Value::Array(items)) => items,
                    Some(_) => return Err(shape_error(endpoint, "'results' is not an array")),
                    None => return Err(shape_error(endpoint, "missing 'results' array")),
                };
                let total = map
                    .get("count")
                    .and_then(Value::as_u64)
                    .map(|count| count as usize);
                let has_more = map.get("next").map(|next| !next.is_null());

                Ok(Page {
                    items: decode_items(items, endpoint)?,
                    total,
                    has_more,
                    enveloped: true,
                })
            }
            _ => Err(shape_error(endpoint, "expected a JSON array or object")),
        }
    }
}

fn decode_items<T: DeserializeOwned>(items: Vec<Value>, endpoint: &str) -> Result<Vec<T>, ApiError> {
    items
        .into_iter()
        .map(|item| {
            serde_json::from_value(item)
                .map_err(|e| crate::utils::error_helpers::convert_json_error(e, endpoint))
        })
        .collect()
}

fn shape_error(endpoint: &str, message: &str) -> ApiError {
    ApiError::Decode {
        endpoint: endpoint.to_string(),
        message: message.to_string(),
    }
}

/// How many results the caller wants and how many to ask for per call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub requested: usize,
    pub page_size: usize,
}

impl PageRequest {
    pub fn new(requested: usize, page_size: usize) -> Self {
        Self {
            requested,
            page_size: page_size.max(1),
        }
    }
}

/// The `offset`/`count` pair of a single underlying call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub offset: usize,
    pub count: usize,
}

impl PageWindow {
    pub fn query(&self) -> [(String, String); 2] {
        [
            ("count".to_string(), self.count.to_string()),
            ("offset".to_string(), self.offset.to_string()),
        ]
    }
}

#[derive(Debug)]
pub struct PageCursor {
    request: PageRequest,
    offset: usize,
    collected: usize,
    exhausted: bool,
}

impl PageCursor {
    pub fn new(request: PageRequest) -> Self {
        Self {
            request,
            offset: 0,
            collected: 0,
            exhausted: false,
        }
    }

    /// Window for the next call, or `None` once the request is satisfied.
    pub fn next_window(&self) -> Option<PageWindow> {
        if self.exhausted || self.collected >= self.request.requested {
            return None;
        }
        let remaining = self.request.requested - self.collected;
        Some(PageWindow {
            offset: self.offset,
            count: remaining.min(self.request.page_size),
        })
    }

    /// Record a received page fetched with `window`.
    pub fn absorb<T>(&mut self, window: PageWindow, page: &Page<T>) {
        let received = page.items.len();
        self.collected += received;
        self.offset += received;

        let short_page = received < window.count;
        let total_reached = page.total.is_some_and(|total| self.offset >= total);
        if !page.enveloped
            || received == 0
            || short_page
            || total_reached
            || page.has_more == Some(false)
        {
            self.exhausted = true;
        }
    }
}

/// Collect up to `request.requested` items, suspending only inside `fetch`.
pub async fn aggregate<T, F, Fut>(request: PageRequest, mut fetch: F) -> Result<Vec<T>, ApiError>
where
    F: FnMut(PageWindow) -> Fut,
    Fut: Future<Output = Result<Page<T>, ApiError>>,
{
    let mut cursor = PageCursor::new(request);
    let mut items = Vec::with_capacity(request.requested.min(request.page_size));

    while let Some(window) = cursor.next_window() {
        log::debug!(
            "Fetching page offset={} count={}",
            window.offset,
            window.count
        );
        let page = fetch(window).await?;
        cursor.absorb(window, &page);
        items.extend(page.items);
    }

    items.truncate(request.requested);
    Ok(items)
}

/// Blocking twin of [`aggregate`].
pub fn aggregate_blocking<T, F>(request: PageRequest, mut fetch: F) -> Result<Vec<T>, ApiError>
where
    F: FnMut(PageWindow) -> Result<Page<T>, ApiError>,
{
    let mut cursor = PageCursor::new(request);
    let mut items = Vec::with_capacity(request.requested.min(request.page_size));

    while let Some(window) = cursor.next_window() {
        log::debug!(
            "Fetching page offset={} count={}",
            window.offset,
            window.count
        );
        let page = fetch(window)?;
        cursor.absorb(window, &page);
        items.extend(page.items);
    }

    items.truncate(request.requested);
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::Cell;

    fn server_page(data: &[u32], window: PageWindow) -> Page<u32> {
        let start = window.offset.min(data.len());
        let end = (window.offset + window.count).min(data.len());
        Page {
            items: data[start..end].to_vec(),
            total: None,
            has_more: None,
            enveloped: true,
        }
    }

    #[test]
    fn test_page_from_bare_array() {
        let page: Page<u32> = Page::from_value(json!([1, 2, 3]), "/api/repository/").unwrap();
        assert_eq!(page.items, vec![1, 2, 3]);
        assert!(!page.enveloped);
        assert_eq!(page.total, None);
    }

    #[test]
    fn test_page_from_envelope() {
        let value = json!({"count": 10, "next": "http://x/?page=2", "results": [4, 5]});
        let page: Page<u32> = Page::from_value(value, "/api/jobs/").unwrap();
        assert_eq!(page.items, vec![4, 5]);
        assert!(page.enveloped);
        assert_eq!(page.total, Some(10));
        assert_eq!(page.has_more, Some(true));

        let value = json!({"meta": {"count": 1}, "results": [7]});
        let page: Page<u32> = Page::from_value(value, "/api/jobs/").unwrap();
        assert_eq!(page.total, None);
        assert_eq!(page.has_more, None);
    }

    #[test]
    fn test_page_rejects_unexpected_shapes() {
        assert!(Page::<u32>::from_value(json!({"detail": "x"}), "/e/").is_err());
        assert!(Page::<u32>::from_value(json!({"results": 3}), "/e/").is_err());
        assert!(Page::<u32>::from_value(json!("text"), "/e/").is_err());
        assert!(Page::<u32>::from_value(json!(["a"]), "/e/").is_err());
    }

    #[test]
    fn test_cursor_windows() {
        let mut cursor = PageCursor::new(PageRequest::new(25, 10));
        let first = cursor.next_window().unwrap();
        assert_eq!(first, PageWindow { offset: 0, count: 10 });

        let page = Page {
            items: vec![0; 10],
            total: None,
            has_more: None,
            enveloped: true,
        };
        cursor.absorb(first, &page);
        let second = cursor.next_window().unwrap();
        assert_eq!(second, PageWindow { offset: 10, count: 10 });
        cursor.absorb(second, &page);
        assert_eq!(
            cursor.next_window(),
            Some(PageWindow { offset: 20, count: 5 })
        );
    }

    #[test]
    fn test_window_query() {
        let window = PageWindow { offset: 20, count: 5 };
        assert_eq!(
            window.query(),
            [
                ("count".to_string(), "5".to_string()),
                ("offset".to_string(), "20".to_string())
            ]
        );
    }

    #[test]
    fn test_aggregate_counts_and_call_bounds() {
        let data: Vec<u32> = (0..57).collect();
        for page_size in [1, 7, 10, 57, 100] {
            for requested in [1, 6, 7, 8, 50, 57, 58, 200] {
                let calls = Cell::new(0usize);
                let result = aggregate_blocking(PageRequest::new(requested, page_size), |w| {
                    calls.set(calls.get() + 1);
                    Ok(server_page(&data, w))
                })
                .unwrap();

                let expected = requested.min(data.len());
                assert_eq!(result, data[..expected].to_vec());
                let bound = requested.div_ceil(page_size);
                assert!(
                    calls.get() <= bound,
                    "requested={requested} page_size={page_size} calls={}",
                    calls.get()
                );
            }
        }
    }

    #[test]
    fn test_aggregate_stops_on_total_hint() {
        let calls = Cell::new(0usize);
        let result = aggregate_blocking(PageRequest::new(10, 2), |w| {
            calls.set(calls.get() + 1);
            Ok(Page {
                items: vec![w.offset as u32, w.offset as u32 + 1],
                total: Some(4),
                has_more: None,
                enveloped: true,
            })
        })
        .unwrap();
        assert_eq!(result, vec![0, 1, 2, 3]);
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_aggregate_stops_when_next_is_null() {
        let calls = Cell::new(0usize);
        let result = aggregate_blocking(PageRequest::new(10, 2), |_| {
            calls.set(calls.get() + 1);
            Ok(Page {
                items: vec![1, 2],
                total: None,
                has_more: Some(false),
                enveloped: true,
            })
        })
        .unwrap();
        assert_eq!(result, vec![1, 2]);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_aggregate_short_circuits_flat_lists() {
        let calls = Cell::new(0usize);
        let result = aggregate_blocking(PageRequest::new(3, 2), |_| {
            calls.set(calls.get() + 1);
            Ok(Page {
                items: vec![1, 2, 3, 4, 5],
                total: None,
                has_more: None,
                enveloped: false,
            })
        })
        .unwrap();
        assert_eq!(result, vec![1, 2, 3]);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_aggregate_discards_partial_results_on_error() {
        let data: Vec<u32> = (0..30).collect();
        let result = aggregate_blocking(PageRequest::new(30, 10), |w| {
            if w.offset >= 20 {
                return Err(ApiError::Http {
                    status: 500,
                    endpoint: "/api/project/try/jobs/".to_string(),
                    message: "boom".to_string(),
                });
            }
            Ok(server_page(&data, w))
        });
        assert!(matches!(result, Err(ApiError::Http { status: 500, .. })));
    }

    #[test]
    fn test_aggregate_zero_requested_makes_no_calls() {
        let calls = Cell::new(0usize);
        let result: Vec<u32> = aggregate_blocking(PageRequest::new(0, 10), |_| {
            calls.set(calls.get() + 1);
            Ok(Page {
                items: vec![1],
                total: None,
                has_more: None,
                enveloped: true,
            })
        })
        .unwrap();
        assert!(result.is_empty());
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_async_aggregate_matches_blocking() {
        let data: Vec<u32> = (0..23).collect();
        let request = PageRequest::new(20, 6);

        let blocking = aggregate_blocking(request, |w| Ok(server_page(&data, w))).unwrap();
        let suspending = tokio_test::block_on(aggregate(request, |w| {
            let page = server_page(&data, w);
            async move { Ok(page) }
        }))
        .unwrap();

        assert_eq!(blocking, suspending);
        assert_eq!(suspending.len(), 20);
    }
}
