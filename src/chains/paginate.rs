//! Cursor paging and bounded fan-out
//!
//! - [`paginate`]: sequential cursor-driven page stream
//! - [`bounded_map`]: run an async function over items with a cap on
//!   in-flight calls

use futures_util::stream::{self, Stream, StreamExt};
use std::future::Future;

/// One page of a cursor-paginated listing
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Cursor of the next page; `None` (or empty) on the last page
    pub next: Option<String>,
}

enum Cursor {
    Start,
    Next(String),
    Done,
}

/// Stream pages by following `next` cursors
///
/// Pages are fetched one after the other. The stream ends after the last
/// page, after the first error, after `max_pages` pages, or when the
/// server hands back the cursor it was just given.
pub fn paginate<T, E, F, Fut>(max_pages: usize, fetch: F) -> impl Stream<Item = Result<Vec<T>, E>>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<Page<T>, E>>,
{
    stream::unfold(
        (Cursor::Start, fetch, 0usize),
        move |(cursor, mut fetch, fetched)| async move {
            let current = match cursor {
                Cursor::Start => None,
                Cursor::Next(c) => Some(c),
                Cursor::Done => return None,
            };

            if fetched >= max_pages {
                tracing::warn!(max_pages, "Stopped paging at page limit");
                return None;
            }

            match fetch(current.clone()).await {
                Ok(page) => {
                    let next = match page.next {
                        Some(c) if !c.is_empty() && Some(&c) != current.as_ref() => Cursor::Next(c),
                        _ => Cursor::Done,
                    };
                    Some((Ok(page.items), (next, fetch, fetched + 1)))
                }
                Err(e) => Some((Err(e), (Cursor::Done, fetch, fetched + 1))),
            }
        },
    )
}

/// Apply `f` to every item with at most `limit` calls in flight
///
/// Output order follows completion, not input order.
pub async fn bounded_map<I, T, F, Fut, R>(items: I, limit: usize, f: F) -> Vec<R>
where
    I: IntoIterator<Item = T>,
    F: FnMut(T) -> Fut,
    Fut: Future<Output = R>,
{
    stream::iter(items)
        .map(f)
        .buffer_unordered(limit.max(1))
        .collect()
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::TryStreamExt;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn pages() -> Vec<Page<u32>> {
        vec![
            Page { items: vec![1, 2], next: Some("b".to_string()) },
            Page { items: vec![3], next: Some("c".to_string()) },
            Page { items: vec![4, 5], next: None },
        ]
    }

    fn cursor_index(cursor: Option<String>) -> usize {
        match cursor.as_deref() {
            None => 0,
            Some("b") => 1,
            Some("c") => 2,
            Some(other) => panic!("unexpected cursor {}", other),
        }
    }

    #[tokio::test]
    async fn test_paginate_follows_cursors() {
        let all = pages();
        let collected: Vec<Vec<u32>> = paginate(10, |cursor| {
            let page = all[cursor_index(cursor)].clone();
            async move { Ok::<_, String>(page) }
        })
        .try_collect()
        .await
        .unwrap();

        let flat: Vec<u32> = collected.into_iter().flatten().collect();
        assert_eq!(flat, vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn test_paginate_respects_page_limit() {
        let all = pages();
        let collected: Vec<Vec<u32>> = paginate(2, |cursor| {
            let page = all[cursor_index(cursor)].clone();
            async move { Ok::<_, String>(page) }
        })
        .try_collect()
        .await
        .unwrap();
        assert_eq!(collected.len(), 2);
    }

    #[tokio::test]
    async fn test_paginate_stops_on_repeated_cursor() {
        let calls = AtomicUsize::new(0);
        let collected: Vec<Vec<u32>> = paginate(100, |_cursor| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, String>(Page { items: vec![1], next: Some("same".to_string()) }) }
        })
        .try_collect()
        .await
        .unwrap();

        // first page (no cursor) + one page with "same" which echoes it back
        assert_eq!(collected.len(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_paginate_stops_after_error() {
        let results: Vec<Result<Vec<u32>, String>> = paginate(10, |cursor| async move {
            match cursor {
                None => Ok(Page { items: vec![1], next: Some("x".to_string()) }),
                Some(_) => Err("boom".to_string()),
            }
        })
        .collect()
        .await;

        assert_eq!(results.len(), 2);
        assert!(results[1].is_err());
    }

    #[tokio::test]
    async fn test_bounded_map_caps_concurrency() {
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let mut out = bounded_map(0..20u32, 3, |i| {
            let in_flight = in_flight.clone();
            let peak = peak.clone();
            async move {
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(std::time::Duration::from_millis(5)).await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
                i * 2
            }
        })
        .await;

        out.sort();
        assert_eq!(out, (0..20u32).map(|i| i * 2).collect::<Vec<_>>());
        assert!(peak.load(Ordering::SeqCst) <= 3);
    }
}
