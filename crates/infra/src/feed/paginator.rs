use futures::stream::{Stream, StreamExt};
use tracing::debug;

use crate::db::{scan_posts, DbPool, PostsRepoError};
use housing_core::domain::keyword::KeywordMatcher;
use housing_core::domain::pagination::{Page, PageCursor, PageRequest, PageScan, ScanStep};
use housing_core::domain::post::Post;
use housing_core::domain::predicates::PostFilter;
use housing_core::types::move_date::DateWindow;

/// Walks `source` (already positioned at `start`) until the page is full or
/// the source ends. A source error fails the whole page.
pub async fn collect_page<S, E>(
    source: S,
    start: PageCursor,
    filter: &PostFilter<'_>,
) -> Result<Page, E>
where
    S: Stream<Item = Result<Post, E>>,
{
    let mut source = Box::pin(source);
    let mut scan = PageScan::new(start);
    let mut exhausted = true;
    while let Some(item) = source.next().await {
        let post = item?;
        let matched = filter.matches(&post);
        if scan.push(post, matched) == ScanStep::Full {
            exhausted = false;
            break;
        }
    }
    drop(source);

    let page = scan.finish(exhausted);
    debug!(
        start = start.offset(),
        scanned = page.results.len(),
        matched = page.matched,
        exhausted,
        "page scan finished"
    );
    Ok(page)
}

pub async fn fetch_page(
    pool: &DbPool,
    request: &PageRequest,
    window: DateWindow,
    matcher: &KeywordMatcher,
) -> Result<Page, PostsRepoError> {
    let filter = PostFilter::new(&request.criteria, window, matcher);
    let source = scan_posts(pool, request.cursor.offset());
    collect_page(source, request.cursor, &filter).await
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::convert::Infallible;
    use std::pin::Pin;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::task::{Context, Poll};

    use chrono::{Duration, TimeZone, Utc};
    use futures::stream;

    use super::*;
    use housing_core::domain::filter::{FilterCriteria, SearchTypeFilter};
    use housing_core::domain::pagination::{PageResponse, PAGE_SIZE};
    use housing_core::domain::post::{Author, PostType};

    fn post(index: usize, post_type: PostType, message: &str) -> Post {
        let newest = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        Post {
            id: format!("p{index:03}"),
            message: message.to_string(),
            created_at: newest - Duration::minutes(index as i64),
            author: Author::default(),
            post_type,
            duration: None,
            price_range: None,
            amenities: Vec::new(),
            desired_gender: None,
        }
    }

    /// `count` posts in feed order where every `every`-th one is an offer.
    fn feed(count: usize, every: usize) -> Vec<Post> {
        (0..count)
            .map(|index| {
                let post_type = if index % every == every - 1 {
                    PostType::OfferingLease
                } else {
                    PostType::SearchingForLease
                };
                post(index, post_type, "room available")
            })
            .collect()
    }

    fn source(
        posts: &[Post],
        cursor: PageCursor,
    ) -> impl Stream<Item = Result<Post, Infallible>> + '_ {
        let skip = usize::try_from(cursor.offset()).unwrap();
        stream::iter(posts.iter().skip(skip).cloned().map(Ok))
    }

    fn offers() -> FilterCriteria {
        FilterCriteria {
            search_type: SearchTypeFilter::Offering,
            ..FilterCriteria::default()
        }
    }

    async fn page_at(posts: &[Post], cursor: PageCursor, criteria: &FilterCriteria) -> Page {
        let matcher = KeywordMatcher::default();
        let filter = PostFilter::new(criteria, DateWindow::default(), &matcher);
        collect_page(source(posts, cursor), cursor, &filter)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn sparse_matches_scan_until_page_is_full() {
        let posts = feed(PAGE_SIZE * 3, 3);
        let page = page_at(&posts, PageCursor::START, &offers()).await;
        assert_eq!(page.matched, PAGE_SIZE);
        assert_eq!(page.results.len(), PAGE_SIZE * 3);
        assert!(!page.exhausted);
        assert_eq!(page.next.page_num(), 3.0);

        let tail = page_at(&posts, page.next, &offers()).await;
        assert!(tail.results.is_empty());
        assert!(tail.exhausted);
        assert_eq!(tail.next, page.next);
    }

    #[tokio::test]
    async fn exhausted_source_reports_fractional_page() {
        let posts = feed(50, 3);
        let page = page_at(&posts, PageCursor::START, &offers()).await;
        assert_eq!(page.results.len(), 50);
        assert_eq!(page.matched, 16);
        assert!(page.exhausted);
        let response = PageResponse::from(page);
        assert_eq!(response.next_page_num, 2.5);
    }

    #[tokio::test]
    async fn dense_matches_fill_one_batch() {
        let posts = feed(45, 1);
        let page = page_at(&posts, PageCursor::START, &offers()).await;
        assert_eq!(page.results.len(), PAGE_SIZE);
        assert_eq!(page.next.offset(), PAGE_SIZE as u64);
        assert!(!page.exhausted);
    }

    #[tokio::test]
    async fn sequential_pages_cover_every_match_once_in_order() {
        let posts = feed(137, 4);
        let criteria = offers();
        let mut cursor = PageCursor::START;
        let mut seen = HashSet::new();
        let mut collected = Vec::new();
        loop {
            let page = page_at(&posts, cursor, &criteria).await;
            for post in &page.results {
                if seen.insert(post.id.clone()) {
                    collected.push(post.clone());
                }
            }
            let response = PageResponse::from(page);
            if response.exhausted {
                break;
            }
            cursor = PageCursor::from_page_num(response.next_page_num).unwrap();
        }

        let matcher = KeywordMatcher::default();
        let filter = PostFilter::new(&criteria, DateWindow::default(), &matcher);
        let expected: Vec<&str> = posts
            .iter()
            .filter(|post| filter.matches(post))
            .map(|post| post.id.as_str())
            .collect();
        let actual: Vec<&str> = collected
            .iter()
            .filter(|post| filter.matches(post))
            .map(|post| post.id.as_str())
            .collect();
        assert_eq!(actual, expected);
        assert_eq!(collected.len(), posts.len());
    }

    #[tokio::test]
    async fn keyword_condition_counts_toward_matches() {
        let mut posts = feed(40, 1);
        for (index, post) in posts.iter_mut().enumerate() {
            if index % 2 == 0 {
                post.message = "fully furnished apartment".to_string();
            }
        }
        let criteria = FilterCriteria {
            keyword: Some("furnished".to_string()),
            ..FilterCriteria::default()
        };
        let page = page_at(&posts, PageCursor::START, &criteria).await;
        assert_eq!(page.matched, 20);
        assert_eq!(page.results.len(), 40);
        assert!(!page.exhausted);
    }

    #[tokio::test]
    async fn source_error_fails_the_page() {
        let items: Vec<Result<Post, &'static str>> = vec![
            Ok(post(0, PostType::OfferingLease, "a")),
            Err("connection reset"),
            Ok(post(1, PostType::OfferingLease, "b")),
        ];
        let criteria = FilterCriteria::default();
        let matcher = KeywordMatcher::default();
        let filter = PostFilter::new(&criteria, DateWindow::default(), &matcher);
        let err = collect_page(stream::iter(items), PageCursor::START, &filter)
            .await
            .unwrap_err();
        assert_eq!(err, "connection reset");
    }

    struct TrackedSource<S> {
        inner: S,
        dropped: Arc<AtomicBool>,
    }

    impl<S: Stream + Unpin> Stream for TrackedSource<S> {
        type Item = S::Item;

        fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
            Pin::new(&mut self.inner).poll_next(cx)
        }
    }

    impl<S> Drop for TrackedSource<S> {
        fn drop(&mut self) {
            self.dropped.store(true, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn early_stop_releases_the_source() {
        let posts = feed(100, 1);
        let dropped = Arc::new(AtomicBool::new(false));
        let tracked = TrackedSource {
            inner: stream::iter(posts.into_iter().map(Ok::<_, Infallible>)),
            dropped: Arc::clone(&dropped),
        };
        let criteria = FilterCriteria::default();
        let matcher = KeywordMatcher::default();
        let filter = PostFilter::new(&criteria, DateWindow::default(), &matcher);
        let page = collect_page(tracked, PageCursor::START, &filter).await.unwrap();
        assert_eq!(page.results.len(), PAGE_SIZE);
        assert!(dropped.load(Ordering::SeqCst));
    }
}
