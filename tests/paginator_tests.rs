use itlab_sync::errors::AppError;
use itlab_sync::paginator::{FetchOutcome, Paginator};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Three pages of two items, then nothing. Records every requested page.
fn three_pages(
    requested: Arc<Mutex<Vec<u32>>>,
    delay: Duration,
) -> Paginator<String> {
    Paginator::new(0, move |page| {
        let requested = Arc::clone(&requested);
        async move {
            requested.lock().unwrap().push(page);
            tokio::time::sleep(delay).await;
            let items = if page <= 3 {
                vec![format!("item {page}a"), format!("item {page}b")]
            } else {
                Vec::new()
            };
            Ok::<_, AppError>(items)
        }
    })
}

#[tokio::test]
async fn test_three_pages_then_end() {
    let requested = Arc::new(Mutex::new(Vec::new()));
    let p = three_pages(Arc::clone(&requested), Duration::ZERO);

    assert_eq!(p.fetch_next().await, FetchOutcome::Appended(2));
    assert_eq!(p.fetch_next().await, FetchOutcome::Appended(2));
    assert_eq!(p.fetch_next().await, FetchOutcome::Appended(2));
    assert_eq!(p.fetch_next().await, FetchOutcome::EndReached);
    assert_eq!(p.fetch_next().await, FetchOutcome::Skipped);

    let state = p.snapshot();
    assert_eq!(state.items.len(), 6);
    assert_eq!(state.items[0], "item 1a");
    assert_eq!(state.items[5], "item 3b");
    assert!(state.end_reached);
    assert!(!state.is_loading);
    assert_eq!(*requested.lock().unwrap(), vec![1, 2, 3, 4]);
}

#[tokio::test]
async fn test_fetch_while_loading_is_skipped() {
    let requested = Arc::new(Mutex::new(Vec::new()));
    let p = three_pages(Arc::clone(&requested), Duration::from_millis(100));

    let (first, second) = tokio::join!(p.fetch_next(), async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        p.fetch_next().await
    });

    assert_eq!(first, FetchOutcome::Appended(2));
    assert_eq!(second, FetchOutcome::Skipped);
    assert_eq!(*requested.lock().unwrap(), vec![1]);
}

#[tokio::test]
async fn test_response_after_reset_is_discarded() {
    let requested = Arc::new(Mutex::new(Vec::new()));
    let p = three_pages(Arc::clone(&requested), Duration::from_millis(100));

    let (outcome, _) = tokio::join!(p.fetch_next(), async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        p.reset();
    });

    assert_eq!(outcome, FetchOutcome::Stale);
    let state = p.snapshot();
    assert!(state.items.is_empty());
    assert_eq!(state.current_page, 0);
    assert_eq!(state.generation, 1);

    // The fresh list starts again from the first page.
    assert_eq!(p.fetch_next().await, FetchOutcome::Appended(2));
    assert_eq!(*requested.lock().unwrap(), vec![1, 1]);
}

#[tokio::test]
async fn test_failure_keeps_page_and_allows_retry() {
    let fail = Arc::new(AtomicBool::new(true));
    let flag = Arc::clone(&fail);
    let p = Paginator::new(0, move |page| {
        let fail = flag.load(Ordering::SeqCst);
        async move {
            if fail {
                Err(AppError::Transport("down".to_string()))
            } else {
                Ok(vec![page])
            }
        }
    });

    let outcome = p.fetch_next().await;
    assert!(matches!(outcome, FetchOutcome::Failed(_)));
    let state = p.snapshot();
    assert!(state.error.is_some());
    assert_eq!(state.current_page, 0);

    fail.store(false, Ordering::SeqCst);
    assert_eq!(p.fetch_next().await, FetchOutcome::Appended(1));
    let state = p.snapshot();
    assert_eq!(state.items, vec![1]);
    assert!(state.error.is_none());
}

#[tokio::test]
async fn test_subscribers_see_state_changes() {
    let requested = Arc::new(Mutex::new(Vec::new()));
    let p = three_pages(requested, Duration::ZERO);
    let mut rx = p.subscribe();

    p.fetch_next().await;
    assert!(rx.has_changed().unwrap());
    let seen = rx.borrow_and_update().clone();
    assert_eq!(seen.items.len(), 2);
    assert!(!seen.is_loading);
}

#[tokio::test]
async fn test_abandoned_fetch_releases_loading() {
    let requested = Arc::new(Mutex::new(Vec::new()));
    let p = three_pages(Arc::clone(&requested), Duration::from_millis(200));

    let timed_out = tokio::time::timeout(Duration::from_millis(10), p.fetch_next()).await;
    assert!(timed_out.is_err());

    let state = p.snapshot();
    assert!(!state.is_loading);
    assert!(state.items.is_empty());
    assert_eq!(state.current_page, 0);

    // Same page is asked for again.
    assert_eq!(p.fetch_next().await, FetchOutcome::Appended(2));
    assert_eq!(*requested.lock().unwrap(), vec![1, 1]);
}
