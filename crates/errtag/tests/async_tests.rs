use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use errtag::prelude::*;
use errtag_test_utils::{
    NetworkError, Timeout, TimeoutData, Unauthorized, init_test_tracing, network,
};
use futures::future::{BoxFuture, FutureExt};
use tracing::Level;

fn counted<T>(
    polled: &Arc<AtomicUsize>,
    label: &'static str,
) -> impl FnOnce(T) -> BoxFuture<'static, &'static str> + use<T> {
    let polled = Arc::clone(polled);
    move |_| {
        async move {
            polled.fetch_add(1, Ordering::SeqCst);
            label
        }
        .boxed()
    }
}

async fn retry_after(ms: u64) -> Duration {
    tokio::time::sleep(Duration::from_millis(1)).await;
    Duration::from_millis(ms)
}

#[tokio::test]
async fn async_free_form_awaits_the_chosen_handler() {
    init_test_tracing(Level::DEBUG);
    let out = match_error_async(Timeout::with_data(TimeoutData { after_ms: 250 }))
        .with(NetworkError, |_| async { Duration::ZERO })
        .with(Timeout, |e| retry_after(e.data().after_ms))
        .otherwise(|_| async { Duration::MAX })
        .await;
    assert_eq!(out, Duration::from_millis(250));
}

#[tokio::test]
async fn only_one_handler_future_is_ever_polled() {
    let polled = Arc::new(AtomicUsize::new(0));
    let out = match_error_async(network(500, "/"))
        .with(Unauthorized, counted(&polled, "auth"))
        .with(NetworkError, counted(&polled, "network"))
        .with_any((NetworkError, Timeout), counted(&polled, "any"))
        .otherwise(|_| async { "fallback" })
        .await;
    assert_eq!(out, "network");
    assert_eq!(polled.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn async_fallback_gets_the_transformed_subject() {
    let out = match_error_async(Thrown::opaque("slow upstream"))
        .map(|_| Timeout::with_message("mapped").into())
        .with(NetworkError, |_| async { String::new() })
        .otherwise(|t| async move { t.message().unwrap_or_default() })
        .await;
    assert_eq!(out, "mapped");
}

#[tokio::test]
async fn async_exhaustive_matches_and_reports() {
    let handle = |value: Thrown| {
        match_error_of_async(value, (NetworkError, Timeout))
            .select(NetworkError, "status", |status| async move { status.as_u64() })
            .with(Timeout, |_| async { None })
            .exhaustive()
    };

    assert_eq!(handle(network(503, "/").into()).await.ok(), Some(Some(503)));
    assert_eq!(handle(Timeout::empty().into()).await.ok(), Some(None));

    let err = handle(Unauthorized::empty().into()).await.unwrap_err();
    assert!(err.is_non_exhaustive());
}

#[tokio::test]
async fn async_matcher_futures_are_send() {
    let fut = match_error_async(network(500, "/"))
        .with(NetworkError, |e| async move { e.data().status })
        .otherwise(|_| async { 0 });
    let status = tokio::spawn(fut).await.expect("task joined");
    assert_eq!(status, 500);
}
