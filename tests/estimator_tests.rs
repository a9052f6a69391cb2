//! Estimator service behavior against seeded catalogs: liveness
//! filtering, fastest-factory selection, and the unavailable sentinel.

mod common;

use common::{
    seed_linux_firefox, FactoryFixture, RequestFactory, RequestGroupFactory, SqliteFactory,
    TestQueue, T0,
};
use shotqueue::services::QueueEstimate;

#[tokio::test]
async fn test_group_status_reports_wait_per_pending_request() {
    let queue = TestQueue::new().await;
    let catalog = seed_linux_firefox(&queue).await;
    let group = RequestGroupFactory::new()
        .submitted_at(T0 - 10)
        .create(queue.pool())
        .await
        .unwrap();
    RequestFactory::new(
        group.request_group_id,
        catalog.platform.platform_id,
        catalog.browser_group.browser_group_id,
    )
    .with_major(3)
    .created_at(T0 - 10)
    .create(queue.pool())
    .await
    .unwrap();

    // Queued 10s against a single active factory with a 120s backlog:
    // 110s remaining, displayed as 2 min.
    let status = queue
        .estimator()
        .group_status(group.request_group_id, T0)
        .await
        .unwrap();
    assert_eq!(status.queued_seconds, 10);
    assert_eq!(status.entries.len(), 1);
    assert_eq!(
        status.entries[0].estimate,
        QueueEstimate::Wait { seconds: 110 }
    );
    assert_eq!(status.entries[0].estimate.to_string(), "2 min");
}

#[tokio::test]
async fn test_fastest_active_factory_sets_the_estimate() {
    let queue = TestQueue::new().await;
    let catalog = seed_linux_firefox(&queue).await;
    // A second, much faster factory with the same browser.
    FactoryFixture::new("ubuntu-karmic", catalog.platform.platform_id)
        .polled_at(T0)
        .with_queue_estimate(70)
        .with_browser(catalog.browser_group.browser_group_id, 3, 5)
        .create(queue.pool())
        .await
        .unwrap();

    let group = RequestGroupFactory::new()
        .submitted_at(T0)
        .create(queue.pool())
        .await
        .unwrap();
    RequestFactory::new(
        group.request_group_id,
        catalog.platform.platform_id,
        catalog.browser_group.browser_group_id,
    )
    .created_at(T0)
    .create(queue.pool())
    .await
    .unwrap();

    let status = queue
        .estimator()
        .group_status(group.request_group_id, T0)
        .await
        .unwrap();
    assert_eq!(
        status.entries[0].estimate,
        QueueEstimate::Wait { seconds: 70 }
    );
}

#[tokio::test]
async fn test_stale_factory_makes_browser_unavailable() {
    let queue = TestQueue::new().await;
    let catalog = seed_linux_firefox(&queue).await;
    let group = RequestGroupFactory::new()
        .create(queue.pool())
        .await
        .unwrap();
    RequestFactory::new(
        group.request_group_id,
        catalog.platform.platform_id,
        catalog.browser_group.browser_group_id,
    )
    .create(queue.pool())
    .await
    .unwrap();

    // Liveness window is 300s; the factory last polled at T0.
    let still_active = queue
        .estimator()
        .group_status(group.request_group_id, T0 + 300)
        .await
        .unwrap();
    assert!(matches!(
        still_active.entries[0].estimate,
        QueueEstimate::Wait { .. }
    ));

    let gone_quiet = queue
        .estimator()
        .group_status(group.request_group_id, T0 + 301)
        .await
        .unwrap();
    assert_eq!(gone_quiet.entries[0].estimate, QueueEstimate::Unavailable);
}

#[tokio::test]
async fn test_version_mismatch_is_unavailable() {
    let queue = TestQueue::new().await;
    let catalog = seed_linux_firefox(&queue).await;
    let group = RequestGroupFactory::new()
        .create(queue.pool())
        .await
        .unwrap();
    // Wants Firefox 2.x; the only active browser is 3.5.
    RequestFactory::new(
        group.request_group_id,
        catalog.platform.platform_id,
        catalog.browser_group.browser_group_id,
    )
    .with_major(2)
    .create(queue.pool())
    .await
    .unwrap();

    let status = queue
        .estimator()
        .group_status(group.request_group_id, T0)
        .await
        .unwrap();
    assert_eq!(status.entries[0].estimate, QueueEstimate::Unavailable);
    assert_eq!(status.entries[0].estimate.to_string(), "unavailable");
}

#[tokio::test]
async fn test_completed_requests_report_done() {
    let queue = TestQueue::new().await;
    let catalog = seed_linux_firefox(&queue).await;
    let group = RequestGroupFactory::new()
        .create(queue.pool())
        .await
        .unwrap();
    let finished = RequestFactory::new(
        group.request_group_id,
        catalog.platform.platform_id,
        catalog.browser_group.browser_group_id,
    )
    .created_at(T0 - 20)
    .create(queue.pool())
    .await
    .unwrap();
    RequestFactory::new(
        group.request_group_id,
        catalog.platform.platform_id,
        catalog.browser_group.browser_group_id,
    )
    .created_at(T0 - 10)
    .create(queue.pool())
    .await
    .unwrap();

    shotqueue::models::Request::mark_completed(queue.pool(), finished.request_id)
        .await
        .unwrap();

    // The finished request stays listed, flagged done; the pending one
    // still gets a wait estimate.
    let status = queue
        .estimator()
        .group_status(group.request_group_id, T0)
        .await
        .unwrap();
    assert_eq!(status.entries.len(), 2);
    assert_eq!(status.entries[0].request.request_id, finished.request_id);
    assert_eq!(status.entries[0].estimate, QueueEstimate::Done);
    assert_eq!(status.entries[0].estimate.to_string(), "done");
    assert!(matches!(
        status.entries[1].estimate,
        QueueEstimate::Wait { .. }
    ));
}

#[tokio::test]
async fn test_single_request_estimate_matches_group_view() {
    let queue = TestQueue::new().await;
    let catalog = seed_linux_firefox(&queue).await;
    let group = RequestGroupFactory::new()
        .submitted_at(T0 - 40)
        .create(queue.pool())
        .await
        .unwrap();
    let request = RequestFactory::new(
        group.request_group_id,
        catalog.platform.platform_id,
        catalog.browser_group.browser_group_id,
    )
    .created_at(T0 - 40)
    .create(queue.pool())
    .await
    .unwrap();

    let estimate = queue.estimator().estimate(&request, T0).await.unwrap();
    assert_eq!(estimate, QueueEstimate::Wait { seconds: 80 });
}

#[tokio::test]
async fn test_status_for_unknown_group_is_client_error() {
    let queue = TestQueue::new().await;
    let err = queue
        .estimator()
        .group_status(4242, T0)
        .await
        .expect_err("no such group");
    assert!(err.is_not_found());
}
