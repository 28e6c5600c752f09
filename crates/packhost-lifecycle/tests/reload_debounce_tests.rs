//! Debounce semantics of the reload scheduler, under paused tokio time

mod common;

use common::CountingProcessManager;
use packhost_lifecycle::ReloadScheduler;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

#[tokio::test(start_paused = true)]
async fn test_arms_within_window_coalesce_into_one_reload() {
    let process = Arc::new(CountingProcessManager::default());
    let scheduler = ReloadScheduler::new(process.clone(), None);

    scheduler.arm().await;
    sleep(Duration::from_millis(1000)).await;
    scheduler.arm().await;
    sleep(Duration::from_millis(1000)).await;
    scheduler.arm().await;

    // Past the debounce window measured from the last arm
    sleep(Duration::from_millis(3100)).await;

    assert_eq!(process.reload_count(), 1);
    assert!(!scheduler.is_pending().await);
}

#[tokio::test(start_paused = true)]
async fn test_separate_windows_reload_separately() {
    let process = Arc::new(CountingProcessManager::default());
    let scheduler = ReloadScheduler::new(process.clone(), None);

    scheduler.arm().await;
    sleep(Duration::from_millis(3100)).await;
    assert_eq!(process.reload_count(), 1);

    scheduler.arm().await;
    sleep(Duration::from_millis(3100)).await;
    assert_eq!(process.reload_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_arm_restarts_a_pending_timer() {
    let process = Arc::new(CountingProcessManager::default());
    let scheduler = ReloadScheduler::new(process.clone(), None);

    scheduler.arm().await;
    // Just before the window elapses, arm again
    sleep(Duration::from_millis(2900)).await;
    scheduler.arm().await;

    // The original deadline passes without a reload
    sleep(Duration::from_millis(200)).await;
    assert_eq!(process.reload_count(), 0);
    assert!(scheduler.is_pending().await);

    sleep(Duration::from_millis(3000)).await;
    assert_eq!(process.reload_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_flush_waits_for_the_pending_reload() {
    let process = Arc::new(CountingProcessManager::default());
    let scheduler = ReloadScheduler::new(process.clone(), None);

    scheduler.arm().await;
    scheduler.flush().await;

    assert_eq!(process.reload_count(), 1);
    assert!(!scheduler.is_pending().await);
}

#[tokio::test(start_paused = true)]
async fn test_arm_during_flush_stays_tracked() {
    let process = Arc::new(CountingProcessManager::default());
    let scheduler = Arc::new(ReloadScheduler::new(process.clone(), None));

    scheduler.arm().await;

    // Flush takes the timer's handle, then a fresh arm lands while the
    // flushed timer is still sleeping
    let flusher = tokio::spawn({
        let scheduler = Arc::clone(&scheduler);
        async move { scheduler.flush().await }
    });
    tokio::task::yield_now().await;
    sleep(Duration::from_millis(1000)).await;
    scheduler.arm().await;

    flusher.await.unwrap();
    assert_eq!(process.reload_count(), 1);

    // The flushed timer must not have dropped the re-arm's slot entry
    assert!(scheduler.is_pending().await);

    sleep(Duration::from_millis(3100)).await;
    assert_eq!(process.reload_count(), 2);
    assert!(!scheduler.is_pending().await);
}

#[tokio::test(start_paused = true)]
async fn test_custom_window() {
    let process = Arc::new(CountingProcessManager::default());
    let scheduler =
        ReloadScheduler::with_window(process.clone(), Some("host".to_string()), Duration::from_millis(100));

    scheduler.arm().await;
    sleep(Duration::from_millis(150)).await;

    assert_eq!(process.reload_count(), 1);
}
