//! Refreshes, reloads and the Web API fallback

mod common;

use std::path::Path;
use std::time::Duration;

use common::*;
use landroid_cloud::{CloudError, LandroidConfig};

fn updates(setup: &TestSetup) -> usize {
    setup
        .mower
        .calls()
        .iter()
        .filter(|call| **call == MowerCall::Update)
        .count()
}

#[tokio::test]
async fn test_refresh() {
    let setup = TestSetup::new(mower_snapshot());
    assert!(setup.device.api.refresh().await);
    assert_eq!(setup.mower.calls(), vec![MowerCall::Update]);
}

#[tokio::test]
async fn test_refresh_errors_are_reported_as_false() {
    let setup = TestSetup::new(mower_snapshot());
    for error in [
        CloudError::Request,
        CloudError::Authorization,
        CloudError::Forbidden,
        CloudError::NotFound,
        CloudError::TooManyRequests,
        CloudError::InternalServer,
        CloudError::ServiceUnavailable,
        CloudError::Api("gateway timeout".to_string()),
    ] {
        setup.mower.fail("update", error);
        assert!(!setup.device.api.refresh().await);
    }
}

#[tokio::test]
async fn test_reload_when_device_comes_online() {
    let mut snapshot = mower_snapshot();
    snapshot.online = Some(false);
    let setup = TestSetup::new(snapshot);
    assert!(setup.host.reloads().is_empty());

    setup.mower.set_snapshot(|s| s.online = Some(true));
    setup.mower.push();
    setup.mower.push();

    let entry_id = setup.device.api.entry().entry_id.clone();
    assert_eq!(setup.host.reloads(), vec![entry_id.clone()]);

    setup.mower.set_snapshot(|s| s.online = Some(false));
    setup.mower.push();
    setup.mower.set_snapshot(|s| s.online = Some(true));
    setup.mower.push();
    assert_eq!(setup.host.reloads(), vec![entry_id.clone(), entry_id]);
}

#[tokio::test]
async fn test_no_reload_while_online() {
    let setup = TestSetup::new(mower_snapshot());
    setup.mower.push();
    assert!(setup.host.reloads().is_empty());
}

#[tokio::test]
async fn test_push_signals_listeners() {
    let setup = TestSetup::new(mower_snapshot());
    let mut rx = setup
        .dispatcher
        .connect(setup.device.api.update_signal());

    setup.mower.push();
    assert!(rx.recv().await.is_ok());
    assert_eq!(setup.device.api.update_signal(), "landroid_cloud_update_Mow Betty");
}

#[tokio::test(start_paused = true)]
async fn test_fallback_refresh_when_mqtt_down() {
    let mut snapshot = mower_snapshot();
    snapshot.mqtt_connected = false;
    let setup = TestSetup::new(snapshot);
    assert!(setup.device.api.fallback().is_pending());

    tokio::time::sleep(Duration::from_secs(14 * 60)).await;
    assert_eq!(updates(&setup), 0);

    tokio::time::sleep(Duration::from_secs(2 * 60)).await;
    assert!(eventually(|| updates(&setup) == 1).await);
}

#[tokio::test(start_paused = true)]
async fn test_fallback_refresh_not_stacked() {
    let mut snapshot = mower_snapshot();
    snapshot.mqtt_connected = false;
    let setup = TestSetup::new(snapshot);

    setup.mower.push();
    setup.mower.push();
    assert!(eventually(|| setup.host.write_count("vacuum.mow_betty") >= 3).await);

    tokio::time::sleep(Duration::from_secs(16 * 60)).await;
    assert!(eventually(|| updates(&setup) == 1).await);
    assert!(!setup.device.api.fallback().is_pending());

    tokio::time::sleep(Duration::from_secs(30 * 60)).await;
    assert_eq!(updates(&setup), 1);
}

#[tokio::test(start_paused = true)]
async fn test_fallback_delay_from_config() {
    let config = LandroidConfig::from_yaml_str(
        "email: owner@example.com\npassword: hunter2\nfallback_refresh_minutes: 2\n",
        Path::new("test.yaml"),
    )
    .unwrap();
    let mut snapshot = mower_snapshot();
    snapshot.mqtt_connected = false;
    let setup = TestSetup::with_config(snapshot, &config);

    tokio::time::sleep(Duration::from_secs(3 * 60)).await;
    assert!(eventually(|| updates(&setup) == 1).await);
}

#[tokio::test(start_paused = true)]
async fn test_no_fallback_while_mqtt_connected() {
    let setup = TestSetup::new(mower_snapshot());
    assert!(!setup.device.api.fallback().is_pending());

    tokio::time::sleep(Duration::from_secs(60 * 60)).await;
    assert_eq!(updates(&setup), 0);
}

#[tokio::test(start_paused = true)]
async fn test_unload_cancels_fallback() {
    let mut snapshot = mower_snapshot();
    snapshot.mqtt_connected = false;
    let setup = TestSetup::new(snapshot);

    setup.device.unload();
    assert!(!setup.device.api.fallback().is_pending());

    tokio::time::sleep(Duration::from_secs(20 * 60)).await;
    tokio::task::yield_now().await;
    assert_eq!(updates(&setup), 0);
}
