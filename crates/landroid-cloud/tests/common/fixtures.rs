//! Test fixtures and setup helpers

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use landroid_cloud::{setup_device, Dispatcher, EntryInfo, LandroidConfig, LandroidDevice};
use landroid_core::DeviceSnapshot;

use super::{MockHost, MockMower};

/// Load a fixture file as a string
///
/// Fixtures are stored in the `tests/fixtures/` directory.
pub fn load_fixture(name: &str) -> String {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);

    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to load fixture '{}' from {:?}: {}", name, path, e))
}

/// The reference mower: online, docked, four zones, both schedules
pub fn mower_snapshot() -> DeviceSnapshot {
    let content = load_fixture("mower_snapshot.json");
    serde_json::from_str(&content)
        .unwrap_or_else(|e| panic!("Failed to parse mower snapshot fixture: {}", e))
}

pub fn test_config() -> LandroidConfig {
    LandroidConfig::from_yaml_str(
        "email: Owner@Example.com\npassword: hunter2\ntype: worx\n",
        Path::new("test.yaml"),
    )
    .expect("test config is valid")
}

/// A mower wired into a recording host
pub struct TestSetup {
    pub mower: Arc<MockMower>,
    pub host: Arc<MockHost>,
    pub dispatcher: Arc<Dispatcher>,
    pub device: LandroidDevice,
}

impl TestSetup {
    pub fn new(snapshot: DeviceSnapshot) -> Self {
        Self::with_config(snapshot, &test_config())
    }

    pub fn with_config(snapshot: DeviceSnapshot, config: &LandroidConfig) -> Self {
        let mower = MockMower::new(snapshot);
        let host = Arc::new(MockHost::new());
        let dispatcher = Arc::new(Dispatcher::new());
        let device = setup_device(
            mower.clone(),
            EntryInfo::for_account(config),
            config,
            host.clone(),
            dispatcher.clone(),
        )
        .expect("device setup succeeds");

        Self {
            mower,
            host,
            dispatcher,
            device,
        }
    }
}

/// Poll a condition until it holds, letting spawned tasks and the device
/// worker's blocking jobs make progress in between
pub async fn eventually(mut condition: impl FnMut() -> bool) -> bool {
    for _ in 0..200 {
        if condition() {
            return true;
        }
        tokio::task::yield_now().await;
        std::thread::sleep(Duration::from_millis(5));
    }
    condition()
}
