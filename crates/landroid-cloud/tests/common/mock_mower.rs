//! Recording mower
//!
//! Implements the SDK device trait, records every call and lets a test
//! inject cloud errors per method.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use landroid_cloud::{CloudError, CloudResult, MowerDevice, UpdateCallback};
use landroid_core::DeviceSnapshot;
use serde_json::Value;

/// A call made against the mock mower
#[derive(Debug, Clone, PartialEq)]
pub enum MowerCall {
    Update,
    Start,
    Pause,
    Home,
    Safehome,
    Restart,
    SetZone(String),
    Send(Value),
    Lock(bool),
    Ots { boundary: bool, runtime: u32 },
    Partymode(bool),
    Torque(i32),
}

pub struct MockMower {
    snapshot: Mutex<DeviceSnapshot>,
    callback: Mutex<Option<UpdateCallback>>,
    calls: Mutex<Vec<MowerCall>>,
    failures: Mutex<HashMap<&'static str, CloudError>>,
}

impl MockMower {
    pub fn new(snapshot: DeviceSnapshot) -> Arc<Self> {
        Arc::new(Self {
            snapshot: Mutex::new(snapshot),
            callback: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
            failures: Mutex::new(HashMap::new()),
        })
    }

    /// Make every call of `method` fail with `error`
    pub fn fail(&self, method: &'static str, error: CloudError) {
        self.failures.lock().unwrap().insert(method, error);
    }

    pub fn calls(&self) -> Vec<MowerCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    /// Payloads passed to `send`
    pub fn sent(&self) -> Vec<Value> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                MowerCall::Send(payload) => Some(payload),
                _ => None,
            })
            .collect()
    }

    /// Change the device state without notifying anyone
    pub fn set_snapshot(&self, change: impl FnOnce(&mut DeviceSnapshot)) {
        let mut snapshot = self.snapshot.lock().unwrap();
        change(&mut *snapshot);
    }

    /// Invoke the update callback like the SDK does on a push
    pub fn push(&self) {
        let callback = self.callback.lock().unwrap().clone();
        if let Some(callback) = callback {
            callback();
        }
    }

    pub fn has_callback(&self) -> bool {
        self.callback.lock().unwrap().is_some()
    }

    fn record(&self, method: &'static str, call: MowerCall) -> CloudResult<()> {
        self.calls.lock().unwrap().push(call);
        match self.failures.lock().unwrap().get(method) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

impl MowerDevice for MockMower {
    fn snapshot(&self) -> DeviceSnapshot {
        self.snapshot.lock().unwrap().clone()
    }

    fn update(&self) -> CloudResult<()> {
        self.record("update", MowerCall::Update)
    }

    fn set_callback(&self, callback: UpdateCallback) {
        *self.callback.lock().unwrap() = Some(callback);
    }

    fn start(&self) -> CloudResult<()> {
        self.record("start", MowerCall::Start)
    }

    fn pause(&self) -> CloudResult<()> {
        self.record("pause", MowerCall::Pause)
    }

    fn home(&self) -> CloudResult<()> {
        self.record("home", MowerCall::Home)
    }

    fn safehome(&self) -> CloudResult<()> {
        self.record("safehome", MowerCall::Safehome)
    }

    fn restart(&self) -> CloudResult<()> {
        self.record("restart", MowerCall::Restart)
    }

    fn setzone(&self, zone: &str) -> CloudResult<()> {
        self.record("setzone", MowerCall::SetZone(zone.to_string()))
    }

    fn send(&self, data: &str) -> CloudResult<()> {
        let payload = serde_json::from_str(data).unwrap_or(Value::String(data.to_string()));
        self.record("send", MowerCall::Send(payload))
    }

    fn lock(&self, state: bool) -> CloudResult<()> {
        self.record("lock", MowerCall::Lock(state))
    }

    fn ots(&self, boundary: bool, runtime: u32) -> CloudResult<()> {
        self.record("ots", MowerCall::Ots { boundary, runtime })
    }

    fn toggle_partymode(&self, enabled: bool) -> CloudResult<()> {
        self.record("partymode", MowerCall::Partymode(enabled))
    }

    fn set_torque(&self, torque: i32) -> CloudResult<()> {
        self.record("torque", MowerCall::Torque(torque))
    }
}
