// Shared test doubles for the device, sink, model source, store, and runtime
// boundaries.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicI32, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;

use scan_engine::capture::device::{
    CaptureDevice, DeviceConstraints, Frame, FrameSink, FrameSource,
};
use scan_engine::model::artifact::ModelArtifact;
use scan_engine::model::runtime::{InferenceRuntime, Prediction, Predictor};
use scan_engine::source::traits::ModelSource;
use scan_engine::store::traits::ArtifactStore;

// --- capture doubles ---------------------------------------------------------

pub struct StaticFrameSource {
    release_count: AtomicU32,
}

impl StaticFrameSource {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            release_count: AtomicU32::new(0),
        })
    }

    pub fn release_count(&self) -> u32 {
        self.release_count.load(Ordering::SeqCst)
    }
}

impl FrameSource for StaticFrameSource {
    fn current_frame(&self) -> Option<Frame> {
        if self.release_count() > 0 {
            return None;
        }
        Some(Frame {
            width: 320,
            height: 240,
            data: Bytes::from_static(&[0u8; 16]),
        })
    }

    fn release(&self) {
        self.release_count.fetch_add(1, Ordering::SeqCst);
    }
}

/// What one `open` call should do, consumed in call order. Calls beyond the
/// script succeed immediately.
pub enum DeviceBehavior {
    Succeed { delay: Duration },
    Fail,
}

pub struct ScriptedDevice {
    behaviors: Mutex<Vec<DeviceBehavior>>,
    opened: Mutex<Vec<Arc<StaticFrameSource>>>,
}

impl ScriptedDevice {
    pub fn new(behaviors: Vec<DeviceBehavior>) -> Arc<Self> {
        Arc::new(Self {
            behaviors: Mutex::new(behaviors),
            opened: Mutex::new(Vec::new()),
        })
    }

    /// Handles this device has produced, in acquisition order.
    pub fn opened(&self) -> Vec<Arc<StaticFrameSource>> {
        self.opened.lock().clone()
    }

    pub fn open_count(&self) -> usize {
        self.opened.lock().len()
    }
}

#[async_trait]
impl CaptureDevice for ScriptedDevice {
    async fn open(&self, _constraints: &DeviceConstraints) -> Result<Arc<dyn FrameSource>> {
        let behavior = {
            let mut behaviors = self.behaviors.lock();
            if behaviors.is_empty() {
                DeviceBehavior::Succeed {
                    delay: Duration::ZERO,
                }
            } else {
                behaviors.remove(0)
            }
        };
        match behavior {
            DeviceBehavior::Fail => Err(anyhow!("permission denied")),
            DeviceBehavior::Succeed { delay } => {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                let source = StaticFrameSource::new();
                self.opened.lock().push(Arc::clone(&source));
                Ok(source)
            }
        }
    }
}

/// Sink that rejects the first `failures` playback attempts.
pub struct ScriptedSink {
    failures_remaining: AtomicI32,
    attempts: AtomicU32,
}

impl ScriptedSink {
    pub fn accepting() -> Arc<Self> {
        Self::failing(0)
    }

    pub fn failing(failures: i32) -> Arc<Self> {
        Arc::new(Self {
            failures_remaining: AtomicI32::new(failures),
            attempts: AtomicU32::new(0),
        })
    }

    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FrameSink for ScriptedSink {
    async fn begin_playback(&self, _source: Arc<dyn FrameSource>) -> Result<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.failures_remaining.fetch_sub(1, Ordering::SeqCst) > 0 {
            Err(anyhow!("autoplay rejected"))
        } else {
            Ok(())
        }
    }
}

// --- model source / store / runtime doubles ----------------------------------

pub struct FakeModelSource {
    pub topology: Mutex<Option<Bytes>>,
    pub metadata: Mutex<Option<Bytes>>,
    pub shards: Mutex<HashMap<String, Bytes>>,
    pub delay: Duration,
    pub topology_fetches: AtomicU32,
    pub shard_fetches: AtomicU32,
}

impl FakeModelSource {
    pub fn new(
        topology: Option<&[u8]>,
        metadata: Option<&[u8]>,
        shards: &[(&str, &[u8])],
    ) -> Arc<Self> {
        Arc::new(Self {
            topology: Mutex::new(topology.map(Bytes::copy_from_slice)),
            metadata: Mutex::new(metadata.map(Bytes::copy_from_slice)),
            shards: Mutex::new(
                shards
                    .iter()
                    .map(|(name, data)| (name.to_string(), Bytes::copy_from_slice(data)))
                    .collect(),
            ),
            delay: Duration::ZERO,
            topology_fetches: AtomicU32::new(0),
            shard_fetches: AtomicU32::new(0),
        })
    }

    /// Standard two-shard model used by most tests.
    pub fn complete() -> Arc<Self> {
        Self::new(
            Some(br#"{"layers": []}"#),
            Some(br#"{"weights": ["a.bin", "b.bin"]}"#),
            &[("a.bin", &[1, 2, 3]), ("b.bin", &[4, 5, 6])],
        )
    }

    /// Standard two-shard model whose topology fetch takes `delay`.
    pub fn complete_delayed(delay: Duration) -> Arc<Self> {
        let mut source = Self::complete();
        Arc::get_mut(&mut source).unwrap().delay = delay;
        source
    }
}

#[async_trait]
impl ModelSource for FakeModelSource {
    async fn fetch_topology(&self) -> Result<Bytes> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.topology_fetches.fetch_add(1, Ordering::SeqCst);
        self.topology
            .lock()
            .clone()
            .ok_or_else(|| anyhow!("topology unavailable"))
    }

    async fn fetch_metadata(&self) -> Result<Bytes> {
        self.metadata
            .lock()
            .clone()
            .ok_or_else(|| anyhow!("metadata unavailable"))
    }

    async fn fetch_shard(&self, name: &str) -> Result<Bytes> {
        self.shard_fetches.fetch_add(1, Ordering::SeqCst);
        self.shards
            .lock()
            .get(name)
            .cloned()
            .ok_or_else(|| anyhow!("shard {} unavailable", name))
    }

    fn topology_ref(&self) -> String {
        "fake://model.json".to_string()
    }

    fn metadata_ref(&self) -> String {
        "fake://metadata.json".to_string()
    }
}

pub struct MemoryStore {
    map: Mutex<HashMap<String, ModelArtifact>>,
    pub fail_puts: bool,
    pub puts: AtomicU32,
}

impl MemoryStore {
    pub fn empty() -> Arc<Self> {
        Arc::new(Self {
            map: Mutex::new(HashMap::new()),
            fail_puts: false,
            puts: AtomicU32::new(0),
        })
    }

    pub fn broken() -> Arc<Self> {
        Arc::new(Self {
            map: Mutex::new(HashMap::new()),
            fail_puts: true,
            puts: AtomicU32::new(0),
        })
    }

    pub fn seeded(key: &str, artifact: ModelArtifact) -> Arc<Self> {
        let store = Self::empty();
        store.map.lock().insert(key.to_string(), artifact);
        store
    }

    pub fn stored(&self, key: &str) -> Option<ModelArtifact> {
        self.map.lock().get(key).cloned()
    }
}

#[async_trait]
impl ArtifactStore for MemoryStore {
    async fn get(&self, key: &str) -> Option<ModelArtifact> {
        self.map.lock().get(key).cloned()
    }

    async fn put(&self, key: &str, artifact: &ModelArtifact) -> bool {
        self.puts.fetch_add(1, Ordering::SeqCst);
        if self.fail_puts {
            return false;
        }
        self.map.lock().insert(key.to_string(), artifact.clone());
        true
    }
}

pub enum PredictorScript {
    /// Same predictions on every call.
    Fixed(Vec<Prediction>),
    /// Call n (1-based) yields a single "High_Grade" pair scored 0.50 + n/100.
    Increasing,
}

pub struct FakePredictor {
    script: PredictorScript,
    pub calls: AtomicU32,
    pub dispose_count: AtomicU32,
}

impl FakePredictor {
    pub fn fixed(predictions: Vec<Prediction>) -> Arc<Self> {
        Arc::new(Self {
            script: PredictorScript::Fixed(predictions),
            calls: AtomicU32::new(0),
            dispose_count: AtomicU32::new(0),
        })
    }

    pub fn increasing() -> Arc<Self> {
        Arc::new(Self {
            script: PredictorScript::Increasing,
            calls: AtomicU32::new(0),
            dispose_count: AtomicU32::new(0),
        })
    }

    pub fn disposed(&self) -> bool {
        self.dispose_count.load(Ordering::SeqCst) > 0
    }
}

#[async_trait]
impl Predictor for FakePredictor {
    async fn predict(&self, _frame: &Frame) -> Result<Vec<Prediction>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        match &self.script {
            PredictorScript::Fixed(predictions) => Ok(predictions.clone()),
            PredictorScript::Increasing => Ok(vec![Prediction {
                label: "High_Grade".to_string(),
                score: 0.50 + call as f32 / 100.0,
            }]),
        }
    }

    fn dispose(&self) {
        self.dispose_count.fetch_add(1, Ordering::SeqCst);
    }
}

pub struct FakeRuntime {
    predictor: Arc<FakePredictor>,
    pub fail: bool,
    pub loads: AtomicU32,
}

impl FakeRuntime {
    pub fn new(predictor: Arc<FakePredictor>) -> Arc<Self> {
        Arc::new(Self {
            predictor,
            fail: false,
            loads: AtomicU32::new(0),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            predictor: FakePredictor::fixed(Vec::new()),
            fail: true,
            loads: AtomicU32::new(0),
        })
    }

    pub fn load_count(&self) -> u32 {
        self.loads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl InferenceRuntime for FakeRuntime {
    async fn load(&self, _topology_ref: &str, _metadata_ref: &str) -> Result<Arc<dyn Predictor>> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(anyhow!("runtime rejected model description"));
        }
        Ok(Arc::clone(&self.predictor) as Arc<dyn Predictor>)
    }
}

pub fn prediction(label: &str, score: f32) -> Prediction {
    Prediction {
        label: label.to_string(),
        score,
    }
}
