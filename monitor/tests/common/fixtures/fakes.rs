//! In-memory fakes for the collaborator traits
//!
//! Each fake counts its calls so tests can assert which steps were attempted.

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use node_monitor::errors::{ExplorerError, NodeError, RegistryError};
use node_monitor::explorer::{ExplorerClient, ExplorerFactory};
use node_monitor::metrics::{Labels, MetricsSink};
use node_monitor::monitor::{Block, Chain};
use node_monitor::registry::{RegistryClient, ServiceRegistration};
use node_monitor::rpc::NodeClient;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub fn block_at(number: u64, unix_seconds: i64) -> Block {
    Block::new(number, timestamp(unix_seconds))
}

pub fn timestamp(unix_seconds: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(unix_seconds, 0).unwrap()
}

pub fn refused() -> NodeError {
    NodeError::ConnectionRefused {
        endpoint: "http://127.0.0.1:8545".to_string(),
    }
}

pub fn timed_out(method: &str) -> NodeError {
    NodeError::Timeout {
        endpoint: "http://127.0.0.1:8545".to_string(),
        method: method.to_string(),
    }
}

pub fn explorer_down() -> ExplorerError {
    ExplorerError::Http { status: 502 }
}

#[derive(Debug, Default)]
pub struct CallCounts {
    pub chain_id: AtomicUsize,
    pub peer_count: AtomicUsize,
    pub block_number: AtomicUsize,
    pub block_by_number: AtomicUsize,
}

impl CallCounts {
    pub fn get(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

/// Scriptable node; every response can be changed between ticks
pub struct FakeNode {
    pub chain: Mutex<Result<String, NodeError>>,
    pub peers: Mutex<Result<u64, NodeError>>,
    pub block_number: Mutex<Result<u64, NodeError>>,
    // None means "derive a block from the requested number"
    pub block: Mutex<Option<Result<Block, NodeError>>>,
    pub block_time_base: i64,
    pub calls: CallCounts,
}

impl FakeNode {
    pub fn healthy(chain: &str, block_number: u64) -> Arc<Self> {
        Arc::new(Self {
            chain: Mutex::new(Ok(chain.to_string())),
            peers: Mutex::new(Ok(12)),
            block_number: Mutex::new(Ok(block_number)),
            block: Mutex::new(None),
            block_time_base: 1_500_000_000,
            calls: CallCounts::default(),
        })
    }

    pub fn set_chain(&self, result: Result<String, NodeError>) {
        *self.chain.lock().unwrap() = result;
    }

    pub fn set_peers(&self, result: Result<u64, NodeError>) {
        *self.peers.lock().unwrap() = result;
    }

    pub fn set_block_number(&self, result: Result<u64, NodeError>) {
        *self.block_number.lock().unwrap() = result;
    }

    pub fn set_block(&self, result: Option<Result<Block, NodeError>>) {
        *self.block.lock().unwrap() = result;
    }

    /// Make every query fail as if the node process had died
    pub fn go_down(&self) {
        self.set_chain(Err(refused()));
        self.set_peers(Err(refused()));
        self.set_block_number(Err(refused()));
    }
}

#[async_trait]
impl NodeClient for FakeNode {
    async fn chain_id(&self) -> Result<String, NodeError> {
        self.calls.chain_id.fetch_add(1, Ordering::SeqCst);
        self.chain.lock().unwrap().clone()
    }

    async fn peer_count(&self) -> Result<u64, NodeError> {
        self.calls.peer_count.fetch_add(1, Ordering::SeqCst);
        self.peers.lock().unwrap().clone()
    }

    async fn current_block_number(&self) -> Result<u64, NodeError> {
        self.calls.block_number.fetch_add(1, Ordering::SeqCst);
        self.block_number.lock().unwrap().clone()
    }

    async fn block_by_number(&self, number: u64) -> Result<Block, NodeError> {
        self.calls.block_by_number.fetch_add(1, Ordering::SeqCst);
        match self.block.lock().unwrap().clone() {
            Some(result) => result,
            // Fifteen-second blocks
            None => Ok(block_at(number, self.block_time_base + 15 * number as i64)),
        }
    }
}

/// Node whose peer query, the first step of a round, takes `delay`.
/// Tracks how many rounds are inside that query at once.
pub struct SlowNode {
    pub inner: Arc<FakeNode>,
    delay: Duration,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    pub started: AtomicUsize,
    pub finished: AtomicUsize,
}

impl SlowNode {
    pub fn wrap(inner: Arc<FakeNode>, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            inner,
            delay,
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            started: AtomicUsize::new(0),
            finished: AtomicUsize::new(0),
        })
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NodeClient for SlowNode {
    async fn chain_id(&self) -> Result<String, NodeError> {
        self.inner.chain_id().await
    }

    async fn peer_count(&self) -> Result<u64, NodeError> {
        self.started.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        tokio::time::sleep(self.delay).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.finished.fetch_add(1, Ordering::SeqCst);
        self.inner.peer_count().await
    }

    async fn current_block_number(&self) -> Result<u64, NodeError> {
        self.inner.current_block_number().await
    }

    async fn block_by_number(&self, number: u64) -> Result<Block, NodeError> {
        self.inner.block_by_number(number).await
    }
}

pub struct FakeExplorer {
    pub remote: Mutex<Result<u64, ExplorerError>>,
    pub calls: AtomicUsize,
}

impl FakeExplorer {
    pub fn at(block_number: u64) -> Arc<Self> {
        Arc::new(Self {
            remote: Mutex::new(Ok(block_number)),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn set_remote(&self, result: Result<u64, ExplorerError>) {
        *self.remote.lock().unwrap() = result;
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ExplorerClient for FakeExplorer {
    async fn remote_block_number(&self) -> Result<u64, ExplorerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.remote.lock().unwrap().clone()
    }
}

/// Factory that can never build an explorer client
pub fn failing_explorer_factory() -> ExplorerFactory {
    Box::new(|chain| {
        Err(ExplorerError::Transport {
            url: chain.explorer_url().to_string(),
            reason: "Failed to create HTTP client: TLS backend unavailable".to_string(),
        })
    })
}

/// Factory that always hands out the same explorer and records requested chains
pub fn shared_explorer_factory(
    explorer: Arc<FakeExplorer>,
) -> (ExplorerFactory, Arc<Mutex<Vec<Chain>>>) {
    let requested = Arc::new(Mutex::new(Vec::new()));
    let recorder = requested.clone();
    let factory: ExplorerFactory = Box::new(move |chain| {
        recorder.lock().unwrap().push(chain);
        Ok(explorer.clone() as Arc<dyn ExplorerClient>)
    });
    (factory, requested)
}

#[derive(Debug, Clone, PartialEq)]
pub struct GaugeSample {
    pub name: String,
    pub labels: Labels,
    pub value: f64,
}

#[derive(Default)]
pub struct RecordingSink {
    samples: Mutex<Vec<GaugeSample>>,
    removed: Mutex<Vec<String>>,
}

impl RecordingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn samples(&self) -> Vec<GaugeSample> {
        self.samples.lock().unwrap().clone()
    }

    pub fn values(&self, name: &str) -> Vec<f64> {
        self.samples()
            .into_iter()
            .filter(|s| s.name == name)
            .map(|s| s.value)
            .collect()
    }

    pub fn last(&self, name: &str) -> Option<f64> {
        self.values(name).last().copied()
    }

    pub fn clear(&self) {
        self.samples.lock().unwrap().clear();
    }

    /// Names passed to `remove_gauge`, in call order
    pub fn removed(&self) -> Vec<String> {
        self.removed.lock().unwrap().clone()
    }
}

impl MetricsSink for RecordingSink {
    fn set_gauge(&self, name: &str, labels: &Labels, value: f64) {
        self.samples.lock().unwrap().push(GaugeSample {
            name: name.to_string(),
            labels: labels.clone(),
            value,
        });
    }

    fn remove_gauge(&self, name: &str, _labels: &Labels) {
        self.removed.lock().unwrap().push(name.to_string());
    }
}

/// Registry that fails a fixed number of times before accepting
pub struct FakeRegistry {
    failures_before_success: Option<usize>,
    pub attempts: Mutex<Vec<tokio::time::Instant>>,
    pub registrations: Mutex<Vec<ServiceRegistration>>,
}

impl FakeRegistry {
    pub fn always_failing() -> Arc<Self> {
        Arc::new(Self {
            failures_before_success: None,
            attempts: Mutex::new(Vec::new()),
            registrations: Mutex::new(Vec::new()),
        })
    }

    pub fn succeeding_after(failures: usize) -> Arc<Self> {
        Arc::new(Self {
            failures_before_success: Some(failures),
            attempts: Mutex::new(Vec::new()),
            registrations: Mutex::new(Vec::new()),
        })
    }

    pub fn attempt_count(&self) -> usize {
        self.attempts.lock().unwrap().len()
    }
}

#[async_trait]
impl RegistryClient for FakeRegistry {
    async fn register_service(
        &self,
        registration: &ServiceRegistration,
    ) -> Result<(), RegistryError> {
        let attempt = {
            let mut attempts = self.attempts.lock().unwrap();
            attempts.push(tokio::time::Instant::now());
            attempts.len()
        };
        self.registrations.lock().unwrap().push(registration.clone());

        match self.failures_before_success {
            Some(failures) if attempt > failures => Ok(()),
            _ => Err(RegistryError::Transport {
                address: "http://127.0.0.1:8500".to_string(),
                reason: "connection refused".to_string(),
            }),
        }
    }
}
