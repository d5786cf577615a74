//! System Resource Monitor
//!
//! Samples memory/CPU/GPU usage while a model is loading or running. The
//! numbers are simulated; an HTTP source is tried first when configured and
//! falls back to the simulation on any failure.

pub mod sampler;

pub use sampler::{HttpSampler, MockSampler, ResourceSampler};

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::scheduler::{self, TaskHandle};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryUsage {
    pub used: f64,
    pub total: f64,
    pub usage_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CpuUsage {
    pub usage_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GpuUsage {
    pub usage_percent: f64,
    /// GB
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_used: Option<f64>,
    /// GB
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_total: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemResources {
    pub memory: MemoryUsage,
    pub cpu: CpuUsage,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gpu: Option<GpuUsage>,
}

impl SystemResources {
    /// All-zero reading used when sampling itself fails
    pub fn empty() -> Self {
        Self {
            memory: MemoryUsage {
                used: 0.0,
                total: 1.0,
                usage_percent: 0.0,
            },
            cpu: CpuUsage { usage_percent: 0.0 },
            gpu: None,
        }
    }
}

/// Human-readable byte count: "512 B", "1.50 KB", "7.45 GB"
pub fn format_memory(bytes: f64) -> String {
    if bytes < 1024.0 {
        return format!("{} B", bytes);
    }
    const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];
    let mut value = bytes;
    let mut unit = 0usize;
    value /= 1024.0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.2} {}", value, UNITS[unit])
}

/// Polls a sampler on a fixed interval while the model is busy.
pub struct ResourceMonitor {
    sampler: Arc<dyn ResourceSampler>,
    interval: Duration,
    latest_tx: Arc<watch::Sender<Option<SystemResources>>>,
    latest_rx: watch::Receiver<Option<SystemResources>>,
    poller: Option<TaskHandle>,
}

impl ResourceMonitor {
    /// A zero interval falls back to [`DEFAULT_POLL_INTERVAL`].
    pub fn new(sampler: Arc<dyn ResourceSampler>, interval: Duration) -> Self {
        let interval = if interval.is_zero() {
            warn!("Zero resource poll interval, using the default");
            DEFAULT_POLL_INTERVAL
        } else {
            interval
        };
        let (tx, rx) = watch::channel(None);
        Self {
            sampler,
            interval,
            latest_tx: Arc::new(tx),
            latest_rx: rx,
            poller: None,
        }
    }

    /// Start polling when `active`, stop when not. Idempotent either way.
    pub fn sync(&mut self, active: bool) {
        match (active, self.poller.is_some()) {
            (true, false) => self.start(),
            (false, true) => self.stop(),
            _ => {}
        }
    }

    fn start(&mut self) {
        let sampler = Arc::clone(&self.sampler);
        let tx = Arc::clone(&self.latest_tx);
        info!(interval_ms = self.interval.as_millis() as u64, "Resource polling started");
        self.poller = Some(scheduler::spawn_every("resource-poll", self.interval, move || {
            let sampler = Arc::clone(&sampler);
            let tx = Arc::clone(&tx);
            async move {
                let sample = sampler.sample().await;
                debug!(cpu = sample.cpu.usage_percent, "Resource sample");
                tx.send_replace(Some(sample));
                true
            }
        }));
    }

    pub fn stop(&mut self) {
        if let Some(mut handle) = self.poller.take() {
            handle.cancel();
            info!("Resource polling stopped");
        }
    }

    pub fn is_polling(&self) -> bool {
        self.poller.is_some()
    }

    /// The most recent sample; kept after polling stops.
    pub fn latest(&self) -> Option<SystemResources> {
        self.latest_rx.borrow().clone()
    }
}
