// Resource samplers

use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use tracing::warn;

use super::{CpuUsage, GpuUsage, MemoryUsage, SystemResources};

const MOCK_MEMORY_TOTAL: f64 = 8_000_000_000.0;
const MOCK_VRAM_TOTAL_GB: f64 = 12.0;

#[async_trait]
pub trait ResourceSampler: Send + Sync {
    async fn sample(&self) -> SystemResources;
}

/// Random readings in plausible ranges
#[derive(Debug, Clone, Default)]
pub struct MockSampler {
    with_gpu: bool,
}

impl MockSampler {
    pub fn new(with_gpu: bool) -> Self {
        Self { with_gpu }
    }

    pub fn generate(&self) -> SystemResources {
        let mut rng = rand::thread_rng();
        let used = rng.gen_range(0.0..MOCK_MEMORY_TOTAL / 2.0);

        SystemResources {
            memory: MemoryUsage {
                used,
                total: MOCK_MEMORY_TOTAL,
                usage_percent: used / MOCK_MEMORY_TOTAL * 100.0,
            },
            cpu: CpuUsage {
                usage_percent: rng.gen_range(25.0..85.0),
            },
            gpu: self.with_gpu.then(|| GpuUsage {
                usage_percent: rng.gen_range(30.0..80.0),
                memory_used: Some(rng.gen_range(2.0..8.0)),
                memory_total: Some(MOCK_VRAM_TOTAL_GB),
            }),
        }
    }
}

#[async_trait]
impl ResourceSampler for MockSampler {
    async fn sample(&self) -> SystemResources {
        self.generate()
    }
}

/// Fetches `<base_url>/api/system-resources`, falling back to the mock.
#[derive(Debug, Clone)]
pub struct HttpSampler {
    client: reqwest::Client,
    base_url: String,
    fallback: MockSampler,
}

impl HttpSampler {
    pub fn new(base_url: impl Into<String>, fallback: MockSampler) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap_or_default();
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            fallback,
        }
    }

    async fn fetch(&self) -> Result<SystemResources, reqwest::Error> {
        let url = format!("{}/api/system-resources", self.base_url);
        self.client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json::<SystemResources>()
            .await
    }
}

#[async_trait]
impl ResourceSampler for HttpSampler {
    async fn sample(&self) -> SystemResources {
        match self.fetch().await {
            Ok(resources) => resources,
            Err(e) => {
                warn!("Error fetching system resources, using simulated values: {}", e);
                self.fallback.generate()
            }
        }
    }
}
