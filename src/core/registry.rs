use crate::adapters::memory::MemoryWriter;
use crate::adapters::udp::UdpWriter;
use crate::config::writer_config::{parse_udp_address, parse_unix_address};
use crate::config::Config;
use crate::core::meters::{
    AgeGauge, Counter, DistributionSummary, Gauge, MaxGauge, MonotonicCounter,
    MonotonicCounterUint, PercentileDistributionSummary, PercentileTimer, Timer,
};
use crate::core::publisher::Publisher;
use crate::domain::meter_id::MeterId;
use crate::domain::ports::{Writer, WriterType};
use crate::utils::error::Result;
use std::sync::Arc;

/// 建立量測器的入口；所有量測器共用同一個 Publisher
pub struct Registry {
    config: Config,
    publisher: Arc<Publisher>,
    memory: Option<Arc<MemoryWriter>>,
}

impl Registry {
    pub fn new(config: Config) -> Result<Self> {
        let writer_config = config.writer_config();
        let mut memory = None;

        let writer: Arc<dyn Writer> = match config.writer_type() {
            WriterType::Memory => {
                tracing::info!("Registry initializing Memory Writer");
                let writer = Arc::new(MemoryWriter::new());
                memory = Some(Arc::clone(&writer));
                writer
            }
            WriterType::Udp => {
                let (host, port) = parse_udp_address(writer_config.location())?;
                tracing::info!("Registry initializing UDP Writer at {}:{}", host, port);
                Arc::new(UdpWriter::new(&host, port)?)
            }
            WriterType::Unix => {
                let path = parse_unix_address(writer_config.location())?;
                tracing::info!("Registry initializing UDS Writer at {}", path.display());
                unix_writer(path)?
            }
        };

        let publisher = Publisher::buffered(
            writer,
            writer_config.buffer_size(),
            writer_config.flush_interval(),
        )?;

        Ok(Self {
            config,
            publisher: Arc::new(publisher),
            memory,
        })
    }

    /// Uses a caller-provided writer instead of the one the config describes.
    pub fn with_writer(config: Config, writer: Arc<dyn Writer>) -> Result<Self> {
        let writer_config = config.writer_config();
        let publisher = Publisher::buffered(
            writer,
            writer_config.buffer_size(),
            writer_config.flush_interval(),
        )?;
        Ok(Self {
            config,
            publisher: Arc::new(publisher),
            memory: None,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The in-memory writer, when the registry was configured with `memory`.
    pub fn memory_writer(&self) -> Option<&MemoryWriter> {
        self.memory.as_deref()
    }

    /// Id with the configured extra tags merged in; extra tags win on conflict.
    pub fn new_id(&self, name: &str, tags: &[(&str, &str)]) -> MeterId {
        let id = MeterId::new(name, tags);
        if self.config.extra_tags().is_empty() {
            return id;
        }
        id.with_tags(
            self.config
                .extra_tags()
                .iter()
                .map(|(k, v)| (k.as_str(), v.as_str())),
        )
    }

    fn publisher(&self) -> Arc<Publisher> {
        Arc::clone(&self.publisher)
    }

    pub fn age_gauge(&self, name: &str, tags: &[(&str, &str)]) -> AgeGauge {
        self.age_gauge_with_id(self.new_id(name, tags))
    }

    pub fn age_gauge_with_id(&self, id: MeterId) -> AgeGauge {
        AgeGauge::new(id, self.publisher())
    }

    pub fn counter(&self, name: &str, tags: &[(&str, &str)]) -> Counter {
        self.counter_with_id(self.new_id(name, tags))
    }

    pub fn counter_with_id(&self, id: MeterId) -> Counter {
        Counter::new(id, self.publisher())
    }

    pub fn distribution_summary(&self, name: &str, tags: &[(&str, &str)]) -> DistributionSummary {
        self.distribution_summary_with_id(self.new_id(name, tags))
    }

    pub fn distribution_summary_with_id(&self, id: MeterId) -> DistributionSummary {
        DistributionSummary::new(id, self.publisher())
    }

    pub fn gauge(&self, name: &str, tags: &[(&str, &str)], ttl_seconds: Option<u32>) -> Gauge {
        self.gauge_with_id(self.new_id(name, tags), ttl_seconds)
    }

    pub fn gauge_with_id(&self, id: MeterId, ttl_seconds: Option<u32>) -> Gauge {
        Gauge::new(id, ttl_seconds, self.publisher())
    }

    pub fn max_gauge(&self, name: &str, tags: &[(&str, &str)]) -> MaxGauge {
        self.max_gauge_with_id(self.new_id(name, tags))
    }

    pub fn max_gauge_with_id(&self, id: MeterId) -> MaxGauge {
        MaxGauge::new(id, self.publisher())
    }

    pub fn monotonic_counter(&self, name: &str, tags: &[(&str, &str)]) -> MonotonicCounter {
        self.monotonic_counter_with_id(self.new_id(name, tags))
    }

    pub fn monotonic_counter_with_id(&self, id: MeterId) -> MonotonicCounter {
        MonotonicCounter::new(id, self.publisher())
    }

    pub fn monotonic_counter_uint(&self, name: &str, tags: &[(&str, &str)]) -> MonotonicCounterUint {
        self.monotonic_counter_uint_with_id(self.new_id(name, tags))
    }

    pub fn monotonic_counter_uint_with_id(&self, id: MeterId) -> MonotonicCounterUint {
        MonotonicCounterUint::new(id, self.publisher())
    }

    pub fn pct_distribution_summary(
        &self,
        name: &str,
        tags: &[(&str, &str)],
    ) -> PercentileDistributionSummary {
        self.pct_distribution_summary_with_id(self.new_id(name, tags))
    }

    pub fn pct_distribution_summary_with_id(&self, id: MeterId) -> PercentileDistributionSummary {
        PercentileDistributionSummary::new(id, self.publisher())
    }

    pub fn pct_timer(&self, name: &str, tags: &[(&str, &str)]) -> PercentileTimer {
        self.pct_timer_with_id(self.new_id(name, tags))
    }

    pub fn pct_timer_with_id(&self, id: MeterId) -> PercentileTimer {
        PercentileTimer::new(id, self.publisher())
    }

    pub fn timer(&self, name: &str, tags: &[(&str, &str)]) -> Timer {
        self.timer_with_id(self.new_id(name, tags))
    }

    pub fn timer_with_id(&self, id: MeterId) -> Timer {
        Timer::new(id, self.publisher())
    }

    /// Sends anything still buffered without closing.
    pub fn flush(&self) {
        self.publisher.flush();
    }

    /// Flushes and closes the writer. Meters created earlier keep working
    /// but their updates are dropped.
    pub fn close(&self) {
        tracing::info!("Registry closing writer");
        self.publisher.close();
    }
}

#[cfg(unix)]
fn unix_writer(path: std::path::PathBuf) -> Result<Arc<dyn Writer>> {
    Ok(Arc::new(crate::adapters::uds::UdsWriter::new(path)))
}

#[cfg(not(unix))]
fn unix_writer(path: std::path::PathBuf) -> Result<Arc<dyn Writer>> {
    Err(crate::utils::error::SpectatorError::InvalidAddress {
        address: path.display().to_string(),
        reason: "Unix domain sockets are not supported on this platform".to_string(),
    })
}
