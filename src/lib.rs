pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::listener::LineListener;
pub use adapters::memory::MemoryWriter;
pub use config::{toml_config::SpectatorConfig, Config, WriterConfig};
pub use core::meters::{
    AgeGauge, Counter, DistributionSummary, Gauge, MaxGauge, Meter, MonotonicCounter,
    MonotonicCounterUint, PercentileDistributionSummary, PercentileTimer, Timer,
};
pub use core::registry::Registry;
pub use domain::meter_id::MeterId;
pub use domain::meter_type::MeterType;
pub use domain::model::ProtocolLine;
pub use domain::ports::{Writer, WriterType};
pub use utils::error::{Result, SpectatorError};
