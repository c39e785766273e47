use serde::{Serialize, Serializer};
use std::fmt;

/// SpectatorD 協議中每種量測器對應的類型符號
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeterType {
    AgeGauge,
    Counter,
    DistributionSummary,
    Gauge,
    MaxGauge,
    MonotonicCounter,
    MonotonicCounterUint,
    PercentileDistributionSummary,
    PercentileTimer,
    Timer,
}

impl MeterType {
    pub const ALL: [MeterType; 10] = [
        MeterType::AgeGauge,
        MeterType::Counter,
        MeterType::DistributionSummary,
        MeterType::Gauge,
        MeterType::MaxGauge,
        MeterType::MonotonicCounter,
        MeterType::MonotonicCounterUint,
        MeterType::PercentileDistributionSummary,
        MeterType::PercentileTimer,
        MeterType::Timer,
    ];

    pub fn symbol(&self) -> char {
        match self {
            MeterType::AgeGauge => 'A',
            MeterType::Counter => 'c',
            MeterType::DistributionSummary => 'd',
            MeterType::Gauge => 'g',
            MeterType::MaxGauge => 'm',
            MeterType::MonotonicCounter => 'C',
            MeterType::MonotonicCounterUint => 'U',
            MeterType::PercentileDistributionSummary => 'D',
            MeterType::PercentileTimer => 'T',
            MeterType::Timer => 't',
        }
    }

    pub fn from_symbol(symbol: char) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.symbol() == symbol)
    }

    pub fn name(&self) -> &'static str {
        match self {
            MeterType::AgeGauge => "age_gauge",
            MeterType::Counter => "counter",
            MeterType::DistributionSummary => "distribution_summary",
            MeterType::Gauge => "gauge",
            MeterType::MaxGauge => "max_gauge",
            MeterType::MonotonicCounter => "monotonic_counter",
            MeterType::MonotonicCounterUint => "monotonic_counter_uint",
            MeterType::PercentileDistributionSummary => "percentile_distribution_summary",
            MeterType::PercentileTimer => "percentile_timer",
            MeterType::Timer => "timer",
        }
    }
}

impl fmt::Display for MeterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for MeterType {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}
