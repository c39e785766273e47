//! Stateless meters. Every update becomes one protocol line
//! `<type>:<id>:<value>`; nothing is aggregated in-process.

use crate::core::publisher::Publisher;
use crate::domain::meter_id::MeterId;
use crate::domain::meter_type::MeterType;
use std::sync::Arc;
use std::time::Duration;

const FIELD_SEPARATOR: char = ':';

pub trait Meter {
    fn id(&self) -> &MeterId;
    fn meter_type(&self) -> MeterType;
}

#[derive(Clone)]
struct MeterBase {
    id: MeterId,
    prefix: String,
    publisher: Arc<Publisher>,
}

impl MeterBase {
    fn new(id: MeterId, type_symbol: &str, publisher: Arc<Publisher>) -> Self {
        let prefix = format!(
            "{}{}{}{}",
            type_symbol,
            FIELD_SEPARATOR,
            id.spectatord_id(),
            FIELD_SEPARATOR
        );
        Self {
            id,
            prefix,
            publisher,
        }
    }

    fn of_type(id: MeterId, meter_type: MeterType, publisher: Arc<Publisher>) -> Self {
        Self::new(id, &meter_type.symbol().to_string(), publisher)
    }

    fn send_f64(&self, value: f64) {
        self.publisher.write(&format!("{}{:.6}", self.prefix, value));
    }

    fn send_int<T: std::fmt::Display>(&self, value: T) {
        self.publisher.write(&format!("{}{}", self.prefix, value));
    }
}

/// Age of an event; SpectatorD reports the seconds since the last `now()`.
#[derive(Clone)]
pub struct AgeGauge {
    base: MeterBase,
}

impl AgeGauge {
    pub(crate) fn new(id: MeterId, publisher: Arc<Publisher>) -> Self {
        Self {
            base: MeterBase::of_type(id, MeterType::AgeGauge, publisher),
        }
    }

    pub fn now(&self) {
        self.base.send_int(0);
    }

    pub fn set(&self, seconds: f64) {
        self.base.send_f64(seconds);
    }
}

#[derive(Clone)]
pub struct Counter {
    base: MeterBase,
}

impl Counter {
    pub(crate) fn new(id: MeterId, publisher: Arc<Publisher>) -> Self {
        Self {
            base: MeterBase::of_type(id, MeterType::Counter, publisher),
        }
    }

    pub fn increment(&self) {
        self.add(1.0);
    }

    /// Non-positive deltas are ignored.
    pub fn add(&self, delta: f64) {
        if delta > 0.0 {
            self.base.send_f64(delta);
        }
    }
}

#[derive(Clone)]
pub struct DistributionSummary {
    base: MeterBase,
}

impl DistributionSummary {
    pub(crate) fn new(id: MeterId, publisher: Arc<Publisher>) -> Self {
        Self {
            base: MeterBase::of_type(id, MeterType::DistributionSummary, publisher),
        }
    }

    pub fn record(&self, amount: i64) {
        if amount >= 0 {
            self.base.send_int(amount);
        }
    }
}

#[derive(Clone)]
pub struct Gauge {
    base: MeterBase,
    ttl_seconds: Option<u32>,
}

impl Gauge {
    pub(crate) fn new(id: MeterId, ttl_seconds: Option<u32>, publisher: Arc<Publisher>) -> Self {
        // TTL 放在類型符號後面：g,<ttl>
        let symbol = match ttl_seconds {
            Some(ttl) => format!("{},{}", MeterType::Gauge.symbol(), ttl),
            None => MeterType::Gauge.symbol().to_string(),
        };
        Self {
            base: MeterBase::new(id, &symbol, publisher),
            ttl_seconds,
        }
    }

    pub fn ttl_seconds(&self) -> Option<u32> {
        self.ttl_seconds
    }

    pub fn set(&self, value: f64) {
        self.base.send_f64(value);
    }
}

#[derive(Clone)]
pub struct MaxGauge {
    base: MeterBase,
}

impl MaxGauge {
    pub(crate) fn new(id: MeterId, publisher: Arc<Publisher>) -> Self {
        Self {
            base: MeterBase::of_type(id, MeterType::MaxGauge, publisher),
        }
    }

    pub fn set(&self, value: f64) {
        self.base.send_f64(value);
    }
}

/// Reports a monotonically increasing total; SpectatorD computes the rate.
#[derive(Clone)]
pub struct MonotonicCounter {
    base: MeterBase,
}

impl MonotonicCounter {
    pub(crate) fn new(id: MeterId, publisher: Arc<Publisher>) -> Self {
        Self {
            base: MeterBase::of_type(id, MeterType::MonotonicCounter, publisher),
        }
    }

    pub fn set(&self, amount: f64) {
        self.base.send_f64(amount);
    }
}

#[derive(Clone)]
pub struct MonotonicCounterUint {
    base: MeterBase,
}

impl MonotonicCounterUint {
    pub(crate) fn new(id: MeterId, publisher: Arc<Publisher>) -> Self {
        Self {
            base: MeterBase::of_type(id, MeterType::MonotonicCounterUint, publisher),
        }
    }

    pub fn set(&self, amount: u64) {
        self.base.send_int(amount);
    }
}

#[derive(Clone)]
pub struct PercentileDistributionSummary {
    base: MeterBase,
}

impl PercentileDistributionSummary {
    pub(crate) fn new(id: MeterId, publisher: Arc<Publisher>) -> Self {
        Self {
            base: MeterBase::of_type(id, MeterType::PercentileDistributionSummary, publisher),
        }
    }

    pub fn record(&self, amount: i64) {
        if amount >= 0 {
            self.base.send_int(amount);
        }
    }
}

#[derive(Clone)]
pub struct PercentileTimer {
    base: MeterBase,
}

impl PercentileTimer {
    pub(crate) fn new(id: MeterId, publisher: Arc<Publisher>) -> Self {
        Self {
            base: MeterBase::of_type(id, MeterType::PercentileTimer, publisher),
        }
    }

    pub fn record(&self, seconds: f64) {
        if seconds >= 0.0 {
            self.base.send_f64(seconds);
        }
    }

    pub fn record_duration(&self, duration: Duration) {
        self.record(duration.as_secs_f64());
    }
}

#[derive(Clone)]
pub struct Timer {
    base: MeterBase,
}

impl Timer {
    pub(crate) fn new(id: MeterId, publisher: Arc<Publisher>) -> Self {
        Self {
            base: MeterBase::of_type(id, MeterType::Timer, publisher),
        }
    }

    pub fn record(&self, seconds: f64) {
        if seconds >= 0.0 {
            self.base.send_f64(seconds);
        }
    }

    pub fn record_duration(&self, duration: Duration) {
        self.record(duration.as_secs_f64());
    }
}

macro_rules! impl_meter {
    ($($meter:ty => $kind:expr),* $(,)?) => {
        $(
            impl Meter for $meter {
                fn id(&self) -> &MeterId {
                    &self.base.id
                }

                fn meter_type(&self) -> MeterType {
                    $kind
                }
            }
        )*
    };
}

impl_meter!(
    AgeGauge => MeterType::AgeGauge,
    Counter => MeterType::Counter,
    DistributionSummary => MeterType::DistributionSummary,
    Gauge => MeterType::Gauge,
    MaxGauge => MeterType::MaxGauge,
    MonotonicCounter => MeterType::MonotonicCounter,
    MonotonicCounterUint => MeterType::MonotonicCounterUint,
    PercentileDistributionSummary => MeterType::PercentileDistributionSummary,
    PercentileTimer => MeterType::PercentileTimer,
    Timer => MeterType::Timer,
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryWriter;

    fn setup() -> (Arc<MemoryWriter>, Arc<Publisher>) {
        let memory = Arc::new(MemoryWriter::new());
        let publisher = Arc::new(Publisher::new(memory.clone()));
        (memory, publisher)
    }

    #[test]
    fn test_age_gauge() {
        let (memory, publisher) = setup();
        let g = AgeGauge::new(MeterId::new("age_gauge", &[]), publisher);
        assert!(memory.is_empty());
        g.now();
        assert_eq!(memory.last_line(), "A:age_gauge:0\n");
        g.set(10.0);
        assert_eq!(memory.last_line(), "A:age_gauge:10.000000\n");
    }

    #[test]
    fn test_counter() {
        let (memory, publisher) = setup();
        let c = Counter::new(MeterId::new("counter", &[]), publisher);
        c.increment();
        assert_eq!(memory.last_line(), "c:counter:1.000000\n");
        c.add(2.0);
        assert_eq!(memory.last_line(), "c:counter:2.000000\n");
        c.add(2.5);
        assert_eq!(memory.last_line(), "c:counter:2.500000\n");
    }

    #[test]
    fn test_counter_ignores_non_positive() {
        let (memory, publisher) = setup();
        let c = Counter::new(MeterId::new("counter", &[]), publisher);
        c.add(-1.0);
        c.add(0.0);
        c.add(f64::NAN);
        assert!(memory.is_empty());
    }

    #[test]
    fn test_distribution_summaries() {
        let (memory, publisher) = setup();
        let d = DistributionSummary::new(MeterId::new("ds", &[]), publisher.clone());
        let pd = PercentileDistributionSummary::new(MeterId::new("pds", &[]), publisher);

        d.record(42);
        assert_eq!(memory.last_line(), "d:ds:42\n");
        pd.record(7);
        assert_eq!(memory.last_line(), "D:pds:7\n");

        d.record(-1);
        pd.record(-1);
        assert_eq!(memory.messages().len(), 2);
    }

    #[test]
    fn test_gauge_with_and_without_ttl() {
        let (memory, publisher) = setup();
        let g = Gauge::new(MeterId::new("gauge", &[]), None, publisher.clone());
        g.set(1.0);
        assert_eq!(memory.last_line(), "g:gauge:1.000000\n");

        let ttl = Gauge::new(MeterId::new("gauge", &[]), Some(10), publisher);
        ttl.set(42.0);
        assert_eq!(memory.last_line(), "g,10:gauge:42.000000\n");
        assert_eq!(ttl.ttl_seconds(), Some(10));
    }

    #[test]
    fn test_max_gauge_and_monotonic_counters() {
        let (memory, publisher) = setup();
        MaxGauge::new(MeterId::new("max", &[]), publisher.clone()).set(42.0);
        assert_eq!(memory.last_line(), "m:max:42.000000\n");

        MonotonicCounter::new(MeterId::new("mono", &[]), publisher.clone()).set(1.5);
        assert_eq!(memory.last_line(), "C:mono:1.500000\n");

        MonotonicCounterUint::new(MeterId::new("mono_u", &[]), publisher).set(u64::MAX);
        assert_eq!(memory.last_line(), "U:mono_u:18446744073709551615\n");
    }

    #[test]
    fn test_timers() {
        let (memory, publisher) = setup();
        let t = Timer::new(MeterId::new("timer", &[]), publisher.clone());
        let pt = PercentileTimer::new(MeterId::new("ptimer", &[]), publisher);

        t.record(0.042);
        assert_eq!(memory.last_line(), "t:timer:0.042000\n");
        t.record_duration(Duration::from_millis(1500));
        assert_eq!(memory.last_line(), "t:timer:1.500000\n");

        pt.record(1.0);
        assert_eq!(memory.last_line(), "T:ptimer:1.000000\n");
        pt.record_duration(Duration::from_micros(250));
        assert_eq!(memory.last_line(), "T:ptimer:0.000250\n");

        t.record(-1.0);
        pt.record(-0.5);
        assert_eq!(memory.messages().len(), 4);
    }

    #[test]
    fn test_meter_accessors_and_tagged_ids() {
        let (memory, publisher) = setup();
        let id = MeterId::new("requests", &[("status", "200"), ("method", "GET")]);
        let c = Counter::new(id.clone(), publisher);
        assert_eq!(c.id(), &id);
        assert_eq!(c.meter_type(), MeterType::Counter);

        c.increment();
        assert_eq!(memory.last_line(), "c:requests,method=GET,status=200:1.000000\n");
    }
}
