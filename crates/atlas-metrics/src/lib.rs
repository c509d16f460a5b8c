//! Latency measurement for the replay and benchmark harnesses.
//!
//! Nanosecond-precision histograms backed by HdrHistogram, and a raw
//! TSC-based clock for timing individual operations with minimal overhead.

use hdrhistogram::Histogram;

/// Percentile summary of a recorded latency distribution.
#[derive(Clone, Copy, Debug, Default)]
pub struct Percentiles {
    pub p50: u64,
    pub p90: u64,
    pub p99: u64,
    pub p999: u64,
    pub max: u64,
    pub count: u64,
}

/// High-precision latency histogram (values in nanoseconds).
pub struct LatencyHistogram {
    histogram: Histogram<u64>,
}

impl LatencyHistogram {
    /// Create a histogram with 3 significant digits of precision.
    pub fn new() -> Self {
        Self {
            histogram: Histogram::new(3).expect("failed to create histogram"),
        }
    }

    /// Record a latency value in nanoseconds.
    #[inline(always)]
    pub fn record(&mut self, nanos: u64) {
        let _ = self.histogram.record(nanos);
    }

    /// Summarize the recorded distribution.
    pub fn percentiles(&self) -> Percentiles {
        Percentiles {
            p50: self.histogram.value_at_quantile(0.50),
            p90: self.histogram.value_at_quantile(0.90),
            p99: self.histogram.value_at_quantile(0.99),
            p999: self.histogram.value_at_quantile(0.999),
            max: self.histogram.max(),
            count: self.histogram.len(),
        }
    }

    /// Mean recorded latency.
    pub fn mean(&self) -> f64 {
        self.histogram.mean()
    }

    /// Forget everything recorded so far.
    pub fn reset(&mut self) {
        self.histogram.reset();
    }

    /// Print a one-block summary of the distribution.
    pub fn print_summary(&self, label: &str) {
        let p = self.percentiles();
        println!("{label} ({} samples):", p.count);
        println!("  P50:   {:>9} ns", p.p50);
        println!("  P90:   {:>9} ns", p.p90);
        println!("  P99:   {:>9} ns", p.p99);
        println!("  P99.9: {:>9} ns", p.p999);
        println!("  Max:   {:>9} ns", p.max);
    }
}

impl Default for LatencyHistogram {
    fn default() -> Self {
        Self::new()
    }
}

/// Raw-counter clock for low-overhead operation timing.
pub struct TscClock {
    clock: quanta::Clock,
}

impl TscClock {
    /// Create a calibrated clock.
    pub fn new() -> Self {
        Self {
            clock: quanta::Clock::new(),
        }
    }

    /// Current raw counter value.
    #[inline(always)]
    pub fn now(&self) -> u64 {
        self.clock.raw()
    }

    /// Elapsed nanoseconds between two raw readings.
    #[inline(always)]
    pub fn delta_nanos(&self, start: u64, end: u64) -> u64 {
        self.clock.delta_as_nanos(start, end)
    }
}

impl Default for TscClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_histogram_percentiles() {
        let mut h = LatencyHistogram::new();
        for i in 1..=1000u64 {
            h.record(i * 10);
        }

        let p = h.percentiles();
        assert_eq!(p.count, 1000);
        assert!(p.p50 >= 4900 && p.p50 <= 5100);
        assert!(p.max >= 9990);
        assert!(p.p50 <= p.p90 && p.p90 <= p.p99 && p.p99 <= p.max);
    }

    #[test]
    fn test_histogram_reset() {
        let mut h = LatencyHistogram::new();
        h.record(100);
        h.reset();
        assert_eq!(h.percentiles().count, 0);
    }

    #[test]
    fn test_clock_monotonic_delta() {
        let clock = TscClock::new();
        let start = clock.now();
        let end = clock.now();
        // Raw readings never run backwards.
        let _ = clock.delta_nanos(start, end);
    }
}
