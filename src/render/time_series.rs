use super::RenderTarget;
use crate::types::AnalyticsSnapshot;

/// Total vehicle count over the sample window, labels taken straight from
/// the samples' time strings (window order, newest first).
#[derive(Debug, Default)]
pub struct VehicleCountChart {
    labels: Vec<String>,
    counts: Vec<u64>,
}

impl VehicleCountChart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    /// Y view window. The dashboard chart does not sit on zero; it floats
    /// with a suggested floor of 100 so small fluctuations stay readable.
    pub fn y_bounds(&self) -> (f64, f64) {
        let min = self.counts.iter().min().copied().unwrap_or(0) as f64;
        let max = self.counts.iter().max().copied().unwrap_or(0) as f64;
        (min.min(100.0), max.max(min.min(100.0) + 1.0))
    }
}

impl RenderTarget for VehicleCountChart {
    type Snapshot = AnalyticsSnapshot;

    fn apply(&mut self, snapshot: &Self::Snapshot) {
        self.labels = snapshot.traffic_data.iter().map(|s| s.time.clone()).collect();
        self.counts = snapshot
            .traffic_data
            .iter()
            .map(|s| u64::from(s.count))
            .collect();
    }
}

/// Precision / Recall / F1 over the window, restricted to samples where
/// all three metrics are present (> 0). Percentage scale, fixed 80..100
/// view window like the dashboard chart.
#[derive(Debug, Default)]
pub struct ModelPerformanceChart {
    labels: Vec<String>,
    precision: Vec<f64>,
    recall: Vec<f64>,
    f1: Vec<f64>,
}

impl ModelPerformanceChart {
    pub const Y_BOUNDS: (f64, f64) = (80.0, 100.0);

    pub fn new() -> Self {
        Self::default()
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn precision(&self) -> &[f64] {
        &self.precision
    }

    pub fn recall(&self) -> &[f64] {
        &self.recall
    }

    pub fn f1(&self) -> &[f64] {
        &self.f1
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

impl RenderTarget for ModelPerformanceChart {
    type Snapshot = AnalyticsSnapshot;

    fn apply(&mut self, snapshot: &Self::Snapshot) {
        let scored: Vec<_> = snapshot
            .traffic_data
            .iter()
            .filter(|s| s.precision > 0.0 && s.recall > 0.0 && s.f1_score > 0.0)
            .collect();

        self.labels = scored.iter().map(|s| s.time.clone()).collect();
        self.precision = scored.iter().map(|s| s.precision).collect();
        self.recall = scored.iter().map(|s| s.recall).collect();
        self.f1 = scored.iter().map(|s| s.f1_score).collect();
    }
}
