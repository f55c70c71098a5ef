use super::RenderTarget;
use crate::types::AnalyticsSnapshot;

/// Emergency-vehicle banner plus the detection timeline over the sample
/// window (1 = ambulance observed, 0 = not, in window order).
#[derive(Debug, Default)]
pub struct AlertBanner {
    emergency_count: usize,
    timeline: Vec<u64>,
}

impl AlertBanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_emergency(&self) -> bool {
        self.emergency_count > 0
    }

    pub fn emergency_count(&self) -> usize {
        self.emergency_count
    }

    pub fn timeline(&self) -> &[u64] {
        &self.timeline
    }

    pub fn message(&self) -> String {
        if self.has_emergency() {
            format!(
                "{} ambulance{} detected - Priority activated",
                self.emergency_count,
                if self.emergency_count > 1 { "s" } else { "" }
            )
        } else {
            "No emergency vehicles detected".to_string()
        }
    }
}

impl RenderTarget for AlertBanner {
    type Snapshot = AnalyticsSnapshot;

    fn apply(&mut self, snapshot: &Self::Snapshot) {
        self.timeline = snapshot
            .traffic_data
            .iter()
            .map(|s| u64::from(s.is_emergency()))
            .collect();
        self.emergency_count = snapshot
            .traffic_data
            .iter()
            .filter(|s| s.is_emergency())
            .count();
    }
}
