use super::RenderTarget;
use crate::types::{AnalyticsSnapshot, LaneId, PerLane};

/// How many of the most recent samples the distribution window shows.
const WINDOW: usize = 12;

/// Per-lane vehicle distribution over the recent window: one series per
/// lane, chronological left to right. Samples arrive newest-first, so the
/// window is the first `WINDOW` entries, reversed.
#[derive(Debug, Default)]
pub struct LaneDistributionChart {
    labels: Vec<String>,
    series: PerLane<Vec<u64>>,
}

impl LaneDistributionChart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn series(&self, lane: LaneId) -> &[u64] {
        self.series.get(lane)
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

impl RenderTarget for LaneDistributionChart {
    type Snapshot = AnalyticsSnapshot;

    fn apply(&mut self, snapshot: &Self::Snapshot) {
        let recent: Vec<_> = snapshot
            .traffic_data
            .iter()
            .take(WINDOW)
            .rev()
            .collect();

        self.labels = recent.iter().map(|s| s.time.clone()).collect();
        self.series = PerLane::from(LaneId::ALL.map(|lane| {
            recent
                .iter()
                .map(|s| u64::from(s.lane_count(lane)))
                .collect::<Vec<_>>()
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TrafficSample;

    fn snapshot_with(n: usize) -> AnalyticsSnapshot {
        // Newest-first: sample 0 is the latest observation.
        let traffic_data = (0..n)
            .map(|i| TrafficSample {
                time: format!("12:00:{:02}", n - i),
                lane1: i as u32,
                lane2: 10 + i as u32,
                lane3: 20 + i as u32,
                lane4: 30 + i as u32,
                ..TrafficSample::default()
            })
            .collect();
        AnalyticsSnapshot {
            traffic_data,
            ..AnalyticsSnapshot::default()
        }
    }

    #[test]
    fn test_uses_first_twelve_reversed_to_chronological() {
        let mut chart = LaneDistributionChart::new();
        chart.apply(&snapshot_with(13));

        // Exactly the 12 most recent samples; the 13th (oldest) is ignored.
        assert_eq!(chart.labels().len(), 12);
        // Chronological order: oldest of the window first.
        assert_eq!(chart.labels().first().unwrap(), "12:00:02");
        assert_eq!(chart.labels().last().unwrap(), "12:00:13");
        // Series run oldest -> newest too.
        assert_eq!(chart.series(LaneId::Lane1), &[11, 10, 9, 8, 7, 6, 5, 4, 3, 2, 1, 0]);
        assert_eq!(chart.series(LaneId::Lane4)[11], 30);
    }

    #[test]
    fn test_short_window_uses_everything() {
        let mut chart = LaneDistributionChart::new();
        chart.apply(&snapshot_with(3));
        assert_eq!(chart.labels().len(), 3);
        assert_eq!(chart.series(LaneId::Lane2), &[12, 11, 10]);
    }

    #[test]
    fn test_apply_replaces_instead_of_appending() {
        let snap = snapshot_with(5);
        let mut chart = LaneDistributionChart::new();
        chart.apply(&snap);
        chart.apply(&snap);
        assert_eq!(chart.labels().len(), 5);
        assert_eq!(chart.series(LaneId::Lane1).len(), 5);
    }
}
