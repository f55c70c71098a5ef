use super::RenderTarget;
use crate::types::{LaneId, PerLane};

/// Per-lane vehicle counters from the live feed, with the derived total.
#[derive(Debug, Default)]
pub struct LaneCounters {
    counts: PerLane<u32>,
}

impl LaneCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, lane: LaneId) -> u32 {
        *self.counts.get(lane)
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().map(|(_, c)| u64::from(*c)).sum()
    }
}

impl RenderTarget for LaneCounters {
    type Snapshot = PerLane<u32>;

    fn apply(&mut self, snapshot: &Self::Snapshot) {
        self.counts = snapshot.clone();
    }
}

/// Per-lane emergency indicators from the live ambulance feed.
#[derive(Debug, Default)]
pub struct AmbulancePanel {
    flags: PerLane<bool>,
}

impl AmbulancePanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_emergency(&self, lane: LaneId) -> bool {
        *self.flags.get(lane)
    }

    /// Number of lanes currently reporting an emergency vehicle.
    pub fn emergency_count(&self) -> usize {
        self.flags.iter().filter(|(_, f)| **f).count()
    }
}

impl RenderTarget for AmbulancePanel {
    type Snapshot = PerLane<bool>;

    fn apply(&mut self, snapshot: &Self::Snapshot) {
        self.flags = snapshot.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lane_counters_total() {
        let mut counters = LaneCounters::new();
        counters.apply(&PerLane::from([12, 7, 0, 31]));
        assert_eq!(counters.count(LaneId::Lane1), 12);
        assert_eq!(counters.count(LaneId::Lane3), 0);
        assert_eq!(counters.total(), 50);
    }

    #[test]
    fn test_ambulance_panel_counts_flagged_lanes() {
        let mut panel = AmbulancePanel::new();
        panel.apply(&PerLane::from([false, true, false, true]));
        assert!(!panel.is_emergency(LaneId::Lane1));
        assert!(panel.is_emergency(LaneId::Lane2));
        assert_eq!(panel.emergency_count(), 2);

        panel.apply(&PerLane::default());
        assert_eq!(panel.emergency_count(), 0);
    }
}
