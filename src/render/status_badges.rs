use super::RenderTarget;
use crate::congestion::{self, CongestionLevel};
use crate::types::{AnalyticsSnapshot, LaneId};

/// One classified lane badge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaneBadge {
    pub lane: LaneId,
    pub count: u32,
    pub level: CongestionLevel,
}

/// Per-lane congestion badges, classified from the latest sample's lane
/// counts. Empty until the first sample arrives.
#[derive(Debug, Default)]
pub struct CongestionBadges {
    badges: Vec<LaneBadge>,
}

impl CongestionBadges {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn badges(&self) -> &[LaneBadge] {
        &self.badges
    }
}

impl RenderTarget for CongestionBadges {
    type Snapshot = AnalyticsSnapshot;

    fn apply(&mut self, snapshot: &Self::Snapshot) {
        let Some(latest) = snapshot.latest() else {
            self.badges.clear();
            return;
        };
        self.badges = LaneId::ALL
            .iter()
            .map(|&lane| {
                let count = latest.lane_count(lane);
                LaneBadge {
                    lane,
                    count,
                    level: congestion::level(count),
                }
            })
            .collect();
    }
}
