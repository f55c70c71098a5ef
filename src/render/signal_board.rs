use super::RenderTarget;
use crate::types::{LaneId, LaneSignalState, LightColor, PerLane};

/// Traffic-light board: per-lane active light and countdown, plus the
/// aggregate wait figure.
#[derive(Debug, Default)]
pub struct SignalBoard {
    states: PerLane<LaneSignalState>,
}

impl SignalBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_lit(&self, lane: LaneId, color: LightColor) -> bool {
        self.states.get(lane).color == color
    }

    /// Countdown display, zero-padded to two digits ("05", "30", "100").
    pub fn timer_text(&self, lane: LaneId) -> String {
        format!("{:02}", self.states.get(lane).timer)
    }

    /// Longest remaining red time across lanes. The dashboard presents
    /// this under an "Avg Wait" label; it has always been a maximum, so
    /// the name says what it computes.
    pub fn max_remaining_red(&self) -> u32 {
        self.states
            .iter()
            .map(|(_, s)| s.remaining_red)
            .max()
            .unwrap_or(0)
    }
}

impl RenderTarget for SignalBoard {
    type Snapshot = PerLane<LaneSignalState>;

    fn apply(&mut self, snapshot: &Self::Snapshot) {
        self.states = snapshot.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn states() -> PerLane<LaneSignalState> {
        PerLane::from([
            LaneSignalState { color: LightColor::Green, timer: 8, remaining_red: 0 },
            LaneSignalState { color: LightColor::Red, timer: 30, remaining_red: 30 },
            LaneSignalState { color: LightColor::Red, timer: 5, remaining_red: 60 },
            LaneSignalState { color: LightColor::Yellow, timer: 3, remaining_red: 90 },
        ])
    }

    #[test]
    fn test_exactly_one_light_lit_per_lane() {
        let mut board = SignalBoard::new();
        board.apply(&states());
        for lane in LaneId::ALL {
            let lit = [LightColor::Red, LightColor::Yellow, LightColor::Green]
                .iter()
                .filter(|&&c| board.is_lit(lane, c))
                .count();
            assert_eq!(lit, 1);
        }
        assert!(board.is_lit(LaneId::Lane1, LightColor::Green));
        assert!(board.is_lit(LaneId::Lane4, LightColor::Yellow));
    }

    #[test]
    fn test_timer_text_is_zero_padded() {
        let mut board = SignalBoard::new();
        board.apply(&states());
        assert_eq!(board.timer_text(LaneId::Lane3), "05");
        assert_eq!(board.timer_text(LaneId::Lane2), "30");

        board.apply(&PerLane::from([
            LaneSignalState { timer: 100, ..LaneSignalState::default() },
            LaneSignalState::default(),
            LaneSignalState::default(),
            LaneSignalState::default(),
        ]));
        assert_eq!(board.timer_text(LaneId::Lane1), "100");
        assert_eq!(board.timer_text(LaneId::Lane2), "00");
    }

    #[test]
    fn test_max_remaining_red_is_a_maximum() {
        let mut board = SignalBoard::new();
        board.apply(&states());
        // 0, 30, 60, 90 -> 90, not the mean (45).
        assert_eq!(board.max_remaining_red(), 90);
    }
}
