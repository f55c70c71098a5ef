// src/render/mod.rs
//
// Render targets. Each widget owns its display state and consumes one
// projection of a snapshot through `apply`; nothing here touches a
// terminal, so every target unit-tests as plain data. Drawing lives in
// the TUI shell.

mod alert_banner;
mod category;
mod live_panels;
mod signal_board;
mod stacked_bars;
mod stats_panel;
mod status_badges;
mod time_series;

pub use alert_banner::AlertBanner;
pub use category::{CategoryChart, ConfusionMatrixChart, VehicleTypeChart};
pub use live_panels::{AmbulancePanel, LaneCounters};
pub use signal_board::SignalBoard;
pub use stacked_bars::LaneDistributionChart;
pub use stats_panel::StatsPanel;
pub use status_badges::CongestionBadges;
pub use time_series::{ModelPerformanceChart, VehicleCountChart};

/// A self-contained widget that maps a snapshot projection to display
/// state. `apply` replaces state wholesale — applying the same snapshot
/// twice leaves the widget identical (no accumulation).
pub trait RenderTarget {
    type Snapshot;

    fn apply(&mut self, snapshot: &Self::Snapshot);
}
