use super::RenderTarget;
use crate::types::AnalyticsSnapshot;

/// Headline numbers from the latest sample: current count, processing
/// time, and the model metrics formatted the way the dashboard shows
/// them (one decimal, percent).
#[derive(Debug, Default)]
pub struct StatsPanel {
    current_count: Option<u32>,
    processing_time: String,
    precision: Option<f64>,
    recall: Option<f64>,
    f1: Option<f64>,
}

impl StatsPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_count_text(&self) -> String {
        self.current_count.map_or_else(|| "--".into(), |c| c.to_string())
    }

    pub fn processing_time_text(&self) -> &str {
        if self.processing_time.is_empty() {
            "--"
        } else {
            &self.processing_time
        }
    }

    pub fn precision_text(&self) -> String {
        format_pct(self.precision)
    }

    pub fn recall_text(&self) -> String {
        format_pct(self.recall)
    }

    pub fn f1_text(&self) -> String {
        format_pct(self.f1)
    }
}

fn format_pct(value: Option<f64>) -> String {
    value.map_or_else(|| "--".into(), |v| format!("{:.1}%", v))
}

impl RenderTarget for StatsPanel {
    type Snapshot = AnalyticsSnapshot;

    fn apply(&mut self, snapshot: &Self::Snapshot) {
        match snapshot.latest() {
            Some(latest) => {
                self.current_count = Some(latest.count);
                self.processing_time = latest.processing_time.clone();
                self.precision = Some(latest.precision);
                self.recall = Some(latest.recall);
                self.f1 = Some(latest.f1_score);
            }
            None => *self = Self::default(),
        }
    }
}
