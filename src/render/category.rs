use super::RenderTarget;
use crate::types::AnalyticsSnapshot;

/// Name/value chart state shared by the doughnut-style vehicle-type view
/// and the confusion-matrix bars. Labels keep the order the projection
/// delivered them in.
#[derive(Debug, Default)]
pub struct CategoryChart {
    labels: Vec<String>,
    values: Vec<u64>,
}

impl CategoryChart {
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn values(&self) -> &[u64] {
        &self.values
    }

    pub fn total(&self) -> u64 {
        self.values.iter().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    fn set_entries<I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (String, u64)>,
    {
        let (labels, values): (Vec<_>, Vec<_>) = entries.into_iter().unzip();
        self.labels = labels;
        self.values = values;
    }
}

/// Vehicle type breakdown, labels in wire insertion order.
#[derive(Debug, Default)]
pub struct VehicleTypeChart(pub CategoryChart);

impl RenderTarget for VehicleTypeChart {
    type Snapshot = AnalyticsSnapshot;

    fn apply(&mut self, snapshot: &Self::Snapshot) {
        self.0.set_entries(
            snapshot
                .vehicle_types
                .entries()
                .iter()
                .map(|(name, count)| (name.clone(), u64::from(*count))),
        );
    }
}

/// Detection confusion matrix (TP / FP / TN / FN as delivered).
#[derive(Debug, Default)]
pub struct ConfusionMatrixChart(pub CategoryChart);

impl RenderTarget for ConfusionMatrixChart {
    type Snapshot = AnalyticsSnapshot;

    fn apply(&mut self, snapshot: &Self::Snapshot) {
        self.0.set_entries(
            snapshot
                .confusion_matrix
                .iter()
                .map(|entry| (entry.name.clone(), entry.value.max(0) as u64)),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ConfusionMatrixEntry, VehicleTypeBreakdown};

    #[test]
    fn test_vehicle_types_keep_insertion_order() {
        let snapshot = AnalyticsSnapshot {
            vehicle_types: VehicleTypeBreakdown::from_iter([
                ("Cars", 10u32),
                ("Trucks", 2),
                ("Motorcycles", 1),
                ("Buses", 0),
                ("Emergency", 1),
            ]),
            ..AnalyticsSnapshot::default()
        };
        let mut chart = VehicleTypeChart::default();
        chart.apply(&snapshot);
        assert_eq!(
            chart.0.labels(),
            ["Cars", "Trucks", "Motorcycles", "Buses", "Emergency"]
        );
        assert_eq!(chart.0.values(), [10, 2, 1, 0, 1]);
        assert_eq!(chart.0.total(), 14);
    }

    #[test]
    fn test_confusion_matrix_projects_entries() {
        let snapshot = AnalyticsSnapshot {
            confusion_matrix: vec![
                ConfusionMatrixEntry { name: "True Positive".into(), value: 85 },
                ConfusionMatrixEntry { name: "False Positive".into(), value: 5 },
                ConfusionMatrixEntry { name: "True Negative".into(), value: 87 },
                ConfusionMatrixEntry { name: "False Negative".into(), value: 3 },
            ],
            ..AnalyticsSnapshot::default()
        };
        let mut chart = ConfusionMatrixChart::default();
        chart.apply(&snapshot);
        assert_eq!(chart.0.labels().len(), 4);
        assert_eq!(chart.0.values(), [85, 5, 87, 3]);
    }

    #[test]
    fn test_apply_replaces_previous_categories() {
        let first = AnalyticsSnapshot {
            vehicle_types: VehicleTypeBreakdown::from_iter([("Cars", 10u32), ("Trucks", 2)]),
            ..AnalyticsSnapshot::default()
        };
        let second = AnalyticsSnapshot {
            vehicle_types: VehicleTypeBreakdown::from_iter([("Buses", 4u32)]),
            ..AnalyticsSnapshot::default()
        };
        let mut chart = VehicleTypeChart::default();
        chart.apply(&first);
        chart.apply(&second);
        assert_eq!(chart.0.labels(), ["Buses"]);
        assert_eq!(chart.0.values(), [4]);
    }
}
