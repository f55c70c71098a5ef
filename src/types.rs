use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::warn;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub polling: PollingConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub base_url: String,
    pub request_timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    pub live_interval_ms: u64,
    pub analytics_interval_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            polling: PollingConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            request_timeout_ms: 900,
        }
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            live_interval_ms: 1000,
            analytics_interval_ms: 3000,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "lanewatch=info".to_string(),
            file: "lanewatch.log".to_string(),
        }
    }
}

/// Number of physical lanes tracked by the intersection. Fixed at build
/// time; every wire payload, store, and widget agrees on this set.
pub const LANE_COUNT: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LaneId {
    Lane1,
    Lane2,
    Lane3,
    Lane4,
}

impl LaneId {
    pub const ALL: [LaneId; LANE_COUNT] =
        [LaneId::Lane1, LaneId::Lane2, LaneId::Lane3, LaneId::Lane4];

    pub fn index(self) -> usize {
        match self {
            LaneId::Lane1 => 0,
            LaneId::Lane2 => 1,
            LaneId::Lane3 => 2,
            LaneId::Lane4 => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            LaneId::Lane1 => "Lane 1",
            LaneId::Lane2 => "Lane 2",
            LaneId::Lane3 => "Lane 3",
            LaneId::Lane4 => "Lane 4",
        }
    }

    /// Lane keys on the wire are the strings "1".."4".
    pub fn from_wire_key(key: &str) -> Option<LaneId> {
        match key {
            "1" => Some(LaneId::Lane1),
            "2" => Some(LaneId::Lane2),
            "3" => Some(LaneId::Lane3),
            "4" => Some(LaneId::Lane4),
            _ => None,
        }
    }
}

/// Dense per-lane container. Built from the keyed maps the server sends;
/// unknown keys are dropped with a warning and missing lanes fall back to
/// the type's default, so downstream code never sees a partial lane set.
#[derive(Debug, Clone, PartialEq)]
pub struct PerLane<T>([T; LANE_COUNT]);

impl<T> PerLane<T> {
    pub fn get(&self, lane: LaneId) -> &T {
        &self.0[lane.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (LaneId, &T)> {
        LaneId::ALL.iter().map(move |&lane| (lane, &self.0[lane.index()]))
    }
}

impl<T> From<[T; LANE_COUNT]> for PerLane<T> {
    fn from(values: [T; LANE_COUNT]) -> Self {
        Self(values)
    }
}

impl<T: Default> Default for PerLane<T> {
    fn default() -> Self {
        Self([T::default(), T::default(), T::default(), T::default()])
    }
}

impl<T: Default> PerLane<T> {
    pub fn from_keyed(map: BTreeMap<String, T>) -> Self {
        let mut slots: [Option<T>; LANE_COUNT] = [None, None, None, None];
        for (key, value) in map {
            match LaneId::from_wire_key(&key) {
                Some(lane) => slots[lane.index()] = Some(value),
                None => warn!("ignoring unknown lane key {:?} in server payload", key),
            }
        }
        Self(slots.map(Option::unwrap_or_default))
    }
}

/// One time-stamped observation from the analytics aggregate. Field names
/// match the server's JSON exactly; columns the dashboard does not consume
/// are ignored at decode time.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TrafficSample {
    #[serde(rename = "Time", default)]
    pub time: String,
    #[serde(rename = "Count", default)]
    pub count: u32,
    #[serde(rename = "Lane1", default)]
    pub lane1: u32,
    #[serde(rename = "Lane2", default)]
    pub lane2: u32,
    #[serde(rename = "Lane3", default)]
    pub lane3: u32,
    #[serde(rename = "Lane4", default)]
    pub lane4: u32,
    #[serde(rename = "ProcessingTime", default, deserialize_with = "de_string_or_number")]
    pub processing_time: String,
    #[serde(rename = "Action", default)]
    pub action: String,
    #[serde(rename = "Precision", default, deserialize_with = "de_null_to_zero")]
    pub precision: f64,
    #[serde(rename = "Recall", default, deserialize_with = "de_null_to_zero")]
    pub recall: f64,
    #[serde(rename = "F1Score", default, deserialize_with = "de_null_to_zero")]
    pub f1_score: f64,
}

/// Action string the server uses to flag an emergency-vehicle observation.
pub const AMBULANCE_ACTION: &str = "Ambulance";

impl TrafficSample {
    pub fn lane_count(&self, lane: LaneId) -> u32 {
        match lane {
            LaneId::Lane1 => self.lane1,
            LaneId::Lane2 => self.lane2,
            LaneId::Lane3 => self.lane3,
            LaneId::Lane4 => self.lane4,
        }
    }

    pub fn is_emergency(&self) -> bool {
        self.action == AMBULANCE_ACTION
    }
}

/// `ProcessingTime` arrives as "50ms" from the live pipeline but plain
/// numbers have been observed from older backends. Accept both.
fn de_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNumber {
        Text(String),
        Int(i64),
        Float(f64),
    }
    Ok(match Option::<StringOrNumber>::deserialize(deserializer)? {
        Some(StringOrNumber::Text(s)) => s,
        Some(StringOrNumber::Int(n)) => n.to_string(),
        Some(StringOrNumber::Float(n)) => n.to_string(),
        None => String::new(),
    })
}

/// Metric columns are nullable in the backing table; a null metric means
/// "not available this cycle" and is normalized to 0.0, which the
/// performance chart's positivity filter then drops.
fn de_null_to_zero<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(0.0))
}

/// Vehicle category -> count, in the order the server listed the keys.
/// The type chart labels categories in wire insertion order, so this
/// deserializes through a visitor that keeps document order instead of
/// going through an order-losing map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VehicleTypeBreakdown(Vec<(String, u32)>);

impl VehicleTypeBreakdown {
    pub fn entries(&self) -> &[(String, u32)] {
        &self.0
    }

    pub fn total(&self) -> u64 {
        self.0.iter().map(|(_, v)| u64::from(*v)).sum()
    }
}

impl<S: Into<String>> FromIterator<(S, u32)> for VehicleTypeBreakdown {
    fn from_iter<I: IntoIterator<Item = (S, u32)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl<'de> Deserialize<'de> for VehicleTypeBreakdown {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct BreakdownVisitor;

        impl<'de> Visitor<'de> for BreakdownVisitor {
            type Value = VehicleTypeBreakdown;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of vehicle category to count")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((key, value)) = map.next_entry::<String, u32>()? {
                    entries.push((key, value));
                }
                Ok(VehicleTypeBreakdown(entries))
            }
        }

        deserializer.deserialize_map(BreakdownVisitor)
    }
}

/// One cell of the detection confusion matrix, as delivered:
/// `{"name": "True Positive", "value": 85}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ConfusionMatrixEntry {
    pub name: String,
    pub value: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LightColor {
    Red,
    Yellow,
    Green,
}

impl Default for LightColor {
    fn default() -> Self {
        LightColor::Red
    }
}

/// Signal state for one lane: active light, countdown, and how much red
/// time is left. Counters are clamped to zero at ingestion; the signal
/// controller emits transient negatives around phase changes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct LaneSignalState {
    #[serde(default)]
    pub color: LightColor,
    #[serde(default, deserialize_with = "de_clamp_u32")]
    pub timer: u32,
    #[serde(default, deserialize_with = "de_clamp_u32")]
    pub remaining_red: u32,
}

fn de_clamp_u32<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = i64::deserialize(deserializer)?;
    Ok(u32::try_from(raw.max(0)).unwrap_or(u32::MAX))
}

/// The latest coherent batch from `/api/traffic-data`. Samples are
/// newest-first — the order the endpoint delivers them in, and the
/// canonical in-memory order: index 0 is always the latest sample.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalyticsSnapshot {
    pub traffic_data: Vec<TrafficSample>,
    pub vehicle_types: VehicleTypeBreakdown,
    pub confusion_matrix: Vec<ConfusionMatrixEntry>,
}

impl AnalyticsSnapshot {
    pub fn latest(&self) -> Option<&TrafficSample> {
        self.traffic_data.first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_json() -> &'static str {
        r#"{
            "Time": "12:00:01",
            "Lane1": 10, "Lane2": 20, "Lane3": 5, "Lane4": 10,
            "Count": 45,
            "ProcessingTime": "50ms",
            "VehicleType": "Car",
            "VehicleCount": 3,
            "Precision": 90.0,
            "Recall": 88.0,
            "F1Score": 89.0,
            "Action": "Car",
            "Priority": "FALSE"
        }"#
    }

    #[test]
    fn test_traffic_sample_decodes_wire_fields() {
        let sample: TrafficSample = serde_json::from_str(sample_json()).unwrap();
        assert_eq!(sample.time, "12:00:01");
        assert_eq!(sample.count, 45);
        assert_eq!(sample.lane_count(LaneId::Lane2), 20);
        assert_eq!(sample.processing_time, "50ms");
        assert_eq!(sample.precision, 90.0);
        assert!(!sample.is_emergency());
    }

    #[test]
    fn test_traffic_sample_tolerates_null_metrics_and_numeric_processing_time() {
        let json = r#"{"Time":"12:00:02","Count":3,"Lane1":1,"Lane2":1,"Lane3":1,"Lane4":0,
                       "ProcessingTime":42,"Action":"Ambulance",
                       "Precision":null,"Recall":null,"F1Score":null}"#;
        let sample: TrafficSample = serde_json::from_str(json).unwrap();
        assert_eq!(sample.processing_time, "42");
        assert_eq!(sample.precision, 0.0);
        assert!(sample.is_emergency());
    }

    #[test]
    fn test_vehicle_type_breakdown_preserves_insertion_order() {
        let json = r#"{"Cars":10,"Trucks":2,"Motorcycles":1,"Buses":0,"Emergency":1}"#;
        let breakdown: VehicleTypeBreakdown = serde_json::from_str(json).unwrap();
        let labels: Vec<&str> = breakdown.entries().iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(labels, vec!["Cars", "Trucks", "Motorcycles", "Buses", "Emergency"]);
        let values: Vec<u32> = breakdown.entries().iter().map(|(_, v)| *v).collect();
        assert_eq!(values, vec![10, 2, 1, 0, 1]);
        assert_eq!(breakdown.total(), 14);
    }

    #[test]
    fn test_lane_signal_state_decodes_and_clamps() {
        let json = r#"{"color":"green","timer":7,"remaining_red":0}"#;
        let state: LaneSignalState = serde_json::from_str(json).unwrap();
        assert_eq!(state.color, LightColor::Green);
        assert_eq!(state.timer, 7);

        let negative = r#"{"color":"red","timer":-3,"remaining_red":-1}"#;
        let state: LaneSignalState = serde_json::from_str(negative).unwrap();
        assert_eq!(state.timer, 0);
        assert_eq!(state.remaining_red, 0);
    }

    #[test]
    fn test_per_lane_from_keyed_ignores_unknown_and_defaults_missing() {
        let mut map = BTreeMap::new();
        map.insert("1".to_string(), 11u32);
        map.insert("4".to_string(), 44u32);
        map.insert("9".to_string(), 99u32);
        let lanes = PerLane::from_keyed(map);
        assert_eq!(*lanes.get(LaneId::Lane1), 11);
        assert_eq!(*lanes.get(LaneId::Lane2), 0);
        assert_eq!(*lanes.get(LaneId::Lane3), 0);
        assert_eq!(*lanes.get(LaneId::Lane4), 44);
    }

    #[test]
    fn test_analytics_snapshot_latest_is_first() {
        let newest = TrafficSample {
            time: "12:00:05".into(),
            ..TrafficSample::default()
        };
        let older: TrafficSample = serde_json::from_str(sample_json()).unwrap();
        let snapshot = AnalyticsSnapshot {
            traffic_data: vec![newest, older],
            ..AnalyticsSnapshot::default()
        };
        assert_eq!(snapshot.latest().unwrap().time, "12:00:05");
    }
}
