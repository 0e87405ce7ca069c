// Aggregator output: time buckets, derived metrics, and the padded dashboard timeline.

use serde::{Deserialize, Serialize};

use super::Reachability;

/// One non-empty time window: start time, majority status, mean latency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bucket {
    pub window_start: i64,
    pub status: Reachability,
    pub average_latency: f64,
    pub sample_count: usize,
}

/// Status of the most recent tick, or `Unknown` when a website has none yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CurrentStatus {
    Up,
    Down,
    Unknown,
}

impl From<Reachability> for CurrentStatus {
    fn from(r: Reachability) -> Self {
        match r {
            Reachability::Reachable => CurrentStatus::Up,
            Reachability::Unreachable => CurrentStatus::Down,
        }
    }
}

/// Time of the latest unreachable tick. Serializes as `"never"` or `{"at": <ms>}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LastIncident {
    Never,
    At(i64),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedMetrics {
    pub current_status: CurrentStatus,
    pub uptime_percentage: f64,
    pub average_response_time: f64,
    pub last_incident_time: LastIncident,
    pub total_checks: usize,
}

/// Fixed-length timeline entry for display; `Empty` pads the front when history is short.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TimelineSlot {
    Empty {
        #[serde(rename = "windowStart")]
        window_start: i64,
    },
    Filled(Bucket),
}

impl TimelineSlot {
    pub fn window_start(&self) -> i64 {
        match self {
            TimelineSlot::Empty { window_start } => *window_start,
            TimelineSlot::Filled(b) => b.window_start,
        }
    }
}

/// Dashboard card for one website.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebsiteSummary {
    pub id: String,
    pub url: String,
    pub metrics: DerivedMetrics,
    pub timeline: Vec<TimelineSlot>,
}
