// Tick (one health-check result) and its reachability status

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Whether a monitored target answered a health check.
///
/// Serializes as `"up"` / `"down"`. Deserialization and [`FromStr`] also accept the
/// legacy aliases `"operational"` and `"error"` so older rows normalize at the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Reachability {
    #[serde(rename = "up", alias = "operational", alias = "UP", alias = "Up")]
    Reachable,
    #[serde(rename = "down", alias = "error", alias = "DOWN", alias = "Down")]
    Unreachable,
}

impl Reachability {
    pub fn is_reachable(self) -> bool {
        matches!(self, Reachability::Reachable)
    }

    /// Canonical storage / wire string.
    pub fn as_str(self) -> &'static str {
        match self {
            Reachability::Reachable => "up",
            Reachability::Unreachable => "down",
        }
    }
}

impl fmt::Display for Reachability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized tick status {0:?} (expected up, operational, down or error)")]
pub struct ParseReachabilityError(pub String);

impl FromStr for Reachability {
    type Err = ParseReachabilityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "up" | "operational" => Ok(Reachability::Reachable),
            "down" | "error" => Ok(Reachability::Unreachable),
            _ => Err(ParseReachabilityError(s.to_string())),
        }
    }
}

/// Stored health-check result. `created_at` is epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tick {
    pub id: String,
    pub website_id: String,
    pub created_at: i64,
    pub status: Reachability,
    /// Absent when the check failed before a response arrived.
    #[serde(default)]
    pub latency_ms: Option<f64>,
}

impl Tick {
    /// Latency used in means: a missing measurement counts as 0.
    pub fn latency_or_zero(&self) -> f64 {
        self.latency_ms.unwrap_or(0.0)
    }
}

/// Tick about to be inserted; the repository assigns the id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTick {
    pub website_id: String,
    pub created_at: i64,
    pub status: Reachability,
    #[serde(default)]
    pub latency_ms: Option<f64>,
}
