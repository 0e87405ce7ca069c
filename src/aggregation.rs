// Tick aggregation: fixed-size time windows for the status timeline, plus scalar metrics.
// Pure functions over a borrowed tick slice; nothing here touches the DB or the clock.

use crate::models::{Bucket, CurrentStatus, DerivedMetrics, LastIncident, Reachability, Tick};

const MS_PER_MINUTE: i64 = 60_000;

pub const DEFAULT_WINDOW_SIZE_MINUTES: u32 = 3;
pub const DEFAULT_MAX_WINDOWS: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AggregationError {
    #[error("window_size_minutes must be > 0")]
    ZeroWindowSize,
    #[error("max_windows must be > 0")]
    ZeroMaxWindows,
}

/// Window length and how many of the most recent non-empty windows to keep.
/// Both are non-zero once constructed through [`WindowSpec::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSpec {
    window_size_minutes: u32,
    max_windows: usize,
}

impl WindowSpec {
    pub fn new(window_size_minutes: u32, max_windows: usize) -> Result<Self, AggregationError> {
        if window_size_minutes == 0 {
            return Err(AggregationError::ZeroWindowSize);
        }
        if max_windows == 0 {
            return Err(AggregationError::ZeroMaxWindows);
        }
        Ok(Self {
            window_size_minutes,
            max_windows,
        })
    }

    pub fn window_size_minutes(&self) -> u32 {
        self.window_size_minutes
    }

    pub fn max_windows(&self) -> usize {
        self.max_windows
    }

    pub fn window_size_ms(&self) -> i64 {
        self.window_size_minutes as i64 * MS_PER_MINUTE
    }
}

impl Default for WindowSpec {
    fn default() -> Self {
        Self {
            window_size_minutes: DEFAULT_WINDOW_SIZE_MINUTES,
            max_windows: DEFAULT_MAX_WINDOWS,
        }
    }
}

/// Groups ticks into consecutive windows of `spec.window_size_ms()` starting at the earliest tick.
///
/// Windows are `[earliest + k * size, earliest + (k + 1) * size)`. Empty windows are skipped,
/// so the result may have gaps in `window_start`. A window is `Reachable` when at least half of
/// its ticks are (an exact 50/50 split counts as reachable). Mean latency includes every tick in
/// the window, with a missing latency counted as 0. Only the last `spec.max_windows()` buckets
/// are returned, oldest first.
///
/// Ticks with equal `created_at` keep their input order (stable sort).
pub fn bucketize(samples: &[Tick], spec: &WindowSpec) -> Vec<Bucket> {
    if samples.is_empty() {
        return Vec::new();
    }

    let mut sorted: Vec<&Tick> = samples.iter().collect();
    sorted.sort_by_key(|t| t.created_at);

    // i128 so extreme timestamps can't overflow the offset from `earliest`
    let size_ms = i128::from(spec.window_size_ms());
    let earliest = i128::from(sorted[0].created_at);

    let mut buckets: Vec<Bucket> = Vec::new();
    let mut current: Option<WindowAcc> = None;

    for tick in sorted {
        let index = (i128::from(tick.created_at) - earliest) / size_ms;
        match current.as_mut() {
            Some(acc) if acc.index == index => acc.push(tick),
            _ => {
                if let Some(done) = current.take() {
                    buckets.push(done.finish(earliest, size_ms));
                }
                let mut acc = WindowAcc::new(index);
                acc.push(tick);
                current = Some(acc);
            }
        }
    }
    if let Some(done) = current {
        buckets.push(done.finish(earliest, size_ms));
    }

    if buckets.len() > spec.max_windows {
        buckets.drain(..buckets.len() - spec.max_windows);
    }
    buckets
}

/// Running totals for the window currently being filled.
struct WindowAcc {
    index: i128,
    count: usize,
    reachable: usize,
    latency_sum: f64,
}

impl WindowAcc {
    fn new(index: i128) -> Self {
        Self {
            index,
            count: 0,
            reachable: 0,
            latency_sum: 0.0,
        }
    }

    fn push(&mut self, tick: &Tick) {
        self.count += 1;
        if tick.status.is_reachable() {
            self.reachable += 1;
        }
        self.latency_sum += tick.latency_or_zero();
    }

    fn finish(self, earliest: i128, size_ms: i128) -> Bucket {
        // reachable >= count / 2, kept in integers
        let status = if self.reachable * 2 >= self.count {
            Reachability::Reachable
        } else {
            Reachability::Unreachable
        };
        // lies between earliest and this window's first tick, so it fits back in i64
        let window_start = (earliest + self.index * size_ms) as i64;
        Bucket {
            window_start,
            status,
            average_latency: self.latency_sum / self.count as f64,
            sample_count: self.count,
        }
    }
}

/// Uptime, mean latency, current status and last incident over all ticks, in one pass.
///
/// "Latest" means the greatest `created_at`; among ties the earliest tick in input order wins.
/// Latencies are not validated, so a negative value flows into the mean as given.
pub fn derive_metrics(samples: &[Tick]) -> DerivedMetrics {
    let mut reachable = 0usize;
    let mut latency_sum = 0.0f64;
    let mut latest: Option<&Tick> = None;
    let mut latest_incident: Option<&Tick> = None;

    for tick in samples {
        latency_sum += tick.latency_or_zero();
        if tick.status.is_reachable() {
            reachable += 1;
        } else if latest_incident.is_none_or(|t| tick.created_at > t.created_at) {
            latest_incident = Some(tick);
        }
        if latest.is_none_or(|t| tick.created_at > t.created_at) {
            latest = Some(tick);
        }
    }

    let total = samples.len();
    let (uptime_percentage, average_response_time) = if total == 0 {
        (0.0, 0.0)
    } else {
        (
            reachable as f64 / total as f64 * 100.0,
            latency_sum / total as f64,
        )
    };

    DerivedMetrics {
        current_status: latest
            .map(|t| CurrentStatus::from(t.status))
            .unwrap_or(CurrentStatus::Unknown),
        uptime_percentage,
        average_response_time,
        last_incident_time: latest_incident
            .map(|t| LastIncident::At(t.created_at))
            .unwrap_or(LastIncident::Never),
        total_checks: total,
    }
}
