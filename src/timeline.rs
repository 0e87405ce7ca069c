// Display padding for the status timeline. Kept apart from aggregation: the Aggregator
// returns only real windows, the dashboard wants a fixed number of slots.

use crate::models::{Bucket, TimelineSlot};

const MS_PER_MINUTE: i64 = 60_000;

/// Returns exactly `slots` entries, oldest first.
///
/// Keeps the last `slots` buckets; if there are fewer, `Empty` placeholders are prepended.
/// Placeholders step back one window at a time from the oldest kept bucket, or from `now_ms`
/// when there are no buckets, so `window_start` increases across the whole timeline.
pub fn pad_timeline(
    buckets: &[Bucket],
    slots: usize,
    window_size_minutes: u32,
    now_ms: i64,
) -> Vec<TimelineSlot> {
    let window_ms = window_size_minutes as i64 * MS_PER_MINUTE;
    let kept = &buckets[buckets.len().saturating_sub(slots)..];
    let missing = slots - kept.len();

    let anchor = kept.first().map_or(now_ms, |b| b.window_start);

    let mut out = Vec::with_capacity(slots);
    for i in 0..missing {
        let back = ((missing - i) as i64).saturating_mul(window_ms);
        out.push(TimelineSlot::Empty {
            window_start: anchor.saturating_sub(back),
        });
    }
    out.extend(kept.iter().cloned().map(TimelineSlot::Filled));
    out
}
