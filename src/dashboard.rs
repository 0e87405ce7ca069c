// Dashboard cards: metrics + padded timeline per website, computed fresh on each request.

use crate::aggregation::{WindowSpec, bucketize, derive_metrics};
use crate::models::{WebsiteSummary, WebsiteWithTicks};
use crate::timeline::pad_timeline;

/// Aggregation and display settings resolved once from config.
#[derive(Debug, Clone, Copy)]
pub struct DashboardSettings {
    pub window_spec: WindowSpec,
    pub display_slots: usize,
}

impl DashboardSettings {
    pub fn from_config(config: &crate::config::DashboardConfig) -> anyhow::Result<Self> {
        Ok(Self {
            window_spec: config.window_spec()?,
            display_slots: config.display_slots,
        })
    }
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            window_spec: WindowSpec::default(),
            display_slots: WindowSpec::default().max_windows(),
        }
    }
}

pub fn summarize(
    website: &WebsiteWithTicks,
    settings: &DashboardSettings,
    now_ms: i64,
) -> WebsiteSummary {
    let metrics = derive_metrics(&website.ticks);
    let buckets = bucketize(&website.ticks, &settings.window_spec);
    let timeline = pad_timeline(
        &buckets,
        settings.display_slots,
        settings.window_spec.window_size_minutes(),
        now_ms,
    );
    WebsiteSummary {
        id: website.id.clone(),
        url: website.url.clone(),
        metrics,
        timeline,
    }
}

pub fn summarize_all(
    websites: &[WebsiteWithTicks],
    settings: &DashboardSettings,
    now_ms: i64,
) -> Vec<WebsiteSummary> {
    websites
        .iter()
        .map(|w| summarize(w, settings, now_ms))
        .collect()
}
