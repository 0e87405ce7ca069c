// Monitored website rows

use serde::{Deserialize, Serialize};

use super::Tick;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Website {
    pub id: String,
    pub url: String,
    pub user_id: String,
    /// Soft-delete flag; disabled websites are hidden from every read and not probed.
    pub disabled: bool,
    pub created_at: i64,
}

/// Website plus its ticks, ascending by `created_at`. Response of GET /api/v1/website/status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebsiteWithTicks {
    pub id: String,
    pub url: String,
    pub user_id: String,
    pub disabled: bool,
    pub created_at: i64,
    pub ticks: Vec<Tick>,
}

impl WebsiteWithTicks {
    pub fn new(website: Website, ticks: Vec<Tick>) -> Self {
        Self {
            id: website.id,
            url: website.url,
            user_id: website.user_id,
            disabled: website.disabled,
            created_at: website.created_at,
            ticks,
        }
    }
}
