// Domain models

mod aggregation;
mod tick;
mod website;

pub use aggregation::{
    Bucket, CurrentStatus, DerivedMetrics, LastIncident, TimelineSlot, WebsiteSummary,
};
pub use tick::{NewTick, ParseReachabilityError, Reachability, Tick};
pub use website::{Website, WebsiteWithTicks};
