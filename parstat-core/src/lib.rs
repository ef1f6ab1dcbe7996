pub mod accessor;
pub mod fragmentation;
pub mod histogram;
pub mod localize;
pub mod render;
pub mod snapshot;
pub mod space;
pub mod status;
pub mod sync_scan;
pub mod units;

pub use status::{status, summarize, StatusOptions, StatusOutcome, StatusSummary};
