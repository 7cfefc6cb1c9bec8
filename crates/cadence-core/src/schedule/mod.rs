//! Phase 1 structure: which channel each post goes to and when.

pub mod distribution;
pub mod timing;

pub use distribution::{channel_counts, distribute, validate_distribution};
pub use timing::{TimingCheck, schedule_posts, validate_timing};
