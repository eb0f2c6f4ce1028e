//! Pipeline entry points for analyzer operations.
//!
//! - `collect_posts`: Scrape a profile timeline inside a scoped browser session
//! - `run_analysis`: Collect posts, then run each requested analysis

pub mod analyze;
pub mod collect;

pub use analyze::run_analysis;
pub use collect::collect_posts;
