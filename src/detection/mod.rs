//! Multi-provider detection
//!
//! The engine fans a file inventory out to every registered provider (or one
//! named provider), discards invalid output, then filters and merges what is
//! left into one result per language. The list helpers in [`results`] and
//! [`stats`] are pure and usable on their own.

mod engine;
mod error;
pub mod results;
pub mod stats;

pub use engine::{DetectOptions, DetectionEngine, DetectionReport};
pub use error::DetectionError;
pub use results::{
    best_result, filter_results, is_valid_detect_result, merge_results, DEFAULT_MIN_CONFIDENCE,
};
pub use stats::{detection_stats, DetectionStats};
