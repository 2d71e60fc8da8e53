//! Order-flow toxicity module
//!
//! VPIN (volume-synchronized probability of informed trading) from intraday
//! bars:
//! 1. classify each bar's volume into buy/sell pressure (bulk volume
//!    classification)
//! 2. assign bars to buckets of equal traded volume (the volume clock)
//! 3. toxicity = sum of |buy - sell| over the trailing window of buckets,
//!    divided by bucket volume * window

mod classify;
mod engine;
mod types;

pub use classify::{buy_probabilities, normal_cdf, SIGMA_FLOOR};
pub use engine::{compute_toxicity, ToxicityEngine};
pub use types::{Bar, BucketSizing, ScoredBucket, VolumeBucket};
