//! scrape the labeling threads of a bluesky profile into a csv
//!
//! the feed of the profile is paged through for posts mentioning "thread",
//! each of those posts is walked reply by reply, and every post of the form
//! `<label> -> <whatever>` becomes a `(label, post link)` row

pub mod config;
pub mod error;
pub mod export;
pub mod fetch;
pub mod posts;
pub mod scrape;
pub mod types;

pub use error::{Result, ScrapeError};
pub use fetch::{BskyClient, PostFetcher};
pub use scrape::{RunSummary, ScrapeTarget, Scraper};
pub use types::{ExtractedRow, PostRecord, Thread};

#[cfg(test)]
mod test_utils;
