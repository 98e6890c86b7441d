use std::path::PathBuf;
use tracing::info;
use crate::{
  config::{self, PROFILE_HANDLE, THREAD_MARKER},
  error::Result,
  export::save_extracted_fields_to_csv,
  fetch::PostFetcher,
  posts::{links::fetch_parent_post_links, thread::walk_thread, uri::link_to_post_uri},
  types::Thread,
};

/// which profile to scrape and where the rows go
#[derive(Debug, Clone)]
pub struct ScrapeTarget {
  pub handle: String,
  /// case-insensitive marker that selects thread parent posts
  pub marker: String,
  pub output: PathBuf,
}

impl ScrapeTarget {
  /// the built-in profile, writing to the default file in the working directory
  pub fn medsky() -> Result<Self> {
    Ok(ScrapeTarget {
      handle: PROFILE_HANDLE.to_string(),
      marker: THREAD_MARKER.to_string(),
      output: config::default_output_path()?,
    })
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
  pub did: String,
  /// parent post links found in the feed
  pub seeds: usize,
  /// posts collected across every thread
  pub posts: usize,
  pub rows_written: usize,
  pub output: PathBuf,
}

pub struct Scraper<F> {
  fetcher: F,
  target: ScrapeTarget,
}

impl<F: PostFetcher> Scraper<F> {
  pub fn new(fetcher: F, target: ScrapeTarget) -> Self {
    Scraper { fetcher, target }
  }

  pub fn fetcher(&self) -> &F {
    &self.fetcher
  }

  /// resolve the profile, find its thread parent posts, walk each thread, and
  /// append every labeled post to the csv
  ///
  /// nothing is written until every thread has been walked, so an error part
  /// way through loses the whole run
  pub async fn run(&self) -> Result<RunSummary> {
    let handle = self.target.handle.as_str();

    // resolve the did once, every later call uses it
    let did = self.fetcher.resolve_handle(handle).await?;
    println!("Resolved DID for {}: {}", handle, did);

    let parent_post_links = fetch_parent_post_links(&self.fetcher, &did, handle, &self.target.marker).await?;
    println!("Found parent posts: {:?}", parent_post_links);

    let mut threads: Vec<Thread> = Vec::with_capacity(parent_post_links.len());
    for (i, post_url) in parent_post_links.iter().enumerate() {
      println!("Processing parent post {} / {}: {}", i, parent_post_links.len(), post_url);
      let main_post_uri = link_to_post_uri(post_url, &did)?;
      threads.push(walk_thread(&self.fetcher, &main_post_uri).await?);
    }

    let rows_written = save_extracted_fields_to_csv(&threads, &self.target.output)?;
    println!("Data saved to {}", self.target.output.display());

    let summary = RunSummary {
      did,
      seeds: parent_post_links.len(),
      posts: threads.iter().map(Vec::len).sum(),
      rows_written,
      output: self.target.output.clone(),
    };
    info!(seeds = summary.seeds, posts = summary.posts, rows = summary.rows_written, "run complete");

    Ok(summary)
  }
}
