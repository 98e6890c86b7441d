use tracing::debug;
use crate::{
  error::Result,
  fetch::PostFetcher,
  posts::uri::post_link,
};

/// walk every page of `did`'s author feed and collect links to the posts whose
/// text contains `marker` (case-insensitive)
///
/// these are the parent posts of labeling threads. links are in feed order
/// (newest first), not deduplicated
pub async fn fetch_parent_post_links<F>(fetcher: &F, did: &str, handle: &str, marker: &str
) -> Result<Vec<String>>
where
  F: PostFetcher + ?Sized,
{
  let marker = marker.to_lowercase();
  let mut parent_post_links = Vec::new();
  let mut cursor: Option<String> = None;
  let mut page_no = 0;

  loop {
    let page = fetcher.fetch_author_feed(did, cursor.as_deref()).await?;
    page_no += 1;
    debug!(page_no, items = page.feed.len(), "author feed page");

    for item in &page.feed {
      if item.post.text().to_lowercase().contains(&marker) {
        parent_post_links.push(post_link(handle, &item.post.uri));
      }
    }

    // no (or empty) cursor means this was the last page
    cursor = page.cursor.filter(|c| !c.is_empty());
    if cursor.is_none() {
      break;
    }
  }

  Ok(parent_post_links)
}
