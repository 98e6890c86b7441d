use crate::{
  config::WEB_HOST,
  error::{Result, ScrapeError},
};

/// collection every feed post lives in
pub const POST_COLLECTION: &str = "app.bsky.feed.post";

/// last `/`-separated segment of a post uri or link
///
/// "at://did:plc:xyz/app.bsky.feed.post/abc123" -> "abc123"
pub fn record_id(uri: &str) -> &str {
  uri.rsplit('/').next().unwrap_or(uri)
}

/// like `record_id`, but an empty segment (trailing `/`, empty input) is an error
pub fn require_record_id(uri: &str) -> Result<&str> {
  match record_id(uri) {
    "" => Err(ScrapeError::InvalidUri(uri.to_string())),
    id => Ok(id),
  }
}

/// `https://bsky.app/profile/<handle>/post/<record-id>`
pub fn post_link(handle: &str, uri: &str) -> String {
  format!("https://{}/profile/{}/post/{}", WEB_HOST, handle, record_id(uri))
}

/// turn a web link back into the `at://` reference the api wants, using the
/// already-resolved did instead of the handle in the link
pub fn link_to_post_uri(link: &str, did: &str) -> Result<String> {
  let post_id = require_record_id(link)?;
  Ok(format!("at://{}/{}/{}", did, POST_COLLECTION, post_id))
}
