use serde::{Deserialize, Serialize};
use serde_json::Value;

/* ------------------------------ domain types ------------------------------ */

/// one post, flattened out of an api response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostRecord {
  /// e.g. `medsky.social`
  pub author_handle: String,
  /// e.g. `did:plc:xyz`
  pub author_did: String,
  /// the post text. empty if the record had none
  pub content: String,
  /// `at://<did>/<collection>/<record-id>`
  pub uri: String,
}

/// depth-first flattening of a reply tree, root first
pub type Thread = Vec<PostRecord>;

/// one csv row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedRow {
  pub extracted_text: String,
  pub post_link: String,
}

/// result of looking up a single post with its replies
#[derive(Debug, Clone)]
pub enum ThreadLookup {
  Found(ThreadNode),
  /// the uri does not resolve to a post (deleted, never existed)
  NotFound,
  /// a response without a post payload (blocked post, unknown union member,
  /// missing fields)
  Malformed,
}

/// a post plus references to its direct replies, in api order
#[derive(Debug, Clone)]
pub struct ThreadNode {
  pub post: PostView,
  pub replies: Vec<ThreadReply>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThreadReply {
  Post { uri: String },
  /// reply entry with no post to follow, e.g. `#blockedPost`. `kind` is the
  /// `$type` if there was one
  Unavailable { kind: String },
}

/* -------------------------------- wire types ------------------------------- */

#[derive(Debug, Clone, Serialize)]
pub struct CreateSessionInput<'a> {
  pub identifier: &'a str,
  pub password: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Session {
  #[serde(rename = "accessJwt")]
  pub access_jwt: String,
  #[serde(rename = "refreshJwt")]
  pub refresh_jwt: String,
  pub handle: String,
  pub did: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResolveHandleOutput {
  pub did: String,
}

/// one page of `app.bsky.feed.getAuthorFeed`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthorFeedPage {
  #[serde(default)]
  pub feed: Vec<FeedViewPost>,
  /// continuation token. absent (or empty) on the last page
  pub cursor: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedViewPost {
  pub post: PostView,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PostView {
  pub uri: String,
  pub author: ProfileViewBasic,
  /// open lexicon record. only `text` is read
  #[serde(default)]
  pub record: Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProfileViewBasic {
  pub did: String,
  pub handle: String,
}

/// body of a non-2xx xrpc response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct XrpcErrorBody {
  #[serde(default)]
  pub error: String,
  #[serde(default)]
  pub message: String,
}

impl PostView {
  /// `record.text`, or "" if the record has no text
  pub fn text(&self) -> &str {
    self.record.get("text").and_then(Value::as_str).unwrap_or("")
  }
}

impl From<&PostView> for PostRecord {
  fn from(post: &PostView) -> Self {
    PostRecord {
      author_handle: post.author.handle.clone(),
      author_did: post.author.did.clone(),
      content: post.text().to_string(),
      uri: post.uri.clone(),
    }
  }
}
