//! in-memory `PostFetcher` for tests. records every call it receives

use std::{collections::HashMap, sync::Mutex};
use async_trait::async_trait;
use serde_json::json;
use crate::{
  error::{Result, ScrapeError},
  fetch::PostFetcher,
  posts::uri::POST_COLLECTION,
  types::{
    AuthorFeedPage, FeedViewPost, PostView, ProfileViewBasic, ThreadLookup,
    ThreadNode, ThreadReply,
  },
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
  ResolveHandle(String),
  AuthorFeed { actor: String, cursor: Option<String> },
  PostThread(String),
}

#[derive(Default)]
pub struct FakeFetcher {
  dids: HashMap<String, String>,
  /// keyed by the cursor that requests the page (`None` = first page)
  feed_pages: HashMap<Option<String>, AuthorFeedPage>,
  /// uris not in here come back as `NotFound`
  threads: HashMap<String, ThreadLookup>,
  calls: Mutex<Vec<Call>>,
  /// make `fetch_post_thread` fail for this uri
  failing_uri: Option<String>,
}

pub fn post_uri(did: &str, rkey: &str) -> String {
  format!("at://{}/{}/{}", did, POST_COLLECTION, rkey)
}

/// `text: None` leaves the record without a text field
pub fn post_view(handle: &str, did: &str, rkey: &str, text: Option<&str>) -> PostView {
  let mut record = json!({ "$type": POST_COLLECTION, "createdAt": "2024-11-20T10:00:00Z" });
  if let Some(text) = text {
    record["text"] = json!(text);
  }
  PostView {
    uri: post_uri(did, rkey),
    author: ProfileViewBasic { did: did.to_string(), handle: handle.to_string() },
    record,
  }
}

impl FakeFetcher {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_did(mut self, handle: &str, did: &str) -> Self {
    self.dids.insert(handle.to_string(), did.to_string());
    self
  }

  pub fn with_feed_page(mut self, cursor: Option<&str>, posts: Vec<PostView>, next: Option<&str>) -> Self {
    let page = AuthorFeedPage {
      feed: posts.into_iter().map(|post| FeedViewPost { post }).collect(),
      cursor: next.map(str::to_string),
    };
    self.feed_pages.insert(cursor.map(str::to_string), page);
    self
  }

  /// register `post` so that fetching its uri returns it with `replies`
  pub fn with_post(mut self, post: PostView, replies: &[String]) -> Self {
    let replies = replies.iter()
      .map(|uri| ThreadReply::Post { uri: uri.clone() })
      .collect();
    self.threads.insert(post.uri.clone(), ThreadLookup::Found(ThreadNode { post, replies }));
    self
  }

  pub fn with_lookup(mut self, uri: &str, lookup: ThreadLookup) -> Self {
    self.threads.insert(uri.to_string(), lookup);
    self
  }

  pub fn failing_on(mut self, uri: &str) -> Self {
    self.failing_uri = Some(uri.to_string());
    self
  }

  pub fn calls(&self) -> Vec<Call> {
    self.calls.lock().unwrap().clone()
  }

  pub fn thread_calls(&self) -> Vec<String> {
    self.calls().into_iter()
      .filter_map(|call| match call {
        Call::PostThread(uri) => Some(uri),
        _ => None,
      })
      .collect()
  }

  fn record(&self, call: Call) {
    self.calls.lock().unwrap().push(call);
  }
}

fn api_error(endpoint: &str, status: u16, error: &str) -> ScrapeError {
  ScrapeError::Api {
    endpoint: endpoint.to_string(),
    status,
    error: error.to_string(),
    message: "fake".to_string(),
  }
}

#[async_trait]
impl PostFetcher for FakeFetcher {
  async fn resolve_handle(&self, handle: &str) -> Result<String> {
    self.record(Call::ResolveHandle(handle.to_string()));
    self.dids.get(handle).cloned()
      .ok_or_else(|| api_error("com.atproto.identity.resolveHandle", 400, "InvalidRequest"))
  }

  async fn fetch_author_feed(&self, actor: &str, cursor: Option<&str>) -> Result<AuthorFeedPage> {
    self.record(Call::AuthorFeed {
      actor: actor.to_string(),
      cursor: cursor.map(str::to_string),
    });
    self.feed_pages.get(&cursor.map(str::to_string)).cloned()
      .ok_or_else(|| api_error("app.bsky.feed.getAuthorFeed", 400, "InvalidRequest"))
  }

  async fn fetch_post_thread(&self, uri: &str) -> Result<ThreadLookup> {
    self.record(Call::PostThread(uri.to_string()));
    if self.failing_uri.as_deref() == Some(uri) {
      return Err(api_error("app.bsky.feed.getPostThread", 429, "RateLimitExceeded"));
    }
    Ok(self.threads.get(uri).cloned().unwrap_or(ThreadLookup::NotFound))
  }
}
