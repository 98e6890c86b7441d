use std::future::Future;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, info};
use crate::{
  config::Config,
  error::{Result, ScrapeError},
  types::{
    AuthorFeedPage, CreateSessionInput, PostView, ResolveHandleOutput, Session,
    ThreadLookup, ThreadNode, ThreadReply, XrpcErrorBody,
  },
};

const CREATE_SESSION: &str = "com.atproto.server.createSession";
const REFRESH_SESSION: &str = "com.atproto.server.refreshSession";
const RESOLVE_HANDLE: &str = "com.atproto.identity.resolveHandle";
const GET_AUTHOR_FEED: &str = "app.bsky.feed.getAuthorFeed";
const GET_POST_THREAD: &str = "app.bsky.feed.getPostThread";

const NOT_FOUND_POST: &str = "app.bsky.feed.defs#notFoundPost";

// one connection pool for the whole run
static HTTP_CLIENT: Lazy<reqwest::Client> = Lazy::new(|| reqwest::Client::new());

/// the remote calls the scraper needs. every error propagates to the caller,
/// nothing is retried
#[async_trait]
pub trait PostFetcher: Send + Sync {
  /// handle (e.g. `medsky.social`) -> did
  async fn resolve_handle(&self, handle: &str) -> Result<String>;

  /// one page of an author's posts, newest first. `cursor` is `None` for the
  /// first page
  async fn fetch_author_feed(&self, actor: &str, cursor: Option<&str>) -> Result<AuthorFeedPage>;

  /// the post at `uri` with references to its direct replies
  async fn fetch_post_thread(&self, uri: &str) -> Result<ThreadLookup>;
}

/// authenticated xrpc client for a bluesky pds
pub struct BskyClient {
  service: String,
  session: Mutex<Session>,
}

impl BskyClient {
  /// create a session with the configured identifier / password
  pub async fn login(config: &Config) -> Result<Self> {
    let url = xrpc_url(&config.service, CREATE_SESSION);
    debug!(%url, identifier = %config.identifier, "creating session");
    let resp = HTTP_CLIENT.post(&url)
      .json(&CreateSessionInput {
        identifier: &config.identifier,
        password: &config.password,
      })
      .send().await?;
    let session: Session = read_json(CREATE_SESSION, resp).await?;
    info!(handle = %session.handle, did = %session.did, "logged in");

    Ok(BskyClient {
      service: config.service.clone(),
      session: Mutex::new(session),
    })
  }

  async fn xrpc_get<T: DeserializeOwned>(&self, nsid: &str, params: &[(&str, &str)]) -> Result<T> {
    let access_jwt = self.session.lock().await.access_jwt.clone();
    reissue_on_expired_token(
      access_jwt,
      |token| async move { self.get_with_token(nsid, params, &token).await },
      || self.refresh_session(),
    ).await
  }

  async fn get_with_token<T: DeserializeOwned>(&self, nsid: &str, params: &[(&str, &str)], token: &str
  ) -> Result<T> {
    let url = xrpc_url(&self.service, nsid);
    debug!(%url, ?params, "xrpc get");
    let resp = HTTP_CLIENT.get(&url)
      .query(params)
      .bearer_auth(token)
      .send().await?;
    read_json(nsid, resp).await
  }

  async fn refresh_session(&self) -> Result<String> {
    let mut session = self.session.lock().await;
    debug!(handle = %session.handle, "refreshing expired session");
    let resp = HTTP_CLIENT.post(xrpc_url(&self.service, REFRESH_SESSION))
      .bearer_auth(&session.refresh_jwt)
      .send().await?;
    *session = read_json(REFRESH_SESSION, resp).await?;

    Ok(session.access_jwt.clone())
  }
}

#[async_trait]
impl PostFetcher for BskyClient {
  async fn resolve_handle(&self, handle: &str) -> Result<String> {
    let out: ResolveHandleOutput = self.xrpc_get(RESOLVE_HANDLE, &[("handle", handle)]).await?;
    Ok(out.did)
  }

  async fn fetch_author_feed(&self, actor: &str, cursor: Option<&str>) -> Result<AuthorFeedPage> {
    let mut params = vec![("actor", actor)];
    // add cursor if present
    if let Some(cursor) = cursor.filter(|c| !c.is_empty()) {
      params.push(("cursor", cursor));
    }
    self.xrpc_get(GET_AUTHOR_FEED, &params).await
  }

  async fn fetch_post_thread(&self, uri: &str) -> Result<ThreadLookup> {
    classify_thread_response(self.xrpc_get::<Value>(GET_POST_THREAD, &[("uri", uri)]).await)
  }
}

/// run `call` with `token`. if the server says the token has expired, get a
/// fresh one from `refresh` and run `call` once more with it
pub async fn reissue_on_expired_token<T, C, CF, R, RF>(token: String, call: C, refresh: R) -> Result<T>
where
  C: Fn(String) -> CF,
  CF: Future<Output = Result<T>>,
  R: FnOnce() -> RF,
  RF: Future<Output = Result<String>>,
{
  match call(token).await {
    // access tokens are short-lived
    Err(e) if is_expired_token(&e) => {
      let token = refresh().await?;
      call(token).await
    },
    result => result,
  }
}

fn is_expired_token(err: &ScrapeError) -> bool {
  matches!(err, ScrapeError::Api { error, .. } if error == "ExpiredToken")
}

/// turn a `getPostThread` result into a lookup
pub fn classify_thread_response(response: Result<Value>) -> Result<ThreadLookup> {
  match response {
    Ok(json) => Ok(parse_thread(json.get("thread"))),
    // deleted / nonexistent posts come back as a 400 rather than a
    // `#notFoundPost` member
    Err(ScrapeError::Api { error, .. }) if error == "NotFound" => Ok(ThreadLookup::NotFound),
    Err(e) => Err(e),
  }
}

fn xrpc_url(service: &str, nsid: &str) -> String {
  format!("{}/xrpc/{}", service.trim_end_matches('/'), nsid)
}

async fn read_json<T: DeserializeOwned>(nsid: &str, resp: reqwest::Response) -> Result<T> {
  let status = resp.status().as_u16();
  let text = resp.text().await?;
  decode_response(nsid, status, &text)
}

/// decode an xrpc response body, or turn a non-2xx answer into `ScrapeError::Api`
pub fn decode_response<T: DeserializeOwned>(nsid: &str, status: u16, body: &str) -> Result<T> {
  if !(200..300).contains(&status) {
    // error bodies are `{ "error": ..., "message": ... }`, but don't count on it
    let body: XrpcErrorBody = serde_json::from_str(body).unwrap_or_default();
    return Err(ScrapeError::Api {
      endpoint: nsid.to_string(),
      status,
      error: body.error,
      message: body.message,
    });
  }
  Ok(serde_json::from_str(body)?)
}

/// classify the `thread` member of a `getPostThread` response
///
/// `thread` is a union keyed by `$type`: `#threadViewPost` carries a `post`
/// and optional `replies`, `#notFoundPost` / `#blockedPost` don't
pub fn parse_thread(thread: Option<&Value>) -> ThreadLookup {
  let thread = match thread {
    Some(thread) if !thread.is_null() => thread,
    _ => return ThreadLookup::NotFound,
  };
  if union_kind(thread) == Some(NOT_FOUND_POST) {
    return ThreadLookup::NotFound;
  }

  let post = match thread.get("post")
    .and_then(|post| serde_json::from_value::<PostView>(post.clone()).ok()) {
    Some(post) => post,
    None => return ThreadLookup::Malformed,
  };

  let replies: Vec<ThreadReply> = thread.get("replies")
    .and_then(Value::as_array)
    .map(|replies| replies.iter().map(parse_reply).collect())
    .unwrap_or_default();

  ThreadLookup::Found(ThreadNode { post, replies })
}

fn parse_reply(reply: &Value) -> ThreadReply {
  match reply.get("post").and_then(|p| p.get("uri")).and_then(Value::as_str) {
    Some(uri) => ThreadReply::Post { uri: uri.to_string() },
    None => ThreadReply::Unavailable {
      kind: union_kind(reply).unwrap_or("unknown").to_string(),
    },
  }
}

fn union_kind(item: &Value) -> Option<&str> {
  item.get("$type").and_then(Value::as_str)
}
