use tracing::{debug, warn};
use crate::{
  error::Result,
  fetch::PostFetcher,
  types::{PostRecord, Thread, ThreadLookup, ThreadReply},
};

/// fetch the post at `uri` and every reply under it, flattened depth-first:
/// the post itself, then each reply's whole subtree before the next sibling
///
/// every node is fetched by its own uri. a node that doesn't resolve (or has
/// no post payload) contributes nothing, which for the root means an empty
/// thread. reply trees are assumed acyclic
pub async fn walk_thread<F>(fetcher: &F, uri: &str) -> Result<Thread>
where
  F: PostFetcher + ?Sized,
{
  let mut thread: Thread = Vec::new();
  // (uri, depth). explicit stack so deep threads don't grow the call stack
  let mut pending: Vec<(String, usize)> = vec![(uri.to_string(), 0)];

  while let Some((uri, depth)) = pending.pop() {
    if depth > 0 {
      println!("|--Processing uri {}", uri);
    }

    let node = match fetcher.fetch_post_thread(&uri).await? {
      ThreadLookup::Found(node) => node,
      ThreadLookup::NotFound => {
        debug!(%uri, depth, "post not found, skipping subtree");
        continue;
      },
      ThreadLookup::Malformed => {
        warn!(%uri, depth, "thread response has no post, skipping subtree");
        continue;
      },
    };
    thread.push(PostRecord::from(&node.post));

    let replies: Vec<String> = node.replies.into_iter()
      .filter_map(|reply| match reply {
        ThreadReply::Post { uri } => Some(uri),
        ThreadReply::Unavailable { kind } => {
          warn!(parent_uri = %node.post.uri, %kind, "reply has no post, skipping");
          None
        },
      })
      .collect();
    // reversed so the first reply is popped (walked) first
    pending.extend(replies.into_iter().rev().map(|reply_uri| (reply_uri, depth + 1)));
  }

  Ok(thread)
}
