use thiserror::Error;

pub type Result<T> = std::result::Result<T, ScrapeError>;

#[derive(Debug, Error)]
pub enum ScrapeError {
  /// a required environment variable is unset. raised before any network call
  #[error("environment variable {var} not set. please export it in your shell")]
  MissingCredential { var: &'static str },

  #[error("could not load .env: {0}")]
  DotEnv(#[from] dotenvy::Error),

  #[error("http transport error: {0}")]
  Http(#[from] reqwest::Error),

  /// the xrpc endpoint answered with a non-success status
  #[error("{endpoint} failed with status {status}: {error}: {message}")]
  Api {
    endpoint: String,
    status: u16,
    error: String,
    message: String,
  },

  #[error("could not decode response body: {0}")]
  Json(#[from] serde_json::Error),

  #[error("csv error: {0}")]
  Csv(#[from] csv::Error),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  /// a post uri or link without a trailing record-id segment
  #[error("no record id in `{0}`")]
  InvalidUri(String),
}
