use std::{env, path::PathBuf};
use crate::error::{Result, ScrapeError};

/// profile whose labeling threads get scraped
pub const PROFILE_HANDLE: &str = "medsky.social";
/// case-insensitive substring that marks a feed post as the parent of a
/// labeling thread. heuristic, not foolproof
pub const THREAD_MARKER: &str = "thread";
/// text before the first occurrence of this is the extracted label.
/// heuristic, not foolproof
pub const CONTENT_DELIMITER: &str = "->";
/// host used when building human-facing post links
pub const WEB_HOST: &str = "bsky.app";
pub const OUTPUT_FILE_NAME: &str = "extracted_fields_medsky.csv";
pub const DEFAULT_SERVICE: &str = "https://bsky.social";

pub const USER_VAR: &str = "BSKY_USER";
pub const PASSWORD_VAR: &str = "BSKY_PASSWORD";
pub const SERVICE_VAR: &str = "BSKY_SERVICE";

/// everything read from the process environment, sourced once at startup
#[derive(Clone)]
pub struct Config {
  /// handle or email used to log in
  pub identifier: String,
  pub password: String,
  /// base url of the pds / xrpc service, without trailing slash
  pub service: String,
}

impl Config {
  /// read credentials from the environment (after loading `.env` if present)
  pub fn from_env() -> Result<Self> {
    allow_missing_dotenv(dotenvy::dotenv())?;
    Self::from_vars(|key| env::var(key).ok())
  }

  /// build from any key lookup. `from_env` is this over `std::env`
  pub fn from_vars<F>(lookup: F) -> Result<Self>
  where
    F: Fn(&str) -> Option<String>,
  {
    let password = match lookup(PASSWORD_VAR).filter(|p| !p.is_empty()) {
      Some(password) => password,
      None => return Err(ScrapeError::MissingCredential { var: PASSWORD_VAR }),
    };
    let identifier = lookup(USER_VAR).unwrap_or_default();
    let service = lookup(SERVICE_VAR)
      .filter(|s| !s.is_empty())
      .unwrap_or_else(|| DEFAULT_SERVICE.to_string())
      .trim_end_matches('/')
      .to_string();

    Ok(Config { identifier, password, service })
  }
}

// keep the password out of debug output / logs
impl std::fmt::Debug for Config {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Config")
      .field("identifier", &self.identifier)
      .field("password", &"<redacted>")
      .field("service", &self.service)
      .finish()
  }
}

/// a missing `.env` is the normal case. a `.env` that fails to parse is not
pub fn allow_missing_dotenv(loaded: std::result::Result<PathBuf, dotenvy::Error>) -> Result<()> {
  match loaded {
    Ok(_) => Ok(()),
    Err(e) if e.not_found() => Ok(()),
    Err(e) => Err(ScrapeError::DotEnv(e)),
  }
}

/// `<cwd>/extracted_fields_medsky.csv`
pub fn default_output_path() -> Result<PathBuf> {
  Ok(env::current_dir()?.join(OUTPUT_FILE_NAME))
}
