use bsky_thread_scraper::{config::Config, BskyClient, ScrapeTarget, Scraper};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .with_writer(std::io::stderr)
    .init();

  if let Err(e) = run().await {
    eprintln!("error: {}", e);
    std::process::exit(1);
  }
}

async fn run() -> bsky_thread_scraper::Result<()> {
  // fail on missing credentials before touching the network
  let config = Config::from_env()?;
  let target = ScrapeTarget::medsky()?;

  let client = BskyClient::login(&config).await?;
  Scraper::new(client, target).run().await?;

  Ok(())
}
