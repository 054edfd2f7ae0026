use std::sync::Arc;

use color_eyre::eyre::Result;
use folio::api::BlogClient;
use folio::app::{App, Flags};
use folio::config::Config;
use folio::query::QueryClient;
use folio::runtime::Runtime;
use folio::views::Services;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    // stdout belongs to the terminal UI
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("off")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_env()?;
    info!(api_url = %config.api_url, "starting");

    let services = Services::new(
        Arc::new(QueryClient::new()),
        Arc::new(BlogClient::new(config.api_url.clone())),
    );
    let frame_rate = config.frame_rate;
    let runtime = Runtime::<App>::new(Flags { config, services }, frame_rate);

    let mut terminal = ratatui::init();
    let result = runtime.run(&mut terminal).await;
    ratatui::restore();

    result
}
