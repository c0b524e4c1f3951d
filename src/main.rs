use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use pickup_scout::{config, pipeline};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("pickup_scout=info,warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = config::load_config().context("loading configuration")?;
    let summary = pipeline::run(&config)?;

    info!(
        "done: {} players ranked, {} candidates matched ({} unmatched), {} recommended",
        summary.ranked_players, summary.matched, summary.unmatched, summary.recommended
    );
    Ok(())
}
