use chrono::{DateTime, Utc};
use clap::Parser;
use frontline::*;
use log::*;
use std::path::PathBuf;

/// Resolves the current targets for a territory document.
#[derive(Parser)]
#[command(version, about)]
struct Opts {
    /// Territory document read by the in-memory gateway.
    territory: PathBuf,
    /// Targeting configuration. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Resolution time as RFC 3339. Defaults to the current time.
    #[arg(short, long)]
    now: Option<DateTime<Utc>>,
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let opts = Opts::parse();

    logging::setup_logging(if opts.verbose { logging::Debug } else { logging::Info })?;

    let features = match &opts.config {
        Some(path) => TargetingFeatures::from_json(&std::fs::read_to_string(path)?)?,
        None => TargetingFeatures::default(),
    };

    let gateway = InMemoryGateway::from_json(&std::fs::read_to_string(&opts.territory)?)?;

    let now = opts.now.unwrap_or_else(Utc::now);

    info!("Loaded territory. Path: {} - Now: {}", opts.territory.display(), now);

    let targets = TargetSystem::resolve(&gateway, now, &features)?;

    println!("{}", serde_json::to_string_pretty(&targets)?);

    Ok(())
}
