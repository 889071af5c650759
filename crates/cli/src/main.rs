mod cli;
mod logging;
mod resolver;
mod store;

use std::path::Path;

use anyhow::Context;
use clap::Parser;
use scout::{EngineConfig, FilterSpec, ScrapeRunner, SessionManager};

use crate::cli::{Cli, Command, RunArgs, SessionArgs};
use crate::resolver::StaticOriginResolver;
use crate::store::JsonFileStore;

#[tokio::main]
async fn main() {
	let cli = Cli::parse();
	logging::init_logging(cli.verbose);

	if let Err(err) = dispatch(cli).await {
		eprintln!("error: {err:#}");
		std::process::exit(1);
	}
}

async fn dispatch(cli: Cli) -> anyhow::Result<()> {
	let config = load_config(cli.config.as_deref())?;
	match cli.command {
		Command::Run(args) => run(config, args).await,
		Command::Session(args) => probe_session(config, &args).await,
	}
}

fn load_config(path: Option<&Path>) -> anyhow::Result<EngineConfig> {
	let Some(path) = path else {
		return Ok(EngineConfig::default());
	};
	let text = std::fs::read_to_string(path)
		.with_context(|| format!("reading config file {}", path.display()))?;
	serde_json::from_str(&text).with_context(|| format!("parsing config file {}", path.display()))
}

async fn run(mut config: EngineConfig, args: RunArgs) -> anyhow::Result<()> {
	apply_session_overrides(&mut config, &args.session);
	if let Some(rows) = args.rows {
		config.row_cap = rows;
	}

	let spec = FilterSpec {
		origin: args.origin,
		destination: args.destination,
		loading_date_from: args.loading_from,
		loading_date_to: args.loading_to,
		unloading_date_from: args.unloading_from,
		unloading_date_to: args.unloading_to,
		max_weight_tons: args.max_weight,
	};

	let store = JsonFileStore::open(&args.store).context("opening listing store")?;
	let resolver = StaticOriginResolver::new(args.home_base);
	let mut runner = ScrapeRunner::new(config, store, resolver);

	let outcome = runner.run(spec).await;
	// Always detach; the browser window belongs to the operator.
	runner.release_session();
	let report = outcome.context("scrape failed")?;

	println!("{}", serde_json::to_string_pretty(&report)?);
	Ok(())
}

async fn probe_session(mut config: EngineConfig, args: &SessionArgs) -> anyhow::Result<()> {
	apply_session_overrides(&mut config, args);

	let mut manager = SessionManager::new(config);
	let handle = manager.acquire().await.context("session unavailable")?;
	let url = handle.page().url().await?.unwrap_or_default();

	println!("{}", serde_json::json!({ "attached": true, "url": url }));
	manager.release();
	Ok(())
}

fn apply_session_overrides(config: &mut EngineConfig, args: &SessionArgs) {
	if let Some(port) = args.port {
		config.cdp_port = port;
	}
	if let Some(profile_dir) = &args.profile_dir {
		config.profile_dir = profile_dir.clone();
	}
}
