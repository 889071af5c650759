use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "scout")]
#[command(about = "Freight-exchange listing scout - apply filters, extract offers, persist them")]
#[command(version)]
pub struct Cli {
	/// Increase verbosity (-v info, -vv debug)
	#[arg(short, long, global = true, action = clap::ArgAction::Count)]
	pub verbose: u8,

	/// Engine configuration file (JSON, merged over built-in defaults)
	#[arg(long, global = true, value_name = "FILE")]
	pub config: Option<PathBuf>,

	#[command(subcommand)]
	pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
	/// Run one scrape against the exchange and persist the listings
	Run(RunArgs),
	/// Attach to (or launch) the browser and report the active page
	Session(SessionArgs),
}

#[derive(Args, Debug)]
pub struct RunArgs {
	/// Destination place query, e.g. "DE, 10115, Berlin"
	#[arg(long)]
	pub destination: String,

	/// Origin place query; resolved from --home-base when omitted
	#[arg(long)]
	pub origin: Option<String>,

	/// Origin used when --origin is omitted (vehicle home base)
	#[arg(long, value_name = "PLACE")]
	pub home_base: Option<String>,

	/// Loading date lower bound, dd.mm.yyyy
	#[arg(long, value_name = "DATE")]
	pub loading_from: Option<String>,

	/// Loading date upper bound, dd.mm.yyyy (defaults to today)
	#[arg(long, value_name = "DATE")]
	pub loading_to: Option<String>,

	/// Unloading date lower bound, dd.mm.yyyy
	#[arg(long, value_name = "DATE")]
	pub unloading_from: Option<String>,

	/// Unloading date upper bound, dd.mm.yyyy (defaults to tomorrow)
	#[arg(long, value_name = "DATE")]
	pub unloading_to: Option<String>,

	/// Maximum weight in tons; values above 100 are read as kilograms
	#[arg(long)]
	pub max_weight: Option<f64>,

	/// Listings file, upserted by external id
	#[arg(long, default_value = "listings.json", value_name = "FILE")]
	pub store: PathBuf,

	/// Cap on extracted rows
	#[arg(long, value_name = "N")]
	pub rows: Option<usize>,

	#[command(flatten)]
	pub session: SessionArgs,
}

#[derive(Args, Debug)]
pub struct SessionArgs {
	/// Remote debugging port
	#[arg(long, value_name = "PORT")]
	pub port: Option<u16>,

	/// Persistent browser profile directory
	#[arg(long, value_name = "DIR")]
	pub profile_dir: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn run_requires_destination() {
		assert!(Cli::try_parse_from(["scout", "run"]).is_err());
		let cli = Cli::try_parse_from(["scout", "run", "--destination", "DE, 10115"]).unwrap();
		let Command::Run(args) = cli.command else {
			panic!("expected run command");
		};
		assert_eq!(args.destination, "DE, 10115");
		assert_eq!(args.store, PathBuf::from("listings.json"));
		assert_eq!(args.origin, None);
	}

	#[test]
	fn run_accepts_full_filter_set() {
		let cli = Cli::try_parse_from([
			"scout",
			"-vv",
			"run",
			"--destination",
			"PL, 00-001, Warszawa",
			"--origin",
			"DE, 10115",
			"--loading-to",
			"15.03.2026",
			"--max-weight",
			"24",
			"--port",
			"9555",
		])
		.unwrap();
		assert_eq!(cli.verbose, 2);
		let Command::Run(args) = cli.command else {
			panic!("expected run command");
		};
		assert_eq!(args.loading_to.as_deref(), Some("15.03.2026"));
		assert_eq!(args.max_weight, Some(24.0));
		assert_eq!(args.session.port, Some(9555));
	}

	#[test]
	fn session_probe_parses_overrides() {
		let cli = Cli::try_parse_from(["scout", "session", "--profile-dir", "/tmp/profile"]).unwrap();
		let Command::Session(args) = cli.command else {
			panic!("expected session command");
		};
		assert_eq!(args.profile_dir, Some(PathBuf::from("/tmp/profile")));
	}
}
