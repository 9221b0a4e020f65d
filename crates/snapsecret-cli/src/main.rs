//! SnapSecret route table tool
//!
//! Validates route tables, lists them in resolution order and shows which
//! view a path activates.
//!
//! ## Usage
//!
//! ```bash
//! snapsecret-routes check --profile reduced
//! snapsecret-routes list --config routes.toml
//! snapsecret-routes resolve /secret/xyz789 /nonexistent
//! ```
//!
//! Without `--config` or `--profile` the table is chosen by
//! `SNAPSECRET_ROUTES_FILE` / `SNAPSECRET_ROUTES_PROFILE`.

mod commands;

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use commands::TableSource;
use snapsecret_conf::RouteProfile;
use std::io;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;

#[derive(Parser)]
#[command(name = "snapsecret-routes")]
#[command(about = "Check and explore SnapSecret route tables", long_about = None)]
#[command(version)]
struct Cli {
	#[command(subcommand)]
	command: Commands,

	/// Verbosity level (can be repeated)
	#[arg(short, long, action = clap::ArgAction::Count, global = true)]
	verbosity: u8,
}

#[derive(Args)]
struct TableArgs {
	/// TOML route table to load
	#[arg(long, value_name = "FILE", conflicts_with = "profile")]
	config: Option<PathBuf>,

	/// Built-in route table: full or reduced
	#[arg(long, value_name = "NAME")]
	profile: Option<RouteProfile>,
}

impl TableArgs {
	fn source(self) -> TableSource {
		TableSource::from_args(self.config, self.profile)
	}
}

#[derive(Subcommand)]
enum Commands {
	/// Validate a route table
	Check {
		#[command(flatten)]
		table: TableArgs,
	},

	/// List routes in the order they are tried
	List {
		#[command(flatten)]
		table: TableArgs,
	},

	/// Navigate to each path and print the view that becomes active
	Resolve {
		#[command(flatten)]
		table: TableArgs,

		/// Paths to resolve, e.g. /secret/abc
		#[arg(value_name = "PATH", required = true)]
		paths: Vec<String>,
	},
}

fn init_tracing(verbosity: u8) {
	let log_level = match verbosity {
		0 => "warn",
		1 => "info",
		2 => "debug",
		_ => "trace",
	};

	tracing_subscriber::registry()
		.with(
			tracing_subscriber::EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| format!("snapsecret={log_level}").into()),
		)
		.with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
		.init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
	let cli = Cli::parse();
	init_tracing(cli.verbosity);

	let mut out = io::stdout().lock();
	let result = match cli.command {
		Commands::Check { table } => match table.source().load() {
			Ok(settings) => commands::check(&settings, &mut out),
			Err(e) => Err(e.into()),
		},
		Commands::List { table } => match table.source().load() {
			Ok(settings) => commands::list(&settings, &mut out),
			Err(e) => Err(e.into()),
		},
		Commands::Resolve { table, paths } => match table.source().load() {
			Ok(settings) => commands::resolve(&settings, &paths, &mut out).await,
			Err(e) => Err(e.into()),
		},
	};

	if let Err(e) = result {
		let label = if commands::is_configuration_error(&e) {
			"Configuration error"
		} else {
			"Error"
		};
		eprintln!("{}: {:#}", label.red().bold(), e);
		process::exit(1);
	}
}
