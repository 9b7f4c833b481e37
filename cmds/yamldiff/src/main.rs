use anyhow::Result;
use clap::Parser;
use yamldiff::{
	commands::{self, diff::DiffArgs, util::BrokenPipeGuard},
	telemetry,
};

#[derive(Parser)]
#[command(name = "yamldiff")]
#[command(about = "Diff two multi-document YAML manifests, ignoring document order", long_about = None)]
#[command(version)]
struct Cli {
	#[command(flatten)]
	args: DiffArgs,
}

fn main() -> Result<()> {
	let cli = Cli::parse();

	telemetry::init(cli.args.log_level)?;

	let stdout = BrokenPipeGuard::new(std::io::stdout().lock());
	commands::diff::run(cli.args, stdout)
}
