//! The reorder-and-compare pipeline behind `yamldiff <from> <to>`.

use std::{
	io::{IsTerminal, Write},
	path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use k8s::list_resources;
use thiserror::Error;
use tracing::{debug, instrument, Level};

use crate::{
	compare::{BuiltinDiff, Comparator, Comparison, ExternalDiff, NormalizedPair, PrintPaths, Strategy},
	reorder::reorder_resources,
	writer::write_normalized,
};

#[derive(Debug, Error, PartialEq, Eq)]
#[error("usage: yamldiff from.json to.json")]
pub struct UsageError;

/// When to color builtin diff output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ColorMode {
	/// Color if stdout is a terminal
	#[default]
	Auto,
	Always,
	Never,
}

impl ColorMode {
	pub fn should_colorize(self) -> bool {
		match self {
			ColorMode::Auto => std::io::stdout().is_terminal(),
			ColorMode::Always => true,
			ColorMode::Never => false,
		}
	}
}

#[derive(Args, Debug)]
pub struct DiffArgs {
	/// Manifest bundles to compare: <from.yaml> <to.yaml>
	#[arg(value_name = "FILE")]
	pub files: Vec<PathBuf>,

	/// What to do with the normalized files
	#[arg(long, value_enum, env = "YAMLDIFF_STRATEGY", default_value_t = Strategy::Print)]
	pub strategy: Strategy,

	/// Diff program for the external strategy, split on whitespace
	#[arg(long, env = "YAMLDIFF_EXTERNAL_DIFF", default_value = "diff -u")]
	pub diff_command: String,

	/// Color builtin diff output
	#[arg(long, value_enum, default_value_t = ColorMode::Auto)]
	pub color: ColorMode,

	/// Lines of context in builtin diff output
	#[arg(long, default_value_t = yamldiff_diff::DEFAULT_CONTEXT_RADIUS)]
	pub context: usize,

	/// Keep the normalized files after an external or builtin comparison
	#[arg(long)]
	pub keep_files: bool,

	/// Directory for the normalized files [default: system temp dir]
	#[arg(long, env = "YAMLDIFF_TMPDIR")]
	pub tmp_dir: Option<PathBuf>,

	/// Log level (error, warn, info, debug, trace); falls back to RUST_LOG
	#[arg(long)]
	pub log_level: Option<Level>,
}

/// Pipeline settings, independent of how they were collected.
///
/// The defaults are the command line defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffOpts {
	pub strategy: Strategy,
	pub diff_command: String,
	pub color: ColorMode,
	pub context: usize,
	pub keep_files: bool,
	pub tmp_dir: Option<PathBuf>,
}

impl Default for DiffOpts {
	fn default() -> Self {
		Self {
			strategy: Strategy::Print,
			diff_command: "diff -u".to_string(),
			color: ColorMode::default(),
			context: yamldiff_diff::DEFAULT_CONTEXT_RADIUS,
			keep_files: false,
			tmp_dir: None,
		}
	}
}

impl From<&DiffArgs> for DiffOpts {
	fn from(args: &DiffArgs) -> Self {
		Self {
			strategy: args.strategy,
			diff_command: args.diff_command.clone(),
			color: args.color,
			context: args.context,
			keep_files: args.keep_files,
			tmp_dir: args.tmp_dir.clone(),
		}
	}
}

impl DiffOpts {
	fn comparator(&self) -> Result<Box<dyn Comparator>> {
		let comparator: Box<dyn Comparator> = match self.strategy {
			Strategy::Print => Box::new(PrintPaths),
			Strategy::External => Box::new(ExternalDiff::from_command_line(&self.diff_command)?),
			Strategy::Builtin => Box::new(BuiltinDiff {
				color: self.color.should_colorize(),
				context_radius: self.context,
			}),
		};
		Ok(comparator)
	}

	/// Normalized files are kept when they are the output, or when asked to.
	pub fn keeps_files(&self) -> bool {
		self.keep_files || self.strategy.needs_files_kept()
	}
}

/// Outcome of a pipeline run.
#[derive(Debug)]
pub struct DiffReport {
	/// Normalized "from" file; only exists afterwards if `kept`.
	pub from_file: PathBuf,
	/// Normalized "to" file; only exists afterwards if `kept`.
	pub to_file: PathBuf,
	pub kept: bool,
	pub comparison: Comparison,
}

/// Split positional arguments into the two input files.
pub fn input_pair(files: Vec<PathBuf>) -> Result<(PathBuf, PathBuf), UsageError> {
	let [from, to] = <[PathBuf; 2]>::try_from(files).map_err(|_| UsageError)?;
	Ok((from, to))
}

fn load(path: &Path) -> Result<Vec<k8s::Resource>> {
	let data =
		std::fs::read(path).with_context(|| format!("failed to read file {}", path.display()))?;
	list_resources(&data).with_context(|| format!("failed to parse {}", path.display()))
}

/// Normalize both bundles into temporary files and compare them.
///
/// Either both files are fully parsed, reordered and written, or the run fails
/// without leaving normalized files behind.
#[instrument(skip(opts, writer), fields(strategy = %opts.strategy))]
pub fn diff_files<W: Write>(
	from: &Path,
	to: &Path,
	opts: &DiffOpts,
	writer: &mut W,
) -> Result<DiffReport> {
	let comparator = opts.comparator()?;

	let from_resources = load(from)?;
	let to_resources = load(to)?;
	let to_resources = reorder_resources(&from_resources, to_resources);

	let dir = opts.tmp_dir.clone().unwrap_or_else(std::env::temp_dir);
	let from_file = write_normalized(from, &from_resources, &dir)
		.with_context(|| format!("failed to write normalized {}", from.display()))?
		.into_temp_path();
	let to_file = write_normalized(to, &to_resources, &dir)
		.with_context(|| format!("failed to write normalized {}", to.display()))?
		.into_temp_path();

	let comparison = comparator
		.compare(
			NormalizedPair {
				from_input: from,
				to_input: to,
				from: &from_file,
				to: &to_file,
			},
			writer,
		)
		.context("failed to compare normalized manifests")?;
	debug!(%comparison, "compared manifests");

	let kept = opts.keeps_files();
	let (from_file, to_file) = if kept {
		(
			from_file.keep().context("failed to keep normalized file")?,
			to_file.keep().context("failed to keep normalized file")?,
		)
	} else {
		(from_file.to_path_buf(), to_file.to_path_buf())
	};

	Ok(DiffReport {
		from_file,
		to_file,
		kept,
		comparison,
	})
}

/// Run the diff command.
pub fn run<W: Write>(args: DiffArgs, mut writer: W) -> Result<()> {
	let opts = DiffOpts::from(&args);
	let (from, to) = input_pair(args.files)?;
	diff_files(&from, &to, &opts, &mut writer)?;
	Ok(())
}

#[cfg(test)]
mod tests {
	use clap::Parser;
	use rstest::rstest;

	use super::*;

	#[rstest]
	#[case::none(&[])]
	#[case::one(&["a.yaml"])]
	#[case::three(&["a.yaml", "b.yaml", "c.yaml"])]
	fn test_input_pair_rejects_wrong_count(#[case] files: &[&str]) {
		let files = files.iter().map(PathBuf::from).collect();
		let err = input_pair(files).unwrap_err();
		assert_eq!(err.to_string(), "usage: yamldiff from.json to.json");
	}

	#[test]
	fn test_input_pair() {
		let (from, to) = input_pair(vec!["a.yaml".into(), "b.yaml".into()]).unwrap();
		assert_eq!(from, Path::new("a.yaml"));
		assert_eq!(to, Path::new("b.yaml"));
	}

	#[rstest]
	#[case::print(Strategy::Print, false, true)]
	#[case::external(Strategy::External, false, false)]
	#[case::builtin(Strategy::Builtin, false, false)]
	#[case::builtin_keep(Strategy::Builtin, true, true)]
	fn test_keeps_files(#[case] strategy: Strategy, #[case] keep_files: bool, #[case] expected: bool) {
		let opts = DiffOpts {
			strategy,
			keep_files,
			..DiffOpts::default()
		};
		assert_eq!(opts.keeps_files(), expected);
	}

	#[derive(Parser)]
	struct Cli {
		#[command(flatten)]
		args: DiffArgs,
	}

	#[test]
	fn test_command_line_defaults_match_library_defaults() {
		let cli = Cli::try_parse_from(["yamldiff", "a.yaml", "b.yaml"]).unwrap();
		let opts = DiffOpts::from(&cli.args);
		assert_eq!(opts.color, ColorMode::Auto);
		assert_eq!(
			opts,
			DiffOpts {
				tmp_dir: opts.tmp_dir.clone(),
				..DiffOpts::default()
			}
		);
	}

	#[test]
	fn test_color_mode() {
		assert!(ColorMode::Always.should_colorize());
		assert!(!ColorMode::Never.should_colorize());
	}
}
