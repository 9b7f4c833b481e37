//! Comparing the two normalized files.
//!
//! The pipeline only produces the files; what happens to them is up to a
//! [`Comparator`]. The default one just reports the paths.

use std::{
	fmt,
	io::Write,
	path::Path,
	process::{Command, Stdio},
};

use clap::ValueEnum;
use thiserror::Error;
use tracing::{debug, instrument};
use yamldiff_diff::{unified_diff, DiffOutput, OutputError};

#[derive(Debug, Error)]
pub enum CompareError {
	#[error("external diff command is empty")]
	EmptyCommand,

	#[error("running {program}")]
	Spawn {
		program: String,
		#[source]
		source: std::io::Error,
	},

	#[error("{program} failed with {status}")]
	ExternalFailed { program: String, status: String },

	#[error("reading {path}")]
	Read {
		path: String,
		#[source]
		source: std::io::Error,
	},

	#[error("writing comparison output")]
	Write(#[from] std::io::Error),

	#[error(transparent)]
	Output(#[from] OutputError),
}

/// How a comparison went.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
	/// Paths were handed over without looking at the contents.
	Reported,
	Identical,
	Different,
}

impl fmt::Display for Comparison {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Comparison::Reported => write!(f, "reported"),
			Comparison::Identical => write!(f, "identical"),
			Comparison::Different => write!(f, "different"),
		}
	}
}

/// The input files and their normalized counterparts.
#[derive(Debug, Clone, Copy)]
pub struct NormalizedPair<'a> {
	pub from_input: &'a Path,
	pub to_input: &'a Path,
	pub from: &'a Path,
	pub to: &'a Path,
}

pub trait Comparator {
	fn compare(&self, pair: NormalizedPair<'_>, out: &mut dyn Write) -> Result<Comparison, CompareError>;
}

/// Which [`Comparator`] to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Strategy {
	/// Print `diff <from> <to>` with the normalized file paths
	#[default]
	Print,

	/// Run an external diff program on the normalized files
	External,

	/// Show a unified diff computed in-process
	Builtin,
}

impl fmt::Display for Strategy {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Strategy::Print => write!(f, "print"),
			Strategy::External => write!(f, "external"),
			Strategy::Builtin => write!(f, "builtin"),
		}
	}
}

impl Strategy {
	/// Whether the normalized files are the result themselves and must outlive
	/// the run.
	pub fn needs_files_kept(self) -> bool {
		matches!(self, Strategy::Print)
	}
}

pub struct PrintPaths;

impl Comparator for PrintPaths {
	fn compare(&self, pair: NormalizedPair<'_>, out: &mut dyn Write) -> Result<Comparison, CompareError> {
		writeln!(out, "diff {} {}", pair.from.display(), pair.to.display())?;
		Ok(Comparison::Reported)
	}
}

/// Runs `program args... <from> <to>`, following `diff` exit status conventions.
#[derive(Debug)]
pub struct ExternalDiff {
	program: String,
	args: Vec<String>,
}

impl ExternalDiff {
	/// Build from a command line such as `diff -u`, split on whitespace.
	pub fn from_command_line(command: &str) -> Result<Self, CompareError> {
		let mut words = command.split_whitespace().map(str::to_string);
		let program = words.next().ok_or(CompareError::EmptyCommand)?;
		Ok(Self {
			program,
			args: words.collect(),
		})
	}
}

impl Comparator for ExternalDiff {
	#[instrument(skip_all, fields(program = %self.program))]
	fn compare(&self, pair: NormalizedPair<'_>, out: &mut dyn Write) -> Result<Comparison, CompareError> {
		let output = Command::new(&self.program)
			.args(&self.args)
			.arg(pair.from)
			.arg(pair.to)
			.stdin(Stdio::null())
			.stderr(Stdio::inherit())
			.output()
			.map_err(|source| CompareError::Spawn {
				program: self.program.clone(),
				source,
			})?;

		out.write_all(&output.stdout)?;
		out.flush()?;

		debug!(status = %output.status, "external diff finished");
		match output.status.code() {
			Some(0) => Ok(Comparison::Identical),
			Some(1) => Ok(Comparison::Different),
			_ => Err(CompareError::ExternalFailed {
				program: self.program.clone(),
				status: output.status.to_string(),
			}),
		}
	}
}

/// Unified diff computed with `similar`, headed with the input file names.
pub struct BuiltinDiff {
	pub color: bool,
	pub context_radius: usize,
}

fn read(path: &Path) -> Result<String, CompareError> {
	std::fs::read_to_string(path).map_err(|source| CompareError::Read {
		path: path.display().to_string(),
		source,
	})
}

impl Comparator for BuiltinDiff {
	#[instrument(skip_all)]
	fn compare(&self, pair: NormalizedPair<'_>, out: &mut dyn Write) -> Result<Comparison, CompareError> {
		let old = read(pair.from)?;
		let new = read(pair.to)?;
		if old == new {
			return Ok(Comparison::Identical);
		}

		let diff = unified_diff(
			&old,
			&new,
			&format!("a/{}", pair.from_input.display()),
			&format!("b/{}", pair.to_input.display()),
			self.context_radius,
		);
		let mut output = DiffOutput::new(out, self.color)?;
		output.write_diff(&diff)?;
		output.flush()?;
		Ok(Comparison::Different)
	}
}
