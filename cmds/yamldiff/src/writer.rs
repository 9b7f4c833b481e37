//! Writing normalized manifest bundles to temporary files.

use std::{
	io::{BufWriter, Write},
	path::Path,
};

use k8s::Resource;
use tempfile::{Builder, NamedTempFile};
use thiserror::Error;
use tracing::{debug, instrument};

use crate::yaml;

#[derive(Debug, Error)]
pub enum WriteError {
	#[error("creating temporary file in {dir}")]
	Create {
		dir: String,
		#[source]
		source: std::io::Error,
	},

	#[error("serializing {resource} to YAML")]
	Serialize {
		resource: String,
		#[source]
		source: serde_saphyr::ser_error::Error,
	},

	#[error("writing {path}")]
	Write {
		path: String,
		#[source]
		source: std::io::Error,
	},
}

/// Serialize each resource into its own YAML document.
pub fn to_documents(resources: &[Resource]) -> Result<Vec<String>, WriteError> {
	resources
		.iter()
		.map(|resource| {
			yaml::to_yaml(resource.as_value()).map_err(|source| WriteError::Serialize {
				resource: resource.key().to_string(),
				source,
			})
		})
		.collect()
}

/// Write serialized documents as a multi-document YAML stream.
///
/// Documents after the first are preceded by a `---` line.
pub fn write_documents<W: Write>(mut writer: W, documents: &[String]) -> std::io::Result<()> {
	for (idx, document) in documents.iter().enumerate() {
		if idx > 0 {
			writer.write_all(b"---\n")?;
		}
		writer.write_all(document.as_bytes())?;
	}
	writer.flush()
}

/// Write `resources` into a new temporary file in `dir`.
///
/// The file name starts with the file name of `input`. Resources are serialized
/// before the file is created. The file is deleted when the returned handle is
/// dropped unless the caller persists it, so a file that failed to be written
/// is never left behind.
#[instrument(skip(resources), fields(resources = resources.len()))]
pub fn write_normalized(
	input: &Path,
	resources: &[Resource],
	dir: &Path,
) -> Result<NamedTempFile, WriteError> {
	let documents = to_documents(resources)?;

	let prefix = input
		.file_name()
		.map(|name| format!("{}.", name.to_string_lossy()))
		.unwrap_or_default();

	let mut file = Builder::new()
		.prefix(&prefix)
		.tempfile_in(dir)
		.map_err(|source| WriteError::Create {
			dir: dir.display().to_string(),
			source,
		})?;

	write_documents(BufWriter::new(file.as_file_mut()), &documents).map_err(|source| {
		WriteError::Write {
			path: file.path().display().to_string(),
			source,
		}
	})?;

	debug!(path = %file.path().display(), "wrote normalized manifests");
	Ok(file)
}
