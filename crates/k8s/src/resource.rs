//! Typed view over a single manifest document.

use std::fmt;

use serde_json::Value as JsonValue;
use thiserror::Error;

/// Namespace assigned to resources that don't specify one.
pub const DEFAULT_NAMESPACE: &str = "default";

/// Reasons a document can't be treated as a resource.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResourceError {
	#[error("document is not an object")]
	NotAnObject,

	#[error("manifest missing apiVersion or kind")]
	MissingApiVersionOrKind,

	#[error("manifest of kind {kind} missing metadata.name")]
	MissingName { kind: String },
}

/// Identifies a resource across two manifest bundles.
///
/// Not guaranteed unique within a bundle: two documents may share a key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceKey {
	pub group: String,
	pub version: String,
	pub kind: String,
	pub name: String,
	pub namespace: String,
}

/// Formats as `group.version.kind.namespace.name`, group omitted if empty.
impl fmt::Display for ResourceKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if !self.group.is_empty() {
			write!(f, "{}.", self.group)?;
		}
		write!(
			f,
			"{}.{}.{}.{}",
			self.version, self.kind, self.namespace, self.name
		)
	}
}

/// One parsed manifest document.
///
/// The full document body is kept as-is, identity fields are read from it on
/// demand. Construction guarantees `apiVersion`, `kind` and `metadata.name` are
/// strings, so the accessors below never fail.
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
	value: JsonValue,
}

impl Resource {
	/// Validate a document and wrap it.
	pub fn from_value(value: JsonValue) -> Result<Self, ResourceError> {
		let obj = value.as_object().ok_or(ResourceError::NotAnObject)?;

		let kind = match (
			obj.get("apiVersion").and_then(JsonValue::as_str),
			obj.get("kind").and_then(JsonValue::as_str),
		) {
			(Some(_), Some(kind)) => kind,
			_ => return Err(ResourceError::MissingApiVersionOrKind),
		};

		let has_name = obj
			.get("metadata")
			.and_then(|m| m.get("name"))
			.and_then(JsonValue::as_str)
			.is_some();
		if !has_name {
			return Err(ResourceError::MissingName {
				kind: kind.to_string(),
			});
		}

		Ok(Self { value })
	}

	fn str_field(&self, field: &str) -> &str {
		self.value
			.get(field)
			.and_then(JsonValue::as_str)
			.unwrap_or_default()
	}

	fn metadata_field(&self, field: &str) -> &str {
		self.value
			.get("metadata")
			.and_then(|m| m.get(field))
			.and_then(JsonValue::as_str)
			.unwrap_or_default()
	}

	pub fn api_version(&self) -> &str {
		self.str_field("apiVersion")
	}

	/// API group, empty for the core group (`apiVersion: v1`).
	pub fn group(&self) -> &str {
		match self.api_version().split_once('/') {
			Some((group, _)) => group,
			None => "",
		}
	}

	pub fn version(&self) -> &str {
		match self.api_version().split_once('/') {
			Some((_, version)) => version,
			None => self.api_version(),
		}
	}

	pub fn kind(&self) -> &str {
		self.str_field("kind")
	}

	pub fn name(&self) -> &str {
		self.metadata_field("name")
	}

	/// Namespace, or an empty string when unset.
	pub fn namespace(&self) -> &str {
		self.metadata_field("namespace")
	}

	pub fn set_namespace(&mut self, namespace: impl Into<String>) {
		if let Some(metadata) = self
			.value
			.get_mut("metadata")
			.and_then(JsonValue::as_object_mut)
		{
			metadata.insert(
				"namespace".to_string(),
				JsonValue::String(namespace.into()),
			);
		}
	}

	/// Set the namespace to [`DEFAULT_NAMESPACE`] if it is empty.
	///
	/// Returns whether the resource was changed.
	pub fn default_namespace(&mut self) -> bool {
		if !self.namespace().is_empty() {
			return false;
		}
		self.set_namespace(DEFAULT_NAMESPACE);
		true
	}

	pub fn key(&self) -> ResourceKey {
		ResourceKey {
			group: self.group().to_string(),
			version: self.version().to_string(),
			kind: self.kind().to_string(),
			name: self.name().to_string(),
			namespace: self.namespace().to_string(),
		}
	}

	/// The whole document, including fields yamldiff doesn't interpret.
	pub fn as_value(&self) -> &JsonValue {
		&self.value
	}

	pub fn into_value(self) -> JsonValue {
		self.value
	}
}
