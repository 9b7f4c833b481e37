//! Multi-document manifest parsing.

use serde_json::Value as JsonValue;
use thiserror::Error;
use tracing::{instrument, trace};

use crate::resource::{Resource, ResourceError};

/// Errors raised while splitting a manifest stream into resources.
///
/// Document numbers are 1-based and count every YAML document in the stream,
/// including empty ones.
#[derive(Debug, Error)]
pub enum ParseError {
	#[error("manifest is not valid UTF-8")]
	Utf8(#[source] std::str::Utf8Error),

	#[error("parsing YAML: {0}")]
	Yaml(String),

	#[error("invalid document #{document}")]
	Document {
		document: usize,
		#[source]
		source: ResourceError,
	},

	#[error("invalid item #{item} of list in document #{document}")]
	ListItem {
		document: usize,
		item: usize,
		#[source]
		source: ResourceError,
	},
}

/// `kind: List` style wrappers (`List`, `ConfigMapList`, ...) with an `items` array.
fn list_items(value: &mut JsonValue) -> Option<Vec<JsonValue>> {
	let obj = value.as_object_mut()?;
	let is_list = obj
		.get("kind")
		.and_then(JsonValue::as_str)
		.is_some_and(|kind| kind.ends_with("List"));
	if !is_list {
		return None;
	}
	match obj.get_mut("items")? {
		JsonValue::Array(items) => Some(std::mem::take(items)),
		_ => None,
	}
}

fn parse_documents(data: &[u8]) -> Result<Vec<JsonValue>, ParseError> {
	let text = std::str::from_utf8(data).map_err(ParseError::Utf8)?;
	if text.trim().is_empty() {
		return Ok(Vec::new());
	}

	// Manifests are usually produced by go-yaml, which reads YAML 1.1:
	// 0755 is an octal integer there.
	let options = serde_saphyr::Options {
		legacy_octal_numbers: true,
		budget: None,
		..Default::default()
	};
	serde_saphyr::from_multiple_with_options(text, options)
		.map_err(|e| ParseError::Yaml(e.to_string()))
}

/// Parse every resource in `data` and hand them to `f` in document order.
///
/// Empty documents are skipped, list wrappers are replaced by their items.
/// The first error, either from parsing or from `f`, stops processing.
#[instrument(skip_all, fields(bytes = data.len()))]
pub fn process_resources<F, E>(data: &[u8], mut f: F) -> Result<(), E>
where
	F: FnMut(Resource) -> Result<(), E>,
	E: From<ParseError>,
{
	for (idx, mut value) in parse_documents(data)?.into_iter().enumerate() {
		let document = idx + 1;
		if value.is_null() {
			trace!(document, "skipping empty document");
			continue;
		}

		if let Some(items) = list_items(&mut value) {
			trace!(document, items = items.len(), "expanding list");
			for (item, value) in items.into_iter().enumerate() {
				let resource = Resource::from_value(value).map_err(|source| {
					ParseError::ListItem {
						document,
						item,
						source,
					}
				})?;
				f(resource)?;
			}
			continue;
		}

		let resource = Resource::from_value(value)
			.map_err(|source| ParseError::Document { document, source })?;
		f(resource)?;
	}
	Ok(())
}

/// Collect all resources in `data`, with empty namespaces defaulted.
pub fn list_resources(data: &[u8]) -> Result<Vec<Resource>, ParseError> {
	let mut resources = Vec::new();
	process_resources(data, |mut resource| {
		resource.default_namespace();
		resources.push(resource);
		Ok::<_, ParseError>(())
	})?;
	Ok(resources)
}

#[cfg(test)]
mod tests {
	use assert_matches::assert_matches;
	use indoc::indoc;

	use super::*;

	fn names(resources: &[Resource]) -> Vec<&str> {
		resources.iter().map(Resource::name).collect()
	}

	#[test]
	fn test_list_resources_in_document_order() {
		let data = indoc! {"
			apiVersion: v1
			kind: ConfigMap
			metadata:
			  name: first
			  namespace: kube-system
			data:
			  mode: '0755'
			---
			apiVersion: apps/v1
			kind: Deployment
			metadata:
			  name: second
			spec:
			  replicas: 3
		"};

		let resources = list_resources(data.as_bytes()).unwrap();
		assert_eq!(names(&resources), ["first", "second"]);
		assert_eq!(resources[0].namespace(), "kube-system");
		assert_eq!(resources[0].as_value()["data"]["mode"], "0755");
		assert_eq!(resources[1].namespace(), "default");
		assert_eq!(resources[1].group(), "apps");
		assert_eq!(resources[1].as_value()["spec"]["replicas"], 3);
	}

	#[test]
	fn test_empty_documents_are_skipped() {
		let data = indoc! {"
			---
			apiVersion: v1
			kind: Secret
			metadata:
			  name: creds
			---
			---
		"};

		let resources = list_resources(data.as_bytes()).unwrap();
		assert_eq!(names(&resources), ["creds"]);
	}

	#[test]
	fn test_empty_input() {
		assert!(list_resources(b"").unwrap().is_empty());
		assert!(list_resources(b"\n  \n").unwrap().is_empty());
	}

	#[test]
	fn test_list_is_expanded() {
		let data = indoc! {"
			apiVersion: v1
			kind: List
			items:
			- apiVersion: v1
			  kind: ServiceAccount
			  metadata:
			    name: a
			- apiVersion: v1
			  kind: ServiceAccount
			  metadata:
			    name: b
			---
			apiVersion: v1
			kind: ServiceAccount
			metadata:
			  name: c
		"};

		let resources = list_resources(data.as_bytes()).unwrap();
		assert_eq!(names(&resources), ["a", "b", "c"]);
		assert!(resources.iter().all(|r| r.namespace() == "default"));
	}

	#[test]
	fn test_invalid_list_item() {
		let data = indoc! {"
			apiVersion: v1
			kind: ConfigMapList
			items:
			- apiVersion: v1
			  kind: ConfigMap
			  metadata:
			    name: ok
			- apiVersion: v1
			  kind: ConfigMap
		"};

		assert_matches!(
			list_resources(data.as_bytes()),
			Err(ParseError::ListItem {
				document: 1,
				item: 1,
				source: ResourceError::MissingName { .. }
			})
		);
	}

	#[test]
	fn test_missing_name_names_document() {
		let data = indoc! {"
			apiVersion: v1
			kind: Namespace
			metadata:
			  name: ok
			---
			apiVersion: v1
			kind: Namespace
			metadata: {}
		"};

		let err = list_resources(data.as_bytes()).unwrap_err();
		assert_matches!(
			err,
			ParseError::Document {
				document: 2,
				source: ResourceError::MissingName { .. }
			}
		);
		assert_eq!(err.to_string(), "invalid document #2");
	}

	#[test]
	fn test_scalar_document_is_rejected() {
		let data = "just a string\n";
		assert_matches!(
			list_resources(data.as_bytes()),
			Err(ParseError::Document {
				document: 1,
				source: ResourceError::NotAnObject
			})
		);
	}

	#[test]
	fn test_malformed_yaml() {
		let data = "apiVersion: v1\nkind: [unclosed\n";
		assert_matches!(list_resources(data.as_bytes()), Err(ParseError::Yaml(_)));
	}

	#[test]
	fn test_invalid_utf8() {
		assert_matches!(list_resources(&[0xff, 0xfe, 0x00]), Err(ParseError::Utf8(_)));
	}

	#[test]
	fn test_callback_error_stops_processing() {
		#[derive(Debug)]
		enum StopError {
			Parse,
			Stop,
		}
		impl From<ParseError> for StopError {
			fn from(_: ParseError) -> Self {
				StopError::Parse
			}
		}

		let data = indoc! {"
			apiVersion: v1
			kind: Pod
			metadata:
			  name: one
			---
			apiVersion: v1
			kind: Pod
			metadata:
			  name: two
		"};

		let mut seen = Vec::new();
		let result = process_resources(data.as_bytes(), |resource| {
			seen.push(resource.name().to_string());
			Err(StopError::Stop)
		});
		assert_matches!(result, Err(StopError::Stop));
		assert_eq!(seen, ["one"]);
	}

	#[test]
	fn test_process_resources_does_not_default_namespace() {
		let data = "apiVersion: v1\nkind: Pod\nmetadata:\n  name: one\n";
		let mut namespaces = Vec::new();
		process_resources(data.as_bytes(), |resource| {
			namespaces.push(resource.namespace().to_string());
			Ok::<_, ParseError>(())
		})
		.unwrap();
		assert_eq!(namespaces, [""]);
	}
}
