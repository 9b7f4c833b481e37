//! YAML output matching what Go tooling (`sigs.k8s.io/yaml`) writes.
//!
//! `sigs.k8s.io/yaml` round-trips objects through `map[interface{}]interface{}`,
//! so go-yaml v2 emits every mapping with its keys sorted. Reproducing that order
//! keeps normalized files comparable with manifests rendered by kubectl or Tanka.

use std::cmp::Ordering;

use serde_json::{Map, Value as JsonValue};
use tracing::instrument;

/// Recursively sort mapping keys with [`go_yaml_key_cmp`].
pub fn sort_keys(value: &JsonValue) -> JsonValue {
	match value {
		JsonValue::Object(map) => {
			let mut keys: Vec<&String> = map.keys().collect();
			keys.sort_by(|a, b| go_yaml_key_cmp(a, b));
			let sorted: Map<String, JsonValue> = keys
				.into_iter()
				.map(|k| (k.clone(), sort_keys(&map[k])))
				.collect();
			JsonValue::Object(sorted)
		}
		JsonValue::Array(items) => JsonValue::Array(items.iter().map(sort_keys).collect()),
		other => other.clone(),
	}
}

/// Accumulate the run of ASCII digits starting at `start` onto `init`,
/// returning the value and the end of the run.
fn digit_run(chars: &[char], start: usize, init: i64) -> (i64, usize) {
	let end = chars[start..]
		.iter()
		.position(|c| !c.is_ascii_digit())
		.map_or(chars.len(), |n| start + n);
	let value = chars[start..end].iter().fold(init, |acc, c| {
		acc.saturating_mul(10)
			.saturating_add(i64::from(*c as u8 - b'0'))
	});
	(value, end)
}

/// go-yaml v2 string key order (`keyList.Less`).
///
/// A natural sort: at the first differing character, two letters compare by code
/// point, a non-letter sorts before a letter, and digit runs compare by numeric
/// value, then by length.
pub fn go_yaml_key_cmp(a: &str, b: &str) -> Ordering {
	let ar: Vec<char> = a.chars().collect();
	let br: Vec<char> = b.chars().collect();

	let Some(i) = ar.iter().zip(&br).position(|(x, y)| x != y) else {
		return ar.len().cmp(&br.len());
	};

	match (ar[i].is_alphabetic(), br[i].is_alphabetic()) {
		(true, true) => return ar[i].cmp(&br[i]),
		(true, false) => return Ordering::Greater,
		(false, true) => return Ordering::Less,
		(false, false) => {}
	}

	// A zero that continues a number with a significant prefix must not compare
	// as a leading zero.
	let mut bias = 0;
	if ar[i] == '0' || br[i] == '0' {
		let prefix = &ar[..i];
		let significant = prefix
			.iter()
			.rev()
			.take_while(|c| c.is_ascii_digit())
			.any(|c| *c != '0');
		if significant {
			bias = 1;
		}
	}

	let (an, a_end) = digit_run(&ar, i, bias);
	let (bn, b_end) = digit_run(&br, i, bias);

	an.cmp(&bn)
		.then(a_end.cmp(&b_end))
		.then(ar[i].cmp(&br[i]))
}

/// Serialize a document the way go-yaml v2 would.
#[instrument(skip_all)]
pub fn to_yaml(value: &JsonValue) -> Result<String, serde_saphyr::ser_error::Error> {
	let sorted = sort_keys(value);

	let options = serde_saphyr::SerializerOptions {
		indent_step: 2,
		indent_array: Some(0),
		prefer_block_scalars: true,
		empty_map_as_braces: true,
		empty_array_as_brackets: true,
		line_width: Some(80),
		scientific_notation_threshold: Some(1_000_000),
		scientific_notation_small_threshold: Some(0.0001),
		quote_ambiguous_keys: true,
		quote_numeric_strings: true,
		..Default::default()
	};

	let mut output = String::new();
	serde_saphyr::to_fmt_writer_with_options(&mut output, &sorted, options)?;
	if !output.ends_with('\n') {
		output.push('\n');
	}
	Ok(output)
}

#[cfg(test)]
mod tests {
	use rstest::rstest;
	use serde_json::json;

	use super::*;

	#[rstest]
	#[case::letters("apiVersion", "kind", Ordering::Less)]
	#[case::case_sensitive("Kind", "kind", Ordering::Less)]
	#[case::prefix("name", "namespace", Ordering::Less)]
	#[case::equal("spec", "spec", Ordering::Equal)]
	#[case::numeric("item2", "item10", Ordering::Less)]
	#[case::numeric_reverse("item10", "item2", Ordering::Greater)]
	#[case::punctuation_first("a_b", "ab", Ordering::Less)]
	#[case::digit_before_letter("a1", "ab", Ordering::Less)]
	#[case::leading_zero_longer("a01", "a1", Ordering::Greater)]
	fn test_go_yaml_key_cmp(#[case] a: &str, #[case] b: &str, #[case] expected: Ordering) {
		assert_eq!(go_yaml_key_cmp(a, b), expected);
	}

	#[test]
	fn test_sort_keys_is_recursive() {
		let value = json!({
			"metadata": { "namespace": "default", "name": "x" },
			"kind": "ConfigMap",
			"apiVersion": "v1",
			"data": [{ "z": 1, "a": 2 }]
		});

		let sorted = sort_keys(&value);
		let keys: Vec<_> = sorted.as_object().unwrap().keys().cloned().collect();
		assert_eq!(keys, ["apiVersion", "data", "kind", "metadata"]);

		let metadata: Vec<_> = sorted["metadata"].as_object().unwrap().keys().cloned().collect();
		assert_eq!(metadata, ["name", "namespace"]);

		let item: Vec<_> = sorted["data"][0].as_object().unwrap().keys().cloned().collect();
		assert_eq!(item, ["a", "z"]);
	}

	#[test]
	fn test_to_yaml_sorts_keys() {
		let value = json!({
			"kind": "ConfigMap",
			"apiVersion": "v1",
			"metadata": { "name": "settings" }
		});

		let yaml = to_yaml(&value).unwrap();
		let api_version = yaml.find("apiVersion").unwrap();
		let kind = yaml.find("kind").unwrap();
		let metadata = yaml.find("metadata").unwrap();
		assert!(api_version < kind && kind < metadata, "unexpected order:\n{yaml}");
		assert!(yaml.ends_with('\n'));
	}

	#[test]
	fn test_to_yaml_quotes_ambiguous_strings() {
		let value = json!({ "data": { "mode": "0755", "enabled": "true" } });
		let yaml = to_yaml(&value).unwrap();

		let reparsed: JsonValue = serde_saphyr::from_str(&yaml).unwrap();
		assert_eq!(reparsed, value);
	}
}
