//! Text diffing for normalized manifest files.

mod output;

pub use output::{DiffOutput, OutputError};
use similar::TextDiff;

/// Context lines around each hunk, matching `diff -u`.
pub const DEFAULT_CONTEXT_RADIUS: usize = 3;

/// Compute a unified diff between two texts.
///
/// Returns an empty string if the texts are equal; headers are only emitted
/// together with the first hunk.
pub fn unified_diff(
	old: &str,
	new: &str,
	old_header: &str,
	new_header: &str,
	context_radius: usize,
) -> String {
	TextDiff::from_lines(old, new)
		.unified_diff()
		.context_radius(context_radius)
		.header(old_header, new_header)
		.to_string()
}

#[cfg(test)]
mod tests {
	use indoc::indoc;

	use super::*;

	const OLD: &str = indoc! {"
		apiVersion: v1
		kind: ConfigMap
		metadata:
		  name: settings
		  namespace: default
		data:
		  level: info
	"};

	const NEW: &str = indoc! {"
		apiVersion: v1
		kind: ConfigMap
		metadata:
		  name: settings
		  namespace: default
		data:
		  level: debug
	"};

	#[test]
	fn test_equal_texts_produce_no_diff() {
		assert_eq!(unified_diff(OLD, OLD, "a/x", "b/x", 3), "");
	}

	#[test]
	fn test_unified_diff_parses_as_patch() {
		let diff = unified_diff(OLD, NEW, "a/from.yaml", "b/to.yaml", DEFAULT_CONTEXT_RADIUS);
		let patch = patch::Patch::from_single(&diff).unwrap();

		assert_eq!(patch.old.path, "a/from.yaml");
		assert_eq!(patch.new.path, "b/to.yaml");
		assert_eq!(patch.hunks.len(), 1);

		let removed: Vec<_> = patch.hunks[0]
			.lines
			.iter()
			.filter_map(|line| match line {
				patch::Line::Remove(text) => Some(*text),
				_ => None,
			})
			.collect();
		assert_eq!(removed, ["  level: info"]);
	}

	#[test]
	fn test_context_radius() {
		let diff = unified_diff(OLD, NEW, "a", "b", 0);
		let patch = patch::Patch::from_single(&diff).unwrap();
		let context = patch.hunks[0]
			.lines
			.iter()
			.filter(|line| matches!(line, patch::Line::Context(_)))
			.count();
		assert_eq!(context, 0);
	}
}
