//! Aligning the document order of one bundle with another.
//!
//! Resources of the second bundle whose identity also appears in the first are
//! rearranged into the first bundle's order. Resources unknown to the first
//! bundle keep their place relative to their neighbours.

use std::{collections::HashMap, hash::Hash};

use k8s::{Resource, ResourceKey};
use tracing::{debug, instrument};

use crate::stable_sort::slice_stable;

/// Position of each identity in a reference sequence.
///
/// When an identity occurs more than once, its last position is kept.
#[derive(Debug)]
pub struct PositionIndex<K> {
	positions: HashMap<K, usize>,
}

impl<K: Hash + Eq> PositionIndex<K> {
	pub fn new(keys: impl IntoIterator<Item = K>) -> Self {
		let mut positions = HashMap::new();
		for (idx, key) in keys.into_iter().enumerate() {
			positions.insert(key, idx);
		}
		Self { positions }
	}

	pub fn get(&self, key: &K) -> Option<usize> {
		self.positions.get(key).copied()
	}

	pub fn len(&self) -> usize {
		self.positions.len()
	}

	pub fn is_empty(&self) -> bool {
		self.positions.is_empty()
	}
}

impl PositionIndex<ResourceKey> {
	pub fn from_resources(resources: &[Resource]) -> Self {
		Self::new(resources.iter().map(Resource::key))
	}
}

/// Reorder `items` so the ones found in `index` follow its order.
///
/// Two items that both have a position are compared by position. Any other pair
/// is compared by where the two items currently sit. An item without a position
/// therefore never moves on its own, and positioned items only cross it in the
/// merge passes over bundles longer than one insertion block. The result is
/// always a permutation of `items` and only depends on the input.
pub fn align<T, K, F>(items: Vec<T>, index: &PositionIndex<K>, key_of: F) -> Vec<T>
where
	K: Hash + Eq,
	F: Fn(&T) -> K,
{
	let mut keyed: Vec<(Option<usize>, T)> = items
		.into_iter()
		.map(|item| (index.get(&key_of(&item)), item))
		.collect();

	slice_stable(&mut keyed, |data, i, j| match (data[i].0, data[j].0) {
		(Some(a), Some(b)) => a < b,
		_ => i < j,
	});

	keyed.into_iter().map(|(_, item)| item).collect()
}

/// Reorder `to` so resources shared with `from` appear in `from`'s order.
#[instrument(skip_all, fields(from = from.len(), to = to.len()))]
pub fn reorder_resources(from: &[Resource], to: Vec<Resource>) -> Vec<Resource> {
	let index = PositionIndex::from_resources(from);
	for resource in &to {
		let key = resource.key();
		match index.get(&key) {
			Some(position) => debug!(%key, position, "matched"),
			None => debug!(%key, "unmatched"),
		}
	}
	align(to, &index, Resource::key)
}
