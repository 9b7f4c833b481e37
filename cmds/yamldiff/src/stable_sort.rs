//! Block insertion sort followed by SymMerge passes.
//!
//! The comparison receives the whole slice and two positions instead of two
//! elements, so it may depend on where elements currently sit. For a strict
//! weak order this is an ordinary stable sort. For any other comparison the
//! result follows from this exact sequence of comparisons and moves, the same
//! sequence Go's `sort.SliceStable` performs.

const INSERTION_BLOCK: usize = 20;

/// Sort `data` in place with `less(data, i, j)` deciding whether the element at
/// `i` goes before the element at `j`.
pub fn slice_stable<T, F>(data: &mut [T], less: F)
where
	F: Fn(&[T], usize, usize) -> bool,
{
	let n = data.len();

	let mut block = INSERTION_BLOCK;
	let (mut a, mut b) = (0, block);
	while b <= n {
		insertion_sort(data, &less, a, b);
		a = b;
		b += block;
	}
	insertion_sort(data, &less, a, n);

	while block < n {
		let (mut a, mut b) = (0, 2 * block);
		while b <= n {
			sym_merge(data, &less, a, a + block, b);
			a = b;
			b += 2 * block;
		}
		let m = a + block;
		if m < n {
			sym_merge(data, &less, a, m, n);
		}
		block *= 2;
	}
}

fn insertion_sort<T, F>(data: &mut [T], less: &F, a: usize, b: usize)
where
	F: Fn(&[T], usize, usize) -> bool,
{
	for i in a + 1..b {
		let mut j = i;
		while j > a && less(data, j, j - 1) {
			data.swap(j, j - 1);
			j -= 1;
		}
	}
}

/// Merge the sorted runs `data[a..m]` and `data[m..b]`.
///
/// Requires `a < m < b`.
fn sym_merge<T, F>(data: &mut [T], less: &F, a: usize, m: usize, b: usize)
where
	F: Fn(&[T], usize, usize) -> bool,
{
	// Single element on the left: binary search its slot in the right run
	if m - a == 1 {
		let (mut i, mut j) = (m, b);
		while i < j {
			let h = (i + j) / 2;
			if less(data, h, a) {
				i = h + 1;
			} else {
				j = h;
			}
		}
		data[a..i].rotate_left(1);
		return;
	}

	// Single element on the right
	if b - m == 1 {
		let (mut i, mut j) = (a, m);
		while i < j {
			let h = (i + j) / 2;
			if less(data, m, h) {
				j = h;
			} else {
				i = h + 1;
			}
		}
		data[i..=m].rotate_right(1);
		return;
	}

	let mid = (a + b) / 2;
	let n = mid + m;
	let (mut start, mut r) = if m > mid { (n - b, mid) } else { (a, m) };
	let p = n - 1;

	while start < r {
		let c = (start + r) / 2;
		if less(data, p - c, c) {
			r = c;
		} else {
			start = c + 1;
		}
	}

	let end = n - start;
	if start < m && m < end {
		data[start..end].rotate_left(m - start);
	}
	if a < start && start < mid {
		sym_merge(data, less, a, start, mid);
	}
	if mid < end && end < b {
		sym_merge(data, less, mid, end, b);
	}
}
