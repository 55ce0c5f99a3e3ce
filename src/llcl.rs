/*!
# Zopflicore: Length-Limited Code Lengths.

Computes Huffman code lengths constrained to a maximum bit length, via the
Katajainen/Moffat/Turpin boundary package-merge algorithm. Used by
[`crate::cost`] to build the litlen/length and distance trees it measures.
*/

use super::error::{zopfli_error, ZopfliError};



/// # Arena Node.
///
/// Either an original symbol ("leaf") or a package formed by merging two
/// earlier nodes. Indices refer back into the same arena.
enum Node {
	/// # Leaf.
	///
	/// Index into the sorted-by-weight leaves vector (not the original
	/// symbol index — that indirection is resolved once, at the end).
	Leaf(u32),

	/// # Package.
	Package(u32, u32),
}



#[must_use]
/// # Length-Limited Code Lengths.
///
/// Given per-symbol frequencies (zero for unused symbols) and a maximum
/// code length, returns a code length per symbol (`0` for unused symbols)
/// minimizing the total weighted length subject to the Kraft inequality and
/// the length cap.
///
/// # Errors
///
/// Returns an error if `max_bits` cannot represent the number of distinct
/// nonzero-weight symbols (`2^max_bits < symbols used`) — this should never
/// happen for this crate's fixed `(288, 15)`/`(32, 15)` call sites, but is
/// checked rather than assumed.
pub(crate) fn length_limited_code_lengths(counts: &[u32], max_bits: u8)
-> Result<Vec<u8>, ZopfliError> {
	let mut lengths = vec![0_u8; counts.len()];

	// Collect (weight, original index), dropping unused symbols, and sort
	// ascending by weight. Ties keep their relative input order (a stable
	// sort), which is all package-merge requires for determinism.
	let mut leaves: Vec<(u64, usize)> = counts.iter()
		.enumerate()
		.filter(|(_, &c)| c != 0)
		.map(|(i, &c)| (u64::from(c), i))
		.collect();
	leaves.sort_by_key(|&(w, _)| w);

	let m = leaves.len();
	if m == 0 { return Ok(lengths); }
	if m == 1 {
		lengths[leaves[0].1] = 1;
		return Ok(lengths);
	}

	if (max_bits as u32) < usize::BITS - (m - 1).leading_zeros() {
		// 2^max_bits < m: the length cap can't even enumerate this many
		// symbols.
		return Err(zopfli_error!());
	}

	let mut nodes: Vec<Node> = Vec::with_capacity(m * 2);
	let mut weight: Vec<u64> = Vec::with_capacity(m * 2);
	for (i, &(w, _)) in leaves.iter().enumerate() {
		nodes.push(Node::Leaf(i as u32));
		weight.push(w);
	}

	// `list` holds arena indices, always sorted ascending by `weight`.
	let mut list: Vec<u32> = (0..m as u32).collect();

	for _level in 1..max_bits {
		// Pair up consecutive elements of the previous level's list into
		// packages; an odd leftover element is dropped (it can't be
		// profitably paired at this level).
		let pair_count = list.len() / 2;
		let mut packages: Vec<u32> = Vec::with_capacity(pair_count);
		for i in 0..pair_count {
			let a = list[2 * i];
			let b = list[2 * i + 1];
			let w = weight[a as usize] + weight[b as usize];
			let idx = nodes.len() as u32;
			nodes.push(Node::Package(a, b));
			weight.push(w);
			packages.push(idx);
		}

		// Merge the (still-fresh) leaves with the new packages, both
		// already sorted ascending by weight.
		let mut merged = Vec::with_capacity(m + packages.len());
		let (mut li, mut pi) = (0_usize, 0_usize);
		while li < m && pi < packages.len() {
			if weight[li] <= weight[packages[pi] as usize] {
				merged.push(li as u32);
				li += 1;
			}
			else {
				merged.push(packages[pi]);
				pi += 1;
			}
		}
		merged.extend(li as u32..m as u32);
		merged.extend_from_slice(&packages[pi..]);
		list = merged;
	}

	// The final level's list must hold at least 2*(m-1) items to extract a
	// valid length assignment.
	let take = 2 * (m - 1);
	if list.len() < take { return Err(zopfli_error!()); }

	let mut tally = vec![0_u32; m];
	for &idx in &list[..take] {
		expand(&nodes, idx, &mut tally);
	}

	for (pos, &(_, orig_idx)) in leaves.iter().enumerate() {
		lengths[orig_idx] = tally[pos] as u8;
	}

	Ok(lengths)
}

/// # Expand a Node Into Leaf Tallies.
///
/// Walks a (possibly packaged) node down to its constituent leaves,
/// incrementing `tally[leaf_position]` once per occurrence. A leaf can be
/// counted multiple times across different chosen top-level nodes, which is
/// exactly how package-merge encodes "this symbol's code length is N".
fn expand(nodes: &[Node], idx: u32, tally: &mut [u32]) {
	match nodes[idx as usize] {
		Node::Leaf(pos) => tally[pos as usize] += 1,
		Node::Package(a, b) => {
			expand(nodes, a, tally);
			expand(nodes, b, tally);
		},
	}
}



/// # Length-Limited Code Lengths (Slice Extension).
///
/// Ergonomic call-site sugar: `counts.llcl()?` reads better than the free
/// function at its call sites.
pub(crate) trait LengthLimitedCodeLengths {
	/// # Compute Code Lengths.
	fn llcl(&self, max_bits: u8) -> Result<Vec<u8>, ZopfliError>;
}

impl LengthLimitedCodeLengths for [u32] {
	fn llcl(&self, max_bits: u8) -> Result<Vec<u8>, ZopfliError> {
		length_limited_code_lengths(self, max_bits)
	}
}



#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn t_single_symbol() {
		let counts = [0, 5, 0, 0];
		let lengths = counts.llcl(15).unwrap();
		assert_eq!(lengths, vec![0, 1, 0, 0]);
	}

	#[test]
	fn t_two_symbols_equal_weight() {
		let counts = [3, 3];
		let lengths = counts.llcl(15).unwrap();
		assert_eq!(lengths, vec![1, 1]);
	}

	#[test]
	fn t_kraft_inequality_holds() {
		// A skewed distribution across eight symbols.
		let counts = [100, 50, 25, 12, 6, 3, 2, 1];
		let lengths = counts.llcl(15).unwrap();
		assert_eq!(lengths.len(), counts.len());

		let kraft: f64 = lengths.iter()
			.filter(|&&l| l > 0)
			.map(|&l| 2.0_f64.powi(-i32::from(l)))
			.sum();
		assert!(kraft <= 1.0 + 1e-9, "Kraft inequality violated: {kraft}");

		// Every used symbol must get a positive length, capped at max_bits.
		for (count, length) in counts.iter().zip(&lengths) {
			assert_eq!(*count == 0, *length == 0);
			assert!(*length <= 15);
		}
	}

	#[test]
	fn t_respects_max_bits_cap() {
		// Sixteen symbols forced into a 4-bit cap: a balanced tree is the
		// only way to fit, so every used symbol should land at exactly 4
		// bits.
		let counts = [1_u32; 16];
		let lengths = counts.llcl(4).unwrap();
		assert!(lengths.iter().all(|&l| l == 4));
	}

	#[test]
	fn t_max_bits_too_small_errors() {
		let counts = [1_u32; 16];
		assert!(counts.llcl(3).is_err());
	}
}
