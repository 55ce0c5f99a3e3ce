/*!
# Zopflicore: Dynamic Huffman Block Cost Estimator.

`estimate_block_cost` computes the exact dynamic-Huffman bit cost of encoding
a range of an [`LZ77Store`](crate::lz77::LZ77Store) as one DEFLATE block —
tree header plus symbol data — which is the cost model the block splitter
searches against.

Only the dynamic-Huffman cost is computed here; choosing between a dynamic,
fixed, or stored block for actual bitstream emission is somebody else's
problem.
*/

use super::error::ZopfliError;
use super::llcl::LengthLimitedCodeLengths;
use super::lz77::LZ77Store;
use super::options::ZOPFLI_NUM_D;
use super::symbols::DISTANCE_BITS;

/// # Length Symbol Extra Bits (by Symbol, `257..=285`).
///
/// Indexed by `symbol - 257`, which is what summing bits over a
/// length-symbol histogram actually needs.
const LENGTH_EXTRA_BITS: [u32; 29] = [
	0, 0, 0, 0, 0, 0, 0, 0, 1, 1, 1, 1, 2, 2, 2, 2,
	3, 3, 3, 3, 4, 4, 4, 4, 5, 5, 5, 5, 0,
];

/// # Fourteen, as the Minimum Tree Header Cost.
///
/// Every dynamic block's tree header costs at least 14 bits (`HLIT`/`HDIST`/
/// `HCLEN` alone), even before accounting for the code-length alphabet
/// itself.
const MIN_TREE_SIZE: u32 = 14;

/// # RFC 1951 Bit-Length Order.
///
/// The jumbled order code-length symbols are transmitted in: `TREE[hclen+4]`
/// names the last symbol actually transmitted for a given `hclen`.
const TREE_ORDER: [u8; 19] =
	[16, 17, 18, 0, 8, 7, 9, 6, 10, 5, 11, 4, 12, 3, 13, 2, 14, 1, 15];



#[must_use]
/// # Estimate Dynamic Block Cost (in Bits).
///
/// Returns the number of bits a dynamic-Huffman DEFLATE block spanning
/// `[lstart, lend)` of `store` would cost to encode: the tree header plus
/// the literal/length/distance symbol data (including extra bits), not
/// counting the 3-bit block-type header itself.
///
/// Internally tries both the raw symbol histogram and an RLE-smoothed
/// variant (`optimize_huffman_for_rle`), keeping whichever yields the
/// smaller total — smoothing sometimes costs a little in data bits but more
/// than makes it up in a cheaper tree.
pub(crate) fn estimate_block_cost(store: &LZ77Store, lstart: usize, lend: usize)
-> Result<u32, ZopfliError> {
	let (mut ll_counts, d_counts) = store.histogram(lstart, lend)?;
	ll_counts[256] = 1;

	let ll_lengths = ll_counts.llcl(15)?;
	let d_lengths = d_llcl(&d_counts)?;

	let treesize = best_tree_size(&ll_lengths, &d_lengths)?;
	let datasize = data_size(&ll_counts, &d_counts, &ll_lengths, &d_lengths);
	let sum = treesize + datasize;

	let mut ll_counts2 = ll_counts;
	optimize_huffman_for_rle(&mut ll_counts2);
	let mut d_counts2 = d_counts;
	optimize_huffman_for_rle(&mut d_counts2);

	let ll_lengths2 = ll_counts2.llcl(15)?;
	let d_lengths2 = d_llcl(&d_counts2)?;

	if ll_lengths2 != ll_lengths || d_lengths2 != d_lengths {
		let treesize2 = best_tree_size(&ll_lengths2, &d_lengths2)?;
		// This uses the *original* counts; only the code lengths changed.
		let datasize2 = data_size(&ll_counts, &d_counts, &ll_lengths2, &d_lengths2);
		let sum2 = treesize2 + datasize2;
		if sum2 < sum { return Ok(sum2); }
	}

	Ok(sum)
}

/// # Distance Code Lengths (Buggy-Decoder Patched).
///
/// Computes length-limited code lengths for the distance alphabet, then
/// patches the result to guarantee at least two non-zero entries — working
/// around a zlib 1.2.1 decoder bug that chokes on fewer.
fn d_llcl(d_counts: &[u32; ZOPFLI_NUM_D]) -> Result<Vec<u8>, ZopfliError> {
	let mut d_lengths = d_counts.llcl(15)?;

	let mut one: Option<bool> = None;
	for (i, &dist) in d_lengths.iter().enumerate().take(30) {
		if dist != 0 {
			if one.replace(i == 0).is_some() { return Ok(d_lengths); }
		}
	}

	match one {
		Some(true) => { d_lengths[1] = 1; },
		Some(false) => { d_lengths[0] = 1; },
		None => {
			d_lengths[0] = 1;
			d_lengths[1] = 1;
		},
	}

	Ok(d_lengths)
}

/// # Data Size (in Bits).
///
/// Sums the literal/length/distance symbol bit costs (code length plus any
/// extra bits) over the given histograms, plus the fixed cost of the
/// end-of-block symbol.
fn data_size(
	ll_counts: &[u32; super::options::ZOPFLI_NUM_LL],
	d_counts: &[u32; ZOPFLI_NUM_D],
	ll_lengths: &[u8],
	d_lengths: &[u8],
) -> u32 {
	let mut result = u32::from(ll_lengths[256]);

	for (&ll, &lc) in ll_lengths.iter().zip(ll_counts).take(256) {
		result += u32::from(ll) * lc;
	}

	for (i, lbit) in (257..257 + LENGTH_EXTRA_BITS.len()).zip(LENGTH_EXTRA_BITS) {
		result += (u32::from(ll_lengths[i]) + lbit) * ll_counts[i];
	}

	for (i, &dbit) in DISTANCE_BITS.iter().enumerate().take(30) {
		result += (u32::from(d_lengths[i]) + u32::from(dbit)) * d_counts[i];
	}

	result
}

/// # Best Tree Size (in Bits).
///
/// The code-length alphabet used to transmit the literal/length/distance
/// trees themselves has three optional RLE escape symbols (`16`/`17`/`18`);
/// whether to use each is an independent choice, giving eight combinations.
/// This tries all eight and returns the smallest resulting tree-header size.
fn best_tree_size(ll_lengths: &[u8], d_lengths: &[u8]) -> Result<u32, ZopfliError> {
	let all = tree_symbols(ll_lengths, d_lengths);

	let mut best_size = u32::MAX;
	for extra in 0_u8..8 {
		let cl_counts = tree_counts(&all, extra);
		let cl_lengths = cl_counts.llcl(7)?;
		let hclen = tree_hclen(&cl_counts);

		let mut size = (u32::from(hclen) + 4) * 3;
		for (&a, &b) in cl_lengths.iter().zip(&cl_counts) { size += u32::from(a) * b; }
		size += cl_counts[16] * 2;
		size += cl_counts[17] * 3;
		size += cl_counts[18] * 7;
		size += MIN_TREE_SIZE;

		if size < best_size { best_size = size; }
	}

	Ok(best_size)
}

/// # Merge Tree Symbols.
///
/// Drops the trailing run of zero code lengths from the literal/length and
/// distance alphabets (keeping at least the 257 mandatory literal/length
/// symbols and 1 mandatory distance symbol), then concatenates them into a
/// single sequence for code-length-alphabet RLE analysis.
///
fn tree_symbols(ll_lengths: &[u8], d_lengths: &[u8]) -> Vec<u8> {
	let hlit = ll_lengths[256..286].iter().rposition(|&b| b != 0).unwrap_or(0);
	let hdist = d_lengths[..30].iter().rposition(|&b| b != 0).unwrap_or(0);

	let ll_len = 257 + hlit;
	let d_len = 1 + hdist;

	let mut all = Vec::with_capacity(ll_len + d_len);
	all.extend_from_slice(&ll_lengths[..ll_len]);
	all.extend_from_slice(&d_lengths[..d_len]);
	all
}

/// # Tally Code-Length-Alphabet Symbol Counts.
///
/// Walks the merged code-length sequence, applying the RLE escape symbols
/// (`16` repeats the previous length 3-6 times, `17`/`18` repeat a zero
/// length 3-10/11-138 times) named by `extra`'s low three bits, and tallies
/// the resulting 19-symbol histogram.
fn tree_counts(all: &[u8], extra: u8) -> [u32; 19] {
	let (use_16, use_17, use_18) = (extra & 1 != 0, extra & 2 != 0, extra & 4 != 0);
	let mut cl_counts = [0_u32; 19];

	let mut i = 0;
	while i < all.len() {
		let mut count: u32 = 1;
		let symbol = all[i];

		let symbol_zero = symbol == 0;
		if use_16 || ((use_17 || use_18) && symbol_zero) {
			let mut j = i + 1;
			while j < all.len() && symbol == all[j] {
				count += 1;
				j += 1;
				i += 1;
			}

			if symbol_zero {
				if use_18 {
					while count >= 11 {
						let count2 = count.min(138);
						cl_counts[18] += 1;
						count -= count2;
					}
				}
				if use_17 {
					while count >= 3 {
						let count2 = count.min(10);
						cl_counts[17] += 1;
						count -= count2;
					}
				}
			}

			if use_16 && count >= 4 {
				count -= 1;
				cl_counts[symbol as usize] += 1;

				while count >= 3 {
					let count2 = count.min(6);
					cl_counts[16] += 1;
					count -= count2;
				}
			}
		}

		cl_counts[symbol as usize] += count;
		i += 1;
	}

	cl_counts
}

/// # Last Non-Zero, Non-Special Count.
///
/// Walks the code-length counts in the jumbled RFC 1951 tree order,
/// returning the index of the last nonzero entry (the extended RLE symbols
/// `16..=18` are excluded). This is `hclen` — the number of code-length
/// entries actually transmitted, minus four.
const fn tree_hclen(cl_counts: &[u32; 19]) -> u8 {
	let mut hclen: usize = 15;
	while cl_counts[TREE_ORDER[hclen + 3] as usize] == 0 {
		if hclen == 0 { break; }
		hclen -= 1;
	}
	hclen as u8
}

/// # RLE-Optimized Stretches.
///
/// Yields `true` for each entry of the source slice lying in a sequence of
/// 5+ zeroes or 7+ identical nonzero values deemed "good" for RLE coding,
/// `false` otherwise.
fn good_for_rle(counts: &[u32]) -> Vec<bool> {
	let mut out = vec![false; counts.len()];
	let mut i = 0;
	while i < counts.len() {
		let scratch = counts[i];
		let mut j = i + 1;
		while j < counts.len() && counts[j] == scratch { j += 1; }
		let stride = j - i;
		let good = stride >= 5 && (scratch == 0 || stride >= 7);
		if good { for slot in &mut out[i..j] { *slot = true; } }
		i = j;
	}
	out
}

#[allow(clippy::integer_division)]
/// # Optimize Huffman Counts for RLE Compression.
///
/// Smooths runs of similar nonzero counts toward their rounded average so
/// the code-length alphabet's RLE escape symbols (`16`/`17`/`18`) can
/// collapse more of the tree header, at a small (and often net-negative)
/// cost to the data section. [`estimate_block_cost`] tries both the raw and
/// smoothed histograms and keeps whichever is actually cheaper.
fn optimize_huffman_for_rle(counts: &mut [u32]) {
	let trimmed_len = counts.iter().rposition(|&c| c != 0).map_or(0, |p| p + 1);
	let counts = &mut counts[..trimmed_len];
	if counts.is_empty() { return; }

	let good = good_for_rle(counts);

	let mut stride: usize = 0;
	let mut sum: u32 = 0;
	let mut scratch: u32 = counts[0];

	for i in 0..counts.len() {
		let count = counts[i];
		if good[i] || count.abs_diff(scratch) >= 4 {
			if sum != 0 && stride >= 4 {
				let v = ((sum + stride as u32 / 2) / stride as u32).max(1);
				for c in &mut counts[i - stride..i] { *c = v; }
			}

			stride = 0;
			sum = 0;

			scratch = counts.get(i..i + 4).map_or(
				count,
				|c| c.iter().copied().fold(2, |a, c| a + c) / 4,
			);
		}

		stride += 1;
		sum += count;
	}

	if sum != 0 && stride >= 4 {
		let v = ((sum + stride as u32 / 2) / stride as u32).max(1);
		let len = counts.len();
		for c in &mut counts[len - stride..] { *c = v; }
	}
}



#[cfg(test)]
mod test {
	use super::*;
	use crate::cache::MatchCache;
	use crate::hash::ZopfliHash;
	use crate::lz77::lz77_greedy;

	fn store_for(data: &[u8]) -> LZ77Store {
		let mut hash = ZopfliHash::new();
		let mut lmc = MatchCache::new();
		let mut store = LZ77Store::new();
		lz77_greedy(&mut hash, &mut lmc, data, 0, data.len(), &mut store, None).unwrap();
		store
	}

	#[test]
	fn t_empty_store_has_minimal_cost() {
		let store = store_for(b"");
		let cost = estimate_block_cost(&store, 0, 0).unwrap();
		// Just the tree header for a single (end-of-block) symbol plus the
		// buggy-decoder distance padding; no data bits since nothing is
		// emitted.
		assert!(cost > 0 && cost < 500, "cost was {cost}");
	}

	#[test]
	fn t_repetitive_data_is_cheap() {
		let store = store_for(&vec![0x41_u8; 5000]);
		let cost = estimate_block_cost(&store, 0, store.len()).unwrap();
		// 5000 literal bytes would cost 40,000 bits raw; a highly repetitive
		// stream should compress to a tiny fraction of that.
		assert!(cost < 2000, "cost was {cost}");
	}

	#[test]
	fn t_more_data_does_not_reduce_cost() {
		let small = store_for(b"hello world, hello world, hello world!");
		let big = store_for(
			"hello world, hello world, hello world! ".repeat(20).as_bytes(),
		);
		let small_cost = estimate_block_cost(&small, 0, small.len()).unwrap();
		let big_cost = estimate_block_cost(&big, 0, big.len()).unwrap();
		assert!(big_cost > small_cost);
	}

	#[test]
	fn t_good_for_rle_flags_long_runs() {
		let counts = [5_u32, 5, 5, 5, 5, 5, 1, 2, 3];
		let good = good_for_rle(&counts);
		assert!(good[..6].iter().all(|&b| b));
		assert!(!good[6]);
	}
}
