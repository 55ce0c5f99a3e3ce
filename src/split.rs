/*!
# Zopflicore: Cost-Driven Block Splitter.

`block_split_lz77`/`block_split` run a divide-and-conquer search for the
LZ77-index (respectively byte-offset) positions where cutting the stream
into separate DEFLATE blocks saves more in aggregate tree-header cost than
it loses, stopping once no further split pays for itself or `maxblocks` is
reached.
*/

use super::cost::estimate_block_cost;
use super::cache::MatchCache;
use super::error::{zopfli_error, ZopfliError};
use super::hash::ZopfliHash;
use super::lz77::{lz77_greedy, LZ77Store};
use super::options::{
	MINIMUM_SPLIT_DISTANCE,
	SPLIT_SEARCH_ARITY,
	SPLIT_SEARCH_LINEAR_THRESHOLD,
	ZopfliOptions,
};
use super::verbose::VerboseSink;
use dactyl::NoHash;
use std::collections::HashSet;



/// # Split Cost.
///
/// The combined cost of encoding `[start, mid)` and `[mid, end)` as two
/// separate dynamic-Huffman blocks — what a candidate split point at `mid`
/// would actually cost, for comparison against the undivided `[start, end)`.
fn split_cost(store: &LZ77Store, start: usize, mid: usize, end: usize) -> Result<u32, ZopfliError> {
	Ok(estimate_block_cost(store, start, mid)? + estimate_block_cost(store, mid, end)?)
}

/// # Find Minimum-Cost Split Point.
///
/// Searches `start..end` (LZ77 indices) for the position that minimizes
/// [`split_cost`], returning `(index, cost)`. Short intervals are scanned
/// exhaustively; longer ones use a bracketed divide-and-conquer search that
/// probes `SPLIT_SEARCH_ARITY` equally-spaced candidates per round, then
/// recurses into the bracket around the best probe, since evaluating every
/// position in a huge store would be prohibitively slow and the cost curve
/// is well-behaved enough that a coarse search finds the same answer a fine
/// one would.
fn find_minimum_cost(store: &LZ77Store, mut start: usize, mut end: usize)
-> Result<(usize, u32), ZopfliError> {
	let split_start = start - 1;
	let split_end = end;

	let mut best_cost = u32::MAX;
	let mut best_idx = start;

	if end - start < SPLIT_SEARCH_LINEAR_THRESHOLD {
		for i in start..end {
			let cost = split_cost(store, split_start, i, split_end)?;
			if cost < best_cost {
				best_cost = cost;
				best_idx = i;
			}
		}
		return Ok((best_idx, best_cost));
	}

	let mut p = [0_usize; SPLIT_SEARCH_ARITY];
	let mut last_best_cost = u32::MAX;
	while MINIMUM_SPLIT_DISTANCE <= end - start {
		let mut best_p_idx = 0;
		for (i, pp) in p.iter_mut().enumerate() {
			*pp = start + (i + 1) * ((end - start) / MINIMUM_SPLIT_DISTANCE);
			let line_cost =
				if best_idx == *pp { last_best_cost }
				else { split_cost(store, split_start, *pp, split_end)? };

			if i == 0 || line_cost < best_cost {
				best_cost = line_cost;
				best_p_idx = i;
			}
		}

		if last_best_cost < best_cost { break; }

		best_idx = p[best_p_idx];
		if 0 < best_p_idx { start = p[best_p_idx - 1]; }
		if best_p_idx + 1 < p.len() { end = p[best_p_idx + 1]; }

		last_best_cost = best_cost;
	}

	Ok((best_idx, last_best_cost))
}

/// # Find Largest Splittable Block.
///
/// Scans the gaps between the already-chosen `splitpoints` (plus the
/// store's own bounds) for the widest one not yet marked `done`, writing its
/// bounds to `lstart`/`lend` and returning `true` if it's at least
/// `MINIMUM_SPLIT_DISTANCE` wide. This "largest remaining" rule spreads a
/// limited `maxblocks` budget evenly rather than exhausting it on one end of
/// the stream.
///
/// The final gap's upper bound is `lz77size - 1`, not `lz77size`: the last
/// LZ77 symbol is never itself offered as a split point.
fn find_largest_splittable_block(
	lz77size: usize,
	done: &HashSet<usize, NoHash>,
	splitpoints: &[usize],
	lstart: &mut usize,
	lend: &mut usize,
) -> bool {
	let mut best = 0;
	for i in 0..=splitpoints.len() {
		let start = if i == 0 { 0 } else { splitpoints[i - 1] };
		let end = if i < splitpoints.len() { splitpoints[i] } else { lz77size - 1 };

		if best < end - start && !done.contains(&start) {
			*lstart = start;
			*lend = end;
			best = end - start;
		}
	}
	MINIMUM_SPLIT_DISTANCE <= best
}

/// # Split an LZ77 Store.
///
/// Repeatedly finds the largest not-yet-refused span of `store`, searches it
/// for its minimum-cost split point, and either
/// accepts the split (if it's cheaper than leaving the span whole) or marks
/// the span `done` so it isn't retried. Stops when no splittable span
/// remains, `maxblocks` splits have been made, or the store is too small to
/// split at all.
///
/// Returns the accepted split points (LZ77 indices), sorted ascending.
pub(crate) fn block_split_lz77(options: &ZopfliOptions, store: &LZ77Store, maxblocks: usize)
-> Result<Vec<usize>, ZopfliError> {
	if !options.blocksplitting || store.len() < MINIMUM_SPLIT_DISTANCE { return Ok(Vec::new()); }

	let mut done: HashSet<usize, NoHash> = HashSet::with_hasher(NoHash::default());
	let mut splitpoints: Vec<usize> = Vec::new();

	let mut lstart = 0;
	let mut lend = store.len();

	loop {
		// `numblocks` (one more than the splits accepted so far) is checked
		// before searching for another one, not after: a `maxblocks` of `1`
		// must skip the search entirely, not search-then-discard.
		if maxblocks != 0 && splitpoints.len() + 1 >= maxblocks { break; }

		let (llpos, llcost) = find_minimum_cost(store, lstart + 1, lend)?;
		if llpos <= lstart || llpos >= lend { return Err(zopfli_error!()); }

		if llpos == lstart + 1 || estimate_block_cost(store, lstart, lend)? < llcost {
			done.insert(lstart);
		}
		else {
			splitpoints.push(llpos);
			splitpoints.sort_unstable();
		}

		if !find_largest_splittable_block(store.len(), &done, &splitpoints, &mut lstart, &mut lend) {
			break;
		}
	}

	Ok(splitpoints)
}

/// # Split Input Into Blocks.
///
/// Runs the greedy LZ77 producer over `input[start..end)` with no longest-
/// match cache (a one-shot pass, not repeated lookups within a batch), hands
/// the resulting store to [`block_split_lz77`], then converts the accepted
/// LZ77-index split points back to byte offsets via each entry's recorded
/// position.
///
/// Returns an empty list immediately, without running the producer at all,
/// when `options.blocksplitting` is unset.
///
/// Reports the final byte-level split points to `sink` when
/// `options.verbose` is set; this is best-effort diagnostics only and never
/// affects the returned result.
pub(crate) fn block_split(
	options: &ZopfliOptions,
	input: &[u8],
	start: usize,
	end: usize,
	maxblocks: usize,
	sink: &dyn VerboseSink,
) -> Result<Vec<usize>, ZopfliError> {
	if !options.blocksplitting { return Ok(Vec::new()); }
	if end > input.len() || start > end { return Err(zopfli_error!()); }

	let mut hash = ZopfliHash::new();
	let mut lmc = MatchCache::new();
	let mut store = LZ77Store::new();
	lz77_greedy(&mut hash, &mut lmc, input, start, end, &mut store, None)?;

	let lz77points = block_split_lz77(options, &store, maxblocks)?;

	let mut points = Vec::with_capacity(lz77points.len());
	for p in lz77points {
		let (pos, _) = store.byte_range(p, p, input.len())?;
		points.push(pos);
	}

	if options.verbose { sink.split_points(&points); }

	Ok(points)
}



#[cfg(test)]
mod test {
	use super::*;
	use super::super::verbose::NullSink;

	fn opts() -> ZopfliOptions { ZopfliOptions::default() }

	#[test]
	fn t_tiny_input_has_no_splits() {
		let data = [0_u8; 9];
		let points = block_split(&opts(), &data, 0, data.len(), 0, &NullSink).unwrap();
		assert!(points.is_empty());
	}

	#[test]
	fn t_empty_input_has_no_splits() {
		let points = block_split(&opts(), &[], 0, 0, 0, &NullSink).unwrap();
		assert!(points.is_empty());
	}

	#[test]
	fn t_disabled_splitting_returns_empty() {
		let mut options = opts();
		options.blocksplitting = false;
		let data = vec![0x41_u8; 50_000];
		let points = block_split(&options, &data, 0, data.len(), 0, &NullSink).unwrap();
		assert!(points.is_empty());
	}

	#[test]
	fn t_transition_region_gets_a_split() {
		let mut data = vec![0_u8; 10_000];
		let mut seed: u32 = 0x1234_5678;
		for _ in 0..10_000 {
			seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12_345);
			data.push((seed >> 16) as u8);
		}
		data.extend(std::iter::repeat(0_u8).take(10_000));

		let points = block_split(&opts(), &data, 0, data.len(), 0, &NullSink).unwrap();
		assert!(!points.is_empty());
	}

	#[test]
	fn t_maxblocks_limits_split_count() {
		let mut data = Vec::new();
		let mut seed: u32 = 0xdead_beef;
		for _ in 0..100_000 {
			seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12_345);
			data.push((seed >> 16) as u8);
		}

		let points = block_split(&opts(), &data, 0, data.len(), 3, &NullSink).unwrap();
		assert!(points.len() + 1 <= 3);
	}

	#[test]
	fn t_more_blocks_allowed_never_increases_cost() {
		let mut data = Vec::new();
		let mut seed: u32 = 0x1111_2222;
		for _ in 0..50_000 {
			seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12_345);
			data.push((seed >> 16) as u8);
		}

		let few = block_split(&opts(), &data, 0, data.len(), 2, &NullSink).unwrap();
		let many = block_split(&opts(), &data, 0, data.len(), 0, &NullSink).unwrap();
		assert!(few.len() <= many.len() + 1);
	}
}
