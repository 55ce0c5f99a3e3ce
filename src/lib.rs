/*!
# Zopflicore

A from-scratch Rust port of the zopfli-family DEFLATE compressor's core:
the sliding-window match finder, the one-step lazy-matching LZ77 producer,
and the cost-driven block splitter. Bitstream emission, the iterative
optimal-parsing pass, and PNG/gzip container handling are all out of scope
(see `SPEC_FULL.md`'s Non-goals) — this crate answers one question, as
cheaply as possible: *where* should a stream of bytes be cut into separate
DEFLATE blocks, and what LZ77 symbols would each of those blocks encode?
*/

#![deny(unsafe_code)]

#![warn(
	clippy::filetype_is_file,
	clippy::integer_division,
	clippy::needless_borrow,
	clippy::nursery,
	clippy::pedantic,
	clippy::perf,
	clippy::suboptimal_flops,
	clippy::unneeded_field_pattern,
	macro_use_extern_crate,
	missing_copy_implementations,
	missing_debug_implementations,
	missing_docs,
	non_ascii_idents,
	trivial_casts,
	trivial_numeric_casts,
	unreachable_pub,
	unused_crate_dependencies,
	unused_extern_crates,
	unused_import_braces,
)]

#![allow(
	clippy::module_name_repetitions,
	clippy::redundant_pub_crate,
)]

mod error;
mod options;
mod verbose;
mod symbols;
mod hash;
mod cache;
mod matchfinder;
mod lz77;
mod llcl;
mod cost;
mod split;

pub use error::ZopfliError;
pub use options::{
	ZopfliOptions,
	ZOPFLI_MAX_CHAIN_HITS,
	ZOPFLI_MAX_MATCH,
	ZOPFLI_MIN_MATCH,
	ZOPFLI_NUM_D,
	ZOPFLI_NUM_LL,
	ZOPFLI_WINDOW_SIZE,
};
pub use verbose::{NullSink, StderrSink, VerboseSink};

use cache::MatchCache;
use hash::ZopfliHash;
use lz77::LZ77Store;



#[must_use]
/// # Greedy LZ77 Compression.
///
/// Runs the one-step lazy-matching producer over `input[start..end)`,
/// returning the resulting sequence of literals and back-references as an
/// opaque [`Lz77Store`].
///
/// # Errors
///
/// Returns [`ZopfliError`] if `start`/`end` are out of bounds, or (debug
/// builds only) if an internal invariant is violated.
pub fn lz77_greedy(input: &[u8], start: usize, end: usize) -> Result<Lz77Store, ZopfliError> {
	let mut hash = ZopfliHash::new();
	let mut lmc = MatchCache::new();
	let mut store = LZ77Store::new();
	lz77::lz77_greedy(&mut hash, &mut lmc, input, start, end, &mut store, None)?;
	Ok(Lz77Store(store))
}

#[must_use]
/// # Estimate Dynamic Block Cost (in Bits).
///
/// Returns the bit cost of encoding `store[lstart..lend)` as a single
/// dynamic-Huffman DEFLATE block.
///
/// # Errors
///
/// Returns [`ZopfliError`] if `lstart`/`lend` are out of bounds, or (debug
/// builds only) if an internal invariant is violated.
pub fn estimate_block_cost(store: &Lz77Store, lstart: usize, lend: usize) -> Result<u32, ZopfliError> {
	cost::estimate_block_cost(&store.0, lstart, lend)
}

#[must_use]
/// # Split an LZ77 Store Into Blocks.
///
/// Finds the LZ77-index split points that minimize total dynamic-Huffman
/// cost across `store`, making at most `maxblocks - 1` splits (`0` means
/// unlimited).
///
/// # Errors
///
/// Returns [`ZopfliError`] if an internal invariant is violated (debug
/// builds only) or if `store` yields inconsistent bounds during the search.
pub fn block_split_lz77(options: &ZopfliOptions, store: &Lz77Store, maxblocks: usize)
-> Result<Vec<usize>, ZopfliError> {
	split::block_split_lz77(options, &store.0, maxblocks)
}

#[must_use]
/// # Split Input Into Blocks.
///
/// Runs [`lz77_greedy`] over `input[start..end)`, then finds the byte-level
/// split points that minimize total dynamic-Huffman cost, making at most
/// `maxblocks - 1` splits (`0` means unlimited). Reports the result to
/// `sink` when `options.verbose` is set.
///
/// # Errors
///
/// Returns [`ZopfliError`] if `start`/`end` are out of bounds, or (debug
/// builds only) if an internal invariant is violated.
pub fn block_split(
	options: &ZopfliOptions,
	input: &[u8],
	start: usize,
	end: usize,
	maxblocks: usize,
	sink: &dyn VerboseSink,
) -> Result<Vec<usize>, ZopfliError> {
	split::block_split(options, input, start, end, maxblocks, sink)
}



#[derive(Clone, Default)]
/// # LZ77 Store.
///
/// An opaque handle around the literal/length and distance symbol sequence
/// produced by [`lz77_greedy`]. Pass it to [`estimate_block_cost`] or
/// [`block_split_lz77`] to reason about its encoded cost; there is no public
/// accessor for its contents, since nothing outside this crate needs to
/// inspect individual symbols.
pub struct Lz77Store(LZ77Store);

impl std::fmt::Debug for Lz77Store {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Lz77Store").field("len", &self.0.len()).finish()
	}
}

impl Lz77Store {
	#[must_use]
	/// # Number of Symbols.
	pub const fn len(&self) -> usize { self.0.len() }

	#[must_use]
	/// # Is Empty?
	pub const fn is_empty(&self) -> bool { self.0.is_empty() }
}



#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn t_public_api_round_trips() {
		let data = b"the quick brown fox the quick brown fox the quick brown fox";
		let store = lz77_greedy(data, 0, data.len()).unwrap();
		assert!(!store.is_empty());

		let cost = estimate_block_cost(&store, 0, store.len()).unwrap();
		assert!(cost > 0);

		let options = ZopfliOptions::default();
		let points = block_split_lz77(&options, &store, 0).unwrap();
		assert!(points.len() < store.len());

		let byte_points = block_split(&options, data, 0, data.len(), 0, &NullSink).unwrap();
		assert!(byte_points.iter().all(|&p| p <= data.len()));
	}
}
