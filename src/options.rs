/*!
# Zopflicore: Options & Constants.
*/



/// # Hash/LZ77 Window Size.
pub const ZOPFLI_WINDOW_SIZE: usize = 32_768;

/// # Window Mask.
pub(crate) const ZOPFLI_WINDOW_MASK: usize = ZOPFLI_WINDOW_SIZE - 1;

/// # Minimum Matchable Length.
pub const ZOPFLI_MIN_MATCH: usize = 3;

/// # Maximum Matchable Length.
pub const ZOPFLI_MAX_MATCH: usize = 258;

/// # Length of a Full Sublength Table.
///
/// Indices `0..=ZOPFLI_MAX_MATCH` are all addressable.
pub const SUBLEN_LEN: usize = ZOPFLI_MAX_MATCH + 1;

/// # Maximum Chain Hits.
///
/// A configurable ceiling on hash-chain traversal length, preventing
/// pathological inputs (e.g. long runs of identical bytes without a "same"
/// fast path) from making the match finder quadratic. A finite value is
/// exposed so callers embedding this crate in a latency-sensitive context
/// can tighten it.
pub const ZOPFLI_MAX_CHAIN_HITS: u32 = 8192;

/// # Size of the Literal/Length Alphabet.
pub const ZOPFLI_NUM_LL: usize = 288;

/// # Size of the Distance Alphabet.
pub const ZOPFLI_NUM_D: usize = 32;

/// # Minimum Splittable LZ77 Span.
///
/// Blocks this short or shorter bypass the splitter entirely.
pub(crate) const MINIMUM_SPLIT_DISTANCE: usize = 10;

/// # Bracketed-Search Arity.
pub(crate) const SPLIT_SEARCH_ARITY: usize = 9;

/// # Linear-Scan Threshold.
///
/// Intervals shorter than this are scanned exhaustively rather than probed.
pub(crate) const SPLIT_SEARCH_LINEAR_THRESHOLD: usize = 1024;

/// # Length-Score Distance Threshold.
///
/// Distances beyond this incur a one-point penalty in the greedy producer's
/// length-vs-distance heuristic.
pub(crate) const LENGTH_SCORE_DISTANCE_THRESHOLD: u16 = 1024;



#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # Compression Options.
///
/// The knobs this core's public operations consult, plus a few the core
/// itself ignores. The verbosity and iteration-count fields are accepted so
/// callers can carry a single options value through to other stages (an
/// iterative optimal-parsing pass, the final bitstream emitter) without
/// needing a second struct, even though this crate's own code only reads a
/// subset of them.
pub struct ZopfliOptions {
	/// # Verbose.
	///
	/// If set, [`crate::block_split`] writes a single human-readable summary
	/// line of split points to its [`crate::verbose::VerboseSink`].
	pub verbose: bool,

	/// # Verbose (More).
	///
	/// Unused by this core; carried through for out-of-scope collaborators.
	pub verbose_more: bool,

	/// # Iteration Count.
	///
	/// Unused by this core (consumed by an out-of-scope iterative
	/// cost-optimizer); carried through for out-of-scope collaborators.
	pub numiterations: i32,

	/// # Block Splitting.
	///
	/// If false, [`crate::block_split`] skips the splitter entirely and
	/// returns an empty split list.
	pub blocksplitting: bool,

	/// # Block Splitting Last.
	///
	/// Orders splitting relative to other (out-of-scope) optimizations;
	/// unused by this core.
	pub blocksplittinglast: bool,

	/// # Maximum Blocks.
	///
	/// Carried through for embedders that want to derive a `maxblocks`
	/// argument from it; this crate's own operations take `maxblocks` as an
	/// explicit parameter instead, so this field is read by callers, not by
	/// anything in this crate.
	pub blocksplittingmax: i16,
}

impl Default for ZopfliOptions {
	/// # Default Options.
	fn default() -> Self {
		Self {
			verbose: false,
			verbose_more: false,
			numiterations: 15,
			blocksplitting: true,
			blocksplittinglast: false,
			blocksplittingmax: 15,
		}
	}
}
