/*!
# Zopflicore: LZ77 Store & Greedy Producer.

`LZ77Store` is the parallel `(litlen, dist)` sequence every compression
produces; `lz77_greedy` is the one-step lazy-matching producer that builds
it.
*/

use super::cache::MatchCache;
use super::error::{zopfli_error, ZopfliError};
use super::hash::ZopfliHash;
use super::matchfinder::find_longest_match;
use super::options::{
	LENGTH_SCORE_DISTANCE_THRESHOLD,
	SUBLEN_LEN,
	ZOPFLI_MIN_MATCH,
	ZOPFLI_NUM_D,
	ZOPFLI_NUM_LL,
};
use super::symbols::{distance_symbol, length_symbol, LitLen};



#[derive(Debug, Clone, Copy)]
/// # LZ77 Store Entry.
///
/// A single emitted symbol: either a literal byte (`dist == 0`, value held
/// in `litlen`) or a back-reference (`dist != 0`, length held in `litlen`).
/// `pos` is the input byte offset the symbol occupies, which doubles as the
/// conversion key from an LZ77 index back to a byte position.
pub(crate) struct LZ77StoreEntry {
	pub(crate) pos: usize,
	pub(crate) litlen: LitLen,
	pub(crate) dist: u16,
	ll_symbol: u16,
	d_symbol: u8,
}

impl LZ77StoreEntry {
	/// # New Entry.
	fn new(litlen: u16, dist: u16, pos: usize) -> Result<Self, ZopfliError> {
		if litlen > 258 || dist > 32_768 { return Err(zopfli_error!()); }

		let (ll_symbol, d_symbol) =
			if dist == 0 { (litlen, 0) }
			else { (length_symbol(litlen as usize), distance_symbol(dist)) };

		Ok(Self { pos, litlen: LitLen::new(litlen), dist, ll_symbol, d_symbol })
	}

	#[must_use]
	/// # Emitted Length (in Bytes).
	///
	/// `1` for a literal, the match length for a back-reference.
	pub(crate) const fn length(&self) -> usize {
		if self.dist == 0 { 1 } else { self.litlen.get() as usize }
	}

	/// # Add to Symbol Histograms.
	fn add_counts(&self, ll_counts: &mut [u32; ZOPFLI_NUM_LL], d_counts: &mut [u32; ZOPFLI_NUM_D]) {
		ll_counts[self.ll_symbol as usize] += 1;
		if self.dist != 0 { d_counts[self.d_symbol as usize] += 1; }
	}
}



#[derive(Clone, Default)]
/// # LZ77 Data Store.
///
/// Parallel `litlens`/`dists`, plus an incrementally-maintained
/// histogram cache (one `[u32; 288]`/`[u32; 32]` chunk per `ZOPFLI_NUM_LL`/
/// `ZOPFLI_NUM_D` entries pushed) so the splitter's many overlapping
/// `histogram(lstart, lend)` queries don't each have to rescan the whole
/// range from scratch.
pub(crate) struct LZ77Store {
	entries: Vec<LZ77StoreEntry>,
	ll_counts: Vec<[u32; ZOPFLI_NUM_LL]>,
	d_counts: Vec<[u32; ZOPFLI_NUM_D]>,
}

impl LZ77Store {
	#[must_use]
	/// # New, Empty Store.
	pub(crate) const fn new() -> Self {
		Self { entries: Vec::new(), ll_counts: Vec::new(), d_counts: Vec::new() }
	}

	/// # Clear.
	pub(crate) fn clear(&mut self) {
		self.entries.clear();
		self.ll_counts.clear();
		self.d_counts.clear();
	}

	#[must_use]
	/// # Length (Number of Symbols).
	pub(crate) fn len(&self) -> usize { self.entries.len() }

	#[must_use]
	/// # Is Empty?
	pub(crate) fn is_empty(&self) -> bool { self.entries.is_empty() }

	#[must_use]
	/// # Entries.
	pub(crate) fn entries(&self) -> &[LZ77StoreEntry] { &self.entries }

	/// # Push a Symbol.
	///
	/// `dist == 0` pushes a literal (`litlen` is the byte value, `0..=255`);
	/// otherwise pushes a back-reference (`litlen` is the match length,
	/// `3..=258`).
	pub(crate) fn push(&mut self, litlen: u16, dist: u16, pos: usize) -> Result<(), ZopfliError> {
		let entry = LZ77StoreEntry::new(litlen, dist, pos)?;
		let (ll_counts, d_counts) = self.last_counts();
		entry.add_counts(ll_counts, d_counts);
		self.entries.push(entry);
		Ok(())
	}

	/// # Current (Last) Count Chunks.
	///
	/// Returns the histogram chunk the next push should be tallied into,
	/// starting a fresh chunk (seeded from the previous chunk's running
	/// totals) whenever the position wraps around the chunk's symbol-count
	/// alphabet size.
	fn last_counts(&mut self) -> (&mut [u32; ZOPFLI_NUM_LL], &mut [u32; ZOPFLI_NUM_D]) {
		/// # (Maybe) Start a New Chunk.
		fn wrap<const N: usize>(set: &mut Vec<[u32; N]>, pos: usize) -> usize {
			if set.is_empty() { set.push([0; N]); }
			else if pos % N == 0 {
				let last = *set.last().expect("just checked non-empty");
				set.push(last);
			}
			set.len()
		}

		let pos = self.entries.len();
		let ll_len = wrap(&mut self.ll_counts, pos);
		let d_len = wrap(&mut self.d_counts, pos);
		(&mut self.ll_counts[ll_len - 1], &mut self.d_counts[d_len - 1])
	}

	/// # Histogram Over a Range.
	///
	/// Returns the literal/length and distance symbol counts for
	/// `[lstart, lend)`. Small ranges are tallied directly; larger ones are
	/// recovered by subtracting two cached cumulative histograms, which is
	/// the whole reason the incremental chunks in `push` exist — the
	/// splitter calls this a great many times over overlapping ranges of a
	/// large store.
	pub(crate) fn histogram(&self, lstart: usize, lend: usize)
	-> Result<([u32; ZOPFLI_NUM_LL], [u32; ZOPFLI_NUM_D]), ZopfliError> {
		if lstart > lend || lend > self.entries.len() { return Err(zopfli_error!()); }
		if lstart == lend { return Ok(([0; ZOPFLI_NUM_LL], [0; ZOPFLI_NUM_D])); }

		if lstart + ZOPFLI_NUM_LL * 3 > lend {
			let mut ll_counts = [0_u32; ZOPFLI_NUM_LL];
			let mut d_counts = [0_u32; ZOPFLI_NUM_D];
			for e in &self.entries[lstart..lend] { e.add_counts(&mut ll_counts, &mut d_counts); }
			Ok((ll_counts, d_counts))
		}
		else {
			let (mut ll_counts, mut d_counts) = self.histogram_at(lend - 1)?;
			if lstart > 0 { self.histogram_sub(lstart - 1, &mut ll_counts, &mut d_counts)?; }
			Ok((ll_counts, d_counts))
		}
	}

	/// # Cumulative Histogram Through `pos` (Inclusive).
	fn histogram_at(&self, pos: usize)
	-> Result<([u32; ZOPFLI_NUM_LL], [u32; ZOPFLI_NUM_D]), ZopfliError> {
		let ll_idx = pos / ZOPFLI_NUM_LL;
		let d_idx = pos / ZOPFLI_NUM_D;
		let ll_end = (ll_idx + 1) * ZOPFLI_NUM_LL;
		let d_end = (d_idx + 1) * ZOPFLI_NUM_D;

		let mut ll_counts = *self.ll_counts.get(ll_idx).ok_or_else(|| zopfli_error!())?;
		let mut d_counts = *self.d_counts.get(d_idx).ok_or_else(|| zopfli_error!())?;

		for (i, e) in self.entries.iter().enumerate().take(ll_end).skip(pos + 1) {
			ll_counts[usize::from(e.ll_symbol)] -= 1;
			if i < d_end && e.dist != 0 { d_counts[usize::from(e.d_symbol)] -= 1; }
		}

		Ok((ll_counts, d_counts))
	}

	/// # Subtract the Cumulative Histogram Through `pos` (Inclusive).
	fn histogram_sub(
		&self,
		pos: usize,
		ll_counts: &mut [u32; ZOPFLI_NUM_LL],
		d_counts: &mut [u32; ZOPFLI_NUM_D],
	) -> Result<(), ZopfliError> {
		let ll_idx = pos / ZOPFLI_NUM_LL;
		let d_idx = pos / ZOPFLI_NUM_D;
		let ll_end = (ll_idx + 1) * ZOPFLI_NUM_LL;
		let d_end = (d_idx + 1) * ZOPFLI_NUM_D;

		let ll_old = self.ll_counts.get(ll_idx).ok_or_else(|| zopfli_error!())?;
		let d_old = self.d_counts.get(d_idx).ok_or_else(|| zopfli_error!())?;

		for (i, e) in self.entries.iter().enumerate().take(ll_end).skip(pos + 1) {
			ll_counts[usize::from(e.ll_symbol)] += 1;
			if i < d_end && e.dist != 0 { d_counts[usize::from(e.d_symbol)] += 1; }
		}

		for (a, b) in ll_counts.iter_mut().zip(ll_old) { *a -= b; }
		for (a, b) in d_counts.iter_mut().zip(d_old) { *a -= b; }

		Ok(())
	}

	/// # Byte Range for an LZ77 Index Range.
	///
	/// Converts `[lstart, lend)` (LZ77 symbol indices) to the input-byte
	/// range it covers. Each entry already records the byte position it
	/// begins at, so the conversion never needs to re-walk lengths from the
	/// start of the store.
	pub(crate) fn byte_range(&self, lstart: usize, lend: usize, input_len: usize)
	-> Result<(usize, usize), ZopfliError> {
		if lstart > lend || lend > self.entries.len() { return Err(zopfli_error!()); }

		let start = if lstart < self.entries.len() { self.entries[lstart].pos } else { input_len };
		let end = if lend < self.entries.len() { self.entries[lend].pos } else { input_len };
		Ok((start, end))
	}
}



#[must_use]
/// # Length/Distance Score.
///
/// `score(L, d) = L - 1` when `d` exceeds the length-score distance
/// threshold, `L` otherwise: a length-3 match at a long distance is rarely
/// worth the extra distance bits.
const fn length_score(length: LitLen, distance: u16) -> u16 {
	if distance > LENGTH_SCORE_DISTANCE_THRESHOLD { length.get().saturating_sub(1) }
	else { length.get() }
}

/// # Greedy LZ77 Producer (One-Step Lazy Matching).
///
/// Walks `arr[instart..inend)`, updating `hash` and consulting `lmc` (the
/// longest-match cache, active when `cache` names the current block's
/// start) to find the best match at each position, applying the
/// length-vs-distance heuristic score and one-step lazy matching, and
/// appending the resulting literal/back-reference stream to `store`.
pub(crate) fn lz77_greedy(
	hash: &mut ZopfliHash,
	lmc: &mut MatchCache,
	arr: &[u8],
	instart: usize,
	inend: usize,
	store: &mut LZ77Store,
	cache: Option<usize>,
) -> Result<(), ZopfliError> {
	if inend > arr.len() || instart > inend { return Err(zopfli_error!()); }
	let arr = &arr[..inend];

	store.clear();
	hash.reset(arr, instart);

	let mut sublen = [0_u16; SUBLEN_LEN];
	let mut length = LitLen::ZERO;
	let mut distance: u16 = 0;
	let mut prev_length = LitLen::ZERO;
	let mut prev_distance: u16 = 0;
	let mut match_available = false;

	let mut i = instart;
	while i < arr.len() {
		hash.update_hash(&arr[i..], i);

		find_longest_match(
			hash, arr, i, LitLen::MAX_MATCH, &mut Some(&mut sublen),
			&mut distance, &mut length, lmc, cache,
		)?;

		let cur_score = length_score(length, distance);
		let prev_score = length_score(prev_length, prev_distance);

		if match_available {
			match_available = false;

			if cur_score > prev_score + 1 {
				// The previous position's tentative match loses to this
				// one; emit it as a literal and defer the current match
				// instead.
				store.push(u16::from(arr[i - 1]), 0, i - 1)?;

				if cur_score >= ZOPFLI_MIN_MATCH as u16 && !length.is_max() {
					match_available = true;
					prev_length = length;
					prev_distance = distance;
					i += 1;
					continue;
				}
			}
			else {
				// Emit the deferred match from the previous position and
				// skip ahead by its length, re-hashing every skipped byte.
				length = prev_length;
				distance = prev_distance;
				store.push(length.get(), distance, i - 1)?;

				for _ in 2..length.get() {
					i += 1;
					hash.update_hash(&arr[i..], i);
				}

				i += 1;
				continue;
			}
		}
		else if cur_score >= ZOPFLI_MIN_MATCH as u16 && !length.is_max() {
			// No match deferred yet; defer this one and see if next
			// position beats it.
			match_available = true;
			prev_length = length;
			prev_distance = distance;
			i += 1;
			continue;
		}

		if cur_score >= ZOPFLI_MIN_MATCH as u16 {
			store.push(length.get(), distance, i)?;
		}
		else {
			length = LitLen::new(1);
			store.push(u16::from(arr[i]), 0, i)?;
		}

		for _ in 1..length.get() {
			i += 1;
			hash.update_hash(&arr[i..], i);
		}

		i += 1;
	}

	verify_store(arr, store)
}

/// # Verify Emitted Back-References.
///
/// Debug-only: checks every back-reference actually reproduces the bytes it
/// claims to cite. Elided entirely in release builds.
fn verify_store(arr: &[u8], store: &LZ77Store) -> Result<(), ZopfliError> {
	if cfg!(debug_assertions) {
		for e in &store.entries {
			if e.dist == 0 { continue; }
			let dist = usize::from(e.dist);
			let len = e.litlen.get() as usize;
			if dist > e.pos || e.pos + len > arr.len() { return Err(zopfli_error!()); }
			for k in 0..len {
				if arr[e.pos - dist + k] != arr[e.pos + k] { return Err(zopfli_error!()); }
			}
		}
	}
	Ok(())
}



#[cfg(test)]
mod test {
	use super::*;
	use crate::cache::MatchCache;
	use crate::hash::ZopfliHash;

	fn run_greedy(data: &[u8]) -> LZ77Store {
		let mut hash = ZopfliHash::new();
		let mut lmc = MatchCache::new();
		let mut store = LZ77Store::new();
		lz77_greedy(&mut hash, &mut lmc, data, 0, data.len(), &mut store, None).unwrap();
		store
	}

	#[test]
	fn t_empty_input_yields_empty_store() {
		let store = run_greedy(b"");
		assert!(store.is_empty());
	}

	#[test]
	fn t_repeated_pattern_finds_growing_match() {
		let store = run_greedy(b"ABCABCABCABC");
		assert!(!store.is_empty());

		// The first three symbols should be literals (no earlier window to
		// cite); somewhere after that a distance-3 back-reference should
		// appear.
		assert!(store.entries[0].dist == 0);
		assert!(store.entries.iter().any(|e| e.dist == 3));
	}

	#[test]
	fn t_long_run_uses_maximal_matches() {
		let data = vec![0x55_u8; 2000];
		let store = run_greedy(&data);

		// After the initial literal, matches should dominate and often hit
		// the maximum length.
		assert!(store.entries.iter().skip(1).any(|e| e.litlen.get() == 258));
	}

	#[test]
	fn t_byte_range_roundtrips() {
		let data = b"ABCABCABCABC";
		let store = run_greedy(data);
		let (start, end) = store.byte_range(0, store.len(), data.len()).unwrap();
		assert_eq!(start, 0);
		assert_eq!(end, data.len());
	}
}
