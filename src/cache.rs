/*!
# Zopflicore: Longest Match Cache.

`MatchCache` (the "LMC") memoizes per-position length/distance/sublength
results so repeated greedy/lazy lookups at the same position inside a block
don't have to re-walk the hash chains.
*/

use super::error::{zopfli_error, ZopfliError};
use super::options::{SUBLEN_LEN, ZOPFLI_MIN_MATCH};
use super::symbols::LitLen;



/// # Default Length (1) / Distance (0).
///
/// `length == 1 && distance == 0` marks a cache slot as "not yet populated";
/// no legal match has length one, so the combination is otherwise
/// impossible.
const DEFAULT_LD: u32 = u32::from_le_bytes([1, 0, 0, 0]);

/// # Sublength Cache Entries Per Position.
///
/// Each position samples up to 8 "breakpoints" in its sublength curve
/// rather than storing all 256 possible sublengths.
const ZOPFLI_CACHE_LENGTH: usize = 8;

/// # Sublength Cache Bytes Per Position.
///
/// Each sampled breakpoint is 3 bytes: a packed length (`u8`, length minus
/// 3) and its distance (`u16`, little-endian).
const SUBLEN_CACHED_LEN: usize = ZOPFLI_CACHE_LENGTH * 3;



/// # Longest Match Cache.
///
/// Holds cached length/distance/sublength results for every position of one
/// block, keyed by position relative to that block's start.
pub(crate) struct MatchCache {
	/// # Length and Distance.
	///
	/// Each pair consists of two sixteen-bit values, joined into a single
	/// little-endian `u32`.
	ld: Vec<u32>,

	/// # Sublength Cache.
	sublen: Vec<u8>,
}

impl MatchCache {
	/// # New (Boxed) Instance.
	pub(crate) fn new() -> Box<Self> {
		Box::new(Self { ld: Vec::new(), sublen: Vec::new() })
	}

	/// # Initialize For a Block.
	///
	/// Resizes (and resets) the cache for a block of `blocksize` bytes.
	/// Lengths default to one (the "unpopulated" sentinel); everything else
	/// defaults to zero.
	pub(crate) fn init(&mut self, blocksize: usize) {
		self.ld.clear();
		self.ld.resize(blocksize, DEFAULT_LD);
		self.sublen.clear();
		self.sublen.resize(blocksize * SUBLEN_CACHED_LEN, 0);
	}

	/// # Find Match.
	///
	/// Looks up `pos` (relative to the block start) in the cache. If a
	/// usable cached result exists, writes it back to `distance`/`length`
	/// (and fills `sublen` if requested) and returns `true`. Otherwise
	/// returns `false`, possibly having tightened `limit` to the cached
	/// length as a hint for the caller's own search.
	pub(crate) fn find(
		&self,
		pos: usize,
		limit: &mut LitLen,
		sublen: &mut Option<&mut [u16; SUBLEN_LEN]>,
		distance: &mut u16,
		length: &mut LitLen,
	) -> Result<bool, ZopfliError> {
		if pos >= self.ld.len() { return Err(zopfli_error!()); }

		let (cache_len, cache_dist) = ld_split(self.ld[pos]);
		if !cache_len.is_zero() && cache_dist == 0 { return Ok(false); }

		let start = pos * SUBLEN_CACHED_LEN;
		let cache_sublen: &[u8; SUBLEN_CACHED_LEN] = self.sublen[start..start + SUBLEN_CACHED_LEN]
			.first_chunk::<SUBLEN_CACHED_LEN>()
			.ok_or_else(|| zopfli_error!())?;

		let maxlength =
			if sublen.is_none() { LitLen::ZERO }
			else { max_sublen(cache_sublen) };

		if
			limit.is_max() ||
			cache_len.get() <= limit.get() ||
			(sublen.is_some() && maxlength.get() >= limit.get())
		{
			if sublen.is_none() || cache_len.get() <= maxlength.get() {
				*length = cache_len;
				if length.get() > limit.get() { *length = *limit; }

				if let Some(s) = sublen {
					if length.get() >= ZOPFLI_MIN_MATCH as u16 {
						write_sublen(cache_sublen, s);
					}
					*distance = s[length.get() as usize];

					if *distance != cache_dist && limit.is_max() && length.is_matchable() {
						return Err(zopfli_error!());
					}
				}
				else { *distance = cache_dist; }

				return Ok(true);
			}

			*limit = cache_len;
		}

		Ok(false)
	}

	/// # Set Sublength.
	///
	/// Writes a freshly computed full-length-limit result into the cache at
	/// `pos`, sampling up to `ZOPFLI_CACHE_LENGTH` breakpoints from
	/// `sublen`.
	pub(crate) fn set_sublen(
		&mut self,
		pos: usize,
		sublen: &[u16; SUBLEN_LEN],
		distance: u16,
		length: LitLen,
	) -> Result<(), ZopfliError> {
		if pos >= self.ld.len() { return Err(zopfli_error!()); }

		if DEFAULT_LD != self.ld[pos] {
			let (cache_len, cache_dist) = ld_split(self.ld[pos]);
			if cache_dist != 0 || cache_len.is_zero() { return Ok(()); }
			return Err(zopfli_error!());
		}

		if !length.is_matchable() {
			self.ld[pos] = 0;
			return Ok(());
		}

		if distance == 0 { return Err(zopfli_error!()); }
		self.ld[pos] = ld_join(length, distance);

		let slice = &sublen[ZOPFLI_MIN_MATCH..=length.get() as usize];
		let start = pos * SUBLEN_CACHED_LEN;
		let mut dst = self.sublen[start..start + SUBLEN_CACHED_LEN]
			.chunks_exact_mut(3);

		for (i, pair) in (0_u8..=u8::MAX).zip(slice.windows(2)) {
			if pair[0] != pair[1] {
				let Some([d0, d1, d2]) = dst.next() else { return Ok(()); };
				*d0 = i;
				[*d1, *d2] = pair[0].to_le_bytes();
			}
		}

		if let Some([d0, d1, d2]) = dst.next() {
			*d0 = pack_len(length);
			[*d1, *d2] = slice[slice.len() - 1].to_le_bytes();

			if let Some([d0, ..]) = dst.last() { *d0 = pack_len(length); }
		}

		Ok(())
	}
}



/// # Join Length/Distance.
const fn ld_join(length: LitLen, distance: u16) -> u32 {
	let [l1, l2] = length.get().to_le_bytes();
	let [d1, d2] = distance.to_le_bytes();
	u32::from_le_bytes([l1, l2, d1, d2])
}

/// # Split Length/Distance.
const fn ld_split(ld: u32) -> (LitLen, u16) {
	let [l1, l2, d1, d2] = ld.to_le_bytes();
	(LitLen::new(u16::from_le_bytes([l1, l2])), u16::from_le_bytes([d1, d2]))
}

/// # Pack a Match Length Into a Byte.
///
/// Matchable lengths are always `3..=258`, so `length - 3` always fits in a
/// `u8`.
const fn pack_len(length: LitLen) -> u8 { (length.get() - ZOPFLI_MIN_MATCH as u16) as u8 }

/// # Unpack a Match Length From a Byte.
const fn unpack_len(byte: u8) -> LitLen { LitLen::new(byte as u16 + ZOPFLI_MIN_MATCH as u16) }

/// # Max Sublength.
///
/// Returns the maximum sublength for a given cache entry: the length stored
/// in the final sampled breakpoint, or zero if the entry holds no distance
/// at all.
const fn max_sublen(slice: &[u8; SUBLEN_CACHED_LEN]) -> LitLen {
	if slice[1] == 0 && slice[2] == 0 { LitLen::ZERO }
	else { unpack_len(slice[SUBLEN_CACHED_LEN - 3]) }
}

/// # Write Sublength.
///
/// Expands a cache entry's sampled breakpoints back into a full
/// `ZOPFLI_MIN_MATCH..=length` sublength table, filling each run between
/// breakpoints with the distance recorded at its end.
fn write_sublen(src: &[u8; SUBLEN_CACHED_LEN], dst: &mut [u16; SUBLEN_LEN]) {
	let maxlength = max_sublen(src);
	let mut old = 0_usize;
	for chunk in src.chunks_exact(3) {
		let length = unpack_len(chunk[0]);
		if old <= length.get() as usize {
			let value = u16::from_le_bytes([chunk[1], chunk[2]]);
			dst[old..=length.get() as usize].fill(value);
		}
		if length.get() >= maxlength.get() { return; }
		old = length.get() as usize + 1;
	}
}



#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn t_split_join_roundtrip() {
		let (len, dist) = ld_split(DEFAULT_LD);
		assert!(len.get() == 1);
		assert_eq!(dist, 0);
		assert_eq!(DEFAULT_LD, ld_join(len, dist));
	}

	#[test]
	fn t_pack_unpack_roundtrip() {
		for raw in [3_u16, 10, 100, 258] {
			let l = LitLen::new(raw);
			assert_eq!(unpack_len(pack_len(l)).get(), raw);
		}
	}

	#[test]
	fn t_init_resets_to_sentinel() {
		let mut cache = MatchCache::new();
		cache.init(16);
		for &v in &cache.ld { assert_eq!(v, DEFAULT_LD); }
		assert!(cache.sublen.iter().all(|&b| b == 0));
	}

	#[test]
	fn t_set_then_find_roundtrips() {
		let mut cache = MatchCache::new();
		cache.init(4);

		let mut sublen = [0_u16; SUBLEN_LEN];
		sublen[5] = 42;
		let length = LitLen::new(5);
		cache.set_sublen(0, &sublen, 42, length).unwrap();

		let mut limit = LitLen::MAX_MATCH;
		let mut out_sublen_storage = [0_u16; SUBLEN_LEN];
		let mut out_sublen = Some(&mut out_sublen_storage);
		let mut out_dist = 0_u16;
		let mut out_len = LitLen::ZERO;
		let found = cache.find(0, &mut limit, &mut out_sublen, &mut out_dist, &mut out_len).unwrap();
		assert!(found);
		assert_eq!(out_len.get(), 5);
		assert_eq!(out_dist, 42);
	}

	#[test]
	fn t_unmatchable_length_marks_uncacheable() {
		let mut cache = MatchCache::new();
		cache.init(4);
		let sublen = [0_u16; SUBLEN_LEN];
		cache.set_sublen(0, &sublen, 0, LitLen::new(1)).unwrap();
		assert_eq!(cache.ld[0], 0);
	}
}
