/*!
# Zopflicore: Longest Match Finder.

`find_longest_match` walks the sliding-window hash chains from a given
position (consulting the longest-match cache first) to find the longest
back-reference available, optionally filling in a full sublength table
along the way.
*/

use super::cache::MatchCache;
use super::error::{zopfli_error, ZopfliError};
use super::hash::ZopfliHash;
use super::options::{
	ZOPFLI_MAX_CHAIN_HITS,
	ZOPFLI_WINDOW_MASK,
	ZOPFLI_WINDOW_SIZE,
};
use super::symbols::LitLen;



#[allow(clippy::too_many_arguments)]
/// # Find Longest Match.
///
/// Finds the longest match in `arr` at `pos` (consulting the cache first
/// when `cache` names the current block's start), writing the result to
/// `distance`/`length` and, if `sublen` is `Some`, filling in the full
/// per-length distance table.
///
/// Lengths never exceed `limit` nor `ZOPFLI_MAX_MATCH`, but may be less
/// than `ZOPFLI_MIN_MATCH` (in particular near the end of the data, where
/// fewer than three bytes remain).
pub(crate) fn find_longest_match(
	hash: &ZopfliHash,
	arr: &[u8],
	pos: usize,
	mut limit: LitLen,
	sublen: &mut Option<&mut [u16; super::options::SUBLEN_LEN]>,
	distance: &mut u16,
	length: &mut LitLen,
	lmc: &mut MatchCache,
	cache: Option<usize>,
) -> Result<(), ZopfliError> {
	if let Some(blockstart) = cache {
		if lmc.find(pos - blockstart, &mut limit, sublen, distance, length)? {
			if pos + length.get() as usize <= arr.len() { return Ok(()); }
			return Err(zopfli_error!());
		}
	}

	if pos + super::options::ZOPFLI_MIN_MATCH > arr.len() {
		*length = LitLen::ZERO;
		*distance = 0;
		return Ok(());
	}

	limit = clamp_to_remaining(limit, arr.len() - pos);

	let (bestdist, bestlength) = find_loop(hash, arr, pos, limit, sublen)?;

	if limit.is_max() {
		if let Some(blockstart) = cache {
			if let Some(s) = sublen {
				lmc.set_sublen(pos - blockstart, s, bestdist, bestlength)?;
			}
		}
	}

	*distance = bestdist;
	*length = bestlength;
	if pos + length.get() as usize <= arr.len() { Ok(()) }
	else { Err(zopfli_error!()) }
}

/// # Clamp a Limit to the Remaining Data.
///
/// `limit` will always be at least one afterward, since `remaining` is
/// always nonzero at the only call site (checked just before).
const fn clamp_to_remaining(limit: LitLen, remaining: usize) -> LitLen {
	if (limit.get() as usize) <= remaining { limit } else { LitLen::new(remaining as u16) }
}

/// # Distance Between Two Window Positions.
///
/// Handles the sliding window's wraparound: a "previous" position can sit
/// either before or after the current one (modulo the window), and the
/// true distance accumulates accordingly.
const fn ppp_distance(p: usize, pp: usize) -> usize {
	if p < pp { pp - p } else { ZOPFLI_WINDOW_SIZE + pp - p }
}

/// # Find Longest Match (Search Loop).
///
/// The workhorse behind [`find_longest_match`]: walks the hash chains
/// starting at `pos`, switching from the primary chain to the
/// same-run-aware secondary chain partway through if it looks more
/// promising, and returns the best `(distance, length)` found, or `(0, 1)`
/// if nothing matched.
fn find_loop(
	hash: &ZopfliHash,
	arr: &[u8],
	pos: usize,
	limit: LitLen,
	sublen: &mut Option<&mut [u16; super::options::SUBLEN_LEN]>,
) -> Result<(u16, LitLen), ZopfliError> {
	if arr.len() <= pos { return Err(zopfli_error!()); }
	let right = &arr[pos..];

	let hpos = pos & ZOPFLI_WINDOW_MASK;

	let mut bestdist: usize = 0;
	let mut bestlength = LitLen::new(1);

	let mut switched = false;
	let mut chain = &hash.chain1;

	let mut pp = hpos;
	let mut p =
		if chain.idx_prev[hpos] < 0 { hpos }
		else { chain.idx_prev[hpos] as usize };

	let mut dist = ppp_distance(p, pp);
	let mut hits: u32 = 0;
	let same0 = hash.same[hpos];
	let same1 = same0.min(limit.get());

	while p < ZOPFLI_WINDOW_SIZE && dist < ZOPFLI_WINDOW_SIZE && hits < ZOPFLI_MAX_CHAIN_HITS {
		if 0 != dist && dist <= pos {
			let left = &arr[pos - dist..pos - dist + right.len()];

			if bestlength.get() as usize >= right.len() || right[bestlength.get() as usize] == left[bestlength.get() as usize] {
				let mut currentlength: u16 =
					if same0 > 2 && right[0] == left[0] {
						same1.min(hash.same[(pos - dist) & ZOPFLI_WINDOW_MASK])
					}
					else { 0 };

				while
					currentlength < limit.get() &&
					(currentlength as usize) < right.len() &&
					left[currentlength as usize] == right[currentlength as usize]
				{
					currentlength += 1;
				}

				if bestlength.get() < currentlength {
					if let Some(s) = sublen {
						s[bestlength.get() as usize + 1..=currentlength as usize].fill(dist as u16);
					}

					bestdist = dist;
					bestlength = LitLen::new(currentlength);

					if currentlength >= limit.get() { break; }
				}
			}
		}

		if
			!switched &&
			same0 <= bestlength.get() &&
			hash.chain2.idx_hash[p] == hash.chain2.val
		{
			switched = true;
			chain = &hash.chain2;
		}

		if chain.idx_prev[p] < 0 { break; }

		pp = p;
		p = chain.idx_prev[p] as usize;

		dist += ppp_distance(p, pp);
		hits += 1;
	}

	if bestlength.get() <= limit.get() { Ok((bestdist as u16, bestlength)) }
	else { Ok((0, LitLen::new(1))) }
}



#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn t_no_match_before_window_primed() {
		let mut hash = ZopfliHash::new();
		let data = b"abcdefgh";
		hash.reset(data, 0);
		hash.update_hash(&data[0..], 0);

		let mut lmc = MatchCache::new();
		lmc.init(data.len());

		let mut distance = 0;
		let mut length = LitLen::ZERO;
		find_longest_match(
			&hash, data, 0, LitLen::MAX_MATCH, &mut None,
			&mut distance, &mut length, &mut lmc, None,
		).unwrap();

		assert_eq!(distance, 0);
	}

	#[test]
	fn t_finds_repeat() {
		let mut hash = ZopfliHash::new();
		let data = b"abcabcabcabc";
		hash.reset(data, 0);
		for i in 0..data.len() { hash.update_hash(&data[i..], i); }

		let mut lmc = MatchCache::new();
		lmc.init(data.len());

		let mut distance = 0;
		let mut length = LitLen::ZERO;
		find_longest_match(
			&hash, data, 3, LitLen::MAX_MATCH, &mut None,
			&mut distance, &mut length, &mut lmc, None,
		).unwrap();

		assert_eq!(distance, 3);
		assert!(length.get() >= 3);
	}
}
