/*!
# Zopflicore: Verbose Sink.

Design Notes (§9) call for a pluggable verbose sink rather than a hardwired
`stderr` writer. `VerboseSink` is the seam; `StderrSink` reproduces the
original `PrintBlockSplitPoints` one-line decimal-and-hex summary, and
`NullSink` silences it entirely.
*/

use dactyl::NiceU64;



/// # Verbose Sink.
///
/// Receives best-effort diagnostic output from [`crate::block_split`] when
/// `ZopfliOptions::verbose` is set. Per §7, verbosity output is best-effort
/// and its failure (or the sink's own choice to drop it) is never a
/// compression error.
pub trait VerboseSink {
	/// # Report Split Points.
	///
	/// Called once per `block_split` invocation with the final byte-level
	/// split points, in increasing order. An empty slice means no splits
	/// were made.
	fn split_points(&self, points: &[usize]);
}

#[derive(Debug, Clone, Copy, Default)]
/// # Stderr Sink.
///
/// Writes a single line to `stderr`: decimal positions, then the same
/// positions in hex.
pub struct StderrSink;

impl VerboseSink for StderrSink {
	fn split_points(&self, points: &[usize]) {
		if points.is_empty() {
			eprintln!("block split points: (none)");
			return;
		}

		let mut decimal = String::new();
		let mut hex = String::new();
		for &p in points {
			decimal.push_str(NiceU64::from(p as u64).as_str());
			decimal.push(' ');
			hex.push_str(&format!("{p:x} "));
		}

		eprintln!("block split points: {}(hex: {})", decimal, hex.trim_end());
	}
}

#[derive(Debug, Clone, Copy, Default)]
/// # Null Sink.
///
/// Discards all output; the default choice when `verbose` is unset.
pub struct NullSink;

impl VerboseSink for NullSink {
	fn split_points(&self, _points: &[usize]) {}
}
