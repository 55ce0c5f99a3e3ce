/*!
# Zopflicore: Errors.
*/

#[cfg(debug_assertions)]
use std::fmt;



#[cfg(not(debug_assertions))]
/// # Invariant Violation (Release).
///
/// The core's public operations return `Result` the way fallible operations
/// normally do, but the error case should be unreachable in practice: it only
/// fires when an internal invariant the implementation relies on (buffer
/// bounds, cache coherency, split-point ordering, etc.) has somehow been
/// violated.
///
/// In release builds that situation is reported as a unit error with no
/// further detail, matching `debug_assert!`'s no-op-in-release behavior: the
/// condition is never checked, so the type carries nothing.
pub type ZopfliError = ();

#[cfg(debug_assertions)]
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # Invariant Violation (Debug).
///
/// In debug builds, the same situation described on the release-mode
/// `ZopfliError` records the source location that detected the problem so it
/// can be tracked down.
pub struct ZopfliError {
	/// # Source File.
	file: &'static str,

	/// # Source Line.
	line: u32,
}

#[cfg(debug_assertions)]
impl ZopfliError {
	/// # New Error.
	pub(crate) const fn new(file: &'static str, line: u32) -> Self {
		Self { file, line }
	}
}

#[cfg(debug_assertions)]
impl fmt::Display for ZopfliError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_fmt(format_args!(
			"zopflicore: invariant violated at {}:{}",
			self.file,
			self.line,
		))
	}
}

#[cfg(debug_assertions)]
impl std::error::Error for ZopfliError {}



#[cfg(debug_assertions)]
/// # Error Macro (Debug).
///
/// Captures the call site so a failed invariant can be traced back to its
/// source.
macro_rules! zopfli_error { () => ($crate::error::ZopfliError::new(file!(), line!())); }

#[cfg(not(debug_assertions))]
/// # Error Macro (Release).
macro_rules! zopfli_error { () => (()); }

pub(crate) use zopfli_error;
