//! Optional observability helpers for service calls.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `gigya_client.call` with the `method` (wire
//!   name) and `stage` (call site) fields, plus events for pagination progress.
//! - Enable `metrics` to increment the `gigya_client_call_total` counter for every
//!   attempt/success/failure, labeled by `method` + `outcome`, and the
//!   `gigya_client_search_pages_total` counter for every decoded search page.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Emits a `tracing` event when the feature is enabled; compiles to nothing otherwise.
macro_rules! event {
	($level:ident, $($arg:tt)+) => {{
		#[cfg(feature = "tracing")]
		::tracing::$level!($($arg)+);
	}};
}
pub(crate) use event;

/// Outcome labels recorded for each call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallOutcome {
	/// Entry to a client helper.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl CallOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CallOutcome::Attempt => "attempt",
			CallOutcome::Success => "success",
			CallOutcome::Failure => "failure",
		}
	}
}
impl Display for CallOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
