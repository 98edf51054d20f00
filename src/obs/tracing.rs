// self
use crate::{_prelude::*, api::ApiMethod, obs::CallOutcome};

/// Future returned by [`CallSpan::instrument`]; a plain passthrough without `tracing`.
#[cfg(feature = "tracing")]
pub type InstrumentedCall<F> = tracing::instrument::Instrumented<F>;
/// Future returned by [`CallSpan::instrument`]; a plain passthrough without `tracing`.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedCall<F> = F;

/// `gigya_client.call` span covering one service call, from authorization to decoding.
///
/// The `outcome` field starts empty and is filled by [`CallSpan::finish`] so span
/// consumers see success and failure on the span itself.
#[derive(Clone, Debug)]
pub struct CallSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl CallSpan {
	/// Opens a span for `method`, tagged with the client operation (`stage`) driving it.
	pub fn new(method: ApiMethod, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			Self {
				span: tracing::info_span!(
					"gigya_client.call",
					method = method.as_str(),
					stage,
					outcome = tracing::field::Empty
				),
			}
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (method, stage);

			Self {}
		}
	}

	/// Runs `fut` inside the span; no guard is held across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedCall<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			tracing::Instrument::instrument(fut, self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}

	/// Records the final outcome on the span.
	pub fn finish(&self, outcome: CallOutcome) {
		#[cfg(feature = "tracing")]
		{
			self.span.record("outcome", outcome.as_str());
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = outcome;
		}
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[tokio::test]
	async fn instrumented_calls_keep_their_output() {
		let span = CallSpan::new(ApiMethod::Search, "search_all");
		let pages = span.instrument(async { vec![100, 100, 50] }).await;

		span.finish(CallOutcome::Success);

		assert_eq!(pages.iter().sum::<i32>(), 250);
	}
}
