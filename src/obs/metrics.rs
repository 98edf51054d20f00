// self
use crate::{api::ApiMethod, obs::CallOutcome};

/// Records a call outcome via the global metrics recorder (when enabled).
pub fn record_call_outcome(method: ApiMethod, outcome: CallOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"gigya_client_call_total",
			"method" => method.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (method, outcome);
	}
}

/// Counts one decoded search page (when enabled).
pub fn record_search_page() {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!("gigya_client_search_pages_total").increment(1);
	}
}
