// self
use crate::{config::ProviderKind, obs::Outcome};

/// Records a claims outcome via the global metrics recorder (when enabled).
pub fn record_claims_outcome(provider: ProviderKind, outcome: Outcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"oauth2_federation_claims_total",
			"provider" => provider.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (provider, outcome);
	}
}
