// self
use crate::{_prelude::*, config::ProviderKind, obs::Stage};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type Instrumented<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type Instrumented<F> = F;

/// Span wrapped around a provider operation.
#[derive(Clone, Debug)]
pub struct ProviderSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl ProviderSpan {
	/// Creates a new span tagged with the provider kind and stage.
	pub fn new(provider: ProviderKind, stage: Stage) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!(
				"oauth2_federation.provider",
				provider = provider.as_str(),
				stage = stage.as_str()
			);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (provider, stage);

			Self {}
		}
	}

	/// Runs a synchronous section inside the span.
	pub fn in_scope<F, T>(&self, f: F) -> T
	where
		F: FnOnce() -> T,
	{
		#[cfg(feature = "tracing")]
		{
			self.span.in_scope(f)
		}
		#[cfg(not(feature = "tracing"))]
		{
			f()
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> Instrumented<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Logs a failed provider operation at `warn` level (when enabled).
pub fn log_failure(provider: ProviderKind, stage: Stage, error: &Error) {
	#[cfg(feature = "tracing")]
	{
		tracing::warn!(
			provider = provider.as_str(),
			stage = stage.as_str(),
			%error,
			"provider operation failed"
		);
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (provider, stage, error);
	}
}
