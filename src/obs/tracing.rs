// std
#[cfg(not(feature = "tracing"))] use std::marker::PhantomData;
// self
use crate::{
	_prelude::*,
	obs::{self, AuthOutcome, AuthStep},
	resolve::CredentialSource,
};

/// Future returned by [`AuthSpan::instrument`].
#[cfg(feature = "tracing")]
pub type InstrumentedAuth<F> = tracing::instrument::Instrumented<F>;
/// Future returned by [`AuthSpan::instrument`].
#[cfg(not(feature = "tracing"))]
pub type InstrumentedAuth<F> = F;

/// Span around one credential decision.
///
/// The span is opened with its step and stage; [`record_source`](Self::record_source) and
/// [`finish`](Self::finish) fill in the `source` and `outcome` fields once the decision is
/// known. Finishing also feeds the decision counter, so every decision is reported once.
#[derive(Clone, Debug)]
pub struct AuthSpan {
	step: AuthStep,
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl AuthSpan {
	/// Opens a span for `step` at `stage`.
	pub fn new(step: AuthStep, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::debug_span!(
				"bearer_gate.auth",
				step = step.as_str(),
				stage,
				source = tracing::field::Empty,
				outcome = tracing::field::Empty,
			);

			Self { step, span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = stage;

			Self { step }
		}
	}

	/// Decision point this span covers.
	pub fn step(&self) -> AuthStep {
		self.step
	}

	/// Enters the span for a synchronous section.
	pub fn enter(&self) -> AuthSpanGuard<'_> {
		#[cfg(feature = "tracing")]
		{
			AuthSpanGuard { _entered: self.span.enter() }
		}
		#[cfg(not(feature = "tracing"))]
		{
			AuthSpanGuard { _span: PhantomData }
		}
	}

	/// Runs `fut` inside the span without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedAuth<Fut>
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

	/// Notes which source supplied the credential.
	pub fn record_source(&self, source: CredentialSource) {
		#[cfg(feature = "tracing")]
		{
			self.span.record("source", source.as_str());
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = source;
		}
	}

	/// Closes the decision with `outcome`, recording it on the span and the counter.
	pub fn finish(&self, outcome: AuthOutcome) {
		#[cfg(feature = "tracing")]
		{
			self.span.record("outcome", outcome.as_str());
		}

		obs::record_auth_outcome(self.step, outcome);
	}
}

/// Guard returned by [`AuthSpan::enter`]; the span is exited on drop.
pub struct AuthSpanGuard<'a> {
	#[cfg(feature = "tracing")]
	_entered: tracing::span::Entered<'a>,
	#[cfg(not(feature = "tracing"))]
	_span: PhantomData<&'a AuthSpan>,
}
impl Debug for AuthSpanGuard<'_> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("AuthSpanGuard(..)")
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn decision_can_be_closed_without_subscriber() {
		let span = AuthSpan::new(AuthStep::Intercept, "augment");
		let _entered = span.enter();

		span.record_source(CredentialSource::Local);
		span.finish(AuthOutcome::Allow);

		assert_eq!(span.step(), AuthStep::Intercept);
	}

	#[tokio::test]
	async fn instrument_keeps_the_output() {
		let span = AuthSpan::new(AuthStep::BrokerInit, "init");

		assert!(span.instrument(async { true }).await);
	}
}
