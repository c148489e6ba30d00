//! Optional observability helpers for credential decisions.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit debug spans named `bearer_gate.auth`. Each span carries `step`
//!   and `stage`, and is filled in with `outcome` and, when a credential was found, `source`.
//!   Broker fallbacks are reported as warning events.
//! - Enable `metrics` to increment the `bearer_gate_auth_total` counter for every decision,
//!   labeled by `step` + `outcome`.
//!
//! Credentials are never recorded; only the source they came from.

mod tracing;

pub use self::tracing::*;

// self
use crate::_prelude::*;

/// Decision points observed by the crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AuthStep {
	/// Credential source resolution.
	Resolve,
	/// Navigation gate evaluation.
	Guard,
	/// Outgoing request augmentation.
	Intercept,
	/// Identity broker initialization.
	BrokerInit,
	/// Identity broker login.
	Login,
	/// Identity broker logout.
	Logout,
}
impl AuthStep {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			AuthStep::Resolve => "resolve",
			AuthStep::Guard => "guard",
			AuthStep::Intercept => "intercept",
			AuthStep::BrokerInit => "broker_init",
			AuthStep::Login => "login",
			AuthStep::Logout => "logout",
		}
	}
}
impl Display for AuthStep {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each decision.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AuthOutcome {
	/// A credential was found or access was granted.
	Allow,
	/// No credential was found or access was denied.
	Deny,
	/// The broker failed and the crate continued without it.
	Fallback,
	/// The broker is disabled and the call was skipped.
	Skipped,
	/// An explicit broker call failed and the error was returned.
	Failure,
}
impl AuthOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			AuthOutcome::Allow => "allow",
			AuthOutcome::Deny => "deny",
			AuthOutcome::Fallback => "fallback",
			AuthOutcome::Skipped => "skipped",
			AuthOutcome::Failure => "failure",
		}
	}
}
impl Display for AuthOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Records a decision outcome via the global metrics recorder (when enabled).
pub fn record_auth_outcome(step: AuthStep, outcome: AuthOutcome) {
	#[cfg(feature = "metrics")]
	{
		::metrics::counter!(
			"bearer_gate_auth_total",
			"step" => step.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}
	#[cfg(not(feature = "metrics"))]
	{
		let _ = (step, outcome);
	}
}

/// Emits an informational event (when tracing is enabled).
pub(crate) fn info(step: AuthStep, message: &str) {
	#[cfg(feature = "tracing")]
	{
		::tracing::info!(step = step.as_str(), "{message}");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (step, message);
	}
}

/// Emits a warning event carrying `error` (when tracing is enabled).
pub(crate) fn warn(step: AuthStep, message: &str, error: &dyn StdError) {
	#[cfg(feature = "tracing")]
	{
		::tracing::warn!(step = step.as_str(), error = %error, "{message}");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (step, message, error);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn labels_are_stable() {
		assert_eq!(AuthStep::BrokerInit.to_string(), "broker_init");
		assert_eq!(AuthOutcome::Fallback.to_string(), "fallback");
	}

	#[test]
	fn outcome_is_recorded_without_recorder() {
		record_auth_outcome(AuthStep::Guard, AuthOutcome::Deny);
	}
}
