//! Credential source selection shared by the navigation gate and the request interceptor.
//!
//! With the broker disabled, the local holder is the only source. With the broker enabled,
//! the broker's token wins and the local holder is the fallback, so sessions issued directly
//! by the backend keep working after a broker is introduced.

// self
use crate::{
	_prelude::*,
	auth::{LocalTokenHolder, TokenSecret},
	broker::Broker,
	obs::{AuthOutcome, AuthSpan, AuthStep},
};

/// Where a resolved credential came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CredentialSource {
	/// Issued by the identity broker.
	Broker,
	/// Held locally from a backend login.
	Local,
}
impl CredentialSource {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CredentialSource::Broker => "broker",
			CredentialSource::Local => "local",
		}
	}
}

/// Picks the credential to present for the current call.
#[derive(Clone, Debug)]
pub struct CredentialResolver {
	broker: Broker,
	holder: Arc<LocalTokenHolder>,
}
impl CredentialResolver {
	/// Creates a resolver over the startup-constructed broker and the local holder.
	pub fn new(broker: Broker, holder: Arc<LocalTokenHolder>) -> Self {
		Self { broker, holder }
	}

	/// Broker handle consulted first when enabled.
	pub fn broker(&self) -> &Broker {
		&self.broker
	}

	/// Local holder consulted when the broker has nothing.
	pub fn holder(&self) -> &Arc<LocalTokenHolder> {
		&self.holder
	}

	/// Returns the credential to present, if any. Absence is not an error.
	pub fn resolve(&self) -> Option<TokenSecret> {
		self.resolve_with_source().map(|(token, _)| token)
	}

	/// Like [`resolve`](Self::resolve), also reporting which source supplied the credential.
	pub fn resolve_with_source(&self) -> Option<(TokenSecret, CredentialSource)> {
		let span = AuthSpan::new(AuthStep::Resolve, "resolve");
		let _entered = span.enter();
		let resolved = self
			.broker
			.client()
			.and_then(|client| client.token())
			.and_then(TokenSecret::present)
			.map(|token| (token, CredentialSource::Broker))
			.or_else(|| self.holder.token().map(|token| (token, CredentialSource::Local)));

		match &resolved {
			Some((_, source)) => {
				span.record_source(*source);
				span.finish(AuthOutcome::Allow);
			},
			None => span.finish(AuthOutcome::Deny),
		}

		resolved
	}
}
