//! Navigation gate consulted before a protected view is entered.
//!
//! The gate reads already-loaded state and never contacts the broker. With the broker
//! disabled it allows entry iff the local holder has a token. With the broker enabled it
//! denies entry iff the broker reports the token expired, and the local holder is not
//! consulted on that path: a backend-issued token does not open broker-protected views.
//!
//! A broker whose initialization failed counts as disabled for the rest of the session, so the
//! local holder decides again.

// self
use crate::{
	_prelude::*,
	auth::LocalTokenHolder,
	broker::{Broker, IdentityBroker},
	obs::{AuthOutcome, AuthSpan, AuthStep},
};

/// Route issued when navigation is denied.
pub const LOGIN_ROUTE: &str = "login";

/// Navigation boundary used to issue redirects.
pub trait Navigator
where
	Self: Send + Sync,
{
	/// Navigates to the route described by `commands`.
	fn navigate(&self, commands: &[&str]);
}

/// Result of a single gate evaluation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GuardDecision {
	/// Navigation may proceed.
	Allow,
	/// Navigation was denied and a redirect to `redirect` was issued.
	Deny {
		/// Route the gate redirected to.
		redirect: &'static str,
	},
}
impl GuardDecision {
	/// Returns `true` for [`GuardDecision::Allow`].
	pub fn is_allowed(self) -> bool {
		matches!(self, Self::Allow)
	}
}

/// Gate deciding whether a protected view may be entered.
#[derive(Clone)]
pub struct NavigationGuard {
	identity: Arc<IdentityBroker>,
	holder: Arc<LocalTokenHolder>,
	navigator: Arc<dyn Navigator>,
}
impl NavigationGuard {
	/// Creates a gate over the startup-constructed broker, the local holder, and the navigator.
	///
	/// The broker is wrapped in a fresh [`IdentityBroker`]; use
	/// [`with_identity`](Self::with_identity) to share one whose initialization outcome should
	/// be honored.
	pub fn new(broker: Broker, holder: Arc<LocalTokenHolder>, navigator: Arc<dyn Navigator>) -> Self {
		Self::with_identity(Arc::new(IdentityBroker::new(broker)), holder, navigator)
	}

	/// Creates a gate over a shared identity broker.
	pub fn with_identity(
		identity: Arc<IdentityBroker>,
		holder: Arc<LocalTokenHolder>,
		navigator: Arc<dyn Navigator>,
	) -> Self {
		Self { identity, holder, navigator }
	}

	/// Evaluates the gate; returns `false` after redirecting to [`LOGIN_ROUTE`].
	pub fn can_activate(&self) -> bool {
		self.evaluate().is_allowed()
	}

	/// Evaluates the gate, issuing exactly one redirect on denial.
	pub fn evaluate(&self) -> GuardDecision {
		let span = AuthSpan::new(AuthStep::Guard, "evaluate");
		let _entered = span.enter();
		let allowed = match self.identity.active_client() {
			None => self.holder.has_token(),
			Some(client) => !client.is_token_expired(),
		};

		if allowed {
			span.finish(AuthOutcome::Allow);

			return GuardDecision::Allow;
		}

		span.finish(AuthOutcome::Deny);
		self.navigator.navigate(&[LOGIN_ROUTE]);

		GuardDecision::Deny { redirect: LOGIN_ROUTE }
	}
}
impl Debug for NavigationGuard {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("NavigationGuard")
			.field("identity", &self.identity)
			.field("local_token_set", &self.holder.has_token())
			.finish()
	}
}

/// [`Navigator`] that records every navigation, for tests and headless runs.
#[derive(Debug, Default)]
pub struct RecordingNavigator(Mutex<Vec<Vec<String>>>);
impl RecordingNavigator {
	/// Returns every recorded navigation in order.
	pub fn history(&self) -> Vec<Vec<String>> {
		self.0.lock().clone()
	}

	/// Number of recorded navigations.
	pub fn count(&self) -> usize {
		self.0.lock().len()
	}
}
impl Navigator for RecordingNavigator {
	fn navigate(&self, commands: &[&str]) {
		self.0.lock().push(commands.iter().map(|command| (*command).to_owned()).collect());
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{_preludet::*, broker::MemoryBrokerClient};

	fn guard(
		broker: Broker,
		holder: Arc<LocalTokenHolder>,
	) -> (NavigationGuard, Arc<RecordingNavigator>) {
		let navigator = Arc::new(RecordingNavigator::default());

		(NavigationGuard::new(broker, holder, navigator.clone()), navigator)
	}

	#[test]
	fn disabled_broker_without_token_redirects_once() {
		let (guard, navigator) = guard(Broker::Disabled, holder_with(None));

		assert_eq!(guard.evaluate(), GuardDecision::Deny { redirect: LOGIN_ROUTE });
		assert_eq!(navigator.history(), vec![vec!["login".to_owned()]]);
	}

	#[test]
	fn disabled_broker_with_token_allows() {
		let (guard, navigator) = guard(Broker::Disabled, holder_with(Some("T")));

		assert!(guard.can_activate());
		assert_eq!(navigator.count(), 0);
	}

	#[test]
	fn expired_broker_token_denies_despite_local_token() {
		let client = Arc::new(
			MemoryBrokerClient::new()
				.with_token("B", OffsetDateTime::now_utc() - Duration::minutes(1)),
		);
		let (guard, navigator) = guard(memory_broker(&client), holder_with(Some("L")));

		assert!(!guard.can_activate());
		assert_eq!(navigator.count(), 1);
	}

	#[test]
	fn live_broker_token_allows_without_local_token() {
		let client = Arc::new(
			MemoryBrokerClient::new()
				.with_token("B", OffsetDateTime::now_utc() + Duration::minutes(5)),
		);
		let (guard, navigator) = guard(memory_broker(&client), holder_with(None));

		assert!(guard.can_activate());

		client.expire_token();

		assert!(!guard.can_activate());
		assert_eq!(navigator.count(), 1);
	}

	#[tokio::test]
	async fn failed_broker_init_hands_the_decision_to_the_local_holder() {
		let client = Arc::new(MemoryBrokerClient::new().failing_init("connection refused"));
		let identity = Arc::new(IdentityBroker::new(memory_broker(&client)));
		let holder = holder_with(None);
		let navigator = Arc::new(RecordingNavigator::default());
		let guard = NavigationGuard::with_identity(identity.clone(), holder.clone(), navigator.clone());

		// Before init settles the broker branch applies: no broker token means expired.
		holder.set_token("L");

		assert!(!guard.can_activate());
		assert!(identity.init().await);
		assert!(guard.can_activate());

		holder.clear();

		assert!(!guard.can_activate());
		assert_eq!(navigator.count(), 2);
	}
}
