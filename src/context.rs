//! Startup sequence wiring configuration, the broker, and the local holder together.
//!
//! [`AuthContext`] derives the broker mode once, constructs the broker client eagerly
//! through a caller-supplied factory, and hands out resolvers, gates, and interceptors that
//! all share the same handles. Nothing is built lazily on first access.

// self
use crate::{
	_prelude::*,
	auth::LocalTokenHolder,
	broker::{Broker, BrokerClient, IdentityBroker, InitOptions},
	config::{BrokerMode, BrokerSettings, Environment},
	guard::{NavigationGuard, Navigator},
	resolve::CredentialResolver,
};
#[cfg(feature = "reqwest")]
use crate::{
	http::{AuthorizedClient, RequestHandler},
	intercept::{BearerInterceptor, HeaderPolicy},
};

/// Shared authentication state built once at startup.
#[derive(Clone, Debug)]
pub struct AuthContext {
	environment: Arc<Environment>,
	mode: BrokerMode,
	identity: Arc<IdentityBroker>,
	holder: Arc<LocalTokenHolder>,
}
impl AuthContext {
	/// Builds the context, calling `factory` once when the broker is enabled.
	pub fn new<F>(environment: Environment, factory: F) -> Result<Self>
	where
		F: FnOnce(&BrokerSettings) -> Arc<dyn BrokerClient>,
	{
		Self::with_init_options(environment, InitOptions::default(), factory)
	}

	/// Like [`new`](Self::new), overriding the options passed to the broker's `init`.
	pub fn with_init_options<F>(
		environment: Environment,
		options: InitOptions,
		factory: F,
	) -> Result<Self>
	where
		F: FnOnce(&BrokerSettings) -> Arc<dyn BrokerClient>,
	{
		let mode = environment.broker_mode()?;
		let logout_redirect = environment.app_origin()?;
		let broker = match &mode {
			BrokerMode::Disabled => Broker::Disabled,
			BrokerMode::Enabled(settings) => Broker::enabled(factory(settings)),
		};
		let identity = IdentityBroker::new(broker)
			.with_init_options(options)
			.with_logout_redirect(logout_redirect);

		Ok(Self {
			environment: Arc::new(environment),
			mode,
			identity: Arc::new(identity),
			holder: Arc::new(LocalTokenHolder::default()),
		})
	}

	/// Builds the context and initializes the broker, returning whether startup should
	/// continue.
	pub async fn bootstrap<F>(environment: Environment, factory: F) -> Result<(Self, bool)>
	where
		F: FnOnce(&BrokerSettings) -> Arc<dyn BrokerClient>,
	{
		let context = Self::new(environment, factory)?;
		let proceed = context.identity.init().await;

		Ok((context, proceed))
	}

	/// Settings the context was built from.
	pub fn environment(&self) -> &Environment {
		&self.environment
	}

	/// Broker mode derived at startup.
	pub fn mode(&self) -> &BrokerMode {
		&self.mode
	}

	/// Returns `true` when the broker was enabled at startup.
	pub fn is_broker_enabled(&self) -> bool {
		self.mode.is_enabled()
	}

	/// Identity broker wrapper.
	pub fn identity(&self) -> &Arc<IdentityBroker> {
		&self.identity
	}

	/// Local token holder.
	pub fn holder(&self) -> &Arc<LocalTokenHolder> {
		&self.holder
	}

	/// Credential resolver sharing this context's handles.
	pub fn resolver(&self) -> CredentialResolver {
		CredentialResolver::new(self.identity.broker().clone(), self.holder.clone())
	}

	/// Navigation gate redirecting through `navigator`.
	pub fn guard(&self, navigator: Arc<dyn Navigator>) -> NavigationGuard {
		NavigationGuard::with_identity(self.identity.clone(), self.holder.clone(), navigator)
	}

	/// Request interceptor using `policy`.
	#[cfg(feature = "reqwest")]
	pub fn interceptor(&self, policy: HeaderPolicy) -> BearerInterceptor {
		BearerInterceptor::new(self.resolver()).with_policy(policy)
	}

	/// API client dispatching through `handler` with the default header policy.
	#[cfg(feature = "reqwest")]
	pub fn authorized_client<H>(&self, handler: H) -> Result<AuthorizedClient<H>>
	where
		H: RequestHandler,
	{
		Ok(AuthorizedClient::new(
			handler,
			self.interceptor(HeaderPolicy::default()),
			self.environment.api_base()?,
		))
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{_preludet::*, broker::MemoryBrokerClient, guard::RecordingNavigator};

	#[test]
	fn disabled_mode_never_calls_factory() {
		let context = AuthContext::new(disabled_environment(), |_| {
			panic!("Factory must not run when the broker is disabled.")
		})
		.expect("Disabled environment should build.");

		assert!(!context.is_broker_enabled());
		assert!(!context.identity().is_enabled());
	}

	#[test]
	fn factory_receives_resolved_settings() {
		let mut seen = None;
		let context = AuthContext::new(enabled_environment(), |settings| {
			seen = Some(settings.clone());

			Arc::new(MemoryBrokerClient::new()) as Arc<dyn BrokerClient>
		})
		.expect("Enabled environment should build.");

		assert!(context.is_broker_enabled());
		assert_eq!(seen.map(|settings| settings.client_id).as_deref(), Some("bsn"));
	}

	#[test]
	fn mode_is_fixed_at_startup() {
		let mut environment = disabled_environment();
		let context = AuthContext::new(environment.clone(), |_| {
			Arc::new(MemoryBrokerClient::new()) as Arc<dyn BrokerClient>
		})
		.expect("Disabled environment should build.");

		environment.broker_url = "https://sso.example.com".into();

		assert!(!context.is_broker_enabled());
		assert!(context.environment().broker_url.is_empty());
	}

	#[tokio::test]
	async fn bootstrap_shares_handles() {
		let client = Arc::new(
			MemoryBrokerClient::new()
				.with_token("B", OffsetDateTime::now_utc() + Duration::minutes(5)),
		);
		let (context, proceed) =
			AuthContext::bootstrap(enabled_environment(), |_| client.clone() as Arc<dyn BrokerClient>)
				.await
				.expect("Enabled environment should build.");

		assert!(proceed);

		let navigator = Arc::new(RecordingNavigator::default());
		let guard = context.guard(navigator.clone());

		assert!(guard.can_activate());

		client.expire_token();
		context.holder().set_token("L");

		assert!(!guard.can_activate());
		assert_eq!(
			context.resolver().resolve().as_ref().map(|token| token.expose().to_owned()),
			Some("B".to_owned())
		);
		assert_eq!(navigator.count(), 1);
	}
}
