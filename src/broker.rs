//! Identity broker boundary and the wrapper that owns its lifecycle.
//!
//! [`BrokerClient`] is the seam to a third-party identity provider: it owns token
//! acquisition, refresh, and expiry bookkeeping, none of which this crate reimplements.
//! [`Broker`] is the process-wide handle: either disabled, or enabled with a client that was
//! constructed once during startup. [`IdentityBroker`] wraps the handle with the init/login/
//! logout lifecycle and the loaded [`UserProfile`].
//!
//! Broker initialization failures are never fatal. A failed init is logged, counted, and
//! reported as "continue", after which the application runs as if the broker were absent for
//! the rest of the session: [`IdentityBroker::active_client`] reports no client, so the
//! navigation gate decides on the local holder again.

pub mod memory;

pub use memory::MemoryBrokerClient;

// self
use crate::{
	_prelude::*,
	auth::{TokenSecret, UserProfile},
	error::BoxError,
	obs::{self, AuthOutcome, AuthSpan, AuthStep},
};

/// Boxed future returned by [`BrokerClient`] operations.
pub type BrokerFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, BrokerError>> + 'a + Send>>;

/// Contract implemented by identity broker clients.
pub trait BrokerClient
where
	Self: Send + Sync,
{
	/// Initializes the client; resolves to whether the user is authenticated.
	fn init<'a>(&'a self, options: &'a InitOptions) -> BrokerFuture<'a, bool>;

	/// Starts an interactive login.
	fn login(&self) -> BrokerFuture<'_, ()>;

	/// Ends the broker session, optionally redirecting to `redirect_uri` afterwards.
	fn logout<'a>(&'a self, redirect_uri: Option<&'a Url>) -> BrokerFuture<'a, ()>;

	/// Loads the authenticated user's profile.
	fn load_user_profile(&self) -> BrokerFuture<'_, UserProfile>;

	/// Returns the current access token, if the client holds one.
	fn token(&self) -> Option<TokenSecret>;

	/// Returns `true` when the current token is expired or missing.
	///
	/// Reads already-loaded state; implementations must not contact the broker here.
	fn is_token_expired(&self) -> bool;
}

/// Errors surfaced by [`BrokerClient`] implementations.
#[derive(Debug, ThisError)]
pub enum BrokerError {
	/// Broker could not be reached.
	#[error("Identity broker is unavailable: {message}.")]
	Unavailable {
		/// Human-readable error payload.
		message: String,
	},
	/// Operation requires an authenticated session.
	#[error("Identity broker session is not authenticated.")]
	NotAuthenticated,
	/// Broker rejected the request or its configuration.
	#[error("Identity broker rejected the request: {reason}.")]
	Rejected {
		/// Broker-supplied reason string.
		reason: String,
	},
	/// Transport-specific failure raised by a client implementation.
	#[error("Identity broker transport failed.")]
	Transport {
		/// Underlying failure.
		#[source]
		source: BoxError,
	},
}
impl BrokerError {
	/// Wraps a client-specific transport failure.
	pub fn transport(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Transport { source: Box::new(src) }
	}
}

/// Page-load behavior requested during [`BrokerClient::init`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OnLoad {
	/// Redirect to the broker login page when no session exists.
	#[default]
	LoginRequired,
	/// Silently check for an existing session.
	CheckSso,
}

/// Options passed to [`BrokerClient::init`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitOptions {
	/// Page-load behavior.
	pub on_load: OnLoad,
}

/// Process-wide identity broker handle.
///
/// The enabled variant always carries a client, so call sites cannot observe an enabled
/// broker without one.
#[derive(Clone, Default)]
pub enum Broker {
	/// No broker configured.
	#[default]
	Disabled,
	/// Broker configured and its client constructed.
	Enabled {
		/// Shared broker client.
		client: Arc<dyn BrokerClient>,
	},
}
impl Broker {
	/// Wraps `client` in the enabled variant.
	pub fn enabled(client: Arc<dyn BrokerClient>) -> Self {
		Self::Enabled { client }
	}

	/// Returns `true` for [`Broker::Enabled`].
	pub fn is_enabled(&self) -> bool {
		matches!(self, Self::Enabled { .. })
	}

	/// Returns the client when enabled.
	pub fn client(&self) -> Option<&Arc<dyn BrokerClient>> {
		match self {
			Self::Enabled { client } => Some(client),
			Self::Disabled => None,
		}
	}
}
impl Debug for Broker {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::Disabled => f.write_str("Broker::Disabled"),
			Self::Enabled { .. } => f.write_str("Broker::Enabled(..)"),
		}
	}
}

/// Initialization state tracked by [`IdentityBroker`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InitState {
	/// `init` has not completed yet.
	Pending,
	/// Broker disabled; initialization was skipped.
	Skipped,
	/// Broker initialized with an authenticated session.
	Authenticated,
	/// Broker initialized without an authenticated session.
	Unauthenticated,
	/// Broker initialization failed; the session continues without it.
	FellBack,
}
impl InitState {
	/// Value reported to the startup sequence: `false` only when the broker explicitly
	/// reported an unauthenticated session.
	pub fn should_continue(self) -> bool {
		!matches!(self, Self::Unauthenticated)
	}
}

/// Identity broker wrapper owning the init/login/logout lifecycle.
pub struct IdentityBroker {
	broker: Broker,
	options: InitOptions,
	logout_redirect: Option<Url>,
	profile: RwLock<Option<UserProfile>>,
	state: RwLock<InitState>,
	init_lock: AsyncMutex<()>,
}
impl IdentityBroker {
	/// Creates a wrapper around `broker` using default init options.
	pub fn new(broker: Broker) -> Self {
		Self {
			broker,
			options: InitOptions::default(),
			logout_redirect: None,
			profile: RwLock::new(None),
			state: RwLock::new(InitState::Pending),
			init_lock: AsyncMutex::new(()),
		}
	}

	/// Overrides the options passed to the client's `init`.
	pub fn with_init_options(mut self, options: InitOptions) -> Self {
		self.options = options;

		self
	}

	/// Sets the URL the broker redirects to after logout.
	pub fn with_logout_redirect(mut self, redirect: Option<Url>) -> Self {
		self.logout_redirect = redirect;

		self
	}

	/// Underlying broker handle.
	pub fn broker(&self) -> &Broker {
		&self.broker
	}

	/// Returns `true` when a broker is configured.
	pub fn is_enabled(&self) -> bool {
		self.broker.is_enabled()
	}

	/// Profile loaded during a successful init, stamped with the token current at that time.
	pub fn profile(&self) -> Option<UserProfile> {
		self.profile.read().clone()
	}

	/// Current initialization state.
	pub fn init_state(&self) -> InitState {
		*self.state.read()
	}

	/// Client the navigation gate should consult.
	///
	/// `None` when the broker is disabled or its initialization failed; in both cases the
	/// session runs on the local holder alone.
	pub fn active_client(&self) -> Option<&Arc<dyn BrokerClient>> {
		match self.init_state() {
			InitState::FellBack => None,
			_ => self.broker.client(),
		}
	}

	/// Initializes the broker once and reports whether the application should continue.
	///
	/// Disabled brokers skip initialization. Failures (including profile loading) are logged
	/// as warnings and resolve to `true`; they are not retried, and later calls return the
	/// recorded outcome without contacting the client again.
	pub async fn init(&self) -> bool {
		const STEP: AuthStep = AuthStep::BrokerInit;

		let Broker::Enabled { client } = &self.broker else {
			obs::info(STEP, "Identity broker is disabled; using direct backend authentication.");
			obs::record_auth_outcome(STEP, AuthOutcome::Skipped);
			*self.state.write() = InitState::Skipped;

			return true;
		};
		let _serial = self.init_lock.lock().await;
		let current = self.init_state();

		if current != InitState::Pending {
			return current.should_continue();
		}

		let span = AuthSpan::new(STEP, "init");
		let state = span.instrument(self.run_init(client.as_ref())).await;

		span.finish(match state {
			InitState::Authenticated => AuthOutcome::Allow,
			InitState::Unauthenticated => AuthOutcome::Deny,
			_ => AuthOutcome::Fallback,
		});
		*self.state.write() = state;

		state.should_continue()
	}

	async fn run_init(&self, client: &dyn BrokerClient) -> InitState {
		let outcome = match client.init(&self.options).await {
			Ok(true) => client.load_user_profile().await.map(Some),
			Ok(false) => Ok(None),
			Err(e) => Err(e),
		};

		match outcome {
			Ok(Some(profile)) => {
				*self.profile.write() = Some(profile.with_token(client.token()));

				InitState::Authenticated
			},
			Ok(None) => InitState::Unauthenticated,
			Err(e) => {
				obs::warn(
					AuthStep::BrokerInit,
					"Identity broker initialization failed; falling back to direct backend authentication.",
					&e,
				);

				InitState::FellBack
			},
		}
	}

	/// Starts a broker login; a no-op when the broker is disabled.
	pub async fn login(&self) -> Result<()> {
		let Broker::Enabled { client } = &self.broker else {
			obs::info(AuthStep::Login, "Identity broker is disabled; login is handled by the backend.");
			obs::record_auth_outcome(AuthStep::Login, AuthOutcome::Skipped);

			return Ok(());
		};

		self.finish(AuthStep::Login, client.login().await)
	}

	/// Ends the broker session and clears the loaded profile; a no-op when disabled.
	pub async fn logout(&self) -> Result<()> {
		let Broker::Enabled { client } = &self.broker else {
			obs::info(AuthStep::Logout, "Identity broker is disabled; logout is handled by the backend.");
			obs::record_auth_outcome(AuthStep::Logout, AuthOutcome::Skipped);

			return Ok(());
		};
		let result = client.logout(self.logout_redirect.as_ref()).await;

		if result.is_ok() {
			self.profile.write().take();
		}

		self.finish(AuthStep::Logout, result)
	}

	fn finish(&self, step: AuthStep, result: Result<(), BrokerError>) -> Result<()> {
		match result {
			Ok(()) => {
				obs::record_auth_outcome(step, AuthOutcome::Allow);

				Ok(())
			},
			Err(e) => {
				obs::record_auth_outcome(step, AuthOutcome::Failure);

				Err(e.into())
			},
		}
	}
}
impl Debug for IdentityBroker {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("IdentityBroker")
			.field("broker", &self.broker)
			.field("state", &self.init_state())
			.field("profile_loaded", &self.profile.read().is_some())
			.finish()
	}
}
