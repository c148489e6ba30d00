//! In-process [`BrokerClient`] implementation for local development and tests.

// self
use crate::{
	_prelude::*,
	auth::{TokenSecret, UserProfile},
	broker::{BrokerClient, BrokerError, BrokerFuture, InitOptions},
};

/// Scripted result of [`BrokerClient::init`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InitBehavior {
	/// Report an authenticated session.
	Authenticated,
	/// Report an unauthenticated session.
	Unauthenticated,
	/// Fail as if the broker were unreachable.
	Fail {
		/// Message carried by the resulting [`BrokerError::Unavailable`].
		message: String,
	},
}

/// Calls observed by a [`MemoryBrokerClient`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MemoryCalls {
	/// Number of `init` calls.
	pub init: usize,
	/// Options passed to the most recent `init` call.
	pub last_init_options: Option<InitOptions>,
	/// Number of `login` calls.
	pub login: usize,
	/// Redirect targets passed to each `logout` call.
	pub logout_redirects: Vec<Option<Url>>,
}

#[derive(Clone, Debug)]
struct IssuedToken {
	secret: TokenSecret,
	expires_at: OffsetDateTime,
}

/// Broker client that keeps its session in memory.
///
/// Tokens keep being returned by [`BrokerClient::token`] after they expire, matching broker
/// clients that hold the last issued token until a refresh replaces it. A missing token counts
/// as expired.
#[derive(Debug)]
pub struct MemoryBrokerClient {
	init_behavior: InitBehavior,
	profile: Option<UserProfile>,
	login_token: Option<IssuedToken>,
	token: RwLock<Option<IssuedToken>>,
	calls: Mutex<MemoryCalls>,
}
impl MemoryBrokerClient {
	/// Creates a client whose `init` reports an authenticated session.
	pub fn new() -> Self {
		Self {
			init_behavior: InitBehavior::Authenticated,
			profile: None,
			login_token: None,
			token: RwLock::new(None),
			calls: Mutex::new(MemoryCalls::default()),
		}
	}

	/// Seeds the client with a token valid until `expires_at`.
	pub fn with_token(self, token: impl Into<TokenSecret>, expires_at: OffsetDateTime) -> Self {
		self.set_token(token, expires_at);

		self
	}

	/// Sets the profile returned by `load_user_profile`.
	pub fn with_profile(mut self, profile: UserProfile) -> Self {
		self.profile = Some(profile);

		self
	}

	/// Sets the token issued by each `login` call.
	pub fn with_login_token(
		mut self,
		token: impl Into<TokenSecret>,
		expires_at: OffsetDateTime,
	) -> Self {
		self.login_token = Some(IssuedToken { secret: token.into(), expires_at });

		self
	}

	/// Makes `init` report an unauthenticated session.
	pub fn unauthenticated(mut self) -> Self {
		self.init_behavior = InitBehavior::Unauthenticated;

		self
	}

	/// Makes `init` fail with [`BrokerError::Unavailable`].
	pub fn failing_init(mut self, message: impl Into<String>) -> Self {
		self.init_behavior = InitBehavior::Fail { message: message.into() };

		self
	}

	/// Replaces the current token.
	pub fn set_token(&self, token: impl Into<TokenSecret>, expires_at: OffsetDateTime) {
		*self.token.write() = Some(IssuedToken { secret: token.into(), expires_at });
	}

	/// Moves the current token's expiry into the past.
	pub fn expire_token(&self) {
		if let Some(issued) = self.token.write().as_mut() {
			issued.expires_at = OffsetDateTime::now_utc() - Duration::seconds(1);
		}
	}

	/// Drops the current token.
	pub fn clear_token(&self) {
		self.token.write().take();
	}

	/// Returns a snapshot of the calls observed so far.
	pub fn calls(&self) -> MemoryCalls {
		self.calls.lock().clone()
	}

	/// Returns `true` when the token is missing or expired at `instant`.
	pub fn is_token_expired_at(&self, instant: OffsetDateTime) -> bool {
		self.token.read().as_ref().is_none_or(|issued| instant >= issued.expires_at)
	}
}
impl Default for MemoryBrokerClient {
	fn default() -> Self {
		Self::new()
	}
}
impl BrokerClient for MemoryBrokerClient {
	fn init<'a>(&'a self, options: &'a InitOptions) -> BrokerFuture<'a, bool> {
		Box::pin(async move {
			{
				let mut calls = self.calls.lock();

				calls.init += 1;
				calls.last_init_options = Some(options.clone());
			}

			match &self.init_behavior {
				InitBehavior::Authenticated => Ok(true),
				InitBehavior::Unauthenticated => Ok(false),
				InitBehavior::Fail { message } =>
					Err(BrokerError::Unavailable { message: message.clone() }),
			}
		})
	}

	fn login(&self) -> BrokerFuture<'_, ()> {
		Box::pin(async move {
			self.calls.lock().login += 1;

			if let Some(issued) = self.login_token.clone() {
				*self.token.write() = Some(issued);
			}

			Ok(())
		})
	}

	fn logout<'a>(&'a self, redirect_uri: Option<&'a Url>) -> BrokerFuture<'a, ()> {
		Box::pin(async move {
			self.calls.lock().logout_redirects.push(redirect_uri.cloned());
			self.token.write().take();

			Ok(())
		})
	}

	fn load_user_profile(&self) -> BrokerFuture<'_, UserProfile> {
		Box::pin(async move {
			if self.token.read().is_none() {
				return Err(BrokerError::NotAuthenticated);
			}

			Ok(self.profile.clone().unwrap_or_default())
		})
	}

	fn token(&self) -> Option<TokenSecret> {
		self.token.read().as_ref().map(|issued| issued.secret.clone())
	}

	fn is_token_expired(&self) -> bool {
		self.is_token_expired_at(OffsetDateTime::now_utc())
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	#[test]
	fn expiry_tracks_token_lifetime() {
		let expires = macros::datetime!(2025-01-01 01:00 UTC);
		let client = MemoryBrokerClient::new().with_token("B", expires);

		assert!(!client.is_token_expired_at(macros::datetime!(2025-01-01 00:59 UTC)));
		assert!(client.is_token_expired_at(expires));
		assert_eq!(client.token().as_ref().map(TokenSecret::expose), Some("B"));

		client.clear_token();

		assert!(client.is_token_expired_at(macros::datetime!(2025-01-01 00:00 UTC)));
	}

	#[test]
	fn expired_token_is_still_reported() {
		let client = MemoryBrokerClient::new()
			.with_token("B", OffsetDateTime::now_utc() + Duration::minutes(5));

		assert!(!client.is_token_expired());

		client.expire_token();

		assert!(client.is_token_expired());
		assert!(client.token().is_some());
	}

	#[tokio::test]
	async fn login_issues_scripted_token() {
		let client = MemoryBrokerClient::new()
			.with_login_token("fresh", OffsetDateTime::now_utc() + Duration::minutes(5));

		assert!(matches!(client.load_user_profile().await, Err(BrokerError::NotAuthenticated)));

		client.login().await.expect("Memory login should succeed.");

		assert_eq!(client.calls().login, 1);
		assert_eq!(client.token().as_ref().map(TokenSecret::expose), Some("fresh"));
		assert!(client.load_user_profile().await.is_ok());
	}

	#[tokio::test]
	async fn init_records_options_and_scripted_failure() {
		let client = MemoryBrokerClient::new().failing_init("dns failure");
		let options = InitOptions { on_load: crate::broker::OnLoad::CheckSso };
		let err = client.init(&options).await.expect_err("Scripted init should fail.");

		assert!(err.to_string().contains("dns failure"));
		assert_eq!(client.calls().last_init_options, Some(options));
	}
}
