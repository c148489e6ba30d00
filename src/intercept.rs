//! Outgoing request augmentation with the resolved bearer credential.
//!
//! The interceptor sets at most one `Authorization: Bearer <token>` header and forwards the
//! request to the next pipeline stage exactly once. The response is returned untouched.
//! Tokens are never logged; only the source that supplied them is recorded.

// crates.io
use reqwest::{
	Request,
	header::{AUTHORIZATION, HeaderMap, HeaderValue},
};
// self
use crate::{
	_prelude::*,
	http::RequestHandler,
	obs::{self, AuthOutcome, AuthSpan, AuthStep},
	resolve::CredentialResolver,
};

/// How the interceptor treats headers already present on the request.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeaderPolicy {
	/// Keep existing headers and replace only `Authorization`.
	#[default]
	Preserve,
	/// Replace the whole header collection with the single `Authorization` header.
	///
	/// Matches clients that rebuild the header set when attaching credentials, which drops
	/// caller-set headers such as `Content-Type`.
	ReplaceAll,
}

/// Anything carrying a mutable header collection.
pub trait HeaderCarrier {
	/// Mutable access to the header collection.
	fn headers_mut(&mut self) -> &mut HeaderMap;
}
impl HeaderCarrier for Request {
	fn headers_mut(&mut self) -> &mut HeaderMap {
		Request::headers_mut(self)
	}
}
impl HeaderCarrier for HeaderMap {
	fn headers_mut(&mut self) -> &mut HeaderMap {
		self
	}
}

/// Attaches the resolved bearer credential to outgoing requests.
#[derive(Clone, Debug)]
pub struct BearerInterceptor {
	resolver: CredentialResolver,
	policy: HeaderPolicy,
}
impl BearerInterceptor {
	/// Creates an interceptor using [`HeaderPolicy::Preserve`].
	pub fn new(resolver: CredentialResolver) -> Self {
		Self { resolver, policy: HeaderPolicy::default() }
	}

	/// Overrides the header policy.
	pub fn with_policy(mut self, policy: HeaderPolicy) -> Self {
		self.policy = policy;

		self
	}

	/// Active header policy.
	pub fn policy(&self) -> HeaderPolicy {
		self.policy
	}

	/// Returns `request` with the credential attached, or unchanged when none is available.
	pub fn augment<R>(&self, mut request: R) -> R
	where
		R: HeaderCarrier,
	{
		let span = AuthSpan::new(AuthStep::Intercept, "augment");
		let _entered = span.enter();
		let Some((token, source)) = self.resolver.resolve_with_source() else {
			span.finish(AuthOutcome::Deny);

			return request;
		};

		span.record_source(source);

		match token.header_value() {
			Ok(value) => {
				apply(self.policy, request.headers_mut(), value);
				span.finish(AuthOutcome::Allow);
			},
			Err(e) => {
				obs::warn(
					AuthStep::Intercept,
					"Resolved credential is not a valid header value; sending the request unauthenticated.",
					&e,
				);
				span.finish(AuthOutcome::Deny);
			},
		}

		request
	}

	/// Augments `request` and passes it to `next` exactly once.
	pub async fn intercept<H>(&self, request: Request, next: &H) -> Result<H::Response, H::Error>
	where
		H: ?Sized + RequestHandler,
	{
		let request = self.augment(request);

		next.handle(request).await
	}
}

fn apply(policy: HeaderPolicy, headers: &mut HeaderMap, value: HeaderValue) {
	match policy {
		HeaderPolicy::Preserve => {
			headers.insert(AUTHORIZATION, value);
		},
		HeaderPolicy::ReplaceAll => {
			let mut replaced = HeaderMap::with_capacity(1);

			replaced.insert(AUTHORIZATION, value);

			*headers = replaced;
		},
	}
}
