//! Request pipeline primitives and the reqwest-backed authorized client.
//!
//! [`RequestHandler`] is the "next stage" the interceptor forwards to. The crate implements it
//! for [`ReqwestHttpClient`]; callers can implement it for their own stacks (a retry layer, a
//! recorder in tests) without losing the interceptor's guarantees.

// std
use std::ops::Deref;
// crates.io
use reqwest::{ClientBuilder, Method, Request, Response};
// self
use crate::{
	_prelude::*,
	error::{ConfigError, TransportError},
	intercept::BearerInterceptor,
};

/// Boxed future returned by [`RequestHandler::handle`].
pub type HandlerFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + 'a + Send>>;

/// Next stage in an outgoing request pipeline.
pub trait RequestHandler
where
	Self: Send + Sync,
{
	/// Value produced for a dispatched request.
	type Response: Send;
	/// Failure raised by the stage.
	type Error: 'static + Send + Sync + StdError;

	/// Dispatches `request`.
	fn handle(&self, request: Request) -> HandlerFuture<'_, Self::Response, Self::Error>;
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
#[derive(Clone, Debug, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	/// Builds the wrapped client from `builder`.
	pub fn from_builder(builder: ClientBuilder) -> Result<Self> {
		let client = builder.build().map_err(ConfigError::from)?;

		Ok(Self(client))
	}
}
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
impl Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
impl RequestHandler for ReqwestHttpClient {
	type Error = ReqwestError;
	type Response = Response;

	fn handle(&self, request: Request) -> HandlerFuture<'_, Self::Response, Self::Error> {
		let client = self.0.clone();

		Box::pin(async move { client.execute(request).await })
	}
}

/// API client that routes every request through a [`BearerInterceptor`].
#[derive(Clone, Debug)]
pub struct AuthorizedClient<H = ReqwestHttpClient>
where
	H: RequestHandler,
{
	handler: H,
	interceptor: BearerInterceptor,
	api_base: Url,
}
impl<H> AuthorizedClient<H>
where
	H: RequestHandler,
{
	/// Creates a client dispatching through `handler` below `api_base`.
	///
	/// `api_base` should end with `/`; [`Environment::api_base`](crate::config::Environment::api_base)
	/// normalizes it that way.
	pub fn new(handler: H, interceptor: BearerInterceptor, api_base: Url) -> Self {
		Self { handler, interceptor, api_base }
	}

	/// API base URL requests are resolved against.
	pub fn api_base(&self) -> &Url {
		&self.api_base
	}

	/// Interceptor applied to every request.
	pub fn interceptor(&self) -> &BearerInterceptor {
		&self.interceptor
	}

	/// Resolves `path` below the API base URL. A leading `/` is ignored.
	pub fn endpoint(&self, path: &str) -> Result<Url> {
		self.api_base.join(path.trim_start_matches('/')).map_err(|source| {
			ConfigError::InvalidApiPath { path: path.to_owned(), source }.into()
		})
	}

	/// Builds a body-less request for `path`.
	pub fn request(&self, method: Method, path: &str) -> Result<Request> {
		Ok(Request::new(method, self.endpoint(path)?))
	}

	/// Sends `request` through the interceptor and the handler.
	pub async fn execute(&self, request: Request) -> Result<H::Response> {
		self.interceptor
			.intercept(request, &self.handler)
			.await
			.map_err(|e| TransportError::network(e).into())
	}

	/// Builds and sends a body-less request for `path`.
	pub async fn send(&self, method: Method, path: &str) -> Result<H::Response> {
		let request = self.request(method, path)?;

		self.execute(request).await
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use reqwest::header::AUTHORIZATION;
	// self
	use super::*;
	use crate::{_preludet::*, broker::Broker, resolve::CredentialResolver};

	#[derive(Debug, ThisError)]
	#[error("Recorder never fails.")]
	struct Never;

	#[derive(Default)]
	struct Recorder(Mutex<Vec<(String, Option<String>)>>);
	impl RequestHandler for Recorder {
		type Error = Never;
		type Response = usize;

		fn handle(&self, request: Request) -> HandlerFuture<'_, Self::Response, Self::Error> {
			let auth = request
				.headers()
				.get(AUTHORIZATION)
				.and_then(|value| value.to_str().ok())
				.map(str::to_owned);
			let mut seen = self.0.lock();

			seen.push((request.url().to_string(), auth));

			let count = seen.len();

			Box::pin(async move { Ok(count) })
		}
	}

	fn client(token: Option<&str>) -> AuthorizedClient<Recorder> {
		let base = disabled_environment().api_base().expect("API base fixture should parse.");
		let interceptor =
			BearerInterceptor::new(CredentialResolver::new(Broker::Disabled, holder_with(token)));

		AuthorizedClient::new(Recorder::default(), interceptor, base)
	}

	#[test]
	fn endpoint_joins_below_base() {
		let client = client(None);

		assert_eq!(
			client.endpoint("/books/7").expect("Path should join.").as_str(),
			"https://api.example.com/api/v1/books/7"
		);
	}

	#[tokio::test]
	async fn next_stage_runs_once_per_request() {
		let client = client(Some("T"));
		let handled = client.send(Method::GET, "books").await.expect("Recorder never fails.");

		assert_eq!(handled, 1);
		assert_eq!(
			client.handler.0.lock().clone(),
			vec![(
				"https://api.example.com/api/v1/books".to_owned(),
				Some("Bearer T".to_owned())
			)]
		);
	}
}
