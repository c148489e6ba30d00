// std
use std::sync::Arc;
// crates.io
use httpmock::prelude::*;
use time::{Duration, OffsetDateTime};
// self
use bearer_gate::{
	auth::LocalTokenHolder,
	broker::{Broker, MemoryBrokerClient},
	http::{AuthorizedClient, ReqwestHttpClient},
	intercept::{BearerInterceptor, HeaderPolicy},
	reqwest::{
		Method,
		header::{CONTENT_TYPE, HeaderValue},
	},
	resolve::CredentialResolver,
	url::Url,
};

fn holder(token: Option<&str>) -> Arc<LocalTokenHolder> {
	let holder = Arc::new(LocalTokenHolder::default());

	if let Some(value) = token {
		holder.set_token(value);
	}

	holder
}

fn client_for(
	server: &MockServer,
	broker: Broker,
	local: Option<&str>,
	policy: HeaderPolicy,
) -> AuthorizedClient {
	let base = Url::parse(&server.url("/api/v1/")).expect("Mock server URL should parse.");
	let interceptor =
		BearerInterceptor::new(CredentialResolver::new(broker, holder(local))).with_policy(policy);

	AuthorizedClient::new(ReqwestHttpClient::default(), interceptor, base)
}

fn live_broker(token: &str) -> Broker {
	Broker::enabled(Arc::new(
		MemoryBrokerClient::new().with_token(token, OffsetDateTime::now_utc() + Duration::minutes(5)),
	))
}

#[tokio::test]
async fn local_token_reaches_the_api() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/v1/books").header("authorization", "Bearer T");
			then.status(200);
		})
		.await;
	let client = client_for(&server, Broker::Disabled, Some("T"), HeaderPolicy::Preserve);
	let response =
		client.send(Method::GET, "books").await.expect("Authorized request should succeed.");

	assert_eq!(response.status().as_u16(), 200);

	mock.assert_async().await;
}

#[tokio::test]
async fn broker_token_wins_over_local_token() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/v1/books").header("authorization", "Bearer B");
			then.status(200);
		})
		.await;
	let client = client_for(&server, live_broker("B"), Some("L"), HeaderPolicy::Preserve);

	client.send(Method::GET, "/books").await.expect("Authorized request should succeed.");

	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn missing_credential_sends_request_unmodified() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/v1/books").header_missing("authorization");
			then.status(401);
		})
		.await;
	let client = client_for(
		&server,
		Broker::enabled(Arc::new(MemoryBrokerClient::new())),
		None,
		HeaderPolicy::Preserve,
	);
	let response = client
		.send(Method::GET, "books")
		.await
		.expect("Unauthenticated request should still be dispatched.");

	assert_eq!(response.status().as_u16(), 401);

	mock.assert_async().await;
}

#[tokio::test]
async fn preserve_policy_keeps_content_type() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/api/v1/books")
				.header("authorization", "Bearer T")
				.header("content-type", "application/json");
			then.status(201);
		})
		.await;
	let client = client_for(&server, Broker::Disabled, Some("T"), HeaderPolicy::Preserve);
	let mut request =
		client.request(Method::POST, "books").expect("Request should build below the base URL.");

	request.headers_mut().insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

	let response = client.execute(request).await.expect("Authorized request should succeed.");

	assert_eq!(response.status().as_u16(), 201);

	mock.assert_async().await;
}

#[tokio::test]
async fn replace_all_policy_drops_content_type() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/api/v1/books")
				.header("authorization", "Bearer T")
				.header_missing("content-type");
			then.status(201);
		})
		.await;
	let client = client_for(&server, Broker::Disabled, Some("T"), HeaderPolicy::ReplaceAll);
	let mut request =
		client.request(Method::POST, "books").expect("Request should build below the base URL.");

	request.headers_mut().insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
	client.execute(request).await.expect("Authorized request should succeed.");

	mock.assert_async().await;
}
