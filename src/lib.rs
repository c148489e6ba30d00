//! Bearer credential selection for API clients: one decision between an identity broker and a
//! locally held token, shared by navigation gates and outgoing request interceptors.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod broker;
pub mod config;
pub mod context;
pub mod error;
pub mod guard;
#[cfg(feature = "reqwest")] pub mod http;
#[cfg(feature = "reqwest")] pub mod intercept;
pub mod obs;
pub mod resolve;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for tests; enabled via `cfg(test)` or the `test` crate
	//! feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		auth::LocalTokenHolder,
		broker::{Broker, MemoryBrokerClient},
		config::Environment,
	};

	/// Environment with the identity broker switched off.
	pub fn disabled_environment() -> Environment {
		Environment {
			api_url: "https://api.example.com/api/v1".into(),
			..Environment::default()
		}
	}

	/// Environment pointing at a local identity broker.
	pub fn enabled_environment() -> Environment {
		Environment {
			api_url: "https://api.example.com/api/v1".into(),
			broker_url: "https://sso.example.com".into(),
			broker_realm: "book-social-network".into(),
			broker_client_id: "bsn".into(),
			..Environment::default()
		}
	}

	/// Builds an enabled [`Broker`] backed by the provided in-memory client.
	pub fn memory_broker(client: &Arc<MemoryBrokerClient>) -> Broker {
		Broker::enabled(client.clone())
	}

	/// Builds a local holder, optionally seeded with a token.
	pub fn holder_with(token: Option<&str>) -> Arc<LocalTokenHolder> {
		let holder = Arc::new(LocalTokenHolder::default());

		if let Some(value) = token {
			holder.set_token(value);
		}

		holder
	}
}

mod _prelude {
	pub use std::{
		collections::BTreeSet,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::Result;
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {httpmock as _, tracing_subscriber as _};
