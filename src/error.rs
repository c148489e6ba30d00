//! Crate-level error types shared across configuration, broker, and transport layers.
//!
//! Navigation gates and request interceptors never surface these errors: a missing credential
//! is a normal negative outcome there. Errors only escape from configuration loading, explicit
//! broker calls, and the authorized HTTP client.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

pub(crate) type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Identity broker failure.
	#[error("{0}")]
	Broker(
		#[from]
		#[source]
		crate::broker::BrokerError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Token claims could not be decoded.
	#[error(transparent)]
	Claims(#[from] crate::auth::ClaimsError),
}

/// Configuration and validation failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// A configured URL cannot be parsed.
	#[error("Setting `{setting}` is not a valid URL.")]
	InvalidUrl {
		/// Name of the offending setting.
		setting: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// A configured URL uses a scheme other than HTTP(S).
	#[error("Setting `{setting}` must use http or https: {url}.")]
	UnsupportedScheme {
		/// Name of the offending setting.
		setting: &'static str,
		/// URL that failed validation.
		url: String,
	},
	/// A request path cannot be joined onto the API base URL.
	#[error("Path `{path}` cannot be joined onto the API base URL.")]
	InvalidApiPath {
		/// Path supplied by the caller.
		path: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// The API base URL was left empty.
	#[error("Setting `api_url` is required.")]
	MissingApiUrl,
	/// A boolean environment variable holds an unrecognized value.
	#[error("Environment variable `{variable}` must be a boolean, got `{value}`.")]
	InvalidFlag {
		/// Environment variable name.
		variable: &'static str,
		/// Raw value that failed to parse.
		value: String,
	},
	/// Environment JSON could not be parsed.
	#[error("Environment JSON is malformed.")]
	EnvironmentParse {
		/// Structured parsing failure including the offending path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Environment file could not be read.
	#[error("Environment file could not be read.")]
	EnvironmentRead(#[from] std::io::Error),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the API.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the API.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}
