//! Environment settings and identity broker mode derivation.
//!
//! [`Environment`] mirrors the settings a deployment provides (API base URL plus the broker
//! URL, realm, and client id). [`BrokerMode`] is derived from it exactly once at startup: an
//! empty broker URL disables the broker for the lifetime of the process, and nothing reads the
//! raw setting again afterwards.
//!
//! Settings can be loaded from JSON (camelCase keys, with the legacy `keycloak*` names
//! accepted as aliases) or from environment variables:
//!
//! | Variable           | Field              |
//! |--------------------|--------------------|
//! | `API_URL`          | `api_url`          |
//! | `BROKER_URL`       | `broker_url`       |
//! | `BROKER_REALM`     | `broker_realm`     |
//! | `BROKER_CLIENT_ID` | `broker_client_id` |
//! | `APP_ORIGIN`       | `app_origin`       |
//! | `APP_PRODUCTION`   | `production`       |

// std
use std::path::Path;
// self
use crate::{_prelude::*, error::ConfigError};

/// Realm used when the broker is enabled without an explicit realm.
pub const DEFAULT_BROKER_REALM: &str = "book-social-network";
/// Client id used when the broker is enabled without an explicit client id.
pub const DEFAULT_BROKER_CLIENT_ID: &str = "bsn";

/// Deployment settings read once at process start.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Environment {
	/// Marks production builds.
	pub production: bool,
	/// Base URL of the protected API.
	pub api_url: String,
	/// Identity broker base URL; empty disables the broker.
	#[serde(alias = "keycloakUrl")]
	pub broker_url: String,
	/// Identity broker realm.
	#[serde(alias = "keycloakRealm")]
	pub broker_realm: String,
	/// Client identifier registered with the broker.
	#[serde(alias = "keycloakClientId")]
	pub broker_client_id: String,
	/// Application origin used as the post-logout redirect target.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub app_origin: Option<String>,
}
impl Environment {
	/// Reads settings from process environment variables.
	pub fn from_env() -> Result<Self> {
		Self::from_lookup(|key| std::env::var(key).ok())
	}

	/// Reads settings through `lookup`, which maps a variable name to its value.
	pub fn from_lookup<F>(lookup: F) -> Result<Self>
	where
		F: Fn(&str) -> Option<String>,
	{
		let production = match lookup("APP_PRODUCTION") {
			Some(raw) => parse_flag("APP_PRODUCTION", &raw)?,
			None => false,
		};

		Ok(Self {
			production,
			api_url: lookup("API_URL").unwrap_or_default(),
			broker_url: lookup("BROKER_URL").unwrap_or_default(),
			broker_realm: lookup("BROKER_REALM").unwrap_or_default(),
			broker_client_id: lookup("BROKER_CLIENT_ID").unwrap_or_default(),
			app_origin: lookup("APP_ORIGIN").filter(|value| !value.trim().is_empty()),
		})
	}

	/// Parses settings from a JSON document.
	pub fn from_json_str(raw: &str) -> Result<Self> {
		let de = &mut serde_json::Deserializer::from_str(raw);

		serde_path_to_error::deserialize(de)
			.map_err(|source| ConfigError::EnvironmentParse { source }.into())
	}

	/// Reads and parses a JSON settings file.
	pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
		let raw = std::fs::read_to_string(path).map_err(ConfigError::from)?;

		Self::from_json_str(&raw)
	}

	/// Returns `true` when a broker URL is configured.
	pub fn broker_configured(&self) -> bool {
		!self.broker_url.trim().is_empty()
	}

	/// Derives the broker mode, validating the broker URL when one is configured.
	pub fn broker_mode(&self) -> Result<BrokerMode> {
		if !self.broker_configured() {
			return Ok(BrokerMode::Disabled);
		}

		Ok(BrokerMode::Enabled(BrokerSettings::new(
			parse_http_url("broker_url", self.broker_url.trim())?,
			&self.broker_realm,
			&self.broker_client_id,
		)))
	}

	/// Parses the API base URL, normalizing it to end with `/` so relative paths join below it.
	pub fn api_base(&self) -> Result<Url> {
		let raw = self.api_url.trim();

		if raw.is_empty() {
			return Err(ConfigError::MissingApiUrl.into());
		}

		let mut url = parse_http_url("api_url", raw)?;

		if !url.path().ends_with('/') {
			let path = format!("{}/", url.path());

			url.set_path(&path);
		}

		Ok(url)
	}

	/// Parses the optional application origin.
	pub fn app_origin(&self) -> Result<Option<Url>> {
		self.app_origin
			.as_deref()
			.map(str::trim)
			.filter(|raw| !raw.is_empty())
			.map(|raw| parse_http_url("app_origin", raw))
			.transpose()
	}
}

/// Connection parameters for an enabled identity broker.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrokerSettings {
	/// Broker base URL.
	pub url: Url,
	/// Broker realm.
	pub realm: String,
	/// Client identifier registered with the broker.
	pub client_id: String,
}
impl BrokerSettings {
	/// Builds settings, substituting the defaults for blank realm or client id values.
	pub fn new(url: Url, realm: &str, client_id: &str) -> Self {
		Self {
			url,
			realm: non_blank_or(realm, DEFAULT_BROKER_REALM),
			client_id: non_blank_or(client_id, DEFAULT_BROKER_CLIENT_ID),
		}
	}
}

/// Process-wide broker toggle derived once from [`Environment`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BrokerMode {
	/// No broker configured; the local token holder is authoritative.
	Disabled,
	/// Broker configured with the provided settings.
	Enabled(BrokerSettings),
}
impl BrokerMode {
	/// Returns `true` for [`BrokerMode::Enabled`].
	pub fn is_enabled(&self) -> bool {
		matches!(self, Self::Enabled(_))
	}

	/// Returns the broker settings when enabled.
	pub fn settings(&self) -> Option<&BrokerSettings> {
		match self {
			Self::Enabled(settings) => Some(settings),
			Self::Disabled => None,
		}
	}
}

fn parse_http_url(setting: &'static str, raw: &str) -> Result<Url> {
	let url = Url::parse(raw).map_err(|source| ConfigError::InvalidUrl { setting, source })?;

	match url.scheme() {
		"http" | "https" => Ok(url),
		_ => Err(ConfigError::UnsupportedScheme { setting, url: url.to_string() }.into()),
	}
}

fn parse_flag(variable: &'static str, raw: &str) -> Result<bool> {
	match raw.trim().to_ascii_lowercase().as_str() {
		"1" | "true" | "yes" | "on" => Ok(true),
		"" | "0" | "false" | "no" | "off" => Ok(false),
		_ => Err(ConfigError::InvalidFlag { variable, value: raw.to_owned() }.into()),
	}
}

fn non_blank_or(value: &str, fallback: &str) -> String {
	let trimmed = value.trim();

	if trimmed.is_empty() { fallback.to_owned() } else { trimmed.to_owned() }
}
