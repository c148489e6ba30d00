//! Bearer credential that never leaves the crate in readable form except as a header value.

// crates.io
#[cfg(feature = "reqwest")] use reqwest::header::{HeaderValue, InvalidHeaderValue};
// self
use crate::_prelude::*;

/// Bearer credential presented to the protected API.
///
/// Formatting always redacts the value and the type is deliberately not serializable, so a
/// credential cannot end up in logs or persisted payloads by accident. An empty string is a
/// valid [`TokenSecret`] but never a usable one; [`present`](Self::present) filters it out.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenSecret(String);
impl TokenSecret {
	/// Wraps a raw credential string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns `None` when the credential is empty, which every source treats as absent.
	pub fn present(self) -> Option<Self> {
		if self.0.is_empty() { None } else { Some(self) }
	}

	/// Returns the raw credential. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}

	/// Builds the sensitive `Bearer <token>` value for the `Authorization` header.
	///
	/// Fails when the credential contains bytes that are not allowed in a header value.
	#[cfg(feature = "reqwest")]
	pub fn header_value(&self) -> Result<HeaderValue, InvalidHeaderValue> {
		let mut value = HeaderValue::try_from(format!("Bearer {}", self.0))?;

		value.set_sensitive(true);

		Ok(value)
	}
}
impl From<&str> for TokenSecret {
	fn from(value: &str) -> Self {
		Self::new(value)
	}
}
impl From<String> for TokenSecret {
	fn from(value: String) -> Self {
		Self(value)
	}
}
impl Debug for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("TokenSecret(<redacted>)")
	}
}
impl Display for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}
