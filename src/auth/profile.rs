//! Broker-sourced identity record.

// self
use crate::{_prelude::*, auth::TokenSecret};

/// User profile loaded from the identity broker after a successful login.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
	/// Broker subject identifier.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub id: Option<String>,
	/// Login name.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub username: Option<String>,
	/// Primary e-mail address.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub email: Option<String>,
	/// Given name.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub first_name: Option<String>,
	/// Family name.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub last_name: Option<String>,
	/// Whether the broker verified the e-mail address.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub email_verified: Option<bool>,
	/// Broker token current when the profile was loaded; never serialized.
	#[serde(skip)]
	pub token: Option<TokenSecret>,
}
impl UserProfile {
	/// Returns `"First Last"`, falling back to the username.
	pub fn display_name(&self) -> Option<String> {
		match (self.first_name.as_deref(), self.last_name.as_deref()) {
			(Some(first), Some(last)) => Some(format!("{first} {last}")),
			(Some(name), None) | (None, Some(name)) => Some(name.to_owned()),
			(None, None) => self.username.clone(),
		}
	}

	/// Returns a copy stamped with `token`.
	pub fn with_token(mut self, token: Option<TokenSecret>) -> Self {
		self.token = token;

		self
	}
}
