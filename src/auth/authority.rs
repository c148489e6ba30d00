//! Granted authorities derived from broker-issued token claims.
//!
//! Scopes from the `scope` (or `scp`) claim become `SCOPE_<scope>`. Client roles listed under
//! `resource_access.<client>.roles` become `ROLE_<role>` with dashes rewritten to underscores,
//! so `manage-books` surfaces as `ROLE_manage_books`. Claim shapes that do not match are
//! skipped rather than rejected.

// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use serde_json::Value;
// self
use crate::_prelude::*;

const SCOPE_PREFIX: &str = "SCOPE_";
const ROLE_PREFIX: &str = "ROLE_";
const SCOPE_CLAIMS: [&str; 2] = ["scope", "scp"];

/// Errors raised while decoding a compact JWT payload.
#[derive(Debug, ThisError)]
pub enum ClaimsError {
	/// The token does not have the `header.payload.signature` shape.
	#[error("Token is not a compact JWT.")]
	NotCompact,
	/// The payload segment is not valid base64url.
	#[error("Token payload is not valid base64url.")]
	Decode(#[from] base64::DecodeError),
	/// The payload segment is not a JSON object.
	#[error("Token payload is not valid JSON.")]
	Json(#[from] serde_json::Error),
}

/// Sorted, de-duplicated set of granted authorities.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Authorities(BTreeSet<String>);
impl Authorities {
	/// Collects scope and client-role authorities from decoded claims.
	pub fn from_claims(claims: &Value) -> Self {
		let mut set = BTreeSet::new();

		collect_scopes(claims, &mut set);
		collect_resource_roles(claims, &mut set);

		Self(set)
	}

	/// Decodes the payload segment of a compact JWT without verifying its signature.
	///
	/// Signature verification belongs to the API that receives the token; this helper only
	/// reads claims the broker already issued to this client.
	pub fn from_jwt(token: &str) -> Result<Self, ClaimsError> {
		let mut segments = token.split('.');
		let payload = match (segments.next(), segments.next(), segments.next(), segments.next()) {
			(Some(_), Some(payload), Some(_), None) if !payload.is_empty() => payload,
			_ => return Err(ClaimsError::NotCompact),
		};
		let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('='))?;
		let claims: Value = serde_json::from_slice(&bytes)?;

		Ok(Self::from_claims(&claims))
	}

	/// Returns `true` when `authority` was granted.
	pub fn contains(&self, authority: &str) -> bool {
		self.0.contains(authority)
	}

	/// Returns `true` when the client role `role` was granted.
	pub fn has_role(&self, role: &str) -> bool {
		self.0.contains(&role_authority(role))
	}

	/// Returns `true` when the scope `scope` was granted.
	pub fn has_scope(&self, scope: &str) -> bool {
		self.0.contains(&format!("{SCOPE_PREFIX}{scope}"))
	}

	/// Iterates authorities in sorted order.
	pub fn iter(&self) -> impl Iterator<Item = &str> {
		self.0.iter().map(String::as_str)
	}

	/// Number of granted authorities.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Returns `true` when nothing was granted.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

fn collect_scopes(claims: &Value, set: &mut BTreeSet<String>) {
	let Some(value) = SCOPE_CLAIMS.iter().find_map(|name| claims.get(name)) else {
		return;
	};

	let scopes: Vec<&str> = match value {
		Value::String(raw) => raw.split_whitespace().collect(),
		Value::Array(items) => items.iter().filter_map(Value::as_str).collect(),
		_ => return,
	};

	for scope in scopes {
		set.insert(format!("{SCOPE_PREFIX}{scope}"));
	}
}

fn collect_resource_roles(claims: &Value, set: &mut BTreeSet<String>) {
	let Some(Value::Object(resources)) = claims.get("resource_access") else {
		return;
	};

	for access in resources.values() {
		let Some(Value::Array(roles)) = access.get("roles") else {
			continue;
		};

		roles.iter().filter_map(Value::as_str).for_each(|role| {
			set.insert(role_authority(role));
		});
	}
}

fn role_authority(role: &str) -> String {
	format!("{ROLE_PREFIX}{}", role.replace('-', "_"))
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	// self
	use super::*;

	#[test]
	fn resource_roles_are_prefixed_and_normalized() {
		let claims = json!({
			"scope": "openid email",
			"resource_access": {
				"bsn": { "roles": ["manage-books", "reader"] },
				"account": { "roles": ["view-profile"] },
				"broken": { "roles": "not-a-list" },
				"skipped": "not-a-map"
			}
		});
		let authorities = Authorities::from_claims(&claims);
		let listed = authorities.iter().collect::<Vec<_>>();

		assert_eq!(
			listed,
			[
				"ROLE_manage_books",
				"ROLE_reader",
				"ROLE_view_profile",
				"SCOPE_email",
				"SCOPE_openid",
			]
		);
		assert!(authorities.has_role("manage-books"));
		assert!(authorities.has_scope("openid"));
	}

	#[test]
	fn missing_claims_yield_no_authorities() {
		assert!(Authorities::from_claims(&json!({ "sub": "f3a1" })).is_empty());
		assert!(Authorities::from_claims(&json!({ "resource_access": [] })).is_empty());
	}

	#[test]
	fn scp_array_is_accepted() {
		let authorities = Authorities::from_claims(&json!({ "scp": ["books.read"] }));

		assert_eq!(authorities.len(), 1);
		assert!(authorities.contains("SCOPE_books.read"));
	}

	#[test]
	fn jwt_payload_is_decoded() {
		let payload =
			URL_SAFE_NO_PAD.encode(br#"{"resource_access":{"bsn":{"roles":["admin"]}}}"#);
		let token = format!("eyJhbGciOiJub25lIn0.{payload}.sig");
		let authorities =
			Authorities::from_jwt(&token).expect("Well-formed JWT payload should decode.");

		assert!(authorities.has_role("admin"));
		assert!(matches!(Authorities::from_jwt("opaque-token"), Err(ClaimsError::NotCompact)));
		assert!(matches!(Authorities::from_jwt("a.!!.c"), Err(ClaimsError::Decode(_))));
	}
}
