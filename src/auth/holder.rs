//! In-process holder for a backend-issued bearer token.

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Holds at most one backend-issued credential.
///
/// The holder is the authoritative source when no identity broker is configured and the
/// fallback source when the broker has no token of its own. Empty strings are treated as
/// absence so a cleared login form never produces `Authorization: Bearer `.
#[derive(Debug, Default)]
pub struct LocalTokenHolder(RwLock<Option<TokenSecret>>);
impl LocalTokenHolder {
	/// Creates a holder seeded with `token`.
	pub fn with_token(token: impl Into<TokenSecret>) -> Self {
		let holder = Self::default();

		holder.set_token(token);

		holder
	}

	/// Returns the held credential, if any.
	pub fn token(&self) -> Option<TokenSecret> {
		self.0.read().clone()
	}

	/// Returns `true` when a credential is held.
	pub fn has_token(&self) -> bool {
		self.0.read().is_some()
	}

	/// Stores `token`, replacing any previous credential.
	pub fn set_token(&self, token: impl Into<TokenSecret>) {
		*self.0.write() = token.into().present();
	}

	/// Drops the held credential and returns it.
	pub fn clear(&self) -> Option<TokenSecret> {
		self.0.write().take()
	}
}
