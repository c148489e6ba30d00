//! Credential primitives: redacted secrets, the local token holder, broker user profiles, and
//! granted authorities derived from token claims.

pub mod authority;
pub mod holder;
pub mod profile;
pub mod secret;

pub use authority::*;
pub use holder::*;
pub use profile::*;
pub use secret::*;
