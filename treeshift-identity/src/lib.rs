//! Sign-in and member registration.
//!
//! An [`IdentityProvider`] turns a third-party credential into an
//! [`IdentityUser`]. [`AuthService`] keeps the signed-in session and makes
//! sure every member has a record in the members collection.

mod error;
mod nonce;
mod provider;
mod service;

pub use error::{IdentityError, IdentityResult};
pub use nonce::{DEFAULT_NONCE_LENGTH, NONCE_CHARSET, generate_nonce, sha256_hex};
pub use provider::{
    IdentityConfig, IdentityProvider, IdentityUser, RestIdentityProvider, SignInCredential,
};
pub use service::{AuthService, MemberConfig, MemberProfile};
