//! Bearer-token verification for socket upgrades.

mod error;
mod token;

pub use error::TokenError;
pub use token::{HmacTokenVerifier, TokenVerifier, VerifiedUser};
