//! # Quillpress Auth
//!
//! Bearer-token authentication for the Quillpress API.
//!
//! - [`claims`]: the [`AuthPayload`] identity and the JWT [`Claims`] around it
//! - [`jwt`]: issuing and verifying tokens
//!
//! # Example
//!
//! ```ignore
//! use quillpress_auth::{AuthPayload, create_token, verify_token};
//! use quillpress_config::JwtConfig;
//!
//! let config = JwtConfig::from_env();
//! let token = create_token(&payload, &config)?;
//! let caller: AuthPayload = verify_token(&token, &config)?;
//! ```

pub mod claims;
pub mod jwt;

pub use claims::{AuthPayload, Claims};
pub use jwt::{TokenError, create_token, create_token_with_ttl, verify_token, verify_with_secret};
