//! # keliling-auth
//!
//! Verification of bearer access tokens issued by the hosted auth service,
//! plus an encoder for minting equivalent tokens in development and tests.
//!
//! ## Modules
//!
//! - `jwt`: claims, HS256 decoding (implements
//!   [`TokenVerifier`](keliling_core::traits::TokenVerifier)) and encoding

pub mod jwt;

pub use jwt::{Claims, JwtDecoder, JwtEncoder};
