//! # sso-directory-rest
//!
//! Remote directory adapter speaking the store's admin REST API.
//!
//! Implements the `sso-directory` provider traits over HTTP. Response
//! handling follows the store's status contract: a successful create
//! answers 201 with a `Location` header carrying the assigned id, a
//! uniqueness violation answers 409, a rejected payload answers 400, and
//! anything else is an unexpected, non-recoverable response.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod client;
pub mod config;

mod error;
mod group;
mod role;
mod user;

pub use client::RestDirectory;
pub use config::RestConfig;
