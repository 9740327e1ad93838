//! # sso-service
//!
//! Account and identity management layered on a generic remote directory.
//!
//! The directory natively understands only groups, users, free-form string
//! attributes and single-predicate equality queries. This crate supplies
//! the domain logic on top:
//!
//! - [`AccountService`] - accounts as subgroups of a master group, keyed by
//!   the `accountNumber` attribute
//! - [`IdentityService`] - identity lifecycle, duplicate resolution,
//!   credentials, required actions and role updates
//! - [`IdentitySearch`] - compound attribute search emulated over the
//!   store's single-predicate index
//! - [`RightsService`] - the cached binary encoding of assigned role sets
//! - [`codec`] - the attribute encoding between directory entities and
//!   domain views
//!
//! Operations are synchronous request/response from the caller's view; one
//! logical operation issues sequential directory calls with no internal
//! retry and no cross-operation atomicity. Uniqueness checks beyond the
//! store's native username constraint are check-then-act and can race; see
//! [`IdentityService::create_identity`].

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod account;
pub mod codec;
pub mod error;
pub mod identity;
pub mod rights;
pub mod search;

pub use account::{AccountService, MASTER_GROUP};
pub use error::{Error, Result};
pub use identity::IdentityService;
pub use rights::RightsService;
pub use search::IdentitySearch;
