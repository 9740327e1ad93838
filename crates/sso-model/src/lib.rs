//! # sso-model
//!
//! Domain and wire models for the account/identity directory layer.
//!
//! The remote directory service only understands generic groups and users
//! with free-form, multi-valued string attributes. This crate defines:
//!
//! - the directory entity representations ([`User`], [`Group`], [`Role`])
//!   that match the remote admin API's JSON,
//! - the decoded domain views ([`Account`], [`Identity`]),
//! - the typed attribute projection ([`Attributes`] plus the well-known
//!   names in [`attribute::names`]),
//! - the partial-update merge semantics ([`UpdateMode`], [`patch`],
//!   [`patch_attribute`]),
//! - the derived lifecycle state ([`IdentityState`]),
//! - and the compact role-set encoding ([`BinaryRights`]).

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod account;
pub mod attribute;
pub mod credential;
pub mod group;
pub mod identity;
pub mod rights;
pub mod role;
pub mod state;
pub mod update;
pub mod user;

pub use account::Account;
pub use attribute::{AccountProperty, Attributes, IdentityProperty};
pub use credential::{ClientRedirect, Credentials, RequiredAction};
pub use group::Group;
pub use identity::{Identity, LoginInfo};
pub use rights::BinaryRights;
pub use role::Role;
pub use state::IdentityState;
pub use update::{patch, patch_attribute, AttributePatch, UpdateMode};
pub use user::User;
