//! # sso-directory
//!
//! Provider traits for the remote directory service.
//!
//! The directory is an external collaborator reached over the network: it
//! stores groups, users and roles with free-form string attributes, answers
//! single-predicate attribute queries, and signals outcomes through a small
//! status set (created-with-location, conflict, anything-else). This crate
//! pins down that contract:
//!
//! - [`GroupDirectory`] - group hierarchy and membership
//! - [`UserDirectory`] - user lifecycle, credentials, actions
//! - [`RoleDirectory`] - realm-level roles and assignments
//! - [`Directory`] - the combined contract services program against
//! - [`MemoryDirectory`] - thread-safe in-memory implementation for tests
//!   and local development

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod error;
pub mod group;
pub mod memory;
pub mod role;
pub mod user;

pub use error::{DirectoryError, DirectoryResult};
pub use group::GroupDirectory;
pub use memory::MemoryDirectory;
pub use role::RoleDirectory;
pub use user::UserDirectory;

/// The full remote-directory contract, composed from the per-entity traits.
///
/// Services hold a single `Arc<dyn Directory>`; any type implementing the
/// three entity traits satisfies it via the blanket impl.
pub trait Directory: GroupDirectory + UserDirectory + RoleDirectory {}

impl<T: GroupDirectory + UserDirectory + RoleDirectory> Directory for T {}
