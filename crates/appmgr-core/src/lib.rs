//! App Manager core - preference resolution for installed apps.
//!
//! This crate resolves which app version a user runs (from tracks, system
//! defaults and personal overrides), which installed app handles a routed
//! class, service or path, and whether a pending update is newer than what
//! is installed. It also provides the REST contract the resolvers consume,
//! a read-through query cache with mutation invalidation, and the
//! sequential bulk-upgrade runner.

pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod model;
pub mod permissions;
pub mod preference;
pub mod resolve;
pub mod upgrade;

pub use cache::{Loadable, Mutation, QueryKey, Session};
pub use client::{AppsApi, CredentialProvider, HttpClient};
pub use config::ClientConfig;
pub use error::ApiError;
pub use preference::{Scope, Selection};
pub use resolve::{
    effective_handler, has_conflict, is_newer_version, is_published_identifier,
    resolve_effective_version, Resolution, ResolutionSource,
};
pub use upgrade::{upgrade_all, BatchReport};
