//! Resolvers - pure functions over already-fetched backend data.
//!
//! Inputs that are still loading are passed as `None`; every resolver that
//! accepts an `Option` reports that as its own state instead of guessing.

mod compare;
mod routing;
mod version;

pub use compare::{is_newer_version, updates_available};
pub use routing::{
    display_name, effective_handler, has_conflict, is_published_identifier, resolve_handler,
    routing_table, sort_candidates, sorted_resource_names, Handler, HandlerSource, RoutingRow,
};
pub use version::{
    effective_default_version, resolve_app_versions, resolve_effective_version, track_warnings,
    Resolution, ResolutionSource, TrackWarning, VersionState,
};
