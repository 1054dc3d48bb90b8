//! [`crate::ports::plex::PlexClient`] implementations.

pub mod client;
pub mod dry_run;

pub use client::PlexHttpAdapter;
pub use dry_run::DryRunPlexClient;
