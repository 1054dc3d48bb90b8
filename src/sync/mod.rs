//! Reconciliation of an iTunes library into a Plex music section.
//!
//! A run indexes the Plex tracks by [`key::MatchKey`], mirrors the user playlists
//! and then pushes track, album and artist ratings.

pub mod index;
pub mod key;
pub mod playlists;
pub mod ratings;
pub mod run;
