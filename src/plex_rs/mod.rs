//! Thin async bindings for the Plex Media Server endpoints used by the sync.
//!
//! Docs:
//! https://developer.plex.tv/pms/#section/API-Info/Authenticating-with-Plex
//!
//! Every call takes the server base URL and a user token and sends the token as
//! `X-Plex-Token`. JSON is requested with `Accept: application/json`.

pub mod library;
pub mod playlist;
pub mod rating;
