pub mod plex;
pub mod source;
pub mod sync_log;
