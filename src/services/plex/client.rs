use color_eyre::eyre::{Result, WrapErr, eyre};
use reqwest::Client;
use url::Url;

use crate::config::Config;
use crate::plex_rs::library::{
    MediaKind, PlexAlbum, PlexArtist, PlexLibraryTrack, find_music_section,
    get_all_items_paginated, get_library_sections,
};
use crate::plex_rs::playlist::{
    PlexPlaylist, create_music_playlist, delete_playlist, get_machine_identifier, get_playlists,
    is_music_playlist,
};
use crate::plex_rs::rating::edit_user_rating;
use crate::ports::plex::{PlaylistLookup, PlexClient, RatingTarget};

/// [`PlexClient`] bound to one server and one music section over HTTP.
pub struct PlexHttpAdapter {
    client: Client,
    server_url: Url,
    token: String,
    section_id: String,
    machine_identifier: String,
    page_size: u32,
}

impl PlexHttpAdapter {
    /// Resolve the configured music section and the server's machine identifier.
    pub async fn connect(config: &Config) -> Result<Self> {
        let client = Client::new();
        let server_url = config.server_url()?;
        let token = config.plex_token()?;

        log::debug!("Fetching library sections from {}", server_url);
        let sections = get_library_sections(&client, &server_url, &token)
            .await
            .wrap_err_with(|| format!("Failed to connect to Plex at {}", server_url))?;

        let section = find_music_section(&sections, &config.plex.music_section).ok_or_else(|| {
            let available: Vec<&str> = sections.iter().map(|s| s.title.as_str()).collect();
            eyre!(
                "Music section '{}' not found on Plex. Available sections: {}",
                config.plex.music_section,
                available.join(", ")
            )
        })?;
        let section_id = section.key.clone();

        let machine_identifier = get_machine_identifier(&client, &server_url, &token)
            .await
            .wrap_err("Failed to fetch Plex machine identifier")?;

        log::info!(
            "Connected to Plex server {} (music section '{}', id {})",
            machine_identifier,
            config.plex.music_section,
            section_id
        );

        Ok(Self {
            client,
            server_url,
            token,
            section_id,
            machine_identifier,
            page_size: config.plex.page_size.max(1),
        })
    }
}

#[async_trait::async_trait]
impl PlexClient for PlexHttpAdapter {
    async fn search_tracks(&self) -> Result<Vec<PlexLibraryTrack>> {
        get_all_items_paginated(
            &self.client,
            &self.server_url,
            &self.token,
            &self.section_id,
            MediaKind::Track,
            self.page_size,
        )
        .await
    }

    async fn search_albums(&self) -> Result<Vec<PlexAlbum>> {
        get_all_items_paginated(
            &self.client,
            &self.server_url,
            &self.token,
            &self.section_id,
            MediaKind::Album,
            self.page_size,
        )
        .await
    }

    async fn search_artists(&self) -> Result<Vec<PlexArtist>> {
        get_all_items_paginated(
            &self.client,
            &self.server_url,
            &self.token,
            &self.section_id,
            MediaKind::Artist,
            self.page_size,
        )
        .await
    }

    async fn find_playlist_by_title(&self, title: &str) -> Result<PlaylistLookup> {
        let playlists = get_playlists(&self.client, &self.server_url, &self.token).await?;

        Ok(playlists
            .into_iter()
            .find(|p| is_music_playlist(p) && p.title == title)
            .map(PlaylistLookup::Found)
            .unwrap_or(PlaylistLookup::NotFound))
    }

    async fn delete_playlist(&self, playlist: &PlexPlaylist) -> Result<()> {
        delete_playlist(
            &self.client,
            &self.server_url,
            &self.token,
            &playlist.rating_key,
        )
        .await
    }

    async fn create_playlist(
        &self,
        title: &str,
        items: &[PlexLibraryTrack],
    ) -> Result<PlexPlaylist> {
        let rating_keys: Vec<&str> = items.iter().map(|t| t.rating_key.as_str()).collect();

        create_music_playlist(
            &self.client,
            &self.server_url,
            &self.token,
            &self.machine_identifier,
            title,
            &rating_keys,
        )
        .await
    }

    async fn edit_rating(&self, target: RatingTarget, value: f64) -> Result<()> {
        edit_user_rating(
            &self.client,
            &self.server_url,
            &self.token,
            &self.section_id,
            target.kind,
            &target.rating_key,
            value,
        )
        .await
    }
}
