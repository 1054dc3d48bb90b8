use color_eyre::eyre::{Result, WrapErr};
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use url::Url;

/* ---------- Shared container ---------- */

/// A minimal Plex JSON envelope for list style endpoints that return `MediaContainer.Metadata`.
///
/// Notes
/// - Plex responses are wrapped in a top level `MediaContainer`.
/// - Many fields are optional or omitted depending on endpoint and server version.
/// - `metadata` defaults to an empty vec when missing.
#[derive(Debug, Clone, Deserialize)]
pub struct PlexResponse<T> {
    #[serde(rename = "MediaContainer")]
    pub media_container: PlexMediaContainer<T>,
}

/// The inner Plex MediaContainer payload.
///
/// For paged requests, `total_size` tells when the last page has been read.
#[derive(Debug, Clone, Deserialize)]
pub struct PlexMediaContainer<T> {
    #[serde(rename = "totalSize", default)]
    pub total_size: Option<u32>,

    #[serde(rename = "Metadata", default = "Vec::new")]
    pub metadata: Vec<T>,
}

/// Plex metadata type ids used by the library listing and edit endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Artist,
    Album,
    Track,
}

impl MediaKind {
    pub fn type_id(self) -> u8 {
        match self {
            MediaKind::Artist => 8,
            MediaKind::Album => 9,
            MediaKind::Track => 10,
        }
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            MediaKind::Artist => "artist",
            MediaKind::Album => "album",
            MediaKind::Track => "track",
        };
        f.write_str(name)
    }
}

/* ---------- Library sections ---------- */

#[derive(Debug, Deserialize)]
pub struct PlexLibrarySectionsResponse {
    #[serde(rename = "MediaContainer")]
    pub media_container: PlexLibrarySectionsContainer,
}

/// `MediaContainer` for `/library/sections` which returns a `Directory` list.
#[derive(Debug, Deserialize)]
pub struct PlexLibrarySectionsContainer {
    #[serde(rename = "Directory", default)]
    pub directories: Vec<PlexLibrarySection>,
}

/// A Plex library section.
///
/// Notes
/// - `key` is the library section id.
/// - `section_type` is `artist` for music libraries.
#[derive(Debug, Clone, Deserialize)]
pub struct PlexLibrarySection {
    pub key: String,
    pub title: String,
    #[serde(rename = "type")]
    pub section_type: String,
}

/// Fetch all Plex library sections.
///
/// Endpoint
/// - `GET /library/sections`
pub async fn get_library_sections(
    client: &Client,
    base_url: &Url,
    user_token: &str,
) -> Result<Vec<PlexLibrarySection>> {
    let url = base_url.join("library/sections")?;

    let res = client
        .get(url)
        .header("Accept", "application/json")
        .header("X-Plex-Token", user_token)
        .send()
        .await?
        .error_for_status()?
        .json::<PlexLibrarySectionsResponse>()
        .await
        .wrap_err("Failed to deserialize library sections")?;

    Ok(res.media_container.directories)
}

/// Find the music section with the given title.
pub fn find_music_section<'a>(
    sections: &'a [PlexLibrarySection],
    title: &str,
) -> Option<&'a PlexLibrarySection> {
    sections
        .iter()
        .find(|s| s.section_type == "artist" && s.title == title)
}

/* ---------- Items ---------- */

/// A music track item returned from `/library/sections/{id}/all?type=10`.
///
/// Plex does not always fill `title`, and compilation tracks carry the performing
/// artist in `originalTitle` rather than `grandparentTitle`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PlexLibraryTrack {
    #[serde(rename = "ratingKey")]
    pub rating_key: String,

    #[serde(default)]
    pub title: String,

    #[serde(rename = "titleSort", default)]
    pub title_sort: Option<String>,

    #[serde(rename = "grandparentTitle", default)]
    pub artist: Option<String>,

    #[serde(rename = "originalTitle", default)]
    pub original_title: Option<String>,

    #[serde(rename = "parentTitle", default)]
    pub album: Option<String>,

    #[serde(rename = "userRating", default)]
    pub user_rating: Option<f64>,
}

/// An album item returned from `/library/sections/{id}/all?type=9`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PlexAlbum {
    #[serde(rename = "ratingKey")]
    pub rating_key: String,

    #[serde(default)]
    pub title: String,

    /// The album artist.
    #[serde(rename = "parentTitle", default)]
    pub artist: Option<String>,

    #[serde(rename = "userRating", default)]
    pub user_rating: Option<f64>,
}

/// An artist item returned from `/library/sections/{id}/all?type=8`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PlexArtist {
    #[serde(rename = "ratingKey")]
    pub rating_key: String,

    #[serde(default)]
    pub title: String,

    #[serde(rename = "userRating", default)]
    pub user_rating: Option<f64>,
}

/// Fetch one page of items of `kind` from a music section.
///
/// Pagination
/// - Pass `start` as the offset (`X-Plex-Container-Start`).
/// - Pass `size` as the page size (`X-Plex-Container-Size`).
///
/// Endpoint
/// - `GET /library/sections/{id}/all?type={kind}&sort=titleSort`
pub async fn get_items_page<T: DeserializeOwned>(
    client: &Client,
    base_url: &Url,
    user_token: &str,
    music_section_id: &str,
    kind: MediaKind,
    start: u32,
    size: u32,
) -> Result<PlexMediaContainer<T>> {
    let mut url = base_url.join(&format!("library/sections/{}/all", music_section_id))?;
    url.query_pairs_mut()
        .append_pair("type", &kind.type_id().to_string())
        .append_pair("sort", "titleSort");

    let res = client
        .get(url)
        .header("Accept", "application/json")
        .header("X-Plex-Token", user_token)
        .header("X-Plex-Container-Start", start.to_string())
        .header("X-Plex-Container-Size", size.to_string())
        .send()
        .await?
        .error_for_status()?
        .json::<PlexResponse<T>>()
        .await
        .wrap_err_with(|| format!("Failed to deserialize library {} page", kind))?;

    Ok(res.media_container)
}

/// Fetch all items of `kind` from a music section, handling Plex pagination.
///
/// Stops when `totalSize` items have been retrieved, or when an empty page is
/// returned. If `totalSize` is missing, only the empty page stops the loop.
pub async fn get_all_items_paginated<T: DeserializeOwned>(
    client: &Client,
    base_url: &Url,
    user_token: &str,
    music_section_id: &str,
    kind: MediaKind,
    page_size: u32,
) -> Result<Vec<T>> {
    let mut start: u32 = 0;
    let mut out: Vec<T> = Vec::new();

    loop {
        let container = get_items_page::<T>(
            client,
            base_url,
            user_token,
            music_section_id,
            kind,
            start,
            page_size,
        )
        .await?;

        if container.metadata.is_empty() {
            break;
        }

        out.extend(container.metadata);
        start = out.len() as u32;

        if let Some(total) = container.total_size
            && start >= total
        {
            break;
        }
    }

    log::debug!("Fetched {} {} items from Plex", out.len(), kind);
    Ok(out)
}
