use std::path::{Path, PathBuf};

use color_eyre::eyre::{OptionExt, Result, WrapErr};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::sync::playlists::{DEFAULT_EXCLUDED_PREFIX, DEFAULT_EXCLUDED_TITLES, PlaylistFilter};

const DEFAULT_CONFIG: &str = r#"# itunes-plex-sync configuration

[plex]
server_url = "http://localhost:32400"
# Falls back to the PLEX_TOKEN environment variable when unset.
# token = ""
music_section = "Music"
page_size = 1000

[itunes]
library_path = "~/Music/iTunes/iTunes Music Library.xml"
# Playlist whose tracks provide per-track ratings.
music_playlist = "Music"

[playlists]
# Playlists starting with this prefix are not synced. Empty disables the rule.
excluded_prefix = "z"
excluded_titles = ["Library", "Recently Added", "1 Star", "2 Stars"]
"#;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub plex: PlexConfig,
    #[serde(default)]
    pub itunes: ItunesConfig,
    #[serde(default)]
    pub playlists: PlaylistsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlexConfig {
    pub server_url: String,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default = "default_music_section")]
    pub music_section: String,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItunesConfig {
    #[serde(default = "default_library_path")]
    pub library_path: String,
    #[serde(default = "default_music_playlist")]
    pub music_playlist: String,
}

impl Default for ItunesConfig {
    fn default() -> Self {
        Self {
            library_path: default_library_path(),
            music_playlist: default_music_playlist(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistsConfig {
    #[serde(default = "default_excluded_prefix")]
    pub excluded_prefix: String,
    #[serde(default = "default_excluded_titles")]
    pub excluded_titles: Vec<String>,
}

impl Default for PlaylistsConfig {
    fn default() -> Self {
        Self {
            excluded_prefix: default_excluded_prefix(),
            excluded_titles: default_excluded_titles(),
        }
    }
}

fn default_music_section() -> String {
    "Music".to_string()
}

fn default_page_size() -> u32 {
    1000
}

fn default_library_path() -> String {
    "~/Music/iTunes/iTunes Music Library.xml".to_string()
}

fn default_music_playlist() -> String {
    "Music".to_string()
}

fn default_excluded_prefix() -> String {
    DEFAULT_EXCLUDED_PREFIX.to_string()
}

fn default_excluded_titles() -> Vec<String> {
    DEFAULT_EXCLUDED_TITLES.iter().map(|t| t.to_string()).collect()
}

impl Config {
    /// Load config from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .wrap_err_with(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Get the default config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|path| path.join("itunes-plex-sync").join("config.toml"))
    }

    /// Load config from the default path
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path().ok_or_eyre("No config directory available")?;

        Self::from_file(&config_path)
    }

    /// Write the default config to the default path, if no file exists there yet.
    pub fn create_default() -> Result<PathBuf> {
        let config_path = Self::config_path().ok_or_eyre("No config directory available")?;
        Self::create_default_at(&config_path)?;
        Ok(config_path)
    }

    /// Returns `false` when `path` already existed and was left untouched.
    pub fn create_default_at(path: &Path) -> Result<bool> {
        if path.exists() {
            log::info!("Config already exists at {}", path.display());
            return Ok(false);
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .wrap_err_with(|| format!("Failed to create {}", parent.display()))?;
        }
        std::fs::write(path, DEFAULT_CONFIG)
            .wrap_err_with(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(true)
    }

    /// The Plex server URL, normalised so relative endpoint paths join below it.
    pub fn server_url(&self) -> Result<Url> {
        let raw = self.plex.server_url.trim();
        let raw = if raw.ends_with('/') {
            raw.to_string()
        } else {
            format!("{}/", raw)
        };
        Url::parse(&raw).wrap_err_with(|| format!("Invalid Plex server URL: {}", raw))
    }

    /// The Plex token from the config file, else from `PLEX_TOKEN`.
    pub fn plex_token(&self) -> Result<String> {
        resolve_token(
            self.plex.token.as_deref(),
            std::env::var("PLEX_TOKEN").ok(),
        )
    }

    /// Get expanded library path
    pub fn library_path(&self) -> PathBuf {
        expand_path(&self.itunes.library_path)
    }

    pub fn playlist_filter(&self) -> PlaylistFilter {
        PlaylistFilter::new(
            &self.playlists.excluded_prefix,
            self.playlists.excluded_titles.iter().cloned(),
        )
    }
}

fn resolve_token(from_file: Option<&str>, from_env: Option<String>) -> Result<String> {
    from_file
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .or(from_env.filter(|t| !t.is_empty()))
        .ok_or_eyre("No Plex token configured. Set plex.token or PLEX_TOKEN")
}

/// Expand ~ to home directory
fn expand_path(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    PathBuf::from(path)
}
