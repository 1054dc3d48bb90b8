mod config;
mod itunes;
mod logging;
mod plex_rs;
mod ports;
mod services;
mod sync;
#[cfg(test)]
mod test_utils;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::{Result, eyre::Context};

use crate::{
    config::Config,
    itunes::ItunesLibrary,
    logging::setup_logging,
    ports::{plex::PlexClient, sync_log::LogFacade},
    services::plex::{DryRunPlexClient, PlexHttpAdapter},
    sync::run::{SyncOptions, run},
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The config file to use
    #[arg(short, long, env = "ITUNES_PLEX_SYNC_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Console log level
    #[arg(long, default_value = "info", global = true, env = "LOG_LEVEL")]
    log_level: log::LevelFilter,

    /// File log level
    #[arg(long, default_value = "debug", global = true)]
    log_file_level: log::LevelFilter,

    /// Path to log file, truncated on every run
    #[arg(
        long,
        default_value = "itunes-plex-sync.log",
        env = "ITUNES_PLEX_SYNC_LOG_FILE",
        global = true
    )]
    log_file: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Mirror iTunes playlists and ratings into Plex
    Sync {
        /// Read from Plex but only log the changes that would be made
        #[arg(long)]
        dry_run: bool,

        /// Do not recreate playlists
        #[arg(long)]
        skip_playlists: bool,

        /// Do not push track, album and artist ratings
        #[arg(long)]
        skip_ratings: bool,
    },
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Create a default config file, if it doesn't exist
    CreateDefault,
    /// Print the path to the config file
    Path,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    setup_logging(
        args.log_level,
        Some(args.log_file.clone()),
        args.log_file_level,
    )?;

    match args.command {
        Commands::Config(config_commands) => match config_commands {
            ConfigCommands::CreateDefault => {
                log::debug!("Creating default config");
                let path = Config::create_default()?;
                log::info!("Default config at {}", path.display());
            }
            ConfigCommands::Path => match Config::config_path() {
                Some(path) => println!("{}", path.display()),
                None => println!("No default config path found"),
            },
        },
        Commands::Sync {
            dry_run,
            skip_playlists,
            skip_ratings,
        } => {
            log::debug!("Loading configuration");
            let config = {
                if let Some(config) = &args.config {
                    Config::from_file(config)
                } else {
                    Config::load()
                }
            }
            .wrap_err("Failed to load itunes-plex-sync config")?;

            let library_path = config.library_path();
            log::info!("Reading iTunes library from {}", library_path.display());
            let library = ItunesLibrary::load(&library_path).wrap_err_with(|| {
                format!("Failed to load iTunes library {}", library_path.display())
            })?;

            let adapter = PlexHttpAdapter::connect(&config).await?;
            let client: Box<dyn PlexClient> = if dry_run {
                log::info!("Dry run: no changes will be sent to Plex");
                Box::new(DryRunPlexClient::new(adapter))
            } else {
                Box::new(adapter)
            };

            let options = SyncOptions {
                sync_playlists: !skip_playlists,
                sync_ratings: !skip_ratings,
                music_playlist: config.itunes.music_playlist.clone(),
                filter: config.playlist_filter(),
            };

            run(&library, client.as_ref(), &options, &LogFacade).await?;
        }
    }

    Ok(())
}
