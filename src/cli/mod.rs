//! Define the application's command line interface
use crate::camera::WebMercatorMap;
use crate::config::Config;
use crate::gps::Location;
use crate::import::{collect_fit_files, load_fit_file};
use crate::session::MapSession;
use crate::Error;
use log::{error, warn};
use simplelog::LevelFilter;
use std::path::PathBuf;
use structopt::StructOpt;

mod export;
use export::{export_command, ExportOpts};
mod list_tracks;
use list_tracks::{list_tracks_command, ListTracksOpts};

/// Overlay GPS tracks from FIT files on a map and export the result
#[derive(Debug, StructOpt)]
pub struct Cli {
    /// Set logging level to debug, use a second time (e.g. -vv) to set logging to trace
    #[structopt(short, long, parse(from_occurrences))]
    verbose: i32,
    /// Suppress info logging messages use a second time (e.g. -qq) to hide warnings
    #[structopt(short, long, parse(from_occurrences))]
    quiet: i32,
    /// Configuration file to use instead of the default location
    #[structopt(short, long, parse(from_os_str))]
    config: Option<PathBuf>,
    #[structopt(subcommand)]
    cmd: Command,
}

impl Cli {
    /// Return the verbose flag counts as a log level filter
    pub fn verbosity(&self, default: LevelFilter) -> LevelFilter {
        if self.quiet == 1 {
            LevelFilter::Warn
        } else if self.quiet > 1 {
            LevelFilter::Error
        } else if self.verbose == 1 {
            LevelFilter::Debug
        } else if self.verbose > 1 {
            LevelFilter::Trace
        } else {
            default
        }
    }

    pub fn config_path(&self) -> Option<&PathBuf> {
        self.config.as_ref()
    }

    /// Consume options struct and return the result of subcommand execution
    pub fn execute_subcommand(self, config: Config) -> Result<(), Box<dyn std::error::Error>> {
        self.cmd.execute(config)
    }
}

#[derive(Debug, StructOpt)]
pub enum Command {
    /// Draw tracks on the map and export the view as an image
    #[structopt(name = "export")]
    Export(ExportOpts),
    /// Show the tracks found in FIT files and the area they cover
    #[structopt(name = "list-tracks")]
    ListTracks(ListTracksOpts),
}

impl Command {
    /// Consume enum variant and return the result of the command's execution
    fn execute(self, config: Config) -> Result<(), Box<dyn std::error::Error>> {
        match self {
            Command::Export(opts) => export_command(config, opts),
            Command::ListTracks(opts) => list_tracks_command(config, opts),
        }
    }
}

/// Create a map session from the config and add every track found under the paths
fn load_session(
    config: &Config,
    paths: &[PathBuf],
    recursive: bool,
) -> Result<MapSession<WebMercatorMap>, Error> {
    let files = collect_fit_files(paths, recursive)?;
    if files.is_empty() {
        return Err(Error::Other("No FIT files found in the provided paths".to_string()));
    }

    let camera = config.map().build_camera()?;
    let mut session = MapSession::new(camera, config.style().clone(), config.export())?;
    for file in files {
        let (identifier, points) = match load_fit_file(&file) {
            Ok(trace) => trace.into_parts(),
            Err(e) => {
                error!("Could not read FIT file {:?}: {}", file, e);
                continue;
            }
        };
        // files without GPS data (e.g. treadmill runs) are skipped
        if let Err(e) = session.add_track(identifier, points) {
            warn!("{}", e);
        }
    }
    Ok(session)
}

/// Parse a "lat,lon" pair in degrees
fn parse_location(src: &str) -> Result<Location, String> {
    let mut parts = src.splitn(2, ',');
    let lat = parts.next().map(str::trim).unwrap_or_default();
    let lon = parts
        .next()
        .map(str::trim)
        .ok_or_else(|| format!("expected LAT,LON but got '{}'", src))?;
    let lat: f64 = lat
        .parse()
        .map_err(|_| format!("invalid latitude: '{}'", lat))?;
    let lon: f64 = lon
        .parse()
        .map_err(|_| format!("invalid longitude: '{}'", lon))?;
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
        return Err(format!("location out of range: {}", src));
    }
    Ok(Location::new(lat, lon))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_locations() {
        assert_eq!(parse_location("48.85, 2.35").unwrap(), Location::new(48.85, 2.35));
        assert!(parse_location("48.85").is_err());
        assert!(parse_location("north,2.35").is_err());
        assert!(parse_location("95.0,2.35").is_err());
    }

    #[test]
    fn verbosity_flags_override_config_level() {
        let cli = Cli::from_iter(&["track_overlay", "-vv", "list-tracks", "a.fit"]);
        assert_eq!(cli.verbosity(LevelFilter::Info), LevelFilter::Trace);
        let cli = Cli::from_iter(&["track_overlay", "-q", "list-tracks", "a.fit"]);
        assert_eq!(cli.verbosity(LevelFilter::Info), LevelFilter::Warn);
        let cli = Cli::from_iter(&["track_overlay", "list-tracks", "a.fit"]);
        assert_eq!(cli.verbosity(LevelFilter::Debug), LevelFilter::Debug);
    }
}
