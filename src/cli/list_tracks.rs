//! Define the list-tracks subcommand
use super::load_session;
use crate::config::Config;
use crate::gps::GeoBounds;
use std::path::PathBuf;
use structopt::StructOpt;

/// List the tracks found in FIT files along with their style and extent
#[derive(Debug, StructOpt)]
pub struct ListTracksOpts {
    /// FIT files to list or directories to search
    #[structopt(name = "PATHS", parse(from_os_str), required = true)]
    paths: Vec<PathBuf>,
    /// Search directory paths recursively
    #[structopt(short, long)]
    recursive: bool,
}

pub fn list_tracks_command(
    config: Config,
    opts: ListTracksOpts,
) -> Result<(), Box<dyn std::error::Error>> {
    let session = load_session(&config, &opts.paths, opts.recursive)?;

    println!("Track, Points, Color, Weight, Opacity, Bounds");
    for track in session.tracks().iter() {
        let style = track.style();
        println!(
            "{} {} {} {} {} {}",
            track.identifier(),
            track.points().len(),
            style.color(),
            style.weight(),
            style.opacity(),
            format_bounds(&track.bounds())
        );
    }

    match session.tracks().aggregate_bounds() {
        Some(bounds) => println!("All tracks: {}", format_bounds(&bounds)),
        None => println!("No tracks with GPS data found"),
    }

    Ok(())
}

fn format_bounds(bounds: &GeoBounds) -> String {
    let sw = bounds.south_west();
    let ne = bounds.north_east();
    format!(
        "[{:.5},{:.5}]-[{:.5},{:.5}]",
        sw.latitude(),
        sw.longitude(),
        ne.latitude(),
        ne.longitude()
    )
}
