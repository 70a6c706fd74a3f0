//! Define export subcommand
use super::{load_session, parse_location};
use crate::config::Config;
use crate::export::ExportFormat;
use crate::geometry::PixelPoint;
use crate::gps::Location;
use log::{error, info};
use std::io::{self, Write};
use std::path::PathBuf;
use structopt::StructOpt;

/// Draw the tracks found in FIT files on the map and save the view as an image
#[derive(Debug, StructOpt)]
pub struct ExportOpts {
    /// FIT files to draw or directories to search
    #[structopt(name = "PATHS", parse(from_os_str), required = true)]
    paths: Vec<PathBuf>,
    /// Search directory paths recursively
    #[structopt(short, long)]
    recursive: bool,
    /// Image format to export, "svg" or "png" (png requires a rasterizer service)
    #[structopt(short, long, default_value = "svg")]
    format: ExportFormat,
    /// Directory to write the image to, if "-" is used we will write to stdout
    #[structopt(short, long, parse(from_os_str))]
    output: Option<PathBuf>,
    /// Location fix ("LAT,LON") to center on when no track could be loaded
    #[structopt(long, parse(try_from_str = parse_location))]
    location: Option<Location>,
    /// Pan the map by "DX,DY" pixels after loading, as a user would before exporting
    #[structopt(long, parse(try_from_str = parse_offset))]
    pan: Option<PixelPoint>,
    /// Fit the view to all tracks right before exporting
    #[structopt(long)]
    zoom_to_all: bool,
}

pub fn export_command(config: Config, opts: ExportOpts) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = load_session(&config, &opts.paths, opts.recursive)?;
    info!("Loaded {} tracks", session.tracks().len());

    if let Some(location) = opts.location {
        session.request_initial_location(location);
    }
    if let Some(offset) = opts.pan {
        session.camera_mut().pan_by(offset);
        session.sync_camera_events();
    }
    if opts.zoom_to_all {
        session.zoom_to_all();
    }

    let rasterizer = match opts.format {
        ExportFormat::Png => match config.get_rasterizer() {
            Ok(hdl) => Some(hdl),
            Err(e) => {
                error!("Could not initialize the rasterizer service: {}", e);
                return Err(Box::new(e));
            }
        },
        ExportFormat::Svg => None,
    };
    let artifact = session.export(opts.format, rasterizer.as_deref())?;

    match opts.output {
        Some(ref path) if path.to_string_lossy() == "-" => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle.write_all(artifact.data())?
        }
        Some(path) => {
            artifact.write_to(&path)?;
        }
        None => {
            artifact.write_to(&std::env::current_dir()?)?;
        }
    }

    Ok(())
}

/// Parse a "DX,DY" pixel offset
fn parse_offset(src: &str) -> Result<PixelPoint, String> {
    let values: Vec<f64> = src
        .split(',')
        .map(|v| v.trim().parse::<f64>())
        .collect::<Result<_, _>>()
        .map_err(|e| format!("invalid offset '{}': {}", src, e))?;
    match values.as_slice() {
        [dx, dy] => Ok(PixelPoint::new(*dx, *dy)),
        _ => Err(format!("expected DX,DY but got '{}'", src)),
    }
}
