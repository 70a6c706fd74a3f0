//! Read GPS traces out of FIT activity files
use crate::gps::Location;
use crate::Error;
use fitparser::profile::MesgNum;
use fitparser::{FitDataRecord, Value};
use log::{debug, trace, warn};
use std::fs::{read_dir, File};
use std::io::Read;
use std::path::{Path, PathBuf};

/// A GPS trace loaded from disk, ready to be added to a map session
#[derive(Clone, Debug)]
pub struct ActivityTrace {
    identifier: String,
    points: Vec<Location>,
}

impl ActivityTrace {
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn points(&self) -> &[Location] {
        &self.points
    }

    pub fn into_parts(self) -> (String, Vec<Location>) {
        (self.identifier, self.points)
    }
}

/// Extract the ordered positions stored in the record messages of a FIT file
pub fn locations_from_fit_data(messages: &[FitDataRecord]) -> Vec<Location> {
    messages
        .iter()
        .filter(|m| matches!(m.kind(), MesgNum::Record))
        .filter_map(|m| {
            let mut lat = None;
            let mut lon = None;
            for field in m.fields() {
                match (field.name(), field.value()) {
                    ("position_lat", Value::SInt32(v)) => lat = Some(*v),
                    ("position_long", Value::SInt32(v)) => lon = Some(*v),
                    _ => {}
                }
            }
            Some(Location::from_fit_coordinates(lat?, lon?))
        })
        .collect()
}

/// Parse a FIT file from a reader into its GPS trace
pub fn read_fit_trace<T: Read>(identifier: &str, source: &mut T) -> Result<ActivityTrace, Error> {
    let messages = fitparser::from_reader(source)?;
    trace!(
        "Parsed FIT file: {} and found {} messages",
        identifier,
        messages.len()
    );
    let points = locations_from_fit_data(&messages);
    debug!("Found {} GPS points in {}", points.len(), identifier);
    Ok(ActivityTrace {
        identifier: identifier.to_string(),
        points,
    })
}

/// Open and parse a FIT file, the file name becomes the trace identifier
pub fn load_fit_file(path: &Path) -> Result<ActivityTrace, Error> {
    let identifier = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string());
    let mut fp = File::open(path)?;
    read_fit_trace(&identifier, &mut fp)
}

/// Expand the provided paths into a list of FIT files, directories are searched for files
/// with the "fit" extension and descended into when `recursive` is set.
pub fn collect_fit_files(paths: &[PathBuf], recursive: bool) -> Result<Vec<PathBuf>, Error> {
    let mut files = Vec::new();
    for path in paths {
        if !path.exists() {
            warn!("Path does not exist: {:?}", path);
            continue;
        }
        if path.is_dir() {
            debug!("Scanning contents of: {:?} for FIT files", path);
            let mut new_paths: Vec<PathBuf> = read_dir(path)?
                .filter_map(|d| d.ok())
                .map(|d| d.path())
                .filter(|p| (p.is_dir() && recursive) || is_fit_file(p))
                .collect();
            new_paths.sort();
            files.extend(collect_fit_files(&new_paths, recursive)?);
        } else {
            files.push(path.clone());
        }
    }
    Ok(files)
}

fn is_fit_file(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .map_or(false, |e| e.to_string_lossy().to_ascii_lowercase() == "fit")
}
