//! Defines the general error type for the crate and various conversions into it
use std::convert;
use std::fmt;

/// General error type for the crate
#[derive(Debug)]
pub enum Error {
    EmptyTrack(String),
    ExportRender(String),
    FitParser(fitparser::ErrorKind),
    InvalidConfigurationValue(String),
    InvalidStyle(String),
    Io(std::io::Error),
    Other(String),
    UnknownServiceHandler(String),
    Yaml(serde_yaml::Error),
}

impl convert::From<fitparser::Error> for Error {
    fn from(err: fitparser::Error) -> Error {
        Error::FitParser(*err)
    }
}

impl convert::From<fitparser::ErrorKind> for Error {
    fn from(err: fitparser::ErrorKind) -> Error {
        Error::FitParser(err)
    }
}

impl convert::From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Error {
        Error::Yaml(err)
    }
}

impl convert::From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::EmptyTrack(name) => {
                write!(f, "Track '{}' does not contain any points", name)
            }
            Error::ExportRender(msg) => write!(f, "Map export failed: {}", msg),
            Error::FitParser(e) => write!(f, "{}", e),
            Error::InvalidConfigurationValue(msg) => write!(f, "{}", msg),
            Error::InvalidStyle(msg) => write!(f, "Invalid track style: {}", msg),
            Error::Io(e) => write!(f, "{}", e),
            Error::Other(msg) => write!(f, "{}", msg),
            Error::UnknownServiceHandler(msg) => write!(f, "{}", msg),
            Error::Yaml(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for Error {}
