//! Store application configuration that gets read from disk
use crate::camera::WebMercatorMap;
use crate::export::ExportSettings;
use crate::gps::Location;
use crate::services::{new_rasterizer, Rasterizer};
use crate::style::StyleOptions;
use crate::Error;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_yaml::Value;
use simplelog::LevelFilter;
use std::collections::HashMap;
use std::io::prelude::*;
use std::iter::Iterator;
use std::path::PathBuf;
use std::str::FromStr;

/// Defines the allowed keys under the services map
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceType {
    Rasterizer,
}

/// Type alias for clarity
pub type ServiceParameters = HashMap<String, Value>;

/// Configuration options for a single service of any type
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServiceConfig {
    handler: String,
    #[serde(default)]
    configuration: ServiceParameters,
}

impl ServiceConfig {
    pub fn handler(&self) -> &str {
        &self.handler
    }

    pub fn parameters(&self) -> impl Iterator<Item = &String> + '_ {
        self.configuration.keys()
    }

    pub fn get_parameter(&self, key: &str) -> Option<&Value> {
        self.configuration.get(key)
    }

    pub fn get_parameter_as_string(&self, key: &str) -> Option<Result<String, Error>> {
        if let Some(value) = self.configuration.get(key) {
            let value = value
                .as_str()
                .ok_or_else(|| {
                    Error::InvalidConfigurationValue(format!(
                        "invalid value for {}.{}, expected a string: {:?}",
                        &self.handler, key, value
                    ))
                })
                .map(|v| v.to_string());
            Some(value)
        } else {
            None
        }
    }

    pub fn get_parameter_as_i64(&self, key: &str) -> Option<Result<i64, Error>> {
        if let Some(value) = self.configuration.get(key) {
            let value = value.as_i64().ok_or_else(|| {
                Error::InvalidConfigurationValue(format!(
                    "invalid value for {}.{}, expected an integer: {:?}",
                    &self.handler, key, value
                ))
            });
            Some(value)
        } else {
            None
        }
    }
}

/// Set a string parameter on the service instance from a ServiceConfig instance
#[macro_export]
macro_rules! set_string_param_from_config {
    ($b:expr, $k:ident, $c:expr) => {
        if let Some(val) = $c.get_parameter_as_string(stringify!($k)) {
            $b.$k = val?
        }
    };
}

/// Set an integer parameter on the service instance, values that don't fit the field's type
/// (e.g. negative numbers for unsigned fields) are rejected
#[macro_export]
macro_rules! set_int_param_from_config {
    ($b:expr, $k:ident, $c:expr, $o:ident) => {
        if let Some(val) = $c.get_parameter_as_i64(stringify!($k)) {
            let val = val?;
            $b.$k = <$o as std::convert::TryFrom<i64>>::try_from(val).map_err(|_| {
                $crate::Error::InvalidConfigurationValue(format!(
                    "value out of range for {}: {}",
                    stringify!($k),
                    val
                ))
            })?
        }
    };
}

/// Initial camera placement and size of the map view
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    latitude: f64,
    longitude: f64,
    zoom: f64,
    min_zoom: f64,
    max_zoom: f64,
    width: u32,
    height: u32,
    padding: f64,
}

impl MapConfig {
    /// Create the map view described by this configuration
    pub fn build_camera(&self) -> Result<WebMercatorMap, Error> {
        if self.width == 0 || self.height == 0 {
            return Err(Error::InvalidConfigurationValue(format!(
                "map size must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        let mut map = WebMercatorMap::new(
            Location::new(self.latitude, self.longitude),
            self.zoom,
            self.width,
            self.height,
        );
        map.set_zoom_limits(self.min_zoom, self.max_zoom);
        map.set_padding(self.padding);
        Ok(map)
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        MapConfig {
            latitude: 0.0,
            longitude: 0.0,
            zoom: 2.0,
            min_zoom: 0.0,
            max_zoom: 18.0,
            width: 1024,
            height: 768,
            padding: 0.0,
        }
    }
}

/// Configuration struct that we can create from the config file used
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(
        deserialize_with = "deserialize_level_filter",
        serialize_with = "serialize_level_filter",
        default = "default_level_filter"
    )]
    log_level: LevelFilter,
    #[serde(default)]
    style: StyleOptions,
    #[serde(default)]
    map: MapConfig,
    #[serde(default)]
    export: ExportSettings,
    #[serde(default)]
    services: HashMap<ServiceType, ServiceConfig>,
}

impl Config {
    pub fn load<T: Read>(source: &mut T) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_reader(source)
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn style(&self) -> &StyleOptions {
        &self.style
    }

    pub fn map(&self) -> &MapConfig {
        &self.map
    }

    pub fn export(&self) -> ExportSettings {
        self.export
    }

    pub fn get_rasterizer(&self) -> Result<Box<dyn Rasterizer>, Error> {
        match self.services.get(&ServiceType::Rasterizer) {
            Some(cfg) => new_rasterizer(cfg),
            None => Err(Error::UnknownServiceHandler(
                "no service configuration defined for rasterizer".to_string(),
            )),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            log_level: default_level_filter(),
            style: StyleOptions::default(),
            map: MapConfig::default(),
            export: ExportSettings::default(),
            services: HashMap::new(),
        }
    }
}

/// Default location of the configuration file
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_default()
        .join(env!("CARGO_PKG_NAME"))
        .join("config.yaml")
}

fn deserialize_level_filter<'de, D>(deserializer: D) -> Result<LevelFilter, D::Error>
where
    D: Deserializer<'de>,
{
    let buf = String::deserialize(deserializer)?;
    LevelFilter::from_str(&buf)
        .map_err(|_| serde::de::Error::custom(format!("invalid level value: {}", buf)))
}

fn serialize_level_filter<S>(level: &LevelFilter, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&level.to_string())
}

fn default_level_filter() -> LevelFilter {
    LevelFilter::Info
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::MapCamera;

    #[test]
    fn empty_document_uses_defaults() {
        let config = Config::load(&mut "{}".as_bytes()).unwrap();
        assert_eq!(config.log_level(), LevelFilter::Info);
        assert_eq!(config.style(), &StyleOptions::default());
        assert_eq!(config.export(), ExportSettings::default());
        assert!(config.get_rasterizer().is_err());
    }

    #[test]
    fn loads_full_document() {
        let yaml = "
log_level: debug
style:
  color: '#112233'
  weight: 3.5
  override_existing: false
map:
  latitude: 51.5
  longitude: -0.12
  zoom: 11
  width: 640
  height: 480
export:
  scale: 3.0
services:
  rasterizer:
    handler: openmaptiles
    configuration:
      base_url: http://localhost:8081
";
        let config = Config::load(&mut yaml.as_bytes()).unwrap();
        assert_eq!(config.log_level(), LevelFilter::Debug);
        assert_eq!(config.style().color, "#112233");
        assert!(!config.style().override_existing);
        assert!(config.style().detect_colors);
        assert_eq!(config.export().scale, 3.0);
        assert_eq!(config.export().grid_resolution, 10.0);

        let map = config.map().build_camera().unwrap();
        assert_eq!(map.zoom(), 11.0);
        assert_eq!(map.center(), Location::new(51.5, -0.12));
        assert!(config.get_rasterizer().is_ok());
    }

    #[test]
    fn rejects_bad_parameter_types() {
        let cfg: ServiceConfig =
            serde_yaml::from_str("handler: mapbox\nconfiguration:\n  access_token: 12\n").unwrap();
        assert!(cfg.get_parameter_as_string("access_token").unwrap().is_err());
        assert!(cfg.get_parameter_as_i64("access_token").unwrap().is_ok());
        assert!(cfg.get_parameter_as_string("missing").is_none());
    }

    #[test]
    fn rejects_zero_sized_map() {
        let map: MapConfig = serde_yaml::from_str("width: 0").unwrap();
        assert!(map.build_camera().is_err());
    }
}
