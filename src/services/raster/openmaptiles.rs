//! Use an instance of open map tiles (tileserver-gl) to render the map view
use super::{RasterScene, Rasterizer};
use crate::config::ServiceConfig;
use crate::Error;
use crate::{set_int_param_from_config, set_string_param_from_config};
use log::{debug, warn};
use reqwest::blocking::Client;
use std::iter::FromIterator;
use std::time::Duration;

/// Defines connection parameters to request static map images from an OpenMapTiles server
#[derive(Debug)]
pub struct OpenMapTiles {
    base_url: String,
    style: String,
    image_format: String,
    timeout_secs: u64,
}

impl OpenMapTiles {
    pub fn new(base_url: String, style: String) -> Self {
        let mut omt: OpenMapTiles = Default::default();
        omt.base_url = base_url;
        omt.style = style;
        omt
    }

    pub fn from_config(config: &ServiceConfig) -> Result<Self, Error> {
        let mut base = Self::default();
        for key in config.parameters() {
            match key.as_ref() {
                "base_url" => set_string_param_from_config!(base, base_url, config),
                "style" => set_string_param_from_config!(base, style, config),
                "image_format" => set_string_param_from_config!(base, image_format, config),
                "timeout_secs" => set_int_param_from_config!(base, timeout_secs, config, u64),
                _ => warn!(
                    "unknown configuration parameter for OpenMapTiles: {}={:?}",
                    key,
                    config.get_parameter(key)
                ),
            }
        }
        if base.image_format != "png" {
            return Err(Error::InvalidConfigurationValue(format!(
                "openmaptiles.image_format must be png, got {}",
                base.image_format
            )));
        }
        Ok(base)
    }

    fn request_url(&self, scene: &RasterScene) -> String {
        // Ex.: http://localhost:8080/styles/osm-bright/static/-80.1465,39.46,12/1800x1200.png
        format!(
            "{}/styles/{}/static/{},{},{}/{}x{}.{}",
            self.base_url,
            self.style,
            scene.center.longitude(),
            scene.center.latitude(),
            scene.zoom,
            scene.width,
            scene.height,
            self.image_format
        )
    }

    /// One `path` query value per track in the tileserver-gl path syntax
    fn path_params(&self, scene: &RasterScene) -> Vec<(&'static str, String)> {
        scene
            .tracks
            .iter()
            .map(|track| {
                let coords = track
                    .points
                    .iter()
                    .map(|p| format!("{},{}", p.longitude(), p.latitude()))
                    .collect::<Vec<_>>()
                    .join("|");
                let value = format!(
                    "stroke:{}|width:{}|{}",
                    track.style.color(),
                    track.style.weight(),
                    coords
                );
                ("path", value)
            })
            .collect()
    }

    fn client(&self) -> Result<Client, reqwest::Error> {
        let timeout = if self.timeout_secs > 0 {
            Some(Duration::from_secs(self.timeout_secs))
        } else {
            None
        };
        Client::builder().timeout(timeout).build()
    }
}

impl Default for OpenMapTiles {
    fn default() -> Self {
        OpenMapTiles {
            base_url: "http://localhost:8080".to_string(),
            style: "osm-bright".to_string(),
            image_format: "png".to_string(),
            timeout_secs: 0,
        }
    }
}

impl Rasterizer for OpenMapTiles {
    fn rasterize(&self, scene: &RasterScene) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
        let request_url = self.request_url(scene);
        debug!(
            "Requesting map image from {} with {} tracks",
            request_url,
            scene.tracks.len()
        );
        let resp = self
            .client()?
            .get(&request_url)
            .query(&self.path_params(scene))
            .send()?;
        if resp.status().is_success() {
            // return image data
            match resp.bytes() {
                Ok(data) => Ok(Vec::from_iter(data.into_iter())),
                Err(e) => Err(Box::new(e)),
            }
        } else {
            let code = resp.status();
            Err(Box::new(Error::Other(format!(
                "OpenMapTiles drawing failed with code: {}",
                code
            ))))
        }
    }
}
