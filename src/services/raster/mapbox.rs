//! Use the MapBox static images API to render the map view
use super::{bare_hex_color, RasterScene, Rasterizer};
use crate::config::ServiceConfig;
use crate::gps::encode_coordinates;
use crate::Error;
use crate::{set_int_param_from_config, set_string_param_from_config};
use log::{debug, warn};
use reqwest::blocking::Client;
use std::iter::FromIterator;
use std::time::Duration;

/// largest image edge the static API will render
const MAX_IMAGE_SIZE: u32 = 1280;

/// Defines parameters to interact with the MapBox API
#[derive(Debug)]
pub struct MapBox {
    base_url: String,
    api_version: String,
    username: String,
    style: String,
    access_token: String,
    timeout_secs: u64,
}

impl MapBox {
    pub fn from_config(config: &ServiceConfig) -> Result<Self, Error> {
        let mut base = Self::default();
        for key in config.parameters() {
            match key.as_ref() {
                "base_url" => set_string_param_from_config!(base, base_url, config),
                "api_version" => set_string_param_from_config!(base, api_version, config),
                "username" => set_string_param_from_config!(base, username, config),
                "style" => set_string_param_from_config!(base, style, config),
                "access_token" => set_string_param_from_config!(base, access_token, config),
                "timeout_secs" => set_int_param_from_config!(base, timeout_secs, config, u64),
                _ => warn!(
                    "unknown configuration parameter for MapBox: {}={:?}",
                    key,
                    config.get_parameter(key)
                ),
            }
        }
        Ok(base)
    }

    /// Comma separated path overlays, one per track
    fn overlays(&self, scene: &RasterScene) -> Result<String, Error> {
        let mut overlays = Vec::with_capacity(scene.tracks.len());
        for track in &scene.tracks {
            let encoded = encode_coordinates(&track.points).map_err(Error::Other)?;
            // hacky way to encode the path, we need to drop the leading '=' sign
            // from the call to form_urlencoded which is meant for key=value pairs
            let encoded = form_urlencoded::Serializer::new(String::new())
                .append_pair("", &encoded)
                .finish();
            overlays.push(format!(
                "path-{}+{}-{}({})",
                track.style.weight(),
                bare_hex_color(track.style.color()),
                track.style.opacity(),
                &encoded[1..]
            ));
        }
        Ok(overlays.join(","))
    }

    fn request_url(&self, scene: &RasterScene) -> Result<String, Error> {
        let (width, height) = (
            scene.width.min(MAX_IMAGE_SIZE),
            scene.height.min(MAX_IMAGE_SIZE),
        );
        if (width, height) != (scene.width, scene.height) {
            warn!(
                "MapBox images are limited to {0}x{0}, requested {1}x{2}",
                MAX_IMAGE_SIZE, scene.width, scene.height
            );
        }
        let overlays = self.overlays(scene)?;
        let separator = if overlays.is_empty() { "" } else { "/" };
        Ok(format!(
            "{}/styles/{}/{}/{}/static/{}{}{},{},{}/{}x{}",
            self.base_url,
            self.api_version,
            self.username,
            self.style,
            overlays,
            separator,
            scene.center.longitude(),
            scene.center.latitude(),
            scene.zoom,
            width,
            height,
        ))
    }
}

impl Default for MapBox {
    fn default() -> Self {
        MapBox {
            base_url: "https://api.mapbox.com".to_string(),
            api_version: "v1".to_string(),
            username: "mapbox".to_string(),
            style: "streets-v11".to_string(),
            access_token: String::new(),
            timeout_secs: 0,
        }
    }
}

impl Rasterizer for MapBox {
    fn rasterize(&self, scene: &RasterScene) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
        let request_url = self.request_url(scene)?;
        debug!("Requesting map image from MapBox: {}", request_url);
        let timeout = if self.timeout_secs > 0 {
            Some(Duration::from_secs(self.timeout_secs))
        } else {
            None
        };
        let client = Client::builder().timeout(timeout).build()?;
        let resp = client
            .get(&request_url)
            .query(&[("access_token", &self.access_token)])
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
                "MapBox drawing failed with code: {}",
                code
            ))))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gps::{GeoBounds, Location};
    use crate::services::raster::RasterTrack;
    use crate::style::{StyleOptions, StyleSpec};

    fn scene(tracks: Vec<RasterTrack>) -> RasterScene {
        RasterScene {
            center: Location::new(40.0, -120.0),
            zoom: 5.0,
            width: 2000,
            height: 600,
            bounds: GeoBounds::from_location(Location::new(40.0, -120.0)),
            smooth_factor: 1.0,
            tracks,
        }
    }

    #[test]
    fn builds_overlay_url() {
        let track = RasterTrack {
            points: vec![
                Location::new(38.5, -120.2),
                Location::new(40.7, -120.95),
                Location::new(43.252, -126.453),
            ],
            style: StyleSpec::new("#ff4444", 3.0, 0.5).unwrap(),
        };
        let url = MapBox::default().request_url(&scene(vec![track])).unwrap();
        assert_eq!(
            url,
            "https://api.mapbox.com/styles/v1/mapbox/streets-v11/static/\
             path-3+ff4444-0.5(_p%7EiF%7Eps%7CU_ulLnnqC_mqNvxq%60%40)/-120,40,5/1280x600"
        );
    }

    #[test]
    fn detected_activity_colors_are_sent_as_hex() {
        let style = StyleOptions::default().style_for("morning-Hike.fit").unwrap();
        let track = RasterTrack {
            points: vec![Location::new(38.5, -120.2)],
            style,
        };
        let url = MapBox::default().request_url(&scene(vec![track])).unwrap();
        assert!(url.contains("/static/path-1+ffc0cb-0.5("));
        assert!(!url.contains("pink"));
    }

    #[test]
    fn negative_timeout_is_rejected() {
        let cfg: ServiceConfig =
            serde_yaml::from_str("handler: mapbox\nconfiguration:\n  timeout_secs: -5\n").unwrap();
        match MapBox::from_config(&cfg) {
            Err(Error::InvalidConfigurationValue(msg)) => assert!(msg.contains("timeout_secs")),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn url_without_tracks_has_no_overlay() {
        let url = MapBox::default().request_url(&scene(Vec::new())).unwrap();
        assert!(url.ends_with("/static/-120,40,5/1280x600"));
    }
}
