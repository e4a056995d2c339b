use serde::{Deserialize, Serialize};

use crate::error::MapError;
use crate::icon::IconSize;
use crate::models::LatLng;

/// Page configuration. Every field has a default, so the host only needs to
/// provide what it wants to change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MapConfig {
    /// Id of the element Leaflet mounts into.
    pub container_id: String,
    pub center: LatLng,
    pub zoom: f64,
    pub default_layer: String,
    pub layers_position: String,
    /// Name of the object the host registers on its web channel.
    pub bridge_object: String,
    /// Used when the stylesheet does not give the icon classes a size.
    pub icon_size_plotted: IconSize,
    pub icon_size_noplot: IconSize,
    pub plot: PlotConfig,
    pub log_level: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlotConfig {
    pub width: u32,
    pub height: u32,
    pub popup_width: u32,
    pub popup_height: u32,
    pub unit: String,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            container_id: "map".to_string(),
            center: LatLng::new(0.0, 0.0),
            zoom: 2.0,
            default_layer: "Esri World Imagery".to_string(),
            layers_position: "bottomleft".to_string(),
            bridge_object: "jslink".to_string(),
            icon_size_plotted: IconSize::new(16.0, 16.0),
            icon_size_noplot: IconSize::new(10.0, 10.0),
            plot: PlotConfig::default(),
            log_level: "info".to_string(),
        }
    }
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            width: 400,
            height: 200,
            popup_width: 400,
            popup_height: 250,
            unit: "mm".to_string(),
        }
    }
}

impl MapConfig {
    /// Parse a (possibly partial) JSON configuration.
    pub fn from_json(text: &str) -> Result<Self, MapError> {
        let config: MapConfig =
            serde_json::from_str(text).map_err(|e| MapError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), MapError> {
        if self.container_id.is_empty() {
            return Err(MapError::Config("containerId must not be empty".into()));
        }
        if self.bridge_object.is_empty() {
            return Err(MapError::Config("bridgeObject must not be empty".into()));
        }
        if !(0.0..=30.0).contains(&self.zoom) {
            return Err(MapError::Config(format!("zoom {} out of range", self.zoom)));
        }
        if self.plot.width == 0 || self.plot.height == 0 {
            return Err(MapError::Config("plot size must be non-zero".into()));
        }
        Ok(())
    }

    pub fn icon_size(&self, has_plot: bool) -> IconSize {
        if has_plot {
            self.icon_size_plotted
        } else {
            self.icon_size_noplot
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MapConfig::default();
        assert_eq!(config.center, LatLng::new(0.0, 0.0));
        assert_eq!(config.zoom, 2.0);
        assert_eq!(config.bridge_object, "jslink");
        assert_eq!(config.plot.unit, "mm");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config =
            MapConfig::from_json(r#"{"zoom": 5, "plot": {"unit": "cm"}, "logLevel": "debug"}"#)
                .unwrap();
        assert_eq!(config.zoom, 5.0);
        assert_eq!(config.plot.unit, "cm");
        assert_eq!(config.plot.width, 400);
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.container_id, "map");
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            MapConfig::from_json("{not json"),
            Err(MapError::Config(_))
        ));
    }

    #[test]
    fn test_rejects_empty_bridge_object() {
        assert!(MapConfig::from_json(r#"{"bridgeObject": ""}"#).is_err());
    }

    #[test]
    fn test_icon_size_by_plot_flag() {
        let config = MapConfig::default();
        assert_eq!(config.icon_size(true), IconSize::new(16.0, 16.0));
        assert_eq!(config.icon_size(false), IconSize::new(10.0, 10.0));
    }
}
