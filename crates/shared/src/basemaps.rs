//! Tile providers offered as mutually exclusive base layers.
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseLayer {
    #[serde(skip)]
    pub name: &'static str,
    #[serde(skip)]
    pub url: &'static str,
    pub attribution: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_zoom: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subdomains: Option<&'static str>,
}

const OSM_ATTRIBUTION: &str =
    "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors";
const CARTO_ATTRIBUTION: &str = "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors &copy; <a href=\"https://carto.com/attributions\">CARTO</a>";

pub const BASE_LAYERS: &[BaseLayer] = &[
    BaseLayer {
        name: "OpenStreetMap",
        url: "https://tile.openstreetmap.org/{z}/{x}/{y}.png",
        attribution: OSM_ATTRIBUTION,
        max_zoom: None,
        subdomains: None,
    },
    BaseLayer {
        name: "Wikimedia",
        url: "https://maps.wikimedia.org/osm-intl/{z}/{x}/{y}.png",
        attribution: "<a href=\"https://wikimediafoundation.org/wiki/Maps_Terms_of_Use\">Wikimedia maps</a> | Map data &copy; <a href=\"http://openstreetmap.org/copyright\">OpenStreetMap contributors</a>",
        max_zoom: None,
        subdomains: None,
    },
    BaseLayer {
        name: "Esri Nat. Geo. Worldmap",
        url: "https://server.arcgisonline.com/ArcGIS/rest/services/NatGeo_World_Map/MapServer/tile/{z}/{y}/{x}",
        attribution: "Powered by Esri | <a href=\"https://www.arcgis.com/home/item.html?id=3d1a30626bbc46c582f148b9252676ce\">attributions</a>",
        max_zoom: Some(16),
        subdomains: None,
    },
    BaseLayer {
        name: "Esri World Physical",
        url: "https://server.arcgisonline.com/ArcGIS/rest/services/World_Physical_Map/MapServer/tile/{z}/{y}/{x}",
        attribution: "Tiles &copy; Esri &mdash; Source: US National Park Service",
        max_zoom: Some(8),
        subdomains: None,
    },
    BaseLayer {
        name: "CartoDB Positron",
        url: "https://{s}.basemaps.cartocdn.com/light_nolabels/{z}/{x}/{y}{r}.png",
        attribution: CARTO_ATTRIBUTION,
        max_zoom: Some(20),
        subdomains: Some("abcd"),
    },
    BaseLayer {
        name: "CartoDB Dark",
        url: "https://{s}.basemaps.cartocdn.com/dark_nolabels/{z}/{x}/{y}{r}.png",
        attribution: CARTO_ATTRIBUTION,
        max_zoom: Some(20),
        subdomains: Some("abcd"),
    },
    BaseLayer {
        name: "Esri World Imagery",
        url: "https://server.arcgisonline.com/ArcGIS/rest/services/World_Imagery/MapServer/tile/{z}/{y}/{x}",
        attribution: "Powered by Esri | <a href=\"https://www.arcgis.com/home/item.html?id=10df2279f9684e4a9f6a7f08febac2a9\">attributions</a>",
        max_zoom: None,
        subdomains: None,
    },
];

pub fn find(name: &str) -> Option<&'static BaseLayer> {
    BASE_LAYERS.iter().find(|layer| layer.name == name)
}

/// The layer to show first: the named one, or the last table entry.
pub fn initial(name: &str) -> &'static BaseLayer {
    find(name).unwrap_or(&BASE_LAYERS[BASE_LAYERS.len() - 1])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_are_unique() {
        let mut names: Vec<_> = BASE_LAYERS.iter().map(|l| l.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), BASE_LAYERS.len());
    }

    #[test]
    fn test_initial_falls_back_to_imagery() {
        assert_eq!(initial("CartoDB Dark").name, "CartoDB Dark");
        assert_eq!(initial("no such layer").name, "Esri World Imagery");
    }

    #[test]
    fn test_tile_options_skip_unset_fields() {
        let osm = serde_json::to_value(find("OpenStreetMap").unwrap()).unwrap();
        assert!(osm.get("maxZoom").is_none());
        assert!(osm.get("url").is_none());
        let carto = serde_json::to_value(find("CartoDB Positron").unwrap()).unwrap();
        assert_eq!(carto["maxZoom"], 20);
        assert_eq!(carto["subdomains"], "abcd");
    }
}
