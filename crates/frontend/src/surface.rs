use stationmap_shared::icon::{
    component_element_id, component_state_class, icon_element_id, icon_state_class, IconSpec,
};
use stationmap_shared::models::{Bounds, LatLng, Station};
use stationmap_shared::plot::PlotSpec;
use stationmap_shared::state::StateFlag;
use stationmap_shared::surface::MapSurface;
use stationmap_shared::MapError;
use wasm_bindgen::JsCast;

use crate::leaflet::{FeatureGroup, LeafletMap, StationMarker};
use crate::uplot;

/// Leaflet map plus the feature group holding every station marker.
pub struct LeafletSurface {
    map: LeafletMap,
    group: FeatureGroup,
    document: web_sys::Document,
}

impl LeafletSurface {
    pub fn new(map: LeafletMap, group: FeatureGroup, document: web_sys::Document) -> Self {
        Self {
            map,
            group,
            document,
        }
    }

    fn element(&self, id: &str) -> Result<web_sys::Element, MapError> {
        self.document
            .get_element_by_id(id)
            .ok_or_else(|| MapError::Surface(format!("no element '{id}'")))
    }

    fn toggle_class(&self, id: &str, class: &str, on: bool) -> Result<(), MapError> {
        self.element(id)?
            .class_list()
            .toggle_with_force(class, on)
            .map_err(|err| MapError::Surface(format!("{err:?}")))?;
        Ok(())
    }
}

impl MapSurface for LeafletSurface {
    type Marker = StationMarker;

    fn add_marker(
        &mut self,
        station: &Station,
        icon: &IconSpec,
        popup_html: &str,
    ) -> Result<StationMarker, MapError> {
        StationMarker::create(
            &self.group,
            &station.name,
            station.position,
            &station.tooltip,
            icon,
            popup_html,
        )
        .map_err(|err| MapError::Surface(format!("{err:?}")))
    }

    fn remove_marker(&mut self, marker: &StationMarker) {
        self.group.detach(&marker.marker);
    }

    fn toggle_state_class(&mut self, station: &str, flag: StateFlag, on: bool) -> Result<(), MapError> {
        self.toggle_class(&icon_element_id(station), &icon_state_class(flag), on)?;
        self.toggle_class(&component_element_id(station), &component_state_class(flag), on)
    }

    fn fire(&mut self, marker: &StationMarker, event: &str) {
        marker.fire_event(event);
    }

    fn set_fill(&mut self, station: &str, color: &str) -> Result<(), MapError> {
        let element = self.element(&component_element_id(station))?;
        let shape: web_sys::SvgElement = element
            .dyn_into()
            .map_err(|_| MapError::Surface(format!("'{station}' icon is not SVG")))?;
        shape
            .style()
            .set_property("fill", color)
            .map_err(|err| MapError::Surface(format!("{err:?}")))
    }

    fn fit_bounds(&mut self, bounds: Bounds) {
        self.map.fit(bounds);
    }

    fn pan_to(&mut self, at: LatLng) {
        self.map.pan(at);
    }

    fn open_popup(&mut self, marker: &StationMarker) {
        self.map.show_popup(&marker.popup);
    }

    fn render_plot(&mut self, plot: &PlotSpec) -> Result<(), MapError> {
        uplot::render(&self.document, plot)
    }
}
