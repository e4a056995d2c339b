//! Bindings to the parts of Leaflet the page uses. Leaflet itself is loaded by
//! the page head, so everything here lives on the global `L`.

use js_sys::{Array, Function, Object, Reflect};
use stationmap_shared::basemaps::BaseLayer;
use stationmap_shared::icon::IconSpec;
use stationmap_shared::models::{Bounds, LatLng};
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    #[derive(Clone)]
    pub type LeafletMap;

    #[wasm_bindgen(js_namespace = L, js_name = map)]
    fn l_map(container_id: &str) -> LeafletMap;

    #[wasm_bindgen(method, js_name = setView)]
    fn set_view(this: &LeafletMap, center: &Array, zoom: f64) -> LeafletMap;

    #[wasm_bindgen(method, js_name = fitBounds)]
    fn fit_bounds(this: &LeafletMap, bounds: &Array) -> LeafletMap;

    #[wasm_bindgen(method, js_name = panTo)]
    fn pan_to(this: &LeafletMap, center: &Array) -> LeafletMap;

    #[wasm_bindgen(method, js_name = getCenter)]
    fn get_center(this: &LeafletMap) -> JsLatLng;

    #[wasm_bindgen(method, js_name = openPopup)]
    fn open_popup(this: &LeafletMap, popup: &Popup) -> LeafletMap;

    #[wasm_bindgen(method, js_name = on)]
    fn on(this: &LeafletMap, event: &str, handler: &Function) -> LeafletMap;

    pub type JsLatLng;

    #[wasm_bindgen(method, getter)]
    fn lat(this: &JsLatLng) -> f64;

    #[wasm_bindgen(method, getter)]
    fn lng(this: &JsLatLng) -> f64;

    pub type TileLayer;

    #[wasm_bindgen(js_namespace = L, js_name = tileLayer)]
    fn l_tile_layer(url: &str, options: &JsValue) -> TileLayer;

    #[wasm_bindgen(method, js_name = addTo)]
    fn add_to(this: &TileLayer, map: &LeafletMap) -> TileLayer;

    type LayersControl;

    #[wasm_bindgen(js_namespace = ["L", "control"], js_name = layers)]
    fn l_control_layers(base: &Object, overlays: &Object, options: &JsValue) -> LayersControl;

    #[wasm_bindgen(method, js_name = addTo)]
    fn add_to(this: &LayersControl, map: &LeafletMap) -> LayersControl;

    #[derive(Clone)]
    pub type FeatureGroup;

    #[wasm_bindgen(js_namespace = L, js_name = featureGroup)]
    fn l_feature_group() -> FeatureGroup;

    #[wasm_bindgen(method, js_name = addTo)]
    fn add_to(this: &FeatureGroup, map: &LeafletMap) -> FeatureGroup;

    #[wasm_bindgen(method, js_name = removeLayer)]
    fn remove_layer(this: &FeatureGroup, layer: &Marker) -> FeatureGroup;

    #[wasm_bindgen(method, js_name = on)]
    fn on(this: &FeatureGroup, event: &str, handler: &Function) -> FeatureGroup;

    pub type Marker;

    #[wasm_bindgen(js_namespace = L, js_name = marker)]
    fn l_marker(at: &Array, options: &JsValue) -> Marker;

    #[wasm_bindgen(method, js_name = addTo)]
    fn add_to(this: &Marker, group: &FeatureGroup) -> Marker;

    #[wasm_bindgen(method, js_name = bindTooltip)]
    fn bind_tooltip(this: &Marker, content: &str) -> Marker;

    #[wasm_bindgen(method, js_name = fire)]
    fn fire(this: &Marker, event: &str) -> Marker;

    type DivIcon;

    #[wasm_bindgen(js_namespace = L, js_name = divIcon)]
    fn l_div_icon(options: &JsValue) -> DivIcon;

    pub type Popup;

    #[wasm_bindgen(js_namespace = L, js_name = popup)]
    fn l_popup(options: &JsValue) -> Popup;

    #[wasm_bindgen(method, js_name = setContent)]
    fn set_content(this: &Popup, html: &str) -> Popup;

    #[wasm_bindgen(method, js_name = setLatLng)]
    fn set_lat_lng(this: &Popup, at: &Array) -> Popup;
}

/// Property carrying the station name on each Leaflet marker, read back in
/// group event handlers through `event.propagatedFrom`.
const STATION_KEY: &str = "staname";

fn lat_lng(at: LatLng) -> Array {
    Array::of2(&at.lat.into(), &at.lng.into())
}

fn bounds_array(bounds: Bounds) -> Array {
    Array::of2(&lat_lng(bounds.south_west()), &lat_lng(bounds.north_east()))
}

fn object(entries: &[(&str, JsValue)]) -> Result<JsValue, JsValue> {
    let obj = Object::new();
    for (key, value) in entries {
        Reflect::set(&obj, &JsValue::from_str(key), value)?;
    }
    Ok(obj.into())
}

impl LeafletMap {
    pub fn create(container_id: &str, center: LatLng, zoom: f64) -> LeafletMap {
        let map = l_map(container_id);
        map.set_view(&lat_lng(center), zoom);
        map
    }

    pub fn center(&self) -> LatLng {
        let c = self.get_center();
        LatLng::new(c.lat(), c.lng())
    }

    pub fn fit(&self, bounds: Bounds) {
        self.fit_bounds(&bounds_array(bounds));
    }

    pub fn pan(&self, at: LatLng) {
        self.pan_to(&lat_lng(at));
    }

    pub fn show_popup(&self, popup: &Popup) {
        self.open_popup(popup);
    }

    pub fn listen(&self, event: &str, handler: &Function) {
        self.on(event, handler);
    }

    /// Register base layers behind a layer switcher and show `initial`.
    pub fn install_base_layers(
        &self,
        layers: &[BaseLayer],
        initial: &str,
        position: &str,
    ) -> Result<(), JsValue> {
        let base = Object::new();
        let mut shown = None;
        for layer in layers {
            let options = serde_wasm_bindgen::to_value(layer)?;
            let tiles = l_tile_layer(layer.url, &options);
            Reflect::set(&base, &JsValue::from_str(layer.name), &tiles)?;
            if layer.name == initial {
                shown = Some(tiles);
            }
        }
        let options = object(&[("position", JsValue::from_str(position))])?;
        l_control_layers(&base, &Object::new(), &options).add_to(self);
        if let Some(tiles) = shown {
            tiles.add_to(self);
        }
        Ok(())
    }
}

/// Read the latlng Leaflet puts on mouse events.
pub fn event_lat_lng(event: &JsValue) -> Option<LatLng> {
    let at = Reflect::get(event, &JsValue::from_str("latlng")).ok()?;
    let lat = Reflect::get(&at, &JsValue::from_str("lat")).ok()?.as_f64()?;
    let lng = Reflect::get(&at, &JsValue::from_str("lng")).ok()?.as_f64()?;
    Some(LatLng::new(lat, lng))
}

/// Station name of the marker a group event came from.
pub fn event_station(event: &JsValue) -> Option<String> {
    let marker = Reflect::get(event, &JsValue::from_str("propagatedFrom")).ok()?;
    Reflect::get(&marker, &JsValue::from_str(STATION_KEY))
        .ok()?
        .as_string()
}

impl FeatureGroup {
    pub fn create(map: &LeafletMap) -> FeatureGroup {
        let group = l_feature_group();
        group.add_to(map);
        group
    }

    pub fn listen(&self, event: &str, handler: &Function) {
        self.on(event, handler);
    }

    pub fn detach(&self, marker: &Marker) {
        self.remove_layer(marker);
    }
}

/// A station marker together with the popup its plot is mounted in.
pub struct StationMarker {
    pub marker: Marker,
    pub popup: Popup,
}

impl StationMarker {
    pub fn create(
        group: &FeatureGroup,
        name: &str,
        at: LatLng,
        tooltip: &str,
        icon: &IconSpec,
        popup_html: &str,
    ) -> Result<StationMarker, JsValue> {
        let size = Array::of2(&icon.size.width.into(), &icon.size.height.into());
        let anchor = Array::of2(&icon.anchor.0.into(), &icon.anchor.1.into());
        let div_icon = l_div_icon(&object(&[
            ("className", JsValue::from_str(icon.class_name)),
            ("html", JsValue::from_str(&icon.html)),
            ("iconSize", size.into()),
            ("iconAnchor", anchor.into()),
        ])?);

        let position = lat_lng(at);
        let marker = l_marker(&position, &object(&[("icon", div_icon.into())])?);
        marker.add_to(group);
        if !tooltip.is_empty() {
            marker.bind_tooltip(tooltip);
        }
        Reflect::set(
            &marker,
            &JsValue::from_str(STATION_KEY),
            &JsValue::from_str(name),
        )?;

        let popup = l_popup(&object(&[
            ("maxWidth", JsValue::from_str("auto")),
            ("opacity", JsValue::from_f64(0.9)),
        ])?);
        popup.set_content(popup_html);
        popup.set_lat_lng(&position);

        Ok(StationMarker { marker, popup })
    }

    pub fn fire_event(&self, event: &str) {
        self.marker.fire(event);
    }
}
