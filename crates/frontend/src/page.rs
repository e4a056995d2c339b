//! Page startup: map, base layers, marker group, then the host bridge.

use std::cell::RefCell;
use std::rc::Rc;

use js_sys::Function;
use stationmap_shared::basemaps::{self, BASE_LAYERS};
use stationmap_shared::config::MapConfig;
use stationmap_shared::icon::{IconSize, NOPLOT_CLASS, PLOTTED_CLASS};
use stationmap_shared::protocol::HostEvent;
use stationmap_shared::surface::HostLink;
use stationmap_shared::StationMap;
use tracing::{debug, info, warn};
use wasm_bindgen::prelude::*;

use crate::bridge::{self, QtHost};
use crate::leaflet::{self, FeatureGroup, LeafletMap};
use crate::surface::LeafletSurface;

pub type Controller = StationMap<LeafletSurface, QtHost>;

/// Build the map and, when running inside the Qt host, hook it up to the
/// bridge object. Outside the host the map still works, it just has nobody
/// to talk to.
pub fn start(mut config: MapConfig) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or("no window")?;
    let document = window.document().ok_or("no document")?;

    config.icon_size_plotted = measure_icon(&window, &document, PLOTTED_CLASS)
        .unwrap_or(config.icon_size_plotted);
    config.icon_size_noplot =
        measure_icon(&window, &document, NOPLOT_CLASS).unwrap_or(config.icon_size_noplot);

    let map = LeafletMap::create(&config.container_id, config.center, config.zoom);
    if basemaps::find(&config.default_layer).is_none() {
        warn!(layer = %config.default_layer, "unknown base layer, using the default");
    }
    let initial = basemaps::initial(&config.default_layer);
    map.install_base_layers(BASE_LAYERS, initial.name, &config.layers_position)?;
    let group = FeatureGroup::create(&map);
    info!(container = %config.container_id, layer = initial.name, "map created");

    let Some(transport) = bridge::transport() else {
        warn!("no qt.webChannelTransport, running without a host");
        return Ok(());
    };
    let object_name = config.bridge_object.clone();
    bridge::connect(&transport, object_name, move |object| {
        let host = QtHost::new(object);
        let surface = LeafletSurface::new(map.clone(), group.clone(), document);
        let controller = Rc::new(RefCell::new(StationMap::new(config, surface, host.clone())));

        listen_map(&map, &host);
        listen_markers(&group, &host, &controller);
        match host.connect_signals(&controller) {
            Ok(count) => debug!(count, "host signals connected"),
            Err(err) => warn!(error = ?err, "could not connect host signals"),
        }
        controller.borrow_mut().announce_ready();
    });
    Ok(())
}

fn handler(f: impl FnMut(JsValue) + 'static) -> Function {
    Closure::<dyn FnMut(JsValue)>::new(f)
        .into_js_value()
        .unchecked_into()
}

/// Map events only need the host, never the controller, so they are safe to
/// fire from inside a command (fitBounds, panTo and popups all move the map).
fn listen_map(map: &LeafletMap, host: &QtHost) {
    let (target, link) = (map.clone(), host.clone());
    map.listen(
        "move",
        &handler(move |_| link.send(&HostEvent::MapMove(target.center()))),
    );

    let link = host.clone();
    map.listen(
        "click",
        &handler(move |event| {
            if let Some(at) = leaflet::event_lat_lng(&event) {
                link.send(&HostEvent::MapLeftClick(at));
            }
        }),
    );

    let link = host.clone();
    map.listen(
        "contextmenu",
        &handler(move |_| link.send(&HostEvent::MapRightClick)),
    );
}

fn listen_markers(group: &FeatureGroup, host: &QtHost, controller: &Rc<RefCell<Controller>>) {
    // Hover is reported as is; the host decides whether it becomes a state.
    for (event, entering) in [("mouseover", true), ("mouseout", false)] {
        let link = host.clone();
        group.listen(
            event,
            &handler(move |event| {
                if let Some(name) = leaflet::event_station(&event) {
                    link.send(&HostEvent::marker_hover(&name, entering));
                }
            }),
        );
    }

    let state = Rc::clone(controller);
    group.listen(
        "click",
        &handler(move |event| {
            let Some(name) = leaflet::event_station(&event) else {
                return;
            };
            match state.try_borrow() {
                Ok(map) => {
                    if let Err(err) = map.on_marker_click(&name) {
                        warn!(station = %name, error = %err, "marker click");
                    }
                }
                Err(_) => debug!(station = %name, "marker click while busy"),
            }
        }),
    );

    let state = Rc::clone(controller);
    group.listen(
        "contextmenu",
        &handler(move |event| {
            let Some(name) = leaflet::event_station(&event) else {
                return;
            };
            match state.try_borrow_mut() {
                Ok(mut map) => {
                    if let Err(err) = map.on_marker_right_click(&name) {
                        warn!(station = %name, error = %err, "marker right click");
                    }
                }
                Err(_) => debug!(station = %name, "marker right click while busy"),
            }
        }),
    );
}

/// Rendered size of a marker icon class, read off a hidden sample element.
fn measure_icon(
    window: &web_sys::Window,
    document: &web_sys::Document,
    class: &str,
) -> Option<IconSize> {
    let body = document.body()?;
    let sample = document.create_element("div").ok()?;
    sample.set_class_name(class);
    sample
        .set_attribute("style", "position: absolute; visibility: hidden;")
        .ok()?;
    body.append_child(&sample).ok()?;

    // The computed style is live: read it while the sample is still attached.
    let sizes = window.get_computed_style(&sample).ok().flatten().map(|style| {
        (
            style.get_property_value("width").unwrap_or_default(),
            style.get_property_value("height").unwrap_or_default(),
        )
    });
    sample.remove();
    let (width, height) = sizes?;
    icon_size(&width, &height)
}

fn icon_size(width: &str, height: &str) -> Option<IconSize> {
    let size = IconSize::new(parse_px(width)?, parse_px(height)?);
    (!size.is_empty()).then_some(size)
}

fn parse_px(value: &str) -> Option<f64> {
    value
        .trim()
        .strip_suffix("px")
        .unwrap_or(value.trim())
        .trim()
        .parse()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_px() {
        assert_eq!(parse_px("16px"), Some(16.0));
        assert_eq!(parse_px(" 10.5px "), Some(10.5));
        assert_eq!(parse_px("12"), Some(12.0));
        assert_eq!(parse_px("auto"), None);
        assert_eq!(parse_px(""), None);
    }

    #[test]
    fn test_icon_size_needs_both_dimensions() {
        assert_eq!(icon_size("16px", "12px"), Some(IconSize::new(16.0, 12.0)));
        // A detached element reports empty strings.
        assert_eq!(icon_size("", ""), None);
        assert_eq!(icon_size("0px", "10px"), None);
    }
}
