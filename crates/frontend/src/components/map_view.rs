use dioxus::prelude::*;
use stationmap_shared::config::MapConfig;
use tracing::error;

use crate::page;

/// Full-page map container. Leaflet takes the element over once it is
/// mounted; Dioxus never re-renders it afterwards.
#[component]
pub fn StationMapView(config: MapConfig) -> Element {
    let container_id = config.container_id.clone();

    use_effect(move || {
        if let Err(err) = page::start(config.clone()) {
            error!(error = ?err, "map bootstrap failed");
        }
    });

    rsx! {
        div { id: "{container_id}" }
    }
}
