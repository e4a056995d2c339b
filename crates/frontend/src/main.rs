mod bridge;
mod components;
mod leaflet;
mod page;
mod settings;
mod surface;
mod uplot;

use dioxus::prelude::*;
use stationmap_shared::config::MapConfig;

const CSS: Asset = asset!("/assets/main.css");

#[allow(non_snake_case)]
fn App() -> Element {
    let config = use_context::<MapConfig>();
    rsx! {
        document::Stylesheet { href: CSS }
        components::map_view::StationMapView { config }
    }
}

fn main() {
    console_error_panic_hook::set_once();

    let config = settings::load();
    if let Err(err) = dioxus::logger::init(settings::log_level(&config.log_level)) {
        web_sys::console::warn_1(&format!("logger already set: {err}").into());
    }

    dioxus::LaunchBuilder::new().with_context(config).launch(App);
}
