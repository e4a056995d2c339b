//! Page configuration, read from `window.STATIONMAP_CONFIG` when the host sets
//! it before the page loads. It may be a JSON string or a plain object.

use js_sys::Reflect;
use stationmap_shared::config::MapConfig;
use stationmap_shared::MapError;
use tracing::Level;
use wasm_bindgen::JsValue;

const CONFIG_GLOBAL: &str = "STATIONMAP_CONFIG";

pub fn load() -> MapConfig {
    let Some(raw) = web_sys::window()
        .and_then(|window| Reflect::get(&window, &JsValue::from_str(CONFIG_GLOBAL)).ok())
        .filter(|value| !value.is_undefined() && !value.is_null())
    else {
        return MapConfig::default();
    };
    or_default(parse(&raw))
}

fn parse(raw: &JsValue) -> Result<MapConfig, MapError> {
    match raw.as_string() {
        Some(text) => MapConfig::from_json(&text),
        None => {
            let config: MapConfig = serde_wasm_bindgen::from_value(raw.clone())
                .map_err(|e| MapError::Config(e.to_string()))?;
            config.validate()?;
            Ok(config)
        }
    }
}

/// Runs before the logger is up, so problems go straight to the console.
fn or_default(parsed: Result<MapConfig, MapError>) -> MapConfig {
    parsed.unwrap_or_else(|err| {
        web_sys::console::warn_1(&format!("ignoring {CONFIG_GLOBAL}: {err}").into());
        MapConfig::default()
    })
}

/// Unknown names fall back to info.
pub fn log_level(name: &str) -> Level {
    match name.trim().to_ascii_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" | "warning" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}
