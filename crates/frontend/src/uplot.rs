use std::cell::RefCell;
use std::collections::HashMap;

use js_sys::{Array, Function, Reflect};
use serde::Serialize;
use stationmap_shared::plot::{format_value, PlotSpec};
use stationmap_shared::MapError;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_name = uPlot)]
    type UPlot;

    #[wasm_bindgen(constructor, js_class = "uPlot")]
    fn new(options: &JsValue, data: &JsValue, target: &web_sys::Element) -> UPlot;
}

fn js_err(err: impl std::fmt::Debug) -> MapError {
    MapError::Surface(format!("{err:?}"))
}

/// `(u, v) => "v unit"` for series hover values.
fn value_formatter(unit: String) -> Function {
    Closure::<dyn Fn(JsValue, JsValue) -> String>::new(move |_u: JsValue, v: JsValue| {
        format_value(v.as_f64(), &unit)
    })
    .into_js_value()
    .unchecked_into()
}

/// `(u, ticks) => ticks.map(v => "v unit")` for axis labels.
fn ticks_formatter(unit: String) -> Function {
    Closure::<dyn Fn(JsValue, Array) -> Array>::new(move |_u: JsValue, ticks: Array| {
        ticks
            .iter()
            .map(|v| JsValue::from_str(&format_value(v.as_f64(), &unit)))
            .collect()
    })
    .into_js_value()
    .unchecked_into()
}

/// Values built once per plot unit. The formatter closures are handed to JS
/// for good, so every plot with the same unit shares one pair.
struct UnitCache<T> {
    entries: HashMap<String, T>,
}

impl<T: Clone> UnitCache<T> {
    fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    fn get_or_build(&mut self, unit: &str, build: impl FnOnce() -> T) -> T {
        self.entries
            .entry(unit.to_string())
            .or_insert_with(build)
            .clone()
    }
}

thread_local! {
    static FORMATTERS: RefCell<UnitCache<(Function, Function)>> = RefCell::new(UnitCache::new());
}

fn formatters(unit: &str) -> (Function, Function) {
    FORMATTERS.with(|cache| {
        cache.borrow_mut().get_or_build(unit, || {
            (
                value_formatter(unit.to_string()),
                ticks_formatter(unit.to_string()),
            )
        })
    })
}

/// Draw `plot` into its container. The container is the popup body built when
/// the marker was added, so it only exists while that popup is open.
pub fn render(document: &web_sys::Document, plot: &PlotSpec) -> Result<(), MapError> {
    let target = document
        .get_element_by_id(&plot.container_id)
        .ok_or_else(|| MapError::Surface(format!("no element '{}'", plot.container_id)))?;

    let serializer = serde_wasm_bindgen::Serializer::json_compatible();
    let options = plot.options.serialize(&serializer).map_err(js_err)?;
    let data = plot.data.serialize(&serializer).map_err(js_err)?;

    let (value, ticks) = formatters(&plot.unit);
    let series = Reflect::get(&options, &"series".into()).map_err(js_err)?;
    for index in plot.value_series() {
        let entry = Reflect::get_u32(&series, index as u32).map_err(js_err)?;
        Reflect::set(&entry, &"value".into(), &value).map_err(js_err)?;
    }
    let axes = Reflect::get(&options, &"axes".into()).map_err(js_err)?;
    for index in plot.unit_axes() {
        let entry = Reflect::get_u32(&axes, index as u32).map_err(js_err)?;
        Reflect::set(&entry, &"values".into(), &ticks).map_err(js_err)?;
    }

    target.set_inner_html("");
    UPlot::new(&options, &data, &target);
    Ok(())
}
