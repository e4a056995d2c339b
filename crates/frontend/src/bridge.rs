//! Qt web channel glue: the outbound [`QtHost`] and the inbound signal wiring.

use std::cell::RefCell;
use std::rc::Rc;

use js_sys::{Array, Function, Reflect};
use serde::Serialize;
use stationmap_shared::protocol::{Command, HostEvent};
use stationmap_shared::surface::HostLink;
use wasm_bindgen::prelude::*;

use crate::page::Controller;

#[wasm_bindgen]
extern "C" {
    type QWebChannel;

    #[wasm_bindgen(constructor)]
    fn new(transport: &JsValue, on_ready: &Function) -> QWebChannel;
}

/// Transport Qt WebEngine injects as `qt.webChannelTransport`, if the page
/// runs inside the host.
pub fn transport() -> Option<JsValue> {
    let window = web_sys::window()?;
    let qt = Reflect::get(&window, &"qt".into()).ok()?;
    let transport = Reflect::get(&qt, &"webChannelTransport".into()).ok()?;
    (!transport.is_undefined() && !transport.is_null()).then_some(transport)
}

/// Open the channel and hand the published host object to `on_object`.
pub fn connect(
    transport: &JsValue,
    object_name: String,
    on_object: impl FnOnce(JsValue) + 'static,
) {
    let on_ready = Closure::once_into_js(move |channel: JsValue| {
        let object = Reflect::get(&channel, &"objects".into())
            .and_then(|objects| Reflect::get(&objects, &JsValue::from_str(&object_name)));
        match object {
            Ok(object) if !object.is_undefined() => on_object(object),
            _ => tracing::error!(object = %object_name, "host did not publish the bridge object"),
        }
    });
    QWebChannel::new(transport, on_ready.unchecked_ref());
}

/// The host object seen from the page: every outbound event is a slot call.
#[derive(Clone)]
pub struct QtHost {
    object: JsValue,
}

impl QtHost {
    pub fn new(object: JsValue) -> Self {
        Self { object }
    }

    fn call(&self, event: &HostEvent) -> Result<(), JsValue> {
        let slot: Function = Reflect::get(&self.object, &event.slot().into())?.dyn_into()?;
        let serializer = serde_wasm_bindgen::Serializer::json_compatible();
        let args = Array::new();
        for arg in event.args() {
            args.push(&arg.serialize(&serializer)?);
        }
        slot.apply(&self.object, &args)?;
        Ok(())
    }

    /// Route every known host signal to the controller. Signals the host does
    /// not publish are skipped, so aliases cost nothing.
    pub fn connect_signals(&self, controller: &Rc<RefCell<Controller>>) -> Result<usize, JsValue> {
        let mut connected = 0;
        for &signal in Command::SIGNALS {
            let emitter = Reflect::get(&self.object, &signal.into())?;
            if emitter.is_undefined() {
                continue;
            }
            let connect: Function = Reflect::get(&emitter, &"connect".into())?.dyn_into()?;

            let controller = Rc::clone(controller);
            let handler = Closure::<dyn FnMut(JsValue, JsValue, JsValue, JsValue, JsValue)>::new(
                move |a: JsValue, b: JsValue, c: JsValue, d: JsValue, e: JsValue| {
                    let args: Vec<serde_json::Value> = [a, b, c, d, e]
                        .into_iter()
                        .map(|v| serde_wasm_bindgen::from_value(v).unwrap_or(serde_json::Value::Null))
                        .collect();
                    let Ok(mut map) = controller.try_borrow_mut() else {
                        tracing::error!(signal, "host signal arrived while busy");
                        return;
                    };
                    // `handle` reports failures to the log and the host itself.
                    if let Ok(outcome) = map.handle(signal, &args) {
                        tracing::trace!(signal, ?outcome, "host command applied");
                    }
                },
            );
            connect.call1(&emitter, handler.as_ref())?;
            // Connected for the page lifetime.
            handler.forget();
            connected += 1;
        }
        Ok(connected)
    }
}

impl HostLink for QtHost {
    fn send(&self, event: &HostEvent) {
        if let Err(err) = self.call(event) {
            tracing::warn!(slot = event.slot(), error = ?err, "host call failed");
        }
    }
}
