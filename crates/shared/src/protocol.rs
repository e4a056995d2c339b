//! Messages crossing the host bridge.
//!
//! Inbound, the host emits named signals with positional arguments; multi-field
//! payloads travel as JSON text. [`Command::decode`] turns one such emission
//! into a typed command. Outbound, the page calls named slots on the host
//! object; [`HostEvent`] knows each slot name and its argument list.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::MapError;
use crate::models::{LatLng, MarkerColors, SeriesPayload, Station, StationBatch};
use crate::state::{StateAction, StateFlag};

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    SetIconTemplate(String),
    AddStation(Station),
    AddStations(StationBatch),
    ClearStations,
    SetMarkersColors(MarkerColors),
    SetStationsState {
        names: Vec<String>,
        action: StateAction,
    },
    FitMapBound,
    SendStationData {
        name: String,
        series: SeriesPayload,
    },
    PanMap(LatLng),
}

impl Command {
    /// Every signal name the page listens to, aliases included.
    pub const SIGNALS: &'static [&'static str] = &[
        "sendMarkerTemplate",
        "setMarkerIconTemplate",
        "addSingleStation",
        "addStation",
        "addStations",
        "clearStations",
        "setMarkersColors",
        "setStationsState",
        "fitMapBound",
        "sendStationData",
        "panMap",
    ];

    pub fn decode(signal: &str, args: &[Value]) -> Result<Command, MapError> {
        let command = match signal {
            "sendMarkerTemplate" | "setMarkerIconTemplate" => {
                let a = Args::new("setMarkerIconTemplate", args);
                Command::SetIconTemplate(a.string(0)?)
            }
            "addSingleStation" | "addStation" => {
                let a = Args::new("addStation", args);
                Command::AddStation(Station {
                    name: a.string(0)?,
                    position: LatLng::new(a.number(1)?, a.number(2)?),
                    tooltip: a.optional_string(3)?.unwrap_or_default(),
                    has_plot: a.optional_bool(4)?.unwrap_or(false),
                })
            }
            "addStations" => Command::AddStations(Args::new("addStations", args).payload(0)?),
            "clearStations" => Command::ClearStations,
            "setMarkersColors" => {
                Command::SetMarkersColors(Args::new("setMarkersColors", args).payload(0)?)
            }
            "setStationsState" => {
                let a = Args::new("setStationsState", args);
                Command::SetStationsState {
                    names: a.payload(0)?,
                    action: StateAction::from_code(a.integer(1)?)?,
                }
            }
            "fitMapBound" => Command::FitMapBound,
            "sendStationData" => {
                let a = Args::new("sendStationData", args);
                Command::SendStationData {
                    name: a.string(0)?,
                    series: a.payload(1)?,
                }
            }
            "panMap" => {
                let a = Args::new("panMap", args);
                Command::PanMap(LatLng::new(a.number(1)?, a.number(0)?))
            }
            other => return Err(MapError::UnknownCommand(other.to_string())),
        };
        Ok(command)
    }

    /// Canonical name, used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Command::SetIconTemplate(_) => "setMarkerIconTemplate",
            Command::AddStation(_) => "addStation",
            Command::AddStations(_) => "addStations",
            Command::ClearStations => "clearStations",
            Command::SetMarkersColors(_) => "setMarkersColors",
            Command::SetStationsState { .. } => "setStationsState",
            Command::FitMapBound => "fitMapBound",
            Command::SendStationData { .. } => "sendStationData",
            Command::PanMap(_) => "panMap",
        }
    }
}

/// Positional argument access with errors that name the command.
struct Args<'a> {
    command: &'static str,
    values: &'a [Value],
}

impl<'a> Args<'a> {
    fn new(command: &'static str, values: &'a [Value]) -> Self {
        Self { command, values }
    }

    fn get(&self, index: usize) -> Option<&'a Value> {
        self.values.get(index).filter(|v| !v.is_null())
    }

    fn required(&self, index: usize) -> Result<&'a Value, MapError> {
        self.get(index).ok_or(MapError::MissingArgument {
            command: self.command,
            index,
        })
    }

    fn invalid(&self, index: usize, expected: &'static str) -> MapError {
        MapError::InvalidArgument {
            command: self.command,
            index,
            expected,
        }
    }

    fn string(&self, index: usize) -> Result<String, MapError> {
        self.required(index)?
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| self.invalid(index, "a string"))
    }

    fn optional_string(&self, index: usize) -> Result<Option<String>, MapError> {
        match self.get(index) {
            None => Ok(None),
            Some(_) => self.string(index).map(Some),
        }
    }

    fn number(&self, index: usize) -> Result<f64, MapError> {
        self.required(index)?
            .as_f64()
            .ok_or_else(|| self.invalid(index, "a number"))
    }

    fn integer(&self, index: usize) -> Result<i64, MapError> {
        let value = self.required(index)?;
        value
            .as_i64()
            .or_else(|| value.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
            .ok_or_else(|| self.invalid(index, "an integer"))
    }

    fn optional_bool(&self, index: usize) -> Result<Option<bool>, MapError> {
        match self.get(index) {
            None => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(v) => match v.as_i64() {
                Some(0) => Ok(Some(false)),
                Some(1) => Ok(Some(true)),
                _ => Err(self.invalid(index, "a boolean")),
            },
        }
    }

    /// A structured payload, given either as JSON text or as a value.
    fn payload<T: DeserializeOwned>(&self, index: usize) -> Result<T, MapError> {
        let value = self.required(index)?;
        let parsed = match value {
            Value::String(text) => serde_json::from_str(text),
            other => serde_json::from_value(other.clone()),
        };
        parsed.map_err(|e| MapError::Payload {
            command: self.command,
            message: e.to_string(),
        })
    }
}

/// Calls the page makes on the host object.
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    MapMove(LatLng),
    MapLeftClick(LatLng),
    MapRightClick,
    MarkerMouseover(String),
    MarkerMouseout(String),
    MarkerClick { name: String, action: StateAction },
    MarkerRightClick(String),
    Ready,
    Print(String),
}

impl HostEvent {
    /// Pointer entered or left a marker.
    pub fn marker_hover(name: &str, entering: bool) -> Self {
        if entering {
            HostEvent::MarkerMouseover(name.to_string())
        } else {
            HostEvent::MarkerMouseout(name.to_string())
        }
    }

    /// Click on a marker: ask the host to select it unless it already is.
    pub fn marker_click(name: &str, currently_selected: bool) -> Self {
        let action = if currently_selected {
            StateAction::Remove(StateFlag::Selected)
        } else {
            StateAction::Add(StateFlag::Selected)
        };
        HostEvent::MarkerClick {
            name: name.to_string(),
            action,
        }
    }

    pub fn slot(&self) -> &'static str {
        match self {
            HostEvent::MapMove(_) => "onMapMove",
            HostEvent::MapLeftClick(_) => "onMapLeftClick",
            HostEvent::MapRightClick => "onMapRightClick",
            HostEvent::MarkerMouseover(_) => "onMarkerMouseover",
            HostEvent::MarkerMouseout(_) => "onMarkerMouseout",
            HostEvent::MarkerClick { .. } => "onMarkerClick",
            HostEvent::MarkerRightClick(_) => "onMarkerRightClick",
            HostEvent::Ready => "onMapLoad",
            HostEvent::Print(_) => "jsPrint",
        }
    }

    pub fn args(&self) -> Vec<Value> {
        match self {
            HostEvent::MapMove(at) | HostEvent::MapLeftClick(at) => {
                vec![at.lng.into(), at.lat.into()]
            }
            HostEvent::MapRightClick | HostEvent::Ready => Vec::new(),
            HostEvent::MarkerMouseover(name)
            | HostEvent::MarkerMouseout(name)
            | HostEvent::MarkerRightClick(name)
            | HostEvent::Print(name) => vec![name.as_str().into()],
            HostEvent::MarkerClick { name, action } => {
                vec![name.as_str().into(), action.code().into()]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_add_station() {
        let cmd = Command::decode(
            "addSingleStation",
            &[json!("BRST"), json!(48.38), json!(-4.5), json!("Brest"), json!(true)],
        )
        .unwrap();
        let Command::AddStation(station) = cmd else {
            panic!("wrong command: {cmd:?}");
        };
        assert_eq!(station.name, "BRST");
        assert_eq!(station.position, LatLng::new(48.38, -4.5));
        assert!(station.has_plot);
    }

    #[test]
    fn test_decode_add_station_defaults() {
        let cmd = Command::decode("addStation", &[json!("A"), json!(1), json!(2)]).unwrap();
        assert!(matches!(cmd, Command::AddStation(ref s) if s.tooltip.is_empty() && !s.has_plot));
    }

    #[test]
    fn test_decode_add_stations_from_json_text() {
        let text = r#"{"staname":["A","B"],"lat":[1,2],"lon":[3,4],"tooltip":["t1","t2"],"plotted":[true,false]}"#;
        let cmd = Command::decode("addStations", &[json!(text)]).unwrap();
        let Command::AddStations(batch) = cmd else {
            panic!("wrong command");
        };
        assert_eq!(batch.len(), 2);
    }

    #[test]
    fn test_decode_add_stations_from_value() {
        let cmd = Command::decode(
            "addStations",
            &[json!({"name": ["A"], "lat": [1], "lon": [3]})],
        )
        .unwrap();
        assert!(matches!(cmd, Command::AddStations(ref b) if b.len() == 1));
    }

    #[test]
    fn test_decode_set_stations_state() {
        let cmd = Command::decode("setStationsState", &[json!(r#"["A","B"]"#), json!(-3)]).unwrap();
        assert_eq!(
            cmd,
            Command::SetStationsState {
                names: vec!["A".into(), "B".into()],
                action: StateAction::Remove(StateFlag::Selected),
            }
        );
    }

    #[test]
    fn test_decode_rejects_bad_state_code() {
        let err = Command::decode("setStationsState", &[json!("[]"), json!(7)]).unwrap_err();
        assert_eq!(err, MapError::InvalidStateCode(7));
    }

    #[test]
    fn test_decode_station_data() {
        let cmd = Command::decode(
            "sendStationData",
            &[json!("A"), json!(r#"{"t":[0],"Zlow":[1],"Zhigh":[2],"Z":[1.5]}"#)],
        )
        .unwrap();
        let Command::SendStationData { name, series } = cmd else {
            panic!("wrong command");
        };
        assert_eq!(name, "A");
        assert_eq!(series.average, vec![Some(1.5)]);
    }

    #[test]
    fn test_decode_pan_map_takes_lng_first() {
        let cmd = Command::decode("panMap", &[json!(7.0), json!(48.0)]).unwrap();
        assert_eq!(cmd, Command::PanMap(LatLng::new(48.0, 7.0)));
    }

    #[test]
    fn test_decode_missing_and_invalid_arguments() {
        assert_eq!(
            Command::decode("sendMarkerTemplate", &[]).unwrap_err(),
            MapError::MissingArgument {
                command: "setMarkerIconTemplate",
                index: 0
            }
        );
        assert_eq!(
            Command::decode("addStation", &[json!("A"), json!("north"), json!(2)]).unwrap_err(),
            MapError::InvalidArgument {
                command: "addStation",
                index: 1,
                expected: "a number"
            }
        );
        assert!(matches!(
            Command::decode("setMarkersColors", &[json!("{oops")]).unwrap_err(),
            MapError::Payload { .. }
        ));
    }

    #[test]
    fn test_decode_unknown() {
        assert_eq!(
            Command::decode("selfDestruct", &[]).unwrap_err(),
            MapError::UnknownCommand("selfDestruct".into())
        );
    }

    #[test]
    fn test_every_signal_decodes_or_needs_args() {
        for signal in Command::SIGNALS {
            let res = Command::decode(signal, &[]);
            assert!(
                !matches!(res, Err(MapError::UnknownCommand(_))),
                "{signal} is not routed"
            );
        }
    }

    #[test]
    fn test_host_event_wire() {
        let ev = HostEvent::MapMove(LatLng::new(48.0, 7.0));
        assert_eq!(ev.slot(), "onMapMove");
        assert_eq!(ev.args(), vec![json!(7.0), json!(48.0)]);

        let ev = HostEvent::marker_click("A", false);
        assert_eq!(ev.slot(), "onMarkerClick");
        assert_eq!(ev.args(), vec![json!("A"), json!(2)]);

        let ev = HostEvent::marker_click("A", true);
        assert_eq!(ev.args(), vec![json!("A"), json!(-3)]);

        let ev = HostEvent::marker_hover("A", false);
        assert_eq!(ev.slot(), "onMarkerMouseout");
        assert_eq!(ev.args(), vec![json!("A")]);

        assert!(HostEvent::Ready.args().is_empty());
        assert_eq!(HostEvent::Ready.slot(), "onMapLoad");
    }
}
