//! Replays a host session through the wire decoder and the controller.

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::json;
use stationmap_shared::config::MapConfig;
use stationmap_shared::controller::{Outcome, StateReport};
use stationmap_shared::error::MapError;
use stationmap_shared::icon::IconSpec;
use stationmap_shared::models::{Bounds, LatLng, Station};
use stationmap_shared::plot::PlotSpec;
use stationmap_shared::protocol::HostEvent;
use stationmap_shared::state::{MarkerState, StateFlag};
use stationmap_shared::surface::{HostLink, MapSurface};
use stationmap_shared::StationMap;

#[derive(Default)]
struct DomSurface {
    next: u32,
    icons: Vec<(String, String)>,
    classes: Vec<String>,
    fills: Vec<(String, String)>,
    plots: Vec<(String, usize)>,
    removed: u32,
}

impl MapSurface for DomSurface {
    type Marker = u32;

    fn add_marker(&mut self, station: &Station, icon: &IconSpec, _popup: &str) -> Result<u32, MapError> {
        self.next += 1;
        self.icons.push((station.name.clone(), icon.html.clone()));
        Ok(self.next)
    }

    fn remove_marker(&mut self, _marker: &u32) {
        self.removed += 1;
    }

    fn toggle_state_class(&mut self, station: &str, flag: StateFlag, on: bool) -> Result<(), MapError> {
        let class = format!("{station}:{flag}");
        if on {
            self.classes.push(class);
        } else {
            self.classes.retain(|c| *c != class);
        }
        Ok(())
    }

    fn fire(&mut self, _marker: &u32, _event: &str) {}

    fn set_fill(&mut self, station: &str, color: &str) -> Result<(), MapError> {
        self.fills.push((station.to_string(), color.to_string()));
        Ok(())
    }

    fn fit_bounds(&mut self, _bounds: Bounds) {}

    fn pan_to(&mut self, _at: LatLng) {}

    fn open_popup(&mut self, _marker: &u32) {}

    fn render_plot(&mut self, plot: &PlotSpec) -> Result<(), MapError> {
        if plot.container_id == "plot_MISSING" {
            return Err(MapError::Surface("no element plot_MISSING".into()));
        }
        self.plots.push((plot.container_id.clone(), plot.data[0].len()));
        Ok(())
    }
}

#[derive(Clone, Default)]
struct Host(Rc<RefCell<Vec<HostEvent>>>);

impl HostLink for Host {
    fn send(&self, event: &HostEvent) {
        self.0.borrow_mut().push(event.clone());
    }
}

fn session() -> (StationMap<DomSurface, Host>, Host) {
    let host = Host::default();
    let map = StationMap::new(MapConfig::default(), DomSurface::default(), host.clone());
    (map, host)
}

#[test]
fn test_full_host_session() {
    let (mut map, host) = session();
    assert!(map.announce_ready());

    map.handle(
        "sendMarkerTemplate",
        &[json!("<svg id='svg-icon-{staname}'><circle id='svg-component-{staname}'/></svg>")],
    )
    .unwrap();

    let stations = json!({
        "staname": ["BRST", "ZIMM", "MATE"],
        "lat": [48.38, 46.88, 40.65],
        "lon": [-4.5, 7.47, 16.70],
        "tooltip": ["Brest", "Zimmerwald", "Matera"],
        "plotted": [true, true, false],
    })
    .to_string();
    let added = map.handle("addStations", &[json!(stations)]).unwrap();
    assert_eq!(added, Outcome::Added(3));
    assert_eq!(
        map.surface().icons[0].1,
        "<svg id='svg-icon-BRST'><circle id='svg-component-BRST'/></svg>"
    );

    let colors = json!({"staname": ["BRST", "GONE"], "color": ["#e69f00", "#56b4e9"]}).to_string();
    map.handle("setMarkersColors", &[json!(colors)]).unwrap();
    assert_eq!(map.surface().fills, vec![("BRST".to_string(), "#e69f00".to_string())]);

    let selected = map
        .handle("setStationsState", &[json!(r#"["BRST","ZIMM"]"#), json!(2)])
        .unwrap();
    assert_eq!(
        selected,
        Outcome::States(StateReport {
            applied: 2,
            rejected: 0,
            missing: 0
        })
    );
    map.handle("setStationsState", &[json!(r#"["BRST"]"#), json!(1)]).unwrap();
    assert_eq!(map.state_of("BRST"), Some(MarkerState::HoveredSelected));

    map.handle("setStationsState", &[json!(r#"["BRST","ZIMM"]"#), json!(!2)])
        .unwrap();
    assert_eq!(map.state_of("BRST"), Some(MarkerState::Hovered));
    assert_eq!(map.state_of("ZIMM"), Some(MarkerState::Default));
    assert_eq!(map.surface().classes, vec!["BRST:hovered".to_string()]);

    let fitted = map.handle("fitMapBound", &[]).unwrap();
    let Outcome::Fitted(bounds) = fitted else {
        panic!("expected bounds, got {fitted:?}");
    };
    assert_eq!(bounds.south_west(), LatLng::new(40.65, -4.5));
    assert_eq!(bounds.north_east(), LatLng::new(48.38, 16.70));

    map.on_marker_right_click("ZIMM").unwrap();
    let series = json!({"t": [0, 1, 2], "Z": [1, 2, 3], "Zlow": [0, 1, 2], "Zhigh": [2, 3, 4]}).to_string();
    map.handle("sendStationData", &[json!("ZIMM"), json!(series)]).unwrap();
    assert_eq!(map.surface().plots, vec![("plot_ZIMM".to_string(), 3)]);

    assert_eq!(map.handle("clearStations", &[]).unwrap(), Outcome::Cleared(3));
    assert!(map.markers().is_empty());
    assert_eq!(map.surface().removed, 3);

    let sent = host.0.borrow();
    assert_eq!(sent[0], HostEvent::Ready);
    assert_eq!(sent[1], HostEvent::MarkerRightClick("ZIMM".into()));
    assert_eq!(sent.len(), 2);
}

#[test]
fn test_bad_commands_do_not_disturb_state() {
    let (mut map, host) = session();
    map.handle("addStation", &[json!("A"), json!(1.0), json!(2.0), json!("a"), json!(true)])
        .unwrap();

    let ragged = json!({"staname": ["B", "C"], "lat": [1], "lon": [2, 3]}).to_string();
    assert!(map.handle("addStations", &[json!(ragged)]).is_err());
    assert!(map.handle("setStationsState", &[json!(r#"["A"]"#), json!(-2)]).is_ok());
    assert!(map.handle("nonsense", &[]).is_err());
    assert!(map
        .handle("sendStationData", &[json!("MISSING"), json!(r#"{"t":[],"Z":[],"Zlow":[],"Zhigh":[]}"#)])
        .is_err());

    assert_eq!(map.markers().len(), 1);
    assert_eq!(map.state_of("A"), Some(MarkerState::Default));

    let prints = host
        .0
        .borrow()
        .iter()
        .filter(|e| matches!(e, HostEvent::Print(_)))
        .count();
    assert_eq!(prints, 3);
}
