use std::collections::HashSet;

use tracing::{debug, info, warn};

use crate::config::MapConfig;
use crate::error::MapError;
use crate::group::{Marker, MarkerGroup};
use crate::icon::{popup_markup, IconSpec, DEFAULT_ICON_TEMPLATE};
use crate::models::{Bounds, LatLng, MarkerColors, SeriesPayload, Station, StationBatch};
use crate::plot::PlotSpec;
use crate::protocol::{Command, HostEvent};
use crate::state::{MarkerState, StateAction, StateFlag};
use crate::surface::{HostLink, MapSurface};

/// Result of a `setStationsState` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StateReport {
    pub applied: usize,
    /// Live markers whose current state does not allow the action.
    pub rejected: usize,
    /// Names with no live marker.
    pub missing: usize,
}

/// Result of a `setMarkersColors` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ColorReport {
    pub applied: usize,
    pub skipped: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Done,
    Added(usize),
    Cleared(usize),
    Colored(ColorReport),
    States(StateReport),
    Fitted(Bounds),
}

/// Everything the page knows: the station markers, the icon template and the
/// two ends it talks to. One instance per map.
pub struct StationMap<S: MapSurface, H: HostLink> {
    config: MapConfig,
    template: String,
    markers: MarkerGroup<S::Marker>,
    surface: S,
    host: H,
    ready: bool,
}

impl<S: MapSurface, H: HostLink> StationMap<S, H> {
    pub fn new(config: MapConfig, surface: S, host: H) -> Self {
        Self {
            config,
            template: DEFAULT_ICON_TEMPLATE.to_string(),
            markers: MarkerGroup::new(),
            surface,
            host,
            ready: false,
        }
    }

    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn markers(&self) -> &MarkerGroup<S::Marker> {
        &self.markers
    }

    pub fn state_of(&self, name: &str) -> Option<MarkerState> {
        self.markers.get(name).map(|m| m.state)
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Decode and apply one host signal. Failures are logged and echoed back to
    /// the host so a bad command never goes unnoticed, then returned.
    pub fn handle(&mut self, signal: &str, args: &[serde_json::Value]) -> Result<Outcome, MapError> {
        let result = Command::decode(signal, args).and_then(|command| self.apply(command));
        if let Err(err) = &result {
            warn!(signal, error = %err, "host command rejected");
            self.host.send(&HostEvent::Print(format!("{signal}: {err}")));
        }
        result
    }

    pub fn apply(&mut self, command: Command) -> Result<Outcome, MapError> {
        debug!(command = command.name(), "applying host command");
        match command {
            Command::SetIconTemplate(svg) => {
                self.set_icon_template(svg);
                Ok(Outcome::Done)
            }
            Command::AddStation(station) => self.add_station(station).map(|()| Outcome::Added(1)),
            Command::AddStations(batch) => self.add_stations(batch).map(Outcome::Added),
            Command::ClearStations => Ok(Outcome::Cleared(self.clear_stations())),
            Command::SetMarkersColors(colors) => self.set_markers_colors(&colors).map(Outcome::Colored),
            Command::SetStationsState { names, action } => {
                Ok(Outcome::States(self.set_stations_state(&names, action)))
            }
            Command::FitMapBound => self.fit_map_bound().map(Outcome::Fitted),
            Command::SendStationData { name, series } => {
                self.send_station_data(&name, series).map(|()| Outcome::Done)
            }
            Command::PanMap(at) => {
                self.pan_map(at);
                Ok(Outcome::Done)
            }
        }
    }

    pub fn set_icon_template(&mut self, svg: String) {
        debug!(len = svg.len(), "icon template received");
        self.template = svg;
    }

    pub fn add_station(&mut self, station: Station) -> Result<(), MapError> {
        if let Some(old) = self.markers.remove(&station.name) {
            warn!(station = %station.name, "station added twice, replacing its marker");
            self.surface.remove_marker(&old.handle);
        }

        let size = self.config.icon_size(station.has_plot);
        let icon = IconSpec::build(&self.template, &station.name, size, station.has_plot);
        let popup = popup_markup(
            &station.name,
            self.config.plot.popup_width,
            self.config.plot.popup_height,
        );
        let handle = self.surface.add_marker(&station, &icon, &popup)?;
        self.markers.insert(Marker::new(station, handle));
        Ok(())
    }

    /// Add a whole batch. The batch is checked up front, so a malformed one
    /// adds nothing. If the surface fails partway, the markers this batch drew
    /// are taken off again; stations it was replacing stay removed.
    pub fn add_stations(&mut self, batch: StationBatch) -> Result<usize, MapError> {
        let stations = batch.into_stations()?;
        let count = stations.len();
        let mut added: Vec<String> = Vec::with_capacity(count);
        for station in stations {
            let name = station.name.clone();
            if let Err(err) = self.add_station(station) {
                for name in added.iter().rev() {
                    if let Some(marker) = self.markers.remove(name) {
                        self.surface.remove_marker(&marker.handle);
                    }
                }
                warn!(station = %name, rolled_back = added.len(), error = %err, "batch aborted");
                return Err(err);
            }
            added.push(name);
        }
        info!(count, total = self.markers.len(), "stations added");
        Ok(count)
    }

    pub fn clear_stations(&mut self) -> usize {
        let mut removed = 0;
        for marker in self.markers.drain() {
            self.surface.remove_marker(&marker.handle);
            removed += 1;
        }
        info!(removed, "stations cleared");
        removed
    }

    /// Colour live stations only; names without a marker are skipped.
    pub fn set_markers_colors(&mut self, colors: &MarkerColors) -> Result<ColorReport, MapError> {
        let mut report = ColorReport::default();
        for (name, color) in colors.pairs()? {
            if !self.markers.contains(name) {
                debug!(station = name, "no marker to colour");
                report.skipped += 1;
                continue;
            }
            match self.surface.set_fill(name, color) {
                Ok(()) => report.applied += 1,
                Err(err) => {
                    warn!(station = name, error = %err, "could not colour marker");
                    report.skipped += 1;
                }
            }
        }
        Ok(report)
    }

    /// Apply one state action to every live marker named in `names`, once per
    /// marker. A marker whose state refuses the action keeps its state.
    pub fn set_stations_state(&mut self, names: &[String], action: StateAction) -> StateReport {
        let mut report = StateReport::default();
        let mut seen = HashSet::new();
        let flag = action.flag();

        for name in names {
            if !seen.insert(name.as_str()) {
                continue;
            }
            let Some(marker) = self.markers.get_mut(name) else {
                report.missing += 1;
                continue;
            };
            match marker.state.apply(action) {
                Ok(next) => {
                    marker.state = next;
                    if let Err(err) = self.surface.toggle_state_class(name, flag, action.is_add()) {
                        warn!(station = %name, error = %err, "could not update marker classes");
                    }
                    self.surface.fire(&marker.handle, synthetic_event(action));
                    report.applied += 1;
                }
                Err(err) => {
                    warn!(station = %name, error = %err, "state change refused");
                    report.rejected += 1;
                }
            }
        }
        report
    }

    pub fn fit_map_bound(&mut self) -> Result<Bounds, MapError> {
        let bounds = self.markers.bounds().ok_or(MapError::EmptyGroup)?;
        self.surface.fit_bounds(bounds);
        Ok(bounds)
    }

    pub fn send_station_data(&mut self, name: &str, series: SeriesPayload) -> Result<(), MapError> {
        if !self.markers.contains(name) {
            debug!(station = name, "plotting a station without a live marker");
        }
        let plot = PlotSpec::build(name, series, &self.config.plot)?;
        self.surface.render_plot(&plot)
    }

    pub fn pan_map(&mut self, at: LatLng) {
        self.surface.pan_to(at);
    }

    /// Left click on a marker: ask the host to toggle its selection. The local
    /// state only changes when the host answers with `setStationsState`.
    pub fn on_marker_click(&self, name: &str) -> Result<(), MapError> {
        let marker = self
            .markers
            .get(name)
            .ok_or_else(|| MapError::UnknownStation(name.to_string()))?;
        self.host
            .send(&HostEvent::marker_click(name, marker.state.is_selected()));
        Ok(())
    }

    /// Right click on a marker: tell the host, then open the popup its plot
    /// will be drawn into.
    pub fn on_marker_right_click(&mut self, name: &str) -> Result<(), MapError> {
        let marker = self
            .markers
            .get(name)
            .ok_or_else(|| MapError::UnknownStation(name.to_string()))?;
        self.host.send(&HostEvent::MarkerRightClick(name.to_string()));
        self.surface.open_popup(&marker.handle);
        Ok(())
    }

    /// Tell the host the page is listening. Only the first call sends anything.
    pub fn announce_ready(&mut self) -> bool {
        if self.ready {
            return false;
        }
        self.ready = true;
        info!("map ready, notifying host");
        self.host.send(&HostEvent::Ready);
        true
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }
}

fn synthetic_event(action: StateAction) -> &'static str {
    match action {
        StateAction::Add(StateFlag::Hovered) => "mouseover",
        StateAction::Remove(StateFlag::Hovered) => "mouseout",
        StateAction::Add(StateFlag::Selected) | StateAction::Remove(StateFlag::Selected) => {
            "mouseclick"
        }
    }
}
