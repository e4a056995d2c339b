//! The two seams the controller talks through: the map widget it draws on and
//! the host it reports to. The browser crate implements both on top of
//! Leaflet and the Qt web channel; tests use recording fakes.

use crate::error::MapError;
use crate::icon::IconSpec;
use crate::models::{Bounds, LatLng, Station};
use crate::plot::PlotSpec;
use crate::protocol::HostEvent;
use crate::state::StateFlag;

pub trait MapSurface {
    /// Whatever the surface needs to find a marker again.
    type Marker;

    /// Draw a marker with its icon, tooltip and (closed) popup.
    fn add_marker(
        &mut self,
        station: &Station,
        icon: &IconSpec,
        popup_html: &str,
    ) -> Result<Self::Marker, MapError>;

    fn remove_marker(&mut self, marker: &Self::Marker);

    /// Add or remove a state's CSS classes on the marker's icon elements.
    fn toggle_state_class(&mut self, station: &str, flag: StateFlag, on: bool)
        -> Result<(), MapError>;

    /// Fire a synthetic event on the marker so its own listeners react.
    fn fire(&mut self, marker: &Self::Marker, event: &str);

    fn set_fill(&mut self, station: &str, color: &str) -> Result<(), MapError>;

    fn fit_bounds(&mut self, bounds: Bounds);

    fn pan_to(&mut self, at: LatLng);

    fn open_popup(&mut self, marker: &Self::Marker);

    fn render_plot(&mut self, plot: &PlotSpec) -> Result<(), MapError>;
}

/// Outbound half of the bridge.
pub trait HostLink {
    fn send(&self, event: &HostEvent);
}

impl<T: HostLink + ?Sized> HostLink for std::rc::Rc<T> {
    fn send(&self, event: &HostEvent) {
        (**self).send(event)
    }
}
