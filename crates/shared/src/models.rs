use serde::{Deserialize, Serialize};

use crate::error::MapError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Geographic bounding box, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl Bounds {
    /// Smallest box containing every point, or `None` for an empty iterator.
    pub fn enclosing(points: impl IntoIterator<Item = LatLng>) -> Option<Bounds> {
        let mut points = points.into_iter();
        let first = points.next()?;
        let init = Bounds {
            south: first.lat,
            west: first.lng,
            north: first.lat,
            east: first.lng,
        };
        Some(points.fold(init, |b, p| Bounds {
            south: b.south.min(p.lat),
            west: b.west.min(p.lng),
            north: b.north.max(p.lat),
            east: b.east.max(p.lng),
        }))
    }

    pub fn south_west(&self) -> LatLng {
        LatLng::new(self.south, self.west)
    }

    pub fn north_east(&self) -> LatLng {
        LatLng::new(self.north, self.east)
    }
}

/// A measurement station as the host describes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    pub name: String,
    pub position: LatLng,
    pub tooltip: String,
    pub has_plot: bool,
}

/// Bulk `addStations` payload: parallel arrays matched by index.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StationBatch {
    #[serde(alias = "name")]
    pub staname: Vec<String>,
    pub lat: Vec<f64>,
    #[serde(alias = "lng")]
    pub lon: Vec<f64>,
    #[serde(default)]
    pub tooltip: Vec<String>,
    #[serde(default)]
    pub plotted: Vec<bool>,
}

impl StationBatch {
    pub fn len(&self) -> usize {
        self.staname.len()
    }

    pub fn is_empty(&self) -> bool {
        self.staname.is_empty()
    }

    /// Split the parallel arrays into stations, refusing the whole batch if
    /// any array disagrees in length with the names. Omitted `tooltip` and
    /// `plotted` arrays mean empty tooltips and no plot.
    pub fn into_stations(self) -> Result<Vec<Station>, MapError> {
        let n = self.staname.len();
        check_len("lat", n, self.lat.len())?;
        check_len("lon", n, self.lon.len())?;
        if !self.tooltip.is_empty() {
            check_len("tooltip", n, self.tooltip.len())?;
        }
        if !self.plotted.is_empty() {
            check_len("plotted", n, self.plotted.len())?;
        }

        let mut tooltips = self.tooltip.into_iter();
        let mut plotted = self.plotted.into_iter();
        Ok(self
            .staname
            .into_iter()
            .zip(self.lat.into_iter().zip(self.lon))
            .map(|(name, (lat, lon))| Station {
                name,
                position: LatLng::new(lat, lon),
                tooltip: tooltips.next().unwrap_or_default(),
                has_plot: plotted.next().unwrap_or(false),
            })
            .collect())
    }
}

/// `setMarkersColors` payload.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MarkerColors {
    #[serde(alias = "name")]
    pub staname: Vec<String>,
    pub color: Vec<String>,
}

impl MarkerColors {
    pub fn pairs(&self) -> Result<impl Iterator<Item = (&str, &str)>, MapError> {
        check_len("color", self.staname.len(), self.color.len())?;
        Ok(self
            .staname
            .iter()
            .map(String::as_str)
            .zip(self.color.iter().map(String::as_str)))
    }
}

/// Time series sent with `sendStationData`: a value band and its average.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SeriesPayload {
    #[serde(alias = "timestamps")]
    pub t: Vec<f64>,
    #[serde(rename = "Zlow", alias = "low")]
    pub low: Vec<Option<f64>>,
    #[serde(rename = "Zhigh", alias = "high")]
    pub high: Vec<Option<f64>>,
    #[serde(rename = "Z", alias = "average")]
    pub average: Vec<Option<f64>>,
}

impl SeriesPayload {
    pub fn validate(&self) -> Result<(), MapError> {
        let n = self.t.len();
        check_len("low", n, self.low.len())?;
        check_len("high", n, self.high.len())?;
        check_len("average", n, self.average.len())
    }
}

fn check_len(field: &'static str, expected: usize, found: usize) -> Result<(), MapError> {
    if expected == found {
        Ok(())
    } else {
        Err(MapError::LengthMismatch {
            field,
            expected,
            found,
        })
    }
}
