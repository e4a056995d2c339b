use serde::Serialize;

use crate::config::PlotConfig;
use crate::error::MapError;
use crate::icon::plot_container_id;
use crate::models::SeriesPayload;

const BAND_FILL: &str = "rgba(0, 0, 0, .07)";

/// A station chart ready to hand to the charting library: options, data
/// columns and where to mount it. Value formatters are functions on the JS
/// side, so they are attached by the renderer using [`format_value`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlotSpec {
    #[serde(skip)]
    pub container_id: String,
    #[serde(skip)]
    pub unit: String,
    pub options: PlotOptions,
    /// Columns: x, low, high, average.
    pub data: Vec<Vec<Option<f64>>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlotOptions {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub scales: Scales,
    pub series: Vec<SeriesOptions>,
    pub axes: Vec<AxisOptions>,
    pub bands: Vec<BandOptions>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scales {
    pub x: ScaleOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScaleOptions {
    pub time: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub band: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span_gaps: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct AxisOptions {
    #[serde(skip)]
    pub unit_ticks: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BandOptions {
    pub series: [usize; 2],
    pub fill: &'static str,
}

impl PlotSpec {
    pub fn build(
        station: &str,
        payload: SeriesPayload,
        config: &PlotConfig,
    ) -> Result<PlotSpec, MapError> {
        payload.validate()?;

        let band = |label, stroke| SeriesOptions {
            label: Some(label),
            stroke: Some(stroke),
            fill: Some(BAND_FILL),
            width: Some(0.0),
            band: Some(true),
            span_gaps: Some(false),
        };
        let options = PlotOptions {
            title: format!("{station} vertical component"),
            width: config.width,
            height: config.height,
            scales: Scales {
                x: ScaleOptions { time: false },
            },
            series: vec![
                SeriesOptions::default(),
                band("Low", "blue"),
                band("High", "red"),
                SeriesOptions {
                    label: Some("Avg"),
                    stroke: Some("teal"),
                    width: Some(1.0),
                    span_gaps: Some(false),
                    ..Default::default()
                },
            ],
            axes: vec![
                AxisOptions::default(),
                AxisOptions { unit_ticks: true },
            ],
            bands: vec![BandOptions {
                series: [2, 1],
                fill: BAND_FILL,
            }],
        };

        let SeriesPayload {
            t,
            low,
            high,
            average,
        } = payload;
        Ok(PlotSpec {
            container_id: plot_container_id(station),
            unit: config.unit.clone(),
            options,
            data: vec![t.into_iter().map(Some).collect(), low, high, average],
        })
    }

    /// Indices of the series whose hover value carries the unit.
    pub fn value_series(&self) -> impl Iterator<Item = usize> + '_ {
        (1..self.options.series.len()).filter(|&i| self.options.series[i].label.is_some())
    }

    /// Indices of the axes whose ticks carry the unit.
    pub fn unit_axes(&self) -> impl Iterator<Item = usize> + '_ {
        self.options
            .axes
            .iter()
            .enumerate()
            .filter(|(_, axis)| axis.unit_ticks)
            .map(|(i, _)| i)
    }
}

/// Hover and tick label for one value.
pub fn format_value(value: Option<f64>, unit: &str) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{v} {unit}"),
        _ => "--".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> SeriesPayload {
        SeriesPayload {
            t: vec![0.0, 1.0, 2.0],
            low: vec![Some(1.0), None, Some(2.0)],
            high: vec![Some(3.0), None, Some(4.0)],
            average: vec![Some(2.0), None, Some(3.0)],
        }
    }

    #[test]
    fn test_build_columns_and_target() {
        let spec = PlotSpec::build("BRST", payload(), &PlotConfig::default()).unwrap();
        assert_eq!(spec.container_id, "plot_BRST");
        assert_eq!(spec.options.title, "BRST vertical component");
        assert_eq!(spec.data.len(), 4);
        assert_eq!(spec.data[0], vec![Some(0.0), Some(1.0), Some(2.0)]);
        assert_eq!(spec.data[3][1], None);
    }

    #[test]
    fn test_options_json_shape() {
        let spec = PlotSpec::build("A", payload(), &PlotConfig::default()).unwrap();
        let json = serde_json::to_value(&spec.options).unwrap();
        assert_eq!(json["width"], 400);
        assert_eq!(json["height"], 200);
        assert_eq!(json["scales"]["x"]["time"], false);
        assert_eq!(json["series"][0], serde_json::json!({}));
        assert_eq!(json["series"][1]["label"], "Low");
        assert_eq!(json["series"][1]["band"], true);
        assert_eq!(json["series"][2]["stroke"], "red");
        assert_eq!(json["series"][3]["label"], "Avg");
        assert_eq!(json["series"][3]["spanGaps"], false);
        assert!(json["series"][3].get("band").is_none());
        assert_eq!(json["bands"][0]["series"], serde_json::json!([2, 1]));
    }

    #[test]
    fn test_unit_targets() {
        let spec = PlotSpec::build("A", payload(), &PlotConfig::default()).unwrap();
        assert_eq!(spec.value_series().collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(spec.unit_axes().collect::<Vec<_>>(), vec![1]);
        assert_eq!(spec.unit, "mm");
    }

    #[test]
    fn test_rejects_ragged_payload() {
        let mut bad = payload();
        bad.high.pop();
        assert!(PlotSpec::build("A", bad, &PlotConfig::default()).is_err());
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(Some(2.0), "mm"), "2 mm");
        assert_eq!(format_value(Some(-1.25), "mm"), "-1.25 mm");
        assert_eq!(format_value(None, "mm"), "--");
        assert_eq!(format_value(Some(f64::NAN), "mm"), "--");
    }
}
