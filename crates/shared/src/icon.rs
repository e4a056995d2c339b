//! Marker icon and popup markup.
//!
//! The host sends one SVG template with `{staname}` placeholders. Every marker
//! renders its own copy, and the ids inside that copy are how state classes
//! and fill colours find the marker again later.

use serde::{Deserialize, Serialize};

use crate::state::StateFlag;

pub const STATION_PLACEHOLDER: &str = "{staname}";

/// Template used until the host sends its own.
pub const DEFAULT_ICON_TEMPLATE: &str = "<svg xmlns='http://www.w3.org/2000/svg' id='svg-icon-{staname}' class='svg-icon-default' viewBox='0 0 100 100'><circle id='svg-component-{staname}' class='svg-component-default' cx='50' cy='50' r='40' shape-rendering='geometricPrecision'/></svg>";

pub const PLOTTED_CLASS: &str = "station-divicon-plotted";
pub const NOPLOT_CLASS: &str = "station-divicon-noplot";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IconSize {
    pub width: f64,
    pub height: f64,
}

impl IconSize {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// Everything a surface needs to build one marker icon.
#[derive(Debug, Clone, PartialEq)]
pub struct IconSpec {
    pub class_name: &'static str,
    pub html: String,
    pub size: IconSize,
    /// Offset of the marker position inside the icon (its centre).
    pub anchor: (f64, f64),
}

impl IconSpec {
    pub fn build(template: &str, station: &str, size: IconSize, has_plot: bool) -> Self {
        Self {
            class_name: if has_plot { PLOTTED_CLASS } else { NOPLOT_CLASS },
            html: render_template(template, station),
            size,
            anchor: (0.5 * size.width, 0.5 * size.height),
        }
    }
}

pub fn render_template(template: &str, station: &str) -> String {
    template.replace(STATION_PLACEHOLDER, &escape_attr(station))
}

/// Id of the outer SVG element of a marker icon.
pub fn icon_element_id(station: &str) -> String {
    format!("svg-icon-{station}")
}

/// Id of the filled shape inside a marker icon.
pub fn component_element_id(station: &str) -> String {
    format!("svg-component-{station}")
}

pub fn icon_state_class(flag: StateFlag) -> String {
    format!("svg-icon-{}", flag.class_suffix())
}

pub fn component_state_class(flag: StateFlag) -> String {
    format!("svg-component-{}", flag.class_suffix())
}

/// Id of the element a station's chart mounts into.
pub fn plot_container_id(station: &str) -> String {
    format!("plot_{station}")
}

/// Popup body: an empty, fixed-size container the chart is drawn into later.
pub fn popup_markup(station: &str, width: u32, height: u32) -> String {
    format!(
        "<div style='padding: 0; margin: 0; width: {width}px; height: {height}px;' id='{}'></div>",
        escape_attr(&plot_container_id(station))
    )
}

/// Minimal escaping for text dropped into a quoted HTML attribute.
pub fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '\'' => out.push_str("&#39;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_template_replaces_every_placeholder() {
        let html = render_template(DEFAULT_ICON_TEMPLATE, "BRST");
        assert!(html.contains("id='svg-icon-BRST'"));
        assert!(html.contains("id='svg-component-BRST'"));
        assert!(!html.contains(STATION_PLACEHOLDER));
    }

    #[test]
    fn test_icon_spec_class_follows_plot_flag() {
        let size = IconSize::new(16.0, 12.0);
        let plotted = IconSpec::build(DEFAULT_ICON_TEMPLATE, "A", size, true);
        let hidden = IconSpec::build(DEFAULT_ICON_TEMPLATE, "A", size, false);
        assert_eq!(plotted.class_name, PLOTTED_CLASS);
        assert_eq!(hidden.class_name, NOPLOT_CLASS);
        assert_eq!(plotted.anchor, (8.0, 6.0));
    }

    #[test]
    fn test_element_ids() {
        assert_eq!(icon_element_id("A"), "svg-icon-A");
        assert_eq!(component_element_id("A"), "svg-component-A");
        assert_eq!(plot_container_id("A"), "plot_A");
        assert_eq!(icon_state_class(StateFlag::Hovered), "svg-icon-hovered");
        assert_eq!(
            component_state_class(StateFlag::Selected),
            "svg-component-selected"
        );
    }

    #[test]
    fn test_popup_markup() {
        assert_eq!(
            popup_markup("A", 400, 250),
            "<div style='padding: 0; margin: 0; width: 400px; height: 250px;' id='plot_A'></div>"
        );
    }

    #[test]
    fn test_escape_attr() {
        assert_eq!(escape_attr("O'Neil <1>"), "O&#39;Neil &lt;1&gt;");
        assert_eq!(escape_attr("plain"), "plain");
    }
}
