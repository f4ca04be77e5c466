use crate::feature::CountryFeature;
use crate::selection::SelectionState;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum ColorMode {
    #[default]
    Light,
    Dark,
}

/// Polygon styling handed to the renderer, keyed on hover/selection identity.
///
/// Plain value: every method is a pure function of its arguments, so the
/// renderer can call them per polygon per frame.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct PolygonStyle {
    pub mode: ColorMode,
}

impl PolygonStyle {
    pub const HOVER_ALTITUDE: f64 = 0.08;
    pub const REST_ALTITUDE: f64 = 0.01;

    pub fn new(mode: ColorMode) -> Self {
        Self { mode }
    }

    /// Selected wins over hovered.
    pub fn cap_color(&self, feature: &CountryFeature, state: &SelectionState) -> &'static str {
        let dark = self.mode == ColorMode::Dark;
        if state.is_selected(feature) {
            if dark { "#2B6CB0" } else { "#3182CE" }
        } else if state.is_hovered(feature) {
            if dark { "#ED8936" } else { "#DD6B20" }
        } else if dark {
            "#2D3748"
        } else {
            "#E2E8F0"
        }
    }

    /// Hovered polygons are lifted off the globe.
    pub fn altitude(&self, feature: &CountryFeature, state: &SelectionState) -> f64 {
        if state.is_hovered(feature) {
            Self::HOVER_ALTITUDE
        } else {
            Self::REST_ALTITUDE
        }
    }

    pub fn tooltip(&self, feature: &CountryFeature) -> String {
        format!("{}\nClick to see news", feature.name())
    }
}

/// The globe idles in auto-rotation until a country is selected.
pub fn auto_rotate(state: &SelectionState) -> bool {
    state.selected.is_none()
}
