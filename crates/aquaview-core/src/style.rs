// ── Style resolution ──
//
// Pure mapping from (feature, view state) to a visual style. No map
// engine calls, no hidden state: same inputs, same output. The render
// orchestrator is the only caller that turns these records into engine
// side effects.

use crate::model::{Feature, Level};
use crate::state::ViewState;

/// Per-feature visual style handed to the map engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Style {
    pub stroke: &'static str,
    pub stroke_weight: f64,
    pub stroke_opacity: f64,
    pub fill: &'static str,
    pub fill_opacity: f64,
}

const BASE_STROKE: &str = "#4d4d4d";
const HOVER_STROKE: &str = "#222222";
const MUTED_STROKE: &str = "#999999";
const SELECTED_STROKE: &str = "#14146e";

const MUTED_FILL: &str = "#c8c8c8";
const UNKNOWN_FILL: &str = "#9e9e9e";

/// Muted fill opacity is fixed: the global opacity slider must not make
/// filtered-out features more prominent.
pub const MUTED_FILL_OPACITY: f64 = 0.15;
pub const SELECTED_FILL_OPACITY: f64 = 0.85;
pub const SELECTED_STROKE_WEIGHT: f64 = 3.0;
pub const HOVER_STROKE_WEIGHT: f64 = 3.0;

/// Green → red ramp for vulnerability levels 1–5.
pub fn level_color(level: Level) -> &'static str {
    match level {
        Level::L1 => "#1a9641",
        Level::L2 => "#a6d96a",
        Level::L3 => "#ffffbf",
        Level::L4 => "#fdae61",
        Level::L5 => "#d7191c",
        Level::Unknown => UNKNOWN_FILL,
    }
}

/// Resolve the style for one feature under the given state.
///
/// Layering: base (level ramp fill, global opacity) → muted override
/// when the active filter excludes the feature → selected override,
/// which beats muted: a selected feature is never muted, regardless of
/// filter.
pub fn resolve(feature: &Feature, state: &ViewState) -> Style {
    let mut style = Style {
        stroke: BASE_STROKE,
        stroke_weight: 1.0,
        stroke_opacity: 1.0,
        fill: level_color(feature.level),
        fill_opacity: state.opacity,
    };

    let selected =
        state.selection.is_some() && feature.group.as_deref() == state.selection.as_deref();

    if !selected && !state.filter.matches(feature.level) {
        style.stroke = MUTED_STROKE;
        style.stroke_opacity = 0.4;
        style.fill = MUTED_FILL;
        style.fill_opacity = MUTED_FILL_OPACITY;
    }

    if selected {
        style.stroke = SELECTED_STROKE;
        style.stroke_weight = SELECTED_STROKE_WEIGHT;
        style.stroke_opacity = 1.0;
        style.fill_opacity = SELECTED_FILL_OPACITY;
    }

    style
}

/// Transient hover variant of a resolved style.
///
/// Applied directly to the rendered layer by the orchestrator; on
/// pointer-out the layer is restored by calling [`resolve`] fresh,
/// never by remembering a previous record.
pub fn hover(style: Style) -> Style {
    Style {
        stroke: HOVER_STROKE,
        stroke_weight: HOVER_STROKE_WEIGHT,
        stroke_opacity: 1.0,
        ..style
    }
}
