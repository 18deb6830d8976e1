//! Imperative reconciliation against the external map engine and panel.
//!
//! This module is the only place allowed to call into the
//! [`MapEngine`] / [`PanelSink`] contracts; everything upstream of it
//! (state transitions, style resolution) is pure.

mod orchestrator;

use geo_types::Rect;

pub use orchestrator::RenderOrchestrator;

use crate::model::{Feature, FeatureId};
use crate::notify::Notice;
use crate::state::ViewState;
use crate::style::Style;

/// Logical name of the main aquifer layer on the map.
pub const MAIN_LAYER: &str = "aquifers";

/// Contract consumed from the external map-rendering engine.
///
/// The engine owns pan/zoom, tile compositing, vector rendering, and
/// hit-testing; the viewer core only pushes layers, styles, draw order,
/// and camera moves through this seam.
pub trait MapEngine: Send {
    /// Mount the main feature layer. Features are later addressed by
    /// their [`FeatureId`].
    fn add_features(&mut self, layer: &str, features: &[Feature]);

    /// Mount an auxiliary overlay layer from raw GeoJSON.
    fn add_overlay(&mut self, layer: &str, collection: &geojson::FeatureCollection);

    fn remove_overlay(&mut self, layer: &str);

    fn set_style(&mut self, feature: FeatureId, style: &Style);

    fn bring_to_front(&mut self, feature: FeatureId);

    /// Fit the view to `bounds`, padded by `padding` (fraction of the
    /// bounds size).
    fn fit_bounds(&mut self, bounds: Rect, padding: f64);

    fn fly_to(&mut self, lat: f64, lon: f64, zoom: Option<f64>);
}

/// Contract exposed to the (excluded) presentation layer.
pub trait PanelSink: Send {
    /// Reflect a committed state snapshot in the panel controls.
    fn reflect(&mut self, state: &ViewState);

    /// Display one feature's properties in the info panel.
    fn show_feature(&mut self, feature: &Feature);

    /// Surface a user-visible notice (banner or toast).
    fn notify(&mut self, notice: &Notice);
}
