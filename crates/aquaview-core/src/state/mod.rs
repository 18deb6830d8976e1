//! View state: the single source of truth for UI-driven view
//! parameters.
//!
//! State is replaced wholesale on every update, never mutated in place;
//! subscribers always hold structurally isolated snapshots.

mod container;
mod stream;

use std::collections::BTreeMap;

pub use container::StateContainer;
pub use stream::{StateStream, StateWatchStream};

use crate::model::LevelFilter;

/// Default global fill opacity at startup.
pub const DEFAULT_OPACITY: f64 = 0.8;

/// One-shot camera command, consumed and cleared by the render step so
/// it is never replayed on unrelated state updates.
#[derive(Debug, Clone, PartialEq)]
pub enum CameraCommand {
    /// Pan/zoom to a point (e.g. a search result).
    FlyTo {
        lat: f64,
        lon: f64,
        zoom: Option<f64>,
        label: Option<String>,
    },
    /// Fit the view to the full main collection.
    ResetView,
}

/// Selection signal carried by a patch.
///
/// Distinguishes "explicitly deselect" from "no change": a patch whose
/// `selection` field is absent leaves the current selection untouched,
/// while `Selection::None` clears it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    None,
    Group(String),
}

/// Immutable snapshot of every UI-driven view parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    /// Bumped on every committed transition.
    pub version: u64,

    /// Global fill opacity in `[0, 1]`.
    pub opacity: f64,

    /// Active vulnerability-level filter.
    pub filter: LevelFilter,

    /// Currently selected group, if any.
    pub selection: Option<String>,

    /// Auxiliary overlay visibility flags, keyed by overlay name.
    pub overlays: BTreeMap<String, bool>,

    /// Pending one-shot camera command.
    pub camera: Option<CameraCommand>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            version: 0,
            opacity: DEFAULT_OPACITY,
            filter: LevelFilter::All,
            selection: None,
            overlays: BTreeMap::new(),
            camera: None,
        }
    }
}

impl ViewState {
    /// Startup state with configured opacity and overlay flags.
    pub fn initial(opacity: f64, overlays: BTreeMap<String, bool>) -> Self {
        Self {
            opacity: opacity.clamp(0.0, 1.0),
            overlays,
            ..Self::default()
        }
    }

    pub fn overlay_enabled(&self, name: &str) -> bool {
        self.overlays.get(name).copied().unwrap_or(false)
    }
}

/// Partial state update, shallow-merged over the current snapshot.
///
/// A field left as `None` is untouched; a present field fully replaces
/// its prior value. `reset` short-circuits the whole merge.
#[derive(Debug, Clone, Default)]
pub struct StatePatch {
    pub opacity: Option<f64>,
    pub filter: Option<LevelFilter>,
    pub selection: Option<Selection>,
    pub overlays: Option<BTreeMap<String, bool>>,
    pub camera: Option<CameraCommand>,

    /// Replace the state with the startup defaults, ignoring every
    /// other field of this patch.
    pub reset: bool,
}

impl StatePatch {
    pub fn opacity(value: f64) -> Self {
        Self {
            opacity: Some(value),
            ..Self::default()
        }
    }

    pub fn filter(filter: LevelFilter) -> Self {
        Self {
            filter: Some(filter),
            ..Self::default()
        }
    }

    pub fn select(group: impl Into<String>) -> Self {
        Self {
            selection: Some(Selection::Group(group.into())),
            ..Self::default()
        }
    }

    pub fn deselect() -> Self {
        Self {
            selection: Some(Selection::None),
            ..Self::default()
        }
    }

    pub fn overlays(overlays: BTreeMap<String, bool>) -> Self {
        Self {
            overlays: Some(overlays),
            ..Self::default()
        }
    }

    pub fn fly_to(lat: f64, lon: f64, zoom: Option<f64>, label: Option<String>) -> Self {
        Self {
            camera: Some(CameraCommand::FlyTo {
                lat,
                lon,
                zoom,
                label,
            }),
            ..Self::default()
        }
    }

    pub fn reset() -> Self {
        Self {
            reset: true,
            ..Self::default()
        }
    }
}
