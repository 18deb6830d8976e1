// Canonical feature record, produced once at ingestion and immutable
// for the rest of the session. Only the visual representation of a
// feature ever changes.

use std::fmt;

use indexmap::IndexMap;

use super::level::Level;

/// Dense session-stable identifier: the feature's index in the merged
/// collection. Assigned at merge time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FeatureId(pub usize);

impl fmt::Display for FeatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One aquifer polygon (or multi-polygon) with its normalized
/// attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub id: FeatureId,

    /// Aquifer name this feature belongs to. `None` when no group alias
    /// matched — the feature is still rendered, but never indexed.
    pub group: Option<String>,

    /// Alternate lookup key (e.g. an official aquifer code).
    pub key: Option<String>,

    /// Vulnerability level driving the fill color.
    pub level: Level,

    /// Remaining scalar properties for the info panel.
    pub display: IndexMap<String, String>,

    /// Geometry converted once at ingestion; used for bounds
    /// computation and handed to the map engine.
    pub geometry: geo_types::Geometry,
}
