// ── Feature store ──
//
// The merged, indexed, read-only home of every feature that survived
// ingestion. Built once from the fetched collections; the render layer
// only ever reads from it.

use std::collections::HashMap;

use geo::BoundingRect;
use geo_types::{Rect, coord};
use indexmap::IndexMap;
use tracing::info;

use crate::model::{Feature, FeatureId, normalize_feature};

/// Merged feature collection plus lookup indexes and precomputed
/// bounds.
///
/// Invariants: the feature list concatenates the input collections in
/// input order; every feature with a group name appears in exactly one
/// group's list; groupless features are stored (and rendered) but never
/// indexed.
#[derive(Debug, Default)]
pub struct FeatureStore {
    features: Vec<Feature>,

    /// Group name → feature ids, both in encounter order.
    groups: IndexMap<String, Vec<FeatureId>>,

    /// Alternate key → group name, first writer wins.
    keys: HashMap<String, String>,

    group_bounds: HashMap<String, Rect>,
    full_bounds: Option<Rect>,

    /// Features discarded at ingestion (no usable geometry).
    dropped: usize,
}

impl FeatureStore {
    /// Merge fetched collections into one indexed store.
    ///
    /// Collections are consumed in iteration order, which the fetcher
    /// guarantees to match request order for successful files.
    pub fn from_collections<I>(collections: I) -> Self
    where
        I: IntoIterator<Item = geojson::FeatureCollection>,
    {
        let mut store = Self::default();

        for collection in collections {
            for raw in &collection.features {
                let id = FeatureId(store.features.len());
                match normalize_feature(id, raw) {
                    Some(feature) => store.insert(feature),
                    None => store.dropped += 1,
                }
            }
        }

        info!(
            features = store.features.len(),
            groups = store.groups.len(),
            keys = store.keys.len(),
            dropped = store.dropped,
            "feature store built"
        );
        store
    }

    fn insert(&mut self, feature: Feature) {
        let bounds = feature.geometry.bounding_rect();

        if let Some(rect) = bounds {
            self.full_bounds = expand(self.full_bounds, rect);
        }

        if let Some(group) = &feature.group {
            self.groups
                .entry(group.clone())
                .or_default()
                .push(feature.id);
            if let Some(rect) = bounds {
                let merged = expand(self.group_bounds.get(group).copied(), rect);
                if let Some(merged) = merged {
                    self.group_bounds.insert(group.clone(), merged);
                }
            }
            if let Some(key) = &feature.key {
                self.keys.entry(key.clone()).or_insert_with(|| group.clone());
            }
        }

        self.features.push(feature);
    }

    // ── Collection access ────────────────────────────────────────────

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    pub fn get(&self, id: FeatureId) -> Option<&Feature> {
        self.features.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Features discarded at ingestion.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    // ── Indexes ──────────────────────────────────────────────────────

    /// Feature ids of a group, in encounter order.
    pub fn group_features(&self, group: &str) -> Option<&[FeatureId]> {
        self.groups.get(group).map(Vec::as_slice)
    }

    /// All group names, in encounter order.
    pub fn group_names(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Group owning an alternate key, if any feature carried it.
    pub fn group_of_key(&self, key: &str) -> Option<&str> {
        self.keys.get(key).map(String::as_str)
    }

    // ── Bounds ───────────────────────────────────────────────────────

    pub fn full_bounds(&self) -> Option<Rect> {
        self.full_bounds
    }

    pub fn group_bounds(&self, group: &str) -> Option<Rect> {
        self.group_bounds.get(group).copied()
    }
}

/// Merge two bounding rects into the smallest rect covering both.
fn expand(acc: Option<Rect>, rect: Rect) -> Option<Rect> {
    Some(match acc {
        None => rect,
        Some(a) => Rect::new(
            coord! { x: a.min().x.min(rect.min().x), y: a.min().y.min(rect.min().y) },
            coord! { x: a.max().x.max(rect.max().x), y: a.max().y.max(rect.max().y) },
        ),
    })
}
