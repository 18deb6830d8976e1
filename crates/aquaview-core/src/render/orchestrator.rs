// ── Render orchestrator ──
//
// Reconciles the map's displayed layers with each committed state
// snapshot: full restyle pass, draw-order raise for the selected group,
// idempotent overlay mount/unmount, one-shot camera execution, panel
// refresh.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::debug;

use super::{MAIN_LAYER, MapEngine, PanelSink};
use crate::config::ViewerConfig;
use crate::model::FeatureId;
use crate::notify::Notice;
use crate::state::{CameraCommand, ViewState};
use crate::store::FeatureStore;
use crate::style;

pub struct RenderOrchestrator {
    store: Arc<FeatureStore>,
    engine: Mutex<Box<dyn MapEngine>>,
    panel: Mutex<Box<dyn PanelSink>>,

    /// Fetched overlay data by layer name. Read-only after load;
    /// an overlay listed in state but absent here has nothing to show.
    overlays: HashMap<String, geojson::FeatureCollection>,

    /// Overlay layers currently mounted on the map.
    mounted: Mutex<BTreeSet<String>>,

    /// Selection observed by the previous render pass, for edge
    /// detection. Unchanged fields never produce a camera move.
    last_selection: Mutex<Option<String>>,

    fit_padding: f64,
    recenter_on_deselect: bool,
}

impl RenderOrchestrator {
    pub fn new(
        store: Arc<FeatureStore>,
        engine: Box<dyn MapEngine>,
        panel: Box<dyn PanelSink>,
        overlays: HashMap<String, geojson::FeatureCollection>,
        config: &ViewerConfig,
    ) -> Self {
        Self {
            store,
            engine: Mutex::new(engine),
            panel: Mutex::new(panel),
            overlays,
            mounted: Mutex::new(BTreeSet::new()),
            last_selection: Mutex::new(None),
            fit_padding: config.fit_padding,
            recenter_on_deselect: config.recenter_on_deselect,
        }
    }

    /// Mount the main feature layer. Called once after the store is
    /// built, before the first render pass.
    pub fn mount(&self) {
        lock(&self.engine).add_features(MAIN_LAYER, self.store.features());
    }

    /// Reconcile the map and panel with one state snapshot.
    ///
    /// `camera` is the one-shot command taken from the container for
    /// this pass, already cleared from the snapshot's successor.
    pub fn render(&self, state: &ViewState, camera: Option<CameraCommand>) {
        debug!(version = state.version, "render pass");
        let mut engine = lock(&self.engine);

        // Restyle every feature. Selection raising happens after, so
        // it is not undone by style application.
        for feature in self.store.features() {
            engine.set_style(feature.id, &style::resolve(feature, state));
        }

        if let Some(group) = &state.selection {
            if let Some(ids) = self.store.group_features(group) {
                for id in ids {
                    engine.bring_to_front(*id);
                }
            }
        }

        self.reconcile_overlays(&mut engine, state);
        self.run_camera(&mut engine, state, camera);
        drop(engine);

        lock(&self.panel).reflect(state);
    }

    /// Forward a notice to the panel.
    pub fn notify(&self, notice: &Notice) {
        lock(&self.panel).notify(notice);
    }

    /// Display one feature's properties in the info panel.
    pub fn show_feature(&self, id: FeatureId) {
        if let Some(feature) = self.store.get(id) {
            lock(&self.panel).show_feature(feature);
        }
    }

    // ── Hover ────────────────────────────────────────────────────────

    /// Apply the transient hover style. Hovering the selected group's
    /// features is a visual no-op.
    pub fn pointer_over(&self, id: FeatureId, state: &ViewState) {
        let Some(feature) = self.store.get(id) else {
            return;
        };
        if state.selection.is_some() && feature.group.as_deref() == state.selection.as_deref() {
            return;
        }
        let hovered = style::hover(style::resolve(feature, state));
        lock(&self.engine).set_style(id, &hovered);
    }

    /// Restore a feature after hover by recomputing its style fresh —
    /// state may have changed while the pointer was over it.
    pub fn pointer_out(&self, id: FeatureId, state: &ViewState) {
        let Some(feature) = self.store.get(id) else {
            return;
        };
        lock(&self.engine).set_style(id, &style::resolve(feature, state));
    }

    // ── Private helpers ──────────────────────────────────────────────

    /// Mount/unmount overlays to match the visibility flags.
    /// Idempotent: an already-mounted or already-absent layer is a
    /// no-op.
    fn reconcile_overlays(&self, engine: &mut MutexGuard<'_, Box<dyn MapEngine>>, state: &ViewState) {
        let mut mounted = lock(&self.mounted);
        for (name, visible) in &state.overlays {
            match (*visible, mounted.contains(name)) {
                (true, false) => {
                    if let Some(data) = self.overlays.get(name) {
                        engine.add_overlay(name, data);
                        mounted.insert(name.clone());
                    } else {
                        debug!(overlay = %name, "overlay enabled but has no data");
                    }
                }
                (false, true) => {
                    engine.remove_overlay(name);
                    mounted.remove(name);
                }
                _ => {}
            }
        }
    }

    /// Execute the pending one-shot command, or derive a fit-to-bounds
    /// move from a selection edge.
    fn run_camera(
        &self,
        engine: &mut MutexGuard<'_, Box<dyn MapEngine>>,
        state: &ViewState,
        camera: Option<CameraCommand>,
    ) {
        let mut last = lock(&self.last_selection);

        if let Some(command) = camera {
            match command {
                CameraCommand::FlyTo {
                    lat,
                    lon,
                    zoom,
                    label,
                } => {
                    debug!(lat, lon, label = label.as_deref().unwrap_or(""), "fly-to");
                    engine.fly_to(lat, lon, zoom);
                }
                CameraCommand::ResetView => {
                    if let Some(bounds) = self.store.full_bounds() {
                        engine.fit_bounds(bounds, self.fit_padding);
                    }
                }
            }
        } else if state.selection != *last {
            match &state.selection {
                Some(group) => {
                    if let Some(bounds) = self.store.group_bounds(group) {
                        engine.fit_bounds(bounds, self.fit_padding);
                    }
                }
                // An edge to none is always an explicit deselection:
                // unchanged fields never produce an edge.
                None => {
                    if self.recenter_on_deselect {
                        if let Some(bounds) = self.store.full_bounds() {
                            engine.fit_bounds(bounds, self.fit_padding);
                        }
                    }
                }
            }
        }

        *last = state.selection.clone();
    }
}

/// Lock with poison recovery, as in the state container.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
