// ── Viewer facade ──
//
// Central entry point: loads the dataset, builds the store, wires the
// state container to the render orchestrator, and translates user
// input into state patches. Load failures degrade into user-visible
// notices; the viewer itself always comes up.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tracing::{info, warn};

use aquaview_fetch::BatchOutcome;
use aquaview_fetch::batch::{fetch_collections, fetch_optional};
use aquaview_fetch::manifest::fetch_manifest;

use crate::config::ViewerConfig;
use crate::error::ViewerError;
use crate::model::{FeatureId, LevelFilter};
use crate::notify::Notice;
use crate::render::{MapEngine, PanelSink, RenderOrchestrator};
use crate::state::{CameraCommand, StateContainer, StatePatch, StateStream, ViewState};
use crate::store::FeatureStore;

/// Summary of one load cycle, for logs and the embedding shell's
/// startup line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub manifest_ok: bool,
    pub files_requested: usize,
    pub files_fetched: usize,
    pub files_failed: usize,
    pub features: usize,
    pub features_dropped: usize,
    pub groups: usize,
}

/// The assembled viewer: feature store, state container, and render
/// orchestrator behind one facade.
pub struct Viewer {
    config: ViewerConfig,
    store: Arc<FeatureStore>,
    container: Arc<StateContainer>,
    orchestrator: Arc<RenderOrchestrator>,
    report: LoadReport,
}

impl Viewer {
    /// Load the dataset and bring up the viewer.
    ///
    /// Fetches the manifest, runs the batched data fetch, fetches
    /// overlays, then mounts the main layer and performs the initial
    /// render (fit to full collection bounds). A missing manifest or a
    /// fully failed batch produces a blocking notice and an empty main
    /// layer rather than an error: overlays and the panel still work.
    pub async fn load(
        config: ViewerConfig,
        engine: Box<dyn MapEngine>,
        panel: Box<dyn PanelSink>,
    ) -> Result<Self, ViewerError> {
        config.validate()?;
        let client = config.transport.build_client()?;

        let mut report = LoadReport::default();
        let mut notices = Vec::new();
        let collections = fetch_main_collection(&client, &config, &mut report, &mut notices).await;

        let store = Arc::new(FeatureStore::from_collections(collections));
        report.features = store.len();
        report.features_dropped = store.dropped();
        report.groups = store.group_count();
        info!(
            files = report.files_fetched,
            failed = report.files_failed,
            features = report.features,
            groups = report.groups,
            "dataset loaded"
        );

        let mut overlay_data = HashMap::new();
        let mut overlay_flags = BTreeMap::new();
        for spec in &config.overlays {
            overlay_flags.insert(spec.name.clone(), spec.visible);
            if let Some(collection) = fetch_optional(&client, &spec.url).await {
                overlay_data.insert(spec.name.clone(), collection);
            }
        }

        let container = Arc::new(StateContainer::new(ViewState::initial(
            config.default_opacity,
            overlay_flags,
        )));
        let orchestrator = Arc::new(RenderOrchestrator::new(
            Arc::clone(&store),
            engine,
            panel,
            overlay_data,
            &config,
        ));

        // Every committed snapshot drives one render pass. The weak
        // reference avoids a container → subscriber → container cycle.
        {
            let orch = Arc::clone(&orchestrator);
            let weak = Arc::downgrade(&container);
            container.subscribe(move |state| {
                let camera = weak.upgrade().and_then(|c| c.take_camera());
                orch.render(state, camera);
            });
        }

        orchestrator.mount();
        orchestrator.render(&container.get(), Some(CameraCommand::ResetView));
        for notice in &notices {
            orchestrator.notify(notice);
        }

        Ok(Self {
            config,
            store,
            container,
            orchestrator,
            report,
        })
    }

    // ── Panel input ──────────────────────────────────────────────────

    /// Apply a partial state update coming from any panel control.
    pub fn apply(&self, patch: StatePatch) {
        self.container.apply(patch);
    }

    pub fn set_opacity(&self, opacity: f64) {
        self.apply(StatePatch::opacity(opacity));
    }

    pub fn set_filter(&self, filter: LevelFilter) {
        self.apply(StatePatch::filter(filter));
    }

    pub fn select_group(&self, group: impl Into<String>) {
        self.apply(StatePatch::select(group));
    }

    pub fn deselect(&self) {
        self.apply(StatePatch::deselect());
    }

    /// Flip one overlay's visibility. Unknown names are ignored.
    pub fn toggle_overlay(&self, name: &str) {
        let mut overlays = self.container.get().overlays.clone();
        match overlays.get_mut(name) {
            Some(flag) => {
                *flag = !*flag;
                self.apply(StatePatch::overlays(overlays));
            }
            None => warn!(overlay = %name, "toggle for unknown overlay"),
        }
    }

    pub fn fly_to(&self, lat: f64, lon: f64, zoom: Option<f64>, label: Option<String>) {
        self.apply(StatePatch::fly_to(lat, lon, zoom, label));
    }

    pub fn reset(&self) {
        self.apply(StatePatch::reset());
    }

    /// Look up an alternate key and select its group.
    ///
    /// Returns `false` (with a toast) when no feature carried the key.
    pub fn search_key(&self, key: &str) -> bool {
        match self.store.group_of_key(key.trim()) {
            Some(group) => {
                let group = group.to_owned();
                self.select_group(group);
                true
            }
            None => {
                self.orchestrator
                    .notify(&Notice::toast(format!("no aquifer with key '{}'", key.trim())));
                false
            }
        }
    }

    // ── Map input ────────────────────────────────────────────────────

    /// Handle a feature click: show its properties and select its
    /// group. Clicking the already-selected group redisplays the info
    /// panel but never toggles the selection off.
    pub fn feature_clicked(&self, id: FeatureId) {
        self.orchestrator.show_feature(id);

        let Some(feature) = self.store.get(id) else {
            return;
        };
        if let Some(group) = &feature.group {
            if self.container.get().selection.as_deref() != Some(group.as_str()) {
                self.select_group(group.clone());
            }
        }
    }

    pub fn pointer_over(&self, id: FeatureId) {
        self.orchestrator.pointer_over(id, &self.container.get());
    }

    pub fn pointer_out(&self, id: FeatureId) {
        self.orchestrator.pointer_out(id, &self.container.get());
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn state(&self) -> Arc<ViewState> {
        self.container.get()
    }

    /// Async subscription to committed snapshots.
    pub fn state_stream(&self) -> StateStream {
        self.container.stream()
    }

    pub fn store(&self) -> &Arc<FeatureStore> {
        &self.store
    }

    pub fn report(&self) -> &LoadReport {
        &self.report
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }
}

/// Manifest + batched data fetch, folded into collections plus notices.
async fn fetch_main_collection(
    client: &reqwest::Client,
    config: &ViewerConfig,
    report: &mut LoadReport,
    notices: &mut Vec<Notice>,
) -> Vec<geojson::FeatureCollection> {
    let manifest = match fetch_manifest(client, &config.manifest_url).await {
        Ok(manifest) => manifest,
        Err(error) => {
            warn!(%error, "manifest unavailable");
            notices.push(Notice::blocking(format!("aquifer dataset unavailable: {error}")));
            return Vec::new();
        }
    };

    let urls = match manifest.resolve_urls(&config.manifest_url) {
        Ok(urls) => urls,
        Err(error) => {
            warn!(%error, "manifest file entries unresolvable");
            notices.push(Notice::blocking(format!("aquifer dataset unavailable: {error}")));
            return Vec::new();
        }
    };

    report.manifest_ok = true;
    report.files_requested = urls.len();

    let batch = fetch_collections(client, &urls, config.concurrency).await;
    report.files_fetched = batch.collections.len();
    report.files_failed = batch.failures.len();

    match batch.outcome() {
        BatchOutcome::AllFailed => notices.push(Notice::blocking(
            "none of the aquifer data files could be loaded".to_owned(),
        )),
        BatchOutcome::Partial => notices.push(Notice::toast(format!(
            "{} of {} aquifer data files failed to load",
            report.files_failed, report.files_requested
        ))),
        BatchOutcome::Complete | BatchOutcome::Empty => {}
    }

    batch
        .collections
        .into_iter()
        .map(|fetched| fetched.collection)
        .collect()
}
