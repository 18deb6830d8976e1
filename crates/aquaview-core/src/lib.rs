//! Viewer core between `aquaview-fetch` and the embedding shell.
//!
//! This crate owns the domain model, view state, and render
//! orchestration for the aquifer-vulnerability viewer:
//!
//! - **[`Viewer`]** — Central facade managing the full lifecycle:
//!   [`load()`](Viewer::load) fetches the manifest and data files,
//!   builds the store, wires the state container to the render
//!   orchestrator, and performs the initial render. Interaction
//!   methods translate panel and map input into state patches.
//!
//! - **[`FeatureStore`]** — Merged, indexed, read-only feature
//!   collection with group/key lookup and precomputed bounds.
//!
//! - **[`StateContainer`]** — Single source of truth for view
//!   parameters. Synchronous observer dispatch in subscription order,
//!   re-entrancy-safe, plus a `watch` mirror ([`StateStream`]) for
//!   async consumers.
//!
//! - **[`style`]** — Pure (feature, state) → [`Style`](style::Style)
//!   resolution encoding the filter/hover/selection precedence rules.
//!
//! - **[`RenderOrchestrator`]** — The only module with side effects on
//!   the external [`MapEngine`] / [`PanelSink`] contracts: restyle
//!   pass, draw-order raise, idempotent overlay reconciliation,
//!   one-shot camera execution, panel refresh.

pub mod config;
pub mod error;
pub mod model;
pub mod notify;
pub mod render;
pub mod state;
pub mod store;
pub mod style;
pub mod viewer;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{OverlaySpec, ViewerConfig};
pub use error::ViewerError;
pub use notify::Notice;
pub use render::{MAIN_LAYER, MapEngine, PanelSink, RenderOrchestrator};
pub use state::{
    CameraCommand, Selection, StateContainer, StatePatch, StateStream, ViewState,
};
pub use store::FeatureStore;
pub use viewer::{LoadReport, Viewer};

// Re-export model types at the crate root for ergonomics.
pub use model::{Feature, FeatureId, Level, LevelFilter};
