// aquaview-fetch: async HTTP data access for the aquaview viewer core.
//
// Loads the dataset manifest, fetches per-aquifer GeoJSON files in
// bounded-concurrency waves, and fetches optional overlay files.

pub mod batch;
pub mod error;
pub mod manifest;
pub mod transport;

pub use batch::{BatchOutcome, BatchResult, FetchFailure, FetchedCollection};
pub use error::FetchError;
pub use manifest::Manifest;
pub use transport::TransportConfig;
