pub mod collection;
pub mod dedup;
pub mod enrichment;
pub mod extractor;
pub mod importer;
pub mod store;
pub mod tabular;
pub mod taxonomy;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;
pub mod traits;

pub use importer::{BatchImporter, ImportDeps, ItemFailure};
