use serde::{Deserialize, Serialize};

/// One owned item from a user's collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionItem {
    pub id: String,
    pub name: String,
}

/// Outcome of a single collection request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionStatus {
    /// HTTP 202: the export is queued server-side; ask again later.
    Generating,
    /// The collection document body.
    Ready(String),
}
