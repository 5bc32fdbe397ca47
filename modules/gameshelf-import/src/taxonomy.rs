use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use tracing::debug;
use uuid::Uuid;

use gameshelf_common::TaxonomyKind;

use crate::traits::CatalogStore;

/// Resolves mechanic and publisher names to ids, creating rows on first sight.
///
/// Lives for one batch. The name→id cache only saves round trips; the store's
/// upsert is what keeps names unique.
pub struct TaxonomyResolver {
    store: Arc<dyn CatalogStore>,
    cache: HashMap<(TaxonomyKind, String), Uuid>,
}

impl TaxonomyResolver {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self {
            store,
            cache: HashMap::new(),
        }
    }

    pub async fn resolve(&mut self, kind: TaxonomyKind, name: &str) -> Result<Uuid> {
        let key = (kind, name.to_string());
        if let Some(id) = self.cache.get(&key) {
            return Ok(*id);
        }

        let id = self.store.upsert_taxonomy(kind, name).await?;
        debug!(table = kind.table(), name, %id, "Resolved taxonomy entry");
        self.cache.insert(key, id);
        Ok(id)
    }

    /// Ids in input order, one per name.
    pub async fn resolve_all(&mut self, kind: TaxonomyKind, names: &[String]) -> Result<Vec<Uuid>> {
        let mut ids = Vec::with_capacity(names.len());
        for name in names {
            ids.push(self.resolve(kind, name).await?);
        }
        Ok(ids)
    }

    pub fn cached(&self) -> usize {
        self.cache.len()
    }
}
