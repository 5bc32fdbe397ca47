use anyhow::Result;

use gameshelf_common::GameRef;

use crate::traits::CatalogStore;

/// Result of the uniqueness check on a display title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DedupVerdict {
    Unique,
    Duplicate(GameRef),
}

/// Exact-title check against the catalog.
///
/// Check-then-insert: a concurrent writer can still slip a duplicate in
/// between this lookup and the insert.
pub async fn check_title(store: &dyn CatalogStore, title: &str) -> Result<DedupVerdict> {
    Ok(match store.find_game_by_title(title).await? {
        Some(existing) => DedupVerdict::Duplicate(existing),
        None => DedupVerdict::Unique,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryCatalogStore;

    #[tokio::test]
    async fn existing_title_is_a_duplicate() {
        let store = MemoryCatalogStore::new().with_game("Catan");

        let verdict = check_title(&store, "Catan").await.unwrap();
        assert!(matches!(verdict, DedupVerdict::Duplicate(g) if g.title == "Catan"));
    }

    #[tokio::test]
    async fn match_is_exact() {
        let store = MemoryCatalogStore::new().with_game("Catan");

        assert_eq!(check_title(&store, "catan").await.unwrap(), DedupVerdict::Unique);
        assert_eq!(check_title(&store, "Catan ").await.unwrap(), DedupVerdict::Unique);
    }
}
