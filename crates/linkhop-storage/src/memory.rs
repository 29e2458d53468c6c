use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use jiff::Timestamp;
use linkhop_core::repository::{Repository, Result};
use linkhop_core::{Mapping, MappingId, ShortCode, StorageError};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::trace;

/// In-memory implementation of the Repository trait using DashMap.
///
/// Rows are keyed by id, with a second map from short code to id. The
/// code index is the uniqueness arbiter: an insert claims the code through
/// the index's entry API, which holds the shard lock for that key, so two
/// racing inserts of the same code cannot both succeed.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    rows: DashMap<MappingId, Mapping>,
    codes: DashMap<String, MappingId>,
    last_id: AtomicU64,
}

impl InMemoryRepository {
    /// Creates a new in-memory repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new in-memory repository with the specified capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            rows: DashMap::with_capacity(capacity),
            codes: DashMap::with_capacity(capacity),
            last_id: AtomicU64::new(0),
        }
    }

    /// Number of stored mappings.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn find_by_code(&self, code: &ShortCode) -> Result<Option<Mapping>> {
        let Some(id) = self.codes.get(code.as_str()).map(|entry| *entry) else {
            return Ok(None);
        };

        Ok(self.rows.get(&id).map(|row| row.clone()))
    }

    async fn insert_unique(&self, code: &ShortCode, long_url: &str) -> Result<Mapping> {
        match self.codes.entry(code.as_str().to_owned()) {
            Entry::Occupied(_) => Err(StorageError::Conflict(code.to_string())),
            Entry::Vacant(slot) => {
                let id = MappingId::new(self.last_id.fetch_add(1, Ordering::SeqCst) + 1);
                let mapping = Mapping {
                    id,
                    short_code: code.clone(),
                    long_url: long_url.to_owned(),
                    click_count: 0,
                    created_at: Timestamp::now(),
                };

                // Row first, so a reader that finds the code also finds the row.
                self.rows.insert(id, mapping.clone());
                slot.insert(id);
                trace!(code = %code, id = %id, "inserted mapping");
                Ok(mapping)
            }
        }
    }

    async fn increment_click(&self, id: MappingId) -> Result<()> {
        let Some(mut row) = self.rows.get_mut(&id) else {
            return Err(StorageError::MissingMapping(id));
        };
        row.click_count += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn code(s: &str) -> ShortCode {
        ShortCode::new_unchecked(s)
    }

    #[tokio::test]
    async fn insert_and_find() {
        let repo = InMemoryRepository::new();

        let inserted = repo
            .insert_unique(&code("abc1"), "https://example.com")
            .await
            .unwrap();
        assert_eq!(inserted.click_count, 0);
        assert_eq!(inserted.long_url, "https://example.com");

        let found = repo.find_by_code(&code("abc1")).await.unwrap().unwrap();
        assert_eq!(found, inserted);
    }

    #[tokio::test]
    async fn find_nonexistent() {
        let repo = InMemoryRepository::new();

        let result = repo.find_by_code(&code("nope")).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn insert_conflict_keeps_original_row() {
        let repo = InMemoryRepository::new();

        repo.insert_unique(&code("abc1"), "https://example.com")
            .await
            .unwrap();

        let err = repo
            .insert_unique(&code("abc1"), "https://other.com")
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Conflict(_)));
        assert!(err.is_conflict());

        let found = repo.find_by_code(&code("abc1")).await.unwrap().unwrap();
        assert_eq!(found.long_url, "https://example.com");
        assert_eq!(repo.len(), 1);
    }

    #[tokio::test]
    async fn codes_are_case_sensitive() {
        let repo = InMemoryRepository::new();

        repo.insert_unique(&code("abcd"), "https://lower.example")
            .await
            .unwrap();
        repo.insert_unique(&code("ABCD"), "https://upper.example")
            .await
            .unwrap();

        let upper = repo.find_by_code(&code("ABCD")).await.unwrap().unwrap();
        assert_eq!(upper.long_url, "https://upper.example");
    }

    #[tokio::test]
    async fn ids_are_distinct() {
        let repo = InMemoryRepository::new();

        let a = repo.insert_unique(&code("aaaa"), "https://a").await.unwrap();
        let b = repo.insert_unique(&code("bbbb"), "https://b").await.unwrap();
        assert_ne!(a.id, b.id);
    }

    #[tokio::test]
    async fn increment_click_counts() {
        let repo = InMemoryRepository::new();
        let mapping = repo
            .insert_unique(&code("abc1"), "https://example.com")
            .await
            .unwrap();

        repo.increment_click(mapping.id).await.unwrap();
        repo.increment_click(mapping.id).await.unwrap();

        let found = repo.find_by_code(&code("abc1")).await.unwrap().unwrap();
        assert_eq!(found.click_count, 2);
    }

    #[tokio::test]
    async fn increment_unknown_id_fails() {
        let repo = InMemoryRepository::new();

        let err = repo.increment_click(MappingId::new(42)).await.unwrap_err();
        assert!(matches!(err, StorageError::MissingMapping(id) if id.get() == 42));
    }

    #[tokio::test]
    async fn concurrent_inserts_of_same_code_admit_one_winner() {
        let repo = Arc::new(InMemoryRepository::new());
        let mut handles = vec![];

        for i in 0..32u64 {
            let repo = Arc::clone(&repo);
            handles.push(tokio::spawn(async move {
                repo.insert_unique(&code("race"), &format!("https://example{i}.com"))
                    .await
            }));
        }

        let mut winners = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => winners += 1,
                Err(err) => assert!(err.is_conflict()),
            }
        }

        assert_eq!(winners, 1);
        assert_eq!(repo.len(), 1);
    }

    #[tokio::test]
    async fn concurrent_increments_are_not_lost() {
        let repo = Arc::new(InMemoryRepository::new());
        let mapping = repo
            .insert_unique(&code("hot1"), "https://example.com")
            .await
            .unwrap();

        let mut handles = vec![];
        for _ in 0..50 {
            let repo = Arc::clone(&repo);
            let id = mapping.id;
            handles.push(tokio::spawn(async move {
                repo.increment_click(id).await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let found = repo.find_by_code(&code("hot1")).await.unwrap().unwrap();
        assert_eq!(found.click_count, 50);
    }
}
