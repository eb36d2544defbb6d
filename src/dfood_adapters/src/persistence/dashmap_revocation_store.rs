use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dfood_core::{RevocationEntry, RevocationStore, RevocationStoreError};

/// Process-local revocation list. Entries are lost on restart.
#[derive(Default, Clone)]
pub struct DashMapRevocationStore {
    entries: Arc<DashMap<String, RevocationEntry>>,
}

impl DashMapRevocationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait::async_trait]
impl RevocationStore for DashMapRevocationStore {
    async fn revoke(
        &self,
        token: &str,
        entry: RevocationEntry,
    ) -> Result<(), RevocationStoreError> {
        self.entries.insert(token.to_owned(), entry);
        Ok(())
    }

    async fn is_revoked(&self, token: &str) -> Result<bool, RevocationStoreError> {
        Ok(self.entries.contains_key(token))
    }

    async fn tokens_for_subject(
        &self,
        subject: &str,
    ) -> Result<Vec<(String, RevocationEntry)>, RevocationStoreError> {
        Ok(self
            .entries
            .iter()
            .filter(|entry| entry.value().subject == subject)
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect())
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize, RevocationStoreError> {
        let mut removed = 0;
        self.entries.retain(|_, entry| {
            let keep = !entry.is_expired(now);
            if !keep {
                removed += 1;
            }
            keep
        });
        Ok(removed)
    }

    async fn clear(&self) -> Result<(), RevocationStoreError> {
        self.entries.clear();
        Ok(())
    }
}
