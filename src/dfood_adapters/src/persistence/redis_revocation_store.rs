use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use dfood_core::{RevocationEntry, RevocationStore, RevocationStoreError};
use redis::{Commands, Connection};
use tokio::sync::RwLock;

/// Revocation list shared through Redis. Each key expires with its token, so
/// Redis does the purging.
#[derive(Clone)]
pub struct RedisRevocationStore {
    conn: Arc<RwLock<Connection>>,
}

impl RedisRevocationStore {
    pub fn new(conn: Arc<RwLock<Connection>>) -> Self {
        Self { conn }
    }

    /// Walk the keyspace with `SCAN` so a large list never blocks Redis.
    fn revoked_keys(conn: &mut Connection) -> Result<Vec<String>, RevocationStoreError> {
        let pattern = format!("{}*", REVOKED_TOKEN_KEY_PREFIX);
        let mut keys = Vec::new();
        let mut cursor: u64 = 0;

        loop {
            let (next, batch): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH_SIZE)
                .query(conn)
                .map_err(backend_error)?;
            keys.extend(batch);
            if next == 0 {
                // SCAN may report a key more than once
                keys.sort_unstable();
                keys.dedup();
                return Ok(keys);
            }
            cursor = next;
        }
    }
}

#[async_trait::async_trait]
impl RevocationStore for RedisRevocationStore {
    async fn revoke(
        &self,
        token: &str,
        entry: RevocationEntry,
    ) -> Result<(), RevocationStoreError> {
        let key = get_key(token);
        let ttl = (entry.expires_at - Utc::now()).num_seconds().max(1) as u64;

        let mut conn = self.conn.write().await;
        conn.set_ex(key, entry.subject, ttl).map_err(backend_error)
    }

    async fn is_revoked(&self, token: &str) -> Result<bool, RevocationStoreError> {
        let key = get_key(token);
        let mut conn = self.conn.write().await;
        conn.exists(&key).map_err(backend_error)
    }

    async fn tokens_for_subject(
        &self,
        subject: &str,
    ) -> Result<Vec<(String, RevocationEntry)>, RevocationStoreError> {
        let mut conn = self.conn.write().await;
        let now = Utc::now();
        let mut tokens = Vec::new();

        for key in Self::revoked_keys(&mut conn)? {
            let stored: Option<String> = conn.get(&key).map_err(backend_error)?;
            if stored.as_deref() != Some(subject) {
                continue;
            }
            let ttl: i64 = conn.ttl(&key).map_err(backend_error)?;
            let Some(token) = key.strip_prefix(REVOKED_TOKEN_KEY_PREFIX) else {
                continue;
            };
            tokens.push((
                token.to_owned(),
                RevocationEntry {
                    subject: subject.to_owned(),
                    expires_at: now + Duration::seconds(ttl.max(0)),
                },
            ));
        }

        Ok(tokens)
    }

    async fn purge_expired(&self, _now: DateTime<Utc>) -> Result<usize, RevocationStoreError> {
        Ok(0)
    }

    async fn clear(&self) -> Result<(), RevocationStoreError> {
        let mut conn = self.conn.write().await;
        let keys = Self::revoked_keys(&mut conn)?;
        if keys.is_empty() {
            return Ok(());
        }
        conn.del(keys).map_err(backend_error)
    }

    fn is_shared(&self) -> bool {
        true
    }
}

const REVOKED_TOKEN_KEY_PREFIX: &str = "revoked_token:";
const SCAN_BATCH_SIZE: usize = 200;

fn get_key(token: &str) -> String {
    format!("{}{}", REVOKED_TOKEN_KEY_PREFIX, token)
}

fn backend_error(e: redis::RedisError) -> RevocationStoreError {
    RevocationStoreError::Backend(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use testcontainers_modules::{redis::Redis, testcontainers::runners::AsyncRunner};

    #[test]
    fn keys_are_prefixed() {
        assert_eq!(get_key("abc"), "revoked_token:abc");
    }

    #[tokio::test]
    #[ignore = "requires docker"]
    async fn round_trips_through_redis() {
        let container = Redis::default().start().await.unwrap();
        let port = container.get_host_port_ipv4(6379).await.unwrap();
        let conn = redis::Client::open(format!("redis://127.0.0.1:{port}/"))
            .unwrap()
            .get_connection()
            .unwrap();
        let store = RedisRevocationStore::new(Arc::new(RwLock::new(conn)));
        let entry = RevocationEntry {
            subject: "alice@example.com".to_owned(),
            expires_at: Utc::now() + Duration::minutes(15),
        };

        store.revoke("t1", entry.clone()).await.unwrap();
        store
            .revoke(
                "t2",
                RevocationEntry {
                    subject: "bob@example.com".to_owned(),
                    ..entry
                },
            )
            .await
            .unwrap();

        assert!(store.is_revoked("t1").await.unwrap());
        let alice = store.tokens_for_subject("alice@example.com").await.unwrap();
        assert_eq!(alice.len(), 1);
        assert_eq!(alice[0].0, "t1");

        store.clear().await.unwrap();
        assert!(!store.is_revoked("t1").await.unwrap());
        assert!(!store.is_revoked("t2").await.unwrap());
    }

    #[tokio::test]
    #[ignore = "requires docker"]
    async fn subject_lookup_spans_several_scan_batches() {
        let container = Redis::default().start().await.unwrap();
        let port = container.get_host_port_ipv4(6379).await.unwrap();
        let conn = redis::Client::open(format!("redis://127.0.0.1:{port}/"))
            .unwrap()
            .get_connection()
            .unwrap();
        let store = RedisRevocationStore::new(Arc::new(RwLock::new(conn)));
        let entry = RevocationEntry {
            subject: "alice@example.com".to_owned(),
            expires_at: Utc::now() + Duration::minutes(15),
        };

        let total = SCAN_BATCH_SIZE * 2 + 7;
        for i in 0..total {
            store.revoke(&format!("t{i}"), entry.clone()).await.unwrap();
        }

        assert!(store.is_shared());
        assert_eq!(
            store.tokens_for_subject("alice@example.com").await.unwrap().len(),
            total
        );
        store.clear().await.unwrap();
        assert!(
            store
                .tokens_for_subject("alice@example.com")
                .await
                .unwrap()
                .is_empty()
        );
    }
}
