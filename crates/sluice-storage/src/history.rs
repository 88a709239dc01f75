// SPDX-FileCopyrightText: 2026 Sluice Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-user query history store.
//!
//! Every operation filters on the owning user id at the SQL boundary; a
//! caller holding a foreign record id cannot read or delete the row.
//!
//! Listing normally runs one ordered query. Some managed backends cannot
//! serve `filter + order` until an index exists, so the store keeps an
//! `ordered` capability flag: the first ordered failure flips it and all
//! later lists over-fetch 2x unordered and sort in process.

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{SecondsFormat, Utc};
use rusqlite::params;
use sluice_core::{QueryRecord, RecordSink, SluiceError};
use tracing::{debug, warn};

use crate::database::Database;

/// Hard cap on a single list response.
pub const MAX_LIST_LIMIT: usize = 100;

/// Store-imposed per-batch operation limit for bulk deletes.
const DELETE_BATCH_SIZE: usize = 500;

/// Current timestamp in the lexicographically sortable storage format.
fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<QueryRecord> {
    Ok(QueryRecord {
        id: row.get(0)?,
        user_id: row.get(1)?,
        agent_name: row.get(2)?,
        message: row.get(3)?,
        response: row.get(4)?,
        created_at: row.get(5)?,
    })
}

const RECORD_COLUMNS: &str = "id, user_id, agent_name, message, response, created_at";

/// SQLite-backed history store.
pub struct HistoryStore {
    db: Database,
    /// Whether the backend is believed to serve ordered list queries.
    ordered: AtomicBool,
}

impl HistoryStore {
    /// Create a store over an open database. Ordering capability is assumed
    /// until the first ordered query fails.
    pub fn new(db: Database) -> Self {
        Self {
            db,
            ordered: AtomicBool::new(true),
        }
    }

    /// Persist one completed exchange; returns the generated record id.
    pub async fn append(
        &self,
        user_id: &str,
        agent_name: &str,
        message: &str,
        response: &str,
    ) -> Result<String, SluiceError> {
        let record = QueryRecord {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            agent_name: agent_name.to_string(),
            message: message.to_string(),
            response: response.to_string(),
            created_at: now_rfc3339(),
        };
        let id = record.id.clone();

        self.db
            .connection()
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO query_history (id, user_id, agent_name, message, response, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    params![
                        record.id,
                        record.user_id,
                        record.agent_name,
                        record.message,
                        record.response,
                        record.created_at,
                    ],
                )?;
                Ok(())
            })
            .await
            .map_err(crate::database::map_tr_err)?;

        debug!(record_id = %id, user_id, agent_name, "history record appended");
        Ok(id)
    }

    /// List the user's records, newest first. `limit` is clamped to
    /// `1..=MAX_LIST_LIMIT`.
    pub async fn list(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<QueryRecord>, SluiceError> {
        let limit = limit.clamp(1, MAX_LIST_LIMIT);

        if self.ordered.load(Ordering::Relaxed) {
            match self.list_ordered(user_id, limit).await {
                Ok(records) => return Ok(records),
                Err(e) => {
                    // The backend cannot serve filter + order; remember that
                    // and serve this and all later requests via the fallback.
                    warn!(error = %e, "ordered history query failed, switching to unordered fallback");
                    self.ordered.store(false, Ordering::Relaxed);
                }
            }
        }

        self.list_unordered(user_id, limit).await
    }

    async fn list_ordered(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<QueryRecord>, SluiceError> {
        let user_id = user_id.to_string();
        self.db
            .connection()
            .call(move |conn| {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {RECORD_COLUMNS} FROM query_history
                     WHERE user_id = ?1 ORDER BY created_at DESC LIMIT ?2"
                ))?;
                let rows = stmt.query_map(params![user_id, limit as i64], row_to_record)?;
                let mut records = Vec::new();
                for row in rows {
                    records.push(row?);
                }
                Ok(records)
            })
            .await
            .map_err(crate::database::map_tr_err)
    }

    /// Fallback for backends without ordered-query support: over-fetch 2x
    /// unordered, sort newest-first in process, truncate.
    async fn list_unordered(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<QueryRecord>, SluiceError> {
        let user_id = user_id.to_string();
        let fetch = limit * 2;
        let mut records = self
            .db
            .connection()
            .call(move |conn| {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {RECORD_COLUMNS} FROM query_history
                     WHERE user_id = ?1 LIMIT ?2"
                ))?;
                let rows = stmt.query_map(params![user_id, fetch as i64], row_to_record)?;
                let mut records = Vec::new();
                for row in rows {
                    records.push(row?);
                }
                Ok(records)
            })
            .await
            .map_err(crate::database::map_tr_err)?;

        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        records.truncate(limit);
        Ok(records)
    }

    /// Delete one record. Returns false unless the record exists and belongs
    /// to `user_id`.
    pub async fn delete_one(&self, record_id: &str, user_id: &str) -> Result<bool, SluiceError> {
        let record_id = record_id.to_string();
        let user_id = user_id.to_string();
        self.db
            .connection()
            .call(move |conn| {
                let changed = conn.execute(
                    "DELETE FROM query_history WHERE id = ?1 AND user_id = ?2",
                    params![record_id, user_id],
                )?;
                Ok(changed > 0)
            })
            .await
            .map_err(crate::database::map_tr_err)
    }

    /// Delete all of the user's records in bounded batches. Returns the
    /// number deleted. Safe to re-run after an interruption: rows deleted by
    /// an earlier attempt are simply absent.
    pub async fn delete_all(&self, user_id: &str) -> Result<usize, SluiceError> {
        self.delete_all_batched(user_id, DELETE_BATCH_SIZE).await
    }

    async fn delete_all_batched(
        &self,
        user_id: &str,
        batch_size: usize,
    ) -> Result<usize, SluiceError> {
        let mut total = 0usize;
        loop {
            let user_id_owned = user_id.to_string();
            let deleted = self
                .db
                .connection()
                .call(move |conn| {
                    let changed = conn.execute(
                        "DELETE FROM query_history WHERE rowid IN
                         (SELECT rowid FROM query_history WHERE user_id = ?1 LIMIT ?2)",
                        params![user_id_owned, batch_size as i64],
                    )?;
                    Ok(changed)
                })
                .await
                .map_err(crate::database::map_tr_err)?;

            total += deleted;
            if deleted < batch_size {
                break;
            }
        }

        if total > 0 {
            debug!(user_id, total, "bulk history delete complete");
        }
        Ok(total)
    }
}

#[async_trait::async_trait]
impl RecordSink for HistoryStore {
    async fn append(
        &self,
        user_id: &str,
        agent_name: &str,
        message: &str,
        response: &str,
    ) -> Result<String, SluiceError> {
        HistoryStore::append(self, user_id, agent_name, message, response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn open_store() -> (HistoryStore, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("history.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        (HistoryStore::new(db), dir)
    }

    #[tokio::test]
    async fn append_then_list_returns_the_record() {
        let (store, _dir) = open_store().await;
        store
            .append("u1", "bq_agent", "2+2?", "4")
            .await
            .unwrap();

        let records = store.list("u1", 1).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].message, "2+2?");
        assert_eq!(records[0].response, "4");
        assert_eq!(records[0].agent_name, "bq_agent");
    }

    #[tokio::test]
    async fn list_never_crosses_users() {
        let (store, _dir) = open_store().await;
        store.append("alice", "a", "m1", "r1").await.unwrap();
        store.append("bob", "a", "m2", "r2").await.unwrap();
        store.append("alice", "a", "m3", "r3").await.unwrap();

        let alice = store.list("alice", 50).await.unwrap();
        assert_eq!(alice.len(), 2);
        assert!(alice.iter().all(|r| r.user_id == "alice"));

        let bob = store.list("bob", 50).await.unwrap();
        assert_eq!(bob.len(), 1);
        assert!(bob.iter().all(|r| r.user_id == "bob"));
    }

    #[tokio::test]
    async fn list_is_newest_first() {
        let (store, _dir) = open_store().await;
        // Insert with distinct timestamps by spacing the appends.
        for i in 0..3 {
            store
                .append("u1", "a", &format!("m{i}"), "r")
                .await
                .unwrap();
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }

        let records = store.list("u1", 10).await.unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].message, "m2");
        assert_eq!(records[2].message, "m0");
    }

    #[tokio::test]
    async fn unordered_fallback_sorts_and_truncates() {
        let (store, _dir) = open_store().await;
        for i in 0..5 {
            store
                .append("u1", "a", &format!("m{i}"), "r")
                .await
                .unwrap();
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }

        // Simulate a backend that cannot serve ordered queries.
        store.ordered.store(false, Ordering::Relaxed);
        let records = store.list("u1", 2).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].message, "m4");
        assert_eq!(records[1].message, "m3");
    }

    #[tokio::test]
    async fn limit_is_clamped() {
        let (store, _dir) = open_store().await;
        store.append("u1", "a", "m", "r").await.unwrap();
        // Zero becomes one; absurd values cap at MAX_LIST_LIMIT.
        assert_eq!(store.list("u1", 0).await.unwrap().len(), 1);
        assert_eq!(store.list("u1", 100_000).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn delete_one_requires_matching_owner() {
        let (store, _dir) = open_store().await;
        let id = store.append("alice", "a", "m", "r").await.unwrap();

        // Bob cannot delete Alice's record even with the id in hand.
        assert!(!store.delete_one(&id, "bob").await.unwrap());
        assert_eq!(store.list("alice", 10).await.unwrap().len(), 1);

        assert!(store.delete_one(&id, "alice").await.unwrap());
        assert!(!store.delete_one(&id, "alice").await.unwrap());
    }

    #[tokio::test]
    async fn delete_all_twice_yields_count_then_zero() {
        let (store, _dir) = open_store().await;
        for i in 0..4 {
            store
                .append("u1", "a", &format!("m{i}"), "r")
                .await
                .unwrap();
        }
        store.append("other", "a", "keep", "r").await.unwrap();

        assert_eq!(store.delete_all("u1").await.unwrap(), 4);
        assert_eq!(store.delete_all("u1").await.unwrap(), 0);
        // The other user's history is untouched.
        assert_eq!(store.list("other", 10).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn delete_all_respects_batch_limit() {
        let (store, _dir) = open_store().await;
        for i in 0..5 {
            store
                .append("u1", "a", &format!("m{i}"), "r")
                .await
                .unwrap();
        }

        // Batch size of 2 forces three rounds; the total still comes out right.
        let deleted = store.delete_all_batched("u1", 2).await.unwrap();
        assert_eq!(deleted, 5);
        assert!(store.list("u1", 10).await.unwrap().is_empty());
    }
}
