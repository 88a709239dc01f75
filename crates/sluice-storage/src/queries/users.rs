// SPDX-FileCopyrightText: 2026 Sluice Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User row CRUD operations.
//!
//! All lookups that feed authentication filter on `state = 'active'` in SQL
//! rather than in the caller, so a deactivated account can never slip
//! through a forgotten check.

use rusqlite::params;
use sluice_core::SluiceError;

use crate::database::Database;
use crate::models::StoredUser;

fn row_to_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<StoredUser> {
    let state: String = row.get(3)?;
    let state = state.parse().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(StoredUser {
        user_id: row.get(0)?,
        email: row.get(1)?,
        password_hash: row.get(2)?,
        state,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

const USER_COLUMNS: &str = "user_id, email, password_hash, state, created_at, updated_at";

/// Insert a new user row.
pub async fn insert_user(db: &Database, user: &StoredUser) -> Result<(), SluiceError> {
    let user = user.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO users (user_id, email, password_hash, state, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    user.user_id,
                    user.email,
                    user.password_hash,
                    user.state.to_string(),
                    user.created_at,
                    user.updated_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get a user by id, regardless of state.
pub async fn get_user(db: &Database, user_id: &str) -> Result<Option<StoredUser>, SluiceError> {
    let user_id = user_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn
                .prepare(&format!("SELECT {USER_COLUMNS} FROM users WHERE user_id = ?1"))?;
            let result = stmt.query_row(params![user_id], row_to_user);
            match result {
                Ok(user) => Ok(Some(user)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Find the active user with the given (already lowercased) email.
pub async fn find_active_by_email(
    db: &Database,
    email: &str,
) -> Result<Option<StoredUser>, SluiceError> {
    let email = email.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {USER_COLUMNS} FROM users WHERE email = ?1 AND state = 'active' LIMIT 1"
            ))?;
            let result = stmt.query_row(params![email], row_to_user);
            match result {
                Ok(user) => Ok(Some(user)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Soft-delete a user. Returns false when the user is absent or already
/// deactivated, making repeated calls idempotent.
pub async fn deactivate_user(
    db: &Database,
    user_id: &str,
    updated_at: &str,
) -> Result<bool, SluiceError> {
    let user_id = user_id.to_string();
    let updated_at = updated_at.to_string();
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "UPDATE users SET state = 'deactivated', updated_at = ?2
                 WHERE user_id = ?1 AND state = 'active'",
                params![user_id, updated_at],
            )?;
            Ok(changed > 0)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sluice_core::UserState;
    use tempfile::tempdir;

    async fn open_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("users.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    fn make_user(id: &str, email: &str) -> StoredUser {
        StoredUser {
            user_id: id.to_string(),
            email: email.to_string(),
            password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$hash".to_string(),
            state: UserState::Active,
            created_at: "2026-01-01T00:00:00Z".to_string(),
            updated_at: "2026-01-01T00:00:00Z".to_string(),
        }
    }

    #[tokio::test]
    async fn insert_and_get_round_trip() {
        let (db, _dir) = open_db().await;
        let user = make_user("u1", "alice@example.com");
        insert_user(&db, &user).await.unwrap();

        let fetched = get_user(&db, "u1").await.unwrap().unwrap();
        assert_eq!(fetched.email, "alice@example.com");
        assert_eq!(fetched.state, UserState::Active);
    }

    #[tokio::test]
    async fn get_unknown_user_returns_none() {
        let (db, _dir) = open_db().await;
        assert!(get_user(&db, "missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn find_active_by_email_ignores_deactivated() {
        let (db, _dir) = open_db().await;
        let user = make_user("u1", "bob@example.com");
        insert_user(&db, &user).await.unwrap();

        assert!(
            find_active_by_email(&db, "bob@example.com")
                .await
                .unwrap()
                .is_some()
        );

        deactivate_user(&db, "u1", "2026-01-02T00:00:00Z")
            .await
            .unwrap();
        assert!(
            find_active_by_email(&db, "bob@example.com")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn deactivate_is_idempotent() {
        let (db, _dir) = open_db().await;
        insert_user(&db, &make_user("u1", "carol@example.com"))
            .await
            .unwrap();

        assert!(
            deactivate_user(&db, "u1", "2026-01-02T00:00:00Z")
                .await
                .unwrap()
        );
        assert!(
            !deactivate_user(&db, "u1", "2026-01-03T00:00:00Z")
                .await
                .unwrap()
        );
        // The row is still there, just flipped.
        let user = get_user(&db, "u1").await.unwrap().unwrap();
        assert_eq!(user.state, UserState::Deactivated);
    }

    #[tokio::test]
    async fn duplicate_active_email_is_rejected_by_index() {
        let (db, _dir) = open_db().await;
        insert_user(&db, &make_user("u1", "dave@example.com"))
            .await
            .unwrap();
        let dup = make_user("u2", "dave@example.com");
        assert!(insert_user(&db, &dup).await.is_err());

        // After deactivation the address is free again.
        deactivate_user(&db, "u1", "2026-01-02T00:00:00Z")
            .await
            .unwrap();
        insert_user(&db, &dup).await.unwrap();
    }
}
