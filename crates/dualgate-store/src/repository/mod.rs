//! SQLite identity repository

use crate::traits::IdentityStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dualgate_core::config::StoreConfig;
use dualgate_core::types::IdentityRecord;
use dualgate_core::{Error, Result};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use tracing::{debug, info};

type IdentityRow = (String, String, String, String, String, bool, String);

pub struct SqlIdentityStore {
    pool: SqlitePool,
}

impl SqlIdentityStore {
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| Error::Store(e.to_string()))?;

        let store = Self { pool };
        store.init().await?;

        info!("Identity store opened");
        Ok(store)
    }

    pub async fn from_config(config: &StoreConfig) -> Result<Self> {
        Self::new(&config.database_url, config.max_connections).await
    }

    async fn init(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS identities (
                id TEXT PRIMARY KEY,
                username TEXT UNIQUE NOT NULL,
                first_name TEXT NOT NULL DEFAULT '',
                last_name TEXT NOT NULL DEFAULT '',
                email TEXT NOT NULL DEFAULT '',
                is_active INTEGER NOT NULL DEFAULT 1,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| Error::Store(e.to_string()))?;

        Ok(())
    }

    /// Insert a record, replacing the profile of an existing username
    pub async fn upsert(&self, record: &IdentityRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO identities (id, username, first_name, last_name, email, is_active, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(username) DO UPDATE SET
                first_name = excluded.first_name,
                last_name = excluded.last_name,
                email = excluded.email,
                is_active = excluded.is_active
            "#,
        )
        .bind(&record.id)
        .bind(&record.username)
        .bind(&record.first_name)
        .bind(&record.last_name)
        .bind(&record.email)
        .bind(record.is_active)
        .bind(record.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| Error::Store(e.to_string()))?;

        debug!("Stored identity {}", record.username);
        Ok(())
    }

    pub async fn delete(&self, username: &str) -> Result<()> {
        sqlx::query("DELETE FROM identities WHERE username = ?")
            .bind(username)
            .execute(&self.pool)
            .await
            .map_err(|e| Error::Store(e.to_string()))?;

        Ok(())
    }

    pub async fn get_identity(&self, username: &str) -> Result<Option<IdentityRecord>> {
        let row: Option<IdentityRow> = sqlx::query_as(
            r#"
            SELECT id, username, first_name, last_name, email, is_active, created_at
            FROM identities WHERE username = ?
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Error::Store(e.to_string()))?;

        row.map(|r| -> Result<IdentityRecord> {
            let created_at = DateTime::parse_from_rfc3339(&r.6)
                .map_err(|e| Error::Store(format!("Invalid created_at for {}: {}", r.1, e)))?
                .with_timezone(&Utc);

            Ok(IdentityRecord {
                id: r.0,
                username: r.1,
                first_name: r.2,
                last_name: r.3,
                email: r.4,
                is_active: r.5,
                created_at,
            })
        })
        .transpose()
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl IdentityStore for SqlIdentityStore {
    async fn get(&self, username: &str) -> Result<IdentityRecord> {
        self.get_identity(username)
            .await?
            .ok_or_else(|| Error::NotFound(username.to_string()))
    }
}
