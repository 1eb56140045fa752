// SQLite RequestRepository Implementation

use crate::error::{corrupt_row, map_sqlx_error};
use async_trait::async_trait;
use cctv_core::domain::{Request, RequestId, RequestStatus, StatusHistoryEntry, TrackingId};
use cctv_core::error::{AppError, Result};
use cctv_core::port::{RequestFilter, RequestRepository, StatusCount};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use std::collections::HashMap;

/// Max ids per `IN (...)` when loading history
const HISTORY_BATCH: usize = 500;

pub struct SqliteRequestRepository {
    pool: SqlitePool,
}

impl SqliteRequestRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Load history for the given requests, oldest entry first
    async fn load_history(
        &self,
        ids: &[String],
    ) -> Result<HashMap<String, Vec<StatusHistoryEntry>>> {
        let mut by_request: HashMap<String, Vec<StatusHistoryEntry>> = HashMap::new();

        for batch in ids.chunks(HISTORY_BATCH) {
            let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
                "SELECT request_id, status, timestamp, note FROM status_history WHERE request_id IN (",
            );
            let mut separated = qb.separated(", ");
            for id in batch {
                separated.push_bind(id.clone());
            }
            separated.push_unseparated(") ORDER BY seq ASC");

            let rows: Vec<HistoryRow> = qb
                .build_query_as()
                .fetch_all(&self.pool)
                .await
                .map_err(map_sqlx_error)?;

            for row in rows {
                let status = row
                    .status
                    .parse::<RequestStatus>()
                    .map_err(|e| corrupt_row(&row.request_id, e))?;
                by_request
                    .entry(row.request_id)
                    .or_default()
                    .push(StatusHistoryEntry {
                        status,
                        timestamp: row.timestamp,
                        note: row.note,
                    });
            }
        }

        Ok(by_request)
    }

    /// Attach history to request rows, preserving row order
    async fn hydrate(&self, rows: Vec<RequestRow>) -> Result<Vec<Request>> {
        let ids: Vec<String> = rows.iter().map(|r| r.id.clone()).collect();
        let mut history = self.load_history(&ids).await?;

        rows.into_iter()
            .map(|row| {
                let entries = history.remove(&row.id).unwrap_or_default();
                row.into_request(entries)
            })
            .collect()
    }
}

#[async_trait]
impl RequestRepository for SqliteRequestRepository {
    async fn insert(&self, request: &Request) -> Result<()> {
        let applicant = serde_json::to_string(&request.applicant)?;
        let incident = serde_json::to_string(&request.incident)?;
        let attachments = serde_json::to_string(&request.attachments)?;

        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        sqlx::query(
            r#"
            INSERT INTO requests (
                id, tracking_id, status,
                applicant, incident, delivery_method, attachments,
                created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&request.id)
        .bind(request.tracking_id.as_str())
        .bind(request.status.as_str())
        .bind(&applicant)
        .bind(&incident)
        .bind(request.delivery_method.as_str())
        .bind(&attachments)
        .bind(request.created_at)
        .bind(request.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        for entry in &request.status_history {
            insert_history(&mut tx, &request.id, entry).await?;
        }

        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn find_by_id(&self, id: &RequestId) -> Result<Option<Request>> {
        let row = sqlx::query_as::<_, RequestRow>("SELECT * FROM requests WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        match row {
            Some(row) => Ok(self.hydrate(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn find_by_tracking_id(&self, tracking_id: &str) -> Result<Vec<Request>> {
        let rows: Vec<RequestRow> = sqlx::query_as(
            r#"
            SELECT * FROM requests
            WHERE tracking_id = ?
            ORDER BY created_at DESC, rowid DESC
            "#,
        )
        .bind(tracking_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        self.hydrate(rows).await
    }

    async fn append_status(&self, id: &RequestId, entry: &StatusHistoryEntry) -> Result<()> {
        // Status overwrite + history append commit together, but nothing
        // guards against a concurrent caller: the later commit's status wins.
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        let result = sqlx::query("UPDATE requests SET status = ?, updated_at = ? WHERE id = ?")
            .bind(entry.status.as_str())
            .bind(entry.timestamp)
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Request {} not found", id)));
        }

        insert_history(&mut tx, id, entry).await?;

        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn list(&self, filter: &RequestFilter) -> Result<Vec<Request>> {
        // LIMIT -1 means no limit in SQLite
        let limit = filter.limit.map_or(-1, i64::from);

        let rows: Vec<RequestRow> = sqlx::query_as(
            r#"
            SELECT * FROM requests
            WHERE (?1 IS NULL OR status = ?1)
            ORDER BY created_at DESC, rowid DESC
            LIMIT ?2
            "#,
        )
        .bind(filter.status.map(|s| s.as_str()))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        self.hydrate(rows).await
    }

    async fn count_by_status(&self) -> Result<Vec<StatusCount>> {
        let rows: Vec<(String, i64)> =
            sqlx::query_as("SELECT status, COUNT(*) FROM requests GROUP BY status")
                .fetch_all(&self.pool)
                .await
                .map_err(map_sqlx_error)?;

        rows.into_iter()
            .map(|(status, count)| {
                let status = status
                    .parse::<RequestStatus>()
                    .map_err(|e| AppError::Database(e.to_string()))?;
                Ok(StatusCount { status, count })
            })
            .collect()
    }
}

async fn insert_history(
    tx: &mut sqlx::Transaction<'_, Sqlite>,
    request_id: &str,
    entry: &StatusHistoryEntry,
) -> Result<()> {
    sqlx::query(
        "INSERT INTO status_history (request_id, status, timestamp, note) VALUES (?, ?, ?, ?)",
    )
    .bind(request_id)
    .bind(entry.status.as_str())
    .bind(entry.timestamp)
    .bind(&entry.note)
    .execute(&mut **tx)
    .await
    .map_err(map_sqlx_error)?;

    Ok(())
}

/// SQLite row representation
#[derive(Debug, sqlx::FromRow)]
struct RequestRow {
    id: String,
    tracking_id: String,
    status: String,
    applicant: String,   // JSON
    incident: String,    // JSON
    delivery_method: String,
    attachments: String, // JSON
    created_at: i64,
    updated_at: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct HistoryRow {
    request_id: String,
    status: String,
    timestamp: i64,
    note: String,
}

impl RequestRow {
    fn into_request(self, status_history: Vec<StatusHistoryEntry>) -> Result<Request> {
        let id = self.id;

        let status = self
            .status
            .parse::<RequestStatus>()
            .map_err(|e| corrupt_row(&id, e))?;
        let delivery_method = self
            .delivery_method
            .parse()
            .map_err(|e| corrupt_row(&id, e))?;
        let applicant = serde_json::from_str(&self.applicant).map_err(|e| corrupt_row(&id, e))?;
        let incident = serde_json::from_str(&self.incident).map_err(|e| corrupt_row(&id, e))?;
        let attachments =
            serde_json::from_str(&self.attachments).map_err(|e| corrupt_row(&id, e))?;

        Ok(Request {
            id,
            tracking_id: TrackingId::from_stored(self.tracking_id),
            status,
            status_history,
            applicant,
            incident,
            delivery_method,
            attachments,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
