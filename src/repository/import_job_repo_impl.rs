// ==========================================
// 商品目录导入系统 - 导入作业 Repository 实现
// ==========================================
// 职责: 导入作业持久化（使用 rusqlite）
// 约束: 预览快照以 JSON 存储于 preview_json 列
// ==========================================

use crate::domain::import_job::{ImportJob, ImportJobSummary, PreviewRow};
use crate::domain::types::{ImportMode, ImportType, JobStatus};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::import_job_repo::ImportJobRepository;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use std::str::FromStr;
use std::sync::{Arc, Mutex};

// ==========================================
// ImportJobRepositoryImpl
// ==========================================
pub struct ImportJobRepositoryImpl {
    conn: Arc<Mutex<Connection>>,
}

impl ImportJobRepositoryImpl {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_summary(row: &Row<'_>) -> rusqlite::Result<RawJobRow> {
        Ok(RawJobRow {
            job_id: row.get("job_id")?,
            import_type: row.get("import_type")?,
            import_mode: row.get("import_mode")?,
            file_name: row.get("file_name")?,
            status: row.get("status")?,
            total_rows: row.get("total_rows")?,
            success_rows: row.get("success_rows")?,
            error_rows: row.get("error_rows")?,
            created_by: row.get("created_by")?,
            created_at: row.get("created_at")?,
            executed_at: row.get("executed_at")?,
        })
    }
}

/// 中间行: 枚举/时间戳列先取原始文本, 再统一转换
struct RawJobRow {
    job_id: String,
    import_type: String,
    import_mode: String,
    file_name: String,
    status: String,
    total_rows: i64,
    success_rows: i64,
    error_rows: i64,
    created_by: String,
    created_at: String,
    executed_at: Option<String>,
}

impl RawJobRow {
    fn into_summary(self) -> RepositoryResult<ImportJobSummary> {
        Ok(ImportJobSummary {
            job_id: self.job_id,
            import_type: parse_enum::<ImportType>("import_type", &self.import_type)?,
            mode: parse_enum::<ImportMode>("import_mode", &self.import_mode)?,
            file_name: self.file_name,
            status: parse_enum::<JobStatus>("status", &self.status)?,
            total_rows: self.total_rows,
            success_rows: self.success_rows,
            error_rows: self.error_rows,
            created_by: self.created_by,
            created_at: parse_ts("created_at", &self.created_at)?,
            executed_at: match &self.executed_at {
                Some(raw) => Some(parse_ts("executed_at", raw)?),
                None => None,
            },
        })
    }
}

fn parse_enum<T: FromStr<Err = String>>(field: &str, raw: &str) -> RepositoryResult<T> {
    raw.parse::<T>().map_err(|e| RepositoryError::FieldValueError {
        field: field.to_string(),
        message: e,
    })
}

fn parse_ts(field: &str, raw: &str) -> RepositoryResult<DateTime<Utc>> {
    raw.parse::<DateTime<Utc>>()
        .map_err(|e| RepositoryError::FieldValueError {
            field: field.to_string(),
            message: format!("时间戳解析失败: {}", e),
        })
}

#[async_trait]
impl ImportJobRepository for ImportJobRepositoryImpl {
    async fn insert_job(&self, job: &ImportJob) -> RepositoryResult<()> {
        let preview_json = serde_json::to_string(&job.preview_rows)?;
        let conn = self.get_conn()?;

        conn.execute(
            r#"
            INSERT INTO import_job (
                job_id, import_type, import_mode, file_name, status,
                total_rows, success_rows, error_rows, preview_json,
                created_by, created_at, executed_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
            params![
                job.job_id,
                job.import_type.to_string(),
                job.mode.to_string(),
                job.file_name,
                job.status.to_string(),
                job.total_rows,
                job.success_rows,
                job.error_rows,
                preview_json,
                job.created_by,
                job.created_at.to_rfc3339(),
                job.executed_at.map(|t| t.to_rfc3339()),
            ],
        )?;

        Ok(())
    }

    async fn get_job(&self, job_id: &str) -> RepositoryResult<Option<ImportJob>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT job_id, import_type, import_mode, file_name, status,
                   total_rows, success_rows, error_rows, preview_json,
                   created_by, created_at, executed_at
            FROM import_job
            WHERE job_id = ?1
            "#,
        )?;

        let mut rows = stmt.query_map(params![job_id], |row| {
            let raw = Self::map_summary(row)?;
            let preview_json: String = row.get("preview_json")?;
            Ok((raw, preview_json))
        })?;

        let (raw, preview_json) = match rows.next() {
            Some(row) => row?,
            None => return Ok(None),
        };
        drop(rows);
        drop(stmt);
        drop(conn);

        let summary = raw.into_summary()?;
        let preview_rows: Vec<PreviewRow> = serde_json::from_str(&preview_json)?;

        Ok(Some(ImportJob {
            job_id: summary.job_id,
            import_type: summary.import_type,
            mode: summary.mode,
            file_name: summary.file_name,
            status: summary.status,
            total_rows: summary.total_rows,
            success_rows: summary.success_rows,
            error_rows: summary.error_rows,
            preview_rows,
            created_by: summary.created_by,
            created_at: summary.created_at,
            executed_at: summary.executed_at,
        }))
    }

    async fn try_transition(
        &self,
        job_id: &str,
        expected: JobStatus,
        next: JobStatus,
    ) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;

        // 条件更新: WHERE 同时匹配 ID 与当前状态, 0 行表示条件不满足
        let rows = conn.execute(
            "UPDATE import_job SET status = ?3 WHERE job_id = ?1 AND status = ?2",
            params![job_id, expected.to_string(), next.to_string()],
        )?;

        Ok(rows == 1)
    }

    async fn finalize_job(
        &self,
        job_id: &str,
        status: JobStatus,
        success_rows: i64,
        error_rows: i64,
        executed_at: DateTime<Utc>,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;

        let rows = conn.execute(
            r#"
            UPDATE import_job SET
                status = ?2,
                success_rows = ?3,
                error_rows = ?4,
                executed_at = ?5
            WHERE job_id = ?1
            "#,
            params![
                job_id,
                status.to_string(),
                success_rows,
                error_rows,
                executed_at.to_rfc3339(),
            ],
        )?;

        if rows == 0 {
            return Err(RepositoryError::NotFound {
                entity: "import_job".to_string(),
                id: job_id.to_string(),
            });
        }

        Ok(())
    }

    async fn recent_jobs(&self, limit: usize) -> RepositoryResult<Vec<ImportJobSummary>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT job_id, import_type, import_mode, file_name, status,
                   total_rows, success_rows, error_rows,
                   created_by, created_at, executed_at
            FROM import_job
            ORDER BY created_at DESC, job_id DESC
            LIMIT ?1
            "#,
        )?;

        let raw_rows = stmt
            .query_map(params![limit as i64], Self::map_summary)?
            .collect::<Result<Vec<_>, _>>()?;
        drop(stmt);
        drop(conn);

        raw_rows.into_iter().map(RawJobRow::into_summary).collect()
    }
}
