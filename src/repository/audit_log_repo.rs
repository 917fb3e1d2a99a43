// ==========================================
// 商品目录导入系统 - 审计日志 Repository
// ==========================================
// 职责: 写入与查询审计流水
// 红线: 审计记录只增不改
// ==========================================

use crate::domain::import_job::AuditRecord;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

pub struct AuditLogRepository {
    conn: Arc<Mutex<Connection>>,
}

impl AuditLogRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 写入一条审计记录
    pub fn insert(&self, record: &AuditRecord) -> RepositoryResult<()> {
        let metadata_json = match &record.metadata {
            Some(value) => Some(serde_json::to_string(value)?),
            None => None,
        };
        let conn = self.get_conn()?;

        conn.execute(
            r#"
            INSERT INTO audit_log (
                audit_id, action_type, entity_type, entity_id,
                metadata_json, actor, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                record.audit_id,
                record.action_type,
                record.entity_type,
                record.entity_id,
                metadata_json,
                record.actor,
                record.created_at.to_rfc3339(),
            ],
        )?;

        Ok(())
    }

    /// 按实体 ID 查询审计流水（按时间正序）
    pub fn find_by_entity(&self, entity_id: &str) -> RepositoryResult<Vec<AuditRecord>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT audit_id, action_type, entity_type, entity_id,
                   metadata_json, actor, created_at
            FROM audit_log
            WHERE entity_id = ?1
            ORDER BY created_at ASC
            "#,
        )?;

        let raw_rows = stmt
            .query_map(params![entity_id], |row| {
                Ok((
                    row.get::<_, String>("audit_id")?,
                    row.get::<_, String>("action_type")?,
                    row.get::<_, String>("entity_type")?,
                    row.get::<_, String>("entity_id")?,
                    row.get::<_, Option<String>>("metadata_json")?,
                    row.get::<_, String>("actor")?,
                    row.get::<_, String>("created_at")?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        drop(stmt);
        drop(conn);

        raw_rows
            .into_iter()
            .map(|(audit_id, action_type, entity_type, entity_id, metadata_json, actor, created_at)| {
                let metadata = match metadata_json {
                    Some(raw) => Some(serde_json::from_str(&raw)?),
                    None => None,
                };
                Ok(AuditRecord {
                    audit_id,
                    action_type,
                    entity_type,
                    entity_id,
                    metadata,
                    actor,
                    created_at: created_at.parse::<DateTime<Utc>>().map_err(|e| {
                        RepositoryError::FieldValueError {
                            field: "created_at".to_string(),
                            message: format!("时间戳解析失败: {}", e),
                        }
                    })?,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use serde_json::json;

    fn test_repo() -> AuditLogRepository {
        let conn = Connection::open_in_memory().unwrap();
        db::configure_sqlite_connection(&conn).unwrap();
        db::ensure_schema(&conn).unwrap();
        AuditLogRepository::new(Arc::new(Mutex::new(conn)))
    }

    #[test]
    fn test_insert_and_find_by_entity() {
        let repo = test_repo();
        let record = AuditRecord {
            audit_id: "audit-1".to_string(),
            action_type: "PRODUCT_IMPORT".to_string(),
            entity_type: "ImportJob".to_string(),
            entity_id: "job-1".to_string(),
            metadata: Some(json!({ "successRows": 2, "errorRows": 0 })),
            actor: "ops@example.com".to_string(),
            created_at: Utc::now(),
        };
        repo.insert(&record).unwrap();

        let found = repo.find_by_entity("job-1").unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].action_type, "PRODUCT_IMPORT");
        assert_eq!(found[0].metadata.as_ref().unwrap()["successRows"], 2);

        assert!(repo.find_by_entity("ghost").unwrap().is_empty());
    }
}
