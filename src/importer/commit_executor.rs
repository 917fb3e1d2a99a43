// ==========================================
// 商品目录导入系统 - 提交阶段执行器
// ==========================================
// 职责: 确认 VALIDATED 任务, 按预览回放写入目录, 终结任务并留审计
// 红线: 状态推进仅通过条件更新; 行级失败不中断整批
// ==========================================

use crate::domain::import_job::{AuditRecord, CommitSummary, ImportJob, PreviewRow};
use crate::domain::product::{Product, ProductPatch};
use crate::domain::types::{JobStatus, RowAction};
use crate::importer::error::ImportError;
use crate::importer::file_parser::RawRow;
use crate::importer::product_importer_trait::{CommitOutcome, ProductImportCommitter};
use crate::importer::reconciler::RowReconciler;
use crate::importer::rule_set::{
    FIELD_MOQ, FIELD_NAME_FR, FIELD_PACK_SIZE, FIELD_PRICE_BASE, FIELD_PROMO_PRICE,
    FIELD_STOCK_QUANTITY,
};
use crate::repository::audit_log_repo::AuditLogRepository;
use crate::repository::import_job_repo::ImportJobRepository;
use crate::repository::product_repo::ProductRepository;
use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

// ==========================================
// CommitExecutor
// ==========================================
pub struct CommitExecutor<P: ProductRepository, J: ImportJobRepository> {
    product_repo: Arc<P>,
    job_repo: Arc<J>,
    audit_repo: Arc<AuditLogRepository>,
}

impl<P: ProductRepository, J: ImportJobRepository> CommitExecutor<P, J> {
    pub fn new(
        product_repo: Arc<P>,
        job_repo: Arc<J>,
        audit_repo: Arc<AuditLogRepository>,
    ) -> Self {
        Self {
            product_repo,
            job_repo,
            audit_repo,
        }
    }

    /// 回放单行, 返回失败原因（None 表示成功）
    async fn apply_row(&self, job: &ImportJob, row: &PreviewRow) -> Option<String> {
        let result = match row.action {
            RowAction::Create => self.apply_create(row).await,
            RowAction::Update => self.apply_update(job, row).await,
            _ => return None,
        };
        result.err()
    }

    /// CREATE 回放: 按提交值 + 目录默认值组装新商品
    async fn apply_create(&self, row: &PreviewRow) -> Result<(), String> {
        let get = |field: &str| row.source_fields.get(field).map(String::as_str);

        let name_fr = get(FIELD_NAME_FR)
            .ok_or_else(|| "商品名称缺失，无法新建".to_string())?
            .to_string();
        let base_price = parse_f64(get(FIELD_PRICE_BASE)).unwrap_or(0.0);
        let promo_price = parse_f64(get(FIELD_PROMO_PRICE));
        let stock_quantity = parse_i64(get(FIELD_STOCK_QUANTITY)).unwrap_or(0);
        let pack_size = parse_i64(get(FIELD_PACK_SIZE)).unwrap_or(1);
        let moq = parse_i64(get(FIELD_MOQ)).unwrap_or(1);
        let is_active = get("is_active") != Some("false");

        let now = Utc::now();
        let product = Product {
            sku: row.sku.clone(),
            name_fr,
            slug: Product::slug_from_sku(&row.sku),
            unit: "UNIT".to_string(),
            base_price,
            promo_price,
            tax_rate: 0.20,
            stock_quantity,
            pack_size,
            moq,
            is_active,
            created_at: now,
            updated_at: now,
        };

        self.product_repo
            .insert(&product)
            .await
            .map_err(|e| format!("新建商品失败: {}", e))
    }

    /// UPDATE 回放: 基于目录当前值重算差异后打补丁
    async fn apply_update(&self, job: &ImportJob, row: &PreviewRow) -> Result<(), String> {
        let current = self
            .product_repo
            .find_by_sku(&row.sku)
            .await
            .map_err(|e| format!("读取商品失败: {}", e))?
            .ok_or_else(|| "提交时商品已不存在".to_string())?;

        // 差异在提交时重算: 校验到提交之间目录可能已被其他改动追平
        let raw = RawRow {
            row_number: row.row_number,
            fields: row
                .source_fields
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect::<HashMap<_, _>>(),
        };
        let reconciler = RowReconciler::new(job.import_type, job.mode);
        let changes = reconciler.compute_field_changes(&raw, &current);

        let patch = patch_from_changes(&changes);
        if patch.is_empty() {
            return Ok(()); // 已无差异, 视为成功
        }

        let updated = self
            .product_repo
            .update_fields(&row.sku, &patch)
            .await
            .map_err(|e| format!("更新商品失败: {}", e))?;
        if updated == 0 {
            return Err("提交时商品已不存在".to_string());
        }

        Ok(())
    }
}

/// 字段差异 → 更新补丁
fn patch_from_changes(
    changes: &std::collections::BTreeMap<String, crate::domain::import_job::FieldChange>,
) -> ProductPatch {
    let mut patch = ProductPatch::default();
    for (field, change) in changes {
        match field.as_str() {
            FIELD_NAME_FR => patch.name_fr = change.new.as_str().map(String::from),
            FIELD_PRICE_BASE => patch.base_price = change.new.as_f64(),
            FIELD_PROMO_PRICE => patch.promo_price = change.new.as_f64(),
            FIELD_STOCK_QUANTITY => patch.stock_quantity = change.new.as_i64(),
            FIELD_PACK_SIZE => patch.pack_size = change.new.as_i64(),
            FIELD_MOQ => patch.moq = change.new.as_i64(),
            _ => {}
        }
    }
    patch
}

fn parse_f64(raw: Option<&str>) -> Option<f64> {
    raw.and_then(|v| v.parse::<f64>().ok())
}

fn parse_i64(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|v| v.parse::<i64>().ok())
}

#[async_trait]
impl<P: ProductRepository, J: ImportJobRepository> ProductImportCommitter
    for CommitExecutor<P, J>
{
    async fn confirm(&self, job_id: &str, actor: &str) -> Result<CommitOutcome, ImportError> {
        let job = self
            .job_repo
            .get_job(job_id)
            .await?
            .ok_or_else(|| ImportError::JobNotFound(job_id.to_string()))?;

        // 条件推进 VALIDATED → PROCESSING, 失败说明任务已被领取或已终结
        let claimed = self
            .job_repo
            .try_transition(job_id, JobStatus::Validated, JobStatus::Processing)
            .await?;
        if !claimed {
            let actual = self
                .job_repo
                .get_job(job_id)
                .await?
                .map(|j| j.status.to_string())
                .unwrap_or_else(|| "UNKNOWN".to_string());
            return Err(ImportError::InvalidJobState {
                job_id: job_id.to_string(),
                status: actual,
            });
        }

        info!(
            job_id = %job_id,
            import_type = %job.import_type,
            mode = %job.mode,
            rows = job.total_rows,
            "开始提交导入任务"
        );

        // 按源行号顺序回放
        let mut rows: Vec<&PreviewRow> = job.preview_rows.iter().collect();
        rows.sort_by_key(|r| r.row_number);

        let mut success: i64 = 0;
        let mut errors: i64 = 0;
        for row in rows {
            if row.action == RowAction::Error {
                errors += 1;
                continue;
            }
            if !row.action.is_actionable() {
                continue;
            }

            match self.apply_row(&job, row).await {
                None => success += 1,
                Some(reason) => {
                    warn!(
                        job_id = %job_id,
                        row_number = row.row_number,
                        sku = %row.sku,
                        reason = %reason,
                        "行提交失败"
                    );
                    errors += 1;
                }
            }
        }

        // 终态: 无任何错误行才算 COMPLETED
        let final_status = if errors == 0 {
            JobStatus::Completed
        } else {
            JobStatus::Failed
        };
        let executed_at = Utc::now();
        self.job_repo
            .finalize_job(job_id, final_status, success, errors, executed_at)
            .await?;

        // 每任务恰好一条审计记录（不论成败）
        let audit = AuditRecord {
            audit_id: Uuid::new_v4().to_string(),
            action_type: "PRODUCT_IMPORT".to_string(),
            entity_type: "ImportJob".to_string(),
            entity_id: job_id.to_string(),
            metadata: Some(json!({
                "importType": job.import_type.to_string(),
                "mode": job.mode.to_string(),
                "fileName": job.file_name,
                "totalRows": job.total_rows,
                "successRows": success,
                "errorRows": errors,
                "finalStatus": final_status.to_string(),
            })),
            actor: actor.to_string(),
            created_at: executed_at,
        };
        self.audit_repo.insert(&audit)?;

        info!(
            job_id = %job_id,
            status = %final_status,
            success_rows = success,
            error_rows = errors,
            "提交完成"
        );

        Ok(CommitOutcome {
            success: errors == 0,
            summary: CommitSummary {
                success: success as usize,
                errors: errors as usize,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::domain::types::{ImportMode, ImportType};
    use crate::importer::import_service::ImportService;
    use crate::importer::product_importer_trait::ProductImportValidator;
    use crate::repository::{ImportJobRepositoryImpl, ProductRepositoryImpl};
    use rusqlite::Connection;
    use std::sync::{Arc, Mutex};

    struct Fixture {
        conn: Arc<Mutex<Connection>>,
        service: ImportService<ProductRepositoryImpl, ImportJobRepositoryImpl>,
        executor: CommitExecutor<ProductRepositoryImpl, ImportJobRepositoryImpl>,
        product_repo: Arc<ProductRepositoryImpl>,
        job_repo: Arc<ImportJobRepositoryImpl>,
        audit_repo: Arc<AuditLogRepository>,
    }

    fn fixture() -> Fixture {
        let conn = Connection::open_in_memory().unwrap();
        db::configure_sqlite_connection(&conn).unwrap();
        db::ensure_schema(&conn).unwrap();
        let conn = Arc::new(Mutex::new(conn));

        let product_repo = Arc::new(ProductRepositoryImpl::new(conn.clone()));
        let job_repo = Arc::new(ImportJobRepositoryImpl::new(conn.clone()));
        let audit_repo = Arc::new(AuditLogRepository::new(conn.clone()));

        Fixture {
            conn,
            service: ImportService::new(product_repo.clone(), job_repo.clone()),
            executor: CommitExecutor::new(
                product_repo.clone(),
                job_repo.clone(),
                audit_repo.clone(),
            ),
            product_repo,
            job_repo,
            audit_repo,
        }
    }

    async fn seed_product(repo: &ProductRepositoryImpl, sku: &str, base_price: f64) {
        let now = Utc::now();
        repo.insert(&Product {
            sku: sku.to_string(),
            name_fr: format!("Produit {}", sku),
            slug: Product::slug_from_sku(sku),
            unit: "UNIT".to_string(),
            base_price,
            promo_price: None,
            tax_rate: 0.20,
            stock_quantity: 10,
            pack_size: 1,
            moq: 1,
            is_active: true,
            created_at: now,
            updated_at: now,
        })
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_commit_applies_creates_and_updates() {
        let f = fixture();
        seed_product(&f.product_repo, "LP-001", 100.0).await;

        let csv = "sku,name_fr,price_base,stock_quantity\nLP-001,Produit LP-001,120.5,10\nLP-002,Nouveau produit,80,3\n";
        let outcome = f
            .service
            .validate(
                "catalogue.csv",
                csv.as_bytes(),
                ImportType::Full,
                ImportMode::Upsert,
                "ops@example.com",
            )
            .await
            .unwrap();

        let commit = f.executor.confirm(&outcome.job_id, "ops@example.com").await.unwrap();
        assert!(commit.success);
        assert_eq!(commit.summary.success, 2);
        assert_eq!(commit.summary.errors, 0);

        // UPDATE 仅改动差异字段
        let updated = f.product_repo.find_by_sku("LP-001").await.unwrap().unwrap();
        assert_eq!(updated.base_price, 120.5);
        assert_eq!(updated.stock_quantity, 10);

        // CREATE 套用目录默认值
        let created = f.product_repo.find_by_sku("LP-002").await.unwrap().unwrap();
        assert_eq!(created.name_fr, "Nouveau produit");
        assert_eq!(created.base_price, 80.0);
        assert_eq!(created.stock_quantity, 3);
        assert_eq!(created.unit, "UNIT");
        assert_eq!(created.tax_rate, 0.20);
        assert_eq!(created.pack_size, 1);
        assert_eq!(created.moq, 1);
        assert!(created.is_active);
        assert_eq!(created.slug, "lp-002");

        // 任务终态 + 审计记录
        let job = f.job_repo.get_job(&outcome.job_id).await.unwrap().unwrap();
        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(job.success_rows, 2);
        assert!(job.executed_at.is_some());

        let audits = f.audit_repo.find_by_entity(&outcome.job_id).unwrap();
        assert_eq!(audits.len(), 1);
        assert_eq!(audits[0].action_type, "PRODUCT_IMPORT");
    }

    #[tokio::test]
    async fn test_double_confirm_rejected_and_counts_untouched() {
        let f = fixture();
        let csv = "sku,name_fr\nLP-010,Produit dix\n";
        let outcome = f
            .service
            .validate(
                "catalogue.csv",
                csv.as_bytes(),
                ImportType::Full,
                ImportMode::Upsert,
                "ops@example.com",
            )
            .await
            .unwrap();

        f.executor.confirm(&outcome.job_id, "ops@example.com").await.unwrap();
        let job_after_first = f.job_repo.get_job(&outcome.job_id).await.unwrap().unwrap();

        let second = f.executor.confirm(&outcome.job_id, "ops@example.com").await;
        assert!(matches!(second, Err(ImportError::InvalidJobState { .. })));

        // 第二次调用未改动任何计数与状态
        let job_after_second = f.job_repo.get_job(&outcome.job_id).await.unwrap().unwrap();
        assert_eq!(job_after_second.status, job_after_first.status);
        assert_eq!(job_after_second.success_rows, job_after_first.success_rows);
        assert_eq!(job_after_second.error_rows, job_after_first.error_rows);

        // 审计仍只有一条
        let audits = f.audit_repo.find_by_entity(&outcome.job_id).unwrap();
        assert_eq!(audits.len(), 1);
    }

    #[tokio::test]
    async fn test_confirm_unknown_job() {
        let f = fixture();
        let result = f.executor.confirm("ghost-job", "ops@example.com").await;
        assert!(matches!(result, Err(ImportError::JobNotFound(_))));
    }

    #[tokio::test]
    async fn test_partial_failure_marks_job_failed() {
        let f = fixture();
        let csv = "sku,name_fr\nLP-020,Produit valide\nXX,Nom invalide\n";
        let outcome = f
            .service
            .validate(
                "catalogue.csv",
                csv.as_bytes(),
                ImportType::Full,
                ImportMode::Upsert,
                "ops@example.com",
            )
            .await
            .unwrap();

        let commit = f.executor.confirm(&outcome.job_id, "ops@example.com").await.unwrap();
        assert!(!commit.success);
        assert_eq!(commit.summary.success, 1);
        assert_eq!(commit.summary.errors, 1);

        // 有效行仍然写入
        assert!(f.product_repo.find_by_sku("LP-020").await.unwrap().is_some());

        let job = f.job_repo.get_job(&outcome.job_id).await.unwrap().unwrap();
        assert_eq!(job.status, JobStatus::Failed);
    }

    #[tokio::test]
    async fn test_skip_rows_touch_nothing() {
        let f = fixture();
        seed_product(&f.product_repo, "LP-030", 50.0).await;

        // CREATE_ONLY 模式下已存在商品 → SKIP
        let csv = "sku,name_fr,price_base\nLP-030,Produit trente,99\n";
        let outcome = f
            .service
            .validate(
                "catalogue.csv",
                csv.as_bytes(),
                ImportType::Full,
                ImportMode::CreateOnly,
                "ops@example.com",
            )
            .await
            .unwrap();
        assert_eq!(outcome.summary.skipped, 1);

        let commit = f.executor.confirm(&outcome.job_id, "ops@example.com").await.unwrap();
        assert!(commit.success);
        assert_eq!(commit.summary.success, 0);

        // 目录条目原样未动
        let product = f.product_repo.find_by_sku("LP-030").await.unwrap().unwrap();
        assert_eq!(product.base_price, 50.0);
        assert_eq!(product.name_fr, "Produit LP-030");

        let job = f.job_repo.get_job(&outcome.job_id).await.unwrap().unwrap();
        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(job.success_rows, 0);
    }

    #[tokio::test]
    async fn test_update_target_vanished_between_phases() {
        let f = fixture();
        seed_product(&f.product_repo, "LP-040", 10.0).await;

        let csv = "sku,stock_quantity\nLP-040,77\n";
        let outcome = f
            .service
            .validate(
                "stock.csv",
                csv.as_bytes(),
                ImportType::StockOnly,
                ImportMode::Upsert,
                "ops@example.com",
            )
            .await
            .unwrap();
        assert_eq!(outcome.summary.to_update, 1);

        // 校验与提交之间目标被删除
        f.conn
            .lock()
            .unwrap()
            .execute("DELETE FROM product WHERE sku = 'LP-040'", [])
            .unwrap();

        let commit = f.executor.confirm(&outcome.job_id, "ops@example.com").await.unwrap();
        assert!(!commit.success);
        assert_eq!(commit.summary.success, 0);
        assert_eq!(commit.summary.errors, 1);

        let job = f.job_repo.get_job(&outcome.job_id).await.unwrap().unwrap();
        assert_eq!(job.status, JobStatus::Failed);
    }
}
