// ==========================================
// 商品目录导入系统 - 校验阶段服务
// ==========================================
// 职责: 解析上传文件, 逐行校验并调和, 创建 VALIDATED 任务
// 红线: 本阶段只读目录, 不写任何商品数据
// ==========================================

use crate::domain::import_job::{ImportJob, ValidateSummary};
use crate::domain::types::{ImportMode, ImportType, JobStatus};
use crate::importer::error::ImportError;
use crate::importer::file_parser::{parser_for, FileFormat};
use crate::importer::product_importer_trait::{ProductImportValidator, ValidateOutcome};
use crate::importer::reconciler::RowReconciler;
use crate::importer::row_validator::RowValidator;
use crate::importer::rule_set::FIELD_SKU;
use crate::repository::import_job_repo::ImportJobRepository;
use crate::repository::product_repo::ProductRepository;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

// ==========================================
// ImportService
// ==========================================
pub struct ImportService<P: ProductRepository, J: ImportJobRepository> {
    product_repo: Arc<P>,
    job_repo: Arc<J>,
}

impl<P: ProductRepository, J: ImportJobRepository> ImportService<P, J> {
    pub fn new(product_repo: Arc<P>, job_repo: Arc<J>) -> Self {
        Self {
            product_repo,
            job_repo,
        }
    }
}

#[async_trait]
impl<P: ProductRepository, J: ImportJobRepository> ProductImportValidator for ImportService<P, J> {
    async fn validate(
        &self,
        file_name: &str,
        bytes: &[u8],
        import_type: ImportType,
        mode: ImportMode,
        actor: &str,
    ) -> Result<ValidateOutcome, ImportError> {
        info!(
            file_name = %file_name,
            import_type = %import_type,
            mode = %mode,
            size_bytes = bytes.len(),
            "开始校验导入文件"
        );

        // 阶段 0: 解析（失败即中止，不创建任务）
        let format = FileFormat::from_file_name(file_name)?;
        let rows = parser_for(format).parse_rows(bytes)?;
        debug!(rows = rows.len(), "文件解析完成");

        // 阶段 1+2: 逐行校验 + 调和
        let validator = RowValidator::new(import_type);
        let reconciler = RowReconciler::new(import_type, mode);

        let mut preview = Vec::with_capacity(rows.len());
        for row in &rows {
            let errors = validator.validate(row);

            // 键缺失或为空时不查目录
            let existing = match row.get(FIELD_SKU) {
                Some(sku) => self.product_repo.find_by_sku(sku).await?,
                None => None,
            };

            preview.push(reconciler.reconcile(row, errors, existing.as_ref()));
        }

        let summary = ValidateSummary::from_preview(&preview);

        // 阶段 3: 任务落库（预览快照随任务持久化）
        let job_id = Uuid::new_v4().to_string();
        let job = ImportJob {
            job_id: job_id.clone(),
            import_type,
            mode,
            file_name: file_name.to_string(),
            status: JobStatus::Validated,
            total_rows: summary.total as i64,
            success_rows: 0,
            error_rows: summary.errors as i64,
            preview_rows: preview.clone(),
            created_by: actor.to_string(),
            created_at: Utc::now(),
            executed_at: None,
        };
        self.job_repo.insert_job(&job).await?;

        info!(
            job_id = %job_id,
            total = summary.total,
            to_create = summary.to_create,
            to_update = summary.to_update,
            skipped = summary.skipped,
            errors = summary.errors,
            "校验完成"
        );

        Ok(ValidateOutcome {
            job_id,
            preview,
            summary,
        })
    }
}
