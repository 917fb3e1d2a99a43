// ==========================================
// 商品目录导入系统 - 对外 API
// ==========================================
// 职责: 组装各层组件, 提供校验/确认/历史三个入口
// 红线: 调用方只接触本层类型与 ApiError
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::db;
use crate::domain::import_job::{CommitSummary, ImportJobSummary, PreviewRow, ValidateSummary};
use crate::domain::types::{ImportMode, ImportType};
use crate::importer::commit_executor::CommitExecutor;
use crate::importer::import_service::ImportService;
use crate::importer::product_importer_trait::{ProductImportCommitter, ProductImportValidator};
use crate::repository::audit_log_repo::AuditLogRepository;
use crate::repository::import_job_repo::ImportJobRepository;
use crate::repository::import_job_repo_impl::ImportJobRepositoryImpl;
use crate::repository::product_repo_impl::ProductRepositoryImpl;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::info;

/// 校验接口响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidateImportResponse {
    pub job_id: String,
    pub preview: Vec<PreviewRow>,
    pub summary: ValidateSummary,
}

/// 确认接口响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmImportResponse {
    pub success: bool,
    pub summary: CommitSummary,
}

// ==========================================
// ImportApi
// ==========================================
pub struct ImportApi {
    validator: ImportService<ProductRepositoryImpl, ImportJobRepositoryImpl>,
    committer: CommitExecutor<ProductRepositoryImpl, ImportJobRepositoryImpl>,
    job_repo: Arc<ImportJobRepositoryImpl>,
}

impl ImportApi {
    /// 打开（或创建）数据库并组装完整导入管道
    pub fn new<P: AsRef<Path>>(db_path: P) -> ApiResult<Self> {
        let conn = db::open_sqlite_connection(db_path.as_ref())
            .map_err(|e| ApiError::DatabaseError(e.to_string()))?;
        db::ensure_schema(&conn).map_err(|e| ApiError::DatabaseError(e.to_string()))?;
        Ok(Self::with_connection(Arc::new(Mutex::new(conn))))
    }

    /// 用已配置好的共享连接组装（测试用）
    pub fn with_connection(conn: Arc<Mutex<rusqlite::Connection>>) -> Self {
        let product_repo = Arc::new(ProductRepositoryImpl::new(conn.clone()));
        let job_repo = Arc::new(ImportJobRepositoryImpl::new(conn.clone()));
        let audit_repo = Arc::new(AuditLogRepository::new(conn));

        Self {
            validator: ImportService::new(product_repo.clone(), job_repo.clone()),
            committer: CommitExecutor::new(product_repo, job_repo.clone(), audit_repo),
            job_repo,
        }
    }

    /// 校验一次上传: 解析 → 校验 → 调和 → 创建 VALIDATED 任务
    pub async fn validate_import(
        &self,
        file_name: &str,
        bytes: &[u8],
        import_type: ImportType,
        mode: ImportMode,
        actor: &str,
    ) -> ApiResult<ValidateImportResponse> {
        if file_name.trim().is_empty() {
            return Err(ApiError::InvalidInput("文件名不能为空".to_string()));
        }
        if actor.trim().is_empty() {
            return Err(ApiError::InvalidInput("操作人不能为空".to_string()));
        }

        let outcome = self
            .validator
            .validate(file_name, bytes, import_type, mode, actor)
            .await?;

        Ok(ValidateImportResponse {
            job_id: outcome.job_id,
            preview: outcome.preview,
            summary: outcome.summary,
        })
    }

    /// 确认一个 VALIDATED 任务并执行写入
    pub async fn confirm_import(
        &self,
        job_id: &str,
        actor: &str,
    ) -> ApiResult<ConfirmImportResponse> {
        if job_id.trim().is_empty() {
            return Err(ApiError::InvalidInput("任务 ID 不能为空".to_string()));
        }

        let outcome = self.committer.confirm(job_id, actor).await?;

        Ok(ConfirmImportResponse {
            success: outcome.success,
            summary: outcome.summary,
        })
    }

    /// 最近导入任务列表（倒序, 不含预览）
    pub async fn list_import_jobs(&self, limit: usize) -> ApiResult<Vec<ImportJobSummary>> {
        let jobs = self.job_repo.recent_jobs(limit).await?;
        info!(count = jobs.len(), "查询导入历史");
        Ok(jobs)
    }
}
