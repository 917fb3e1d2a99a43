// ==========================================
// 商品目录导入系统 - 导入作业 Repository 接口
// ==========================================
// 职责: 定义导入作业持久化接口
// 红线: 状态推进必须通过 try_transition 的条件更新（CAS）
// ==========================================

use crate::domain::import_job::{ImportJob, ImportJobSummary};
use crate::domain::types::JobStatus;
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[async_trait]
pub trait ImportJobRepository: Send + Sync {
    /// 写入新作业（含预览快照）
    async fn insert_job(&self, job: &ImportJob) -> RepositoryResult<()>;

    /// 按 ID 读取作业（含预览快照）
    async fn get_job(&self, job_id: &str) -> RepositoryResult<Option<ImportJob>>;

    /// 条件状态推进: 仅当当前状态等于 expected 时置为 next。
    /// 返回 false 表示条件不满足（并发提交或状态已终结），未做任何修改。
    async fn try_transition(
        &self,
        job_id: &str,
        expected: JobStatus,
        next: JobStatus,
    ) -> RepositoryResult<bool>;

    /// 终结作业: 写入最终状态、成功/失败行数与执行时间
    async fn finalize_job(
        &self,
        job_id: &str,
        status: JobStatus,
        success_rows: i64,
        error_rows: i64,
        executed_at: DateTime<Utc>,
    ) -> RepositoryResult<()>;

    /// 最近作业列表（按创建时间倒序, 不含预览快照）
    async fn recent_jobs(&self, limit: usize) -> RepositoryResult<Vec<ImportJobSummary>>;
}
