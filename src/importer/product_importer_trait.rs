// ==========================================
// 商品目录导入系统 - 导入组件 Trait
// ==========================================
// 职责: 定义导入管道的组件接口（不包含实现）
// ==========================================

use crate::domain::import_job::{CommitSummary, PreviewRow, ValidateSummary};
use crate::domain::types::{ImportMode, ImportType};
use crate::importer::error::ImportError;
use crate::importer::file_parser::RawRow;
use async_trait::async_trait;

// ==========================================
// FileParser Trait
// ==========================================
// 用途: 文件解析接口（阶段 0）
// 实现者: CsvParser, WorkbookParser
pub trait FileParser: Send + Sync {
    /// 解析原始字节为行记录序列
    ///
    /// # 参数
    /// - bytes: 文件原始字节
    ///
    /// # 返回
    /// - Ok(Vec<RawRow>): 带 1 基源行号的行记录（表头占第 1 行）
    /// - Err(ImportError): 空文件/表头不可读/编解码失败，中止整个请求
    fn parse_rows(&self, bytes: &[u8]) -> Result<Vec<RawRow>, ImportError>;
}

// ==========================================
// ProductImportValidator Trait
// ==========================================
// 用途: 校验阶段主接口（解析 → 校验 → 调和 → 任务落库）
// 实现者: ImportService
#[async_trait]
pub trait ProductImportValidator: Send + Sync {
    /// 校验一次上传，生成完整预览并创建 VALIDATED 任务
    ///
    /// # 返回
    /// - Ok(ValidateOutcome): 任务 ID + 预览 + 四分桶汇总
    /// - Err(ImportError): 解析失败（任务未创建）或仓储错误
    async fn validate(
        &self,
        file_name: &str,
        bytes: &[u8],
        import_type: ImportType,
        mode: ImportMode,
        actor: &str,
    ) -> Result<ValidateOutcome, ImportError>;
}

// ==========================================
// ProductImportCommitter Trait
// ==========================================
// 用途: 提交阶段主接口（CAS → 回放 → 终态 + 审计）
// 实现者: CommitExecutor
#[async_trait]
pub trait ProductImportCommitter: Send + Sync {
    /// 确认并执行一个 VALIDATED 任务
    ///
    /// # 返回
    /// - Ok(CommitOutcome): 最终计数（部分失败也返回计数，不抛裸异常）
    /// - Err(ImportError): 任务不存在/状态不允许/仓储级失败
    async fn confirm(&self, job_id: &str, actor: &str) -> Result<CommitOutcome, ImportError>;
}

// ==========================================
// 阶段结果结构
// ==========================================

/// 校验阶段结果
#[derive(Debug, Clone)]
pub struct ValidateOutcome {
    pub job_id: String,
    pub preview: Vec<PreviewRow>,
    pub summary: ValidateSummary,
}

/// 提交阶段结果
#[derive(Debug, Clone)]
pub struct CommitOutcome {
    pub success: bool, // 无行级失败
    pub summary: CommitSummary,
}
