// ==========================================
// 商品目录导入系统 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use thiserror::Error;

/// 导入模块错误类型
///
/// 解析类错误中止整个校验请求（任务尚未创建）；
/// 行级校验问题不走此类型，而是进入 PreviewRow.validation_errors。
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件相关错误 =====
    #[error("文件为空")]
    EmptyFile,

    #[error("表头行缺失或不可读")]
    HeaderMissing,

    #[error("文件格式不支持: {0}（仅支持 .xlsx/.xls/.csv）")]
    UnsupportedFormat(String),

    #[error("文件读取失败: {0}")]
    FileReadError(String),

    #[error("Excel 解析失败: {0}")]
    ExcelParseError(String),

    #[error("CSV 解析失败: {0}")]
    CsvParseError(String),

    // ===== 任务状态错误 =====
    #[error("导入任务不存在: {0}")]
    JobNotFound(String),

    #[error("任务状态不允许提交: job_id={job_id}, 当前状态={status}（仅 VALIDATED 可提交）")]
    InvalidJobState { job_id: String, status: String },

    // ===== 仓储错误 =====
    #[error("仓储访问失败: {0}")]
    Repository(#[from] crate::repository::error::RepositoryError),

    // ===== 通用错误 =====
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

// 实现 From<calamine::XlsxError>
impl From<calamine::XlsxError> for ImportError {
    fn from(err: calamine::XlsxError) -> Self {
        ImportError::ExcelParseError(err.to_string())
    }
}

/// Result 类型别名
pub type ImportModuleResult<T> = Result<T, ImportError>;
