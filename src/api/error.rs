// ==========================================
// 商品目录导入系统 - API 层错误类型
// ==========================================
// 职责: 对外暴露的稳定错误分类
// ==========================================

use crate::importer::error::ImportError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    /// 文件不可解析, 请求整体中止
    #[error("解析失败: {0}")]
    ParseError(String),

    /// 请求参数非法
    #[error("参数非法: {0}")]
    InvalidInput(String),

    /// 目标资源不存在
    #[error("资源不存在: {0}")]
    NotFound(String),

    /// 任务当前状态不允许该操作
    #[error("状态不允许: {0}")]
    StateError(String),

    /// 存储层失败
    #[error("存储层错误: {0}")]
    DatabaseError(String),

    #[error("内部错误: {0}")]
    InternalError(String),
}

impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::EmptyFile
            | ImportError::HeaderMissing
            | ImportError::UnsupportedFormat(_)
            | ImportError::FileReadError(_)
            | ImportError::ExcelParseError(_)
            | ImportError::CsvParseError(_) => ApiError::ParseError(err.to_string()),
            ImportError::JobNotFound(_) => ApiError::NotFound(err.to_string()),
            ImportError::InvalidJobState { .. } => ApiError::StateError(err.to_string()),
            ImportError::Repository(e) => ApiError::from(e),
            ImportError::InternalError(msg) => ApiError::InternalError(msg),
            ImportError::Other(e) => ApiError::InternalError(e.to_string()),
        }
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            other => ApiError::DatabaseError(other.to_string()),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_error_mapping() {
        assert!(matches!(
            ApiError::from(ImportError::EmptyFile),
            ApiError::ParseError(_)
        ));
        assert!(matches!(
            ApiError::from(ImportError::JobNotFound("x".to_string())),
            ApiError::NotFound(_)
        ));
        assert!(matches!(
            ApiError::from(ImportError::InvalidJobState {
                job_id: "x".to_string(),
                status: "COMPLETED".to_string()
            }),
            ApiError::StateError(_)
        ));
    }
}
