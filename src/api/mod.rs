// ==========================================
// 商品目录导入系统 - API 层
// ==========================================

pub mod error;
pub mod import_api;

pub use error::{ApiError, ApiResult};
pub use import_api::{ConfirmImportResponse, ImportApi, ValidateImportResponse};
