// ==========================================
// 商品目录导入系统 - 导入管道
// ==========================================
// 职责: 文件解析 → 行校验 → 调和 → 任务落库 → 确认提交
// ==========================================

pub mod commit_executor;
pub mod error;
pub mod file_parser;
pub mod import_service;
pub mod product_importer_trait;
pub mod reconciler;
pub mod row_validator;
pub mod rule_set;

pub use commit_executor::CommitExecutor;
pub use error::{ImportError, ImportModuleResult};
pub use file_parser::{parser_for, CsvParser, FileFormat, RawRow, WorkbookParser};
pub use import_service::ImportService;
pub use product_importer_trait::{
    CommitOutcome, FileParser, ProductImportCommitter, ProductImportValidator, ValidateOutcome,
};
pub use reconciler::RowReconciler;
pub use row_validator::RowValidator;
