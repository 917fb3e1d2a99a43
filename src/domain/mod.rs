// ==========================================
// 商品目录导入系统 - 领域层
// ==========================================
// 职责: 实体与类型定义，不包含业务流程
// ==========================================

pub mod import_job;
pub mod product;
pub mod types;

// 重导出核心类型
pub use import_job::{
    AuditRecord, CommitSummary, FieldChange, ImportJob, ImportJobSummary, PreviewRow,
    ValidateSummary,
};
pub use product::{Product, ProductPatch};
pub use types::{ImportMode, ImportType, JobStatus, RowAction};
