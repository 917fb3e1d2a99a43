// ==========================================
// 商品目录批量导入系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 校验/提交两阶段批处理管道 (人工确认后写入)
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 导入层 - 解析/校验/调和/提交
pub mod importer;

// API 层 - 业务接口
pub mod api;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{ImportMode, ImportType, JobStatus, RowAction};

// 领域实体
pub use domain::{
    AuditRecord, CommitSummary, FieldChange, ImportJob, ImportJobSummary, PreviewRow, Product,
    ProductPatch, ValidateSummary,
};

// 导入管道
pub use importer::{
    CommitExecutor, ImportError, ImportService, ProductImportCommitter, ProductImportValidator,
};

// API
pub use api::{ApiError, ConfirmImportResponse, ImportApi, ValidateImportResponse};

/// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// 系统名称
pub const APP_NAME: &str = "商品目录批量导入系统";
