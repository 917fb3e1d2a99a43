// ==========================================
// 商品目录导入系统 - Repository 层
// ==========================================
// 职责: 数据访问层, 封装 SQLite 读写
// ==========================================

pub mod audit_log_repo;
pub mod error;
pub mod import_job_repo;
pub mod import_job_repo_impl;
pub mod product_repo;
pub mod product_repo_impl;

pub use audit_log_repo::AuditLogRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use import_job_repo::ImportJobRepository;
pub use import_job_repo_impl::ImportJobRepositoryImpl;
pub use product_repo::ProductRepository;
pub use product_repo_impl::ProductRepositoryImpl;
