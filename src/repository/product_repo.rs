// ==========================================
// 商品目录导入系统 - 商品 Repository Trait
// ==========================================
// 职责: 定义目录访问契约（自然键查询 + 新建/补丁更新）
// 红线: Repository 不含业务规则，只做数据 CRUD
// ==========================================

use crate::domain::product::{Product, ProductPatch};
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;

// ==========================================
// ProductRepository Trait
// ==========================================
// 用途: 调和阶段只读查询，提交阶段写入
// 实现者: ProductRepositoryImpl（使用 rusqlite）
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// 按 SKU 查询商品
    ///
    /// # 返回
    /// - Ok(Some(product)): 商品存在
    /// - Ok(None): 商品不存在
    async fn find_by_sku(&self, sku: &str) -> RepositoryResult<Option<Product>>;

    /// 新建商品（SKU 冲突报唯一约束错误）
    async fn insert(&self, product: &Product) -> RepositoryResult<()>;

    /// 按补丁部分更新商品（None 字段保持不变）
    ///
    /// # 返回
    /// - Ok(rows): 受影响行数（0 = 目标不存在）
    async fn update_fields(&self, sku: &str, patch: &ProductPatch) -> RepositoryResult<usize>;

    /// 统计商品数量
    async fn count(&self) -> RepositoryResult<usize>;
}
