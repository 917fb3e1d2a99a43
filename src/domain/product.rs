// ==========================================
// 商品目录导入系统 - 商品领域模型
// ==========================================
// 红线: 本管道只通过 SKU 查询 + 新建/补丁更新两个契约访问目录
// 对齐: db.rs product 表
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// Product - 商品主数据（目录条目）
// ==========================================
// 用途: 调和阶段只读，提交阶段写入
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    // ===== 主键（自然键）=====
    pub sku: String, // 人工分配的商品编码，导入调和的唯一查找键

    // ===== 基础信息 =====
    pub name_fr: String,            // 商品名称（法语主名称）
    pub slug: String,               // URL 标识（由 SKU 派生）
    pub unit: String,               // 销售单位（UNIT/CARTON/BOX/PALLET）

    // ===== 价格维度 =====
    pub base_price: f64,            // 基础价格
    pub promo_price: Option<f64>,   // 促销价格
    pub tax_rate: f64,              // 税率

    // ===== 库存维度 =====
    pub stock_quantity: i64,        // 库存数量
    pub pack_size: i64,             // 包装数量
    pub moq: i64,                   // 最小起订量

    // ===== 状态 =====
    pub is_active: bool,            // 是否上架

    // ===== 审计字段 =====
    pub created_at: DateTime<Utc>,  // 记录创建时间
    pub updated_at: DateTime<Utc>,  // 记录更新时间
}

impl Product {
    /// 由 SKU 派生 slug（小写，非字母数字 → '-'）
    pub fn slug_from_sku(sku: &str) -> String {
        sku.to_lowercase()
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
            .collect()
    }
}

// ==========================================
// ProductPatch - 商品部分更新补丁
// ==========================================
// 用途: UPDATE 行只携带发生变化的字段，未变化字段保持 None
// 红线: 补丁为最小集，不做全量覆盖
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductPatch {
    pub name_fr: Option<String>,
    pub base_price: Option<f64>,
    pub promo_price: Option<f64>,
    pub stock_quantity: Option<i64>,
    pub pack_size: Option<i64>,
    pub moq: Option<i64>,
}

impl ProductPatch {
    /// 补丁是否为空（所有字段均未变化）
    pub fn is_empty(&self) -> bool {
        self.name_fr.is_none()
            && self.base_price.is_none()
            && self.promo_price.is_none()
            && self.stock_quantity.is_none()
            && self.pack_size.is_none()
            && self.moq.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_from_sku() {
        assert_eq!(Product::slug_from_sku("LP-001"), "lp-001");
        assert_eq!(Product::slug_from_sku("ABC_9"), "abc-9");
        assert_eq!(Product::slug_from_sku("xyz123"), "xyz123");
    }

    #[test]
    fn test_patch_empty() {
        assert!(ProductPatch::default().is_empty());

        let patch = ProductPatch {
            base_price: Some(9.5),
            ..Default::default()
        };
        assert!(!patch.is_empty());
    }
}
