// ==========================================
// 商品目录导入系统 - 商品 Repository 实现
// ==========================================
// 职责: 实现目录数据访问（使用 rusqlite）
// 约束: 所有查询使用参数化, 防止 SQL 注入
// ==========================================

use crate::domain::product::{Product, ProductPatch};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::product_repo::ProductRepository;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use std::sync::{Arc, Mutex};

// ==========================================
// ProductRepositoryImpl
// ==========================================
pub struct ProductRepositoryImpl {
    conn: Arc<Mutex<Connection>>,
}

impl ProductRepositoryImpl {
    /// 创建新的 Repository 实例（共享连接）
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 行映射: product 表 → Product
    fn map_row(row: &Row<'_>) -> rusqlite::Result<Product> {
        Ok(Product {
            sku: row.get("sku")?,
            name_fr: row.get("name_fr")?,
            slug: row.get("slug")?,
            unit: row.get("unit")?,
            base_price: row.get("base_price")?,
            promo_price: row.get("promo_price")?,
            tax_rate: row.get("tax_rate")?,
            stock_quantity: row.get("stock_quantity")?,
            pack_size: row.get("pack_size")?,
            moq: row.get("moq")?,
            is_active: row.get::<_, i64>("is_active")? != 0,
            created_at: parse_ts(row, "created_at")?,
            updated_at: parse_ts(row, "updated_at")?,
        })
    }
}

/// RFC3339 时间戳列解析
fn parse_ts(row: &Row<'_>, col: &str) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(col)?;
    raw.parse::<DateTime<Utc>>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Text,
            Box::new(e),
        )
    })
}

#[async_trait]
impl ProductRepository for ProductRepositoryImpl {
    async fn find_by_sku(&self, sku: &str) -> RepositoryResult<Option<Product>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT sku, name_fr, slug, unit, base_price, promo_price, tax_rate,
                   stock_quantity, pack_size, moq, is_active, created_at, updated_at
            FROM product
            WHERE sku = ?1
            "#,
        )?;

        let mut rows = stmt.query_map(params![sku], Self::map_row)?;
        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }

    async fn insert(&self, product: &Product) -> RepositoryResult<()> {
        let conn = self.get_conn()?;

        conn.execute(
            r#"
            INSERT INTO product (
                sku, name_fr, slug, unit, base_price, promo_price, tax_rate,
                stock_quantity, pack_size, moq, is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            "#,
            params![
                product.sku,
                product.name_fr,
                product.slug,
                product.unit,
                product.base_price,
                product.promo_price,
                product.tax_rate,
                product.stock_quantity,
                product.pack_size,
                product.moq,
                product.is_active as i64,
                product.created_at.to_rfc3339(),
                product.updated_at.to_rfc3339(),
            ],
        )?;

        Ok(())
    }

    async fn update_fields(&self, sku: &str, patch: &ProductPatch) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;

        // COALESCE 补丁: None 字段保持原值
        let rows = conn.execute(
            r#"
            UPDATE product SET
                name_fr        = COALESCE(?2, name_fr),
                base_price     = COALESCE(?3, base_price),
                promo_price    = COALESCE(?4, promo_price),
                stock_quantity = COALESCE(?5, stock_quantity),
                pack_size      = COALESCE(?6, pack_size),
                moq            = COALESCE(?7, moq),
                updated_at     = ?8
            WHERE sku = ?1
            "#,
            params![
                sku,
                patch.name_fr,
                patch.base_price,
                patch.promo_price,
                patch.stock_quantity,
                patch.pack_size,
                patch.moq,
                Utc::now().to_rfc3339(),
            ],
        )?;

        Ok(rows)
    }

    async fn count(&self) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM product", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    fn test_repo() -> ProductRepositoryImpl {
        let conn = Connection::open_in_memory().unwrap();
        db::configure_sqlite_connection(&conn).unwrap();
        db::ensure_schema(&conn).unwrap();
        ProductRepositoryImpl::new(Arc::new(Mutex::new(conn)))
    }

    fn sample_product(sku: &str) -> Product {
        Product {
            sku: sku.to_string(),
            name_fr: "Lait entier 1L".to_string(),
            slug: Product::slug_from_sku(sku),
            unit: "UNIT".to_string(),
            base_price: 125.5,
            promo_price: None,
            tax_rate: 0.20,
            stock_quantity: 45,
            pack_size: 6,
            moq: 1,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let repo = test_repo();
        assert_eq!(repo.count().await.unwrap(), 0);

        repo.insert(&sample_product("LP-001")).await.unwrap();
        assert_eq!(repo.count().await.unwrap(), 1);

        let found = repo.find_by_sku("LP-001").await.unwrap().unwrap();
        assert_eq!(found.name_fr, "Lait entier 1L");
        assert_eq!(found.base_price, 125.5);
        assert!(found.promo_price.is_none());

        assert!(repo.find_by_sku("GHOST").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_sku_rejected() {
        let repo = test_repo();
        repo.insert(&sample_product("LP-001")).await.unwrap();

        let result = repo.insert(&sample_product("LP-001")).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_partial_patch_leaves_other_fields() {
        let repo = test_repo();
        repo.insert(&sample_product("LP-001")).await.unwrap();

        let patch = ProductPatch {
            base_price: Some(130.0),
            ..Default::default()
        };
        let rows = repo.update_fields("LP-001", &patch).await.unwrap();
        assert_eq!(rows, 1);

        let found = repo.find_by_sku("LP-001").await.unwrap().unwrap();
        assert_eq!(found.base_price, 130.0);
        // 未打补丁的字段保持原值
        assert_eq!(found.stock_quantity, 45);
        assert_eq!(found.name_fr, "Lait entier 1L");
    }

    #[tokio::test]
    async fn test_patch_missing_target_returns_zero() {
        let repo = test_repo();
        let patch = ProductPatch {
            stock_quantity: Some(9),
            ..Default::default()
        };
        let rows = repo.update_fields("GHOST", &patch).await.unwrap();
        assert_eq!(rows, 0);
    }
}
