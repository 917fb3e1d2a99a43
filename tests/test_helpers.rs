// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 提供测试所需的数据库初始化、测试数据生成等功能
// ==========================================

use catalog_import::db;
use catalog_import::domain::product::Product;
use chrono::Utc;
use rusqlite::{params, Connection};
use std::error::Error;
use tempfile::NamedTempFile;

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file.path().to_str().unwrap().to_string();

    let conn = db::open_sqlite_connection(&db_path)?;
    db::ensure_schema(&conn)?;

    Ok((temp_file, db_path))
}

/// 向目录写入一条商品记录
pub fn seed_product(db_path: &str, sku: &str, base_price: f64, stock: i64) -> Result<(), Box<dyn Error>> {
    let conn = Connection::open(db_path)?;
    let now = Utc::now().to_rfc3339();
    let product = test_product(sku, base_price, stock);

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
            now,
            now,
        ],
    )?;

    Ok(())
}

/// 生成测试商品
pub fn test_product(sku: &str, base_price: f64, stock: i64) -> Product {
    let now = Utc::now();
    Product {
        sku: sku.to_string(),
        name_fr: format!("Produit {}", sku),
        slug: Product::slug_from_sku(sku),
        unit: "UNIT".to_string(),
        base_price,
        promo_price: None,
        tax_rate: 0.20,
        stock_quantity: stock,
        pack_size: 1,
        moq: 1,
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}

/// 读取一条商品记录（测试断言用）
pub fn fetch_product(db_path: &str, sku: &str) -> Result<Option<Product>, Box<dyn Error>> {
    let conn = Connection::open(db_path)?;
    let mut stmt = conn.prepare(
        r#"
        SELECT sku, name_fr, slug, unit, base_price, promo_price, tax_rate,
               stock_quantity, pack_size, moq, is_active, created_at, updated_at
        FROM product
        WHERE sku = ?1
        "#,
    )?;

    let mut rows = stmt.query_map(params![sku], |row| {
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
            created_at: row
                .get::<_, String>("created_at")?
                .parse()
                .unwrap_or_else(|_| Utc::now()),
            updated_at: row
                .get::<_, String>("updated_at")?
                .parse()
                .unwrap_or_else(|_| Utc::now()),
        })
    })?;

    match rows.next() {
        Some(row) => Ok(Some(row?)),
        None => Ok(None),
    }
}

/// 统计审计记录条数
pub fn count_audit_records(db_path: &str, entity_id: &str) -> Result<i64, Box<dyn Error>> {
    let conn = Connection::open(db_path)?;
    let count = conn.query_row(
        "SELECT COUNT(*) FROM audit_log WHERE entity_id = ?1",
        params![entity_id],
        |row| row.get(0),
    )?;
    Ok(count)
}
