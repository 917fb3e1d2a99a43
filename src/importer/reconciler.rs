// ==========================================
// 商品目录导入系统 - 调和引擎实现
// ==========================================
// 职责: 校验结果 + 目录现状 + 导入模式/类型 → 四种行动作之一，
// 并为 UPDATE 行计算最小字段差异（非全量覆盖）
// ==========================================

use crate::domain::import_job::{FieldChange, PreviewRow};
use crate::domain::product::Product;
use crate::domain::types::{ImportMode, ImportType, RowAction};
use crate::importer::file_parser::RawRow;
use crate::importer::rule_set::{
    rule_set_for, FieldKind, ImportRuleSet, FIELD_MOQ, FIELD_NAME_FR, FIELD_PACK_SIZE,
    FIELD_PRICE_BASE, FIELD_PROMO_PRICE, FIELD_SKU, FIELD_STOCK_QUANTITY,
};
use std::collections::BTreeMap;

// ==========================================
// RowReconciler - 行调和器
// ==========================================
pub struct RowReconciler {
    rules: &'static ImportRuleSet,
    mode: ImportMode,
}

impl RowReconciler {
    pub fn new(import_type: ImportType, mode: ImportMode) -> Self {
        Self {
            rules: rule_set_for(import_type),
            mode,
        }
    }

    /// 调和单行: 判定动作并构造预览行
    ///
    /// 动作判定（依次）:
    /// 1. 部分字段导入 + 键非空 + 目标不存在 → 补充"商品不存在"错误
    ///    （与"键格式非法"区分报告；不论模式，一律 ERROR）
    /// 2. 存在校验错误 → ERROR
    /// 3. 目标存在 → CREATE_ONLY 模式 SKIP，否则 UPDATE
    /// 4. 目标不存在 → UPDATE_ONLY 模式 SKIP，否则 CREATE
    pub fn reconcile(
        &self,
        row: &RawRow,
        validation_errors: Vec<String>,
        existing: Option<&Product>,
    ) -> PreviewRow {
        let sku = row.get(FIELD_SKU).unwrap_or("").to_string();
        let mut errors = validation_errors;

        // 部分字段导入不允许新建: 目标缺失单独成一条错误
        if existing.is_none() && !sku.is_empty() && !self.rules.create_allowed {
            errors.push("商品不存在（该导入类型不允许新建）".to_string());
        }

        let action = if !errors.is_empty() {
            RowAction::Error
        } else if existing.is_some() {
            if self.mode == ImportMode::CreateOnly {
                RowAction::Skip
            } else {
                RowAction::Update
            }
        } else if self.mode == ImportMode::UpdateOnly {
            RowAction::Skip
        } else {
            RowAction::Create
        };

        let field_changes = match (action, existing) {
            (RowAction::Update, Some(product)) => self.compute_field_changes(row, product),
            _ => BTreeMap::new(),
        };

        PreviewRow {
            row_number: row.row_number,
            sku,
            action,
            field_changes,
            validation_errors: errors,
            source_fields: source_fields(row),
        }
    }

    /// 计算最小字段差异
    ///
    /// 仅包含: 文件中存在该列、解析值与目录当前值不同的字段；
    /// 缺失列与相等值一律省略
    pub fn compute_field_changes(
        &self,
        row: &RawRow,
        product: &Product,
    ) -> BTreeMap<String, FieldChange> {
        let mut changes = BTreeMap::new();

        for rule in self.rules.fields {
            let raw = match row.get(rule.field) {
                Some(v) => v,
                None => continue,
            };

            let new = match parse_field_value(rule.kind, raw) {
                Some(v) => v,
                None => continue, // 校验已兜底，解析失败的值不进入差异
            };

            let old = current_field_value(product, rule.field);
            if old != new {
                changes.insert(rule.field.to_string(), FieldChange { old, new });
            }
        }

        changes
    }
}

/// 按字段类别解析提交值为 JSON 值
pub fn parse_field_value(kind: FieldKind, raw: &str) -> Option<serde_json::Value> {
    match kind {
        FieldKind::Text => Some(serde_json::Value::String(raw.to_string())),
        FieldKind::Money => raw
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .and_then(|n| serde_json::Number::from_f64(n).map(serde_json::Value::Number)),
        FieldKind::Quantity => raw
            .parse::<i64>()
            .ok()
            .map(|n| serde_json::Value::Number(n.into())),
    }
}

/// 读取目录条目当前字段值（JSON 表示，与解析值同构便于比较）
pub fn current_field_value(product: &Product, field: &str) -> serde_json::Value {
    match field {
        FIELD_NAME_FR => serde_json::Value::String(product.name_fr.clone()),
        FIELD_PRICE_BASE => serde_json::Number::from_f64(product.base_price)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        FIELD_PROMO_PRICE => product
            .promo_price
            .and_then(serde_json::Number::from_f64)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        FIELD_STOCK_QUANTITY => serde_json::Value::Number(product.stock_quantity.into()),
        FIELD_PACK_SIZE => serde_json::Value::Number(product.pack_size.into()),
        FIELD_MOQ => serde_json::Value::Number(product.moq.into()),
        _ => serde_json::Value::Null,
    }
}

/// 提交的列→值映射（仅保留非空值，供提交阶段建档/重算）
fn source_fields(row: &RawRow) -> BTreeMap<String, String> {
    row.fields
        .iter()
        .filter(|(_, v)| !v.is_empty())
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}
