// ==========================================
// 商品目录导入系统 - 行校验器实现
// ==========================================
// 职责: 按导入类型规则表逐行校验（自然键 + 字段格式）
// 红线: 不在首个错误处短路，一次扫描收集该行全部问题
// ==========================================

use crate::domain::types::ImportType;
use crate::importer::file_parser::RawRow;
use crate::importer::rule_set::{rule_set_for, FieldKind, FieldRule, ImportRuleSet, FIELD_SKU};

// ==========================================
// RowValidator - 行校验器
// ==========================================
pub struct RowValidator {
    rules: &'static ImportRuleSet,
}

impl RowValidator {
    pub fn new(import_type: ImportType) -> Self {
        Self {
            rules: rule_set_for(import_type),
        }
    }

    /// 校验单行，返回全部错误消息（空 = 校验通过）
    pub fn validate(&self, row: &RawRow) -> Vec<String> {
        let mut errors = Vec::new();

        self.validate_natural_key(row, &mut errors);
        for rule in self.rules.fields {
            self.validate_field(row, rule, &mut errors);
        }

        errors
    }

    /// 校验自然键（SKU）: 非空 + 字符集 + 长度
    fn validate_natural_key(&self, row: &RawRow, errors: &mut Vec<String>) {
        match row.get(FIELD_SKU) {
            None => errors.push("SKU 缺失".to_string()),
            Some(sku) if !is_valid_sku(sku) => {
                errors.push(format!(
                    "SKU 格式无效: {}（仅限字母/数字/-/_，长度 ≥ 3）",
                    sku
                ));
            }
            Some(_) => {}
        }
    }

    /// 校验单个字段: 必填性 + 格式谓词
    ///
    /// 非必填字段仅在值存在且非空时校验格式
    fn validate_field(&self, row: &RawRow, rule: &FieldRule, errors: &mut Vec<String>) {
        let value = row.get(rule.field);

        let value = match value {
            Some(v) => v,
            None => {
                if rule.required {
                    errors.push(format!("{} 缺失", rule.field));
                }
                return;
            }
        };

        match rule.kind {
            FieldKind::Text => {} // 非空文本即合法
            FieldKind::Money => {
                if !is_valid_money(value) {
                    errors.push(format!("{} 无效: {}（需为非负数值）", rule.field, value));
                }
            }
            FieldKind::Quantity => {
                if !is_valid_quantity(value) {
                    errors.push(format!("{} 无效: {}（需为非负整数）", rule.field, value));
                }
            }
        }
    }
}

/// SKU 格式谓词: 仅字母/数字/'-'/'_'，长度 ≥ 3
pub fn is_valid_sku(sku: &str) -> bool {
    sku.len() >= 3
        && sku
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// 金额谓词: 非负数值
pub fn is_valid_money(value: &str) -> bool {
    matches!(value.parse::<f64>(), Ok(n) if n >= 0.0 && n.is_finite())
}

/// 数量谓词: 非负整数
pub fn is_valid_quantity(value: &str) -> bool {
    value.parse::<i64>().map(|n| n >= 0).unwrap_or(false)
}
