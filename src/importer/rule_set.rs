// ==========================================
// 商品目录导入系统 - 导入类型规则表
// ==========================================
// 职责: 每个导入类型的字段集合/必填/是否允许新建，集中在一张
// 静态查表中；新增导入类型只改此处，校验器与调和引擎不感知分支
// ==========================================

use crate::domain::types::ImportType;

// ===== 规范列名（文件表头即规则表字段键）=====
pub const FIELD_SKU: &str = "sku";
pub const FIELD_NAME_FR: &str = "name_fr";
pub const FIELD_PRICE_BASE: &str = "price_base";
pub const FIELD_PROMO_PRICE: &str = "promo_price";
pub const FIELD_STOCK_QUANTITY: &str = "stock_quantity";
pub const FIELD_PACK_SIZE: &str = "pack_size";
pub const FIELD_MOQ: &str = "moq";

// ==========================================
// FieldKind - 字段类别
// ==========================================
// 类别决定格式谓词与差异比较方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,     // 文本，按字符串比较
    Money,    // 金额，非负数值
    Quantity, // 数量，非负整数
}

// ==========================================
// FieldRule - 单字段规则
// ==========================================
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub field: &'static str,
    pub kind: FieldKind,
    pub required: bool, // 必填（缺失或空值即校验失败）
}

// ==========================================
// ImportRuleSet - 导入类型规则集
// ==========================================
// fields 同时是校验对象与 UPDATE 差异计算的字段集合；
// create_allowed = false 的类型（部分字段导入）不允许新建商品
#[derive(Debug, Clone, Copy)]
pub struct ImportRuleSet {
    pub import_type: ImportType,
    pub fields: &'static [FieldRule],
    pub create_allowed: bool,
}

// ===== FULL: 全量商品导入 =====
static FULL_FIELDS: &[FieldRule] = &[
    FieldRule { field: FIELD_NAME_FR, kind: FieldKind::Text, required: true },
    FieldRule { field: FIELD_PRICE_BASE, kind: FieldKind::Money, required: false },
    FieldRule { field: FIELD_PROMO_PRICE, kind: FieldKind::Money, required: false },
    FieldRule { field: FIELD_STOCK_QUANTITY, kind: FieldKind::Quantity, required: false },
    FieldRule { field: FIELD_PACK_SIZE, kind: FieldKind::Quantity, required: false },
    FieldRule { field: FIELD_MOQ, kind: FieldKind::Quantity, required: false },
];

static FULL_RULES: ImportRuleSet = ImportRuleSet {
    import_type: ImportType::Full,
    fields: FULL_FIELDS,
    create_allowed: true,
};

// ===== STOCK_ONLY: 仅库存 =====
static STOCK_FIELDS: &[FieldRule] = &[
    FieldRule { field: FIELD_STOCK_QUANTITY, kind: FieldKind::Quantity, required: false },
];

static STOCK_RULES: ImportRuleSet = ImportRuleSet {
    import_type: ImportType::StockOnly,
    fields: STOCK_FIELDS,
    create_allowed: false,
};

// ===== PRICE_ONLY: 仅价格 =====
static PRICE_FIELDS: &[FieldRule] = &[
    FieldRule { field: FIELD_PRICE_BASE, kind: FieldKind::Money, required: false },
    FieldRule { field: FIELD_PROMO_PRICE, kind: FieldKind::Money, required: false },
];

static PRICE_RULES: ImportRuleSet = ImportRuleSet {
    import_type: ImportType::PriceOnly,
    fields: PRICE_FIELDS,
    create_allowed: false,
};

/// 查表: 导入类型 → 规则集
pub fn rule_set_for(import_type: ImportType) -> &'static ImportRuleSet {
    match import_type {
        ImportType::Full => &FULL_RULES,
        ImportType::StockOnly => &STOCK_RULES,
        ImportType::PriceOnly => &PRICE_RULES,
    }
}
